//! Daily report API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{DailyReport, DailyReportCreate, DailyReportQuery, DailyReportUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::daily_reports;
use crate::utils::AppResult;

/// GET /api/daily-reports?store_id&from&to
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<DailyReportQuery>,
) -> AppResult<Json<Vec<DailyReport>>> {
    let reports = daily_reports::list(&state.pool, &user, &query).await?;
    Ok(Json(reports))
}

/// GET /api/daily-reports/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DailyReport>> {
    let report = daily_reports::get(&state.pool, &user, id).await?;
    Ok(Json(report))
}

/// POST /api/daily-reports
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DailyReportCreate>,
) -> AppResult<Json<DailyReport>> {
    let report = daily_reports::create(&state.pool, &user, payload).await?;
    Ok(Json(report))
}

/// PUT /api/daily-reports/:id - author or superuser
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DailyReportUpdate>,
) -> AppResult<Json<DailyReport>> {
    let report = daily_reports::update(&state.pool, &user, id, payload).await?;
    Ok(Json(report))
}

/// DELETE /api/daily-reports/:id - author or superuser
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = daily_reports::delete(&state.pool, &user, id).await?;
    Ok(Json(deleted))
}
