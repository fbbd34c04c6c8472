//! Balance API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Balance, BalanceCustomCreate, BalanceDetail, BalanceGenerate, BalancePreviewQuery,
    BalanceQuery, BalanceSnapshot,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/balances - newest period first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<Vec<Balance>>> {
    let balances = state.balances.list(&user, &query).await?;
    Ok(Json(balances))
}

/// POST /api/balances/generate
pub async fn generate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BalanceGenerate>,
) -> AppResult<Json<BalanceDetail>> {
    let detail = state
        .balances
        .generate(&user, payload, shared::util::today())
        .await?;
    Ok(Json(detail))
}

/// POST /api/balances/custom
pub async fn create_custom(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BalanceCustomCreate>,
) -> AppResult<Json<BalanceDetail>> {
    let detail = state.balances.create_custom(&user, payload).await?;
    Ok(Json(detail))
}

/// GET /api/balances/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<BalanceDetail>> {
    let detail = state.balances.get(&user, id).await?;
    Ok(Json(detail))
}

/// DELETE /api/balances/:id
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = state.balances.delete(&user, id).await?;
    Ok(Json(deleted))
}

/// GET /api/balances/preview?store_id&start&end
pub async fn preview(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<BalancePreviewQuery>,
) -> AppResult<Json<BalanceSnapshot>> {
    let snapshot = state.balances.preview(&user, &query).await?;
    Ok(Json(snapshot))
}
