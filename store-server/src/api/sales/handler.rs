//! Sales API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{DaySalesQuery, DaySalesTotal, Sale, SaleCreate, SaleQuery};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::sales;
use crate::utils::AppResult;

/// GET /api/sales?store_id&from&to&seller_id - newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SaleQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let found = sales::list(&state.pool, &user, &query).await?;
    Ok(Json(found))
}

/// GET /api/sales/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Sale>> {
    let sale = sales::get(&state.pool, &user, id).await?;
    Ok(Json(sale))
}

/// POST /api/sales - sell from a stock line, sold by the caller
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<Sale>> {
    let sale = sales::register_sale(&state.pool, &user, payload, shared::util::now_millis()).await?;
    Ok(Json(sale))
}

/// GET /api/sales/day-total?store_id&date
pub async fn day_total(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<DaySalesQuery>,
) -> AppResult<Json<DaySalesTotal>> {
    let date = query.date.unwrap_or_else(shared::util::today);
    let total = sales::day_total(&state.pool, &user, query.store_id, date).await?;
    Ok(Json(total))
}
