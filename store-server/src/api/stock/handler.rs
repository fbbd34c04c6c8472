//! Stock API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{MovementQuery, StockAdjust, StockEntryCreate, StockExitCreate, StockMovement};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::stock;
use crate::utils::AppResult;

/// POST /api/stock/entries - receive stock
pub async fn register_entry(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<StockEntryCreate>,
) -> AppResult<Json<StockMovement>> {
    let movement = stock::register_entry(&state.pool, &user, payload).await?;
    Ok(Json(movement))
}

/// POST /api/stock/exits - remove stock other than by a sale
pub async fn register_exit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<StockExitCreate>,
) -> AppResult<Json<StockMovement>> {
    let movement = stock::register_exit(&state.pool, &user, payload).await?;
    Ok(Json(movement))
}

/// PUT /api/stock/:id - set the counted quantity of a line
pub async fn adjust(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<StockMovement>> {
    let movement = stock::adjust(&state.pool, &user, id, payload).await?;
    Ok(Json(movement))
}

/// GET /api/stock/movements?store_id&kind&limit
pub async fn list_movements(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let movements = stock::list_movements(&state.pool, &user, &query).await?;
    Ok(Json(movements))
}
