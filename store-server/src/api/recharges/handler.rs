//! Recharge API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{ItemKind, Recharge, RechargeCreate, RechargeUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, catalog};
use crate::services::stock::item_not_found;
use crate::utils::validation::{MAX_NAME_LEN, validate_price, validate_required_text};
use crate::utils::{AppError, AppResult};

fn not_found(id: i64) -> AppError {
    item_not_found(ItemKind::Recharge, id)
}

/// GET /api/recharges - voucher types sorted by name
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Recharge>>> {
    let recharges = catalog::find_all_recharges(&state.pool).await?;
    Ok(Json(recharges))
}

/// GET /api/recharges/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Recharge>> {
    let recharge = catalog::find_recharge(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(recharge))
}

/// POST /api/recharges
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RechargeCreate>,
) -> AppResult<Json<Recharge>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;
    let recharge = catalog::create_recharge(&state.pool, payload).await?;
    tracing::info!(recharge_id = recharge.id, name = %recharge.name, price = %recharge.price, "Recharge created");
    Ok(Json(recharge))
}

/// PUT /api/recharges/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RechargeUpdate>,
) -> AppResult<Json<Recharge>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    let recharge = catalog::update_recharge(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;
    tracing::info!(recharge_id = id, "Recharge updated");
    Ok(Json(recharge))
}

/// DELETE /api/recharges/:id - refused once the voucher has been sold
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !catalog::delete_recharge(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(recharge_id = id, "Recharge deleted");
    Ok(Json(true))
}
