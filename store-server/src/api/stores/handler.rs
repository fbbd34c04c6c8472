//! Store API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{
    StockLine, Store, StoreCreate, StoreDetail, StoreManagersUpdate, StoreUpdate,
    is_valid_province,
};
use sqlx::SqlitePool;

use crate::auth::{CurrentUser, accessible_store_ids, ensure_store_access};
use crate::core::ServerState;
use crate::db::repository::{RepoError, account, store};
use crate::services::stock as stock_service;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

fn store_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::StoreNotFound).with_detail("id", id)
}

fn store_error(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => store_not_found(id),
        other => other.into(),
    }
}

fn validate_province(province: &str) -> AppResult<()> {
    if !is_valid_province(province) {
        return Err(AppError::new(ErrorCode::InvalidProvince).with_detail("province", province));
    }
    Ok(())
}

/// Every id must name an existing account
async fn validate_managers(pool: &SqlitePool, account_ids: &[i64]) -> AppResult<()> {
    for id in account_ids {
        if account::find_by_id(pool, *id).await?.is_none() {
            return Err(AppError::new(ErrorCode::AccountNotFound).with_detail("id", *id));
        }
    }
    Ok(())
}

/// GET /api/stores - stores visible to the caller
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Store>>> {
    let visible = accessible_store_ids(&state.pool, &user).await?;
    let stores = store::find_all(&state.pool, visible.as_deref()).await?;
    Ok(Json(stores))
}

/// GET /api/stores/:id - store with statistics
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<StoreDetail>> {
    let found = store::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| store_not_found(id))?;
    ensure_store_access(&state.pool, &user, id).await?;
    let stats = store::stats(&state.pool, id).await?;
    Ok(Json(StoreDetail {
        store: found,
        stats,
    }))
}

/// POST /api/stores
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StoreCreate>,
) -> AppResult<Json<Store>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.neighborhood, "neighborhood", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.city, "city", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.municipality, "municipality", MAX_SHORT_TEXT_LEN)?;
    validate_province(&payload.province)?;
    validate_managers(&state.pool, &payload.manager_ids).await?;

    let created = store::create(&state.pool, payload).await?;
    tracing::info!(store_id = created.id, name = %created.name, "Store created");
    Ok(Json(created))
}

/// PUT /api/stores/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StoreUpdate>,
) -> AppResult<Json<Store>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    for (field, value) in [
        ("neighborhood", &payload.neighborhood),
        ("city", &payload.city),
        ("municipality", &payload.municipality),
    ] {
        if let Some(v) = value {
            validate_required_text(v, field, MAX_SHORT_TEXT_LEN)?;
        }
    }
    if let Some(province) = &payload.province {
        validate_province(province)?;
    }

    let updated = store::update(&state.pool, id, payload)
        .await
        .map_err(store_error(id))?;
    tracing::info!(store_id = id, "Store updated");
    Ok(Json(updated))
}

/// DELETE /api/stores/:id - removes the store with its stock, sales and reports
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !store::delete(&state.pool, id).await? {
        return Err(store_not_found(id));
    }
    tracing::warn!(store_id = id, "Store deleted");
    Ok(Json(true))
}

/// PUT /api/stores/:id/managers - replace the manager set
pub async fn set_managers(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StoreManagersUpdate>,
) -> AppResult<Json<Store>> {
    validate_managers(&state.pool, &payload.account_ids).await?;
    let updated = store::set_managers(&state.pool, id, &payload.account_ids)
        .await
        .map_err(store_error(id))?;
    tracing::info!(store_id = id, managers = ?updated.manager_ids, "Store managers replaced");
    Ok(Json(updated))
}

/// GET /api/stores/:id/stock - every stock line of the store
pub async fn stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<StockLine>>> {
    let lines = stock_service::list_for_store(&state.pool, &user, id).await?;
    Ok(Json(lines))
}

/// GET /api/stores/:id/stock/low - lines below the low-stock threshold
pub async fn low_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<StockLine>>> {
    let lines = stock_service::list_low(&state.pool, &user, id).await?;
    Ok(Json(lines))
}
