//! Product API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{ItemKind, Product, ProductCreate, ProductUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, catalog};
use crate::services::stock::item_not_found;
use crate::utils::validation::{MAX_NAME_LEN, validate_price, validate_required_text};
use crate::utils::{AppError, AppResult};

fn not_found(id: i64) -> AppError {
    item_not_found(ItemKind::Product, id)
}

/// GET /api/products - catalog sorted by name
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = catalog::find_all_products(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = catalog::find_product(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, "price")?;
    let product = catalog::create_product(&state.pool, payload).await?;
    tracing::info!(product_id = product.id, name = %product.name, price = %product.price, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    let product = catalog::update_product(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;
    tracing::info!(product_id = id, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/:id - refused once the product has been sold
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !catalog::delete_product(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(true))
}
