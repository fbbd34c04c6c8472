//! Sales
//!
//! A sale decrements its stock line, inserts the sale row and records an
//! `exit` movement, all in one transaction.

use chrono::NaiveDate;
use shared::models::{DaySalesTotal, MovementKind, Sale, SaleCreate, SaleQuery};
use sqlx::SqlitePool;

use super::stock::accessible_line;
use crate::auth::access::narrow_to_store;
use crate::auth::{CurrentUser, accessible_store_ids, ensure_store_access};
use crate::db::repository::sale::NewSale;
use crate::db::repository::stock_movement::NewMovement;
use crate::db::repository::{sale, stock, stock_movement};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_quantity};
use crate::utils::{AppError, AppResult, ErrorCode};

const SALE_REASON: &str = "sale";

/// Register a sale made at `now` (millis) by `user`.
///
/// Fails with `InsufficientStock` (and changes nothing) when the line holds
/// fewer units than requested.
pub async fn register_sale(
    pool: &SqlitePool,
    user: &CurrentUser,
    payload: SaleCreate,
    now: i64,
) -> AppResult<Sale> {
    validate_quantity(payload.quantity)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    let line = accessible_line(pool, user, payload.stock_line_id).await?;
    if line.item_kind != payload.item_kind {
        return Err(AppError::with_message(
            ErrorCode::ItemKindMismatch,
            format!(
                "Stock line {} holds {}, not {}",
                line.id, line.item_kind, payload.item_kind
            ),
        ));
    }

    let new_sale = NewSale {
        store_id: line.store_id,
        stock_line_id: line.id,
        item_kind: line.item_kind,
        item_id: line.item_id,
        quantity: payload.quantity,
        unit_price: line.unit_price,
        seller_id: user.id,
        sold_at: now,
        business_date: shared::util::business_date(now),
        note: payload.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
    };

    let mut tx = pool.begin().await?;
    let after = stock::decrement(&mut *tx, line.id, payload.quantity).await?;
    let sale_id = sale::insert(&mut *tx, &new_sale).await?;
    stock_movement::insert(
        &mut *tx,
        NewMovement {
            kind: MovementKind::Exit,
            store_id: line.store_id,
            stock_line_id: line.id,
            item_kind: line.item_kind,
            item_id: line.item_id,
            quantity_before: after + payload.quantity,
            quantity_moved: payload.quantity,
            quantity_after: after,
            unit_cost: rust_decimal::Decimal::ZERO,
            unit_sale_price: line.unit_price,
            reason: Some(SALE_REASON.to_string()),
            reason_detail: None,
            supplier: None,
            invoice_number: None,
            sale_id: Some(sale_id),
            created_by: Some(user.id),
        },
    )
    .await?;
    let created = sale::find_by_id(&mut *tx, sale_id)
        .await?
        .ok_or_else(|| AppError::database("Failed to read back sale"))?;
    tx.commit().await?;

    tracing::info!(
        sale_id,
        store_id = line.store_id,
        stock_line_id = line.id,
        quantity = payload.quantity,
        remaining = after,
        "Sale registered"
    );
    Ok(created)
}

/// Sales of the visible stores, newest first
pub async fn list(
    pool: &SqlitePool,
    user: &CurrentUser,
    query: &SaleQuery,
) -> AppResult<Vec<Sale>> {
    let visible = accessible_store_ids(pool, user).await?;
    let stores = narrow_to_store(visible, query.store_id);
    Ok(sale::find(pool, stores.as_deref(), query).await?)
}

pub async fn get(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<Sale> {
    let found = sale::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound).with_detail("id", id))?;
    ensure_store_access(pool, user, found.store_id).await?;
    Ok(found)
}

/// Count, units and value sold by a store on one business date
pub async fn day_total(
    pool: &SqlitePool,
    user: &CurrentUser,
    store_id: i64,
    date: NaiveDate,
) -> AppResult<DaySalesTotal> {
    ensure_store_access(pool, user, store_id).await?;
    Ok(sale::day_total(pool, store_id, date).await?)
}
