//! Stock entries, exits and adjustments
//!
//! Every quantity change commits together with its movement row. Lookups and
//! access checks run before the transaction opens.

use shared::models::{
    ItemKind, MovementKind, MovementQuery, StockAdjust, StockEntryCreate, StockExitCreate,
    StockLine, StockMovement,
};
use sqlx::SqlitePool;

use crate::auth::access::narrow_to_store;
use crate::auth::{CurrentUser, accessible_store_ids, ensure_store_access};
use crate::db::repository::stock_movement::NewMovement;
use crate::db::repository::{catalog, stock, stock_movement, store};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_count, validate_optional_text, validate_price,
    validate_quantity,
};
use crate::utils::{AppError, AppResult, ErrorCode};

pub(crate) fn item_not_found(kind: ItemKind, id: i64) -> AppError {
    let code = match kind {
        ItemKind::Product => ErrorCode::ProductNotFound,
        ItemKind::Recharge => ErrorCode::RechargeNotFound,
    };
    AppError::new(code).with_detail("id", id)
}

pub(crate) fn line_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::StockLineNotFound).with_detail("stock_line_id", id)
}

/// Fetch a line and check the caller may work on its store
pub(crate) async fn accessible_line(
    pool: &SqlitePool,
    user: &CurrentUser,
    line_id: i64,
) -> AppResult<StockLine> {
    let line = stock::find_by_id(pool, line_id)
        .await?
        .ok_or_else(|| line_not_found(line_id))?;
    ensure_store_access(pool, user, line.store_id).await?;
    Ok(line)
}

async fn existing_store(pool: &SqlitePool, user: &CurrentUser, store_id: i64) -> AppResult<()> {
    store::find_by_id(pool, store_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound).with_detail("store_id", store_id))?;
    ensure_store_access(pool, user, store_id).await
}

fn resolve_reason(kind: MovementKind, reason: Option<String>) -> AppResult<Option<String>> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .or_else(|| kind.default_reason().map(str::to_string));
    if let Some(r) = &reason
        && !kind.accepts_reason(r)
    {
        return Err(AppError::validation(format!("Unknown {kind:?} reason: {r}")));
    }
    Ok(reason)
}

/// Lines of a store with item name, price and status
pub async fn list_for_store(
    pool: &SqlitePool,
    user: &CurrentUser,
    store_id: i64,
) -> AppResult<Vec<StockLine>> {
    existing_store(pool, user, store_id).await?;
    Ok(stock::find_by_store(pool, store_id).await?)
}

/// Lines with fewer than ten units
pub async fn list_low(
    pool: &SqlitePool,
    user: &CurrentUser,
    store_id: i64,
) -> AppResult<Vec<StockLine>> {
    existing_store(pool, user, store_id).await?;
    Ok(stock::find_low_by_store(pool, store_id).await?)
}

/// Add stock, creating the line on first entry
pub async fn register_entry(
    pool: &SqlitePool,
    user: &CurrentUser,
    payload: StockEntryCreate,
) -> AppResult<StockMovement> {
    validate_quantity(payload.quantity)?;
    validate_price(payload.unit_cost, "unit_cost")?;
    if let Some(price) = payload.unit_sale_price {
        validate_price(price, "unit_sale_price")?;
    }
    validate_optional_text(&payload.reason_detail, "reason_detail", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.supplier, "supplier", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.invoice_number, "invoice_number", MAX_SHORT_TEXT_LEN)?;
    let reason = resolve_reason(MovementKind::Entry, payload.reason)?;

    existing_store(pool, user, payload.store_id).await?;
    let (_, current_price) = catalog::item_info(pool, payload.item_kind, payload.item_id)
        .await?
        .ok_or_else(|| item_not_found(payload.item_kind, payload.item_id))?;

    let mut tx = pool.begin().await?;
    let (line_id, before) =
        stock::get_or_create(&mut *tx, payload.store_id, payload.item_kind, payload.item_id).await?;
    let after = stock::increment(&mut *tx, line_id, payload.quantity).await?;
    let movement = stock_movement::insert(
        &mut *tx,
        NewMovement {
            kind: MovementKind::Entry,
            store_id: payload.store_id,
            stock_line_id: line_id,
            item_kind: payload.item_kind,
            item_id: payload.item_id,
            quantity_before: before,
            quantity_moved: payload.quantity,
            quantity_after: after,
            unit_cost: payload.unit_cost,
            unit_sale_price: payload.unit_sale_price.unwrap_or(current_price),
            reason,
            reason_detail: payload.reason_detail,
            supplier: payload.supplier,
            invoice_number: payload.invoice_number,
            sale_id: None,
            created_by: Some(user.id),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        store_id = payload.store_id,
        stock_line_id = line_id,
        quantity = payload.quantity,
        reference = %movement.reference,
        "Stock entry registered"
    );
    Ok(movement)
}

/// Take stock out for anything other than a sale
pub async fn register_exit(
    pool: &SqlitePool,
    user: &CurrentUser,
    payload: StockExitCreate,
) -> AppResult<StockMovement> {
    validate_quantity(payload.quantity)?;
    validate_optional_text(&payload.reason_detail, "reason_detail", MAX_NOTE_LEN)?;
    let reason = resolve_reason(MovementKind::Exit, payload.reason)?;
    let line = accessible_line(pool, user, payload.stock_line_id).await?;

    let mut tx = pool.begin().await?;
    let after = stock::decrement(&mut *tx, line.id, payload.quantity).await?;
    let movement = stock_movement::insert(
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
            reason,
            reason_detail: payload.reason_detail,
            supplier: None,
            invoice_number: None,
            sale_id: None,
            created_by: Some(user.id),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        stock_line_id = line.id,
        quantity = payload.quantity,
        reference = %movement.reference,
        "Stock exit registered"
    );
    Ok(movement)
}

/// Overwrite the counted quantity of a line
pub async fn adjust(
    pool: &SqlitePool,
    user: &CurrentUser,
    line_id: i64,
    payload: StockAdjust,
) -> AppResult<StockMovement> {
    validate_count(payload.quantity)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    let line = accessible_line(pool, user, line_id).await?;

    let mut tx = pool.begin().await?;
    let before = stock::set_quantity(&mut *tx, line.id, payload.quantity).await?;
    let movement = stock_movement::insert(
        &mut *tx,
        NewMovement {
            kind: MovementKind::Adjustment,
            store_id: line.store_id,
            stock_line_id: line.id,
            item_kind: line.item_kind,
            item_id: line.item_id,
            quantity_before: before,
            // signed difference
            quantity_moved: payload.quantity - before,
            quantity_after: payload.quantity,
            unit_cost: rust_decimal::Decimal::ZERO,
            unit_sale_price: line.unit_price,
            reason: MovementKind::Adjustment.default_reason().map(str::to_string),
            reason_detail: payload.note,
            supplier: None,
            invoice_number: None,
            sale_id: None,
            created_by: Some(user.id),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        stock_line_id = line.id,
        before,
        after = payload.quantity,
        "Stock adjusted"
    );
    Ok(movement)
}

/// Recent movements of the visible stores
pub async fn list_movements(
    pool: &SqlitePool,
    user: &CurrentUser,
    query: &MovementQuery,
) -> AppResult<Vec<StockMovement>> {
    let visible = accessible_store_ids(pool, user).await?;
    let stores = narrow_to_store(visible, query.store_id);
    Ok(stock_movement::find_recent(pool, stores.as_deref(), query.kind, query.limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::services::testing::{Seed, seed};
    use rust_decimal::Decimal;

    fn entry(seed: &Seed, quantity: i64) -> StockEntryCreate {
        StockEntryCreate {
            store_id: seed.store_id,
            item_kind: ItemKind::Recharge,
            item_id: seed.recharge_id,
            quantity,
            unit_cost: Decimal::new(45000, 2),
            unit_sale_price: None,
            reason: None,
            reason_detail: None,
            supplier: Some("Unitel".into()),
            invoice_number: Some("FT 2024/001".into()),
        }
    }

    #[tokio::test]
    async fn entry_creates_line_and_movement() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;

        let first = register_entry(&db.pool, &s.manager, entry(&s, 20)).await.unwrap();
        assert_eq!(first.kind, MovementKind::Entry);
        assert_eq!((first.quantity_before, first.quantity_after), (0, 20));
        assert_eq!(first.total_cost, Decimal::from(9000));
        assert_eq!(first.unit_sale_price, Decimal::from(500));
        assert_eq!(first.reason.as_deref(), Some("purchase"));
        assert!(first.reference.starts_with(&format!("ENT-{}-", s.recharge_id)));

        let second = register_entry(&db.pool, &s.manager, entry(&s, 5)).await.unwrap();
        assert_eq!(second.stock_line_id, first.stock_line_id);
        assert_eq!((second.quantity_before, second.quantity_after), (20, 25));
        assert_ne!(second.reference, first.reference);

        let lines = list_for_store(&db.pool, &s.manager, s.store_id).await.unwrap();
        let line = lines.iter().find(|l| l.id == first.stock_line_id).unwrap();
        assert_eq!(line.quantity, 25);
    }

    #[tokio::test]
    async fn entry_is_rejected_for_foreign_store_and_bad_input() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;

        let mut foreign = entry(&s, 1);
        foreign.store_id = s.other_store;
        let err = register_entry(&db.pool, &s.manager, foreign).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreAccessDenied);

        let err = register_entry(&db.pool, &s.manager, entry(&s, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let mut missing = entry(&s, 1);
        missing.item_id = 999;
        let err = register_entry(&db.pool, &s.manager, missing).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RechargeNotFound);

        let mut odd_reason = entry(&s, 1);
        odd_reason.reason = Some("magic".into());
        let err = register_entry(&db.pool, &s.manager, odd_reason).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn exit_is_guarded_and_adjust_records_difference() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;
        let line_id = register_entry(&db.pool, &s.manager, entry(&s, 3))
            .await
            .unwrap()
            .stock_line_id;

        let exit = StockExitCreate {
            stock_line_id: line_id,
            quantity: 4,
            reason: Some("loss".into()),
            reason_detail: None,
        };
        let err = register_exit(&db.pool, &s.manager, exit.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Insufficient stock. Available: 3, requested: 4");

        let ok = register_exit(&db.pool, &s.manager, StockExitCreate { quantity: 2, ..exit })
            .await
            .unwrap();
        assert_eq!((ok.quantity_before, ok.quantity_after), (3, 1));
        assert!(ok.reference.starts_with("SAI-"));

        let adj = adjust(
            &db.pool,
            &s.manager,
            line_id,
            StockAdjust {
                quantity: 10,
                note: Some("contagem".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(adj.quantity_moved, 9);
        assert_eq!(adj.quantity_after, 10);

        let err = adjust(&db.pool, &s.manager, line_id, StockAdjust { quantity: -1, note: None })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let movements = list_movements(&db.pool, &s.manager, &MovementQuery::default())
            .await
            .unwrap();
        assert_eq!(movements.len(), 3);
        assert_eq!(movements[0].kind, MovementKind::Adjustment);

        let only_exits = MovementQuery {
            kind: Some(MovementKind::Exit),
            ..Default::default()
        };
        assert_eq!(list_movements(&db.pool, &s.admin, &only_exits).await.unwrap().len(), 1);
    }
}
