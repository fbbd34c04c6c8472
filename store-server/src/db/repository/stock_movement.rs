//! Stock Movement Repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{ItemKind, MovementKind, StockMovement};
use shared::money::from_cents;
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult, cents, parse_column, placeholders};

/// Default and maximum page size of [`find_recent`]
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Movement to record; quantities are already applied to the stock line
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub kind: MovementKind,
    pub store_id: i64,
    pub stock_line_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub quantity_before: i64,
    pub quantity_moved: i64,
    pub quantity_after: i64,
    pub unit_cost: Decimal,
    pub unit_sale_price: Decimal,
    pub reason: Option<String>,
    pub reason_detail: Option<String>,
    pub supplier: Option<String>,
    pub invoice_number: Option<String>,
    pub sale_id: Option<i64>,
    pub created_by: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct MovementRow {
    id: i64,
    reference: String,
    kind: String,
    store_id: i64,
    stock_line_id: i64,
    item_kind: String,
    item_id: i64,
    quantity_before: i64,
    quantity_moved: i64,
    quantity_after: i64,
    unit_cost: i64,
    total_cost: i64,
    unit_sale_price: i64,
    reason: Option<String>,
    reason_detail: Option<String>,
    supplier: Option<String>,
    invoice_number: Option<String>,
    sale_id: Option<i64>,
    created_by: Option<i64>,
    created_at: i64,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = RepoError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            reference: row.reference,
            kind: parse_column(&row.kind, "kind", MovementKind::parse)?,
            store_id: row.store_id,
            stock_line_id: row.stock_line_id,
            item_kind: parse_column(&row.item_kind, "item_kind", ItemKind::parse)?,
            item_id: row.item_id,
            quantity_before: row.quantity_before,
            quantity_moved: row.quantity_moved,
            quantity_after: row.quantity_after,
            unit_cost: from_cents(row.unit_cost),
            total_cost: from_cents(row.total_cost),
            unit_sale_price: from_cents(row.unit_sale_price),
            reason: row.reason,
            reason_detail: row.reason_detail,
            supplier: row.supplier,
            invoice_number: row.invoice_number,
            sale_id: row.sale_id,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

const MOVEMENT_SELECT: &str = "SELECT id, reference, kind, store_id, stock_line_id, item_kind, item_id, quantity_before, quantity_moved, quantity_after, unit_cost, total_cost, unit_sale_price, reason, reason_detail, supplier, invoice_number, sale_id, created_by, created_at FROM stock_movement";

/// `ENT-42-20240101093000-7`
pub fn make_reference(kind: MovementKind, item_id: i64, at_millis: i64, seq: i64) -> String {
    let stamp = DateTime::<Utc>::from_timestamp_millis(at_millis)
        .unwrap_or_default()
        .format("%Y%m%d%H%M%S");
    format!("{}-{item_id}-{stamp}-{seq}", kind.reference_prefix())
}

/// Record a movement inside the caller's transaction
pub async fn insert(conn: &mut SqliteConnection, data: NewMovement) -> RepoResult<StockMovement> {
    let now = shared::util::now_millis();
    // The caller already wrote in this transaction, so the database lock is held
    let seq: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM stock_movement")
        .fetch_one(&mut *conn)
        .await?;
    let reference = make_reference(data.kind, data.item_id, now, seq);
    let total_cost = data.unit_cost * Decimal::from(data.quantity_moved);

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_movement (reference, kind, store_id, stock_line_id, item_kind, item_id, quantity_before, quantity_moved, quantity_after, unit_cost, total_cost, unit_sale_price, reason, reason_detail, supplier, invoice_number, sale_id, created_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19) RETURNING id",
    )
    .bind(&reference)
    .bind(data.kind.as_str())
    .bind(data.store_id)
    .bind(data.stock_line_id)
    .bind(data.item_kind.as_str())
    .bind(data.item_id)
    .bind(data.quantity_before)
    .bind(data.quantity_moved)
    .bind(data.quantity_after)
    .bind(cents(data.unit_cost, "unit_cost")?)
    .bind(cents(total_cost, "total_cost")?)
    .bind(cents(data.unit_sale_price, "unit_sale_price")?)
    .bind(data.reason.as_deref())
    .bind(data.reason_detail.as_deref())
    .bind(data.supplier.as_deref())
    .bind(data.invoice_number.as_deref())
    .bind(data.sale_id)
    .bind(data.created_by)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    let sql = format!("{MOVEMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MovementRow>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    StockMovement::try_from(row)
}

/// Newest movements first, optionally restricted to some stores and one kind
pub async fn find_recent(
    pool: &SqlitePool,
    store_ids: Option<&[i64]>,
    kind: Option<MovementKind>,
    limit: Option<i64>,
) -> RepoResult<Vec<StockMovement>> {
    let mut conditions = Vec::new();
    if let Some(ids) = store_ids {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        conditions.push(format!("store_id IN {}", placeholders(ids.len())));
    }
    if kind.is_some() {
        conditions.push("kind = ?".to_string());
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{MOVEMENT_SELECT}{where_clause} ORDER BY created_at DESC, id DESC LIMIT ?");

    let mut query = sqlx::query_as::<_, MovementRow>(&sql);
    for id in store_ids.unwrap_or_default() {
        query = query.bind(*id);
    }
    if let Some(kind) = kind {
        query = query.bind(kind.as_str());
    }
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let rows = query.bind(limit).fetch_all(pool).await?;
    rows.into_iter().map(StockMovement::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_format() {
        // 2024-01-01T09:30:00Z
        let at = 1_704_101_400_000;
        assert_eq!(
            make_reference(MovementKind::Entry, 42, at, 7),
            "ENT-42-20240101093000-7"
        );
        assert_eq!(
            make_reference(MovementKind::Exit, 3, at, 1),
            "SAI-3-20240101093000-1"
        );
    }
}
