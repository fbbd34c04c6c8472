//! Stock Line Repository
//!
//! Quantity changes take a connection from an open transaction so the
//! movement (and sale) rows commit together with them.

use super::{ITEM_NAME, ITEM_PRICE, RepoError, RepoResult, item_join, parse_column};
use shared::models::{ItemKind, LOW_STOCK_THRESHOLD, StockLine, StockStatus};
use shared::money::from_cents;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

#[derive(sqlx::FromRow)]
struct StockRow {
    id: i64,
    store_id: i64,
    item_kind: String,
    item_id: i64,
    item_name: String,
    unit_price: i64,
    quantity: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<StockRow> for StockLine {
    type Error = RepoError;

    fn try_from(row: StockRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            item_kind: parse_column(&row.item_kind, "item_kind", ItemKind::parse)?,
            item_id: row.item_id,
            item_name: row.item_name,
            unit_price: from_cents(row.unit_price),
            quantity: row.quantity,
            status: StockStatus::from_quantity(row.quantity),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn select() -> String {
    format!(
        "SELECT sl.id, sl.store_id, sl.item_kind, sl.item_id, {ITEM_NAME} AS item_name, {ITEM_PRICE} AS unit_price, sl.quantity, sl.created_at, sl.updated_at FROM stock_line sl {}",
        item_join("sl")
    )
}

fn convert(rows: Vec<StockRow>) -> RepoResult<Vec<StockLine>> {
    rows.into_iter().map(StockLine::try_from).collect()
}

/// Every line of a store, products first, then by name
pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<StockLine>> {
    let sql = format!(
        "{} WHERE sl.store_id = ? ORDER BY sl.item_kind, item_name, sl.id",
        select()
    );
    let rows = sqlx::query_as::<_, StockRow>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    convert(rows)
}

/// Lines below the low-stock threshold (including empty ones), lowest first
pub async fn find_low_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<StockLine>> {
    let sql = format!(
        "{} WHERE sl.store_id = ? AND sl.quantity < ? ORDER BY sl.quantity, item_name, sl.id",
        select()
    );
    let rows = sqlx::query_as::<_, StockRow>(&sql)
        .bind(store_id)
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(pool)
        .await?;
    convert(rows)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<StockLine>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{} WHERE sl.id = ?", select());
    let row = sqlx::query_as::<_, StockRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.map(StockLine::try_from).transpose()
}

/// Id and quantity of the line, inserting an empty one if missing
pub async fn get_or_create(
    conn: &mut SqliteConnection,
    store_id: i64,
    kind: ItemKind,
    item_id: i64,
) -> RepoResult<(i64, i64)> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO stock_line (store_id, item_kind, item_id, quantity, created_at, updated_at) VALUES (?1, ?2, ?3, 0, ?4, ?4) ON CONFLICT (store_id, item_kind, item_id) DO NOTHING",
    )
    .bind(store_id)
    .bind(kind.as_str())
    .bind(item_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let line: (i64, i64) = sqlx::query_as(
        "SELECT id, quantity FROM stock_line WHERE store_id = ? AND item_kind = ? AND item_id = ?",
    )
    .bind(store_id)
    .bind(kind.as_str())
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(line)
}

/// Add to a line, returning the new quantity
pub async fn increment(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<i64> {
    let after: Option<i64> = sqlx::query_scalar(
        "UPDATE stock_line SET quantity = quantity + ?1, updated_at = ?2 WHERE id = ?3 RETURNING quantity",
    )
    .bind(quantity)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    after.ok_or_else(|| RepoError::NotFound(format!("Stock line {id} not found")))
}

/// Take from a line only if enough is available, returning the new quantity.
///
/// The check and the write are a single statement, so concurrent sales can
/// never push a line below zero.
pub async fn decrement(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<i64> {
    let after: Option<i64> = sqlx::query_scalar(
        "UPDATE stock_line SET quantity = quantity - ?1, updated_at = ?2 WHERE id = ?3 AND quantity >= ?1 RETURNING quantity",
    )
    .bind(quantity)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(after) = after {
        return Ok(after);
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM stock_line WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match available {
        Some(available) => Err(RepoError::InsufficientStock {
            available,
            requested: quantity,
        }),
        None => Err(RepoError::NotFound(format!("Stock line {id} not found"))),
    }
}

/// Overwrite the quantity, returning the previous one
pub async fn set_quantity(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<i64> {
    if quantity < 0 {
        return Err(RepoError::Validation("quantity must not be negative".into()));
    }
    let before: Option<i64> = sqlx::query_scalar("SELECT quantity FROM stock_line WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let before = before.ok_or_else(|| RepoError::NotFound(format!("Stock line {id} not found")))?;
    sqlx::query("UPDATE stock_line SET quantity = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(quantity)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn seed(pool: &SqlitePool) -> i64 {
        sqlx::query("INSERT INTO store (id, name, neighborhood, city, province, municipality, created_at, updated_at) VALUES (1, 'Loja', 'B', 'C', 'Luanda', 'M', 0, 0)")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO recharge (id, name, price, created_at) VALUES (5, 'Unitel 500', 50000, 0)")
            .execute(pool)
            .await
            .unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let (id, quantity) = get_or_create(&mut conn, 1, ItemKind::Recharge, 5).await.unwrap();
        assert_eq!(quantity, 0);
        id
    }

    #[tokio::test]
    async fn guarded_decrement() {
        let db = DbService::in_memory().await.unwrap();
        let id = seed(&db.pool).await;
        let mut conn = db.pool.acquire().await.unwrap();

        assert_eq!(increment(&mut conn, id, 4).await.unwrap(), 4);
        assert_eq!(decrement(&mut conn, id, 3).await.unwrap(), 1);

        let err = decrement(&mut conn, id, 2).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::InsufficientStock {
                available: 1,
                requested: 2
            }
        ));
        drop(conn);

        let line = find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.item_name, "Unitel 500");
        assert_eq!(line.unit_price, from_cents(50000));
        assert_eq!(line.status, StockStatus::Low);
    }

    #[tokio::test]
    async fn get_or_create_is_stable_and_lists() {
        let db = DbService::in_memory().await.unwrap();
        let id = seed(&db.pool).await;
        let mut conn = db.pool.acquire().await.unwrap();
        let (again, _) = get_or_create(&mut conn, 1, ItemKind::Recharge, 5).await.unwrap();
        assert_eq!(again, id);

        assert_eq!(set_quantity(&mut conn, id, 12).await.unwrap(), 0);
        assert!(set_quantity(&mut conn, id, -1).await.is_err());
        drop(conn);

        assert_eq!(find_by_store(&db.pool, 1).await.unwrap().len(), 1);
        assert!(find_low_by_store(&db.pool, 1).await.unwrap().is_empty());
    }
}
