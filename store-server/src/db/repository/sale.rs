//! Sale Repository

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{DaySalesTotal, ItemKind, Sale, SaleEntry, SaleQuery, SellerStats};
use shared::money::from_cents;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use super::{
    ITEM_NAME, RepoError, RepoResult, cents, item_join, parse_column, parse_date, placeholders,
};

const SELLER_NAME: &str = "COALESCE(NULLIF(TRIM(a.full_name), ''), a.username)";

/// Sale to insert; the stock line was already decremented
#[derive(Debug, Clone)]
pub struct NewSale {
    pub store_id: i64,
    pub stock_line_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub seller_id: i64,
    pub sold_at: i64,
    pub business_date: NaiveDate,
    pub note: Option<String>,
}

impl NewSale {
    pub fn total_value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: i64,
    store_id: i64,
    stock_line_id: i64,
    item_kind: String,
    item_id: i64,
    item_name: String,
    quantity: i64,
    unit_price: i64,
    total_value: i64,
    seller_id: i64,
    seller_name: String,
    sold_at: i64,
    business_date: String,
    note: Option<String>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = RepoError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            stock_line_id: row.stock_line_id,
            item_kind: parse_column(&row.item_kind, "item_kind", ItemKind::parse)?,
            item_id: row.item_id,
            item_name: row.item_name,
            quantity: row.quantity,
            unit_price: from_cents(row.unit_price),
            total_value: from_cents(row.total_value),
            seller_id: row.seller_id,
            seller_name: row.seller_name,
            sold_at: row.sold_at,
            business_date: parse_date(&row.business_date, "business_date")?,
            note: row.note,
        })
    }
}

fn select() -> String {
    format!(
        "SELECT s.id, s.store_id, s.stock_line_id, s.item_kind, s.item_id, {ITEM_NAME} AS item_name, s.quantity, s.unit_price, s.total_value, s.seller_id, {SELLER_NAME} AS seller_name, s.sold_at, s.business_date, s.note FROM sale s JOIN account a ON a.id = s.seller_id {}",
        item_join("s")
    )
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewSale) -> RepoResult<i64> {
    let id = sqlx::query_scalar(
        "INSERT INTO sale (store_id, stock_line_id, item_kind, item_id, quantity, unit_price, total_value, seller_id, sold_at, business_date, note) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) RETURNING id",
    )
    .bind(data.store_id)
    .bind(data.stock_line_id)
    .bind(data.item_kind.as_str())
    .bind(data.item_id)
    .bind(data.quantity)
    .bind(cents(data.unit_price, "unit_price")?)
    .bind(cents(data.total_value(), "total_value")?)
    .bind(data.seller_id)
    .bind(data.sold_at)
    .bind(data.business_date.to_string())
    .bind(data.note.as_deref())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Sale>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{} WHERE s.id = ?", select());
    let row = sqlx::query_as::<_, SaleRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.map(Sale::try_from).transpose()
}

/// Newest sales first, filtered by stores (None = all), date range and seller
pub async fn find(
    pool: &SqlitePool,
    store_ids: Option<&[i64]>,
    filter: &SaleQuery,
) -> RepoResult<Vec<Sale>> {
    let mut conditions = Vec::new();
    if let Some(ids) = store_ids {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        conditions.push(format!("s.store_id IN {}", placeholders(ids.len())));
    }
    if filter.from.is_some() {
        conditions.push("s.business_date >= ?".to_string());
    }
    if filter.to.is_some() {
        conditions.push("s.business_date <= ?".to_string());
    }
    if filter.seller_id.is_some() {
        conditions.push("s.seller_id = ?".to_string());
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{}{where_clause} ORDER BY s.sold_at DESC, s.id DESC", select());

    let mut query = sqlx::query_as::<_, SaleRow>(&sql);
    for id in store_ids.unwrap_or_default() {
        query = query.bind(*id);
    }
    if let Some(from) = filter.from {
        query = query.bind(from.to_string());
    }
    if let Some(to) = filter.to {
        query = query.bind(to.to_string());
    }
    if let Some(seller_id) = filter.seller_id {
        query = query.bind(seller_id);
    }
    let rows = query.fetch_all(pool).await?;
    rows.into_iter().map(Sale::try_from).collect()
}

/// Sales of one store on one business date
pub async fn day_total(
    pool: &SqlitePool,
    store_id: i64,
    date: NaiveDate,
) -> RepoResult<DaySalesTotal> {
    let (sales_count, units_sold, total): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(quantity), 0), COALESCE(SUM(total_value), 0) FROM sale WHERE store_id = ? AND business_date = ?",
    )
    .bind(store_id)
    .bind(date.to_string())
    .fetch_one(pool)
    .await?;
    Ok(DaySalesTotal {
        sales_count,
        units_sold,
        total_value: from_cents(total),
    })
}

/// Ledger lines of a store in `[start, end]`, oldest first
pub async fn entries_between(
    pool: &SqlitePool,
    store_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<SaleEntry>> {
    #[derive(sqlx::FromRow)]
    struct EntryRow {
        id: i64,
        item_kind: String,
        item_id: i64,
        item_name: String,
        unit_price: i64,
        quantity: i64,
        total_value: i64,
        seller_id: i64,
        seller_name: String,
        seller_email: String,
        business_date: String,
    }

    let sql = format!(
        "SELECT s.id, s.item_kind, s.item_id, {ITEM_NAME} AS item_name, s.unit_price, s.quantity, s.total_value, s.seller_id, {SELLER_NAME} AS seller_name, a.email AS seller_email, s.business_date \
         FROM sale s JOIN account a ON a.id = s.seller_id {} \
         WHERE s.store_id = ? AND s.business_date >= ? AND s.business_date <= ? \
         ORDER BY s.business_date, s.id",
        item_join("s")
    );
    let rows = sqlx::query_as::<_, EntryRow>(&sql)
        .bind(store_id)
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(SaleEntry {
                sale_id: row.id,
                item_kind: parse_column(&row.item_kind, "item_kind", ItemKind::parse)?,
                item_id: row.item_id,
                item_name: row.item_name,
                unit_price: from_cents(row.unit_price),
                quantity: row.quantity,
                total_value: from_cents(row.total_value),
                seller_id: row.seller_id,
                seller_name: row.seller_name,
                seller_email: row.seller_email,
                business_date: parse_date(&row.business_date, "business_date")?,
            })
        })
        .collect()
}

/// Sales made by one account, optionally within a date range
pub async fn seller_stats(
    pool: &SqlitePool,
    account_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RepoResult<SellerStats> {
    let (sales_count, units_sold, total): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(quantity), 0), COALESCE(SUM(total_value), 0) FROM sale \
         WHERE seller_id = ?1 AND (?2 IS NULL OR business_date >= ?2) AND (?3 IS NULL OR business_date <= ?3)",
    )
    .bind(account_id)
    .bind(from.map(|d| d.to_string()))
    .bind(to.map(|d| d.to_string()))
    .fetch_one(pool)
    .await?;
    Ok(SellerStats {
        account_id,
        sales_count,
        units_sold,
        total_value: from_cents(total),
    })
}
