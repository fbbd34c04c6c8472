//! Daily Report Repository

use chrono::NaiveDate;
use shared::models::{DailyReport, DailyReportQuery, ReportChannels};
use shared::money::from_cents;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult, cents, parse_date, placeholders};

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: i64,
    store_id: i64,
    report_date: String,
    tpa: i64,
    dstv: i64,
    dstv_start: i64,
    dstv_rest: i64,
    zap: i64,
    zap_rest: i64,
    unitel: i64,
    unitel_rest: i64,
    africell: i64,
    africell_rest: i64,
    recharges: i64,
    acc: i64,
    cash: i64,
    coins: i64,
    expenses: i64,
    shortage_note: Option<String>,
    author_id: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ReportRow> for DailyReport {
    type Error = RepoError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let channels = ReportChannels {
            tpa: from_cents(row.tpa),
            dstv: from_cents(row.dstv),
            dstv_start: from_cents(row.dstv_start),
            dstv_rest: from_cents(row.dstv_rest),
            zap: from_cents(row.zap),
            zap_rest: from_cents(row.zap_rest),
            unitel: from_cents(row.unitel),
            unitel_rest: from_cents(row.unitel_rest),
            africell: from_cents(row.africell),
            africell_rest: from_cents(row.africell_rest),
            recharges: from_cents(row.recharges),
            acc: from_cents(row.acc),
            cash: from_cents(row.cash),
            coins: from_cents(row.coins),
            expenses: from_cents(row.expenses),
        };
        Ok(DailyReport::new(
            row.id,
            row.store_id,
            parse_date(&row.report_date, "report_date")?,
            channels,
            row.shortage_note,
            row.author_id,
            row.created_at,
            row.updated_at,
        ))
    }
}

const REPORT_SELECT: &str = "SELECT id, store_id, report_date, tpa, dstv, dstv_start, dstv_rest, zap, zap_rest, unitel, unitel_rest, africell, africell_rest, recharges, acc, cash, coins, expenses, shortage_note, author_id, created_at, updated_at FROM daily_report";

/// Channel amounts in column order, as cents
fn channel_cents(c: &ReportChannels) -> RepoResult<[i64; 15]> {
    let mut out = [0; 15];
    for (slot, amount) in out.iter_mut().zip(c.amounts()) {
        *slot = cents(amount, "report amount")?;
    }
    Ok(out)
}

fn convert(rows: Vec<ReportRow>) -> RepoResult<Vec<DailyReport>> {
    rows.into_iter().map(DailyReport::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DailyReport>> {
    let sql = format!("{REPORT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ReportRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(DailyReport::try_from).transpose()
}

pub async fn find_by_store_date(
    pool: &SqlitePool,
    store_id: i64,
    date: NaiveDate,
) -> RepoResult<Option<DailyReport>> {
    let sql = format!("{REPORT_SELECT} WHERE store_id = ? AND report_date = ?");
    let row = sqlx::query_as::<_, ReportRow>(&sql)
        .bind(store_id)
        .bind(date.to_string())
        .fetch_optional(pool)
        .await?;
    row.map(DailyReport::try_from).transpose()
}

/// Newest first, filtered by stores (None = all) and date range
pub async fn find(
    pool: &SqlitePool,
    store_ids: Option<&[i64]>,
    filter: &DailyReportQuery,
) -> RepoResult<Vec<DailyReport>> {
    let mut conditions = Vec::new();
    if let Some(ids) = store_ids {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        conditions.push(format!("store_id IN {}", placeholders(ids.len())));
    }
    if filter.from.is_some() {
        conditions.push("report_date >= ?".to_string());
    }
    if filter.to.is_some() {
        conditions.push("report_date <= ?".to_string());
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{REPORT_SELECT}{where_clause} ORDER BY report_date DESC, store_id, id");

    let mut query = sqlx::query_as::<_, ReportRow>(&sql);
    for id in store_ids.unwrap_or_default() {
        query = query.bind(*id);
    }
    if let Some(from) = filter.from {
        query = query.bind(from.to_string());
    }
    if let Some(to) = filter.to {
        query = query.bind(to.to_string());
    }
    convert(query.fetch_all(pool).await?)
}

/// Reports of one store in `[start, end]`, oldest first
pub async fn find_between(
    pool: &SqlitePool,
    store_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<DailyReport>> {
    let sql = format!(
        "{REPORT_SELECT} WHERE store_id = ? AND report_date >= ? AND report_date <= ? ORDER BY report_date"
    );
    let rows = sqlx::query_as::<_, ReportRow>(&sql)
        .bind(store_id)
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(pool)
        .await?;
    convert(rows)
}

/// Insert a report; `(store, date)` collisions come back as `Duplicate`
pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    report_date: NaiveDate,
    channels: &ReportChannels,
    shortage_note: Option<&str>,
    author_id: i64,
) -> RepoResult<DailyReport> {
    let now = shared::util::now_millis();
    let mut query = sqlx::query_scalar::<_, i64>(
        "INSERT INTO daily_report (store_id, report_date, tpa, dstv, dstv_start, dstv_rest, zap, zap_rest, unitel, unitel_rest, africell, africell_rest, recharges, acc, cash, coins, expenses, grand_total, shortage_note, author_id, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?21) RETURNING id",
    )
    .bind(store_id)
    .bind(report_date.to_string());
    for amount in channel_cents(channels)? {
        query = query.bind(amount);
    }
    let id = query
        .bind(cents(channels.grand_total(), "grand_total")?)
        .bind(shortage_note)
        .bind(author_id)
        .bind(now)
        .fetch_one(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create daily report".into()))
}

/// Replace every channel; grand total is recomputed
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    channels: &ReportChannels,
    shortage_note: Option<&str>,
) -> RepoResult<DailyReport> {
    let now = shared::util::now_millis();
    let mut query = sqlx::query(
        "UPDATE daily_report SET tpa = ?1, dstv = ?2, dstv_start = ?3, dstv_rest = ?4, zap = ?5, zap_rest = ?6, unitel = ?7, unitel_rest = ?8, africell = ?9, africell_rest = ?10, recharges = ?11, acc = ?12, cash = ?13, coins = ?14, expenses = ?15, grand_total = ?16, shortage_note = ?17, updated_at = ?18 WHERE id = ?19",
    );
    for amount in channel_cents(channels)? {
        query = query.bind(amount);
    }
    let rows = query
        .bind(cents(channels.grand_total(), "grand_total")?)
        .bind(shortage_note)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Daily report {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Daily report {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM daily_report WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
