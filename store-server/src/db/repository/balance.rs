//! Balance Repository
//!
//! A balance is one header row holding the scalar totals plus child rows for
//! the per-day breakdowns and the rankings. Every refresh rewrites all of it
//! in one transaction.

use chrono::NaiveDate;
use shared::models::{
    Balance, BalanceQuery, BalanceSnapshot, BalanceStatus, ChannelBreakdown, DailyReportSummary,
    DailySales, Financials, ItemRanking, KindTotals, Period, PeriodKind, ReportChannels,
    ReportTotals, SalesTotals, SellerPerformance, SellerRanking,
};
use shared::money::from_cents;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{RepoError, RepoResult, cents, parse_column, parse_date, placeholders};

/// Header of a new balance
#[derive(Debug, Clone)]
pub struct NewBalance {
    pub store_id: i64,
    pub period: Period,
    pub description: String,
    pub created_by: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct BalanceRow {
    id: i64,
    store_id: i64,
    store_name: String,
    period_kind: String,
    start_date: String,
    end_date: String,
    description: String,
    status: String,
    gross_total: i64,
    gross_profit: i64,
    profit_margin: i64,
    created_by: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<BalanceRow> for Balance {
    type Error = RepoError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            store_name: row.store_name,
            period_kind: parse_column(&row.period_kind, "period_kind", PeriodKind::parse)?,
            start_date: parse_date(&row.start_date, "start_date")?,
            end_date: parse_date(&row.end_date, "end_date")?,
            description: row.description,
            status: parse_column(&row.status, "status", BalanceStatus::parse)?,
            gross_total: from_cents(row.gross_total),
            gross_profit: from_cents(row.gross_profit),
            // stored as percent x 100
            profit_margin: from_cents(row.profit_margin),
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BALANCE_SELECT: &str = "SELECT b.id, b.store_id, st.name AS store_name, b.period_kind, b.start_date, b.end_date, b.description, b.status, b.gross_total, b.gross_profit, b.profit_margin, b.created_by, b.created_at, b.updated_at FROM balance b JOIN store st ON st.id = b.store_id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Balance>> {
    let sql = format!("{BALANCE_SELECT} WHERE b.id = ?");
    let row = sqlx::query_as::<_, BalanceRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Balance::try_from).transpose()
}

/// The balance of a store, kind and start date, if any
pub async fn find_by_key(
    pool: &SqlitePool,
    store_id: i64,
    kind: PeriodKind,
    start: NaiveDate,
) -> RepoResult<Option<Balance>> {
    let sql = format!(
        "{BALANCE_SELECT} WHERE b.store_id = ? AND b.period_kind = ? AND b.start_date = ?"
    );
    let row = sqlx::query_as::<_, BalanceRow>(&sql)
        .bind(store_id)
        .bind(kind.as_str())
        .bind(start.to_string())
        .fetch_optional(pool)
        .await?;
    row.map(Balance::try_from).transpose()
}

/// Newest periods first, then by store
pub async fn find(
    pool: &SqlitePool,
    store_ids: Option<&[i64]>,
    filter: &BalanceQuery,
) -> RepoResult<Vec<Balance>> {
    let mut conditions = Vec::new();
    if let Some(ids) = store_ids {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        conditions.push(format!("b.store_id IN {}", placeholders(ids.len())));
    }
    if filter.kind.is_some() {
        conditions.push("b.period_kind = ?".to_string());
    }
    if filter.year.is_some() {
        conditions.push("strftime('%Y', b.start_date) = ?".to_string());
    }
    if filter.month.is_some() {
        conditions.push("strftime('%m', b.start_date) = ?".to_string());
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let sql =
        format!("{BALANCE_SELECT}{where_clause} ORDER BY b.start_date DESC, b.store_id, b.id");

    let mut query = sqlx::query_as::<_, BalanceRow>(&sql);
    for id in store_ids.unwrap_or_default() {
        query = query.bind(*id);
    }
    if let Some(kind) = filter.kind {
        query = query.bind(kind.as_str());
    }
    if let Some(year) = filter.year {
        query = query.bind(format!("{year:04}"));
    }
    if let Some(month) = filter.month {
        query = query.bind(format!("{month:02}"));
    }
    let rows = query.fetch_all(pool).await?;
    rows.into_iter().map(Balance::try_from).collect()
}

/// Insert a header and its snapshot
pub async fn insert(
    pool: &SqlitePool,
    data: &NewBalance,
    snapshot: &BalanceSnapshot,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO balance (store_id, period_kind, start_date, end_date, description, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id",
    )
    .bind(data.store_id)
    .bind(data.period.kind.as_str())
    .bind(data.period.start.to_string())
    .bind(data.period.end.to_string())
    .bind(&data.description)
    .bind(data.created_by)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    write_snapshot(&mut tx, id, snapshot, now).await?;
    tx.commit().await?;
    Ok(id)
}

/// Replace the stored snapshot (and end date) of a balance
pub async fn save_snapshot(
    pool: &SqlitePool,
    id: i64,
    snapshot: &BalanceSnapshot,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    write_snapshot(&mut tx, id, snapshot, shared::util::now_millis()).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM balance WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

async fn write_snapshot(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    s: &BalanceSnapshot,
    now: i64,
) -> RepoResult<()> {
    let c = &s.reports.channels;
    let f = &s.financials;
    let rows = sqlx::query(
        "UPDATE balance SET end_date = ?1, \
         product_total = ?2, product_count = ?3, recharge_total = ?4, recharge_count = ?5, gross_total = ?6, transactions = ?7, \
         tpa = ?8, dstv = ?9, dstv_start = ?10, dstv_rest = ?11, zap = ?12, zap_rest = ?13, unitel = ?14, unitel_rest = ?15, \
         africell = ?16, africell_rest = ?17, recharges = ?18, acc = ?19, cash = ?20, coins = ?21, expenses = ?22, \
         report_grand_total = ?23, report_count = ?24, \
         total_collected = ?25, cash_difference = ?26, operating_costs = ?27, gross_profit = ?28, profit_margin = ?29, \
         status = ?30, updated_at = ?31 WHERE id = ?32",
    )
    .bind(s.period.end.to_string())
    .bind(cents(s.sales.products.total, "products_total")?)
    .bind(s.sales.products.count)
    .bind(cents(s.sales.recharges.total, "recharges_total")?)
    .bind(s.sales.recharges.count)
    .bind(cents(s.sales.gross_total, "gross_total")?)
    .bind(s.sales.transactions)
    .bind(cents(c.tpa, "tpa")?)
    .bind(cents(c.dstv, "dstv")?)
    .bind(cents(c.dstv_start, "dstv_start")?)
    .bind(cents(c.dstv_rest, "dstv_rest")?)
    .bind(cents(c.zap, "zap")?)
    .bind(cents(c.zap_rest, "zap_rest")?)
    .bind(cents(c.unitel, "unitel")?)
    .bind(cents(c.unitel_rest, "unitel_rest")?)
    .bind(cents(c.africell, "africell")?)
    .bind(cents(c.africell_rest, "africell_rest")?)
    .bind(cents(c.recharges, "recharges")?)
    .bind(cents(c.acc, "acc")?)
    .bind(cents(c.cash, "cash")?)
    .bind(cents(c.coins, "coins")?)
    .bind(cents(c.expenses, "expenses")?)
    .bind(cents(s.reports.grand_total, "grand_total")?)
    .bind(s.reports.report_count)
    .bind(cents(f.total_collected, "total_collected")?)
    .bind(cents(f.cash_difference, "cash_difference")?)
    .bind(cents(f.operating_costs, "operating_costs")?)
    .bind(cents(f.gross_profit, "gross_profit")?)
    .bind(cents(f.profit_margin, "profit_margin")?)
    .bind(s.status.as_str())
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Balance {id} not found")));
    }

    for table in ["balance_daily_sales", "balance_daily_report", "balance_ranking"] {
        let sql = format!("DELETE FROM {table} WHERE balance_id = ?");
        sqlx::query(&sql).bind(id).execute(&mut **tx).await?;
    }

    for day in &s.daily_sales {
        sqlx::query(
            "INSERT INTO balance_daily_sales (balance_id, date, total, product_total, product_count, recharge_total, recharge_count, transactions) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(day.date.to_string())
        .bind(cents(day.total, "total")?)
        .bind(cents(day.products.total, "products_total")?)
        .bind(day.products.count)
        .bind(cents(day.recharges.total, "recharges_total")?)
        .bind(day.recharges.count)
        .bind(day.transactions)
        .execute(&mut **tx)
        .await?;
    }

    for day in &s.daily_reports {
        sqlx::query(
            "INSERT INTO balance_daily_report (balance_id, date, grand_total, total_collected, cash, coins, tpa, expenses) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(day.date.to_string())
        .bind(cents(day.grand_total, "grand_total")?)
        .bind(cents(day.total_collected, "total_collected")?)
        .bind(cents(day.cash, "cash")?)
        .bind(cents(day.coins, "coins")?)
        .bind(cents(day.tpa, "tpa")?)
        .bind(cents(day.expenses, "expenses")?)
        .execute(&mut **tx)
        .await?;
    }

    for (ranking, items) in [("product", &s.top_products), ("recharge", &s.top_recharges)] {
        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO balance_ranking (balance_id, ranking, position, subject_id, name, unit_price, units_sold, total_value, sales_count, average_ticket) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(ranking)
            .bind(position as i64)
            .bind(item.item_id)
            .bind(&item.name)
            .bind(cents(item.unit_price, "unit_price")?)
            .bind(item.units_sold)
            .bind(cents(item.total_value, "total_value")?)
            .bind(item.sales_count)
            .bind(cents(item.average_ticket, "average_ticket")?)
            .execute(&mut **tx)
            .await?;
        }
    }

    for (position, seller) in s.top_sellers.iter().enumerate() {
        sqlx::query(
            "INSERT INTO balance_ranking (balance_id, ranking, position, subject_id, name, email, total_value, sales_count, average_ticket, product_sales, recharge_sales, performance) VALUES (?, 'seller', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(position as i64)
        .bind(seller.seller_id)
        .bind(&seller.name)
        .bind(&seller.email)
        .bind(cents(seller.total_value, "total_value")?)
        .bind(seller.sales_count)
        .bind(cents(seller.average_ticket, "average_ticket")?)
        .bind(seller.product_sales)
        .bind(seller.recharge_sales)
        .bind(seller.performance.as_str())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Rebuild the stored snapshot of a balance
pub async fn load_snapshot(pool: &SqlitePool, balance: &Balance) -> RepoResult<BalanceSnapshot> {
    #[derive(sqlx::FromRow)]
    struct Totals {
        product_total: i64,
        product_count: i64,
        recharge_total: i64,
        recharge_count: i64,
        gross_total: i64,
        transactions: i64,
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
        report_grand_total: i64,
        report_count: i64,
        total_collected: i64,
        cash_difference: i64,
        operating_costs: i64,
        gross_profit: i64,
        profit_margin: i64,
    }

    let t = sqlx::query_as::<_, Totals>(
        "SELECT product_total, product_count, recharge_total, recharge_count, gross_total, transactions, tpa, dstv, dstv_start, dstv_rest, zap, zap_rest, unitel, unitel_rest, africell, africell_rest, recharges, acc, cash, coins, expenses, report_grand_total, report_count, total_collected, cash_difference, operating_costs, gross_profit, profit_margin FROM balance WHERE id = ?",
    )
    .bind(balance.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Balance {} not found", balance.id)))?;

    let reports = ReportTotals {
        channels: ReportChannels {
            tpa: from_cents(t.tpa),
            dstv: from_cents(t.dstv),
            dstv_start: from_cents(t.dstv_start),
            dstv_rest: from_cents(t.dstv_rest),
            zap: from_cents(t.zap),
            zap_rest: from_cents(t.zap_rest),
            unitel: from_cents(t.unitel),
            unitel_rest: from_cents(t.unitel_rest),
            africell: from_cents(t.africell),
            africell_rest: from_cents(t.africell_rest),
            recharges: from_cents(t.recharges),
            acc: from_cents(t.acc),
            cash: from_cents(t.cash),
            coins: from_cents(t.coins),
            expenses: from_cents(t.expenses),
        },
        grand_total: from_cents(t.report_grand_total),
        report_count: t.report_count,
    };

    let daily_sales: Vec<(String, i64, i64, i64, i64, i64, i64)> = sqlx::query_as(
        "SELECT date, total, product_total, product_count, recharge_total, recharge_count, transactions FROM balance_daily_sales WHERE balance_id = ? ORDER BY date",
    )
    .bind(balance.id)
    .fetch_all(pool)
    .await?;
    let daily_sales = daily_sales
        .into_iter()
        .map(|(date, total, pt, pc, rt, rc, transactions)| {
            Ok(DailySales {
                date: parse_date(&date, "date")?,
                total: from_cents(total),
                products: KindTotals {
                    total: from_cents(pt),
                    count: pc,
                },
                recharges: KindTotals {
                    total: from_cents(rt),
                    count: rc,
                },
                transactions,
            })
        })
        .collect::<RepoResult<Vec<_>>>()?;

    let daily_reports: Vec<(String, i64, i64, i64, i64, i64, i64)> = sqlx::query_as(
        "SELECT date, grand_total, total_collected, cash, coins, tpa, expenses FROM balance_daily_report WHERE balance_id = ? ORDER BY date",
    )
    .bind(balance.id)
    .fetch_all(pool)
    .await?;
    let daily_reports = daily_reports
        .into_iter()
        .map(|(date, grand_total, total_collected, cash, coins, tpa, expenses)| {
            Ok(DailyReportSummary {
                date: parse_date(&date, "date")?,
                grand_total: from_cents(grand_total),
                total_collected: from_cents(total_collected),
                cash: from_cents(cash),
                coins: from_cents(coins),
                tpa: from_cents(tpa),
                expenses: from_cents(expenses),
            })
        })
        .collect::<RepoResult<Vec<_>>>()?;

    #[derive(sqlx::FromRow)]
    struct RankingRow {
        ranking: String,
        subject_id: i64,
        name: String,
        email: String,
        unit_price: i64,
        units_sold: i64,
        total_value: i64,
        sales_count: i64,
        average_ticket: i64,
        product_sales: i64,
        recharge_sales: i64,
        performance: Option<String>,
    }

    let rankings = sqlx::query_as::<_, RankingRow>(
        "SELECT ranking, subject_id, name, email, unit_price, units_sold, total_value, sales_count, average_ticket, product_sales, recharge_sales, performance FROM balance_ranking WHERE balance_id = ? ORDER BY ranking, position",
    )
    .bind(balance.id)
    .fetch_all(pool)
    .await?;

    let mut top_products = Vec::new();
    let mut top_recharges = Vec::new();
    let mut top_sellers = Vec::new();
    for row in rankings {
        match row.ranking.as_str() {
            "seller" => top_sellers.push(SellerRanking {
                seller_id: row.subject_id,
                name: row.name,
                email: row.email,
                sales_count: row.sales_count,
                total_value: from_cents(row.total_value),
                average_ticket: from_cents(row.average_ticket),
                product_sales: row.product_sales,
                recharge_sales: row.recharge_sales,
                performance: parse_column(
                    row.performance.as_deref().unwrap_or_default(),
                    "performance",
                    SellerPerformance::parse,
                )?,
            }),
            kind => {
                let item = ItemRanking {
                    item_id: row.subject_id,
                    name: row.name,
                    unit_price: from_cents(row.unit_price),
                    units_sold: row.units_sold,
                    total_value: from_cents(row.total_value),
                    sales_count: row.sales_count,
                    average_ticket: from_cents(row.average_ticket),
                };
                if kind == "product" {
                    top_products.push(item);
                } else {
                    top_recharges.push(item);
                }
            }
        }
    }

    let gross_total = from_cents(t.gross_total);
    let channels = ChannelBreakdown::from_totals(&reports);
    Ok(BalanceSnapshot {
        store_id: balance.store_id,
        period: balance.period(),
        sales: SalesTotals {
            products: KindTotals {
                total: from_cents(t.product_total),
                count: t.product_count,
            },
            recharges: KindTotals {
                total: from_cents(t.recharge_total),
                count: t.recharge_count,
            },
            gross_total,
            transactions: t.transactions,
        },
        reports,
        financials: Financials {
            total_collected: from_cents(t.total_collected),
            cash_difference: from_cents(t.cash_difference),
            operating_costs: from_cents(t.operating_costs),
            gross_profit: from_cents(t.gross_profit),
            profit_margin: from_cents(t.profit_margin),
        },
        status: balance.status,
        channels,
        daily_sales,
        daily_reports,
        top_products,
        top_recharges,
        top_sellers,
    })
}

