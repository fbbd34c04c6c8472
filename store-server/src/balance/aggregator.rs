//! Balance Aggregator
//!
//! Rolls sales and daily reports of one store over a closed date range into a
//! [`BalanceSnapshot`]. [`compute_snapshot`] is pure; [`BalanceAggregator`]
//! feeds it from the ledgers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{
    BalanceSnapshot, BalanceStatus, ChannelBreakdown, DailyReport, DailyReportSummary,
    DailySales, Financials, ItemKind, ItemRanking, KindTotals, Period, ReportChannels,
    ReportTotals, SaleEntry, SalesTotals, SellerPerformance, SellerRanking,
};
use shared::money::round_money;
use sqlx::SqlitePool;

use super::ledger::{DailyReportLedger, SalesLedger, SqliteLedger};
use crate::db::repository::RepoResult;

/// Share of gross sales booked as operating costs (30%)
pub const OPERATING_COST_RATE: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Length of every top list
pub const RANKING_SIZE: usize = 10;

/// Recomputes snapshots from injected ledgers
#[derive(Clone)]
pub struct BalanceAggregator {
    sales: Arc<dyn SalesLedger>,
    reports: Arc<dyn DailyReportLedger>,
}

impl BalanceAggregator {
    pub fn new(sales: Arc<dyn SalesLedger>, reports: Arc<dyn DailyReportLedger>) -> Self {
        Self { sales, reports }
    }

    /// Both ledgers backed by the database
    pub fn sqlite(pool: SqlitePool) -> Self {
        let ledger = Arc::new(SqliteLedger::new(pool));
        Self::new(ledger.clone(), ledger)
    }

    /// Read both ledgers for `period` and compute the snapshot
    pub async fn recompute(&self, store_id: i64, period: Period) -> RepoResult<BalanceSnapshot> {
        let sales = self
            .sales
            .sales_between(store_id, period.start, period.end)
            .await?;
        let reports = self
            .reports
            .reports_between(store_id, period.start, period.end)
            .await?;
        Ok(compute_snapshot(store_id, period, &sales, &reports))
    }

    /// Like [`Self::recompute`], but a ledger failure yields the zero snapshot
    pub async fn recompute_or_empty(&self, store_id: i64, period: Period) -> BalanceSnapshot {
        match self.recompute(store_id, period).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    store_id,
                    start = %period.start,
                    end = %period.end,
                    error = %e,
                    "Balance recompute failed, returning empty snapshot"
                );
                empty_snapshot(store_id, period)
            }
        }
    }
}

/// All sums zero, per-day sales zero-filled, no rankings
pub fn empty_snapshot(store_id: i64, period: Period) -> BalanceSnapshot {
    compute_snapshot(store_id, period, &[], &[])
}

/// Compute the snapshot of `store_id` over `period`.
///
/// Sales and reports dated outside the period are ignored.
pub fn compute_snapshot(
    store_id: i64,
    period: Period,
    sales: &[SaleEntry],
    reports: &[DailyReport],
) -> BalanceSnapshot {
    let sales: Vec<&SaleEntry> = sales
        .iter()
        .filter(|s| period.contains(s.business_date))
        .collect();
    let mut reports: Vec<&DailyReport> = reports
        .iter()
        .filter(|r| period.contains(r.report_date))
        .collect();
    reports.sort_by_key(|r| (r.report_date, r.id));

    let sales_totals = sum_sales(&sales);
    let report_totals = sum_reports(&reports);
    let financials = financials(&sales_totals, &report_totals);
    let status = BalanceStatus::from_profit(financials.gross_profit);

    BalanceSnapshot {
        store_id,
        period,
        channels: ChannelBreakdown::from_totals(&report_totals),
        daily_sales: daily_sales(period, &sales),
        daily_reports: reports
            .iter()
            .map(|r| DailyReportSummary {
                date: r.report_date,
                grand_total: r.grand_total,
                total_collected: r.total_collected,
                cash: r.channels.cash,
                coins: r.channels.coins,
                tpa: r.channels.tpa,
                expenses: r.channels.expenses,
            })
            .collect(),
        top_products: item_ranking(&sales, ItemKind::Product),
        top_recharges: item_ranking(&sales, ItemKind::Recharge),
        top_sellers: seller_ranking(&sales),
        sales: sales_totals,
        reports: report_totals,
        financials,
        status,
    }
}

fn add_sale(totals: &mut KindTotals, sale: &SaleEntry) {
    totals.total += sale.total_value;
    totals.count += 1;
}

fn sum_sales(sales: &[&SaleEntry]) -> SalesTotals {
    let mut totals = SalesTotals::default();
    for sale in sales {
        match sale.item_kind {
            ItemKind::Product => add_sale(&mut totals.products, sale),
            ItemKind::Recharge => add_sale(&mut totals.recharges, sale),
        }
        totals.gross_total += sale.total_value;
        totals.transactions += 1;
    }
    totals
}

fn sum_reports(reports: &[&DailyReport]) -> ReportTotals {
    let mut sum = ReportChannels::default();
    let mut grand_total = Decimal::ZERO;
    for report in reports {
        let c = &report.channels;
        sum.tpa += c.tpa;
        sum.dstv += c.dstv;
        sum.dstv_start += c.dstv_start;
        sum.dstv_rest += c.dstv_rest;
        sum.zap += c.zap;
        sum.zap_rest += c.zap_rest;
        sum.unitel += c.unitel;
        sum.unitel_rest += c.unitel_rest;
        sum.africell += c.africell;
        sum.africell_rest += c.africell_rest;
        sum.recharges += c.recharges;
        sum.acc += c.acc;
        sum.cash += c.cash;
        sum.coins += c.coins;
        sum.expenses += c.expenses;
        grand_total += report.grand_total;
    }
    ReportTotals {
        channels: sum,
        grand_total,
        report_count: reports.len() as i64,
    }
}

fn financials(sales: &SalesTotals, reports: &ReportTotals) -> Financials {
    let gross = sales.gross_total;
    let total_collected = reports.channels.total_collected();
    let operating_costs = round_money(gross * OPERATING_COST_RATE);
    let gross_profit = gross - operating_costs;
    let profit_margin = if gross.is_zero() {
        Decimal::ZERO
    } else {
        round_money(gross_profit / gross * Decimal::ONE_HUNDRED)
    };
    Financials {
        total_collected,
        cash_difference: total_collected - reports.grand_total,
        operating_costs,
        gross_profit,
        profit_margin,
    }
}

/// One entry per calendar day of the period
fn daily_sales(period: Period, sales: &[&SaleEntry]) -> Vec<DailySales> {
    let mut days: BTreeMap<_, _> = period
        .days()
        .map(|date| {
            (
                date,
                DailySales {
                    date,
                    total: Decimal::ZERO,
                    products: KindTotals::default(),
                    recharges: KindTotals::default(),
                    transactions: 0,
                },
            )
        })
        .collect();

    for sale in sales {
        if let Some(day) = days.get_mut(&sale.business_date) {
            match sale.item_kind {
                ItemKind::Product => add_sale(&mut day.products, sale),
                ItemKind::Recharge => add_sale(&mut day.recharges, sale),
            }
            day.total += sale.total_value;
            day.transactions += 1;
        }
    }
    days.into_values().collect()
}

fn average(total: Decimal, count: i64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        round_money(total / Decimal::from(count))
    }
}

fn item_ranking(sales: &[&SaleEntry], kind: ItemKind) -> Vec<ItemRanking> {
    let mut items: HashMap<i64, ItemRanking> = HashMap::new();
    for sale in sales.iter().filter(|s| s.item_kind == kind) {
        let item = items.entry(sale.item_id).or_insert_with(|| ItemRanking {
            item_id: sale.item_id,
            name: sale.item_name.clone(),
            unit_price: sale.unit_price,
            units_sold: 0,
            total_value: Decimal::ZERO,
            sales_count: 0,
            average_ticket: Decimal::ZERO,
        });
        // latest sale wins
        item.unit_price = sale.unit_price;
        item.units_sold += sale.quantity;
        item.total_value += sale.total_value;
        item.sales_count += 1;
    }

    let mut ranking: Vec<ItemRanking> = items
        .into_values()
        .map(|mut item| {
            item.average_ticket = average(item.total_value, item.sales_count);
            item
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    ranking.truncate(RANKING_SIZE);
    ranking
}

fn seller_ranking(sales: &[&SaleEntry]) -> Vec<SellerRanking> {
    let mut sellers: HashMap<i64, SellerRanking> = HashMap::new();
    for sale in sales {
        let seller = sellers
            .entry(sale.seller_id)
            .or_insert_with(|| SellerRanking {
                seller_id: sale.seller_id,
                name: sale.seller_name.clone(),
                email: sale.seller_email.clone(),
                sales_count: 0,
                total_value: Decimal::ZERO,
                average_ticket: Decimal::ZERO,
                product_sales: 0,
                recharge_sales: 0,
                performance: SellerPerformance::Low,
            });
        seller.sales_count += 1;
        seller.total_value += sale.total_value;
        match sale.item_kind {
            ItemKind::Product => seller.product_sales += 1,
            ItemKind::Recharge => seller.recharge_sales += 1,
        }
    }

    let mut ranking: Vec<SellerRanking> = sellers
        .into_values()
        .map(|mut seller| {
            seller.average_ticket = average(seller.total_value, seller.sales_count);
            seller.performance = SellerPerformance::from_total(seller.total_value);
            seller
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.seller_id.cmp(&b.seller_id))
    });
    ranking.truncate(RANKING_SIZE);
    ranking
}
