//! Balance Model (period summary of sales and daily reports)

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::daily_report::ReportChannels;
use super::stock::ItemKind;
use crate::error::{AppError, ErrorCode};
use crate::money::round_money;

/// Profit above which a balance is `positive`
pub const POSITIVE_PROFIT_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// DSTV net is expected back with a 5% commission (1.05)
pub const DSTV_COMMISSION_RATE: Decimal = Decimal::from_parts(105, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest custom range in days; a leap year is the largest generated period
pub const MAX_CUSTOM_DAYS: i64 = 366;

/// Closed date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// The period of `kind` containing `today`.
    ///
    /// Weeks start on Monday. `Custom` has no implicit range.
    pub fn current(kind: PeriodKind, today: NaiveDate) -> Result<Self, AppError> {
        let (start, end) = match kind {
            PeriodKind::Daily => (today, today),
            PeriodKind::Weekly => {
                let offset = u64::from(today.weekday().num_days_from_monday());
                let start = today - Days::new(offset);
                (start, start + Days::new(6))
            }
            PeriodKind::Monthly => {
                let start = today.with_day(1).unwrap_or(today);
                (start, last_day_of_month(today.year(), today.month()))
            }
            PeriodKind::Yearly => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
            PeriodKind::Custom => {
                return Err(AppError::with_message(
                    ErrorCode::InvalidPeriod,
                    "Custom periods need explicit start and end dates",
                ));
            }
        };
        Ok(Self { kind, start, end })
    }

    /// Explicit range, `start <= end`, at most `MAX_CUSTOM_DAYS` long
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::with_message(
                ErrorCode::InvalidPeriod,
                "Start date must not be after end date",
            )
            .with_detail("start", start.to_string())
            .with_detail("end", end.to_string()));
        }
        let period = Self {
            kind: PeriodKind::Custom,
            start,
            end,
        };
        if period.day_count() > MAX_CUSTOM_DAYS {
            return Err(AppError::with_message(
                ErrorCode::InvalidPeriod,
                format!("Custom periods cover at most {MAX_CUSTOM_DAYS} days"),
            )
            .with_detail("days", period.day_count())
            .with_detail("max", MAX_CUSTOM_DAYS));
        }
        Ok(period)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day, inclusive
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// "01/01/2024 - 07/01/2024"
    pub fn description(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// One sale as seen by the balance computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEntry {
    pub sale_id: i64,
    pub item_kind: ItemKind,
    pub item_id: i64,
    pub item_name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub total_value: Decimal,
    pub seller_id: i64,
    pub seller_name: String,
    pub seller_email: String,
    pub business_date: NaiveDate,
}

/// Value and number of sales of one item kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindTotals {
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesTotals {
    pub products: KindTotals,
    pub recharges: KindTotals,
    pub gross_total: Decimal,
    /// Number of sale rows, not units
    pub transactions: i64,
}

/// Sums of every daily report channel over the period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    #[serde(flatten)]
    pub channels: ReportChannels,
    pub grand_total: Decimal,
    pub report_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    /// cash + coins + tpa + expenses
    pub total_collected: Decimal,
    /// total_collected − grand_total
    pub cash_difference: Decimal,
    /// 30% of gross sales
    pub operating_costs: Decimal,
    pub gross_profit: Decimal,
    /// Percent, 2 dp; 0 when there are no sales
    pub profit_margin: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl BalanceStatus {
    pub fn from_profit(profit: Decimal) -> Self {
        if profit > POSITIVE_PROFIT_THRESHOLD {
            Self::Positive
        } else if profit < Decimal::ZERO {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Shortage,
    #[default]
    Positive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DstvBreakdown {
    pub total: Decimal,
    pub start: Decimal,
    pub rest: Decimal,
    /// total − rest
    pub net: Decimal,
    /// net × 1.05
    pub with_commission: Decimal,
    /// with_commission − total
    pub difference: Decimal,
    pub status: ChannelStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelNet {
    pub total: Decimal,
    pub rest: Decimal,
    /// total − rest
    pub net: Decimal,
}

/// Per-channel view of the period's daily reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelBreakdown {
    pub dstv: DstvBreakdown,
    pub zap: ChannelNet,
    pub unitel: ChannelNet,
    pub africell: ChannelNet,
    pub cash: Decimal,
    pub coins: Decimal,
    pub tpa: Decimal,
    pub expenses: Decimal,
    pub grand_total: Decimal,
    pub total_collected: Decimal,
    pub reconciliation_status: ChannelStatus,
    /// |grand_total − total_collected|
    pub reconciliation_difference: Decimal,
    /// dstv + zap
    pub tv_services_total: Decimal,
    /// unitel + africell
    pub telephony_total: Decimal,
    pub rests_total: Decimal,
}

impl ChannelBreakdown {
    /// Derive the per-channel view from the period's report sums
    pub fn from_totals(totals: &ReportTotals) -> Self {
        let c = &totals.channels;

        let dstv_net = c.dstv - c.dstv_rest;
        let with_commission = round_money(dstv_net * DSTV_COMMISSION_RATE);
        let dstv_difference = with_commission - c.dstv;
        let dstv = DstvBreakdown {
            total: c.dstv,
            start: c.dstv_start,
            rest: c.dstv_rest,
            net: dstv_net,
            with_commission,
            difference: dstv_difference,
            status: if dstv_difference > Decimal::ZERO {
                ChannelStatus::Shortage
            } else {
                ChannelStatus::Positive
            },
        };

        let net = |total: Decimal, rest: Decimal| ChannelNet {
            total,
            rest,
            net: total - rest,
        };

        let total_collected = c.total_collected();
        let grand_total = totals.grand_total;
        Self {
            dstv,
            zap: net(c.zap, c.zap_rest),
            unitel: net(c.unitel, c.unitel_rest),
            africell: net(c.africell, c.africell_rest),
            cash: c.cash,
            coins: c.coins,
            tpa: c.tpa,
            expenses: c.expenses,
            grand_total,
            total_collected,
            reconciliation_status: if grand_total > total_collected {
                ChannelStatus::Shortage
            } else {
                ChannelStatus::Positive
            },
            reconciliation_difference: (grand_total - total_collected).abs(),
            tv_services_total: c.dstv + c.zap,
            telephony_total: c.unitel + c.africell,
            rests_total: c.dstv_rest + c.zap_rest + c.unitel_rest + c.africell_rest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: Decimal,
    pub products: KindTotals,
    pub recharges: KindTotals,
    pub transactions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportSummary {
    pub date: NaiveDate,
    pub grand_total: Decimal,
    pub total_collected: Decimal,
    pub cash: Decimal,
    pub coins: Decimal,
    pub tpa: Decimal,
    pub expenses: Decimal,
}

/// Top-10 entry for products and recharges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRanking {
    pub item_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub units_sold: i64,
    pub total_value: Decimal,
    pub sales_count: i64,
    /// total_value / sales_count
    pub average_ticket: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerPerformance {
    High,
    Medium,
    Low,
}

impl SellerPerformance {
    pub fn from_total(total: Decimal) -> Self {
        if total > Decimal::from(1000) {
            Self::High
        } else if total > Decimal::from(500) {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Top-10 entry for sellers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRanking {
    pub seller_id: i64,
    pub name: String,
    pub email: String,
    pub sales_count: i64,
    pub total_value: Decimal,
    pub average_ticket: Decimal,
    pub product_sales: i64,
    pub recharge_sales: i64,
    pub performance: SellerPerformance,
}

/// Everything the balance computation derives for one store and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub store_id: i64,
    pub period: Period,
    pub sales: SalesTotals,
    pub reports: ReportTotals,
    pub financials: Financials,
    pub status: BalanceStatus,
    pub channels: ChannelBreakdown,
    pub daily_sales: Vec<DailySales>,
    pub daily_reports: Vec<DailyReportSummary>,
    pub top_products: Vec<ItemRanking>,
    pub top_recharges: Vec<ItemRanking>,
    pub top_sellers: Vec<SellerRanking>,
}

/// Persisted balance header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub id: i64,
    pub store_id: i64,
    pub store_name: String,
    pub period_kind: PeriodKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub status: BalanceStatus,
    pub gross_total: Decimal,
    pub gross_profit: Decimal,
    pub profit_margin: Decimal,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Balance {
    pub fn period(&self) -> Period {
        Period {
            kind: self.period_kind,
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// Balance header plus its refreshed snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceDetail {
    #[serde(flatten)]
    pub balance: Balance,
    pub snapshot: BalanceSnapshot,
}

/// Quick generation for the current daily/weekly/monthly/yearly period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceGenerate {
    pub store_id: Option<i64>,
    pub period_kind: PeriodKind,
}

/// Balance over an explicit date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceCustomCreate {
    pub store_id: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

/// Balance list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceQuery {
    pub kind: Option<PeriodKind>,
    pub store_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Non-persisted recompute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancePreviewQuery {
    pub store_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_starts_on_monday() {
        // 2024-01-04 is a Thursday
        let p = Period::current(PeriodKind::Weekly, date(2024, 1, 4)).unwrap();
        assert_eq!(p.start, date(2024, 1, 1));
        assert_eq!(p.end, date(2024, 1, 7));

        // Sunday belongs to the week that started six days earlier
        let p = Period::current(PeriodKind::Weekly, date(2024, 1, 7)).unwrap();
        assert_eq!(p.start, date(2024, 1, 1));
    }

    #[test]
    fn monthly_covers_last_day() {
        let p = Period::current(PeriodKind::Monthly, date(2024, 2, 10)).unwrap();
        assert_eq!(p.start, date(2024, 2, 1));
        assert_eq!(p.end, date(2024, 2, 29));

        let p = Period::current(PeriodKind::Monthly, date(2023, 2, 10)).unwrap();
        assert_eq!(p.end, date(2023, 2, 28));

        let p = Period::current(PeriodKind::Monthly, date(2024, 12, 31)).unwrap();
        assert_eq!(p.start, date(2024, 12, 1));
        assert_eq!(p.end, date(2024, 12, 31));
    }

    #[test]
    fn daily_and_yearly() {
        let today = date(2024, 6, 15);
        let p = Period::current(PeriodKind::Daily, today).unwrap();
        assert_eq!((p.start, p.end), (today, today));

        let p = Period::current(PeriodKind::Yearly, today).unwrap();
        assert_eq!((p.start, p.end), (date(2024, 1, 1), date(2024, 12, 31)));
        assert_eq!(p.day_count(), 366);
    }

    #[test]
    fn custom_requires_ordered_dates() {
        assert!(Period::current(PeriodKind::Custom, date(2024, 1, 1)).is_err());

        let err = Period::custom(date(2024, 1, 2), date(2024, 1, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPeriod);

        let p = Period::custom(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(p.days().count(), 1);
    }

    #[test]
    fn custom_range_is_capped() {
        let leap_year = Period::custom(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(leap_year.day_count(), MAX_CUSTOM_DAYS);

        let err = Period::custom(date(2024, 1, 1), date(2025, 1, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPeriod);
        assert_eq!(err.details.unwrap()["days"], 367);

        let whole_calendar = Period::custom(date(1, 1, 1), date(9999, 12, 31));
        assert_eq!(whole_calendar.unwrap_err().code, ErrorCode::InvalidPeriod);
    }

    #[test]
    fn days_iterates_inclusive_range() {
        let p = Period::custom(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        let days: Vec<_> = p.days().collect();
        assert_eq!(
            days,
            vec![date(2024, 2, 27), date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
        );
        assert!(p.contains(date(2024, 2, 29)));
        assert!(!p.contains(date(2024, 3, 2)));
        assert_eq!(p.description(), "27/02/2024 - 01/03/2024");
    }

    #[test]
    fn channel_breakdown_from_totals() {
        let totals = ReportTotals {
            channels: ReportChannels {
                dstv: Decimal::from(1000),
                dstv_rest: Decimal::from(100),
                zap: Decimal::from(300),
                zap_rest: Decimal::from(50),
                unitel: Decimal::from(200),
                africell: Decimal::from(100),
                africell_rest: Decimal::from(10),
                cash: Decimal::from(1200),
                coins: Decimal::from(50),
                ..Default::default()
            },
            grand_total: Decimal::from(1600),
            report_count: 2,
        };
        let b = ChannelBreakdown::from_totals(&totals);

        // 900 x 1.05 = 945, 945 - 1000 = -55
        assert_eq!(b.dstv.net, Decimal::from(900));
        assert_eq!(b.dstv.with_commission, Decimal::from(945));
        assert_eq!(b.dstv.difference, Decimal::from(-55));
        assert_eq!(b.dstv.status, ChannelStatus::Positive);
        assert_eq!(b.zap.net, Decimal::from(250));
        assert_eq!(b.total_collected, Decimal::from(1250));
        assert_eq!(b.reconciliation_status, ChannelStatus::Shortage);
        assert_eq!(b.reconciliation_difference, Decimal::from(350));
        assert_eq!(b.tv_services_total, Decimal::from(1300));
        assert_eq!(b.telephony_total, Decimal::from(300));
        assert_eq!(b.rests_total, Decimal::from(160));
    }

    #[test]
    fn status_and_performance_thresholds() {
        assert_eq!(BalanceStatus::from_profit(Decimal::from(1001)), BalanceStatus::Positive);
        assert_eq!(BalanceStatus::from_profit(Decimal::from(1000)), BalanceStatus::Neutral);
        assert_eq!(BalanceStatus::from_profit(Decimal::ZERO), BalanceStatus::Neutral);
        assert_eq!(BalanceStatus::from_profit(Decimal::new(-1, 2)), BalanceStatus::Negative);

        assert_eq!(SellerPerformance::from_total(Decimal::from(1500)), SellerPerformance::High);
        assert_eq!(SellerPerformance::from_total(Decimal::from(1000)), SellerPerformance::Medium);
        assert_eq!(SellerPerformance::from_total(Decimal::from(500)), SellerPerformance::Low);
    }
}
