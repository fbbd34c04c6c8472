//! Daily Report Model (end-of-day cash and service-channel tally)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw amounts typed in by the store manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportChannels {
    /// Card terminal
    pub tpa: Decimal,
    pub dstv: Decimal,
    pub dstv_start: Decimal,
    pub dstv_rest: Decimal,
    pub zap: Decimal,
    pub zap_rest: Decimal,
    pub unitel: Decimal,
    pub unitel_rest: Decimal,
    pub africell: Decimal,
    pub africell_rest: Decimal,
    pub recharges: Decimal,
    /// Accessories / other sales
    pub acc: Decimal,
    /// Cash notes
    pub cash: Decimal,
    pub coins: Decimal,
    pub expenses: Decimal,
}

impl ReportChannels {
    /// dstv + zap + unitel + africell + recharges + acc
    pub fn grand_total(&self) -> Decimal {
        self.dstv + self.zap + self.unitel + self.africell + self.recharges + self.acc
    }

    /// cash + coins + tpa + expenses
    pub fn total_collected(&self) -> Decimal {
        self.cash + self.coins + self.tpa + self.expenses
    }

    /// A required channel is still zero
    pub fn has_empty_fields(&self) -> bool {
        [
            self.tpa,
            self.dstv,
            self.zap,
            self.unitel,
            self.africell,
            self.recharges,
            self.acc,
            self.cash,
            self.coins,
            self.expenses,
        ]
        .iter()
        .any(|v| v.is_zero())
    }

    /// Every raw channel amount
    pub fn amounts(&self) -> [Decimal; 15] {
        [
            self.tpa,
            self.dstv,
            self.dstv_start,
            self.dstv_rest,
            self.zap,
            self.zap_rest,
            self.unitel,
            self.unitel_rest,
            self.africell,
            self.africell_rest,
            self.recharges,
            self.acc,
            self.cash,
            self.coins,
            self.expenses,
        ]
    }

    /// Any amount below zero
    pub fn has_negative(&self) -> bool {
        self.amounts()
            .iter()
            .any(|v| v.is_sign_negative() && !v.is_zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Some required channel is still zero
    Pending,
    /// Collected covers the grand total
    Complete,
    /// Collected is short of the grand total
    Negative,
}

/// Daily report of one store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: i64,
    pub store_id: i64,
    pub report_date: NaiveDate,
    #[serde(flatten)]
    pub channels: ReportChannels,
    /// Recomputed on every save
    pub grand_total: Decimal,
    pub shortage_note: Option<String>,
    pub author_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Derived --
    pub total_collected: Decimal,
    /// grand_total − total_collected
    pub difference: Decimal,
    pub has_shortage: bool,
    pub status: ReportStatus,
}

impl DailyReport {
    /// Build a report and fill in the derived fields
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        store_id: i64,
        report_date: NaiveDate,
        channels: ReportChannels,
        shortage_note: Option<String>,
        author_id: Option<i64>,
        created_at: i64,
        updated_at: i64,
    ) -> Self {
        let grand_total = channels.grand_total();
        let total_collected = channels.total_collected();
        let difference = grand_total - total_collected;
        let status = report_status(&channels);
        Self {
            id,
            store_id,
            report_date,
            channels,
            grand_total,
            shortage_note,
            author_id,
            created_at,
            updated_at,
            total_collected,
            difference,
            has_shortage: difference > Decimal::ZERO,
            status,
        }
    }
}

/// Status of a set of channel amounts
pub fn report_status(channels: &ReportChannels) -> ReportStatus {
    if channels.has_empty_fields() {
        ReportStatus::Pending
    } else if channels.total_collected() >= channels.grand_total() {
        ReportStatus::Complete
    } else {
        ReportStatus::Negative
    }
}

/// Create daily report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReportCreate {
    /// Defaults to the caller's first managed store
    pub store_id: Option<i64>,
    pub report_date: NaiveDate,
    #[serde(flatten)]
    pub channels: ReportChannels,
    pub shortage_note: Option<String>,
}

/// Update daily report payload (replaces every channel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReportUpdate {
    #[serde(flatten)]
    pub channels: ReportChannels,
    pub shortage_note: Option<String>,
}

/// Daily report list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyReportQuery {
    pub store_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(units: i64) -> Decimal {
        Decimal::from(units)
    }

    fn filled() -> ReportChannels {
        ReportChannels {
            tpa: d(100),
            dstv: d(200),
            zap: d(100),
            unitel: d(50),
            africell: d(50),
            recharges: d(300),
            acc: d(100),
            cash: d(500),
            coins: d(50),
            expenses: d(50),
            ..Default::default()
        }
    }

    #[test]
    fn grand_total_and_collected() {
        let c = filled();
        assert_eq!(c.grand_total(), d(800));
        assert_eq!(c.total_collected(), d(700));
    }

    #[test]
    fn status_rules() {
        let mut c = filled();
        // 700 collected < 800 declared
        assert_eq!(report_status(&c), ReportStatus::Negative);

        c.cash = d(600);
        assert_eq!(report_status(&c), ReportStatus::Complete);

        c.coins = Decimal::ZERO;
        assert_eq!(report_status(&c), ReportStatus::Pending);
    }

    #[test]
    fn derived_fields_on_new() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let report = DailyReport::new(1, 2, date, filled(), None, Some(3), 0, 0);
        assert_eq!(report.grand_total, d(800));
        assert_eq!(report.difference, d(100));
        assert!(report.has_shortage);
        assert_eq!(report.status, ReportStatus::Negative);
    }

    #[test]
    fn flattened_channels_deserialize_with_defaults() {
        let json = r#"{"report_date":"2024-03-01","dstv":150.5,"cash":20}"#;
        let payload: DailyReportCreate = serde_json::from_str(json).unwrap();
        assert_eq!(payload.store_id, None);
        assert_eq!(payload.channels.dstv, Decimal::new(1505, 1));
        assert_eq!(payload.channels.cash, d(20));
        assert!(payload.channels.zap.is_zero());
    }

    #[test]
    fn negative_amounts_detected() {
        let mut c = filled();
        assert!(!c.has_negative());
        c.zap_rest = d(-1);
        assert!(c.has_negative());
    }
}
