//! Balance engine
//!
//! - `ledger`: where sales and daily reports come from
//! - `aggregator`: pure snapshot computation and recompute
//! - `service`: persistence flow used by the API

pub mod aggregator;
pub mod ledger;
pub mod service;

pub use aggregator::{BalanceAggregator, compute_snapshot, empty_snapshot};
pub use ledger::{DailyReportLedger, SalesLedger, SqliteLedger};
pub use service::BalanceService;
