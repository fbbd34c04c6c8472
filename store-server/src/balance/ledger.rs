//! Ledger sources read by the balance aggregator

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{DailyReport, SaleEntry};
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, daily_report, sale};

/// Sales of a store by business date
#[async_trait]
pub trait SalesLedger: Send + Sync {
    /// Every sale with `start <= business_date <= end`
    async fn sales_between(
        &self,
        store_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<SaleEntry>>;
}

/// Daily reports of a store by report date
#[async_trait]
pub trait DailyReportLedger: Send + Sync {
    async fn reports_between(
        &self,
        store_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DailyReport>>;
}

/// Both ledgers over the SQLite pool
#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalesLedger for SqliteLedger {
    async fn sales_between(
        &self,
        store_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<SaleEntry>> {
        sale::entries_between(&self.pool, store_id, start, end).await
    }
}

#[async_trait]
impl DailyReportLedger for SqliteLedger {
    async fn reports_between(
        &self,
        store_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DailyReport>> {
        daily_report::find_between(&self.pool, store_id, start, end).await
    }
}
