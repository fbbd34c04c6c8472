//! Balance operations: generate, custom ranges, refresh on read

use chrono::NaiveDate;
use shared::models::{
    Balance, BalanceCustomCreate, BalanceDetail, BalanceGenerate, BalancePreviewQuery,
    BalanceQuery, BalanceSnapshot, Period, PeriodKind,
};
use sqlx::SqlitePool;

use super::aggregator::{BalanceAggregator, empty_snapshot};
use crate::auth::{CurrentUser, accessible_store_ids, default_store_for, ensure_store_access};
use crate::auth::access::narrow_to_store;
use crate::db::repository::{RepoError, balance as repo, store};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct BalanceService {
    pool: SqlitePool,
    aggregator: BalanceAggregator,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::BalanceNotFound, format!("Balance {id} not found"))
}

impl BalanceService {
    pub fn new(pool: SqlitePool) -> Self {
        let aggregator = BalanceAggregator::sqlite(pool.clone());
        Self { pool, aggregator }
    }

    /// Balance of the current daily/weekly/monthly/yearly period.
    ///
    /// Creates it on first call, refreshes end date and snapshot afterwards.
    pub async fn generate(
        &self,
        user: &CurrentUser,
        payload: BalanceGenerate,
        today: NaiveDate,
    ) -> AppResult<BalanceDetail> {
        let period = Period::current(payload.period_kind, today)?;
        let store_id = default_store_for(&self.pool, user, payload.store_id).await?;
        let snapshot = self.aggregator.recompute(store_id, period).await?;

        let id = match repo::find_by_key(&self.pool, store_id, period.kind, period.start).await? {
            Some(existing) => {
                repo::save_snapshot(&self.pool, existing.id, &snapshot).await?;
                existing.id
            }
            None => {
                let header = repo::NewBalance {
                    store_id,
                    period,
                    description: format!("{} balance {}", period.kind, period.description()),
                    created_by: Some(user.id),
                };
                match repo::insert(&self.pool, &header, &snapshot).await {
                    Ok(id) => id,
                    // generated concurrently
                    Err(RepoError::Duplicate(_)) => {
                        let existing =
                            repo::find_by_key(&self.pool, store_id, period.kind, period.start)
                                .await?
                                .ok_or_else(|| {
                                    AppError::database("Balance vanished during generate")
                                })?;
                        repo::save_snapshot(&self.pool, existing.id, &snapshot).await?;
                        existing.id
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        tracing::info!(balance_id = id, store_id, kind = %period.kind, "Balance generated");
        self.detail(id, snapshot).await
    }

    /// Balance over an explicit range; one per store and start date
    pub async fn create_custom(
        &self,
        user: &CurrentUser,
        payload: BalanceCustomCreate,
    ) -> AppResult<BalanceDetail> {
        let period = Period::custom(payload.start_date, payload.end_date)?;
        validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
        let store_id = default_store_for(&self.pool, user, payload.store_id).await?;

        if let Some(existing) =
            repo::find_by_key(&self.pool, store_id, PeriodKind::Custom, period.start).await?
        {
            return Err(AppError::with_message(
                ErrorCode::BalanceAlreadyExists,
                "A custom balance for this store and start date already exists",
            )
            .with_detail("balance_id", existing.id));
        }

        let snapshot = self.aggregator.recompute(store_id, period).await?;
        let description = payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("custom balance {}", period.description()));
        let header = repo::NewBalance {
            store_id,
            period,
            description,
            created_by: Some(user.id),
        };
        let id = repo::insert(&self.pool, &header, &snapshot)
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => AppError::new(ErrorCode::BalanceAlreadyExists),
                other => other.into(),
            })?;

        tracing::info!(balance_id = id, store_id, "Custom balance created");
        self.detail(id, snapshot).await
    }

    /// Header plus a freshly recomputed snapshot.
    ///
    /// The stored snapshot is rewritten only when it changed. A ledger failure
    /// returns zeros and leaves the stored snapshot alone.
    pub async fn get(&self, user: &CurrentUser, id: i64) -> AppResult<BalanceDetail> {
        let balance = repo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_store_access(&self.pool, user, balance.store_id).await?;

        let period = balance.period();
        match self.aggregator.recompute(balance.store_id, period).await {
            Ok(fresh) => {
                let stored = repo::load_snapshot(&self.pool, &balance).await?;
                if stored == fresh {
                    return Ok(BalanceDetail {
                        balance,
                        snapshot: fresh,
                    });
                }
                repo::save_snapshot(&self.pool, id, &fresh).await?;
                tracing::debug!(balance_id = id, "Balance snapshot refreshed");
                self.detail(id, fresh).await
            }
            Err(e) => {
                tracing::warn!(
                    balance_id = id,
                    error = %e,
                    "Balance recompute failed, returning empty snapshot"
                );
                Ok(BalanceDetail {
                    snapshot: empty_snapshot(balance.store_id, period),
                    balance,
                })
            }
        }
    }

    /// Visible balances, newest periods first
    pub async fn list(&self, user: &CurrentUser, query: &BalanceQuery) -> AppResult<Vec<Balance>> {
        if let Some(month) = query.month
            && !(1..=12).contains(&month)
        {
            return Err(AppError::validation("month must be between 1 and 12"));
        }
        let visible = accessible_store_ids(&self.pool, user).await?;
        let stores = narrow_to_store(visible, query.store_id);
        Ok(repo::find(&self.pool, stores.as_deref(), query).await?)
    }

    pub async fn delete(&self, user: &CurrentUser, id: i64) -> AppResult<bool> {
        let balance = repo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        ensure_store_access(&self.pool, user, balance.store_id).await?;
        let deleted = repo::delete(&self.pool, id).await?;
        if deleted {
            tracing::info!(balance_id = id, store_id = balance.store_id, "Balance deleted");
        }
        Ok(deleted)
    }

    /// Recompute without persisting
    pub async fn preview(
        &self,
        user: &CurrentUser,
        query: &BalancePreviewQuery,
    ) -> AppResult<BalanceSnapshot> {
        let period = Period::custom(query.start, query.end)?;
        store::find_by_id(&self.pool, query.store_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
        ensure_store_access(&self.pool, user, query.store_id).await?;
        Ok(self.aggregator.recompute_or_empty(query.store_id, period).await)
    }

    async fn detail(&self, id: i64, snapshot: BalanceSnapshot) -> AppResult<BalanceDetail> {
        let balance = repo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(BalanceDetail { balance, snapshot })
    }
}
