//! Daily reports
//!
//! One end-of-day tally per store and date. The recharge channel is
//! prefilled from the day's sales, and a report that collects less than it
//! declares must explain the shortage.

use rust_decimal::Decimal;
use shared::models::{
    DailyReport, DailyReportCreate, DailyReportQuery, DailyReportUpdate, ReportChannels,
};
use sqlx::SqlitePool;

use crate::auth::access::narrow_to_store;
use crate::auth::{CurrentUser, accessible_store_ids, default_store_for, ensure_store_access};
use crate::db::repository::{RepoError, daily_report, sale};
use crate::utils::validation::{MAX_NOTE_LEN, validate_amount_cap, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};

fn report_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ReportNotFound).with_detail("id", id)
}

/// Trimmed note, `None` when blank
fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Amounts must be non-negative and a shortage needs a note
fn check_channels(channels: &ReportChannels, note: Option<&str>) -> AppResult<()> {
    if channels.has_negative() {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Report amounts must not be negative",
        ));
    }
    for amount in channels.amounts() {
        validate_amount_cap(amount, "report amount")?;
    }
    let difference = channels.grand_total() - channels.total_collected();
    if difference > Decimal::ZERO && note.is_none() {
        return Err(AppError::new(ErrorCode::ShortageNoteRequired).with_detail(
            "difference",
            difference.to_string(),
        ));
    }
    Ok(())
}

async fn find_visible(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<DailyReport> {
    let report = daily_report::find_by_id(pool, id)
        .await?
        .ok_or_else(|| report_not_found(id))?;
    ensure_store_access(pool, user, report.store_id).await?;
    Ok(report)
}

/// Only the author or a superuser may change a report
fn ensure_author(user: &CurrentUser, report: &DailyReport) -> AppResult<()> {
    if user.is_superuser() || report.author_id == Some(user.id) {
        return Ok(());
    }
    Err(AppError::new(ErrorCode::NotAuthor).with_detail("report_id", report.id))
}

pub async fn create(
    pool: &SqlitePool,
    user: &CurrentUser,
    payload: DailyReportCreate,
) -> AppResult<DailyReport> {
    validate_optional_text(&payload.shortage_note, "shortage_note", MAX_NOTE_LEN)?;
    let store_id = default_store_for(pool, user, payload.store_id).await?;

    let mut channels = payload.channels;
    if channels.recharges.is_zero() {
        let day = sale::day_total(pool, store_id, payload.report_date).await?;
        if day.sales_count > 0 {
            channels.recharges = day.total_value;
        }
    }

    let note = clean_note(payload.shortage_note);
    check_channels(&channels, note.as_deref())?;

    let report = daily_report::create(
        pool,
        store_id,
        payload.report_date,
        &channels,
        note.as_deref(),
        user.id,
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::ReportAlreadyExists)
            .with_detail("store_id", store_id)
            .with_detail("report_date", payload.report_date.to_string()),
        other => other.into(),
    })?;

    tracing::info!(
        report_id = report.id,
        store_id,
        report_date = %report.report_date,
        status = ?report.status,
        "Daily report created"
    );
    Ok(report)
}

pub async fn update(
    pool: &SqlitePool,
    user: &CurrentUser,
    id: i64,
    payload: DailyReportUpdate,
) -> AppResult<DailyReport> {
    validate_optional_text(&payload.shortage_note, "shortage_note", MAX_NOTE_LEN)?;
    let existing = find_visible(pool, user, id).await?;
    ensure_author(user, &existing)?;

    let note = clean_note(payload.shortage_note);
    check_channels(&payload.channels, note.as_deref())?;

    let report = daily_report::update(pool, id, &payload.channels, note.as_deref()).await?;
    tracing::info!(report_id = id, status = ?report.status, "Daily report updated");
    Ok(report)
}

pub async fn delete(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<bool> {
    let existing = find_visible(pool, user, id).await?;
    ensure_author(user, &existing)?;
    let deleted = daily_report::delete(pool, id).await?;
    if deleted {
        tracing::info!(report_id = id, "Daily report deleted");
    }
    Ok(deleted)
}

pub async fn get(pool: &SqlitePool, user: &CurrentUser, id: i64) -> AppResult<DailyReport> {
    find_visible(pool, user, id).await
}

/// Reports of the visible stores
pub async fn list(
    pool: &SqlitePool,
    user: &CurrentUser,
    query: &DailyReportQuery,
) -> AppResult<Vec<DailyReport>> {
    let visible = accessible_store_ids(pool, user).await?;
    let stores = narrow_to_store(visible, query.store_id);
    Ok(daily_report::find(pool, stores.as_deref(), query).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::services::sales::register_sale;
    use crate::services::stock::register_entry;
    use crate::services::testing::seed;
    use chrono::NaiveDate;
    use shared::models::{ItemKind, ReportStatus, SaleCreate, StockEntryCreate};

    // 2024-01-01T10:00:00Z
    const NOW: i64 = 1_704_103_200_000;

    fn d(units: i64) -> Decimal {
        Decimal::from(units)
    }

    fn jan_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Every required channel filled, collected 800 = declared 800
    fn balanced() -> ReportChannels {
        ReportChannels {
            tpa: d(100),
            dstv: d(200),
            zap: d(100),
            unitel: d(50),
            africell: d(50),
            recharges: d(300),
            acc: d(100),
            cash: d(600),
            coins: d(50),
            expenses: d(50),
            ..Default::default()
        }
    }

    fn payload(store_id: i64, channels: ReportChannels, note: Option<&str>) -> DailyReportCreate {
        DailyReportCreate {
            store_id: Some(store_id),
            report_date: jan_first(),
            channels,
            shortage_note: note.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_computes_derived_fields() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;

        let report = create(&db.pool, &s.manager, payload(s.store_id, balanced(), None))
            .await
            .unwrap();
        assert_eq!(report.grand_total, d(800));
        assert_eq!(report.total_collected, d(800));
        assert_eq!(report.difference, Decimal::ZERO);
        assert!(!report.has_shortage);
        assert_eq!(report.status, ReportStatus::Complete);
        assert_eq!(report.author_id, Some(s.manager.id));

        let err = create(&db.pool, &s.manager, payload(s.store_id, balanced(), None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ReportAlreadyExists);
    }

    #[tokio::test]
    async fn shortage_requires_a_note() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;
        let mut short = balanced();
        short.cash = d(500);

        let err = create(&db.pool, &s.manager, payload(s.store_id, short.clone(), Some("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ShortageNoteRequired);

        let report = create(
            &db.pool,
            &s.manager,
            payload(s.store_id, short, Some("Troco em falta")),
        )
        .await
        .unwrap();
        assert!(report.has_shortage);
        assert_eq!(report.difference, d(100));
        assert_eq!(report.status, ReportStatus::Negative);
        assert_eq!(report.shortage_note.as_deref(), Some("Troco em falta"));

        let mut negative = balanced();
        negative.coins = d(-5);
        let err = update(
            &db.pool,
            &s.manager,
            report.id,
            DailyReportUpdate {
                channels: negative,
                shortage_note: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let mut oversized = balanced();
        oversized.cash = Decimal::from(10_000_000_000_000_000_i64);
        let err = update(
            &db.pool,
            &s.manager,
            report.id,
            DailyReportUpdate {
                channels: oversized,
                shortage_note: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[tokio::test]
    async fn recharges_prefilled_from_sales() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;
        let line = register_entry(
            &db.pool,
            &s.admin,
            StockEntryCreate {
                store_id: s.store_id,
                item_kind: ItemKind::Product,
                item_id: s.product_id,
                quantity: 5,
                unit_cost: Decimal::ZERO,
                unit_sale_price: None,
                reason: None,
                reason_detail: None,
                supplier: None,
                invoice_number: None,
            },
        )
        .await
        .unwrap();
        register_sale(
            &db.pool,
            &s.manager,
            SaleCreate {
                stock_line_id: line.stock_line_id,
                item_kind: ItemKind::Product,
                quantity: 3,
                note: None,
            },
            NOW,
        )
        .await
        .unwrap();

        let mut channels = balanced();
        channels.recharges = Decimal::ZERO;
        let report = create(&db.pool, &s.manager, payload(s.store_id, channels, Some("ok")))
            .await
            .unwrap();
        assert_eq!(report.channels.recharges, d(300));
        assert_eq!(report.grand_total, d(800));

        // nothing sold in the other store, so it stays pending
        let mut channels = balanced();
        channels.recharges = Decimal::ZERO;
        let report = create(&db.pool, &s.admin, payload(s.other_store, channels, None))
            .await
            .unwrap();
        assert!(report.channels.recharges.is_zero());
        assert_eq!(report.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn only_author_or_superuser_may_change() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;
        let report = create(&db.pool, &s.admin, payload(s.store_id, balanced(), None))
            .await
            .unwrap();

        // the manager can read it but did not write it
        assert_eq!(get(&db.pool, &s.manager, report.id).await.unwrap().id, report.id);
        let err = update(
            &db.pool,
            &s.manager,
            report.id,
            DailyReportUpdate {
                channels: balanced(),
                shortage_note: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthor);
        let err = delete(&db.pool, &s.manager, report.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthor);

        let err = get(&db.pool, &s.outsider, report.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreAccessDenied);

        let mut changed = balanced();
        changed.acc = d(150);
        changed.cash = d(650);
        let updated = update(
            &db.pool,
            &s.admin,
            report.id,
            DailyReportUpdate {
                channels: changed,
                shortage_note: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.grand_total, d(850));

        assert!(delete(&db.pool, &s.admin, report.id).await.unwrap());
        let err = get(&db.pool, &s.admin, report.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReportNotFound);
    }

    #[tokio::test]
    async fn listing_is_filtered_by_access() {
        let db = DbService::in_memory().await.unwrap();
        let s = seed(&db.pool).await;
        create(&db.pool, &s.admin, payload(s.store_id, balanced(), None))
            .await
            .unwrap();
        create(&db.pool, &s.admin, payload(s.other_store, balanced(), None))
            .await
            .unwrap();

        let all = DailyReportQuery::default();
        assert_eq!(list(&db.pool, &s.admin, &all).await.unwrap().len(), 2);
        let mine = list(&db.pool, &s.manager, &all).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].store_id, s.store_id);
        assert!(list(&db.pool, &s.outsider, &all).await.unwrap().is_empty());

        let elsewhere = DailyReportQuery {
            store_id: Some(s.other_store),
            ..Default::default()
        };
        assert!(list(&db.pool, &s.manager, &elsewhere).await.unwrap().is_empty());
    }
}
