//! Repository Module
//!
//! Free async functions over a `SqlitePool`, one module per table group.
//! Money columns are integer cents; each module converts its rows into the
//! `shared::models` types.

pub mod account;
pub mod balance;
pub mod catalog;
pub mod daily_report;
pub mod sale;
pub mod stock;
pub mod stock_movement;
pub mod store;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Insufficient stock. Available: {available}, requested: {requested}")]
    InsufficientStock { available: i64, requested: i64 },
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::OutOfRange(msg) => AppError::with_message(ErrorCode::ValueOutOfRange, msg),
            RepoError::InsufficientStock {
                available,
                requested,
            } => AppError::insufficient_stock(available, requested),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Amount as integer cents for a money column
pub(crate) fn cents(value: rust_decimal::Decimal, column: &str) -> RepoResult<i64> {
    shared::money::to_cents(value).ok_or_else(|| {
        RepoError::OutOfRange(format!("{column} {value} does not fit in a money column"))
    })
}

/// Decode an enum stored as TEXT
pub(crate) fn parse_column<T>(
    value: &str,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> RepoResult<T> {
    parse(value).ok_or_else(|| RepoError::Database(format!("Invalid {column} value: {value}")))
}

/// Decode a `YYYY-MM-DD` column
pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RepoError::Database(format!("Invalid {column} date: {value}")))
}

/// Joins resolving the catalog row of `{alias}.item_kind` / `{alias}.item_id`
/// as `p` (product) or `r` (recharge).
pub(crate) fn item_join(alias: &str) -> String {
    format!(
        "LEFT JOIN product p ON {alias}.item_kind = 'product' AND p.id = {alias}.item_id \
         LEFT JOIN recharge r ON {alias}.item_kind = 'recharge' AND r.id = {alias}.item_id"
    )
}

/// Item name / current price columns matching [`item_join`]
pub(crate) const ITEM_NAME: &str = "COALESCE(p.name, r.name, '')";
pub(crate) const ITEM_PRICE: &str = "COALESCE(p.price, r.price, 0)";

/// `(?, ?, ?)` for an `IN` list of `n` items
pub(crate) fn placeholders(n: usize) -> String {
    let marks = vec!["?"; n].join(", ");
    format!("({marks})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_app_errors() {
        let err: AppError = RepoError::InsufficientStock {
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Insufficient stock. Available: 3, requested: 5");

        let err: AppError = RepoError::Duplicate("x".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        let err: AppError = RepoError::Validation("bad".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let err: AppError = RepoError::OutOfRange("total".into()).into();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn cents_are_checked() {
        assert_eq!(cents(rust_decimal::Decimal::new(1999, 2), "price").unwrap(), 1999);
        let huge = rust_decimal::Decimal::from(100_000_000_000_000_000_i64);
        assert!(matches!(cents(huge, "total_value"), Err(RepoError::OutOfRange(_))));
    }

    #[test]
    fn helpers() {
        assert_eq!(placeholders(3), "(?, ?, ?)");
        assert!(parse_date("2024-02-30", "d").is_err());
        assert_eq!(
            parse_column("product", "item_kind", shared::models::ItemKind::parse).unwrap(),
            shared::models::ItemKind::Product
        );
    }
}
