//! Input validation helpers
//!
//! Text length limits and money checks shared by the handlers.
//! SQLite TEXT has no built-in length enforcement.

use rust_decimal::Decimal;
use shared::money::{DECIMAL_PLACES, decimal_places};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: store, product, recharge, account full name
pub const MAX_NAME_LEN: usize = 200;

/// Notes, reasons, shortage explanations, balance descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Usernames, neighborhoods, cities, supplier names, invoice numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_PASSWORD_LEN: usize = 6;

// ── Amount limits ───────────────────────────────────────────────────

/// Largest accepted price, unit cost or report amount (1,000,000,000.00)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest quantity accepted in one sale, movement or count
pub const MAX_QUANTITY: i64 = 1_000_000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Non-negative amount with at most two decimals
pub fn validate_price(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::with_message(
            shared::ErrorCode::InvalidPrice,
            format!("{field} must not be negative"),
        ));
    }
    if decimal_places(value) > DECIMAL_PLACES {
        return Err(AppError::with_message(
            shared::ErrorCode::InvalidPrice,
            format!("{field} must have at most {DECIMAL_PLACES} decimal places"),
        ));
    }
    validate_amount_cap(value, field)
}

/// Amount no larger than `MAX_AMOUNT`
pub fn validate_amount_cap(value: Decimal, field: &str) -> Result<(), AppError> {
    if value > MAX_AMOUNT {
        return Err(AppError::with_message(
            shared::ErrorCode::ValueOutOfRange,
            format!("{field} must not exceed {MAX_AMOUNT}"),
        )
        .with_detail("field", field)
        .with_detail("max", MAX_AMOUNT.to_string()));
    }
    Ok(())
}

/// Quantity strictly greater than zero and at most `MAX_QUANTITY`
pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 || quantity > MAX_QUANTITY {
        return Err(AppError::new(shared::ErrorCode::InvalidQuantity)
            .with_detail("quantity", quantity)
            .with_detail("max", MAX_QUANTITY));
    }
    Ok(())
}

/// Counted quantity: zero allowed, same upper bound
pub fn validate_count(quantity: i64) -> Result<(), AppError> {
    if quantity == 0 {
        return Ok(());
    }
    validate_quantity(quantity)
}

/// Very small sanity check; delivery is not verified
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation("email is not a valid address")),
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            shared::ErrorCode::PasswordTooShort,
            format!("Password must have at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}
