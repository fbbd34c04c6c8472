//! Money helpers
//!
//! Amounts are `Decimal` with two decimal places in memory and on the wire,
//! and INTEGER cents in SQLite.

use rust_decimal::prelude::*;

/// Monetary precision (2 decimal places)
pub const DECIMAL_PLACES: u32 = 2;

const CENTS_PER_UNIT: i64 = 100;

/// Round to 2 decimal places, midpoint away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to integer cents.
///
/// `None` when the amount does not fit in `i64` cents.
pub fn to_cents(value: Decimal) -> Option<i64> {
    round_money(value)
        .checked_mul(Decimal::from(CENTS_PER_UNIT))?
        .to_i64()
}

/// Convert integer cents back to an amount with scale 2
#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// Number of decimal places actually used by `value` (trailing zeros ignored)
pub fn decimal_places(value: Decimal) -> u32 {
    value.normalize().scale()
}
