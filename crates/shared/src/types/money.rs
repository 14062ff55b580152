//! Fixed-point amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the ledger is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Highest decimal precision a tenant may configure.
pub const MAX_DECIMAL_PRECISION: u32 = 8;

/// Rounds an amount to the given number of fractional digits.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors
/// across repeated postings.
#[must_use]
pub fn round_amount(amount: Decimal, precision: u32) -> Decimal {
    amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven)
}

/// Number of significant fractional digits in an amount.
///
/// Trailing zeros do not count, so `10.500` has one fractional digit.
#[must_use]
pub fn fractional_digits(amount: Decimal) -> u32 {
    amount.normalize().scale()
}
