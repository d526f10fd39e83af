//! Fixed-point helpers shared by every calculator.
//!
//! Money is integer pence and rates are percentage × 100. Products are
//! formed exactly in [`Decimal`] and rounded back to whole pence once.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::CalculationError;
use crate::models::RATE_SCALE;

/// Rounds to a whole penny, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxcalc_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.4)), 123);
/// assert_eq!(round_half_up(dec!(123.5)), 124);
/// assert_eq!(round_half_up(dec!(-123.5)), -124);
/// ```
pub fn round_half_up(value: Decimal) -> i64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// `amount × rate / 10000`, rounded to the penny.
///
/// # Examples
///
/// ```
/// use taxcalc_core::calculations::common::apply_rate;
///
/// // 20% of £10.03
/// assert_eq!(apply_rate(1003, 2000), 201);
/// ```
pub fn apply_rate(amount: i64, rate: i64) -> i64 {
    round_half_up(Decimal::from(amount) * Decimal::from(rate) / Decimal::from(RATE_SCALE))
}

/// `amount × numerator / denominator`, rounded to the penny.
pub fn scale(amount: i64, numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    round_half_up(Decimal::from(amount) * Decimal::from(numerator) / Decimal::from(denominator))
}

/// `a + b` in pence, failing instead of wrapping.
pub fn checked_add(a: i64, b: i64) -> Result<i64, CalculationError> {
    a.checked_add(b).ok_or(CalculationError::AmountOutOfRange)
}

/// `a × b` in pence, failing instead of wrapping.
pub fn checked_mul(a: i64, b: i64) -> Result<i64, CalculationError> {
    a.checked_mul(b).ok_or(CalculationError::AmountOutOfRange)
}

/// The part of `amount` lying in `[lower, upper)`; `upper` of `None` is
/// unbounded.
pub fn slice_between(amount: i64, lower: i64, upper: Option<i64>) -> i64 {
    let capped = match upper {
        Some(upper) => amount.min(upper),
        None => amount,
    };
    (capped - lower).max(0)
}
