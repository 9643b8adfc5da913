//! Scaled-amount codec for exact minor-unit money handling.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All externally observed amounts are signed 64-bit integers in minor
//! currency units (cents at scale 100). Fractional math (interest rates)
//! uses `rust_decimal::Decimal` and is re-quantized to minor units only
//! at the point of persistence, always rounding down.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Minor units per major currency unit (100 = cents, 2 decimals).
pub const AMOUNT_SCALE: i64 = 100;

/// Decimal places implied by [`AMOUNT_SCALE`].
const AMOUNT_DECIMALS: u32 = 2;

/// Errors produced by the amount codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// Amount string was empty or whitespace-only.
    #[error("Amount is required")]
    Empty,

    /// Amount string was not a base-10 integer.
    #[error("Amount must be an integer string in minor units (e.g. \"10000\" for 100.00)")]
    NotAnInteger,

    /// Amount was zero or negative.
    #[error("Amount must be positive")]
    NotPositive,

    /// Amount does not fit in a signed 64-bit integer.
    #[error("Amount exceeds the representable range")]
    OutOfRange,
}

/// Parses a caller-supplied amount string into minor units.
///
/// Only base-10 integer strings are accepted; amounts arrive as strings
/// so that large values survive JSON transport without a float round-trip.
///
/// # Errors
///
/// Returns `AmountError` if the string is empty, not an integer,
/// not positive, or out of `i64` range.
pub fn parse_amount(raw: &str) -> Result<i64, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let n: i64 = trimmed.parse().map_err(|e: std::num::ParseIntError| {
        use std::num::IntErrorKind;
        match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => AmountError::OutOfRange,
            _ => AmountError::NotAnInteger,
        }
    })?;

    if n <= 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(n)
}

/// Converts minor units to an exact decimal value (e.g. `10000` -> `100.00`).
#[must_use]
pub fn to_decimal(scaled: i64) -> Decimal {
    Decimal::new(scaled, AMOUNT_DECIMALS)
}

/// Converts a decimal value back to minor units, truncating toward zero.
///
/// Never rounds up: quantizing must not manufacture value.
///
/// # Errors
///
/// Returns `AmountError::OutOfRange` if the result does not fit in `i64`.
pub fn to_scaled(value: Decimal) -> Result<i64, AmountError> {
    let scaled = value
        .checked_mul(Decimal::from(AMOUNT_SCALE))
        .ok_or(AmountError::OutOfRange)?
        .trunc();
    scaled.to_i64().ok_or(AmountError::OutOfRange)
}
