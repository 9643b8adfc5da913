//! Daily compounding interest math.
//!
//! All rate arithmetic uses `rust_decimal::Decimal`; quantization back to
//! minor units happens only at the persistence boundary, rounding down.

pub mod error;
pub mod rate;
pub mod types;

#[cfg(test)]
mod props;

pub use error::InterestError;
pub use rate::{compound_for_range, daily_interest, daily_rate, days_in_year};
pub use types::{AccrualOutcome, RangeProjection};
