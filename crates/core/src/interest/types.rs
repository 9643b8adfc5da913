//! Domain types for interest accrual.

use rust_decimal::Decimal;

/// Result of a persisted accrual run over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// Sum of the unquantized daily interest amounts, in major units.
    ///
    /// Reported at full decimal precision; the ledger only ever receives
    /// the per-day floor-quantized amounts, and days whose interest
    /// quantized to zero contribute nothing.
    pub total_interest: Decimal,
    /// Number of calendar days processed (zero-interest days included).
    pub days_processed: u32,
}

/// Pure compounding projection over an inclusive date range (no store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProjection {
    /// Total interest accrued over the range, unquantized.
    pub total_interest: Decimal,
    /// Principal after compounding every day in the range.
    pub final_principal: Decimal,
}
