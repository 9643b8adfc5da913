//! Interest accrual error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while validating an accrual request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterestError {
    /// The accrual range is inverted.
    #[error("fromDate must be <= toDate (got {from} > {to})")]
    InvalidDateRange {
        /// Start of the requested range.
        from: NaiveDate,
        /// End of the requested range.
        to: NaiveDate,
    },

    /// Interest accrual only supports USD wallets.
    #[error("Interest is only supported for USD wallets, wallet currency is {0}")]
    UnsupportedCurrency(String),
}
