//! Transfer error types for validation and settlement decisions.

use thiserror::Error;

/// Errors that can occur while validating or settling a transfer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    /// Source and destination wallets must differ.
    #[error("fromWalletId and toWalletId must differ")]
    SameWallet,

    /// Transfer amount must be a positive number of minor units.
    #[error("Transfer amount must be positive")]
    NonPositiveAmount,

    /// Wallet identifiers must be positive.
    #[error("Wallet id must be positive: {0}")]
    InvalidWalletId(i32),

    /// The source wallet cannot cover the debit.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the debit requires, in minor units.
        required: i64,
        /// Balance currently available, in minor units.
        available: i64,
    },
}
