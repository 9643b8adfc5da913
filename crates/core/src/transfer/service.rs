//! Pure transfer rules: validation, settlement decision, lock ordering.
//!
//! The transactional protocol (reservation, locking, posting) lives in the
//! database layer; everything here is decidable without a store and is
//! exercised by that layer inside its transactions.

use super::error::TransferError;
use super::types::{SettlementPlan, TransferInput};

/// Pure transfer business rules.
///
/// This service contains no database dependencies. It validates transfer
/// input and decides settlements from balances read under lock.
pub struct TransferService;

impl TransferService {
    /// Validates a transfer before any store access.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` if the wallets are identical, a wallet id
    /// is not positive, or the amount is not positive.
    pub fn validate(input: &TransferInput) -> Result<(), TransferError> {
        if input.from_wallet_id <= 0 {
            return Err(TransferError::InvalidWalletId(input.from_wallet_id));
        }
        if input.to_wallet_id <= 0 {
            return Err(TransferError::InvalidWalletId(input.to_wallet_id));
        }
        if input.from_wallet_id == input.to_wallet_id {
            return Err(TransferError::SameWallet);
        }
        if input.amount <= 0 {
            return Err(TransferError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Decides a settlement from balances read under write lock.
    ///
    /// The debit entry is `-amount`, the credit entry `+amount`; the two
    /// always net to zero, which is the double-entry invariant.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::InsufficientBalance` if the source balance
    /// cannot cover the amount.
    pub fn plan_settlement(
        from_balance: i64,
        to_balance: i64,
        amount: i64,
    ) -> Result<SettlementPlan, TransferError> {
        if from_balance < amount {
            return Err(TransferError::InsufficientBalance {
                required: amount,
                available: from_balance,
            });
        }
        Ok(SettlementPlan {
            debit: -amount,
            credit: amount,
            new_from_balance: from_balance - amount,
            new_to_balance: to_balance + amount,
        })
    }

    /// Canonical wallet lock order: ascending id, independent of transfer
    /// direction. Two concurrent opposite-direction transfers between the
    /// same wallet pair then acquire locks in the same order and cannot
    /// deadlock.
    #[must_use]
    pub const fn lock_order(from_wallet_id: i32, to_wallet_id: i32) -> (i32, i32) {
        if from_wallet_id <= to_wallet_id {
            (from_wallet_id, to_wallet_id)
        } else {
            (to_wallet_id, from_wallet_id)
        }
    }
}
