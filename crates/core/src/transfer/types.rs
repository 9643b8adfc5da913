//! Domain types for the transfer protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated input for a single transfer attempt.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Caller-supplied idempotency key (a UUID string).
    pub idempotency_key: String,
    /// Source wallet id.
    pub from_wallet_id: i32,
    /// Destination wallet id.
    pub to_wallet_id: i32,
    /// Transfer amount in minor units (positive).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional caller reference.
    pub reference: Option<String>,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// The durable success payload for a completed transfer.
///
/// This exact JSON object is persisted in the transaction log and
/// returned verbatim for every replay of the same idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    /// Transaction log id that owns the double entry.
    pub transaction_log_id: i32,
    /// Source wallet id.
    pub from_wallet_id: i32,
    /// Destination wallet id.
    pub to_wallet_id: i32,
    /// Transfer amount in minor units, as a string for JSON precision.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Always `"SUCCESS"`; failed attempts never produce a receipt.
    pub status: String,
    /// RFC 3339 settlement timestamp.
    pub created_at: String,
}

impl TransferReceipt {
    /// Builds the receipt for a settled transfer.
    #[must_use]
    pub fn new(transaction_log_id: i32, input: &TransferInput, settled_at: DateTime<Utc>) -> Self {
        Self {
            transaction_log_id,
            from_wallet_id: input.from_wallet_id,
            to_wallet_id: input.to_wallet_id,
            amount: input.amount.to_string(),
            currency: input.currency.clone(),
            status: "SUCCESS".to_string(),
            created_at: settled_at.to_rfc3339(),
        }
    }
}

/// Outcome of the pure settlement decision for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementPlan {
    /// Ledger entry amount for the source wallet (negative = debit).
    pub debit: i64,
    /// Ledger entry amount for the destination wallet (positive = credit).
    pub credit: i64,
    /// Source wallet balance after the debit.
    pub new_from_balance: i64,
    /// Destination wallet balance after the credit.
    pub new_to_balance: i64,
}
