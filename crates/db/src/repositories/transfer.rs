//! Transfer repository implementing the idempotent transfer protocol.
//!
//! The protocol runs in three phases, each a bounded unit of work:
//!
//! 1. **Replay lookup** (no transaction): a SUCCESS log returns its stored
//!    receipt verbatim; PENDING conflicts; FAILED is terminal for the key.
//! 2. **Reservation**: a PENDING log row is inserted in a short
//!    transaction. The key's uniqueness constraint is the race guard; a
//!    losing writer re-reads and either replays or conflicts.
//! 3. **Settlement**: one transaction locks the log row and both wallets
//!    (ascending wallet id), posts the double entry, updates balances, and
//!    finalizes the log with the receipt stored verbatim.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{info, warn};

use payflow_core::transfer::{self, TransferInput, TransferReceipt, TransferService};
use payflow_shared::error::AppError;

use crate::entities::{
    ledgers,
    sea_orm_active_enums::{LedgerEntryType, TransactionLogStatus},
    transaction_logs, wallets,
};

/// Error types for the transfer protocol.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// A pure business rule rejected the transfer.
    #[error(transparent)]
    Rule(#[from] transfer::TransferError),

    /// One or both wallets do not exist.
    #[error("One or both wallets not found")]
    WalletNotFound,

    /// Another attempt for this key is in flight.
    #[error("Idempotency key already in use")]
    IdempotencyConflict,

    /// The key belongs to a FAILED transfer; the key is spent.
    #[error("Idempotency key belongs to a failed transfer; retry with a new key")]
    KeyAlreadyFailed,

    /// The PENDING reservation vanished before settlement.
    #[error("PENDING transaction log missing for idempotency key")]
    MissingReservation,

    /// A SUCCESS log has no stored receipt to replay.
    #[error("Transaction log {0} is missing its response payload")]
    MissingReceipt(i32),

    /// The stored receipt could not be encoded or decoded.
    #[error("Response payload codec error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Rule(transfer::TransferError::InsufficientBalance { .. }) => {
                Self::InsufficientBalance(err.to_string())
            }
            TransferError::Rule(_) | TransferError::WalletNotFound => {
                Self::Validation(err.to_string())
            }
            TransferError::IdempotencyConflict | TransferError::KeyAlreadyFailed => {
                Self::Conflict(err.to_string())
            }
            TransferError::MissingReservation
            | TransferError::MissingReceipt(_)
            | TransferError::Payload(_) => Self::Internal(err.to_string()),
            TransferError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Error message persisted on the FAILED log for business failures.
///
/// Unexpected persistence errors return `None`: they propagate and may
/// leave the log PENDING for the reconciliation sweep.
fn failure_message(err: &TransferError) -> Option<&'static str> {
    match err {
        TransferError::WalletNotFound => Some("Wallet not found"),
        TransferError::Rule(transfer::TransferError::InsufficientBalance { .. }) => {
            Some("Insufficient balance")
        }
        _ => None,
    }
}

/// Transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Executes one idempotent transfer attempt.
    ///
    /// Returns the persisted receipt, re-read after commit, so the caller
    /// observes exactly what later replays will return.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` on validation failure, idempotency
    /// conflict, insufficient balance, or store failure.
    pub async fn execute(&self, input: TransferInput) -> Result<TransferReceipt, TransferError> {
        TransferService::validate(&input)?;

        // Phase 1: replay lookup outside any transaction.
        if let Some(existing) = self.find_log(&input.idempotency_key).await? {
            return match existing.status {
                TransactionLogStatus::Success => {
                    info!(
                        key = %input.idempotency_key,
                        log_id = existing.id,
                        "Replaying stored transfer receipt"
                    );
                    Self::stored_receipt(existing)
                }
                TransactionLogStatus::Pending => Err(TransferError::IdempotencyConflict),
                TransactionLogStatus::Failed => Err(TransferError::KeyAlreadyFailed),
            };
        }

        // Phase 2: reserve the key; the uniqueness constraint settles races.
        if let Err(err) = self.reserve(&input).await {
            return match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    warn!(key = %input.idempotency_key, "Lost reservation race, re-reading log");
                    self.resolve_reservation_race(&input.idempotency_key).await
                }
                // The log's wallet foreign keys reject unknown wallets here;
                // the key is not consumed.
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    Err(TransferError::WalletNotFound)
                }
                _ => Err(err.into()),
            };
        }

        // Phase 3: settle, then re-read the committed receipt.
        let log_id = self.settle(&input).await?;
        let log = transaction_logs::Entity::find_by_id(log_id)
            .one(&self.db)
            .await?
            .ok_or(TransferError::MissingReceipt(log_id))?;
        Self::stored_receipt(log)
    }

    /// Lists PENDING logs older than `cutoff`, oldest first.
    ///
    /// Feed for an external reconciliation sweep of reservations abandoned
    /// mid-settlement (process crash, client disconnect).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<transaction_logs::Model>, DbErr> {
        transaction_logs::Entity::find()
            .filter(transaction_logs::Column::Status.eq(TransactionLogStatus::Pending))
            .filter(transaction_logs::Column::CreatedAt.lt(cutoff))
            .order_by_asc(transaction_logs::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    async fn find_log(&self, key: &str) -> Result<Option<transaction_logs::Model>, DbErr> {
        transaction_logs::Entity::find()
            .filter(transaction_logs::Column::IdempotencyKey.eq(key))
            .one(&self.db)
            .await
    }

    /// Decodes the receipt stored on a SUCCESS log.
    fn stored_receipt(log: transaction_logs::Model) -> Result<TransferReceipt, TransferError> {
        let payload = log
            .response_payload
            .ok_or(TransferError::MissingReceipt(log.id))?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Phase 2: inserts the PENDING reservation in a short transaction.
    async fn reserve(&self, input: &TransferInput) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        transaction_logs::ActiveModel {
            idempotency_key: Set(input.idempotency_key.clone()),
            status: Set(TransactionLogStatus::Pending),
            from_wallet_id: Set(input.from_wallet_id),
            to_wallet_id: Set(input.to_wallet_id),
            amount: Set(input.amount),
            currency: Set(input.currency.clone()),
            reference: Set(input.reference.clone()),
            description: Set(input.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await
    }

    /// Resolves a lost reservation race by re-reading the winner's row.
    async fn resolve_reservation_race(
        &self,
        key: &str,
    ) -> Result<TransferReceipt, TransferError> {
        let log = self
            .find_log(key)
            .await?
            .ok_or(TransferError::IdempotencyConflict)?;
        if log.status == TransactionLogStatus::Success {
            // The concurrent attempt already completed; replay its receipt.
            return Self::stored_receipt(log);
        }
        Err(TransferError::IdempotencyConflict)
    }

    /// Phase 3: settlement. Business failures finalize the log FAILED in a
    /// follow-up write after the settlement transaction rolls back.
    async fn settle(&self, input: &TransferInput) -> Result<i32, TransferError> {
        let txn = self.db.begin().await?;
        match Self::settle_within(&txn, input).await {
            Ok(log_id) => {
                txn.commit().await?;
                info!(
                    log_id,
                    from = input.from_wallet_id,
                    to = input.to_wallet_id,
                    amount = input.amount,
                    "Transfer settled"
                );
                Ok(log_id)
            }
            Err(err) => {
                txn.rollback().await?;
                if let Some(message) = failure_message(&err) {
                    self.finalize_failed(&input.idempotency_key, message).await?;
                }
                Err(err)
            }
        }
    }

    /// The settlement unit of work: lock log, lock wallets in canonical
    /// order, decide, post the double entry, update balances, finalize.
    async fn settle_within(
        txn: &DatabaseTransaction,
        input: &TransferInput,
    ) -> Result<i32, TransferError> {
        let log = transaction_logs::Entity::find()
            .filter(transaction_logs::Column::IdempotencyKey.eq(&input.idempotency_key))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(TransferError::MissingReservation)?;
        let log_id = log.id;

        // Canonical ascending-id order, independent of transfer direction.
        let (first_id, second_id) =
            TransferService::lock_order(input.from_wallet_id, input.to_wallet_id);
        let first = Self::lock_wallet(txn, first_id).await?;
        let second = Self::lock_wallet(txn, second_id).await?;
        let (Some(first), Some(second)) = (first, second) else {
            return Err(TransferError::WalletNotFound);
        };
        let (from_wallet, to_wallet) = if first.id == input.from_wallet_id {
            (first, second)
        } else {
            (second, first)
        };

        let plan =
            TransferService::plan_settlement(from_wallet.balance, to_wallet.balance, input.amount)?;

        let now = Utc::now();
        let now_tz = now.into();

        // Double entry: both halves tagged with the owning log.
        ledgers::ActiveModel {
            wallet_id: Set(from_wallet.id),
            amount: Set(plan.debit),
            entry_type: Set(LedgerEntryType::Transfer),
            reference: Set(input.reference.clone()),
            transaction_log_id: Set(Some(log_id)),
            created_at: Set(now_tz),
            updated_at: Set(now_tz),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        ledgers::ActiveModel {
            wallet_id: Set(to_wallet.id),
            amount: Set(plan.credit),
            entry_type: Set(LedgerEntryType::Transfer),
            reference: Set(input.reference.clone()),
            transaction_log_id: Set(Some(log_id)),
            created_at: Set(now_tz),
            updated_at: Set(now_tz),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let mut from_active: wallets::ActiveModel = from_wallet.into();
        from_active.balance = Set(plan.new_from_balance);
        from_active.updated_at = Set(now_tz);
        from_active.update(txn).await?;

        let mut to_active: wallets::ActiveModel = to_wallet.into();
        to_active.balance = Set(plan.new_to_balance);
        to_active.updated_at = Set(now_tz);
        to_active.update(txn).await?;

        let receipt = TransferReceipt::new(log_id, input, now);
        let payload = serde_json::to_value(&receipt)?;

        let mut log_active: transaction_logs::ActiveModel = log.into();
        log_active.status = Set(TransactionLogStatus::Success);
        log_active.response_payload = Set(Some(payload));
        log_active.error_message = Set(None);
        log_active.updated_at = Set(now_tz);
        log_active.update(txn).await?;

        Ok(log_id)
    }

    async fn lock_wallet(
        txn: &DatabaseTransaction,
        wallet_id: i32,
    ) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find_by_id(wallet_id)
            .lock_exclusive()
            .one(txn)
            .await
    }

    /// Marks the log FAILED with an error message after a business failure.
    async fn finalize_failed(&self, key: &str, message: &str) -> Result<(), TransferError> {
        let log = self
            .find_log(key)
            .await?
            .ok_or(TransferError::MissingReservation)?;
        let mut active: transaction_logs::ActiveModel = log.into();
        active.status = Set(TransactionLogStatus::Failed);
        active.error_message = Set(Some(message.to_string()));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_mapping() {
        assert_eq!(
            failure_message(&TransferError::WalletNotFound),
            Some("Wallet not found")
        );
        assert_eq!(
            failure_message(&TransferError::Rule(
                transfer::TransferError::InsufficientBalance {
                    required: 101,
                    available: 100,
                }
            )),
            Some("Insufficient balance")
        );
        // Unexpected failures never finalize the log
        assert_eq!(failure_message(&TransferError::IdempotencyConflict), None);
        assert_eq!(
            failure_message(&TransferError::Rule(transfer::TransferError::SameWallet)),
            None
        );
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = TransferError::IdempotencyConflict.into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = TransferError::KeyAlreadyFailed.into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = TransferError::Rule(transfer::TransferError::InsufficientBalance {
            required: 101,
            available: 100,
        })
        .into();
        assert_eq!(err.status_code(), 422);

        let err: AppError = TransferError::Rule(transfer::TransferError::SameWallet).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = TransferError::WalletNotFound.into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = TransferError::MissingReceipt(1).into();
        assert_eq!(err.status_code(), 500);
    }
}
