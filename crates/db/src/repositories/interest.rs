//! Interest repository: per-day compounding against the persisted balance.
//!
//! Each calendar day runs in its own short transaction. That keeps wallet
//! lock hold time small under concurrent transfers and leaves already
//! committed days committed if the process is interrupted mid-range.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use payflow_core::interest::{AccrualOutcome, InterestError, daily_interest};
use payflow_shared::error::AppError;
use payflow_shared::types::amount::{AmountError, to_scaled};

use crate::entities::{ledgers, sea_orm_active_enums::LedgerEntryType, wallets};

/// Currency interest accrual is supported for.
const INTEREST_CURRENCY: &str = "USD";

/// Error types for accrual operations.
#[derive(Debug, thiserror::Error)]
pub enum AccrualError {
    /// A pure accrual rule rejected the request.
    #[error(transparent)]
    Rule(#[from] InterestError),

    /// Wallet not found.
    #[error("Wallet not found: {0}")]
    WalletNotFound(i32),

    /// A quantized interest amount did not fit in minor units.
    #[error("Interest amount out of range: {0}")]
    Amount(#[from] AmountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccrualError> for AppError {
    fn from(err: AccrualError) -> Self {
        match err {
            AccrualError::Rule(_) | AccrualError::WalletNotFound(_) => {
                Self::Validation(err.to_string())
            }
            AccrualError::Amount(_) => Self::Internal(err.to_string()),
            AccrualError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Interest repository.
#[derive(Debug, Clone)]
pub struct InterestRepository {
    db: DatabaseConnection,
    annual_rate: Decimal,
}

impl InterestRepository {
    /// Creates a new interest repository with the configured annual rate.
    #[must_use]
    pub const fn new(db: DatabaseConnection, annual_rate: Decimal) -> Self {
        Self { db, annual_rate }
    }

    /// Accrues daily compound interest over `[from, to]`, inclusive.
    ///
    /// Days are processed strictly in ascending order; each day reads the
    /// wallet balance fresh under a write lock, so every day compounds on
    /// the persisted balance at that moment, including prior days' postings.
    /// A day whose interest floor-quantizes to zero posts nothing but still
    /// counts as processed.
    ///
    /// # Errors
    ///
    /// Returns `AccrualError` if the range is inverted, the wallet is
    /// missing or not USD, or a store operation fails. Days committed
    /// before a failure remain committed.
    pub async fn accrue(
        &self,
        wallet_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccrualOutcome, AccrualError> {
        if from > to {
            return Err(InterestError::InvalidDateRange { from, to }.into());
        }

        // Currency check up front; balances are re-read per day under lock.
        let wallet = wallets::Entity::find_by_id(wallet_id)
            .one(&self.db)
            .await?
            .ok_or(AccrualError::WalletNotFound(wallet_id))?;
        if wallet.currency != INTEREST_CURRENCY {
            return Err(InterestError::UnsupportedCurrency(wallet.currency).into());
        }

        let mut total_interest = Decimal::ZERO;
        let mut days_processed: u32 = 0;
        let mut day = from;

        loop {
            if let Some(interest) = self.accrue_one_day(wallet_id, day).await? {
                total_interest += interest;
            }
            days_processed += 1;

            if day >= to {
                break;
            }
            let Some(next) = day.succ_opt() else { break };
            day = next;
        }

        info!(
            wallet_id,
            %from,
            %to,
            days_processed,
            total_interest = %total_interest,
            "Interest accrual complete"
        );

        Ok(AccrualOutcome {
            total_interest,
            days_processed,
        })
    }

    /// Posts one day's interest in its own transaction.
    ///
    /// Returns the unquantized day interest when an entry was written,
    /// `None` when the day's interest quantized to zero. The ledger only
    /// ever receives the quantized amount; the unquantized value feeds
    /// the full-precision reporting total.
    async fn accrue_one_day(
        &self,
        wallet_id: i32,
        day: NaiveDate,
    ) -> Result<Option<Decimal>, AccrualError> {
        let txn = self.db.begin().await?;

        let wallet = wallets::Entity::find_by_id(wallet_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(AccrualError::WalletNotFound(wallet_id))?;

        let interest = daily_interest(wallet.balance, self.annual_rate, day);
        let quantized = to_scaled(interest)?;
        if quantized <= 0 {
            txn.commit().await?;
            debug!(wallet_id, %day, "Interest quantized to zero, nothing posted");
            return Ok(None);
        }

        let now = Utc::now().into();
        ledgers::ActiveModel {
            wallet_id: Set(wallet_id),
            amount: Set(quantized),
            entry_type: Set(LedgerEntryType::Interest),
            reference: Set(Some(format!("interest-{day}"))),
            transaction_log_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let new_balance = wallet.balance + quantized;
        let mut active: wallets::ActiveModel = wallet.into();
        active.balance = Set(new_balance);
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(interest))
    }
}
