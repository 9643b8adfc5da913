//! Wallet repository for lookup, creation, and ledger reconciliation.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use thiserror::Error;

use payflow_shared::error::AppError;

use crate::entities::{ledgers, wallets};

/// Error types for wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Wallet not found.
    #[error("Wallet not found: {0}")]
    NotFound(i32),

    /// The ledger sum does not fit in a signed 64-bit balance.
    #[error("Ledger sum for wallet {0} is out of range")]
    SumOutOfRange(i32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotFound(_) => Self::NotFound(err.to_string()),
            WalletError::SumOutOfRange(_) => Self::Internal(err.to_string()),
            WalletError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A wallet together with its ledger-derived balance.
///
/// For a consistent store the two balances are always equal; exposing both
/// supports the reconciliation check without any extra tooling.
#[derive(Debug, Clone)]
pub struct WalletSnapshot {
    /// The wallet row.
    pub wallet: wallets::Model,
    /// Signed sum of all ledger entries referencing the wallet.
    pub ledger_balance: i64,
}

/// Wallet repository.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a wallet by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, wallet_id: i32) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find_by_id(wallet_id).one(&self.db).await
    }

    /// Creates a wallet with an opening balance.
    ///
    /// Intended for seeding and tests; production wallets arrive through
    /// provisioning flows outside this service.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        currency: &str,
        opening_balance: i64,
    ) -> Result<wallets::Model, DbErr> {
        let now = Utc::now().into();
        wallets::ActiveModel {
            balance: Set(opening_balance),
            currency: Set(currency.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Computes the signed sum of all ledger entries for a wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sum overflows `i64`.
    pub async fn ledger_balance(&self, wallet_id: i32) -> Result<i64, WalletError> {
        // SUM(bigint) comes back as numeric from Postgres
        let total: Option<Option<Decimal>> = ledgers::Entity::find()
            .select_only()
            .column_as(ledgers::Column::Amount.sum(), "total")
            .filter(ledgers::Column::WalletId.eq(wallet_id))
            .into_tuple()
            .one(&self.db)
            .await?;

        match total.flatten() {
            Some(sum) => sum.to_i64().ok_or(WalletError::SumOutOfRange(wallet_id)),
            None => Ok(0),
        }
    }

    /// Loads a wallet together with its ledger-derived balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::NotFound` if the wallet does not exist.
    pub async fn snapshot(&self, wallet_id: i32) -> Result<WalletSnapshot, WalletError> {
        let wallet = self
            .find(wallet_id)
            .await?
            .ok_or(WalletError::NotFound(wallet_id))?;
        let ledger_balance = self.ledger_balance(wallet_id).await?;
        Ok(WalletSnapshot {
            wallet,
            ledger_balance,
        })
    }
}
