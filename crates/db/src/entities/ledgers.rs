//! `SeaORM` Entity for the ledgers table.
//!
//! Entries are immutable and append-only; nothing in the codebase updates
//! or deletes a ledger row after insertion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LedgerEntryType;

/// A ledger entry row. Negative `amount` is a debit, positive a credit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledgers")]
pub struct Model {
    /// Entry id.
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Wallet this entry posts against.
    pub wallet_id: i32,
    /// Signed amount in minor units.
    pub amount: i64,
    /// Entry kind.
    #[sea_orm(column_name = "type")]
    pub entry_type: LedgerEntryType,
    /// Optional reference (e.g. `interest-2024-02-29`).
    pub reference: Option<String>,
    /// Owning transaction log for TRANSFER entries; null for interest.
    pub transaction_log_id: Option<i32>,
    /// Row creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Row update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Ledger relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Wallet this entry belongs to.
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallet,
    /// Owning transaction log, when the entry is half of a transfer.
    #[sea_orm(
        belongs_to = "super::transaction_logs::Entity",
        from = "Column::TransactionLogId",
        to = "super::transaction_logs::Column::Id"
    )]
    TransactionLog,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::transaction_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
