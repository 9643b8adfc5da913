//! `SeaORM` Entity for the transaction_logs table.
//!
//! One row per idempotency key; exclusively written by the transfer
//! repository. The key's global uniqueness constraint is the race-safety
//! mechanism for concurrent attempts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionLogStatus;

/// A transaction log row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_logs")]
pub struct Model {
    /// Log id.
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Caller-supplied idempotency key (globally unique).
    #[sea_orm(unique)]
    pub idempotency_key: String,
    /// Lifecycle status.
    pub status: TransactionLogStatus,
    /// Source wallet id.
    pub from_wallet_id: i32,
    /// Destination wallet id.
    pub to_wallet_id: i32,
    /// Transfer amount in minor units.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional caller reference.
    pub reference: Option<String>,
    /// Optional free-form description.
    pub description: Option<String>,
    /// The exact success receipt, stored verbatim for idempotent replay.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub response_payload: Option<Json>,
    /// Failure reason for FAILED rows.
    pub error_message: Option<String>,
    /// Row creation timestamp; exposed so an external sweep can expire
    /// stale PENDING reservations.
    pub created_at: DateTimeWithTimeZone,
    /// Row update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Transaction log relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Source wallet.
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::FromWalletId",
        to = "super::wallets::Column::Id"
    )]
    FromWallet,
    /// Destination wallet.
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::ToWalletId",
        to = "super::wallets::Column::Id"
    )]
    ToWallet,
    /// The double entry posted for this log.
    #[sea_orm(has_many = "super::ledgers::Entity")]
    Ledgers,
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
