//! `SeaORM` active enums backing the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a transaction log row.
///
/// Created PENDING; transitions exactly once to SUCCESS or FAILED.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "transaction_log_status"
)]
pub enum TransactionLogStatus {
    /// Reservation created, outcome not yet known.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Transfer settled; `response_payload` holds the replayable receipt.
    #[sea_orm(string_value = "SUCCESS")]
    Success,
    /// Transfer failed; `error_message` holds the reason. Terminal.
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

/// Kind of ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_entry_type")]
pub enum LedgerEntryType {
    /// One half of a wallet-to-wallet transfer double entry.
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    /// Daily interest posting (no transaction log).
    #[sea_orm(string_value = "INTEREST")]
    Interest,
    /// Manual or administrative adjustment.
    #[sea_orm(string_value = "OTHER")]
    Other,
}
