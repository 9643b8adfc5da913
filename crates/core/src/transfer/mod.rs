//! Idempotent wallet-to-wallet transfer rules.
//!
//! This module holds the pure half of the transfer protocol:
//! - Input validation performed before any store access
//! - The settlement decision (balance check, new balances, entry amounts)
//! - Canonical wallet lock ordering
//! - The durable success payload returned verbatim on replay

pub mod error;
pub mod service;
pub mod types;

pub use error::TransferError;
pub use service::TransferService;
pub use types::{SettlementPlan, TransferInput, TransferReceipt};
