//! Repository abstractions for data access.
//!
//! Each repository owns one protocol against the store:
//! - `wallet` - wallet lookup, creation, and ledger reconciliation
//! - `transfer` - the three-phase idempotent transfer protocol
//! - `interest` - per-day compounding interest persistence

pub mod interest;
pub mod transfer;
pub mod wallet;

pub use interest::InterestRepository;
pub use transfer::TransferRepository;
pub use wallet::WalletRepository;
