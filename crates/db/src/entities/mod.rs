//! `SeaORM` entity definitions.

pub mod ledgers;
pub mod sea_orm_active_enums;
pub mod transaction_logs;
pub mod wallets;
