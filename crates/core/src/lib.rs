//! Core business logic for Payflow.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `transfer` - Idempotent wallet-to-wallet transfer rules and payloads
//! - `interest` - Daily compounding interest math

pub mod interest;
pub mod transfer;
