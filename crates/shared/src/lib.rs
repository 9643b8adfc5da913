//! Shared types, errors, and configuration for Payflow.
//!
//! This crate provides common types used across all other crates:
//! - Scaled-amount codec for exact minor-unit money handling
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
