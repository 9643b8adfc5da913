//! Common types used across the application.

pub mod amount;

pub use amount::{AMOUNT_SCALE, AmountError, parse_amount, to_decimal, to_scaled};

#[cfg(test)]
mod amount_props;
