//! Property-based tests for the scaled-amount codec.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::amount::{parse_amount, to_decimal, to_scaled};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Round-trip: `to_scaled(to_decimal(n)) == n` for any non-negative `n`.
    #[test]
    fn prop_round_trip_non_negative(n in 0i64..=i64::MAX / 100) {
        prop_assert_eq!(to_scaled(to_decimal(n)).unwrap(), n);
    }

    /// Parsing a positive integer's canonical string always succeeds
    /// and returns the same integer.
    #[test]
    fn prop_parse_canonical_string(n in 1i64..=i64::MAX) {
        prop_assert_eq!(parse_amount(&n.to_string()).unwrap(), n);
    }

    /// Quantizing never rounds up: the decimal reconstruction of the
    /// quantized amount is less than or equal to the original value.
    #[test]
    fn prop_quantize_never_rounds_up(cents in 0i64..1_000_000_000i64, extra in 0u32..99u32) {
        // value = cents/100 + extra/10000, i.e. a sub-minor-unit remainder
        let value = to_decimal(cents) + Decimal::new(i64::from(extra), 4);
        let quantized = to_scaled(value).unwrap();
        prop_assert!(to_decimal(quantized) <= value);
        prop_assert_eq!(quantized, cents);
    }
}
