//! Property-based tests for interest rate math.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::rate::{compound_for_range, daily_interest, daily_rate, days_in_year};

/// Strategy for plausible annual rates (0.0001 to 1.0000).
fn annual_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy for arbitrary calendar dates.
fn calendar_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The daily rate is always positive and below the annual rate.
    #[test]
    fn prop_daily_rate_bounds(rate in annual_rate(), date in calendar_date()) {
        let daily = daily_rate(rate, date);
        prop_assert!(daily > Decimal::ZERO);
        prop_assert!(daily < rate);
    }

    /// The year length used is always 365 or 366.
    #[test]
    fn prop_days_in_year(date in calendar_date()) {
        let days = days_in_year(date);
        prop_assert!(days == 365 || days == 366);
    }

    /// One day's interest is non-negative and proportional to the principal.
    #[test]
    fn prop_daily_interest_non_negative(
        principal in 0i64..1_000_000_000_000i64,
        rate in annual_rate(),
        date in calendar_date(),
    ) {
        let interest = daily_interest(principal, rate, date);
        prop_assert!(interest >= Decimal::ZERO);
    }

    /// Compounding over a range accrues at least as much as a single day
    /// and grows the principal monotonically.
    #[test]
    fn prop_compounding_is_monotonic(
        principal in 1i64..1_000_000_000i64,
        rate in annual_rate(),
        date in calendar_date(),
        span in 0i64..30,
    ) {
        let to = date + chrono::Days::new(span.unsigned_abs());
        let projection = compound_for_range(principal, rate, date, to);
        let single = daily_interest(principal, rate, date);

        prop_assert!(projection.total_interest >= single);
        prop_assert_eq!(
            projection.final_principal,
            payflow_shared::types::amount::to_decimal(principal) + projection.total_interest
        );
    }
}
