//! Daily rate calculation and compounding.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use payflow_shared::types::amount::to_decimal;

use super::types::RangeProjection;

/// Number of days in the calendar year containing `date`.
#[must_use]
pub fn days_in_year(date: NaiveDate) -> u32 {
    if date.leap_year() { 366 } else { 365 }
}

/// Daily rate for a given date: `annual_rate / days_in_year(date)`.
///
/// Evaluated per day so that ranges spanning a year boundary use each
/// day's own calendar year.
#[must_use]
pub fn daily_rate(annual_rate: Decimal, date: NaiveDate) -> Decimal {
    annual_rate / Decimal::from(days_in_year(date))
}

/// Unquantized interest for one day on a minor-unit principal.
#[must_use]
pub fn daily_interest(principal_minor: i64, annual_rate: Decimal, date: NaiveDate) -> Decimal {
    to_decimal(principal_minor) * daily_rate(annual_rate, date)
}

/// Pure compounding projection over `[from, to]`, inclusive.
///
/// Each day's interest is computed on the principal that already includes
/// all previous days' unquantized interest. Returns a zero projection for
/// an inverted range. This is the reporting-precision oracle for the
/// persisted accrual path, which compounds the floor-quantized balance
/// instead.
#[must_use]
pub fn compound_for_range(
    principal_minor: i64,
    annual_rate: Decimal,
    from: NaiveDate,
    to: NaiveDate,
) -> RangeProjection {
    let mut principal = to_decimal(principal_minor);
    let mut total_interest = Decimal::ZERO;

    if from > to {
        return RangeProjection {
            total_interest,
            final_principal: principal,
        };
    }

    let mut day = from;
    loop {
        let interest = principal * daily_rate(annual_rate, day);
        total_interest += interest;
        principal += interest;

        if day >= to {
            break;
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    RangeProjection {
        total_interest,
        final_principal: principal,
    }
}
