//! # Analytics Module
//!
//! Daily bucketing for the dashboard sales trend.
//!
//! ```text
//! today = Thu 2026-10-15, TREND_DAYS = 7
//!
//!  Fri   Sat   Sun   Mon   Tue   Wed   Thu
//!  0.00  0.00  12.50 0.00  40.00 0.00  9.00
//!  ▲ oldest                          newest ▲
//! ```
//!
//! Days without sales are present with a zero total. Timestamps are bucketed
//! by their UTC calendar date.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::money::Money;
use crate::types::DailySales;
use crate::TREND_DAYS;

/// First calendar day covered by a trend ending on `today`.
pub fn trend_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(TREND_DAYS - 1)))
        .unwrap_or(NaiveDate::MIN)
}

/// Buckets `(timestamp, amount)` pairs into one entry per day, oldest first.
///
/// Entries outside the window are ignored.
pub fn daily_trend(today: NaiveDate, sales: &[(DateTime<Utc>, Money)]) -> Vec<DailySales> {
    let start = trend_start(today);

    let mut days: Vec<DailySales> = start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|date| DailySales {
            date,
            label: date.format("%a").to_string(),
            total: Money::zero(),
            count: 0,
        })
        .collect();

    for (at, amount) in sales {
        let date = at.date_naive();
        if date < start || date > today {
            continue;
        }
        let offset = (date - start).num_days() as usize;
        if let Some(day) = days.get_mut(offset) {
            day.total += *amount;
            day.count += 1;
        }
    }

    days
}

// =============================================================================
// Unit Tests
// =============================================================================
