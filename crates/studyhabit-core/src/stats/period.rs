//! All-time and current-week totals over daily summaries.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::daily::DailyMap;

/// Rolling totals shown on the statistics screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub total_minutes: u64,
    pub total_checked_days: u32,
    pub week_minutes: u64,
    pub week_checked_days: u32,
}

/// Monday of the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Totals over the whole map and over the Monday-start week containing
/// `now` (local wall-clock time).
///
/// A day belongs to the week bucket iff its date is on or after the week's
/// Monday; there is no upper bound.
pub fn period_totals(daily: &DailyMap, now: NaiveDateTime) -> PeriodTotals {
    let monday = week_start(now.date());
    let mut totals = PeriodTotals::default();

    for day in daily.iter() {
        totals.total_minutes += day.minutes;
        if day.checked {
            totals.total_checked_days += 1;
        }

        if day.date >= monday {
            totals.week_minutes += day.minutes;
            if day.checked {
                totals.week_checked_days += 1;
            }
        }
    }

    totals
}
