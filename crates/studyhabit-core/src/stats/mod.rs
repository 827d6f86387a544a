//! Statistics module for studyhabit
//!
//! Everything here is derived from raw check-in events and rebuilt on every
//! query: the per-day fold, the consecutive-day streak and the rolling
//! period totals.

mod daily;
mod period;
mod streak;

pub use daily::{aggregate, DailyMap, DailySummary};
pub use period::{period_totals, week_start, PeriodTotals};
pub use streak::streak;
