//! Consecutive checked-day streak ending at a reference date.

use chrono::{Days, NaiveDate};

use super::daily::DailyMap;

/// Count the unbroken run of checked days ending at `reference` (inclusive).
///
/// The walk steps back one calendar day at a time and stops at the first
/// date that is missing or unchecked. An unchecked `reference` yields 0; the
/// reference date is never skipped.
pub fn streak(daily: &DailyMap, reference: NaiveDate) -> u32 {
    let mut count = 0;
    let mut cursor = Some(reference);

    while let Some(date) = cursor {
        if !daily.is_checked(date) {
            break;
        }
        count += 1;
        cursor = date.checked_sub_days(Days::new(1));
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckinEvent;
    use crate::stats::aggregate;
    use chrono::Utc;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checked(date: NaiveDate) -> CheckinEvent {
        CheckinEvent::new(date, 10, true, Utc::now())
    }

    fn unchecked(date: NaiveDate) -> CheckinEvent {
        CheckinEvent::new(date, 10, false, Utc::now())
    }

    #[test]
    fn empty_map_has_zero_streak() {
        assert_eq!(streak(&DailyMap::new(), ymd(2024, 1, 3)), 0);
    }

    #[test]
    fn unchecked_day_breaks_the_chain() {
        let events = vec![
            checked(ymd(2024, 1, 1)),
            unchecked(ymd(2024, 1, 2)),
            checked(ymd(2024, 1, 3)),
        ];
        assert_eq!(streak(&aggregate(&events), ymd(2024, 1, 3)), 1);
    }

    #[test]
    fn absent_reference_day_is_not_skipped() {
        let events = vec![checked(ymd(2024, 1, 1)), checked(ymd(2024, 1, 2))];
        assert_eq!(streak(&aggregate(&events), ymd(2024, 1, 3)), 0);
    }

    #[test]
    fn unchecked_reference_day_yields_zero() {
        let events = vec![checked(ymd(2024, 1, 2)), unchecked(ymd(2024, 1, 3))];
        assert_eq!(streak(&aggregate(&events), ymd(2024, 1, 3)), 0);
    }

    #[test]
    fn walks_across_month_and_year_boundaries() {
        let events = vec![
            checked(ymd(2023, 12, 30)),
            checked(ymd(2023, 12, 31)),
            checked(ymd(2024, 1, 1)),
            checked(ymd(2024, 1, 2)),
        ];
        assert_eq!(streak(&aggregate(&events), ymd(2024, 1, 2)), 4);
    }

    #[test]
    fn walks_across_leap_day() {
        let events = vec![
            checked(ymd(2024, 2, 28)),
            checked(ymd(2024, 2, 29)),
            checked(ymd(2024, 3, 1)),
        ];
        assert_eq!(streak(&aggregate(&events), ymd(2024, 3, 1)), 3);
    }

    #[test]
    fn checked_marker_plus_unchecked_session_counts() {
        let events = vec![unchecked(ymd(2024, 5, 6)), checked(ymd(2024, 5, 6))];
        assert_eq!(streak(&aggregate(&events), ymd(2024, 5, 6)), 1);
    }

    proptest! {
        #[test]
        fn unchecking_inside_run_truncates_at_that_date(
            run in 1u32..30,
            gap in 0u32..30,
        ) {
            let reference = ymd(2024, 6, 30);
            let events: Vec<_> = (0..run)
                .map(|i| checked(reference - Days::new(u64::from(i))))
                .collect();
            let full = aggregate(&events);
            prop_assert_eq!(streak(&full, reference), run);

            // Removing the date right before the run never changes it.
            let outside = reference - Days::new(u64::from(run));
            let mut with_outside = events.clone();
            with_outside.retain(|e| e.date != outside);
            prop_assert_eq!(streak(&aggregate(&with_outside), reference), run);

            // Unchecking a date inside the run cuts it to the distance from
            // the reference.
            let k = gap % run;
            let broken_date = reference - Days::new(u64::from(k));
            let broken: Vec<_> = events
                .iter()
                .map(|e| if e.date == broken_date { unchecked(e.date) } else { e.clone() })
                .collect();
            prop_assert_eq!(streak(&aggregate(&broken), reference), k);
        }
    }
}
