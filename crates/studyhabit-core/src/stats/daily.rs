//! Per-day folding of check-in events.
//!
//! The fold is commutative and associative: any permutation or split of the
//! same event multiset produces the same [`DailyMap`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::CheckinEvent;

/// Aggregate of every event recorded on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Sum of the minutes of all events on this date
    pub minutes: u64,
    /// True if any event on this date was an explicit check-in
    pub checked: bool,
}

impl DailySummary {
    /// Summary for a date with no events.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            minutes: 0,
            checked: false,
        }
    }

    fn absorb(&mut self, minutes: u64, checked: bool) {
        self.minutes += minutes;
        self.checked |= checked;
    }
}

/// Date-ordered mapping from calendar date to its summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMap {
    days: BTreeMap<NaiveDate, DailySummary>,
}

impl DailyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into its date's entry.
    pub fn add(&mut self, event: &CheckinEvent) {
        self.days
            .entry(event.date)
            .or_insert_with(|| DailySummary::empty(event.date))
            .absorb(u64::from(event.minutes), event.checked);
    }

    /// Combine another map into this one, summing minutes and OR-ing the
    /// checked flag on overlapping dates.
    pub fn merge(&mut self, other: &DailyMap) {
        for summary in other.days.values() {
            self.days
                .entry(summary.date)
                .or_insert_with(|| DailySummary::empty(summary.date))
                .absorb(summary.minutes, summary.checked);
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailySummary> {
        self.days.get(&date)
    }

    /// Summary for `date`, or an empty one when nothing was recorded.
    pub fn day_or_empty(&self, date: NaiveDate) -> DailySummary {
        self.get(date)
            .copied()
            .unwrap_or_else(|| DailySummary::empty(date))
    }

    /// Whether `date` has an entry that was checked.
    pub fn is_checked(&self, date: NaiveDate) -> bool {
        self.get(date).is_some_and(|d| d.checked)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailySummary> {
        self.days.values()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl<'a> FromIterator<&'a CheckinEvent> for DailyMap {
    fn from_iter<I: IntoIterator<Item = &'a CheckinEvent>>(iter: I) -> Self {
        let mut map = DailyMap::new();
        for event in iter {
            map.add(event);
        }
        map
    }
}

/// Fold raw events into per-day summaries in a single pass.
pub fn aggregate<'a, I>(events: I) -> DailyMap
where
    I: IntoIterator<Item = &'a CheckinEvent>,
{
    events.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn event(d: u32, minutes: u32, checked: bool) -> CheckinEvent {
        CheckinEvent::new(
            day(d),
            minutes,
            checked,
            Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn empty_input_gives_empty_map() {
        let map = aggregate(&Vec::<CheckinEvent>::new());
        assert!(map.is_empty());
        assert_eq!(map.day_or_empty(day(5)), DailySummary::empty(day(5)));
    }

    #[test]
    fn same_day_events_sum_minutes_and_or_checked() {
        let events = vec![event(3, 20, false), event(3, 0, true), event(3, 15, false)];
        let map = aggregate(&events);
        assert_eq!(map.len(), 1);
        let summary = map.get(day(3)).unwrap();
        assert_eq!(summary.minutes, 35);
        assert!(summary.checked);
    }

    #[test]
    fn unchecked_only_day_stays_unchecked() {
        let map = aggregate(&[event(2, 20, false), event(2, 10, false)]);
        assert!(!map.is_checked(day(2)));
        assert_eq!(map.get(day(2)).unwrap().minutes, 30);
    }

    #[test]
    fn iteration_is_date_ordered() {
        let map = aggregate(&[event(9, 1, false), event(1, 1, false), event(4, 1, true)]);
        let dates: Vec<_> = map.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(1), day(4), day(9)]);
    }

    fn arb_event() -> impl Strategy<Value = CheckinEvent> {
        (1u32..=28, 0u32..=240, any::<bool>()).prop_map(|(d, m, c)| event(d, m, c))
    }

    proptest! {
        #[test]
        fn aggregation_is_order_independent(
            events in prop::collection::vec(arb_event(), 0..40),
            seed in any::<u64>(),
        ) {
            let mut shuffled = events.clone();
            // Deterministic Fisher-Yates driven by the seed.
            let mut state = seed | 1;
            for i in (1..shuffled.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let j = (state % (i as u64 + 1)) as usize;
                shuffled.swap(i, j);
            }
            prop_assert_eq!(aggregate(&events), aggregate(&shuffled));

            let mut reversed = events.clone();
            reversed.reverse();
            prop_assert_eq!(aggregate(&events), aggregate(&reversed));
        }

        #[test]
        fn aggregation_is_additive(
            left in prop::collection::vec(arb_event(), 0..20),
            right in prop::collection::vec(arb_event(), 0..20),
        ) {
            let combined: Vec<_> = left.iter().chain(right.iter()).cloned().collect();
            let mut merged = aggregate(&left);
            merged.merge(&aggregate(&right));
            prop_assert_eq!(aggregate(&combined), merged);
        }

        #[test]
        fn minutes_are_conserved(events in prop::collection::vec(arb_event(), 0..40)) {
            let expected: u64 = events.iter().map(|e| u64::from(e.minutes)).sum();
            let total: u64 = aggregate(&events).iter().map(|d| d.minutes).sum();
            prop_assert_eq!(total, expected);
        }
    }
}
