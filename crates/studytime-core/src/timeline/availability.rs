//! Day-by-day free time after fixed commitments.
//!
//! The builder seeds an [`AvailabilityMap`] once per run; the allocator then
//! reserves sessions out of it, so later tasks only see what earlier tasks
//! left behind.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::interval::{ceil_to_minute, discard_short, subtract, TimeInterval};
use crate::schedule::{FixedCommitment, Preferences};

/// Free intervals per calendar date, each list disjoint and time-ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilityMap {
    days: BTreeMap<NaiveDate, Vec<TimeInterval>>,
    #[serde(skip)]
    min_block_minutes: i64,
}

impl AvailabilityMap {
    pub fn new(min_block_minutes: i64) -> Self {
        Self {
            days: BTreeMap::new(),
            min_block_minutes,
        }
    }

    /// Free intervals on `date`; empty when the date is outside the horizon
    pub fn intervals(&self, date: NaiveDate) -> &[TimeInterval] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dates covered by the map, ascending
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[TimeInterval])> {
        self.days.iter().map(|(date, intervals)| (*date, intervals.as_slice()))
    }

    pub fn free_minutes(&self, date: NaiveDate) -> i64 {
        self.intervals(date)
            .iter()
            .map(TimeInterval::duration_minutes)
            .sum()
    }

    pub fn total_free_minutes(&self) -> i64 {
        self.days
            .values()
            .flatten()
            .map(TimeInterval::duration_minutes)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    /// Record the free intervals for a date, replacing any previous entry
    pub fn insert(&mut self, date: NaiveDate, mut intervals: Vec<TimeInterval>) {
        intervals.sort();
        discard_short(&mut intervals, self.min_block_minutes);
        self.days.insert(date, intervals);
    }

    /// Take `busy` out of the free time on its date.
    ///
    /// Leftover pieces shorter than the minimum usable block are dropped.
    pub fn reserve(&mut self, busy: &TimeInterval) {
        if let Some(intervals) = self.days.get_mut(&busy.date) {
            let mut remaining = subtract(intervals, busy);
            discard_short(&mut remaining, self.min_block_minutes);
            *intervals = remaining;
        }
    }
}

/// Builds the free-time map from weekly commitments and the wake/sleep window.
pub struct AvailabilityBuilder<'a> {
    commitments: &'a [FixedCommitment],
    wake: NaiveTime,
    sleep: NaiveTime,
    min_block_minutes: i64,
}

impl<'a> AvailabilityBuilder<'a> {
    pub fn new(preferences: &Preferences, commitments: &'a [FixedCommitment]) -> Self {
        Self {
            commitments,
            wake: preferences.wake,
            sleep: preferences.sleep,
            min_block_minutes: preferences.min_block_minutes,
        }
    }

    /// Build availability for every date from `now`'s date through `until`.
    ///
    /// An `until` before today yields an empty map.
    pub fn build(&self, now: NaiveDateTime, until: NaiveDate) -> AvailabilityMap {
        let mut map = AvailabilityMap::new(self.min_block_minutes);

        let mut date = now.date();
        while date <= until {
            map.insert(date, self.day_intervals(date, now));
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        tracing::debug!(
            days = map.days.len(),
            free_minutes = map.total_free_minutes(),
            "built availability"
        );
        map
    }

    /// Free intervals on one date, before the minimum-block filter.
    pub fn day_intervals(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<TimeInterval> {
        let Some(window) = self.waking_window(date, now) else {
            return Vec::new();
        };

        self.commitments
            .iter()
            .filter(|commitment| commitment.occurs_on(date))
            .fold(vec![window], |free, commitment| {
                subtract(&free, &commitment.interval_on(date))
            })
    }

    /// The `[wake, sleep)` window on `date`, starting no earlier than `now`.
    ///
    /// Past dates and days whose window has already elapsed have no window.
    fn waking_window(&self, date: NaiveDate, now: NaiveDateTime) -> Option<TimeInterval> {
        let start = if date < now.date() {
            return None;
        } else if date == now.date() {
            self.wake.max(ceil_to_minute(now.time())?)
        } else {
            self.wake
        };

        (start < self.sleep).then(|| TimeInterval::new(date, start, self.sleep))
    }
}
