//! Half-open time intervals on a single calendar date and interval subtraction.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::schedule::hhmm;

/// A span `[start, end)` on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        debug_assert!(start < end, "interval start must precede end");
        Self { date, start, end }
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this interval can hold a block of the given length
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes() >= minutes
    }

    /// Whether two intervals share any time on the same date
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }

    /// The first `minutes` of this interval, if they fit
    pub fn head(&self, minutes: i64) -> Option<TimeInterval> {
        if minutes <= 0 || !self.can_fit(minutes) {
            return None;
        }
        Some(TimeInterval::new(
            self.date,
            self.start,
            self.start + Duration::minutes(minutes),
        ))
    }

    /// Cut the interval off at `limit`; `None` if nothing remains before it
    pub fn truncate_to(&self, limit: NaiveTime) -> Option<TimeInterval> {
        let end = self.end.min(limit);
        (self.start < end).then(|| TimeInterval::new(self.date, self.start, end))
    }
}

/// Remove `busy` from a disjoint, ordered list of free intervals.
///
/// Each free interval is either left alone (no overlap), dropped (fully
/// covered), truncated (edge overlap) or split in two (`busy` strictly
/// inside). The result stays disjoint and ordered.
pub fn subtract(free: &[TimeInterval], busy: &TimeInterval) -> Vec<TimeInterval> {
    let mut remaining = Vec::with_capacity(free.len() + 1);

    for interval in free {
        if !interval.overlaps(busy) {
            remaining.push(*interval);
            continue;
        }

        if interval.start < busy.start {
            remaining.push(TimeInterval::new(interval.date, interval.start, busy.start));
        }
        if busy.end < interval.end {
            remaining.push(TimeInterval::new(interval.date, busy.end, interval.end));
        }
    }

    remaining
}

/// Drop intervals too short to be useful.
pub fn discard_short(intervals: &mut Vec<TimeInterval>, min_minutes: i64) {
    intervals.retain(|interval| interval.duration_minutes() >= min_minutes);
}

/// Round a time of day up to the next whole minute.
///
/// Returns `None` when rounding would cross midnight.
pub fn ceil_to_minute(time: NaiveTime) -> Option<NaiveTime> {
    if time.second() == 0 && time.nanosecond() == 0 {
        return Some(time);
    }
    let floor = time.with_second(0)?.with_nanosecond(0)?;
    let (next, wrapped) = floor.overflowing_add_signed(Duration::minutes(1));
    (wrapped == 0).then_some(next)
}
