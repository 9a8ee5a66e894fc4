//! Greedy allocation of task minutes into free time.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use super::ScheduledSession;
use crate::schedule::Task;
use crate::timeline::{AvailabilityMap, TimeInterval};

/// Sessions produced for one task, plus whatever did not fit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub sessions: Vec<ScheduledSession>,
    pub remaining_minutes: i64,
}

impl Allocation {
    pub fn placed_minutes(&self) -> i64 {
        self.sessions.iter().map(|s| s.duration_minutes).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_minutes == 0
    }
}

/// Carves sessions out of the earliest free time, one task at a time.
///
/// Owns the run's availability map: every placed session is reserved before
/// the next task is considered, so sessions never overlap.
pub struct GreedyAllocator {
    availability: AvailabilityMap,
    daily_cap_minutes: i64,
    allocated: HashMap<NaiveDate, i64>,
    now: NaiveDateTime,
}

impl GreedyAllocator {
    pub fn new(availability: AvailabilityMap, daily_cap_minutes: i64, now: NaiveDateTime) -> Self {
        Self {
            availability,
            daily_cap_minutes,
            allocated: HashMap::new(),
            now,
        }
    }

    /// Minutes already allocated on `date` across all tasks so far
    pub fn allocated_on(&self, date: NaiveDate) -> i64 {
        self.allocated.get(&date).copied().unwrap_or(0)
    }

    pub fn availability(&self) -> &AvailabilityMap {
        &self.availability
    }

    /// Place as much of `task` as fits before its deadline.
    ///
    /// Dates are visited from today through the due date. On each date the
    /// earliest free interval that can take a chunk gets one, then the date is
    /// rescanned, until the task is done, the day's cap is used up or nothing
    /// fits. A chunk is capped by the remaining work, the interval, the
    /// difficulty's maximum session and the day's remaining cap, and must
    /// reach the minimum session length unless it finishes the task.
    pub fn allocate(&mut self, task: &Task) -> Allocation {
        let due_date = task.due.date();
        let mut remaining = task.duration_minutes;
        let mut sessions = Vec::new();

        let mut date = self.now.date();
        while date <= due_date && remaining > 0 {
            while remaining > 0 {
                let Some(slot) = self.next_slot(task, date, remaining) else {
                    break;
                };
                let minutes = slot.duration_minutes();
                self.availability.reserve(&slot);
                *self.allocated.entry(date).or_insert(0) += minutes;
                remaining -= minutes;

                tracing::debug!(
                    task = %task.name,
                    %date,
                    start = %slot.start.format("%H:%M"),
                    end = %slot.end.format("%H:%M"),
                    minutes,
                    "placed session"
                );
                sessions.push(ScheduledSession::from_slot(task, slot));
            }

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        // A final short chunk may land in a gap skipped earlier that day
        sessions.sort_by_key(|s| (s.date, s.start));

        Allocation {
            sessions,
            remaining_minutes: remaining,
        }
    }

    /// The earliest chunk of `task` that fits on `date`, if any.
    fn next_slot(&self, task: &Task, date: NaiveDate, remaining: i64) -> Option<TimeInterval> {
        let cap_left = self.daily_cap_minutes - self.allocated_on(date);
        if cap_left <= 0 {
            return None;
        }
        let profile = task.profile();

        self.availability.intervals(date).iter().find_map(|interval| {
            let usable = if date == task.due.date() {
                interval.truncate_to(task.due.time())?
            } else {
                *interval
            };

            let chunk = remaining
                .min(usable.duration_minutes())
                .min(profile.max_session_minutes)
                .min(cap_left);
            if chunk <= 0 || (chunk < profile.min_session_minutes && chunk < remaining) {
                return None;
            }
            usable.head(chunk)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Difficulty, Preferences};
    use crate::timeline::{AvailabilityBuilder, TimeInterval};
    use chrono::{Duration, NaiveTime};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn iv(date: NaiveDate, sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
        TimeInterval::new(date, t(sh, sm), t(eh, em))
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_time(t(h, m))
    }

    fn map_with(days: &[(NaiveDate, Vec<TimeInterval>)]) -> AvailabilityMap {
        let mut map = AvailabilityMap::new(25);
        for (date, intervals) in days {
            map.insert(*date, intervals.clone());
        }
        map
    }

    #[test]
    fn test_single_session_when_task_fits() {
        let map = map_with(&[(monday(), vec![iv(monday(), 8, 0, 23, 0)])]);
        let mut allocator = GreedyAllocator::new(map, 480, at(monday(), 8, 0));
        let task = Task::new("e", "Easy", 30, at(monday(), 22, 0), Difficulty::Easy);

        let allocation = allocator.allocate(&task);
        assert!(allocation.is_complete());
        assert_eq!(allocation.sessions.len(), 1);
        assert_eq!(allocation.sessions[0].interval(), iv(monday(), 8, 0, 8, 30));
        assert_eq!(allocator.availability().intervals(monday()), &[iv(monday(), 8, 30, 23, 0)]);
        assert_eq!(allocator.allocated_on(monday()), 30);
    }

    #[test]
    fn test_max_session_chunks_go_back_to_back() {
        let tuesday = monday().succ_opt().unwrap();
        let map = map_with(&[
            (monday(), vec![iv(monday(), 8, 0, 23, 0)]),
            (tuesday, vec![iv(tuesday, 8, 0, 23, 0)]),
        ]);
        let mut allocator = GreedyAllocator::new(map, 480, at(monday(), 8, 0));
        let task = Task::new("h", "Hard", 200, at(tuesday, 23, 0), Difficulty::Hard);

        let allocation = allocator.allocate(&task);
        assert!(allocation.is_complete());
        let slots: Vec<TimeInterval> = allocation.sessions.iter().map(|s| s.interval()).collect();
        assert_eq!(slots, vec![iv(monday(), 8, 0, 10, 0), iv(monday(), 10, 0, 11, 20)]);
        assert_eq!(allocator.availability().intervals(tuesday), &[iv(tuesday, 8, 0, 23, 0)]);
    }

    #[test]
    fn test_long_task_due_today_fills_one_interval() {
        let map = map_with(&[(monday(), vec![iv(monday(), 8, 0, 23, 0)])]);
        let mut allocator = GreedyAllocator::new(map, 480, at(monday(), 8, 0));
        let task = Task::new("h", "Hard", 240, at(monday(), 23, 0), Difficulty::Hard);

        let allocation = allocator.allocate(&task);
        assert!(allocation.is_complete());
        let slots: Vec<TimeInterval> = allocation.sessions.iter().map(|s| s.interval()).collect();
        assert_eq!(slots, vec![iv(monday(), 8, 0, 10, 0), iv(monday(), 10, 0, 12, 0)]);
        assert_eq!(allocator.allocated_on(monday()), 240);
    }

    #[test]
    fn test_rescan_stops_at_daily_cap() {
        let tuesday = monday().succ_opt().unwrap();
        let map = map_with(&[
            (monday(), vec![iv(monday(), 8, 0, 23, 0)]),
            (tuesday, vec![iv(tuesday, 8, 0, 23, 0)]),
        ]);
        let mut allocator = GreedyAllocator::new(map, 150, at(monday(), 8, 0));
        let task = Task::new("e", "Easy", 200, at(tuesday, 23, 0), Difficulty::Easy);

        let allocation = allocator.allocate(&task);
        assert!(allocation.is_complete());
        let slots: Vec<TimeInterval> = allocation.sessions.iter().map(|s| s.interval()).collect();
        assert_eq!(
            slots,
            vec![
                iv(monday(), 8, 0, 9, 0),
                iv(monday(), 9, 0, 10, 0),
                iv(monday(), 10, 0, 10, 30),
                iv(tuesday, 8, 0, 8, 50),
            ]
        );
        assert_eq!(allocator.allocated_on(monday()), 150);
        assert_eq!(allocator.allocated_on(tuesday), 50);
    }

    #[test]
    fn test_final_short_chunk_in_earlier_gap_is_ordered() {
        let map = map_with(&[(
            monday(),
            vec![iv(monday(), 8, 0, 8, 40), iv(monday(), 10, 0, 12, 0)],
        )]);
        let mut allocator = GreedyAllocator::new(map, 480, at(monday(), 8, 0));
        let task = Task::new("h", "Hard", 160, at(monday(), 23, 0), Difficulty::Hard);

        let allocation = allocator.allocate(&task);
        assert!(allocation.is_complete());
        let slots: Vec<TimeInterval> = allocation.sessions.iter().map(|s| s.interval()).collect();
        assert_eq!(slots, vec![iv(monday(), 8, 0, 8, 40), iv(monday(), 10, 0, 12, 0)]);
    }

    #[test]
    fn test_short_gap_skipped_unless_final_chunk() {
        let map = map_with(&[(
            monday(),
            vec![iv(monday(), 8, 0, 8, 40), iv(monday(), 10, 0, 12, 0)],
        )]);
        let mut allocator = GreedyAllocator::new(map.clone(), 480, at(monday(), 8, 0));

        // 40 minutes is below Hard's 60-minute minimum and not the final chunk
        let hard = Task::new("h", "Hard", 90, at(monday(), 23, 0), Difficulty::Hard);
        let allocation = allocator.allocate(&hard);
        assert_eq!(allocation.sessions.len(), 1);
        assert_eq!(allocation.sessions[0].interval(), iv(monday(), 10, 0, 11, 30));

        // A 40-minute Hard task fits the short gap as its only (final) chunk
        let mut allocator = GreedyAllocator::new(map, 480, at(monday(), 8, 0));
        let small = Task::new("s", "Small", 40, at(monday(), 23, 0), Difficulty::Hard);
        let allocation = allocator.allocate(&small);
        assert_eq!(allocation.sessions[0].interval(), iv(monday(), 8, 0, 8, 40));
    }

    #[test]
    fn test_sessions_end_by_due_time() {
        let map = map_with(&[(monday(), vec![iv(monday(), 8, 0, 23, 0)])]);
        let mut allocator = GreedyAllocator::new(map, 480, at(monday(), 8, 0));
        let task = Task::new("m", "Medium", 300, at(monday(), 9, 15), Difficulty::Medium);

        let allocation = allocator.allocate(&task);
        assert_eq!(allocation.sessions.len(), 1);
        assert_eq!(allocation.sessions[0].interval(), iv(monday(), 8, 0, 9, 15));
        assert_eq!(allocation.remaining_minutes, 225);
    }

    #[test]
    fn test_daily_cap_is_shared_across_tasks() {
        let map = map_with(&[(monday(), vec![iv(monday(), 8, 0, 23, 0)])]);
        let mut allocator = GreedyAllocator::new(map, 90, at(monday(), 8, 0));
        let due = at(monday(), 23, 0);

        let first = allocator.allocate(&Task::new("a", "A", 60, due, Difficulty::Easy));
        assert!(first.is_complete());

        // Only 30 minutes of cap remain: below Medium's minimum, not final
        let second = allocator.allocate(&Task::new("b", "B", 60, due, Difficulty::Medium));
        assert!(second.sessions.is_empty());
        assert_eq!(second.remaining_minutes, 60);

        // ...but enough to finish a 30-minute task
        let third = allocator.allocate(&Task::new("c", "C", 30, due, Difficulty::Medium));
        assert!(third.is_complete());
        assert_eq!(allocator.allocated_on(monday()), 90);
    }

    #[test]
    fn test_no_time_leaves_task_incomplete() {
        let prefs = Preferences::default();
        let now = at(monday(), 22, 50);
        let map = AvailabilityBuilder::new(&prefs, &[]).build(now, monday());
        let mut allocator = GreedyAllocator::new(map, 480, now);
        let task = Task::new("x", "X", 60, now + Duration::minutes(5), Difficulty::Easy);

        let allocation = allocator.allocate(&task);
        assert!(allocation.sessions.is_empty());
        assert_eq!(allocation.placed_minutes(), 0);
        assert_eq!(allocation.remaining_minutes, 60);
    }
}
