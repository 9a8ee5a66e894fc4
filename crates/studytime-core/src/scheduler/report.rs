//! Result aggregation: per-task outcomes, summary counts and the flattened
//! event list handed to the presentation layer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{Allocation, ScheduleStatus, ScheduledSession};
use crate::schedule::{hhmm, Difficulty, Task};
use crate::timeline::{TimeInterval, Urgency};

/// What happened to one task during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub task_name: String,
    pub due: NaiveDateTime,
    pub placed_minutes: i64,
    pub remaining_minutes: i64,
    pub sessions: Vec<ScheduledSession>,
    pub status: ScheduleStatus,
}

/// Completion counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total: usize,
    pub scheduled: usize,
    pub incomplete: usize,
    pub overdue: usize,
    pub exams: usize,
}

/// One row of the calendar view.
///
/// Study sessions carry `scheduled`; incomplete and overdue tasks add a
/// zero-length marker at their deadline; in-class exams carry `exam`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub title: String,
    pub task_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub duration_minutes: i64,
    pub difficulty: Difficulty,
    pub status: ScheduleStatus,
    pub urgency: Urgency,
}

impl ScheduleEvent {
    /// Zero-length marker pinned to a task's deadline
    fn marker(task: &Task, title: String, status: ScheduleStatus, now: NaiveDateTime) -> Self {
        Self {
            title,
            task_id: task.id.clone(),
            date: task.due.date(),
            start: task.due.time(),
            end: task.due.time(),
            duration_minutes: 0,
            difficulty: task.difficulty,
            status,
            urgency: Urgency::classify(task.due, now),
        }
    }

    /// The time the event occupies; `None` for zero-length markers
    pub fn interval(&self) -> Option<TimeInterval> {
        (self.start < self.end).then(|| TimeInterval::new(self.date, self.start, self.end))
    }
}

/// Final output of a scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub generated_at: NaiveDateTime,
    /// Date-ordered events for rendering
    pub events: Vec<ScheduleEvent>,
    /// One outcome per input task, in input order
    pub outcomes: Vec<TaskOutcome>,
    pub summary: ScheduleSummary,
}

impl ScheduleReport {
    /// All placed sessions, date-ordered
    pub fn sessions(&self) -> Vec<&ScheduledSession> {
        let mut sessions: Vec<&ScheduledSession> =
            self.outcomes.iter().flat_map(|o| o.sessions.iter()).collect();
        sessions.sort_by_key(|s| (s.date, s.start));
        sessions
    }

    pub fn outcome(&self, task_id: &str) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.task_id == task_id)
    }
}

/// Collects outcomes as the run progresses and builds the report.
pub struct ResultAggregator {
    now: NaiveDateTime,
    entries: Vec<(usize, TaskOutcome, Vec<ScheduleEvent>)>,
}

impl ResultAggregator {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            entries: Vec::new(),
        }
    }

    /// Record the allocator's result for the task at input position `index`
    pub fn record_allocation(&mut self, index: usize, task: &Task, allocation: Allocation) {
        let placed_minutes = allocation.placed_minutes();
        let status = if allocation.is_complete() {
            ScheduleStatus::Scheduled
        } else if task.is_overdue_at(self.now) {
            ScheduleStatus::Overdue
        } else {
            ScheduleStatus::Incomplete
        };

        let urgency = Urgency::classify(task.due, self.now);
        let split = allocation.sessions.len() > 1;
        let mut events: Vec<ScheduleEvent> = allocation
            .sessions
            .iter()
            .enumerate()
            .map(|(i, session)| ScheduleEvent {
                title: if split {
                    format!("{} (Session {})", task.name, i + 1)
                } else {
                    task.name.clone()
                },
                task_id: task.id.clone(),
                date: session.date,
                start: session.start,
                end: session.end,
                duration_minutes: session.duration_minutes,
                difficulty: session.difficulty,
                status: session.status,
                urgency,
            })
            .collect();

        let marker_title = match status {
            ScheduleStatus::Incomplete => Some(format!(
                "INCOMPLETE: {} ({}min missing)",
                task.name, allocation.remaining_minutes
            )),
            ScheduleStatus::Overdue => Some(format!("OVERDUE: {}", task.name)),
            _ => None,
        };
        if let Some(title) = marker_title {
            events.push(ScheduleEvent::marker(task, title, status, self.now));
        }

        self.entries.push((
            index,
            TaskOutcome {
                task_id: task.id.clone(),
                task_name: task.name.clone(),
                due: task.due,
                placed_minutes,
                remaining_minutes: allocation.remaining_minutes,
                sessions: allocation.sessions,
                status,
            },
            events,
        ));
    }

    /// Record a task whose deadline passed before the run; it gets no time
    pub fn record_overdue(&mut self, index: usize, task: &Task) {
        let title = format!("OVERDUE: {}", task.name);
        let marker = ScheduleEvent::marker(task, title, ScheduleStatus::Overdue, self.now);
        self.entries.push((
            index,
            TaskOutcome {
                task_id: task.id.clone(),
                task_name: task.name.clone(),
                due: task.due,
                placed_minutes: 0,
                remaining_minutes: task.duration_minutes,
                sessions: Vec::new(),
                status: ScheduleStatus::Overdue,
            },
            vec![marker],
        ));
    }

    /// Record an exam handled by the in-class exam policy
    pub fn record_exam(&mut self, index: usize, task: &Task, event: ScheduleEvent) {
        self.entries.push((
            index,
            TaskOutcome {
                task_id: task.id.clone(),
                task_name: task.name.clone(),
                due: task.due,
                placed_minutes: 0,
                remaining_minutes: 0,
                sessions: Vec::new(),
                status: ScheduleStatus::Exam,
            },
            vec![event],
        ));
    }

    /// Build the report: outcomes in input order, events by date and time.
    pub fn finish(mut self) -> ScheduleReport {
        self.entries.sort_by_key(|(index, _, _)| *index);

        let mut summary = ScheduleSummary {
            total: self.entries.len(),
            ..ScheduleSummary::default()
        };
        let mut outcomes = Vec::with_capacity(self.entries.len());
        let mut events = Vec::new();

        for (_, outcome, task_events) in self.entries {
            match outcome.status {
                ScheduleStatus::Scheduled => summary.scheduled += 1,
                ScheduleStatus::Incomplete => summary.incomplete += 1,
                ScheduleStatus::Overdue => summary.overdue += 1,
                ScheduleStatus::Exam => summary.exams += 1,
            }
            outcomes.push(outcome);
            events.extend(task_events);
        }

        // Stable: same-time events keep input order
        events.sort_by_key(|event| (event.date, event.start));

        ScheduleReport {
            generated_at: self.now,
            events,
            outcomes,
            summary,
        }
    }
}
