//! Automatic scheduler for study sessions.
//!
//! One run goes through four stages, in order:
//! - Builds the free-time map from fixed commitments and the wake/sleep window
//! - Ranks pending tasks by deadline and difficulty
//! - Greedily allocates each task into the earliest free time, mutating the map
//! - Aggregates per-task outcomes into a report
//!
//! The run is a pure function of its input, including the caller's `now`.

mod allocator;
mod exam;
mod report;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::schedule::{
    hhmm, Difficulty, ExamPolicy, FixedCommitment, Preferences, SchedulingInput, Task,
};
use crate::timeline::{AvailabilityBuilder, AvailabilityMap, PriorityRanker, RankingConfig, TimeInterval};

pub use allocator::{Allocation, GreedyAllocator};
pub use exam::{exam_event, matching_class};
pub use report::{ResultAggregator, ScheduleEvent, ScheduleReport, ScheduleSummary, TaskOutcome};

/// Status tag carried by sessions, events and task outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Incomplete,
    Overdue,
    Exam,
}

/// A block of study time placed for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub task_id: String,
    pub task_name: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub duration_minutes: i64,
    pub difficulty: Difficulty,
    pub status: ScheduleStatus,
}

impl ScheduledSession {
    /// Create a session for `task` occupying `slot`
    pub fn from_slot(task: &Task, slot: TimeInterval) -> Self {
        Self {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            date: slot.date,
            start: slot.start,
            end: slot.end,
            duration_minutes: slot.duration_minutes(),
            difficulty: task.difficulty,
            status: ScheduleStatus::Scheduled,
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.date, self.start, self.end)
    }
}

/// Automatic scheduler for study tasks
#[derive(Debug, Clone, Default)]
pub struct StudyScheduler {
    preferences: Preferences,
    ranking: RankingConfig,
}

impl StudyScheduler {
    /// Create a scheduler with the given preferences and default ranking
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            ranking: RankingConfig::default(),
        }
    }

    pub fn with_ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Whether `task` becomes an exam event instead of being studied for
    fn is_in_class_exam(&self, task: &Task) -> bool {
        task.is_exam && self.preferences.exam_policy == ExamPolicy::InClass
    }

    /// The free time a run starts from.
    ///
    /// Covers `now` through the latest deadline among tasks that will be
    /// allocated, with in-class exam slots already taken out. Empty when no
    /// task is pending.
    pub fn build_availability(
        &self,
        commitments: &[FixedCommitment],
        tasks: &[Task],
        now: NaiveDateTime,
    ) -> AvailabilityMap {
        let horizon = tasks
            .iter()
            .filter(|task| !self.is_in_class_exam(task) && !task.is_overdue_at(now))
            .map(|task| task.due.date())
            .max();
        let Some(until) = horizon else {
            return AvailabilityMap::new(self.preferences.min_block_minutes);
        };

        let mut availability = AvailabilityBuilder::new(&self.preferences, commitments).build(now, until);
        for task in tasks.iter().filter(|task| self.is_in_class_exam(task)) {
            if let Some(slot) = exam_event(task, commitments, now).interval() {
                availability.reserve(&slot);
            }
        }
        availability
    }

    /// Generate the schedule for `tasks` around `commitments`.
    ///
    /// # Arguments
    /// * `commitments` - Weekly fixed commitments (classes, jobs, commutes, breaks)
    /// * `tasks` - Tasks to place; overdue ones are reported, not allocated
    /// * `now` - The instant the run treats as the present
    ///
    /// # Returns
    /// The report with flattened events, per-task outcomes and summary counts
    pub fn generate_schedule(
        &self,
        commitments: &[FixedCommitment],
        tasks: &[Task],
        now: NaiveDateTime,
    ) -> ScheduleReport {
        tracing::info!(
            tasks = tasks.len(),
            commitments = commitments.len(),
            now = %now,
            "generating schedule"
        );

        let mut aggregator = ResultAggregator::new(now);

        // 1. Route exams and overdue tasks away from allocation
        let mut allocatable = Vec::with_capacity(tasks.len());
        for (index, task) in tasks.iter().enumerate() {
            if self.is_in_class_exam(task) {
                aggregator.record_exam(index, task, exam_event(task, commitments, now));
            } else if task.is_overdue_at(now) {
                tracing::debug!(task = %task.name, due = %task.due, "task is overdue");
                aggregator.record_overdue(index, task);
            } else {
                allocatable.push((index, task));
            }
        }

        // 2. Build free time up to the latest pending deadline
        let availability = self.build_availability(commitments, tasks, now);

        // 3. Rank
        let ranker = PriorityRanker::with_config(self.ranking.clone(), now);
        let ranked = ranker.rank(allocatable);

        // 4. Allocate in rank order
        let mut allocator = GreedyAllocator::new(availability, self.preferences.daily_cap_minutes, now);
        for entry in ranked {
            let allocation = allocator.allocate(entry.task);
            if !allocation.is_complete() {
                tracing::warn!(
                    task = %entry.task.name,
                    missing_minutes = allocation.remaining_minutes,
                    "could not fit task before its deadline"
                );
            }
            aggregator.record_allocation(entry.index, entry.task, allocation);
        }

        // 5. Aggregate
        let report = aggregator.finish();
        tracing::info!(
            scheduled = report.summary.scheduled,
            incomplete = report.summary.incomplete,
            overdue = report.summary.overdue,
            exams = report.summary.exams,
            "schedule complete"
        );
        report
    }
}

/// Run a full schedule from a validated input
pub fn generate_schedule(input: &SchedulingInput) -> ScheduleReport {
    StudyScheduler::new(input.preferences.clone())
        .with_ranking(input.ranking.clone())
        .generate_schedule(&input.commitments, &input.tasks, input.now)
}
