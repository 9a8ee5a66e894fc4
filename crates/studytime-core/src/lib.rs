//! # StudyTime Core Library
//!
//! This library provides the scheduling engine behind StudyTime. Given a
//! student's weekly commitments, their wake/sleep window and a list of tasks
//! with durations, deadlines and difficulties, it produces a concrete,
//! non-overlapping study plan. The `studytime-cli` binary is a thin layer over
//! the same library.
//!
//! ## Architecture
//!
//! - **Timeline**: Half-open intervals, the per-date availability map and the
//!   priority ranker
//! - **Scheduler**: Greedy allocation of task minutes and result aggregation
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`StudyScheduler`]: Runs availability, ranking, allocation and aggregation
//! - [`AvailabilityBuilder`]: Free time from commitments and the waking window
//! - [`PriorityRanker`]: Deadline/difficulty ordering of pending tasks
//! - [`GreedyAllocator`]: Places sessions into the earliest free time
//! - [`Config`]: Application configuration management
//!
//! The engine takes `now` from the caller and never reads the clock, so a run
//! with identical input always yields an identical report.

pub mod error;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod timeline;

pub use error::{ConfigError, CoreError, ValidationError};
pub use schedule::{
    CommitmentKind, Difficulty, DifficultyProfile, ExamPolicy, FixedCommitment, Preferences,
    SchedulingInput, Task,
};
pub use scheduler::{
    generate_schedule, Allocation, GreedyAllocator, ResultAggregator, ScheduleEvent,
    ScheduleReport, ScheduleStatus, ScheduleSummary, ScheduledSession, StudyScheduler,
    TaskOutcome,
};
pub use storage::Config;
pub use timeline::{
    AvailabilityBuilder, AvailabilityMap, PriorityRanker, RankedTask, RankingConfig, TimeInterval,
    Urgency,
};
