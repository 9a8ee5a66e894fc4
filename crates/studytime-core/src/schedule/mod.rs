//! Schedule types: fixed commitments, tasks, preferences and the run input.

pub mod hhmm;
mod task;

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timeline::{RankingConfig, TimeInterval};

pub use task::{Difficulty, DifficultyProfile, Task};

/// What a fixed commitment represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentKind {
    #[default]
    Class,
    Job,
    Commute,
    Break,
}

/// A recurring weekly obligation that blocks study time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCommitment {
    pub label: String,
    #[serde(default)]
    pub kind: CommitmentKind,
    pub days: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl FixedCommitment {
    pub fn new(
        label: impl Into<String>,
        kind: CommitmentKind,
        days: Vec<Weekday>,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            days,
            start,
            end,
        }
    }

    /// Check if the commitment recurs on the given date
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.days.contains(&date.weekday())
    }

    /// The busy interval this commitment occupies on `date`
    pub fn interval_on(&self, date: NaiveDate) -> TimeInterval {
        TimeInterval::new(date, self.start, self.end)
    }
}

/// How tasks flagged as exams are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamPolicy {
    /// Exam flag is informational; exams get study sessions like any task
    #[default]
    Study,
    /// Exams become a single exam event at their class time instead of study sessions
    InClass,
}

/// Per-user scheduling preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(with = "hhmm", default = "default_wake")]
    pub wake: NaiveTime,
    #[serde(with = "hhmm", default = "default_sleep")]
    pub sleep: NaiveTime,
    /// Maximum newly allocated study minutes per date
    #[serde(default = "default_daily_cap")]
    pub daily_cap_minutes: i64,
    /// Free intervals shorter than this are not offered to the allocator
    #[serde(default = "default_min_block")]
    pub min_block_minutes: i64,
    #[serde(default)]
    pub exam_policy: ExamPolicy,
}

fn default_wake() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}
fn default_sleep() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default()
}
fn default_daily_cap() -> i64 {
    8 * 60
}
fn default_min_block() -> i64 {
    25
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            wake: default_wake(),
            sleep: default_sleep(),
            daily_cap_minutes: default_daily_cap(),
            min_block_minutes: default_min_block(),
            exam_policy: ExamPolicy::default(),
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.wake >= self.sleep {
            return Err(ValidationError::InvalidTimeRange {
                context: "wake/sleep window".to_string(),
                start: self.wake,
                end: self.sleep,
            });
        }
        if self.daily_cap_minutes <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "daily_cap_minutes".to_string(),
                message: format!("must be positive, got {}", self.daily_cap_minutes),
            });
        }
        if self.min_block_minutes < 0 {
            return Err(ValidationError::InvalidValue {
                field: "min_block_minutes".to_string(),
                message: format!("must not be negative, got {}", self.min_block_minutes),
            });
        }
        Ok(())
    }
}

/// Everything one scheduling run consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingInput {
    #[serde(default)]
    pub commitments: Vec<FixedCommitment>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub ranking: RankingConfig,
    /// The instant the run treats as "now"
    pub now: NaiveDateTime,
}

impl SchedulingInput {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            commitments: Vec::new(),
            tasks: Vec::new(),
            preferences: Preferences::default(),
            ranking: RankingConfig::default(),
            now,
        }
    }

    pub fn with_commitments(mut self, commitments: Vec<FixedCommitment>) -> Self {
        self.commitments = commitments;
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = ranking;
        self
    }

    /// Reject input the engine is not prepared to handle.
    ///
    /// # Errors
    /// Returns the first violation found: a bad preference, a commitment whose
    /// start is not before its end, a task with non-positive duration or a
    /// duplicated task id.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.preferences.validate()?;
        self.ranking.validate()?;

        for commitment in &self.commitments {
            if commitment.start >= commitment.end {
                return Err(ValidationError::InvalidTimeRange {
                    context: format!("commitment '{}'", commitment.label),
                    start: commitment.start,
                    end: commitment.end,
                });
            }
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.duration_minutes <= 0 {
                return Err(ValidationError::NonPositiveDuration {
                    task: task.name.clone(),
                    minutes: task.duration_minutes,
                });
            }
            if !seen.insert(task.id.as_str()) {
                return Err(ValidationError::DuplicateTaskId(task.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn commitment_deserializes_with_hhmm_times() {
        let json = r#"{
            "label": "CS 101",
            "kind": "class",
            "days": ["Mon", "Wednesday"],
            "start": "09:00",
            "end": "10:30"
        }"#;
        let commitment: FixedCommitment = serde_json::from_str(json).unwrap();
        assert_eq!(commitment.days, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(commitment.start, t(9, 0));
        assert_eq!(commitment.end, t(10, 30));

        let encoded = serde_json::to_value(&commitment).unwrap();
        assert_eq!(encoded["start"], "09:00");
        assert_eq!(encoded["end"], "10:30");
    }

    #[test]
    fn commitment_occurs_on_its_weekdays_only() {
        let commitment = FixedCommitment::new(
            "Shift",
            CommitmentKind::Job,
            vec![Weekday::Tue, Weekday::Thu],
            t(17, 0),
            t(21, 0),
        );
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert!(!commitment.occurs_on(monday));
        assert!(commitment.occurs_on(tuesday));
        assert_eq!(commitment.interval_on(tuesday).duration_minutes(), 240);
    }

    #[test]
    fn preferences_fill_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"wake": "07:30"}"#).unwrap();
        assert_eq!(prefs.wake, t(7, 30));
        assert_eq!(prefs.sleep, t(23, 0));
        assert_eq!(prefs.daily_cap_minutes, 480);
        assert_eq!(prefs.min_block_minutes, 25);
        assert_eq!(prefs.exam_policy, ExamPolicy::Study);
    }

    #[test]
    fn validate_accepts_empty_input() {
        assert!(SchedulingInput::new(now()).validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_commitment() {
        let input = SchedulingInput::new(now()).with_commitments(vec![FixedCommitment::new(
            "Backwards",
            CommitmentKind::Break,
            vec![Weekday::Mon],
            t(12, 0),
            t(11, 0),
        )]);
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_duration() {
        let task = Task::new("t", "Nothing", 0, now(), Difficulty::Easy);
        let input = SchedulingInput::new(now()).with_tasks(vec![task]);
        assert_eq!(
            input.validate(),
            Err(ValidationError::NonPositiveDuration {
                task: "Nothing".to_string(),
                minutes: 0
            })
        );
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let a = Task::new("same", "A", 30, now(), Difficulty::Easy);
        let b = Task::new("same", "B", 30, now(), Difficulty::Easy);
        let input = SchedulingInput::new(now()).with_tasks(vec![a, b]);
        assert_eq!(
            input.validate(),
            Err(ValidationError::DuplicateTaskId("same".to_string()))
        );
    }

    #[test]
    fn validate_rejects_wake_after_sleep() {
        let prefs = Preferences {
            wake: t(23, 0),
            sleep: t(8, 0),
            ..Preferences::default()
        };
        let input = SchedulingInput::new(now()).with_preferences(prefs);
        assert!(input.validate().is_err());
    }
}
