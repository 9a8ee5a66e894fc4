//! Task ranking module.
//!
//! Orders pending tasks by a deadline/difficulty score:
//!
//! ```text
//! score = days_until_deadline / weight(difficulty) - duration / duration_scale
//! ```
//!
//! Lower scores are scheduled first. Dividing by the difficulty weight pulls
//! harder tasks forward; the duration term nudges longer tasks slightly ahead
//! of equally urgent shorter ones.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schedule::Task;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Minutes of task duration worth one point of score (default 1000)
    #[serde(default = "default_duration_scale")]
    pub duration_scale: f64,
}

fn default_duration_scale() -> f64 {
    1000.0
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            duration_scale: default_duration_scale(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.duration_scale.is_finite() && self.duration_scale > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "duration_scale".to_string(),
                message: format!("must be a positive number, got {}", self.duration_scale),
            });
        }
        Ok(())
    }
}

/// A pending task with its rank score.
#[derive(Debug, Clone, Copy)]
pub struct RankedTask<'a> {
    /// Position of the task in the caller's task list
    pub index: usize,
    pub task: &'a Task,
    pub score: f64,
}

/// Ranks pending tasks for the allocator
pub struct PriorityRanker {
    config: RankingConfig,
    now: NaiveDateTime,
}

impl PriorityRanker {
    /// Create a ranker with the default configuration
    pub fn new(now: NaiveDateTime) -> Self {
        Self::with_config(RankingConfig::default(), now)
    }

    pub fn with_config(config: RankingConfig, now: NaiveDateTime) -> Self {
        Self { config, now }
    }

    /// Score a task; lower is more urgent
    pub fn score(&self, task: &Task) -> f64 {
        let days = days_until(task.due, self.now);
        days / task.profile().weight - task.duration_minutes as f64 / self.config.duration_scale
    }

    /// Rank the pending tasks among `tasks`.
    ///
    /// Tasks already past their deadline are left out. Equal scores fall back
    /// to the earlier deadline, then to input order.
    pub fn rank<'a, I>(&self, tasks: I) -> Vec<RankedTask<'a>>
    where
        I: IntoIterator<Item = (usize, &'a Task)>,
    {
        let mut ranked: Vec<RankedTask<'a>> = tasks
            .into_iter()
            .filter(|(_, task)| !task.is_overdue_at(self.now))
            .map(|(index, task)| RankedTask {
                index,
                task,
                score: self.score(task),
            })
            .collect();

        // sort_by is stable, so input order survives full ties
        ranked.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.task.due.cmp(&b.task.due))
        });

        ranked
    }

    /// Rank every pending task in a slice
    pub fn rank_all<'a>(&self, tasks: &'a [Task]) -> Vec<RankedTask<'a>> {
        self.rank(tasks.iter().enumerate())
    }
}

/// Fractional days from `now` until `due`, never negative.
pub fn days_until(due: NaiveDateTime, now: NaiveDateTime) -> f64 {
    let remaining = due.signed_duration_since(now);
    if remaining <= Duration::zero() {
        return 0.0;
    }
    remaining.num_seconds() as f64 / SECONDS_PER_DAY
}

/// How pressing a deadline is relative to `now`, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueToday,
    DueTomorrow,
    Normal,
}

impl Urgency {
    pub fn classify(due: NaiveDateTime, now: NaiveDateTime) -> Self {
        if due < now {
            Self::Overdue
        } else if due.date() == now.date() {
            Self::DueToday
        } else if Some(due.date()) == now.date().succ_opt() {
            Self::DueTomorrow
        } else {
            Self::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Difficulty;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn task(id: &str, minutes: i64, due_in_hours: i64, difficulty: Difficulty) -> Task {
        Task::new(id, id, minutes, now() + Duration::hours(due_in_hours), difficulty)
    }

    fn order(ranked: &[RankedTask<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.task.id.clone()).collect()
    }

    #[test]
    fn test_days_until_is_fractional_and_clamped() {
        assert_eq!(days_until(now() + Duration::hours(36), now()), 1.5);
        assert_eq!(days_until(now() - Duration::hours(1), now()), 0.0);
        assert_eq!(days_until(now(), now()), 0.0);
    }

    #[test]
    fn test_score_formula() {
        let ranker = PriorityRanker::new(now());
        let hard = task("hard", 120, 72, Difficulty::Hard);
        // 3 days / 2.0 - 120 / 1000
        assert!((ranker.score(&hard) - (1.5 - 0.12)).abs() < 1e-9);

        let easy = task("easy", 30, 24, Difficulty::Easy);
        assert!((ranker.score(&easy) - (1.0 - 0.03)).abs() < 1e-9);
    }

    #[test]
    fn test_earlier_deadline_ranks_first() {
        let ranker = PriorityRanker::new(now());
        let tasks = vec![
            task("later", 60, 96, Difficulty::Medium),
            task("sooner", 60, 24, Difficulty::Medium),
        ];
        assert_eq!(order(&ranker.rank_all(&tasks)), vec!["sooner", "later"]);
    }

    #[test]
    fn test_difficulty_weight_pulls_hard_tasks_forward() {
        let ranker = PriorityRanker::new(now());
        // Same deadline: Hard 2.0/2.0 = 1.0 beats Easy 2.0/1.0 = 2.0
        let tasks = vec![
            task("easy", 60, 48, Difficulty::Easy),
            task("hard", 60, 48, Difficulty::Hard),
        ];
        assert_eq!(order(&ranker.rank_all(&tasks)), vec!["hard", "easy"]);
    }

    #[test]
    fn test_overdue_tasks_are_not_ranked() {
        let ranker = PriorityRanker::new(now());
        let tasks = vec![
            task("late", 60, -1, Difficulty::Hard),
            task("ok", 60, 5, Difficulty::Easy),
        ];
        let ranked = ranker.rank_all(&tasks);
        assert_eq!(order(&ranked), vec!["ok"]);
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn test_ties_break_on_deadline_then_input_order() {
        // With a huge scale the duration term vanishes, leaving days / weight.
        let config = RankingConfig {
            duration_scale: 1e12,
        };
        let ranker = PriorityRanker::with_config(config, now());
        let tasks = vec![
            task("b", 30, 48, Difficulty::Easy),
            task("a", 30, 48, Difficulty::Easy),
            task("c", 45, 48, Difficulty::Easy),
        ];
        let ranked = ranker.rank_all(&tasks);
        assert_eq!(ranked[0].task.id, "c");
        assert_eq!(order(&ranked[1..]), vec!["b", "a"]);

        // Equal score through different routes: Hard due in 4 days vs Easy in 2
        let tasks = vec![
            task("easy", 30, 48, Difficulty::Easy),
            task("hard", 30, 96, Difficulty::Hard),
        ];
        let plain = PriorityRanker::new(now());
        assert_eq!(plain.score(&tasks[0]), plain.score(&tasks[1]));
        assert_eq!(order(&plain.rank_all(&tasks)), vec!["easy", "hard"]);
    }

    #[test]
    fn test_duration_scale_is_configurable() {
        let tasks = vec![
            task("short", 30, 48, Difficulty::Medium),
            task("long", 600, 50, Difficulty::Medium),
        ];
        // Default scale: 1.333 - 0.03 vs 1.389 - 0.6 -> long first
        let ranked = PriorityRanker::new(now()).rank_all(&tasks);
        assert_eq!(order(&ranked), vec!["long", "short"]);

        let gentle = RankingConfig {
            duration_scale: 100_000.0,
        };
        let ranked = PriorityRanker::with_config(gentle, now()).rank_all(&tasks);
        assert_eq!(order(&ranked), vec!["short", "long"]);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        assert!(RankingConfig { duration_scale: 0.0 }.validate().is_err());
        assert!(RankingConfig {
            duration_scale: f64::NAN
        }
        .validate()
        .is_err());
        assert!(RankingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_urgency_classification() {
        assert_eq!(Urgency::classify(now() - Duration::minutes(1), now()), Urgency::Overdue);
        assert_eq!(Urgency::classify(now() + Duration::hours(3), now()), Urgency::DueToday);
        assert_eq!(Urgency::classify(now() + Duration::hours(20), now()), Urgency::DueTomorrow);
        assert_eq!(Urgency::classify(now() + Duration::hours(72), now()), Urgency::Normal);
    }
}
