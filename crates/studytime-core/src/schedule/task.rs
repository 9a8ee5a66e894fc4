//! Study tasks and the per-difficulty session rules.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Difficulty tier of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Session length bounds and ranking weight for a difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Shortest session worth scheduling, except for a task's final chunk
    pub min_session_minutes: i64,
    pub max_session_minutes: i64,
    /// Divides days-until-deadline when ranking; larger pulls a task earlier
    pub weight: f64,
}

const HARD: DifficultyProfile = DifficultyProfile {
    min_session_minutes: 60,
    max_session_minutes: 120,
    weight: 2.0,
};

const MEDIUM: DifficultyProfile = DifficultyProfile {
    min_session_minutes: 45,
    max_session_minutes: 90,
    weight: 1.5,
};

const EASY: DifficultyProfile = DifficultyProfile {
    min_session_minutes: 30,
    max_session_minutes: 60,
    weight: 1.0,
};

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Self::Hard => HARD,
            Self::Medium => MEDIUM,
            Self::Easy => EASY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// A unit of unscheduled work.
///
/// The engine never mutates a task; it only derives sessions from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Total work required, in minutes
    #[serde(alias = "duration")]
    pub duration_minutes: i64,
    /// Absolute deadline (local time)
    pub due: NaiveDateTime,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub is_exam: bool,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_minutes: i64,
        due: NaiveDateTime,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_minutes,
            due,
            difficulty,
            is_exam: false,
        }
    }

    /// Mark the task as an exam
    pub fn as_exam(mut self) -> Self {
        self.is_exam = true;
        self
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.difficulty.profile()
    }

    /// Whether the deadline had already passed at `now`
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        self.due < now
    }
}
