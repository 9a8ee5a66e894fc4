//! Core error types for studytime-core.
//!
//! The scheduling engine itself never fails: it assumes validated input and
//! reports unsatisfiable work through task statuses. Errors here cover input
//! validation and the configuration file.

use std::path::PathBuf;

use chrono::NaiveTime;
use thiserror::Error;

/// Core error type for studytime-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Validation errors raised before a scheduling run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range for {context}: end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        context: String,
        start: NaiveTime,
        end: NaiveTime,
    },

    /// Task with zero or negative duration
    #[error("Task '{task}' has non-positive duration ({minutes} min)")]
    NonPositiveDuration { task: String, minutes: i64 },

    /// Two tasks share an id, so sessions could not be attributed
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
