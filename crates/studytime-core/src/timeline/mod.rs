//! Timeline: free-time intervals and task ranking.
//!
//! This module provides:
//! - Half-open time intervals and pure interval subtraction
//! - The per-date availability map built from fixed commitments
//! - The priority ranker that orders pending tasks

mod availability;
mod interval;
mod priority;

pub use availability::{AvailabilityBuilder, AvailabilityMap};
pub use interval::{ceil_to_minute, discard_short, subtract, TimeInterval};
pub use priority::{days_until, PriorityRanker, RankedTask, RankingConfig, Urgency};
