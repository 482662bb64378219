//! Error types for the construction and editing seams.
//!
//! Neither `solve_order` nor `schedule` returns these: both degrade to
//! documented defaults. Errors only surface where a caller hands us
//! configuration, a manual order, or a manual itinerary edit.

use chrono::NaiveTime;
use thiserror::Error;

/// A daily time window or break definition that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("window start {start} is not before its end {end}")]
    Inverted { start: NaiveTime, end: NaiveTime },

    #[error("break duration must be at least one minute")]
    ZeroDuration,
}

/// Invalid [`crate::config::ScheduleOptions`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} window: {source}")]
    Window {
        name: &'static str,
        #[source]
        source: WindowError,
    },

    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// A manual visiting order that is not a valid permutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("index {index} is out of range for {len} sites")]
    OutOfRange { index: usize, len: usize },

    #[error("index {0} appears more than once")]
    Duplicate(usize),

    #[error("pinned order must start at 0 and end at {last}")]
    EndpointsMoved { last: usize },

    #[error("position {position} cannot move")]
    Immovable { position: usize },
}

/// A manual itinerary edit rejected by the event log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("event index {index} is out of range ({len} events)")]
    OutOfRange { index: usize, len: usize },

    #[error("event ends before it starts")]
    EndsBeforeStart,

    #[error("day numbers start at 1")]
    DayZero,
}
