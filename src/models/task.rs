//! Task model.
//!
//! A task is one operation of one job, processed on exactly one station.
//! Tasks are immutable once created; all scheduling state (start/finish
//! times, sequencing) lives in [`crate::cpm::ScheduleGraph`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable task identifier.
///
/// Ids are assigned once (by the input layer or by hand) and never change;
/// the graph's precedence edges and the candidates' ordering lists both
/// refer to tasks by id only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit of work with a fixed processing duration.
///
/// # Time Representation
/// Durations are non-negative integers in whatever unit the input uses
/// (the demand parser produces minutes). The solver only compares and
/// adds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Processing duration.
    pub duration: i64,
}

impl Task {
    /// Creates a new task.
    pub fn new(id: TaskId, duration: i64) -> Self {
        Self { id, duration }
    }
}
