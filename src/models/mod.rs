//! Scheduling domain models.
//!
//! Core data types shared by the CPM engine and the optimizer. Tasks are
//! deliberately minimal (a stable integer id and a processing duration)
//! because candidates clone their state every neighborhood step.

mod task;

pub use task::{Task, TaskId};
