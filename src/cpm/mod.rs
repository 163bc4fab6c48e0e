//! Critical Path Method engine.
//!
//! [`ScheduleGraph`] owns a precedence DAG of tasks and computes earliest
//! and latest start/finish times, the makespan, and the critical path.
//! Results are cached and recomputed lazily after mutations.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

mod graph;

pub use graph::{NodeTiming, ScheduleGraph};
