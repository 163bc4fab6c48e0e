//! Solver error types.
//!
//! Cycle rejections are recoverable: the construction and perturbation
//! operators catch them and re-randomize the offending station ordering.
//! Configuration and input errors are fatal and reported before any
//! generation runs. Retry exhaustion during search aborts the run.

use thiserror::Error;

use crate::models::TaskId;

/// Result alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors produced by the CPM engine and the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// Inserting the precedence edge would make the graph cyclic.
    /// The graph is left unchanged.
    #[error("precedence {from} -> {to} would create a cycle")]
    CycleDetected {
        /// Source task of the rejected edge.
        from: TaskId,
        /// Target task of the rejected edge.
        to: TaskId,
    },

    /// A precedence endpoint has not been added to the graph.
    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    /// No feasible station ordering was found within the reshuffle bound.
    #[error("no feasible ordering found after {attempts} reshuffles")]
    InfeasibleSolution {
        /// Number of reshuffle attempts made before giving up.
        attempts: usize,
    },

    /// An algorithm parameter fails validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The problem contains no tasks.
    #[error("no tasks supplied")]
    EmptyInput,
}
