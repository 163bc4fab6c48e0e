//! Job-shop problem instance.
//!
//! Bridges a flat task list into the structure the operators need: jobs are
//! contiguous slices of `processes_per_job` tasks in required precedence
//! order, and station (category) membership is the position index modulo
//! `processes_per_job`.

use std::collections::HashSet;

use crate::error::{Result, SolverError};
use crate::models::{Task, TaskId};

/// A job-shop instance: tasks grouped into equal-size jobs.
///
/// Task `k` of job `j` sits at index `j * processes_per_job + k` and runs
/// on station `k`. Every job visits the stations in the same order.
#[derive(Debug, Clone)]
pub struct JobShopProblem {
    tasks: Vec<Task>,
    processes_per_job: usize,
}

impl JobShopProblem {
    /// Creates a problem instance. Call [`JobShopProblem::validate`] before
    /// running the optimizer.
    pub fn new(tasks: Vec<Task>, processes_per_job: usize) -> Self {
        Self {
            tasks,
            processes_per_job,
        }
    }

    /// All tasks, job-major.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Operations per job (= number of stations).
    pub fn processes_per_job(&self) -> usize {
        self.processes_per_job
    }

    /// Number of jobs.
    pub fn jobs(&self) -> usize {
        if self.processes_per_job == 0 {
            0
        } else {
            self.tasks.len() / self.processes_per_job
        }
    }

    /// Iterates over the jobs, each a slice of `processes_per_job` tasks in
    /// precedence order.
    pub fn job_slices(&self) -> impl Iterator<Item = &[Task]> {
        self.tasks.chunks_exact(self.processes_per_job.max(1))
    }

    /// Task ids grouped by station, in job order within each group.
    pub fn station_tasks(&self) -> Vec<Vec<TaskId>> {
        if self.processes_per_job == 0 {
            return Vec::new();
        }
        let mut groups = vec![Vec::new(); self.processes_per_job];
        for (i, task) in self.tasks.iter().enumerate() {
            groups[i % self.processes_per_job].push(task.id);
        }
        groups
    }

    /// Checks structural integrity of the instance.
    ///
    /// Fails with [`SolverError::EmptyInput`] for a task-less instance and
    /// [`SolverError::InvalidConfiguration`] when `processes_per_job` does
    /// not evenly divide the task count, ids repeat, or a duration is
    /// negative.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(SolverError::EmptyInput);
        }
        if self.processes_per_job == 0 {
            return Err(SolverError::InvalidConfiguration(
                "processes_per_job must be at least 1".into(),
            ));
        }
        if self.tasks.len() % self.processes_per_job != 0 {
            return Err(SolverError::InvalidConfiguration(format!(
                "{} tasks cannot be split into jobs of {}",
                self.tasks.len(),
                self.processes_per_job
            )));
        }
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if task.duration < 0 {
                return Err(SolverError::InvalidConfiguration(format!(
                    "task {} has negative duration {}",
                    task.id, task.duration
                )));
            }
            if !seen.insert(task.id) {
                return Err(SolverError::InvalidConfiguration(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
        }
        Ok(())
    }
}
