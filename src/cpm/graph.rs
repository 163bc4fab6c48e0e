//! Precedence DAG with cached critical-path analysis.

use std::collections::HashMap;

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{Result, SolverError};
use crate::models::{Task, TaskId};

/// Computed start/finish times for one task.
///
/// Populated by the forward and backward passes. For every task,
/// `earliest_finish - earliest_start` and `latest_finish - latest_start`
/// both equal the task's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTiming {
    /// Earliest start.
    pub earliest_start: i64,
    /// Earliest finish.
    pub earliest_finish: i64,
    /// Latest start that does not delay the makespan.
    pub latest_start: i64,
    /// Latest finish that does not delay the makespan.
    pub latest_finish: i64,
}

impl NodeTiming {
    /// Slack between earliest and latest start.
    pub fn total_float(&self) -> i64 {
        self.latest_start - self.earliest_start
    }

    /// Whether the task lies on the critical path.
    pub fn is_critical(&self) -> bool {
        self.earliest_finish == self.latest_finish
    }
}

/// A directed acyclic graph of tasks with precedence edges.
///
/// Edges encode "must finish before the target can start". The graph stays
/// acyclic at all times: [`ScheduleGraph::add_precedence`] rejects any edge
/// that would close a cycle, without mutating the graph.
///
/// Makespan, per-task timings, and the critical path are computed in one
/// full pass the first time they are read after a mutation, then served
/// from cache until the next mutation.
#[derive(Debug, Clone)]
pub struct ScheduleGraph {
    graph: DiGraph<TaskId, ()>,
    indices: HashMap<TaskId, NodeIndex>,
    durations: HashMap<TaskId, i64>,
    timings: HashMap<TaskId, NodeTiming>,
    critical: Vec<TaskId>,
    makespan: i64,
    dirty: bool,
}

impl Default for ScheduleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            indices: HashMap::new(),
            durations: HashMap::new(),
            timings: HashMap::new(),
            critical: Vec::new(),
            makespan: 0,
            dirty: true,
        }
    }

    /// Number of tasks in the graph.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no tasks.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether a task with this id is present.
    pub fn contains(&self, id: TaskId) -> bool {
        self.indices.contains_key(&id)
    }

    /// Processing duration of a task, if present.
    pub fn duration(&self, id: TaskId) -> Option<i64> {
        self.durations.get(&id).copied()
    }

    /// Number of precedence edges.
    pub fn precedence_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds a task node. Re-adding an existing id updates its duration.
    pub fn add_task(&mut self, task: Task) {
        if !self.indices.contains_key(&task.id) {
            let ix = self.graph.add_node(task.id);
            self.indices.insert(task.id, ix);
        }
        self.durations.insert(task.id, task.duration);
        self.dirty = true;
    }

    /// Adds a precedence edge `from -> to`.
    ///
    /// Fails with [`SolverError::CycleDetected`] if the edge would make the
    /// graph cyclic; the graph is left unchanged in that case. Inserting an
    /// edge that already exists is a no-op success.
    pub fn add_precedence(&mut self, from: TaskId, to: TaskId) -> Result<()> {
        let u = *self.indices.get(&from).ok_or(SolverError::UnknownTask(from))?;
        let v = *self.indices.get(&to).ok_or(SolverError::UnknownTask(to))?;
        if from == to || has_path_connecting(&self.graph, v, u, None) {
            return Err(SolverError::CycleDetected { from, to });
        }
        if self.graph.find_edge(u, v).is_none() {
            self.graph.add_edge(u, v, ());
        }
        self.dirty = true;
        Ok(())
    }

    /// Removes the precedence edge `from -> to` if present.
    ///
    /// Returns whether an edge was removed.
    pub fn remove_precedence(&mut self, from: TaskId, to: TaskId) -> bool {
        let (Some(&u), Some(&v)) = (self.indices.get(&from), self.indices.get(&to)) else {
            return false;
        };
        match self.graph.find_edge(u, v) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Whether the precedence edge `from -> to` exists.
    pub fn has_precedence(&self, from: TaskId, to: TaskId) -> bool {
        match (self.indices.get(&from), self.indices.get(&to)) {
            (Some(&u), Some(&v)) => self.graph.find_edge(u, v).is_some(),
            _ => false,
        }
    }

    /// Total time to complete all tasks (maximum earliest finish).
    ///
    /// Recomputes all timings if the graph changed since the last read.
    /// Returns 0 for an empty graph.
    pub fn makespan(&mut self) -> i64 {
        self.refresh();
        self.makespan
    }

    /// Tasks whose earliest and latest finish coincide, in topological order.
    ///
    /// Any delay on these tasks delays the makespan. Recomputes if dirty.
    pub fn critical_path(&mut self) -> &[TaskId] {
        self.refresh();
        &self.critical
    }

    /// Computed timing for a task. Recomputes if dirty.
    pub fn timing(&mut self, id: TaskId) -> Option<NodeTiming> {
        self.refresh();
        self.timings.get(&id).copied()
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.recompute();
        }
    }

    /// Full recompute: forward pass, makespan, backward pass, critical set.
    fn recompute(&mut self) {
        let order = toposort(&self.graph, None)
            .expect("precedence graph is kept acyclic by add_precedence");

        let mut timings: HashMap<TaskId, NodeTiming> = HashMap::with_capacity(order.len());

        for &ix in &order {
            let id = self.graph[ix];
            let duration = self.durations.get(&id).copied().unwrap_or(0);
            let earliest_start = self
                .graph
                .neighbors_directed(ix, Direction::Incoming)
                .map(|pred| timings[&self.graph[pred]].earliest_finish)
                .max()
                .unwrap_or(0);
            timings.insert(
                id,
                NodeTiming {
                    earliest_start,
                    earliest_finish: earliest_start + duration,
                    latest_start: 0,
                    latest_finish: 0,
                },
            );
        }

        let makespan = timings
            .values()
            .map(|t| t.earliest_finish)
            .max()
            .unwrap_or(0);

        for &ix in order.iter().rev() {
            let id = self.graph[ix];
            let duration = self.durations.get(&id).copied().unwrap_or(0);
            let latest_finish = self
                .graph
                .neighbors_directed(ix, Direction::Outgoing)
                .map(|succ| timings[&self.graph[succ]].latest_start)
                .min()
                .unwrap_or(makespan);
            if let Some(t) = timings.get_mut(&id) {
                t.latest_finish = latest_finish;
                t.latest_start = latest_finish - duration;
            }
        }

        self.critical = order
            .iter()
            .map(|&ix| self.graph[ix])
            .filter(|id| timings[id].is_critical())
            .collect();
        self.makespan = makespan;
        self.timings = timings;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_tasks(durations: &[i64]) -> ScheduleGraph {
        let mut g = ScheduleGraph::new();
        for (i, &d) in durations.iter().enumerate() {
            g.add_task(Task::new(TaskId(i as u32 + 1), d));
        }
        g
    }

    #[test]
    fn test_chain_makespan_and_critical_path() {
        // #1 (p=3) -> #2 (p=2)
        let mut g = graph_with_tasks(&[3, 2]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();

        assert_eq!(g.makespan(), 5);
        assert_eq!(g.critical_path(), &[TaskId(1), TaskId(2)]);

        let t1 = g.timing(TaskId(1)).unwrap();
        assert_eq!((t1.earliest_start, t1.earliest_finish), (0, 3));
        assert_eq!((t1.latest_start, t1.latest_finish), (0, 3));
        let t2 = g.timing(TaskId(2)).unwrap();
        assert_eq!((t2.earliest_start, t2.earliest_finish), (3, 5));
    }

    #[test]
    fn test_parallel_chains_only_longer_is_critical() {
        // #1 (3) -> #2 (2)  and  #3 (1) -> #4 (2), independent chains
        let mut g = graph_with_tasks(&[3, 2, 1, 2]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        g.add_precedence(TaskId(3), TaskId(4)).unwrap();

        assert_eq!(g.makespan(), 5);
        let critical = g.critical_path().to_vec();
        assert!(critical.contains(&TaskId(1)));
        assert!(critical.contains(&TaskId(2)));
        assert!(!critical.contains(&TaskId(3)));
        assert!(!critical.contains(&TaskId(4)));

        // The short chain has slack 2
        assert_eq!(g.timing(TaskId(3)).unwrap().total_float(), 2);
        assert_eq!(g.timing(TaskId(4)).unwrap().total_float(), 2);
    }

    #[test]
    fn test_diamond_critical_path_duration_equals_makespan() {
        // #1 (2) -> {#2 (3), #3 (5)} -> #4 (1)
        let mut g = graph_with_tasks(&[2, 3, 5, 1]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        g.add_precedence(TaskId(1), TaskId(3)).unwrap();
        g.add_precedence(TaskId(2), TaskId(4)).unwrap();
        g.add_precedence(TaskId(3), TaskId(4)).unwrap();

        assert_eq!(g.makespan(), 8);
        assert_eq!(g.critical_path(), &[TaskId(1), TaskId(3), TaskId(4)]);

        // Critical tasks form a source-to-sink chain summing to the makespan
        let critical = g.critical_path().to_vec();
        let total: i64 = critical.iter().map(|&id| g.duration(id).unwrap()).sum();
        assert_eq!(total, g.makespan());
    }

    #[test]
    fn test_timing_consistency_after_recompute() {
        let mut g = graph_with_tasks(&[4, 1, 3, 2, 5]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        g.add_precedence(TaskId(2), TaskId(5)).unwrap();
        g.add_precedence(TaskId(3), TaskId(4)).unwrap();
        g.add_precedence(TaskId(1), TaskId(4)).unwrap();

        g.makespan();
        for i in 1..=5 {
            let id = TaskId(i);
            let t = g.timing(id).unwrap();
            let p = g.duration(id).unwrap();
            assert_eq!(t.earliest_finish - t.earliest_start, p);
            assert_eq!(t.latest_finish - t.latest_start, p);
            assert!(t.total_float() >= 0);
        }
    }

    #[test]
    fn test_cycle_rejected_without_mutation() {
        let mut g = graph_with_tasks(&[1, 1, 1]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        g.add_precedence(TaskId(2), TaskId(3)).unwrap();

        let err = g.add_precedence(TaskId(3), TaskId(1)).unwrap_err();
        assert_eq!(
            err,
            SolverError::CycleDetected {
                from: TaskId(3),
                to: TaskId(1)
            }
        );
        assert!(!g.has_precedence(TaskId(3), TaskId(1)));
        assert_eq!(g.precedence_count(), 2);
        assert_eq!(g.makespan(), 3);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut g = graph_with_tasks(&[1]);
        assert!(matches!(
            g.add_precedence(TaskId(1), TaskId(1)),
            Err(SolverError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_unknown_task_rejected() {
        let mut g = graph_with_tasks(&[1]);
        assert_eq!(
            g.add_precedence(TaskId(1), TaskId(9)),
            Err(SolverError::UnknownTask(TaskId(9)))
        );
        assert_eq!(
            g.add_precedence(TaskId(9), TaskId(1)),
            Err(SolverError::UnknownTask(TaskId(9)))
        );
    }

    #[test]
    fn test_makespan_idempotent() {
        let mut g = graph_with_tasks(&[3, 2]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();

        assert_eq!(g.makespan(), 5);
        assert!(!g.dirty);
        assert_eq!(g.makespan(), 5);
        assert!(!g.dirty);
    }

    #[test]
    fn test_cache_invalidated_on_mutation() {
        let mut g = graph_with_tasks(&[3, 2]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        assert_eq!(g.makespan(), 5);

        g.add_task(Task::new(TaskId(3), 7));
        g.add_precedence(TaskId(2), TaskId(3)).unwrap();
        assert_eq!(g.makespan(), 12);

        assert!(g.remove_precedence(TaskId(2), TaskId(3)));
        assert_eq!(g.makespan(), 7);
    }

    #[test]
    fn test_remove_missing_precedence_is_noop() {
        let mut g = graph_with_tasks(&[1, 1]);
        assert!(!g.remove_precedence(TaskId(1), TaskId(2)));
        assert!(!g.remove_precedence(TaskId(1), TaskId(9)));
    }

    #[test]
    fn test_duplicate_precedence_is_idempotent() {
        let mut g = graph_with_tasks(&[1, 1]);
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        g.add_precedence(TaskId(1), TaskId(2)).unwrap();
        assert_eq!(g.precedence_count(), 1);
    }

    #[test]
    fn test_readd_task_updates_duration() {
        let mut g = graph_with_tasks(&[3]);
        assert_eq!(g.makespan(), 3);
        g.add_task(Task::new(TaskId(1), 10));
        assert_eq!(g.makespan(), 10);
        assert_eq!(g.task_count(), 1);
    }

    #[test]
    fn test_empty_graph() {
        let mut g = ScheduleGraph::new();
        assert!(g.is_empty());
        assert_eq!(g.makespan(), 0);
        assert!(g.critical_path().is_empty());
        assert_eq!(g.timing(TaskId(1)), None);
    }

    #[test]
    fn test_unconnected_tasks_makespan_is_longest() {
        let mut g = graph_with_tasks(&[4, 9, 2]);
        assert_eq!(g.makespan(), 9);
        assert_eq!(g.critical_path(), &[TaskId(2)]);
    }
}
