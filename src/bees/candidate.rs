//! Candidate solution (one bee).

use crate::cpm::ScheduleGraph;
use crate::models::TaskId;

/// One candidate schedule: a precedence DAG plus the station orderings
/// that produced its sequencing edges.
///
/// Candidates exclusively own their state: the optimizer never shares a
/// graph or an ordering list between two bees. `orderings[s]` lists the
/// tasks of station `s` in processing order and mirrors exactly the
/// sequencing chain present in the graph for that station.
///
/// Lower fitness = better schedule (minimization convention).
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The schedule DAG.
    pub graph: ScheduleGraph,
    /// Per-station processing order.
    pub orderings: Vec<Vec<TaskId>>,
    /// Cached fitness (makespan).
    pub fitness: i64,
}

impl Candidate {
    /// Re-reads the fitness from the graph's cached makespan.
    pub fn refresh_fitness(&mut self) {
        self.fitness = self.graph.makespan();
    }
}
