//! Solution construction and perturbation.
//!
//! Both operators produce sequencing chains per station: job precedence
//! comes from the problem definition, station order from a uniformly
//! random permutation. Chain insertion goes through a detect-and-retry
//! policy: a rejected edge rolls the partial chain back, reshuffles the
//! station, and tries again up to [`MAX_SHUFFLE_ATTEMPTS`] times.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::bees::{Candidate, JobShopProblem};
use crate::cpm::ScheduleGraph;
use crate::error::{Result, SolverError};
use crate::models::TaskId;

/// Reshuffle bound per station before giving up with
/// [`SolverError::InfeasibleSolution`].
pub const MAX_SHUFFLE_ATTEMPTS: usize = 32;

/// Builds a fresh random candidate (a scout bee).
///
/// One node per task, a precedence chain over each job's slice in the
/// given order, then one randomly permuted sequencing chain per station.
pub fn build_random_candidate<R: Rng>(
    problem: &JobShopProblem,
    rng: &mut R,
) -> Result<Candidate> {
    let mut graph = ScheduleGraph::new();
    for &task in problem.tasks() {
        graph.add_task(task);
    }
    for job in problem.job_slices() {
        for pair in job.windows(2) {
            graph.add_precedence(pair[0].id, pair[1].id)?;
        }
    }

    let mut orderings = problem.station_tasks();
    for order in &mut orderings {
        link_station(&mut graph, order, rng)?;
    }

    let fitness = graph.makespan();
    Ok(Candidate {
        graph,
        orderings,
        fitness,
    })
}

/// Perturbs a candidate in place, yielding a neighbor solution.
///
/// Applies one perturbation per unit of `patch_size`, continuing while the
/// counter remains positive (so `2.5` applies 3). Each perturbation picks
/// a station uniformly, removes its sequencing chain, reshuffles, and
/// reinserts under the retry policy. Returns the number of perturbations
/// applied.
///
/// The caller keeps a clone if the original must survive; the candidate's
/// `fitness` field is not updated here.
pub fn perturb<R: Rng>(candidate: &mut Candidate, patch_size: f64, rng: &mut R) -> Result<usize> {
    let Candidate {
        graph, orderings, ..
    } = candidate;
    if orderings.is_empty() {
        return Ok(0);
    }

    let mut applied = 0;
    let mut remaining = patch_size;
    while remaining > 0.0 {
        let station = rng.random_range(0..orderings.len());
        let order = &mut orderings[station];
        for pair in order.windows(2) {
            graph.remove_precedence(pair[0], pair[1]);
        }
        link_station(graph, order, rng)?;
        applied += 1;
        remaining -= 1.0;
    }
    Ok(applied)
}

/// Shuffles a station's order and inserts its sequencing chain, retrying
/// with a fresh permutation whenever an edge is rejected as cyclic.
fn link_station<R: Rng>(
    graph: &mut ScheduleGraph,
    order: &mut [TaskId],
    rng: &mut R,
) -> Result<()> {
    for _ in 0..MAX_SHUFFLE_ATTEMPTS {
        order.shuffle(rng);
        match insert_chain(graph, order) {
            Ok(()) => return Ok(()),
            Err(SolverError::CycleDetected { .. }) => continue,
            Err(other) => return Err(other),
        }
    }
    Err(SolverError::InfeasibleSolution {
        attempts: MAX_SHUFFLE_ATTEMPTS,
    })
}

/// Inserts the chain implied by `order`. On rejection the already-inserted
/// prefix is removed, leaving the graph as it was. Chain edges must not
/// pre-exist in the graph.
fn insert_chain(graph: &mut ScheduleGraph, order: &[TaskId]) -> Result<()> {
    for (inserted, pair) in order.windows(2).enumerate() {
        if let Err(rejected) = graph.add_precedence(pair[0], pair[1]) {
            for undo in order.windows(2).take(inserted) {
                graph.remove_precedence(undo[0], undo[1]);
            }
            return Err(rejected);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn two_by_two() -> JobShopProblem {
        let tasks = vec![
            Task::new(TaskId(1), 1),
            Task::new(TaskId(2), 2),
            Task::new(TaskId(3), 3),
            Task::new(TaskId(4), 4),
        ];
        JobShopProblem::new(tasks, 2)
    }

    fn is_permutation_of(order: &[TaskId], expected: &[TaskId]) -> bool {
        let mut a = order.to_vec();
        let mut b = expected.to_vec();
        a.sort();
        b.sort();
        a == b
    }

    #[test]
    fn test_build_inserts_job_and_station_chains() {
        let problem = two_by_two();
        let mut rng = SmallRng::seed_from_u64(42);
        let candidate = build_random_candidate(&problem, &mut rng).unwrap();

        // Job chains
        assert!(candidate.graph.has_precedence(TaskId(1), TaskId(2)));
        assert!(candidate.graph.has_precedence(TaskId(3), TaskId(4)));

        // One sequencing chain per station, matching the ordering lists
        assert_eq!(candidate.orderings.len(), 2);
        assert!(is_permutation_of(&candidate.orderings[0], &[TaskId(1), TaskId(3)]));
        assert!(is_permutation_of(&candidate.orderings[1], &[TaskId(2), TaskId(4)]));
        for order in &candidate.orderings {
            assert!(candidate.graph.has_precedence(order[0], order[1]));
        }

        // 2 job edges + 2 station edges
        assert_eq!(candidate.graph.precedence_count(), 4);
        assert!(candidate.fitness > 0);
    }

    #[test]
    fn test_build_never_returns_cyclic_graph() {
        let problem = two_by_two();
        for seed in 0..1000 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut candidate = build_random_candidate(&problem, &mut rng).unwrap();
            // makespan() topologically sorts; a cycle would panic here
            assert!(candidate.graph.makespan() >= 7);
        }
    }

    #[test]
    fn test_perturb_keeps_structure() {
        let problem = two_by_two();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut candidate = build_random_candidate(&problem, &mut rng).unwrap();
        let edges_before = candidate.graph.precedence_count();

        let applied = perturb(&mut candidate, 1.0, &mut rng).unwrap();
        assert_eq!(applied, 1);

        assert_eq!(candidate.graph.precedence_count(), edges_before);
        assert!(is_permutation_of(&candidate.orderings[0], &[TaskId(1), TaskId(3)]));
        assert!(is_permutation_of(&candidate.orderings[1], &[TaskId(2), TaskId(4)]));
        for order in &candidate.orderings {
            assert!(candidate.graph.has_precedence(order[0], order[1]));
        }
        assert!(candidate.graph.makespan() >= 7);
    }

    #[test]
    fn test_perturb_counts_fractional_patch_upward() {
        let problem = two_by_two();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut candidate = build_random_candidate(&problem, &mut rng).unwrap();

        assert_eq!(perturb(&mut candidate, 3.0, &mut rng).unwrap(), 3);
        assert_eq!(perturb(&mut candidate, 2.5, &mut rng).unwrap(), 3);
        assert_eq!(perturb(&mut candidate, 0.5, &mut rng).unwrap(), 1);
    }

    #[test]
    fn test_link_station_reshuffles_around_existing_paths() {
        // #2 -> #3 -> #1 forces the station chain over {#1, #2} to run #2 -> #1
        let mut graph = ScheduleGraph::new();
        graph.add_task(Task::new(TaskId(1), 1));
        graph.add_task(Task::new(TaskId(2), 1));
        graph.add_task(Task::new(TaskId(3), 1));
        graph.add_precedence(TaskId(2), TaskId(3)).unwrap();
        graph.add_precedence(TaskId(3), TaskId(1)).unwrap();

        let mut order = vec![TaskId(1), TaskId(2)];
        let mut rng = SmallRng::seed_from_u64(0);
        link_station(&mut graph, &mut order, &mut rng).unwrap();

        assert_eq!(order, vec![TaskId(2), TaskId(1)]);
        assert!(graph.has_precedence(TaskId(2), TaskId(1)));
        assert!(!graph.has_precedence(TaskId(1), TaskId(2)));
    }

    #[test]
    fn test_insert_chain_rolls_back_on_rejection() {
        let mut graph = ScheduleGraph::new();
        for i in 1..=3 {
            graph.add_task(Task::new(TaskId(i), 1));
        }
        // #3 -> #2 exists, so chain [#1, #2, #3] fails at its second edge
        // after the first one went in
        graph.add_precedence(TaskId(3), TaskId(2)).unwrap();
        let edges_before = graph.precedence_count();

        let order = [TaskId(1), TaskId(2), TaskId(3)];
        assert!(matches!(
            insert_chain(&mut graph, &order),
            Err(SolverError::CycleDetected { .. })
        ));
        assert_eq!(graph.precedence_count(), edges_before);
        assert!(!graph.has_precedence(TaskId(1), TaskId(2)));
    }

    #[test]
    fn test_build_is_deterministic_under_seed() {
        let problem = two_by_two();
        let mut rng_a = SmallRng::seed_from_u64(77);
        let mut rng_b = SmallRng::seed_from_u64(77);
        let a = build_random_candidate(&problem, &mut rng_a).unwrap();
        let b = build_random_candidate(&problem, &mut rng_b).unwrap();
        assert_eq!(a.orderings, b.orderings);
        assert_eq!(a.fitness, b.fitness);
    }

    #[test]
    fn test_single_station_chain_spans_all_jobs() {
        let tasks = vec![
            Task::new(TaskId(1), 5),
            Task::new(TaskId(2), 3),
            Task::new(TaskId(3), 2),
        ];
        let problem = JobShopProblem::new(tasks, 1);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut candidate = build_random_candidate(&problem, &mut rng).unwrap();

        // One station, all three tasks sequential: makespan is the total
        assert_eq!(candidate.graph.makespan(), 10);
        assert_eq!(candidate.orderings.len(), 1);
        assert_eq!(candidate.orderings[0].len(), 3);
    }
}
