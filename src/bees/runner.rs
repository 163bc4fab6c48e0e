//! The Bees Algorithm generation loop.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::bees::operators::{build_random_candidate, perturb};
use crate::bees::{BeesConfig, Candidate, JobShopProblem};
use crate::error::{Result, SolverError};

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct BeesResult {
    /// Best candidate found across all generations.
    pub best: Candidate,
    /// Number of generations executed.
    pub generations: usize,
}

impl BeesResult {
    /// Fitness (makespan) of the best candidate.
    pub fn best_fitness(&self) -> i64 {
        self.best.fitness
    }
}

/// Runs the Bees Algorithm over a job-shop instance.
///
/// Each generation: refresh and rank all candidates, update the global
/// best on strict improvement, replace the top `num_sites` candidates with
/// the best neighbor found around each (elite sites get the larger
/// neighborhood), refill the rest of the population with fresh scouts,
/// and decay the patch size. Runs exactly `max_generations` generations.
///
/// Deterministic for a fixed [`BeesConfig::seed`].
///
/// # Example
/// ```
/// use waggle::bees::{BeesConfig, BeesRunner, JobShopProblem};
/// use waggle::models::{Task, TaskId};
///
/// let tasks = vec![
///     Task::new(TaskId(1), 3),
///     Task::new(TaskId(2), 2),
///     Task::new(TaskId(3), 1),
///     Task::new(TaskId(4), 4),
/// ];
/// let problem = JobShopProblem::new(tasks, 2);
/// let config = BeesConfig::default()
///     .with_num_bees(8)
///     .with_max_generations(10)
///     .with_seed(42);
/// let result = BeesRunner::run(&problem, &config).unwrap();
/// assert!(result.best_fitness() >= 5);
/// ```
pub struct BeesRunner;

impl BeesRunner {
    /// Executes the optimization and returns the best candidate found.
    ///
    /// Configuration and problem validation run first; any failure there
    /// aborts before the initial population is built. A station ordering
    /// that exhausts its reshuffle bound mid-search aborts the run with
    /// [`SolverError::InfeasibleSolution`]; the population is never left
    /// undersized.
    pub fn run(problem: &JobShopProblem, config: &BeesConfig) -> Result<BeesResult> {
        config.validate()?;
        problem.validate()?;

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let mut population: Vec<Candidate> = (0..config.num_bees)
            .map(|_| build_random_candidate(problem, &mut rng))
            .collect::<Result<_>>()?;
        let mut patch_size = config.patch_size;
        let mut best: Option<Candidate> = None;

        for generation in 0..config.max_generations {
            debug_assert_eq!(population.len(), config.num_bees);
            refresh_population(&mut population, config.parallel);
            population.sort_by_key(|candidate| candidate.fitness);

            if best
                .as_ref()
                .is_none_or(|b| population[0].fitness < b.fitness)
            {
                best = Some(population[0].clone());
                debug!(
                    generation,
                    patch_size,
                    fitness = population[0].fitness,
                    "new best schedule"
                );
            }

            let mut next_gen = Vec::with_capacity(config.num_bees);
            for (rank, parent) in population[..config.num_sites].iter().enumerate() {
                let neighborhood = if rank < config.elite_sites {
                    config.elite_bees
                } else {
                    config.other_bees
                };
                next_gen.push(search_neighborhood(parent, neighborhood, patch_size, &mut rng)?);
            }
            for _ in 0..config.num_bees - config.num_sites {
                next_gen.push(build_random_candidate(problem, &mut rng)?);
            }

            population = next_gen;
            patch_size *= config.patch_decay;
            trace!(generation, patch_size, "generation complete");
        }

        let best = best.ok_or_else(|| {
            SolverError::InvalidConfiguration("max_generations must be at least 1".into())
        })?;
        Ok(BeesResult {
            best,
            generations: config.max_generations,
        })
    }
}

fn refresh_population(population: &mut [Candidate], parallel: bool) {
    if parallel {
        population
            .par_iter_mut()
            .for_each(Candidate::refresh_fitness);
    } else {
        for candidate in population.iter_mut() {
            candidate.refresh_fitness();
        }
    }
}

/// Samples `neighborhood` perturbed clones of `parent` and keeps the best;
/// the first neighbor wins ties.
fn search_neighborhood<R: Rng>(
    parent: &Candidate,
    neighborhood: usize,
    patch_size: f64,
    rng: &mut R,
) -> Result<Candidate> {
    let mut best = neighbor_of(parent, patch_size, rng)?;
    for _ in 1..neighborhood {
        let neighbor = neighbor_of(parent, patch_size, rng)?;
        if neighbor.fitness < best.fitness {
            best = neighbor;
        }
    }
    Ok(best)
}

fn neighbor_of<R: Rng>(parent: &Candidate, patch_size: f64, rng: &mut R) -> Result<Candidate> {
    let mut neighbor = parent.clone();
    perturb(&mut neighbor, patch_size, rng)?;
    neighbor.refresh_fitness();
    Ok(neighbor)
}
