//! Bees Algorithm parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Configuration for [`crate::bees::BeesRunner`].
///
/// Defaults match the reference parameterization for the four-station
/// assembly instance this solver was first built for.
///
/// # Example
/// ```
/// use waggle::bees::BeesConfig;
///
/// let config = BeesConfig::default()
///     .with_num_bees(20)
///     .with_max_generations(50)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeesConfig {
    /// Number of generations to run (no early termination).
    pub max_generations: usize,
    /// Population size per generation.
    pub num_bees: usize,
    /// Top-ranked candidates whose neighborhoods are searched.
    pub num_sites: usize,
    /// First `elite_sites` of those get the larger neighborhood.
    pub elite_sites: usize,
    /// Initial perturbation intensity; decremented by 1 per applied
    /// perturbation while positive, so fractional values round up.
    pub patch_size: f64,
    /// Geometric decay applied to `patch_size` each generation, in (0, 1].
    pub patch_decay: f64,
    /// Neighbors generated per elite site.
    pub elite_bees: usize,
    /// Neighbors generated per non-elite site.
    pub other_bees: usize,
    /// RNG seed; `None` seeds from the OS (non-deterministic runs).
    pub seed: Option<u64>,
    /// Refresh candidate fitness on a rayon pool. Does not change results.
    pub parallel: bool,
}

impl Default for BeesConfig {
    fn default() -> Self {
        Self {
            max_generations: 100,
            num_bees: 45,
            num_sites: 3,
            elite_sites: 1,
            patch_size: 3.0,
            patch_decay: 0.95,
            elite_bees: 7,
            other_bees: 2,
            seed: None,
            parallel: false,
        }
    }
}

impl BeesConfig {
    /// Sets the generation count.
    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    /// Sets the population size.
    pub fn with_num_bees(mut self, num_bees: usize) -> Self {
        self.num_bees = num_bees;
        self
    }

    /// Sets the number of sites searched per generation.
    pub fn with_num_sites(mut self, num_sites: usize) -> Self {
        self.num_sites = num_sites;
        self
    }

    /// Sets the number of elite sites.
    pub fn with_elite_sites(mut self, elite_sites: usize) -> Self {
        self.elite_sites = elite_sites;
        self
    }

    /// Sets the initial perturbation intensity.
    pub fn with_patch_size(mut self, patch_size: f64) -> Self {
        self.patch_size = patch_size;
        self
    }

    /// Sets the per-generation patch decay factor.
    pub fn with_patch_decay(mut self, patch_decay: f64) -> Self {
        self.patch_decay = patch_decay;
        self
    }

    /// Sets the elite-site neighborhood size.
    pub fn with_elite_bees(mut self, elite_bees: usize) -> Self {
        self.elite_bees = elite_bees;
        self
    }

    /// Sets the non-elite-site neighborhood size.
    pub fn with_other_bees(mut self, other_bees: usize) -> Self {
        self.other_bees = other_bees;
        self
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel fitness refresh.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks parameter consistency.
    ///
    /// Runs before any generation; a failure here means the run never
    /// starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_generations == 0 {
            return Err(SolverError::InvalidConfiguration(
                "max_generations must be at least 1".into(),
            ));
        }
        if self.num_bees == 0 {
            return Err(SolverError::InvalidConfiguration(
                "num_bees must be at least 1".into(),
            ));
        }
        if self.num_sites > self.num_bees {
            return Err(SolverError::InvalidConfiguration(format!(
                "num_sites ({}) exceeds num_bees ({})",
                self.num_sites, self.num_bees
            )));
        }
        if self.elite_sites > self.num_sites {
            return Err(SolverError::InvalidConfiguration(format!(
                "elite_sites ({}) exceeds num_sites ({})",
                self.elite_sites, self.num_sites
            )));
        }
        if self.num_sites > 0 && (self.elite_bees == 0 || self.other_bees == 0) {
            return Err(SolverError::InvalidConfiguration(
                "neighborhood sizes must be at least 1".into(),
            ));
        }
        if !(self.patch_size > 0.0) {
            return Err(SolverError::InvalidConfiguration(format!(
                "patch_size must be positive, got {}",
                self.patch_size
            )));
        }
        if !(self.patch_decay > 0.0 && self.patch_decay <= 1.0) {
            return Err(SolverError::InvalidConfiguration(format!(
                "patch_decay must be in (0, 1], got {}",
                self.patch_decay
            )));
        }
        Ok(())
    }
}
