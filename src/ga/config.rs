//! GA configuration.
//!
//! [`GaConfig`] holds every parameter that controls the island model:
//! island count and size, the generation model, migration, speciation,
//! hall of fame, seeding, logging and the user hooks.

use super::migration::Migrator;
use super::models::{Model, ModGenerational, ModSimulatedAnnealing};
use super::runner::Ga;
use super::selection::Selector;
use super::speciation::Speciator;
use super::types::Genome;
use crate::error::GaError;
use std::fmt;
use std::sync::Arc;

/// Called after initialization and after every generation.
pub type Callback<G> = Arc<dyn Fn(&Ga<G>) + Send + Sync>;

/// Returns `true` to stop [`Ga::minimize`] before the next generation.
pub type EarlyStop<G> = Arc<dyn Fn(&Ga<G>) -> bool + Send + Sync>;

/// Configuration for the island-model GA.
///
/// # Defaults
///
/// ```
/// use u_evolve::ga::GaConfig;
/// # use u_evolve::{ga::Genome, EvalError};
/// # #[derive(Clone)] struct G;
/// # impl Genome for G {
/// #     fn evaluate(&self) -> Result<f64, EvalError> { Ok(0.0) }
/// #     fn mutate<R: rand::Rng>(&mut self, _: &mut R) {}
/// # }
///
/// let config = GaConfig::<G>::default();
/// assert_eq!(config.n_pops, 1);
/// assert_eq!(config.pop_size, 30);
/// assert_eq!(config.n_generations, 50);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ga::{GaConfig, MigRing, ModGenerational, Selector};
/// # use u_evolve::{ga::Genome, EvalError};
/// # #[derive(Clone)] struct G;
/// # impl Genome for G {
/// #     fn evaluate(&self) -> Result<f64, EvalError> { Ok(0.0) }
/// #     fn mutate<R: rand::Rng>(&mut self, _: &mut R) {}
/// # }
///
/// let config = GaConfig::<G>::default()
///     .with_n_pops(4)
///     .with_pop_size(50)
///     .with_model(ModGenerational {
///         selector: Selector::Tournament(5),
///         mut_rate: 0.3,
///         cross_rate: 0.8,
///     })
///     .with_migrator(MigRing { n_migrants: 5 }, 10)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
pub struct GaConfig<G: Genome> {
    /// Number of islands.
    pub n_pops: usize,

    /// Individuals per island.
    pub pop_size: usize,

    /// Generations run by [`Ga::minimize`].
    pub n_generations: usize,

    /// Size of the hall of fame.
    pub hof_size: usize,

    /// Generation-transition strategy shared by every island.
    pub model: Arc<dyn Model<G>>,

    /// Evaluate individuals of one island in parallel.
    ///
    /// Islands always advance in parallel; this adds a second level of
    /// fan-out inside each island.
    pub parallel_eval: bool,

    /// Optional migration between islands.
    pub migrator: Option<Arc<dyn Migrator<G>>>,

    /// Generations between two migrations.
    pub mig_frequency: usize,

    /// Optional speciation applied inside every island.
    pub speciator: Option<Arc<dyn Speciator<G>>>,

    /// Seed of the master RNG. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Level at which per-island statistics are logged. `None` disables them.
    pub log_level: Option<log::Level>,

    /// Called after initialization and after every generation.
    pub callback: Option<Callback<G>>,

    /// Checked by [`Ga::minimize`] before every generation.
    pub early_stop: Option<EarlyStop<G>>,
}

impl<G: Genome + 'static> Default for GaConfig<G> {
    fn default() -> Self {
        Self {
            n_pops: 1,
            pop_size: 30,
            n_generations: 50,
            hof_size: 1,
            model: Arc::new(ModGenerational {
                selector: Selector::Tournament(3),
                mut_rate: 0.5,
                cross_rate: 0.7,
            }),
            parallel_eval: false,
            migrator: None,
            mig_frequency: 0,
            speciator: None,
            seed: None,
            log_level: None,
            callback: None,
            early_stop: None,
        }
    }
}

impl<G: Genome> Clone for GaConfig<G> {
    fn clone(&self) -> Self {
        Self {
            n_pops: self.n_pops,
            pop_size: self.pop_size,
            n_generations: self.n_generations,
            hof_size: self.hof_size,
            model: Arc::clone(&self.model),
            parallel_eval: self.parallel_eval,
            migrator: self.migrator.clone(),
            mig_frequency: self.mig_frequency,
            speciator: self.speciator.clone(),
            seed: self.seed,
            log_level: self.log_level,
            callback: self.callback.clone(),
            early_stop: self.early_stop.clone(),
        }
    }
}

impl<G: Genome> fmt::Debug for GaConfig<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaConfig")
            .field("n_pops", &self.n_pops)
            .field("pop_size", &self.pop_size)
            .field("n_generations", &self.n_generations)
            .field("hof_size", &self.hof_size)
            .field("parallel_eval", &self.parallel_eval)
            .field("migrator", &self.migrator.is_some())
            .field("mig_frequency", &self.mig_frequency)
            .field("speciator", &self.speciator.is_some())
            .field("seed", &self.seed)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl<G: Genome + 'static> GaConfig<G> {
    /// Sets the number of islands.
    pub fn with_n_pops(mut self, n: usize) -> Self {
        self.n_pops = n;
        self
    }

    /// Sets the number of individuals per island.
    pub fn with_pop_size(mut self, n: usize) -> Self {
        self.pop_size = n;
        self
    }

    /// Sets the number of generations run by [`Ga::minimize`].
    pub fn with_n_generations(mut self, n: usize) -> Self {
        self.n_generations = n;
        self
    }

    /// Sets the hall of fame size.
    pub fn with_hof_size(mut self, n: usize) -> Self {
        self.hof_size = n;
        self
    }

    /// Sets the generation model.
    pub fn with_model(mut self, model: impl Model<G> + 'static) -> Self {
        self.model = Arc::new(model);
        self
    }

    /// Enables or disables per-individual parallel evaluation.
    pub fn with_parallel_eval(mut self, parallel: bool) -> Self {
        self.parallel_eval = parallel;
        self
    }

    /// Enables migration every `frequency` generations.
    pub fn with_migrator(mut self, migrator: impl Migrator<G> + 'static, frequency: usize) -> Self {
        self.migrator = Some(Arc::new(migrator));
        self.mig_frequency = frequency;
        self
    }

    /// Enables speciation.
    pub fn with_speciator(mut self, speciator: impl Speciator<G> + 'static) -> Self {
        self.speciator = Some(Arc::new(speciator));
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Logs per-island statistics at `level`.
    pub fn with_log_level(mut self, level: log::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Sets the per-generation callback.
    pub fn with_callback(mut self, f: impl Fn(&Ga<G>) + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(f));
        self
    }

    /// Sets the early-stop predicate.
    pub fn with_early_stop(mut self, f: impl Fn(&Ga<G>) -> bool + Send + Sync + 'static) -> Self {
        self.early_stop = Some(Arc::new(f));
        self
    }

    /// Preset for simulated annealing: one island holding one individual,
    /// one generation that runs the whole schedule.
    pub fn simulated_annealing(t: f64, t_min: f64, alpha: f64) -> Self {
        Self {
            n_pops: 1,
            pop_size: 1,
            n_generations: 1,
            model: Arc::new(ModSimulatedAnnealing { t, t_min, alpha }),
            ..Self::default()
        }
    }
}

impl<G: Genome> GaConfig<G> {
    /// Validates the configuration.
    ///
    /// Returns a [`GaError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), GaError> {
        if self.n_pops == 0 {
            return Err(GaError::config("n_pops must be at least 1"));
        }
        if self.pop_size == 0 {
            return Err(GaError::config("pop_size must be at least 1"));
        }
        if self.hof_size == 0 {
            return Err(GaError::config("hof_size must be at least 1"));
        }
        self.model.validate()?;
        if let Some(migrator) = &self.migrator {
            migrator.validate()?;
            if self.mig_frequency == 0 {
                return Err(GaError::config("mig_frequency must be at least 1 when a migrator is set"));
            }
        }
        if let Some(speciator) = &self.speciator {
            speciator.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::migration::MigRing;
    use crate::ga::speciation::SpecFitnessInterval;
    use crate::ga::testing::Vector;

    #[test]
    fn test_default_config_is_valid() {
        let config = GaConfig::<Vector>::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hof_size, 1);
        assert!(!config.parallel_eval);
    }

    #[test]
    fn test_zero_counts() {
        assert!(GaConfig::<Vector>::default().with_n_pops(0).validate().unwrap_err().is_config());
        assert!(GaConfig::<Vector>::default().with_pop_size(0).validate().unwrap_err().is_config());
        assert!(GaConfig::<Vector>::default().with_hof_size(0).validate().unwrap_err().is_config());
    }

    #[test]
    fn test_invalid_model() {
        let config = GaConfig::<Vector>::default().with_model(ModGenerational {
            selector: Selector::Tournament(2),
            mut_rate: 2.0,
            cross_rate: 0.5,
        });
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_migrator_needs_frequency() {
        let config = GaConfig::<Vector>::default().with_migrator(MigRing { n_migrants: 1 }, 0);
        assert!(config.validate().unwrap_err().is_config());
        let config = GaConfig::<Vector>::default().with_migrator(MigRing { n_migrants: 0 }, 5);
        assert!(config.validate().unwrap_err().is_config());
        let config = GaConfig::<Vector>::default().with_migrator(MigRing { n_migrants: 1 }, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_speciator() {
        let config = GaConfig::<Vector>::default().with_speciator(SpecFitnessInterval { k: 1 });
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_simulated_annealing_preset() {
        let config = GaConfig::<Vector>::simulated_annealing(10.0, 0.1, 0.9);
        assert_eq!((config.n_pops, config.pop_size, config.n_generations), (1, 1, 1));
        assert!(config.validate().is_ok());
        let bad = GaConfig::<Vector>::simulated_annealing(1.0, 2.0, 0.9);
        assert!(bad.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_debug_and_clone() {
        let config = GaConfig::<Vector>::default().with_seed(7).with_callback(|_| {});
        let copy = config.clone();
        assert_eq!(copy.seed, Some(7));
        assert!(copy.callback.is_some());
        assert!(format!("{config:?}").contains("pop_size: 30"));
    }
}
