//! Island-model evolutionary loop.
//!
//! [`Ga`] owns the islands and drives them:
//! initialization → {migration → per-island model → evaluation → sort →
//! hall of fame}* → stop.
//!
//! Islands advance in parallel on the rayon pool, each with its own RNG
//! drawn from the master RNG before the fan-out, so a fixed seed reproduces
//! a run regardless of scheduling. The hall of fame is written only after
//! every island has joined.

use super::config::GaConfig;
use super::models::Model;
use super::population::Population;
use super::speciation::Speciator;
use super::types::{Genome, Individual};
use crate::error::GaError;
use crate::random::create_rng;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Lifecycle of a [`Ga`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaState {
    /// Built and validated, not yet initialized.
    Configured,
    /// Islands exist; [`Ga::enhance`] may be called.
    Initialized,
    /// The early-stop predicate fired.
    Stopped,
    /// An initialization or generation step returned an error.
    Failed,
}

/// Island-model genetic algorithm.
///
/// # Usage
///
/// ```
/// use rand::Rng;
/// use u_evolve::ga::{Ga, GaConfig, Genome};
/// use u_evolve::EvalError;
///
/// #[derive(Clone)]
/// struct Point(f64);
///
/// impl Genome for Point {
///     fn evaluate(&self) -> Result<f64, EvalError> {
///         Ok(self.0 * self.0)
///     }
///     fn mutate<R: Rng>(&mut self, rng: &mut R) {
///         self.0 += rng.random_range(-0.5..0.5);
///     }
/// }
///
/// let config = GaConfig::default().with_n_generations(20).with_seed(42);
/// let mut ga = Ga::new(config)?;
/// ga.minimize(|rng| Point(rng.random_range(-10.0..10.0)))?;
/// assert!(ga.best().unwrap().fitness < 1.0);
/// # Ok::<(), u_evolve::GaError>(())
/// ```
pub struct Ga<G: Genome> {
    config: GaConfig<G>,
    populations: Vec<Population<G>>,
    hall_of_fame: Vec<Individual<G>>,
    generations: usize,
    age: Duration,
    rng: StdRng,
    state: GaState,
}

impl<G: Genome> Ga<G> {
    /// Validates `config` and builds an uninitialized GA.
    pub fn new(config: GaConfig<G>) -> Result<Self, GaError> {
        config.validate()?;
        let rng = create_rng(config.seed.unwrap_or_else(rand::random));
        Ok(Self {
            config,
            populations: Vec::new(),
            hall_of_fame: Vec::new(),
            generations: 0,
            age: Duration::ZERO,
            rng,
            state: GaState::Configured,
        })
    }

    /// Creates, evaluates and sorts every island, then fills the hall of
    /// fame and fires the callback.
    ///
    /// Calling it again restarts the run with fresh islands.
    pub fn initialize<F>(&mut self, factory: F) -> Result<(), GaError>
    where
        F: Fn(&mut StdRng) -> G + Sync,
    {
        let start = Instant::now();
        let seeds: Vec<u64> = (0..self.config.n_pops).map(|_| self.rng.random()).collect();
        let pop_size = self.config.pop_size;
        let parallel_eval = self.config.parallel_eval;
        let log_level = self.config.log_level;

        let built: Result<Vec<Population<G>>, GaError> = seeds
            .into_par_iter()
            .enumerate()
            .map(|(id, seed)| {
                let island_start = Instant::now();
                let mut pop = Population::new(id, pop_size, &factory, seed);
                pop.evaluate(parallel_eval)?;
                pop.sort_by_fitness();
                pop.age += island_start.elapsed();
                if let Some(level) = log_level {
                    pop.log_stats(level);
                }
                Ok(pop)
            })
            .collect();

        self.populations = match built {
            Ok(pops) => pops,
            Err(e) => {
                self.state = GaState::Failed;
                return Err(e);
            }
        };
        self.hall_of_fame.clear();
        self.generations = 0;
        self.age = start.elapsed();
        self.update_hall_of_fame();
        self.state = GaState::Initialized;
        log::debug!(
            "initialized {} islands of {} individuals",
            self.config.n_pops,
            self.config.pop_size
        );

        if let Some(callback) = &self.config.callback {
            callback(self);
        }
        Ok(())
    }

    /// Runs one generation on every island.
    ///
    /// Migration (when due) happens first and sequentially; then each island
    /// applies the model (per species when a speciator is set), evaluates
    /// and sorts in parallel. After the join the hall of fame is updated and
    /// the callback fires.
    ///
    /// # Errors
    ///
    /// [`GaError::Invariant`] when the GA is not initialized or already
    /// terminated; otherwise the first error raised by an island. An error
    /// moves the GA to [`GaState::Failed`].
    pub fn enhance(&mut self) -> Result<(), GaError> {
        if self.state != GaState::Initialized {
            return Err(GaError::invariant(format!(
                "enhance called in state {:?}",
                self.state
            )));
        }
        let start = Instant::now();
        self.generations += 1;

        if let Err(e) = self.step() {
            self.state = GaState::Failed;
            log::debug!("generation {} failed: {e}", self.generations);
            return Err(e);
        }

        self.age += start.elapsed();
        self.update_hall_of_fame();
        if let Some(callback) = &self.config.callback {
            callback(self);
        }
        Ok(())
    }

    fn step(&mut self) -> Result<(), GaError> {
        if let Some(migrator) = &self.config.migrator {
            if self.populations.len() > 1 && self.generations % self.config.mig_frequency == 0 {
                migrator.apply(&mut self.populations, &mut self.rng)?;
                log::trace!("migration at generation {}", self.generations);
            }
        }

        let model = self.config.model.as_ref();
        let speciator = self.config.speciator.as_deref();
        let parallel_eval = self.config.parallel_eval;
        let log_level = self.config.log_level;
        self.populations
            .par_iter_mut()
            .try_for_each(|pop| evolve_island(pop, model, speciator, parallel_eval, log_level))
    }

    /// Runs `initialize` then up to `n_generations` calls to `enhance`.
    ///
    /// The early-stop predicate is checked before every generation; when it
    /// fires the GA moves to [`GaState::Stopped`].
    pub fn minimize<F>(&mut self, factory: F) -> Result<(), GaError>
    where
        F: Fn(&mut StdRng) -> G + Sync,
    {
        self.initialize(factory)?;
        for _ in 0..self.config.n_generations {
            let stop = self.config.early_stop.as_ref().is_some_and(|f| f(self));
            if stop {
                log::debug!("early stop after {} generations", self.generations);
                self.state = GaState::Stopped;
                break;
            }
            self.enhance()?;
        }
        Ok(())
    }

    /// Merges each island's leading individuals into the hall of fame.
    ///
    /// The hall of fame stays sorted and never holds two entries with the
    /// same id, so a surviving elite is not counted twice.
    fn update_hall_of_fame(&mut self) {
        let k = self.config.hof_size;
        for pop in &self.populations {
            for indi in pop.individuals.iter().take(k) {
                if self.hall_of_fame.iter().any(|h| h.id == indi.id) {
                    continue;
                }
                let i = self.hall_of_fame.partition_point(|h| h.fitness <= indi.fitness);
                if i < k {
                    self.hall_of_fame.insert(i, indi.clone());
                    self.hall_of_fame.truncate(k);
                }
            }
        }
    }

    /// Best individual seen so far.
    pub fn best(&self) -> Option<&Individual<G>> {
        self.hall_of_fame.first()
    }

    /// Best individuals seen so far, best first.
    pub fn hall_of_fame(&self) -> &[Individual<G>] {
        &self.hall_of_fame
    }

    /// Islands, each sorted by fitness.
    pub fn populations(&self) -> &[Population<G>] {
        &self.populations
    }

    /// Generations run since the last `initialize`.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Wall-clock time spent in `initialize` and `enhance`.
    pub fn age(&self) -> Duration {
        self.age
    }

    pub fn state(&self) -> GaState {
        self.state
    }

    pub fn config(&self) -> &GaConfig<G> {
        &self.config
    }
}

/// Advances one island by one generation.
fn evolve_island<G: Genome>(
    pop: &mut Population<G>,
    model: &dyn Model<G>,
    speciator: Option<&dyn Speciator<G>>,
    parallel_eval: bool,
    log_level: Option<log::Level>,
) -> Result<(), GaError> {
    let start = Instant::now();
    match speciator {
        Some(speciator) => {
            let species = speciator.apply(&pop.individuals, &mut pop.rng)?;
            let mut merged = Vec::with_capacity(pop.len());
            for specie in species.into_iter().filter(|s| !s.is_empty()) {
                let seed = pop.rng.random();
                let mut sub = Population::from_individuals(pop.id, specie, create_rng(seed));
                model.apply(&mut sub)?;
                merged.append(&mut sub.individuals);
            }
            pop.individuals = merged;
        }
        None => model.apply(pop)?,
    }
    pop.evaluate(parallel_eval)?;
    pop.sort_by_fitness();
    pop.generations += 1;
    pop.age += start.elapsed();
    if let Some(level) = log_level {
        pop.log_stats(level);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
