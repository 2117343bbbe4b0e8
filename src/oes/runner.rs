//! OES execution on the GA engine.

use super::config::OesConfig;
use super::types::{Distribution, Point};
use crate::error::GaError;
use crate::ga::{Ga, GaConfig, ModMutateEach};
use std::sync::Arc;

/// Executes the OpenAI evolution strategy.
pub struct OesRunner;

impl OesRunner {
    /// Minimizes `f` starting from the centre `x0`.
    ///
    /// Returns the best sampled point and its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_evolve::oes::{OesConfig, OesRunner};
    ///
    /// let config = OesConfig::default().with_seed(42);
    /// let (x, y) = OesRunner::minimize(&config, |x| x.iter().map(|v| v * v).sum(), vec![2.0, 2.0])?;
    /// assert_eq!(x.len(), 2);
    /// assert!(y < 8.0);
    /// # Ok::<(), u_evolve::GaError>(())
    /// ```
    pub fn minimize<F>(config: &OesConfig, f: F, x0: Vec<f64>) -> Result<(Vec<f64>, f64), GaError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        config.validate()?;
        if x0.is_empty() {
            return Err(GaError::config("x0 should have at least one dimension"));
        }

        let dist = Arc::new(Distribution::new(Arc::new(f), config.sigma, config.learning_rate, x0));
        let updater = Arc::clone(&dist);
        let mut ga_config = GaConfig::default()
            .with_pop_size(config.n_points)
            .with_n_generations(config.n_steps)
            .with_model(ModMutateEach { strict: false })
            .with_parallel_eval(config.parallel)
            .with_callback(move |ga: &Ga<Point>| {
                for pop in ga.populations() {
                    updater.step(&pop.individuals);
                }
            });
        if let Some(seed) = config.seed {
            ga_config = ga_config.with_seed(seed);
        }

        let mut ga = Ga::new(ga_config)?;
        ga.minimize(|rng| Point::sample(Arc::clone(&dist), rng))?;

        let best = ga.best().ok_or_else(|| GaError::invariant("empty hall of fame"))?;
        log::debug!("oes: best {} with mu = {:?}", best.fitness, dist.mu());
        Ok((best.genome.x.clone(), best.fitness))
    }
}
