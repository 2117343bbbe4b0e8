//! DE execution on the GA engine.

use super::config::DeConfig;
use super::types::{Agent, DeShared};
use crate::error::GaError;
use crate::ga::operators::init_unif_f64;
use crate::ga::{Ga, GaConfig, ModMutateEach};
use std::sync::{Arc, RwLock};

/// Executes differential evolution.
pub struct DeRunner;

impl DeRunner {
    /// Minimizes `f` over `n_dims` dimensions.
    ///
    /// Returns the best position found and its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_evolve::de::{DeConfig, DeRunner};
    ///
    /// let config = DeConfig::default().with_n_steps(50).with_seed(7);
    /// let (x, y) = DeRunner::minimize(&config, |x| x.iter().map(|v| v * v).sum(), 2)?;
    /// assert_eq!(x.len(), 2);
    /// assert!(y < 1.0);
    /// # Ok::<(), u_evolve::GaError>(())
    /// ```
    pub fn minimize<F>(config: &DeConfig, f: F, n_dims: usize) -> Result<(Vec<f64>, f64), GaError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        config.validate()?;
        if n_dims == 0 {
            return Err(GaError::config("n_dims should be at least 1"));
        }

        let shared = Arc::new(DeShared {
            f: Arc::new(f),
            cross_rate: config.cross_rate,
            diff_weight: config.diff_weight,
            snapshot: RwLock::new(Vec::new()),
        });
        let sink = Arc::clone(&shared);
        let mut ga_config = GaConfig::default()
            .with_pop_size(config.n_agents)
            .with_n_generations(config.n_steps)
            .with_model(ModMutateEach { strict: true })
            .with_parallel_eval(config.parallel)
            .with_callback(move |ga: &Ga<Agent>| {
                let agents = ga
                    .populations()
                    .iter()
                    .flat_map(|p| p.individuals.iter().map(|i| i.genome.x.clone()))
                    .collect();
                sink.set_snapshot(agents);
            });
        if let Some(seed) = config.seed {
            ga_config = ga_config.with_seed(seed);
        }

        let mut ga = Ga::new(ga_config)?;
        let (min, max) = (config.min, config.max);
        ga.minimize(|rng| Agent {
            x: init_unif_f64(n_dims, min, max, rng),
            shared: Arc::clone(&shared),
        })?;

        let best = ga.best().ok_or_else(|| GaError::invariant("empty hall of fame"))?;
        log::debug!("de: best {} after {} generations", best.fitness, ga.generations());
        Ok((best.genome.x.clone(), best.fitness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    #[test]
    fn test_sphere() {
        let config = DeConfig::default()
            .with_n_steps(100)
            .with_diff_weight(0.5)
            .with_seed(42);
        let (x, y) = DeRunner::minimize(&config, sphere, 2).unwrap();
        assert!(y < 1e-2, "expected < 1e-2, got {y}");
        assert!((sphere(&x) - y).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = DeConfig::default().with_seed(3);
        let a = DeRunner::minimize(&config, sphere, 3).unwrap();
        let b = DeRunner::minimize(&config, sphere, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = DeConfig::default().with_seed(5);
        let seq = DeRunner::minimize(&config, sphere, 2).unwrap();
        let par = DeRunner::minimize(&config.clone().with_parallel(true), sphere, 2).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_invalid_inputs() {
        let config = DeConfig::default();
        assert!(DeRunner::minimize(&config, sphere, 0).unwrap_err().is_config());
        let bad = DeConfig::default().with_n_agents(2);
        assert!(DeRunner::minimize(&bad, sphere, 2).unwrap_err().is_config());
    }
}
