//! PSO execution on the GA engine.

use super::config::PsoConfig;
use super::types::{Particle, Swarm};
use crate::error::GaError;
use crate::ga::{Ga, GaConfig, ModMutateEach};
use std::sync::Arc;

/// Executes particle swarm optimization.
pub struct PsoRunner;

impl PsoRunner {
    /// Minimizes `f` over `n_dims` dimensions.
    ///
    /// Returns the best position visited by any particle and its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_evolve::pso::{PsoConfig, PsoRunner};
    ///
    /// let config = PsoConfig::default().with_seed(42);
    /// let (x, y) = PsoRunner::minimize(&config, |x| x.iter().map(|v| v * v).sum(), 3)?;
    /// assert_eq!(x.len(), 3);
    /// assert!(y < 1.0);
    /// # Ok::<(), u_evolve::GaError>(())
    /// ```
    pub fn minimize<F>(config: &PsoConfig, f: F, n_dims: usize) -> Result<(Vec<f64>, f64), GaError>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        config.validate()?;
        if n_dims == 0 {
            return Err(GaError::config("n_dims should be at least 1"));
        }

        let swarm = Arc::new(Swarm::new(Arc::new(f), config.w));
        let mut ga_config = GaConfig::default()
            .with_pop_size(config.n_particles)
            .with_n_generations(config.n_steps)
            .with_model(ModMutateEach { strict: false })
            .with_parallel_eval(config.parallel);
        if let Some(seed) = config.seed {
            ga_config = ga_config.with_seed(seed);
        }

        let mut ga = Ga::new(ga_config)?;
        let (min, max) = (config.min, config.max);
        ga.minimize(|rng| Particle::new(Arc::clone(&swarm), n_dims, min, max, rng))?;

        let best = swarm.best();
        log::debug!("pso: best {} after {} generations", best.y, ga.generations());
        Ok((best.x, best.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn styblinski_tang(x: &[f64]) -> f64 {
        0.5 * x.iter().map(|v| v.powi(4) - 16.0 * v * v + 5.0 * v).sum::<f64>()
    }

    #[test]
    fn test_sphere() {
        let config = PsoConfig::default().with_n_steps(60).with_seed(42);
        let (x, y) = PsoRunner::minimize(&config, sphere, 2).unwrap();
        assert!(y < 1e-3, "expected < 1e-3, got {y}");
        assert!((sphere(&x) - y).abs() < 1e-12);
    }

    #[test]
    fn test_styblinski_tang() {
        // Global minimum is about -78.332 at x = (-2.9035, -2.9035)
        let config = PsoConfig::default().with_n_steps(60).with_seed(1);
        let (_, y) = PsoRunner::minimize(&config, styblinski_tang, 2).unwrap();
        assert!(y < -60.0, "got {y}");
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = PsoConfig::default().with_seed(9);
        let a = PsoRunner::minimize(&config, sphere, 2).unwrap();
        let b = PsoRunner::minimize(&config, sphere, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_inputs() {
        let config = PsoConfig::default().with_bounds(1.0, 0.0);
        assert!(PsoRunner::minimize(&config, sphere, 2).unwrap_err().is_config());
        assert!(PsoRunner::minimize(&PsoConfig::default(), sphere, 0).unwrap_err().is_config());
    }
}
