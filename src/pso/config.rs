//! PSO configuration.

use crate::error::GaError;

/// Configuration for particle swarm optimization.
///
/// # Examples
///
/// ```
/// use u_evolve::pso::PsoConfig;
///
/// let config = PsoConfig::default()
///     .with_n_particles(20)
///     .with_bounds(-2.0, 2.0)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoConfig {
    /// Number of particles.
    pub n_particles: usize,

    /// Number of velocity updates per particle.
    pub n_steps: usize,

    /// Lower bound of the initial positions.
    pub min: f64,

    /// Upper bound of the initial positions.
    pub max: f64,

    /// Inertia weight applied to the previous velocity.
    ///
    /// SPSO-2011 uses `1 / (2 ln 2)`.
    pub w: f64,

    /// Evaluate particles in parallel.
    pub parallel: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            n_particles: 40,
            n_steps: 30,
            min: -5.0,
            max: 5.0,
            w: 1.0 / (2.0 * std::f64::consts::LN_2),
            parallel: false,
            seed: None,
        }
    }
}

impl PsoConfig {
    pub fn with_n_particles(mut self, n: usize) -> Self {
        self.n_particles = n;
        self
    }

    pub fn with_n_steps(mut self, n: usize) -> Self {
        self.n_steps = n;
        self
    }

    /// Sets the range initial positions are drawn from.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_w(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GaError> {
        if self.n_particles == 0 {
            return Err(GaError::config("n_particles should be at least 1"));
        }
        if self.n_steps == 0 {
            return Err(GaError::config("n_steps should be at least 1"));
        }
        if self.min.is_nan() || self.max.is_nan() || self.min >= self.max {
            return Err(GaError::config(format!(
                "min ({}) should be strictly lower than max ({})",
                self.min, self.max
            )));
        }
        if !self.w.is_finite() || self.w < 0.0 {
            return Err(GaError::config("w should be a non-negative number"));
        }
        Ok(())
    }
}
