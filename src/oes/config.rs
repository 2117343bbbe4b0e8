//! OES configuration.

use crate::error::GaError;

/// Configuration for the OpenAI evolution strategy.
///
/// # Examples
///
/// ```
/// use u_evolve::oes::OesConfig;
///
/// let config = OesConfig::default().with_sigma(0.5).with_learning_rate(0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OesConfig {
    /// Points sampled per generation.
    pub n_points: usize,

    /// Number of generations.
    pub n_steps: usize,

    /// Standard deviation of the sampling noise.
    pub sigma: f64,

    /// Step size of the centre update.
    pub learning_rate: f64,

    /// Evaluate points in parallel.
    pub parallel: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for OesConfig {
    fn default() -> Self {
        Self {
            n_points: 100,
            n_steps: 30,
            sigma: 1.0,
            learning_rate: 0.1,
            parallel: false,
            seed: None,
        }
    }
}

impl OesConfig {
    pub fn with_n_points(mut self, n: usize) -> Self {
        self.n_points = n;
        self
    }

    pub fn with_n_steps(mut self, n: usize) -> Self {
        self.n_steps = n;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
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
        if self.n_points < 3 {
            return Err(GaError::config("n_points should be at least 3"));
        }
        if self.n_steps == 0 {
            return Err(GaError::config("n_steps should be at least 1"));
        }
        if self.sigma.is_nan() || self.sigma <= 0.0 {
            return Err(GaError::config("sigma should be positive"));
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(GaError::config("learning_rate should be positive"));
        }
        Ok(())
    }
}
