//! DE configuration.

use crate::error::GaError;

/// Configuration for differential evolution.
///
/// # Examples
///
/// ```
/// use u_evolve::de::DeConfig;
///
/// let config = DeConfig::default()
///     .with_n_agents(60)
///     .with_bounds(-10.0, 10.0)
///     .with_cross_rate(0.9)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeConfig {
    /// Number of agents. At least 4 so three distinct donors exist.
    pub n_agents: usize,

    /// Number of generations.
    pub n_steps: usize,

    /// Lower bound of the initial positions.
    pub min: f64,

    /// Upper bound of the initial positions.
    pub max: f64,

    /// Probability that a dimension takes the donor value.
    pub cross_rate: f64,

    /// Differential weight `w`.
    pub diff_weight: f64,

    /// Evaluate agents in parallel.
    pub parallel: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            n_agents: 40,
            n_steps: 30,
            min: -5.0,
            max: 5.0,
            cross_rate: 0.5,
            diff_weight: 0.2,
            parallel: false,
            seed: None,
        }
    }
}

impl DeConfig {
    pub fn with_n_agents(mut self, n: usize) -> Self {
        self.n_agents = n;
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

    pub fn with_cross_rate(mut self, rate: f64) -> Self {
        self.cross_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_diff_weight(mut self, w: f64) -> Self {
        self.diff_weight = w;
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
        if self.n_agents < 4 {
            return Err(GaError::config("n_agents should be at least 4"));
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
        if !(0.0..=1.0).contains(&self.cross_rate) {
            return Err(GaError::config("cross_rate should be in [0, 1]"));
        }
        if !self.diff_weight.is_finite() {
            return Err(GaError::config("diff_weight should be finite"));
        }
        Ok(())
    }
}
