//! Error types shared by every module of the crate.
//!
//! Three kinds of failure exist:
//!
//! - [`GaError::Config`]: a configuration value is out of range. Raised by
//!   `validate()` and [`Ga::new`](crate::ga::Ga::new), never mid-run.
//! - [`GaError::Evaluation`]: a genome's fitness function failed. Aborts the
//!   current `initialize`/`enhance` call and is always propagated.
//! - [`GaError::Invariant`]: a programmer error such as asking a tournament
//!   for more contestants than the population holds.

/// Error returned by [`Genome::evaluate`](crate::ga::Genome::evaluate).
pub type EvalError = Box<dyn std::error::Error + Send + Sync>;

/// The crate error type.
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The user fitness function returned an error.
    #[error("evaluation failed: {0}")]
    Evaluation(#[source] EvalError),

    /// A precondition of an operator was violated.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl GaError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        GaError::Config(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        GaError::Invariant(msg.into())
    }

    /// Returns `true` for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, GaError::Config(_))
    }

    /// Returns `true` for evaluation errors.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, GaError::Evaluation(_))
    }

    /// Returns `true` for invariant violations.
    pub fn is_invariant(&self) -> bool {
        matches!(self, GaError::Invariant(_))
    }
}
