//! DE agent genome.

use crate::error::EvalError;
use crate::ga::Genome;
use crate::random::random_ints;
use rand::Rng;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

pub(crate) type Objective = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// State shared by every agent of one run.
pub(crate) struct DeShared {
    pub(crate) f: Objective,
    pub(crate) cross_rate: f64,
    pub(crate) diff_weight: f64,
    /// Positions of the previous generation, refreshed after every generation.
    pub(crate) snapshot: RwLock<Vec<Vec<f64>>>,
}

impl DeShared {
    pub(crate) fn set_snapshot(&self, agents: Vec<Vec<f64>>) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = agents;
    }
}

/// A candidate position.
#[derive(Clone)]
pub struct Agent {
    /// Current position.
    pub x: Vec<f64>,
    pub(crate) shared: Arc<DeShared>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent").field("x", &self.x).finish_non_exhaustive()
    }
}

impl Genome for Agent {
    fn evaluate(&self) -> Result<f64, EvalError> {
        Ok((self.shared.f)(&self.x))
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        let snapshot = self.shared.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        if snapshot.len() < 3 {
            return;
        }
        let donors = random_ints(3, 0, snapshot.len(), rng);
        let (a, b, c) = (&snapshot[donors[0]], &snapshot[donors[1]], &snapshot[donors[2]]);
        for (i, xi) in self.x.iter_mut().enumerate() {
            if rng.random::<f64>() < self.shared.cross_rate {
                *xi = a[i] + self.shared.diff_weight * (b[i] - c[i]);
            }
        }
    }
}
