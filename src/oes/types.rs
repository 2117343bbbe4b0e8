//! OES sample point and search distribution.

use crate::error::EvalError;
use crate::ga::{fit_avg, fit_std, Genome, Individual};
use rand::Rng;
use rand_distr::StandardNormal;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

pub(crate) type Objective = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Search distribution shared by every point of one run.
pub(crate) struct Distribution {
    pub(crate) f: Objective,
    pub(crate) sigma: f64,
    pub(crate) learning_rate: f64,
    mu: RwLock<Vec<f64>>,
}

impl Distribution {
    pub(crate) fn new(f: Objective, sigma: f64, learning_rate: f64, mu: Vec<f64>) -> Self {
        Self {
            f,
            sigma,
            learning_rate,
            mu: RwLock::new(mu),
        }
    }

    pub(crate) fn mu(&self) -> Vec<f64> {
        self.mu.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Moves `mu` against the fitness-weighted noise of `points`.
    ///
    /// Each dimension follows its own gradient estimate
    /// `g_d = Σ_j z_j ε_jd`, where `z` are the standardized fitnesses.
    /// Nothing moves when every point has the same fitness.
    pub(crate) fn step(&self, points: &[Individual<Point>]) {
        let n = points.len();
        let (avg, std) = (fit_avg(points), fit_std(points));
        if n == 0 || std.is_nan() || std <= 0.0 {
            return;
        }
        let mut mu = self.mu.write().unwrap_or_else(PoisonError::into_inner);
        let scale = self.learning_rate / (self.sigma * n as f64);
        for (d, m) in mu.iter_mut().enumerate() {
            let g: f64 = points
                .iter()
                .map(|p| (p.fitness - avg) / std * p.genome.noise[d])
                .sum();
            *m -= scale * g;
        }
    }
}

/// A point sampled as `mu + sigma * noise`.
#[derive(Clone)]
pub struct Point {
    pub x: Vec<f64>,
    pub noise: Vec<f64>,
    pub(crate) dist: Arc<Distribution>,
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point").field("x", &self.x).finish_non_exhaustive()
    }
}

impl Point {
    pub(crate) fn sample<R: Rng>(dist: Arc<Distribution>, rng: &mut R) -> Self {
        let n = dist.mu.read().unwrap_or_else(PoisonError::into_inner).len();
        let mut point = Self {
            x: vec![0.0; n],
            noise: vec![0.0; n],
            dist,
        };
        point.mutate(rng);
        point
    }
}

impl Genome for Point {
    fn evaluate(&self) -> Result<f64, EvalError> {
        Ok((self.dist.f)(&self.x))
    }

    /// Resamples the point around the current centre.
    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        let mu = self.dist.mu.read().unwrap_or_else(PoisonError::into_inner);
        for ((x, e), m) in self.x.iter_mut().zip(self.noise.iter_mut()).zip(mu.iter()) {
            *e = rng.sample(StandardNormal);
            *x = m + self.dist.sigma * *e;
        }
    }
}
