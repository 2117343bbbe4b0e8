//! Particle genome and swarm-wide state.

use crate::error::EvalError;
use crate::ga::operators::init_unif_f64;
use crate::ga::Genome;
use rand::Rng;
use rand_distr::StandardNormal;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) type Objective = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Acceleration coefficient of SPSO-2011, `0.5 + ln 2`.
const C: f64 = 0.5 + std::f64::consts::LN_2;

#[derive(Debug, Clone)]
pub(crate) struct SwarmBest {
    pub(crate) x: Vec<f64>,
    pub(crate) y: f64,
}

/// State shared by every particle of one run.
pub(crate) struct Swarm {
    pub(crate) f: Objective,
    pub(crate) w: f64,
    best: Mutex<SwarmBest>,
}

impl Swarm {
    pub(crate) fn new(f: Objective, w: f64) -> Self {
        Self {
            f,
            w,
            best: Mutex::new(SwarmBest {
                x: Vec::new(),
                y: f64::INFINITY,
            }),
        }
    }

    /// Records `(x, y)` if it beats the swarm best.
    pub(crate) fn offer(&self, x: &[f64], y: f64) {
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        if y < best.y {
            best.x = x.to_vec();
            best.y = y;
        }
    }

    pub(crate) fn best(&self) -> SwarmBest {
        self.best.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// A particle: position, velocity and the best position it has visited.
#[derive(Clone)]
pub struct Particle {
    pub x: Vec<f64>,
    pub velocity: Vec<f64>,
    pub best_x: Vec<f64>,
    pub best_y: f64,
    pub(crate) swarm: Arc<Swarm>,
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("x", &self.x)
            .field("velocity", &self.velocity)
            .field("best_y", &self.best_y)
            .finish_non_exhaustive()
    }
}

impl Particle {
    /// Draws a particle uniformly in `[min, max)^n_dims` with a velocity that
    /// keeps its first move inside the box.
    pub(crate) fn new<R: Rng>(swarm: Arc<Swarm>, n_dims: usize, min: f64, max: f64, rng: &mut R) -> Self {
        let x = init_unif_f64(n_dims, min, max, rng);
        let velocity = x
            .iter()
            .map(|xi| {
                let (lo, hi) = (min - xi, max - xi);
                lo + rng.random::<f64>() * (hi - lo)
            })
            .collect();
        let y = (swarm.f)(&x);
        swarm.offer(&x, y);
        Self {
            best_x: x.clone(),
            best_y: y,
            x,
            velocity,
            swarm,
        }
    }

    /// Centre of gravity between the particle, its best and the swarm best.
    fn gravity_centre(&self, global: &[f64]) -> Vec<f64> {
        let alone = global.is_empty() || global == self.best_x.as_slice();
        self.x
            .iter()
            .enumerate()
            .map(|(i, &xi)| {
                if alone {
                    xi + C * (self.best_x[i] - xi) / 2.0
                } else {
                    xi + C * (self.best_x[i] + global[i] - 2.0 * xi) / 3.0
                }
            })
            .collect()
    }
}

/// Uniform point in the ball of centre `centre` and radius `radius`.
fn sample_ball<R: Rng>(centre: &[f64], radius: f64, rng: &mut R) -> Vec<f64> {
    let direction: Vec<f64> = centre.iter().map(|_| rng.sample(StandardNormal)).collect();
    let norm = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
    if norm == 0.0 || radius == 0.0 {
        return centre.to_vec();
    }
    let r = radius * rng.random::<f64>().powf(1.0 / centre.len() as f64);
    centre.iter().zip(&direction).map(|(c, d)| c + r * d / norm).collect()
}

impl Genome for Particle {
    fn evaluate(&self) -> Result<f64, EvalError> {
        Ok((self.swarm.f)(&self.x))
    }

    /// One SPSO-2011 step, then the personal and swarm bests are refreshed.
    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        let global = self.swarm.best().x;
        let centre = self.gravity_centre(&global);
        let radius = centre
            .iter()
            .zip(&self.x)
            .map(|(g, x)| (g - x) * (g - x))
            .sum::<f64>()
            .sqrt();
        let target = sample_ball(&centre, radius, rng);
        for ((v, x), t) in self.velocity.iter_mut().zip(self.x.iter_mut()).zip(&target) {
            *v = self.swarm.w * *v + t - *x;
            *x += *v;
        }

        let y = (self.swarm.f)(&self.x);
        if y < self.best_y {
            self.best_x = self.x.clone();
            self.best_y = y;
        }
        self.swarm.offer(&self.x, y);
    }
}
