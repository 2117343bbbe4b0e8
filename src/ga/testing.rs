//! Test genomes and stub strategies shared by the unit tests.

use super::models::Model;
use super::operators::{cross_uniform_f64, init_unif_f64, mut_normal_f64};
use super::population::Population;
use super::types::Genome;
use crate::error::{EvalError, GaError};
use rand::rngs::StdRng;
use rand::Rng;

/// Real vector minimizing the sphere function.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector(pub Vec<f64>);

impl Genome for Vector {
    fn evaluate(&self) -> Result<f64, EvalError> {
        Ok(self.0.iter().map(|x| x * x).sum())
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        mut_normal_f64(&mut self.0, 0.8, rng);
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> (Self, Self) {
        let (a, b) = cross_uniform_f64(&self.0, &other.0, rng);
        (Vector(a), Vector(b))
    }
}

pub fn new_vector(rng: &mut StdRng) -> Vector {
    Vector(init_unif_f64(4, -10.0, 10.0, rng))
}

pub fn l1_distance(a: &Vector, b: &Vector) -> f64 {
    a.0.iter().zip(&b.0).map(|(x, y)| (x - y).abs()).sum()
}

/// Genome whose fitness function always fails.
#[derive(Debug, Clone)]
pub struct ErrorGenome;

impl Genome for ErrorGenome {
    fn evaluate(&self) -> Result<f64, EvalError> {
        Err("fitness function failed".into())
    }

    fn mutate<R: Rng>(&mut self, _rng: &mut R) {}
}

/// Evaluates fine until it has been mutated once.
#[derive(Debug, Clone)]
pub struct FragileGenome {
    pub broken: bool,
}

impl Genome for FragileGenome {
    fn evaluate(&self) -> Result<f64, EvalError> {
        if self.broken {
            Err("mutated genome cannot be evaluated".into())
        } else {
            Ok(1.0)
        }
    }

    fn mutate<R: Rng>(&mut self, _rng: &mut R) {
        self.broken = true;
    }
}

/// Leaves the population untouched.
pub struct ModIdentity;

impl<G: Genome> Model<G> for ModIdentity {
    fn apply(&self, _pop: &mut Population<G>) -> Result<(), GaError> {
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        Ok(())
    }
}

/// Fails on every application.
pub struct ModRuntimeError;

impl<G: Genome> Model<G> for ModRuntimeError {
    fn apply(&self, _pop: &mut Population<G>) -> Result<(), GaError> {
        Err(GaError::invariant("model failed"))
    }

    fn validate(&self) -> Result<(), GaError> {
        Ok(())
    }
}
