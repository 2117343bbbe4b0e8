//! Core trait definitions for the evolutionary engine.
//!
//! [`Genome`] is the contract between the generic engine and a
//! problem-specific solution representation. [`Individual`] wraps a genome
//! with its cached fitness.

use super::distance::DistanceMemoizer;
use crate::error::{EvalError, GaError};
use rand::Rng;

/// A candidate solution together with its problem-specific operators.
///
/// The engine only needs four capabilities: evaluate, mutate, crossover and
/// clone (through [`Clone`]). Clones must be deep copies; since genomes are
/// owned values this holds for any type built from owned data.
///
/// Lower fitness is better (minimization). Maximization problems return a
/// negated or reciprocal fitness.
///
/// # Implementing
///
/// ```
/// use rand::Rng;
/// use u_evolve::ga::Genome;
/// use u_evolve::EvalError;
///
/// #[derive(Clone, Debug)]
/// struct Point(Vec<f64>);
///
/// impl Genome for Point {
///     fn evaluate(&self) -> Result<f64, EvalError> {
///         Ok(self.0.iter().map(|x| x * x).sum())
///     }
///
///     fn mutate<R: Rng>(&mut self, rng: &mut R) {
///         let i = rng.random_range(0..self.0.len());
///         self.0[i] += rng.random_range(-0.1..0.1);
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// `Genome` must be `Send + Sync`: islands evolve on different threads and
/// individuals may be evaluated in parallel with rayon.
pub trait Genome: Clone + Send + Sync {
    /// Computes the fitness. Must not change the genome.
    ///
    /// This is the cost center of a run; it may be called from any thread.
    fn evaluate(&self) -> Result<f64, EvalError>;

    /// Perturbs the genome in place.
    fn mutate<R: Rng>(&mut self, rng: &mut R);

    /// Produces two new genomes from `self` and `other`.
    ///
    /// Neither parent is modified. The default implementation returns clones
    /// of both parents (no recombination).
    fn crossover<R: Rng>(&self, other: &Self, _rng: &mut R) -> (Self, Self) {
        (self.clone(), other.clone())
    }
}

/// A genome plus its cached fitness.
///
/// The cache is only valid when `evaluated` is `true`; [`mutate`](Self::mutate)
/// and [`crossover`](Self::crossover) invalidate it. `id` names the genome
/// content: it changes whenever the genome changes and is kept by [`Clone`].
#[derive(Debug, Clone)]
pub struct Individual<G> {
    /// The wrapped genome.
    pub genome: G,
    /// Cached fitness, `f64::INFINITY` until evaluated.
    pub fitness: f64,
    /// Whether `fitness` reflects the current genome.
    pub evaluated: bool,
    /// Content identifier used by the distance memoizer.
    pub id: u64,
}

impl<G: Genome> Individual<G> {
    /// Wraps a fresh genome. The individual starts unevaluated.
    pub fn new<R: Rng>(genome: G, rng: &mut R) -> Self {
        Self {
            genome,
            fitness: f64::INFINITY,
            evaluated: false,
            id: rng.random(),
        }
    }

    /// Evaluates the genome unless the cached fitness is still valid.
    pub fn evaluate(&mut self) -> Result<(), GaError> {
        if self.evaluated {
            return Ok(());
        }
        self.fitness = self.genome.evaluate().map_err(GaError::Evaluation)?;
        self.evaluated = true;
        Ok(())
    }

    /// Mutates the genome and invalidates the cached fitness.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) {
        self.genome.mutate(rng);
        self.evaluated = false;
        self.id = rng.random();
    }

    /// Recombines two individuals into two unevaluated offspring.
    pub fn crossover<R: Rng>(&self, mate: &Self, rng: &mut R) -> (Self, Self) {
        let (g1, g2) = self.genome.crossover(&mate.genome, rng);
        (Self::new(g1, rng), Self::new(g2, rng))
    }

    /// Returns the index of the closest individual in `others`.
    ///
    /// Ties keep the first candidate. Returns 0 for an empty slice.
    pub fn idx_of_closest(&self, others: &[Individual<G>], dm: &mut DistanceMemoizer<G>) -> usize {
        let mut min = f64::INFINITY;
        let mut idx = 0;
        for (j, candidate) in others.iter().enumerate() {
            let dist = dm.get_distance(self, candidate);
            if dist < min {
                min = dist;
                idx = j;
            }
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::testing::{l1_distance, ErrorGenome, Vector};
    use crate::random::create_rng;

    #[test]
    fn test_new_is_unevaluated() {
        let mut rng = create_rng(42);
        let indi = Individual::new(Vector(vec![1.0, 2.0]), &mut rng);
        assert!(!indi.evaluated);
        assert!(indi.fitness.is_infinite());
    }

    #[test]
    fn test_evaluate_caches() {
        let mut rng = create_rng(42);
        let mut indi = Individual::new(Vector(vec![1.0, 2.0]), &mut rng);
        indi.evaluate().unwrap();
        assert!(indi.evaluated);
        assert!((indi.fitness - 5.0).abs() < 1e-12);
        // A stale genome is not re-read while the cache is valid
        indi.genome.0[0] = 10.0;
        indi.evaluate().unwrap();
        assert!((indi.fitness - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_mutate_invalidates() {
        let mut rng = create_rng(42);
        let mut indi = Individual::new(Vector(vec![1.0, 2.0]), &mut rng);
        indi.evaluate().unwrap();
        let id = indi.id;
        indi.mutate(&mut rng);
        assert!(!indi.evaluated);
        assert_ne!(indi.id, id);
    }

    #[test]
    fn test_clone_then_mutate_leaves_original() {
        let mut rng = create_rng(42);
        let mut original = Individual::new(Vector(vec![1.0, -2.0, 3.0]), &mut rng);
        original.evaluate().unwrap();
        let before = original.clone();

        let mut clone = original.clone();
        for _ in 0..10 {
            clone.mutate(&mut rng);
        }
        clone.evaluate().unwrap();

        assert_eq!(original.genome, before.genome);
        assert_eq!(original.fitness, before.fitness);
        assert!(original.evaluated);
        assert_ne!(clone.genome, original.genome);
    }

    #[test]
    fn test_crossover_leaves_parents() {
        let mut rng = create_rng(42);
        let mut p1 = Individual::new(Vector(vec![1.0, 1.0, 1.0]), &mut rng);
        let mut p2 = Individual::new(Vector(vec![3.0, 3.0, 3.0]), &mut rng);
        p1.evaluate().unwrap();
        p2.evaluate().unwrap();
        let (o1, o2) = p1.crossover(&p2, &mut rng);
        assert!(!o1.evaluated && !o2.evaluated);
        assert!(p1.evaluated && p2.evaluated);
        assert_eq!(p1.genome, Vector(vec![1.0, 1.0, 1.0]));
        assert_eq!(p2.genome, Vector(vec![3.0, 3.0, 3.0]));
    }

    #[test]
    fn test_evaluate_error_propagates() {
        let mut rng = create_rng(42);
        let mut indi = Individual::new(ErrorGenome, &mut rng);
        assert!(indi.evaluate().unwrap_err().is_evaluation());
        assert!(!indi.evaluated);
    }

    #[test]
    fn test_idx_of_closest() {
        let mut rng = create_rng(42);
        let target = Individual::new(Vector(vec![0.0, 0.0]), &mut rng);
        let others = vec![
            Individual::new(Vector(vec![5.0, 5.0]), &mut rng),
            Individual::new(Vector(vec![1.0, 0.0]), &mut rng),
            Individual::new(Vector(vec![0.0, 1.0]), &mut rng),
        ];
        let mut dm = DistanceMemoizer::new(l1_distance);
        assert_eq!(target.idx_of_closest(&others, &mut dm), 1);
    }
}
