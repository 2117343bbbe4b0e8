//! Islands and slice-level population helpers.

use super::types::{Genome, Individual};
use crate::error::GaError;
use crate::random::create_rng;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::Duration;

/// An independently evolving group of individuals with its own RNG.
///
/// After every completed generation step the individuals are sorted by
/// ascending fitness. The RNG is never shared with another island.
#[derive(Debug, Clone)]
pub struct Population<G> {
    /// Individuals, best first between generation steps.
    pub individuals: Vec<Individual<G>>,
    /// Island-owned random source.
    pub rng: StdRng,
    /// Island index within the GA.
    pub id: usize,
    /// Number of generation steps this island went through.
    pub generations: usize,
    /// Accumulated time spent evolving this island.
    pub age: Duration,
}

impl<G: Genome> Population<G> {
    /// Creates `size` fresh, unevaluated individuals from `factory`.
    pub fn new<F>(id: usize, size: usize, factory: &F, seed: u64) -> Self
    where
        F: Fn(&mut StdRng) -> G,
    {
        let mut rng = create_rng(seed);
        let individuals = (0..size)
            .map(|_| {
                let genome = factory(&mut rng);
                Individual::new(genome, &mut rng)
            })
            .collect();
        Self::from_individuals(id, individuals, rng)
    }

    /// Wraps existing individuals with the given RNG.
    pub fn from_individuals(id: usize, individuals: Vec<Individual<G>>, rng: StdRng) -> Self {
        Self {
            individuals,
            rng,
            id,
            generations: 0,
            age: Duration::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Evaluates every unevaluated individual. See [`evaluate_individuals`].
    pub fn evaluate(&mut self, parallel: bool) -> Result<(), GaError> {
        evaluate_individuals(&mut self.individuals, parallel)
    }

    /// Stable-sorts the individuals by ascending fitness.
    pub fn sort_by_fitness(&mut self) {
        sort_by_fitness(&mut self.individuals);
    }

    pub fn is_sorted_by_fitness(&self) -> bool {
        is_sorted_by_fitness(&self.individuals)
    }

    /// Best individual, assuming the population is sorted.
    pub fn best(&self) -> Option<&Individual<G>> {
        self.individuals.first()
    }

    /// Logs one statistics line at `level`.
    pub fn log_stats(&self, level: log::Level) {
        log::log!(
            level,
            "pop_id={} min={} max={} avg={} std={}",
            self.id,
            fit_min(&self.individuals),
            fit_max(&self.individuals),
            fit_avg(&self.individuals),
            fit_std(&self.individuals)
        );
    }
}

/// Evaluates every individual whose cached fitness is stale.
///
/// With `parallel` set the work is spread over the rayon pool. The first
/// error observed is returned; evaluations already running complete and
/// keep their result, so no individual is left half-updated.
pub fn evaluate_individuals<G: Genome>(indis: &mut [Individual<G>], parallel: bool) -> Result<(), GaError> {
    if parallel {
        indis.par_iter_mut().try_for_each(Individual::evaluate)
    } else {
        indis.iter_mut().try_for_each(Individual::evaluate)
    }
}

/// Stable-sorts individuals by ascending fitness. NaN compares equal.
pub fn sort_by_fitness<G>(indis: &mut [Individual<G>]) {
    indis.sort_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(Ordering::Equal));
}

pub fn is_sorted_by_fitness<G>(indis: &[Individual<G>]) -> bool {
    indis.windows(2).all(|w| w[0].fitness <= w[1].fitness)
}

/// Mutates each individual with probability `rate`.
pub fn mutate_individuals<G: Genome, R: Rng>(indis: &mut [Individual<G>], rate: f64, rng: &mut R) {
    for indi in indis.iter_mut() {
        if rng.random::<f64>() < rate {
            indi.mutate(rng);
        }
    }
}

/// Lowest fitness, `+inf` for an empty slice.
pub fn fit_min<G>(indis: &[Individual<G>]) -> f64 {
    indis.iter().map(|i| i.fitness).fold(f64::INFINITY, f64::min)
}

/// Highest fitness, `-inf` for an empty slice.
pub fn fit_max<G>(indis: &[Individual<G>]) -> f64 {
    indis.iter().map(|i| i.fitness).fold(f64::NEG_INFINITY, f64::max)
}

pub fn fit_avg<G>(indis: &[Individual<G>]) -> f64 {
    if indis.is_empty() {
        return 0.0;
    }
    indis.iter().map(|i| i.fitness).sum::<f64>() / indis.len() as f64
}

/// Population standard deviation of the fitnesses.
pub fn fit_std<G>(indis: &[Individual<G>]) -> f64 {
    if indis.is_empty() {
        return 0.0;
    }
    let avg = fit_avg(indis);
    let var = indis.iter().map(|i| (i.fitness - avg).powi(2)).sum::<f64>() / indis.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::testing::{new_vector, ErrorGenome, Vector};
    use proptest::prelude::*;

    fn with_fitnesses(fits: &[f64]) -> Vec<Individual<Vector>> {
        fits.iter()
            .enumerate()
            .map(|(i, &f)| Individual {
                genome: Vector(vec![f]),
                fitness: f,
                evaluated: true,
                id: i as u64,
            })
            .collect()
    }

    #[test]
    fn test_new_population() {
        let pop = Population::new(3, 12, &new_vector, 42);
        assert_eq!(pop.len(), 12);
        assert_eq!(pop.id, 3);
        assert!(pop.individuals.iter().all(|i| !i.evaluated));
    }

    #[test]
    fn test_same_seed_same_population() {
        let a = Population::new(0, 5, &new_vector, 9);
        let b = Population::new(0, 5, &new_vector, 9);
        let ga: Vec<&Vector> = a.individuals.iter().map(|i| &i.genome).collect();
        let gb: Vec<&Vector> = b.individuals.iter().map(|i| &i.genome).collect();
        assert_eq!(ga, gb);
    }

    #[test]
    fn test_evaluate_sequential_and_parallel() {
        for parallel in [false, true] {
            let mut pop = Population::new(0, 20, &new_vector, 42);
            pop.evaluate(parallel).unwrap();
            assert!(pop.individuals.iter().all(|i| i.evaluated));
            for indi in &pop.individuals {
                let expected: f64 = indi.genome.0.iter().map(|x| x * x).sum();
                assert_eq!(indi.fitness, expected);
            }
        }
    }

    #[test]
    fn test_evaluate_error() {
        for parallel in [false, true] {
            let mut pop = Population::new(0, 8, &|_: &mut StdRng| ErrorGenome, 1);
            assert!(pop.evaluate(parallel).unwrap_err().is_evaluation());
        }
    }

    #[test]
    fn test_sort_is_stable() {
        let mut indis = with_fitnesses(&[2.0, 1.0, 2.0, 0.5, 1.0]);
        sort_by_fitness(&mut indis);
        let ids: Vec<u64> = indis.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 0, 2]);
        assert!(is_sorted_by_fitness(&indis));
    }

    #[test]
    fn test_fitness_stats() {
        let indis = with_fitnesses(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(fit_min(&indis), 1.0);
        assert_eq!(fit_max(&indis), 4.0);
        assert_eq!(fit_avg(&indis), 2.5);
        assert!((fit_std(&indis) - 1.25f64.sqrt()).abs() < 1e-12);
        let empty: Vec<Individual<Vector>> = Vec::new();
        assert_eq!(fit_avg(&empty), 0.0);
        assert_eq!(fit_std(&empty), 0.0);
    }

    #[test]
    fn test_mutate_individuals_rate() {
        let mut pop = Population::new(0, 10, &new_vector, 42);
        pop.evaluate(false).unwrap();
        let Population { individuals, rng, .. } = &mut pop;
        mutate_individuals(individuals, 0.0, rng);
        assert!(individuals.iter().all(|i| i.evaluated));
        mutate_individuals(individuals, 1.0, rng);
        assert!(individuals.iter().all(|i| !i.evaluated));
    }

    #[test]
    fn test_log_stats() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut pop = Population::new(0, 4, &new_vector, 42);
        pop.evaluate(false).unwrap();
        pop.log_stats(log::Level::Info);
    }

    proptest! {
        #[test]
        fn prop_sorted_after_sort(fits in prop::collection::vec(-1e6f64..1e6, 0..60)) {
            let mut indis = with_fitnesses(&fits);
            sort_by_fitness(&mut indis);
            prop_assert!(is_sorted_by_fitness(&indis));
            prop_assert_eq!(indis.len(), fits.len());
        }
    }
}
