//! Partitioning a population into species.
//!
//! When a [`Speciator`] is configured, each island is split into species,
//! the model runs on every species separately and the species are
//! concatenated back in order. Species are copies of the island's
//! individuals; concatenating them restores the exact multiset.

use super::distance::{rebalance_clusters, sort_by_distance_to_medoid, DistanceMemoizer, Metric};
use super::types::{Genome, Individual};
use crate::error::GaError;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Splits individuals into species.
pub trait Speciator<G: Genome>: Send + Sync {
    fn apply(&self, indis: &[Individual<G>], rng: &mut StdRng) -> Result<Vec<Vec<Individual<G>>>, GaError>;

    fn validate(&self) -> Result<(), GaError>;
}

/// Fitness-banded speciation.
///
/// Given `n` individuals sorted by fitness, `m = ceil(n / k)` and species `i`
/// holds the contiguous range `[i*m, min((i+1)*m, n))`. This gives `k - 1`
/// full species and one smaller remainder; trailing species may be empty
/// when `m` overshoots (for instance `n = 5, k = 4`).
///
/// # Examples
///
/// ```
/// use u_evolve::ga::SpecFitnessInterval;
///
/// let spec = SpecFitnessInterval { k: 3 };
/// assert_eq!(spec.sizes(10), vec![4, 4, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecFitnessInterval {
    pub k: usize,
}

impl SpecFitnessInterval {
    /// Species sizes for `n` individuals.
    pub fn sizes(&self, n: usize) -> Vec<usize> {
        self.bounds(n).into_iter().map(|(a, b)| b - a).collect()
    }

    fn bounds(&self, n: usize) -> Vec<(usize, usize)> {
        let m = n.div_ceil(self.k.max(1));
        (0..self.k)
            .map(|i| ((i * m).min(n), ((i + 1) * m).min(n)))
            .collect()
    }
}

impl<G: Genome> Speciator<G> for SpecFitnessInterval {
    fn apply(&self, indis: &[Individual<G>], _rng: &mut StdRng) -> Result<Vec<Vec<Individual<G>>>, GaError> {
        if self.k > indis.len() {
            return Err(GaError::invariant(format!(
                "cannot split {} individuals into {} species",
                indis.len(),
                self.k
            )));
        }
        Ok(self
            .bounds(indis.len())
            .into_iter()
            .map(|(a, b)| indis[a..b].to_vec())
            .collect())
    }

    fn validate(&self) -> Result<(), GaError> {
        if self.k < 2 {
            return Err(GaError::config("k should be at least 2"));
        }
        Ok(())
    }
}

/// K-medoids speciation over a user metric.
///
/// The `k` individuals closest to the population medoid seed the species and
/// everybody else joins the closest seed. Medoids are then recomputed and
/// members reassigned for up to `max_iterations` rounds, stopping as soon as
/// the total member-to-medoid distance no longer decreases. Finally every
/// species but the last is capped at `ceil(n / k)` members, the excess
/// flowing to the next species.
pub struct SpecKMedoids<G> {
    pub k: usize,
    pub metric: Metric<G>,
    pub max_iterations: usize,
}

impl<G> Clone for SpecKMedoids<G> {
    fn clone(&self) -> Self {
        Self {
            k: self.k,
            metric: Arc::clone(&self.metric),
            max_iterations: self.max_iterations,
        }
    }
}

impl<G> std::fmt::Debug for SpecKMedoids<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecKMedoids")
            .field("k", &self.k)
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl<G: Genome> SpecKMedoids<G> {
    pub fn new<F>(k: usize, metric: F, max_iterations: usize) -> Self
    where
        F: Fn(&G, &G) -> f64 + Send + Sync + 'static,
    {
        Self {
            k,
            metric: Arc::new(metric),
            max_iterations,
        }
    }
}

/// Assigns `members` to their closest medoid. Returns the total distance.
fn assign<G: Genome>(
    members: impl IntoIterator<Item = Individual<G>>,
    medoids: &[Individual<G>],
    species: &mut [Vec<Individual<G>>],
    dm: &mut DistanceMemoizer<G>,
) -> f64 {
    let mut total = 0.0;
    for indi in members {
        let i = indi.idx_of_closest(medoids, dm);
        total += dm.get_distance(&medoids[i], &indi);
        species[i].push(indi);
    }
    total
}

impl<G: Genome> Speciator<G> for SpecKMedoids<G> {
    fn apply(&self, indis: &[Individual<G>], _rng: &mut StdRng) -> Result<Vec<Vec<Individual<G>>>, GaError> {
        let n = indis.len();
        if self.k > n {
            return Err(GaError::invariant(format!("k ({}) > number of individuals ({n})", self.k)));
        }
        let mut dm = DistanceMemoizer::from_metric(Arc::clone(&self.metric));

        let mut pool = indis.to_vec();
        sort_by_distance_to_medoid(&mut pool, &mut dm);
        let rest = pool.split_off(self.k);
        let mut medoids = pool;
        let mut species: Vec<Vec<Individual<G>>> = medoids.iter().map(|m| vec![m.clone()]).collect();
        let mut total = assign(rest, &medoids, &mut species, &mut dm);

        for _ in 0..self.max_iterations {
            for (medoid, specie) in medoids.iter_mut().zip(species.iter_mut()) {
                sort_by_distance_to_medoid(specie, &mut dm);
                *medoid = specie[0].clone();
            }
            let mut next: Vec<Vec<Individual<G>>> = medoids.iter().map(|m| vec![m.clone()]).collect();
            let members = species.iter().flat_map(|s| s.iter().skip(1).cloned());
            let next_total = assign(members, &medoids, &mut next, &mut dm);
            if next_total >= total {
                break;
            }
            species = next;
            total = next_total;
        }
        log::trace!(
            "k-medoids: {} species, total distance {total}, {} metric calls",
            species.len(),
            dm.n_calculations()
        );

        rebalance_clusters(&mut species, &mut dm, n.div_ceil(self.k))?;
        Ok(species)
    }

    fn validate(&self) -> Result<(), GaError> {
        if self.k < 2 {
            return Err(GaError::config("k should be at least 2"));
        }
        if self.max_iterations == 0 {
            return Err(GaError::config("max_iterations should be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::population::Population;
    use crate::ga::testing::{l1_distance, new_vector, Vector};
    use crate::random::create_rng;
    use proptest::prelude::*;

    fn points(coords: &[(f64, f64)], rng: &mut StdRng) -> Vec<Individual<Vector>> {
        coords
            .iter()
            .map(|&(x, y)| Individual::new(Vector(vec![x, y]), rng))
            .collect()
    }

    #[test]
    fn test_fitness_interval_sizes() {
        assert_eq!(SpecFitnessInterval { k: 2 }.sizes(7), vec![4, 3]);
        assert_eq!(SpecFitnessInterval { k: 3 }.sizes(10), vec![4, 4, 2]);
        assert_eq!(SpecFitnessInterval { k: 4 }.sizes(30), vec![8, 8, 8, 6]);
        assert_eq!(SpecFitnessInterval { k: 2 }.sizes(2), vec![1, 1]);
    }

    #[test]
    fn test_fitness_interval_contiguous() {
        let mut pop = Population::new(0, 10, &new_vector, 42);
        pop.evaluate(false).unwrap();
        pop.sort_by_fitness();
        let mut rng = create_rng(1);
        let species = SpecFitnessInterval { k: 3 }.apply(&pop.individuals, &mut rng).unwrap();
        let merged: Vec<u64> = species.iter().flatten().map(|i| i.id).collect();
        let original: Vec<u64> = pop.individuals.iter().map(|i| i.id).collect();
        assert_eq!(merged, original);
    }

    #[test]
    fn test_fitness_interval_too_many_species() {
        let pop = Population::new(0, 2, &new_vector, 42);
        let mut rng = create_rng(1);
        let err = SpecFitnessInterval { k: 3 }.apply(&pop.individuals, &mut rng).unwrap_err();
        assert!(err.is_invariant());
    }

    #[test]
    fn test_fitness_interval_validate() {
        assert!(Speciator::<Vector>::validate(&SpecFitnessInterval { k: 2 }).is_ok());
        assert!(Speciator::<Vector>::validate(&SpecFitnessInterval { k: 1 }).unwrap_err().is_config());
    }

    #[test]
    fn test_kmedoids_two_groups() {
        let mut rng = create_rng(42);
        let indis = points(
            &[
                (2.0, 6.0),
                (3.0, 4.0),
                (3.0, 8.0),
                (4.0, 7.0),
                (6.0, 2.0),
                (6.0, 4.0),
                (7.0, 3.0),
                (7.0, 4.0),
                (8.0, 5.0),
                (7.0, 6.0),
            ],
            &mut rng,
        );
        let spec = SpecKMedoids::new(2, l1_distance, 10);
        let species = spec.apply(&indis, &mut rng).unwrap();
        let sizes: Vec<usize> = species.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 6]);
        // Left-hand group
        for indi in &species[0] {
            assert!(indi.genome.0[0] <= 4.0);
        }
    }

    #[test]
    fn test_kmedoids_identical_points() {
        let mut rng = create_rng(42);
        let indis = points(&[(1.0, 1.0), (1.0, 1.0)], &mut rng);
        let species = SpecKMedoids::new(2, l1_distance, 10).apply(&indis, &mut rng).unwrap();
        let sizes: Vec<usize> = species.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1]);
    }

    #[test]
    fn test_kmedoids_k_too_large() {
        let mut rng = create_rng(42);
        let indis = points(&[(1.0, 1.0), (1.0, 2.0)], &mut rng);
        let err = SpecKMedoids::new(3, l1_distance, 10).apply(&indis, &mut rng).unwrap_err();
        assert!(err.is_invariant());
    }

    #[test]
    fn test_kmedoids_validate() {
        assert!(SpecKMedoids::new(2, l1_distance, 1).validate().is_ok());
        assert!(SpecKMedoids::new(1, l1_distance, 1).validate().unwrap_err().is_config());
        assert!(SpecKMedoids::new(2, l1_distance, 0).validate().unwrap_err().is_config());
    }

    proptest! {
        #[test]
        fn prop_fitness_interval_sizes(n in 1usize..200, k in 2usize..20) {
            prop_assume!(k <= n);
            let m = n.div_ceil(k);
            let sizes = SpecFitnessInterval { k }.sizes(n);
            prop_assert_eq!(sizes.len(), k);
            prop_assert_eq!(sizes.iter().sum::<usize>(), n);
            for (i, &s) in sizes.iter().enumerate() {
                prop_assert_eq!(s, n.saturating_sub(i * m).min(m));
            }
        }

        #[test]
        fn prop_kmedoids_keeps_everyone(n in 2usize..25, k in 2usize..5, seed in any::<u64>()) {
            prop_assume!(k <= n);
            let pop = Population::new(0, n, &new_vector, seed);
            let mut rng = create_rng(seed);
            let species = SpecKMedoids::new(k, l1_distance, 5).apply(&pop.individuals, &mut rng).unwrap();
            prop_assert_eq!(species.len(), k);
            prop_assert!(species.iter().all(|s| !s.is_empty()));
            let mut ids: Vec<u64> = species.iter().flatten().map(|i| i.id).collect();
            let mut expected: Vec<u64> = pop.individuals.iter().map(|i| i.id).collect();
            ids.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(ids, expected);
        }
    }
}
