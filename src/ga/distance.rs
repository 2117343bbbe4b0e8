//! Memoized genome distances and medoid-based cluster rebalancing.

use super::types::{Genome, Individual};
use crate::error::GaError;
use std::collections::HashMap;
use std::sync::Arc;

/// A distance function between two genomes.
pub type Metric<G> = Arc<dyn Fn(&G, &G) -> f64 + Send + Sync>;

/// Computes and stores [`Metric`] calculations.
///
/// Distances are keyed by the canonical `(min id, max id)` pair of the two
/// individuals, so `d(a, b)` and `d(b, a)` share one entry. The cache only
/// grows; a pair is computed at most once.
pub struct DistanceMemoizer<G> {
    metric: Metric<G>,
    distances: HashMap<(u64, u64), f64>,
    n_calculations: usize,
}

impl<G: Genome> DistanceMemoizer<G> {
    /// Creates a memoizer from a plain function or closure.
    pub fn new<F>(metric: F) -> Self
    where
        F: Fn(&G, &G) -> f64 + Send + Sync + 'static,
    {
        Self::from_metric(Arc::new(metric))
    }

    /// Creates a memoizer from a shared metric.
    pub fn from_metric(metric: Metric<G>) -> Self {
        Self {
            metric,
            distances: HashMap::new(),
            n_calculations: 0,
        }
    }

    /// Returns the distance between two individuals.
    ///
    /// Individuals sharing an id are at distance 0 and the metric is not
    /// called.
    pub fn get_distance(&mut self, a: &Individual<G>, b: &Individual<G>) -> f64 {
        if a.id == b.id {
            return 0.0;
        }
        let key = (a.id.min(b.id), a.id.max(b.id));
        if let Some(&dist) = self.distances.get(&key) {
            return dist;
        }
        let dist = (self.metric)(&a.genome, &b.genome);
        self.distances.insert(key, dist);
        self.n_calculations += 1;
        dist
    }

    /// Number of times the metric has actually been called.
    pub fn n_calculations(&self) -> usize {
        self.n_calculations
    }
}

/// Average distance of each individual to the rest of `indis`.
pub fn avg_distances<G: Genome>(indis: &[Individual<G>], dm: &mut DistanceMemoizer<G>) -> Vec<f64> {
    let n = indis.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            let total: f64 = (0..n).map(|j| dm.get_distance(&indis[i], &indis[j])).sum();
            total / (n - 1) as f64
        })
        .collect()
}

/// Index of the medoid: the member with the lowest average distance to the
/// others. Ties keep the first member.
pub fn medoid_index<G: Genome>(indis: &[Individual<G>], dm: &mut DistanceMemoizer<G>) -> usize {
    let avg = avg_distances(indis, dm);
    let mut best = 0;
    for (i, &d) in avg.iter().enumerate() {
        if d < avg[best] {
            best = i;
        }
    }
    best
}

/// Stable-sorts `indis` by increasing distance to their medoid.
///
/// Returns the sorted distances, aligned with the new order.
pub fn sort_by_distance_to_medoid<G: Genome>(
    indis: &mut Vec<Individual<G>>,
    dm: &mut DistanceMemoizer<G>,
) -> Vec<f64> {
    if indis.is_empty() {
        return Vec::new();
    }
    let medoid = indis[medoid_index(indis, dm)].clone();
    let mut keyed: Vec<(f64, Individual<G>)> = indis
        .drain(..)
        .map(|indi| (dm.get_distance(&indi, &medoid), indi))
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let mut dists = Vec::with_capacity(keyed.len());
    for (d, indi) in keyed {
        dists.push(d);
        indis.push(indi);
    }
    dists
}

/// Caps every cluster but the last at `target_size` members.
///
/// Clusters are processed left to right. Each one is sorted by distance to
/// its medoid; members beyond `target_size` are moved to the next cluster,
/// farthest first. The last cluster keeps whatever it ends up with.
///
/// # Errors
///
/// - [`GaError::Config`] if `target_size` is 0.
/// - [`GaError::Invariant`] if a cluster is still empty afterwards.
pub fn rebalance_clusters<G: Genome>(
    clusters: &mut [Vec<Individual<G>>],
    dm: &mut DistanceMemoizer<G>,
    target_size: usize,
) -> Result<(), GaError> {
    if target_size == 0 {
        return Err(GaError::config("target cluster size must be at least 1"));
    }
    let k = clusters.len();
    for i in 0..k {
        sort_by_distance_to_medoid(&mut clusters[i], dm);
        if i + 1 < k && clusters[i].len() > target_size {
            let excess = clusters[i].split_off(target_size);
            clusters[i + 1].extend(excess.into_iter().rev());
        }
    }
    if let Some(i) = clusters.iter().position(|c| c.is_empty()) {
        return Err(GaError::invariant(format!("cluster {i} has 0 individuals")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::testing::{l1_distance, Vector};

    fn indi(genes: &[f64], id: u64, fitness: f64) -> Individual<Vector> {
        Individual {
            genome: Vector(genes.to_vec()),
            fitness,
            evaluated: true,
            id,
        }
    }

    #[test]
    fn test_distance_memoizer() {
        let mut dm = DistanceMemoizer::new(l1_distance);
        let a = indi(&[1.0, 1.0, 1.0], 1, 0.0);
        let b = indi(&[3.0, 3.0, 3.0], 2, 0.0);
        let c = indi(&[6.0, 6.0, 6.0], 3, 0.0);

        assert_eq!(dm.n_calculations(), 0);
        assert_eq!(dm.get_distance(&a, &a), 0.0);
        assert_eq!(dm.n_calculations(), 0);
        assert_eq!(dm.get_distance(&a, &b), 6.0);
        assert_eq!(dm.n_calculations(), 1);
        // Symmetric pair served from the cache
        assert_eq!(dm.get_distance(&b, &a), 6.0);
        assert_eq!(dm.n_calculations(), 1);
        assert_eq!(dm.get_distance(&a, &c), 15.0);
        assert_eq!(dm.get_distance(&b, &c), 9.0);
        assert_eq!(dm.n_calculations(), 3);
    }

    #[test]
    fn test_memoized_value_is_never_recomputed() {
        let mut dm = DistanceMemoizer::new(l1_distance);
        let a = indi(&[0.0], 1, 0.0);
        let mut b = indi(&[2.0], 2, 0.0);
        assert_eq!(dm.get_distance(&a, &b), 2.0);
        // Same id, different content: the first answer sticks
        b.genome.0[0] = 100.0;
        assert_eq!(dm.get_distance(&b, &a), 2.0);
    }

    #[test]
    fn test_sort_by_distance_to_medoid() {
        let mut indis = vec![
            indi(&[2.0, 2.0, 2.0], 1, 1.0),
            indi(&[5.0, 5.0, 5.0], 2, 2.0),
            indi(&[3.0, 3.0, 3.0], 3, 0.0),
        ];
        let mut dm = DistanceMemoizer::new(l1_distance);
        let dists = sort_by_distance_to_medoid(&mut indis, &mut dm);
        let order: Vec<f64> = indis.iter().map(|i| i.fitness).collect();
        assert_eq!(order, vec![0.0, 1.0, 2.0]);
        assert_eq!(dists, vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn test_rebalance_moves_farthest_excess_forward() {
        let mut clusters = vec![
            vec![
                indi(&[1.0, 1.0, 1.0], 1, 0.0),
                indi(&[1.0, 1.0, 1.0], 2, 0.0),
                indi(&[3.0, 3.0, 3.0], 5, 0.0),
                indi(&[1.0, 1.0, 1.0], 3, 0.0),
                indi(&[2.0, 2.0, 2.0], 4, 0.0),
            ],
            vec![indi(&[2.0, 2.0, 2.0], 6, 0.0)],
            vec![indi(&[3.0, 3.0, 3.0], 7, 0.0)],
        ];
        let mut dm = DistanceMemoizer::new(l1_distance);
        rebalance_clusters(&mut clusters, &mut dm, 3).unwrap();

        let sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        let ids: Vec<u64> = clusters[0].iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // Moved in decreasing distance order: id 5 (d=6) before id 4 (d=3),
        // then cluster 1 is re-sorted around its own medoid
        let moved: Vec<u64> = clusters[1].iter().map(|i| i.id).collect();
        assert_eq!(moved.len(), 3);
        assert!(moved.contains(&4) && moved.contains(&5) && moved.contains(&6));
    }

    #[test]
    fn test_rebalance_forwards_through_chain() {
        let mut clusters = vec![
            (1..=6).map(|i| indi(&[i as f64], i, 0.0)).collect::<Vec<_>>(),
            vec![],
            vec![],
        ];
        let mut dm = DistanceMemoizer::new(l1_distance);
        rebalance_clusters(&mut clusters, &mut dm, 2).unwrap();
        let sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 2]);
        let total: usize = sizes.iter().sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_rebalance_preserves_multiset() {
        let mut clusters = vec![
            (1..=5).map(|i| indi(&[i as f64, 0.0], i, 0.0)).collect::<Vec<_>>(),
            vec![indi(&[9.0, 9.0], 6, 0.0)],
        ];
        let mut dm = DistanceMemoizer::new(l1_distance);
        rebalance_clusters(&mut clusters, &mut dm, 2).unwrap();
        let mut ids: Vec<u64> = clusters.iter().flatten().map(|i| i.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_rebalance_empty_cluster() {
        let mut clusters = vec![
            vec![indi(&[1.0], 1, 0.0), indi(&[1.0], 2, 0.0)],
            vec![],
        ];
        let mut dm = DistanceMemoizer::new(l1_distance);
        let err = rebalance_clusters(&mut clusters, &mut dm, 2).unwrap_err();
        assert!(err.is_invariant());
    }

    #[test]
    fn test_rebalance_zero_target() {
        let mut clusters = vec![vec![indi(&[1.0], 1, 0.0)]];
        let mut dm = DistanceMemoizer::new(l1_distance);
        assert!(rebalance_clusters(&mut clusters, &mut dm, 0).unwrap_err().is_config());
    }
}
