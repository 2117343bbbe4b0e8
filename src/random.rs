//! Random number helpers.
//!
//! Every island owns one [`StdRng`]; these helpers only ever borrow it.

use crate::error::GaError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a seeded random number generator.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Samples `k` distinct integers from `[min, max)` with reservoir sampling
/// (Vitter's Algorithm R).
///
/// The first `k` slots start as `min..min + k` and are then overwritten by
/// later values, so for `k == max - min` the result is the whole range in
/// ascending order.
///
/// Callers must ensure `k <= max - min`.
pub fn random_ints<R: Rng + ?Sized>(k: usize, min: usize, max: usize, rng: &mut R) -> Vec<usize> {
    let mut ints: Vec<usize> = (0..k).map(|i| i + min).collect();
    for i in k..max.saturating_sub(min) {
        let j = rng.random_range(0..=i);
        if j < k {
            ints[j] = i + min;
        }
    }
    ints
}

/// Samples `k` values from `values` without replacement.
///
/// Returns the sampled values together with their positions in `values`.
pub fn sample_ints<R: Rng + ?Sized>(
    values: &[usize],
    k: usize,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>), GaError> {
    if k > values.len() {
        return Err(GaError::invariant(format!(
            "cannot sample {k} elements from array of length {}",
            values.len()
        )));
    }
    let idxs = random_ints(k, 0, values.len(), rng);
    let sample = idxs.iter().map(|&i| values[i]).collect();
    Ok((sample, idxs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ints_distinct_and_bounded() {
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let ints = random_ints(4, 3, 12, &mut rng);
            assert_eq!(ints.len(), 4);
            assert!(ints.iter().all(|&v| (3..12).contains(&v)));
            let set: HashSet<usize> = ints.iter().copied().collect();
            assert_eq!(set.len(), 4, "duplicates in {ints:?}");
        }
    }

    #[test]
    fn test_random_ints_full_range_is_ordered() {
        let mut rng = create_rng(7);
        assert_eq!(random_ints(5, 0, 5, &mut rng), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_random_ints_covers_range() {
        let mut rng = create_rng(1);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(random_ints(1, 0, 6, &mut rng));
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_sample_ints() {
        let mut rng = create_rng(3);
        let values = vec![10, 20, 30, 40];
        let (sample, idxs) = sample_ints(&values, 3, &mut rng).unwrap();
        for (s, i) in sample.iter().zip(&idxs) {
            assert_eq!(values[*i], *s);
        }
        assert!(sample_ints(&values, 5, &mut rng).unwrap_err().is_invariant());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = create_rng(99);
        let mut b = create_rng(99);
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }
}
