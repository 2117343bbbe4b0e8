//! Generic genetic operator primitives.
//!
//! Building blocks for implementing [`Genome`](super::Genome) on sequence
//! representations. Every crossover takes two parent slices and returns two
//! freshly allocated offspring; parents are never touched. Mutations work in
//! place. Element types only need `Clone + PartialEq`, so the same primitive
//! serves `f64` vectors, integer permutations and string sequences.
//!
//! # Crossover Operators
//!
//! - [`cross_uniform_f64`]: per-gene convex blend of real vectors
//! - [`gnx`] / [`cross_gnx`]: n-point crossover
//! - [`pmx`] / [`cross_pmx`]: Partially Mapped Crossover, Goldberg & Lingle (1985)
//! - [`ox`] / [`cross_ox`]: Order Crossover, Davis (1985)
//! - [`cross_cx`]: Cycle Crossover, Oliver et al. (1987)
//! - [`cross_erx`]: Edge Recombination, Whitley et al. (1989)
//!
//! # Mutation Operators
//!
//! - [`mut_normal_f64`], [`mut_gaussian_f64`]: Gaussian perturbation
//! - [`mut_permute`]: swap two random positions, `n` times
//! - [`mut_splice`]: rotate at a random split point
//! - [`mut_uniform`]: overwrite random positions from a corpus

use crate::random::random_ints;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;

// ============================================================================
// Helpers
// ============================================================================

/// Position of the first element equal to `v`.
pub fn search<T: PartialEq>(v: &T, s: &[T]) -> Option<usize> {
    s.iter().position(|x| x == v)
}

/// Cycles between two permutations of the same values.
///
/// A cycle is a list of indexes: starting from `i`, the value of `s2` at `i`
/// is looked up in `s1`, and so on until the walk returns to `i`.
pub fn get_cycles<T: PartialEq>(s1: &[T], s2: &[T]) -> Vec<Vec<usize>> {
    let n = s1.len();
    let mut visited = vec![false; n];
    let mut cycles = Vec::new();
    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut cycle = vec![i];
        let mut next = search(&s2[i], s1);
        while let Some(j) = next {
            if j == i || visited[j] {
                break;
            }
            cycle.push(j);
            visited[j] = true;
            next = search(&s2[j], s1);
        }
        cycles.push(cycle);
    }
    cycles
}

/// Left and right neighbours of every position, wrapping around the ends.
///
/// `result[i]` holds the distinct neighbours of `s[i]`.
pub fn get_neighbours<T: Clone + PartialEq>(s: &[T]) -> Vec<Vec<T>> {
    let n = s.len();
    (0..n)
        .map(|i| {
            let mut set: Vec<T> = Vec::with_capacity(2);
            if n > 1 {
                for v in [&s[(i + n - 1) % n], &s[(i + 1) % n]] {
                    if !set.contains(v) {
                        set.push(v.clone());
                    }
                }
            }
            set
        })
        .collect()
}

fn sorted_points<R: Rng>(k: usize, min: usize, max: usize, rng: &mut R) -> Vec<usize> {
    let mut points = random_ints(k, min, max, rng);
    points.sort_unstable();
    points
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Blends two real vectors gene by gene.
///
/// For each gene a weight `p` is drawn in `[0, 1)`; the offspring receive
/// `p*a + (1-p)*b` and `(1-p)*a + p*b`, so both stay inside the hyper-rectangle
/// spanned by the parents.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn cross_uniform_f64<R: Rng>(p1: &[f64], p2: &[f64], rng: &mut R) -> (Vec<f64>, Vec<f64>) {
    assert_eq!(p1.len(), p2.len(), "parents must have equal length");
    p1.iter()
        .zip(p2)
        .map(|(&a, &b)| {
            let p: f64 = rng.random();
            (p * a + (1.0 - p) * b, (1.0 - p) * a + p * b)
        })
        .unzip()
}

/// N-point crossover at fixed cut points.
///
/// Segments alternate between the parents, starting with `p1` for the first
/// offspring. `indexes` must be ascending; a cut at 0 switches immediately,
/// a cut at `len` has no effect.
pub fn gnx<T: Clone>(p1: &[T], p2: &[T], indexes: &[usize]) -> (Vec<T>, Vec<T>) {
    assert_eq!(p1.len(), p2.len(), "parents must have equal length");
    let n = p1.len();
    let mut o1 = Vec::with_capacity(n);
    let mut o2 = Vec::with_capacity(n);
    let mut swapped = false;
    let mut start = 0;
    for &cut in indexes.iter().chain(std::iter::once(&n)) {
        let cut = cut.min(n);
        if cut < start {
            continue;
        }
        let (a, b) = if swapped { (p2, p1) } else { (p1, p2) };
        o1.extend_from_slice(&a[start..cut]);
        o2.extend_from_slice(&b[start..cut]);
        start = cut;
        swapped = !swapped;
    }
    (o1, o2)
}

/// N-point crossover at `n_points` distinct random cuts in `[1, len)`.
///
/// # Panics
/// Panics if `n_points >= len`.
pub fn cross_gnx<T: Clone, R: Rng>(p1: &[T], p2: &[T], n_points: usize, rng: &mut R) -> (Vec<T>, Vec<T>) {
    assert!(n_points < p1.len(), "too many crossover points for genome length");
    let points = sorted_points(n_points, 1, p1.len(), rng);
    gnx(p1, p2, &points)
}

/// Partially Mapped Crossover between cut points `a` and `b`.
///
/// The first offspring copies `p1[a..b]` in place; every other position is
/// taken from `p2`, following the segment mapping whenever the value already
/// lies in the copied segment.
pub fn pmx<T: Clone + PartialEq>(p1: &[T], p2: &[T], a: usize, b: usize) -> (Vec<T>, Vec<T>) {
    assert_eq!(p1.len(), p2.len(), "parents must have equal length");
    (pmx_child(p1, p2, a, b), pmx_child(p2, p1, a, b))
}

fn pmx_child<T: Clone + PartialEq>(template: &[T], donor: &[T], a: usize, b: usize) -> Vec<T> {
    let segment = &template[a..b];
    let mut child = donor.to_vec();
    child[a..b].clone_from_slice(segment);
    for i in (0..a).chain(b..donor.len()) {
        let mut v = &donor[i];
        // Bounded walk: a permutation resolves within the segment length
        for _ in 0..=segment.len() {
            match search(v, segment) {
                Some(k) => v = &donor[a + k],
                None => break,
            }
        }
        child[i] = v.clone();
    }
    child
}

/// PMX at two random cut points.
pub fn cross_pmx<T: Clone + PartialEq, R: Rng>(p1: &[T], p2: &[T], rng: &mut R) -> (Vec<T>, Vec<T>) {
    if p1.len() < 2 {
        return (p1.to_vec(), p2.to_vec());
    }
    let points = sorted_points(2, 0, p1.len() + 1, rng);
    pmx(p1, p2, points[0], points[1])
}

/// Order Crossover between cut points `a` and `b`.
///
/// The first offspring copies `p1[a..b]` in place, then fills the remaining
/// positions from `b` onwards (wrapping) with the values of `p2` read from
/// `b` onwards. Values are consumed as a multiset: a value is skipped only as
/// many times as it appears in the copied segment, so genomes with repeated
/// values are handled.
pub fn ox<T: Clone + PartialEq>(p1: &[T], p2: &[T], a: usize, b: usize) -> (Vec<T>, Vec<T>) {
    assert_eq!(p1.len(), p2.len(), "parents must have equal length");
    (ox_child(p1, p2, a, b), ox_child(p2, p1, a, b))
}

fn ox_child<T: Clone + PartialEq>(template: &[T], donor: &[T], a: usize, b: usize) -> Vec<T> {
    let n = template.len();
    if n == 0 {
        return Vec::new();
    }
    let mut child = template.to_vec();
    let mut pending: Vec<T> = template[a..b].to_vec();
    let mut pos = b % n;
    for offset in 0..n {
        let v = &donor[(b + offset) % n];
        if let Some(k) = search(v, &pending) {
            pending.swap_remove(k);
            continue;
        }
        child[pos] = v.clone();
        pos = (pos + 1) % n;
    }
    child
}

/// OX at two random cut points.
pub fn cross_ox<T: Clone + PartialEq, R: Rng>(p1: &[T], p2: &[T], rng: &mut R) -> (Vec<T>, Vec<T>) {
    if p1.len() < 2 {
        return (p1.to_vec(), p2.to_vec());
    }
    let points = sorted_points(2, 0, p1.len() + 1, rng);
    ox(p1, p2, points[0], points[1])
}

/// Cycle Crossover.
///
/// Cycles are numbered in discovery order; the offspring exchange the values
/// of every odd-numbered cycle. Deterministic.
pub fn cross_cx<T: Clone + PartialEq>(p1: &[T], p2: &[T]) -> (Vec<T>, Vec<T>) {
    assert_eq!(p1.len(), p2.len(), "parents must have equal length");
    let mut o1 = p1.to_vec();
    let mut o2 = p2.to_vec();
    for cycle in get_cycles(p1, p2).iter().skip(1).step_by(2) {
        for &j in cycle {
            std::mem::swap(&mut o1[j], &mut o2[j]);
        }
    }
    (o1, o2)
}

/// Edge Recombination Crossover for permutations.
///
/// Each offspring starts from its own parent's first gene, then repeatedly
/// moves to the neighbour (in the union of both parents' adjacency) that has
/// the fewest unvisited neighbours left. Ties go to the candidate appearing
/// first in the offspring's own parent. When the current gene has no
/// neighbour left, the first unvisited gene of that parent is taken.
pub fn cross_erx<T: Clone + PartialEq>(p1: &[T], p2: &[T]) -> (Vec<T>, Vec<T>) {
    assert_eq!(p1.len(), p2.len(), "parents must have equal length");
    if p1.is_empty() {
        return (Vec::new(), Vec::new());
    }
    // Adjacency keyed by position in p1
    let n1 = get_neighbours(p1);
    let n2 = get_neighbours(p2);
    let mut adjacency = n1;
    for (i, v) in p1.iter().enumerate() {
        if let Some(j) = search(v, p2) {
            for w in &n2[j] {
                if !adjacency[i].contains(w) {
                    adjacency[i].push(w.clone());
                }
            }
        }
    }
    (erx_child(p1, p1, &adjacency), erx_child(p2, p1, &adjacency))
}

fn erx_child<T: Clone + PartialEq>(parent: &[T], keys: &[T], adjacency: &[Vec<T>]) -> Vec<T> {
    let n = parent.len();
    let mut adjacency = adjacency.to_vec();
    let mut visited = vec![false; n];
    let mut child = Vec::with_capacity(n);
    let mut current = parent[0].clone();

    loop {
        for list in adjacency.iter_mut() {
            list.retain(|w| *w != current);
        }
        if let Some(k) = search(&current, parent) {
            visited[k] = true;
        }
        let candidates = search(&current, keys).map(|k| adjacency[k].clone()).unwrap_or_default();
        child.push(current);
        if child.len() == n {
            break;
        }

        let mut next: Option<(usize, usize)> = None;
        for (k, v) in parent.iter().enumerate() {
            if visited[k] || !candidates.contains(v) {
                continue;
            }
            let degree = search(v, keys).map_or(0, |i| adjacency[i].len());
            if next.map_or(true, |(_, best)| degree < best) {
                next = Some((k, degree));
            }
        }
        let k = match next {
            Some((k, _)) => k,
            None => match visited.iter().position(|&v| !v) {
                Some(k) => k,
                None => break,
            },
        };
        current = parent[k].clone();
    }
    child
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Adds relative Gaussian noise: each gene is replaced, with probability
/// `rate`, by `x + N(0, 1) * x`.
///
/// Genes equal to zero never move.
pub fn mut_normal_f64<R: Rng>(genome: &mut [f64], rate: f64, rng: &mut R) {
    for x in genome.iter_mut() {
        if rng.random::<f64>() < rate {
            let z: f64 = rng.sample(StandardNormal);
            *x += z * *x;
        }
    }
}

/// Adds absolute Gaussian noise `N(0, std)` to each gene with probability
/// `rate`.
pub fn mut_gaussian_f64<R: Rng>(genome: &mut [f64], rate: f64, std: f64, rng: &mut R) {
    for x in genome.iter_mut() {
        if rng.random::<f64>() < rate {
            let z: f64 = rng.sample(StandardNormal);
            *x += z * std;
        }
    }
}

/// Swaps two distinct random positions, `n` times.
pub fn mut_permute<T, R: Rng>(genome: &mut [T], n: usize, rng: &mut R) {
    if genome.len() <= 1 {
        return;
    }
    for _ in 0..n {
        let points = random_ints(2, 0, genome.len(), rng);
        genome.swap(points[0], points[1]);
    }
}

/// Splits the genome at a random point in `[1, len)` and swaps the halves.
pub fn mut_splice<T, R: Rng>(genome: &mut [T], rng: &mut R) {
    if genome.len() <= 1 {
        return;
    }
    let split = rng.random_range(1..genome.len());
    genome.rotate_left(split);
}

/// Overwrites a random position with a random corpus element, `n` times.
pub fn mut_uniform<T: Clone, R: Rng>(genome: &mut [T], corpus: &[T], n: usize, rng: &mut R) {
    if genome.is_empty() || corpus.is_empty() {
        return;
    }
    for _ in 0..n {
        let element = &corpus[rng.random_range(0..corpus.len())];
        let pos = rng.random_range(0..genome.len());
        genome[pos] = element.clone();
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// `n` values drawn uniformly from `[lower, upper)`.
pub fn init_unif_f64<R: Rng>(n: usize, lower: f64, upper: f64, rng: &mut R) -> Vec<f64> {
    (0..n).map(|_| lower + rng.random::<f64>() * (upper - lower)).collect()
}

/// `n` values drawn from `N(mean, std)`.
pub fn init_norm_f64<R: Rng>(n: usize, mean: f64, std: f64, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let z: f64 = rng.sample(StandardNormal);
            mean + z * std
        })
        .collect()
}

/// `n` elements drawn from `corpus` with replacement.
///
/// # Panics
/// Panics if `corpus` is empty and `n > 0`.
pub fn init_unif<T: Clone, R: Rng>(n: usize, corpus: &[T], rng: &mut R) -> Vec<T> {
    (0..n).map(|_| corpus[rng.random_range(0..corpus.len())].clone()).collect()
}

/// `n` distinct corpus positions in random order.
///
/// # Panics
/// Panics if `n > corpus.len()`.
pub fn init_unique<T: Clone, R: Rng>(n: usize, corpus: &[T], rng: &mut R) -> Vec<T> {
    assert!(n <= corpus.len(), "cannot pick {n} unique elements from a corpus of {}", corpus.len());
    let mut idxs = random_ints(n, 0, corpus.len(), rng);
    idxs.shuffle(rng);
    idxs.into_iter().map(|i| corpus[i].clone()).collect()
}

// ============================================================================
// Tests
// ============================================================================
