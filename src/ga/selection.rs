//! Selection strategies.
//!
//! A [`Selector`] samples `n` individuals from a population and reports
//! where each one came from, so models can write offspring back into the
//! sampled slots.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::{Genome, Individual};
use crate::error::GaError;
use crate::random::random_ints;
use rand::Rng;
use std::cmp::Ordering;

/// Selection strategy.
///
/// All strategies assume **minimization** (lower fitness = better).
///
/// # Examples
///
/// ```
/// use u_evolve::ga::Selector;
///
/// // Tournament with 3 contestants (moderate selection pressure)
/// let sel = Selector::Tournament(3);
/// assert!(sel.validate().is_ok());
///
/// assert!(Selector::Tournament(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selector {
    /// Draw `k` distinct individuals uniformly, keep the fittest; repeated
    /// `n` times (winners may repeat across rounds).
    ///
    /// Ties go to the contestant drawn first. `k` larger than the
    /// population is an [`GaError::Invariant`].
    ///
    /// # Complexity
    /// O(population) per round (reservoir sampling)
    Tournament(usize),

    /// The `n` best individuals.
    ///
    /// Individuals are ordered by a stable fitness sort first, so an
    /// already sorted population yields indexes `0..n`. Asking for more
    /// individuals than exist is an [`GaError::Invariant`].
    Elitism,

    /// Fitness-proportionate wheel for minimization.
    ///
    /// Slot weights are `max_fitness - f_i + 1`, so the worst individual
    /// keeps a small chance. Non-finite fitnesses get weight 0 and do not
    /// count towards `max_fitness`; if no slot has weight, draws are uniform.
    ///
    /// # Complexity
    /// O(population) per draw
    Roulette,
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Tournament(3)
    }
}

impl Selector {
    /// Selects `n` individuals from `indis`.
    ///
    /// Returns clones of the chosen individuals and their indexes in `indis`.
    pub fn apply<G: Genome, R: Rng>(
        &self,
        n: usize,
        indis: &[Individual<G>],
        rng: &mut R,
    ) -> Result<(Vec<Individual<G>>, Vec<usize>), GaError> {
        let idxs = match self {
            Selector::Tournament(k) => tournament(n, *k, indis, rng)?,
            Selector::Elitism => elitism(n, indis)?,
            Selector::Roulette => roulette(n, indis, rng)?,
        };
        let selected = idxs.iter().map(|&i| indis[i].clone()).collect();
        Ok((selected, idxs))
    }

    /// Checks the strategy parameters.
    pub fn validate(&self) -> Result<(), GaError> {
        match self {
            Selector::Tournament(0) => Err(GaError::config("tournament size must be at least 1")),
            _ => Ok(()),
        }
    }
}

fn tournament<G, R: Rng>(n: usize, k: usize, indis: &[Individual<G>], rng: &mut R) -> Result<Vec<usize>, GaError> {
    if k > indis.len() {
        return Err(GaError::invariant(format!(
            "tournament of {k} contestants in a population of {}",
            indis.len()
        )));
    }
    if k == 0 {
        return Err(GaError::invariant("tournament needs at least one contestant"));
    }
    let mut winners = Vec::with_capacity(n);
    for _ in 0..n {
        let contestants = random_ints(k, 0, indis.len(), rng);
        let mut best = contestants[0];
        for &c in &contestants[1..] {
            if indis[c].fitness < indis[best].fitness {
                best = c;
            }
        }
        winners.push(best);
    }
    Ok(winners)
}

fn elitism<G>(n: usize, indis: &[Individual<G>]) -> Result<Vec<usize>, GaError> {
    if n > indis.len() {
        return Err(GaError::invariant(format!(
            "cannot select {n} elites from {} individuals",
            indis.len()
        )));
    }
    let mut order: Vec<usize> = (0..indis.len()).collect();
    order.sort_by(|&a, &b| {
        indis[a]
            .fitness
            .partial_cmp(&indis[b].fitness)
            .unwrap_or(Ordering::Equal)
    });
    order.truncate(n);
    Ok(order)
}

fn roulette<G, R: Rng>(n: usize, indis: &[Individual<G>], rng: &mut R) -> Result<Vec<usize>, GaError> {
    if indis.is_empty() {
        return if n == 0 {
            Ok(Vec::new())
        } else {
            Err(GaError::invariant("cannot spin a roulette over no individuals"))
        };
    }
    let max = indis
        .iter()
        .map(|i| i.fitness)
        .filter(|f| f.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = indis
        .iter()
        .map(|i| if i.fitness.is_finite() { max - i.fitness + 1.0 } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Ok((0..n).map(|_| rng.random_range(0..indis.len())).collect());
    }
    let wheel: Vec<f64> = weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w / total;
            Some(*acc)
        })
        .collect();

    let last = indis.len() - 1;
    Ok((0..n)
        .map(|_| {
            let u: f64 = rng.random();
            wheel.iter().position(|&c| c >= u).unwrap_or(last).min(last)
        })
        .collect())
}
