//! Generation-transition strategies.
//!
//! A [`Model`] advances one population by one generation. Every model keeps
//! the population size unchanged at the boundary of [`Model::apply`] and only
//! uses the population's own RNG. Models that need fitness values to decide
//! (steady state with `keep_best`, down-to-size, ring, annealing, mutate-each)
//! evaluate inside `apply`; otherwise the orchestrator evaluates afterwards.

use super::population::{mutate_individuals, Population};
use super::selection::Selector;
use super::types::{Genome, Individual};
use crate::error::GaError;
use rand::Rng;

/// A strategy advancing one population by one generation.
pub trait Model<G: Genome>: Send + Sync {
    /// Replaces the population's individuals with the next generation.
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError>;

    /// Checks the parameters. Called once when the GA is built.
    fn validate(&self) -> Result<(), GaError>;
}

/// Repeatedly selects two parents and recombines them (with probability
/// `cross_rate`, otherwise the parents are copied) until `n` offspring exist.
///
/// For odd `n` the second child of the last pair is dropped.
pub fn generate_offspring<G: Genome, R: Rng>(
    n: usize,
    indis: &[Individual<G>],
    selector: &Selector,
    cross_rate: f64,
    rng: &mut R,
) -> Result<Vec<Individual<G>>, GaError> {
    let mut offspring = Vec::with_capacity(n);
    while offspring.len() < n {
        let (mut selected, _) = selector.apply(2, indis, rng)?;
        if rng.random::<f64>() < cross_rate {
            let (o1, o2) = selected[0].crossover(&selected[1], rng);
            selected = vec![o1, o2];
        }
        for child in selected {
            if offspring.len() < n {
                offspring.push(child);
            }
        }
    }
    Ok(offspring)
}

fn check_rate(name: &str, rate: f64) -> Result<(), GaError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(GaError::config(format!("{name} should be between 0 and 1, got {rate}")))
    }
}

fn check_count(name: &str, count: usize) -> Result<(), GaError> {
    if count == 0 {
        Err(GaError::config(format!("{name} should be at least 1")))
    } else {
        Ok(())
    }
}

// ============================================================================
// Generational
// ============================================================================

/// Replaces the whole population with offspring of selected parents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModGenerational {
    pub selector: Selector,
    pub mut_rate: f64,
    pub cross_rate: f64,
}

impl<G: Genome> Model<G> for ModGenerational {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let n = pop.individuals.len();
        let mut offspring = generate_offspring(n, &pop.individuals, &self.selector, self.cross_rate, &mut pop.rng)?;
        if self.mut_rate > 0.0 {
            mutate_individuals(&mut offspring, self.mut_rate, &mut pop.rng);
        }
        pop.individuals = offspring;
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        self.selector.validate()?;
        check_rate("mut_rate", self.mut_rate)?;
        check_rate("cross_rate", self.cross_rate)
    }
}

// ============================================================================
// Steady state
// ============================================================================

/// Replaces two selected parents per generation.
///
/// With `keep_best` the two slots receive the best two of parents and
/// offspring; otherwise the offspring always take the slots.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModSteadyState {
    pub selector: Selector,
    pub keep_best: bool,
    pub mut_rate: f64,
    pub cross_rate: f64,
}

impl<G: Genome> Model<G> for ModSteadyState {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let rng = &mut pop.rng;
        let (selected, idxs) = self.selector.apply(2, &pop.individuals, rng)?;
        let mut offspring = if rng.random::<f64>() < self.cross_rate {
            let (o1, o2) = selected[0].crossover(&selected[1], rng);
            vec![o1, o2]
        } else {
            selected.clone()
        };
        if self.mut_rate > 0.0 {
            mutate_individuals(&mut offspring, self.mut_rate, rng);
        }

        let replacements = if self.keep_best {
            let mut pool = selected;
            pool.extend(offspring);
            for p in pool.iter_mut() {
                p.evaluate()?;
            }
            super::population::sort_by_fitness(&mut pool);
            pool.truncate(2);
            pool
        } else {
            offspring
        };
        for (slot, indi) in idxs.into_iter().zip(replacements) {
            pop.individuals[slot] = indi;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        self.selector.validate()?;
        check_rate("mut_rate", self.mut_rate)?;
        check_rate("cross_rate", self.cross_rate)
    }
}

// ============================================================================
// Down to size
// ============================================================================

/// Grows the population with `n_offsprings` evaluated offspring, then lets
/// `selector_b` pick the survivors back down to the original size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModDownToSize {
    pub n_offsprings: usize,
    pub selector_a: Selector,
    pub selector_b: Selector,
    pub mut_rate: f64,
    pub cross_rate: f64,
}

impl<G: Genome> Model<G> for ModDownToSize {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let size = pop.individuals.len();
        let mut merged = generate_offspring(
            self.n_offsprings,
            &pop.individuals,
            &self.selector_a,
            self.cross_rate,
            &mut pop.rng,
        )?;
        if self.mut_rate > 0.0 {
            mutate_individuals(&mut merged, self.mut_rate, &mut pop.rng);
        }
        for o in merged.iter_mut() {
            o.evaluate()?;
        }
        merged.extend(pop.individuals.iter().cloned());
        let (survivors, _) = self.selector_b.apply(size, &merged, &mut pop.rng)?;
        pop.individuals = survivors;
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        check_count("n_offsprings", self.n_offsprings)?;
        self.selector_a.validate()?;
        self.selector_b.validate()?;
        check_rate("mut_rate", self.mut_rate)?;
        check_rate("cross_rate", self.cross_rate)
    }
}

// ============================================================================
// Ring
// ============================================================================

/// Crosses each individual with its ring neighbour and keeps one of
/// {original, offspring 1, offspring 2} through a 1-of-3 selection.
///
/// The neighbour of slot `i` is slot `i % n`, which is `i` itself: every
/// individual is recombined with a copy of itself. Mutation is what
/// introduces variation.
///
/// The selector sees three candidates, so a tournament must hold at most 3
/// contestants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModRing {
    pub selector: Selector,
    pub mut_rate: f64,
    pub cross_rate: f64,
}

impl<G: Genome> Model<G> for ModRing {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let n = pop.individuals.len();
        let rng = &mut pop.rng;
        for i in 0..n {
            let neighbour = i % n;
            let original = &pop.individuals[i];
            let mate = &pop.individuals[neighbour];
            let (mut o1, mut o2) = if rng.random::<f64>() < self.cross_rate {
                original.crossover(mate, rng)
            } else {
                (original.clone(), mate.clone())
            };
            if rng.random::<f64>() < self.mut_rate {
                o1.mutate(rng);
            }
            if rng.random::<f64>() < self.mut_rate {
                o2.mutate(rng);
            }
            o1.evaluate()?;
            o2.evaluate()?;
            let mut candidates = vec![pop.individuals[i].clone(), o1, o2];
            candidates[0].evaluate()?;
            let (mut selected, _) = self.selector.apply(1, &candidates, rng)?;
            if let Some(winner) = selected.pop() {
                pop.individuals[i] = winner;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        self.selector.validate()?;
        if let Selector::Tournament(k) = self.selector {
            if k > 3 {
                return Err(GaError::config("ring selection picks among 3 candidates, tournament size must be at most 3"));
            }
        }
        check_rate("mut_rate", self.mut_rate)?;
        check_rate("cross_rate", self.cross_rate)
    }
}

// ============================================================================
// Simulated annealing
// ============================================================================

/// Runs a whole annealing schedule on every call.
///
/// Starting at temperature `t`, each pass replaces every individual by a
/// mutated clone when the clone is better, or with probability
/// `exp((current - neighbour) / T)` otherwise. `T` is multiplied by `alpha`
/// after each pass until it drops to `t_min`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModSimulatedAnnealing {
    pub t: f64,
    pub t_min: f64,
    pub alpha: f64,
}

impl<G: Genome> Model<G> for ModSimulatedAnnealing {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let rng = &mut pop.rng;
        for indi in pop.individuals.iter_mut() {
            indi.evaluate()?;
        }
        let mut t = self.t;
        while t > self.t_min {
            for indi in pop.individuals.iter_mut() {
                let mut neighbour = indi.clone();
                neighbour.mutate(rng);
                neighbour.evaluate()?;
                let accept = neighbour.fitness < indi.fitness
                    || rng.random::<f64>() < ((indi.fitness - neighbour.fitness) / t).exp();
                if accept {
                    *indi = neighbour;
                }
            }
            t *= self.alpha;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        if self.t.is_nan() || self.t <= 0.0 {
            return Err(GaError::config("t should be positive"));
        }
        if self.t_min.is_nan() || self.t_min <= 0.0 || self.t_min >= self.t {
            return Err(GaError::config("t_min should be in (0, t)"));
        }
        if self.alpha.is_nan() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(GaError::config("alpha should be in (0, 1)"));
        }
        Ok(())
    }
}

// ============================================================================
// Mutation only
// ============================================================================

/// Breeds by mutation alone.
///
/// `n_parents` parents are selected; each one yields `n_offsprings` mutated
/// clones, preceded by the parent itself when `keep_parents` is set. The
/// produced sequence overwrites the population front to back: surplus is
/// discarded and slots beyond the produced count keep their occupant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModMutationOnly {
    pub selector: Selector,
    pub n_parents: usize,
    pub n_offsprings: usize,
    pub keep_parents: bool,
}

impl<G: Genome> Model<G> for ModMutationOnly {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let size = pop.individuals.len();
        let rng = &mut pop.rng;
        let (parents, _) = self.selector.apply(self.n_parents, &pop.individuals, rng)?;
        let mut produced = Vec::with_capacity(self.n_parents * (self.n_offsprings + 1));
        for parent in parents {
            for _ in 0..self.n_offsprings {
                let mut child = parent.clone();
                child.mutate(rng);
                produced.push(child);
            }
            if self.keep_parents {
                // Parent goes first within its block
                let at = produced.len() - self.n_offsprings;
                produced.insert(at, parent);
            }
        }
        for (slot, indi) in pop.individuals.iter_mut().zip(produced).take(size) {
            *slot = indi;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        self.selector.validate()?;
        check_count("n_parents", self.n_parents)?;
        check_count("n_offsprings", self.n_offsprings)
    }
}

// ============================================================================
// Mutate each
// ============================================================================

/// Mutates a clone of every individual and keeps it in place of its parent.
///
/// With `strict` the mutant only replaces a parent it strictly improves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModMutateEach {
    pub strict: bool,
}

impl<G: Genome> Model<G> for ModMutateEach {
    fn apply(&self, pop: &mut Population<G>) -> Result<(), GaError> {
        let rng = &mut pop.rng;
        for indi in pop.individuals.iter_mut() {
            let mut mutant = indi.clone();
            mutant.mutate(rng);
            mutant.evaluate()?;
            if !self.strict {
                *indi = mutant;
                continue;
            }
            indi.evaluate()?;
            if mutant.fitness < indi.fitness {
                *indi = mutant;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        Ok(())
    }
}
