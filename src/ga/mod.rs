//! Island-model genetic algorithm engine.
//!
//! Users describe a candidate solution by implementing [`Genome`]; the engine
//! wraps genomes into [`Individual`]s, groups them into islands
//! ([`Population`]) and advances every island one generation at a time with a
//! pluggable [`Model`].
//!
//! # Core Traits
//!
//! - [`Genome`]: evaluate, mutate, crossover
//! - [`Model`]: generation-transition strategy
//! - [`Migrator`]: exchange between islands
//! - [`Speciator`]: partition of an island into species
//!
//! # Key Types
//!
//! - [`GaConfig`]: island count and size, model, migration, speciation, hooks
//! - [`Ga`]: owns the islands and the hall of fame, runs the loop
//! - [`Selector`]: tournament, elitism, roulette
//!
//! # Submodules
//!
//! - [`operators`]: crossover, mutation and initialization primitives for
//!   float vectors and permutations
//! - [`distance`]: memoized metric and medoid utilities
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Whitley, Rana & Heckendorn (1999), *The Island Model Genetic Algorithm*
//! - Kaufman & Rousseeuw (1987), *Clustering by means of Medoids*
//! - Whitley et al. (1989), *Scheduling Problems and Traveling Salesmen: The
//!   Genetic Edge Recombination Operator*

mod config;
pub mod distance;
mod migration;
mod models;
pub mod operators;
mod population;
mod runner;
mod selection;
mod speciation;
mod types;

#[cfg(test)]
mod testing;

pub use config::{Callback, EarlyStop, GaConfig};
pub use distance::{DistanceMemoizer, Metric};
pub use migration::{MigRing, Migrator};
pub use models::{
    generate_offspring, Model, ModDownToSize, ModGenerational, ModMutateEach, ModMutationOnly, ModRing,
    ModSimulatedAnnealing, ModSteadyState,
};
pub use population::{
    evaluate_individuals, fit_avg, fit_max, fit_min, fit_std, is_sorted_by_fitness, mutate_individuals,
    sort_by_fitness, Population,
};
pub use runner::{Ga, GaState};
pub use selection::Selector;
pub use speciation::{SpecFitnessInterval, SpecKMedoids, Speciator};
pub use types::{Genome, Individual};
