//! Island-model evolutionary optimization engine.
//!
//! Provides a generic genetic-algorithm core and a few optimizers built on
//! top of it:
//!
//! - **Genetic Algorithm (GA)**: islands of individuals advanced in parallel
//!   by pluggable generation models, with ring migration, speciation and a
//!   hall of fame. The user implements only the [`ga::Genome`] contract.
//! - **Differential Evolution (DE)**: real-valued minimization where agents
//!   move along the difference of two other agents.
//! - **Particle Swarm Optimization (PSO)**: SPSO-2011 style swarm.
//! - **OpenAI Evolution Strategy (OES)**: a search distribution whose centre
//!   follows the fitness-weighted sampling noise.
//!
//! # Architecture
//!
//! Everything runs on the [`ga::Ga`] loop. The presets only define a genome
//! and a model over it, so they inherit island parallelism, seeding and
//! logging from the engine. Fitness is always minimized.

pub mod de;
pub mod error;
pub mod ga;
pub mod oes;
pub mod pso;
pub mod random;

pub use error::{EvalError, GaError};
