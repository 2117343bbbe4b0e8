//! Particle Swarm Optimization (PSO).
//!
//! SPSO-2011 on top of the GA engine: each particle is a genome whose
//! mutation is one velocity/position update, guided by its own best position
//! and the best position of the whole swarm.
//!
//! # References
//!
//! - Clerc (2012), "Standard Particle Swarm Optimisation From 2006 to 2011"
//! - Zambrano-Bigiarini, Clerc & Rojas (2013), "Standard Particle Swarm
//!   Optimisation 2011 at CEC-2013: A baseline for future PSO improvements"

mod config;
mod runner;
mod types;

pub use config::PsoConfig;
pub use runner::PsoRunner;
pub use types::Particle;
