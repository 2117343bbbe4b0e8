//! Differential Evolution (DE).
//!
//! Real-valued minimization on top of the GA engine. Every agent is moved to
//! `a + w (b - c)` on a random subset of dimensions, where `a`, `b`, `c` are
//! three distinct agents of the previous generation, and the move is kept
//! only when it improves the agent.
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution – A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces",
//!   *J. Global Optimization* 11(4), 341–359

mod config;
mod runner;
mod types;

pub use config::DeConfig;
pub use runner::DeRunner;
pub use types::Agent;
