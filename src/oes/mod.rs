//! OpenAI Evolution Strategy (OES).
//!
//! A Gaussian search distribution of fixed spread `sigma` is sampled around
//! a centre `mu`. After every generation the fitnesses are standardized and
//! `mu` steps against the fitness-weighted sampling noise, an estimate of the
//! gradient of the smoothed objective.
//!
//! # References
//!
//! - Salimans, Ho, Chen, Sidor & Sutskever (2017), "Evolution Strategies as a
//!   Scalable Alternative to Reinforcement Learning", arXiv:1703.03864

mod config;
mod runner;
mod types;

pub use config::OesConfig;
pub use runner::OesRunner;
pub use types::Point;
