//! # Craftline Solver
//!
//! Decides, for every recipe in a catalog, how many times it can be crafted
//! from a player's inventory right now.
//!
//! This crate provides:
//! - Ingredient availability with HQ/NQ substitution rules
//! - Per-recipe evaluation into craftability records
//! - One-level intermediate-craft resolution with candidate scoring
//! - A fingerprint-keyed, bounded craftability cache
//! - The solve orchestrator with parallel fan-out and cancellation
//! - An event bus for solve and invalidation notifications

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod availability;
pub mod cache;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod inventory;
pub mod jobs;
pub mod metrics;
pub mod options;
pub mod outcome;
pub mod recipe;
pub mod resolver;
pub mod solver;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::availability::*;
    pub use crate::cache::*;
    pub use crate::cancel::*;
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::inventory::*;
    pub use crate::jobs::*;
    pub use crate::metrics::*;
    pub use crate::options::*;
    pub use crate::outcome::*;
    pub use crate::recipe::*;
    pub use crate::resolver::*;
    pub use crate::solver::*;
}
