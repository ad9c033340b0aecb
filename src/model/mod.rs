//! Collapsed Gibbs sampling for LDA
//!
//! This module provides:
//! - `ModelDefinition` and `Concentration`: model shape and Dirichlet priors
//! - `SamplerState`: topic assignments and count tables
//! - `GibbsUpdater`: the single-token conditional update
//! - `Runner`: full-corpus sweeps
//! - estimator methods on `SamplerState`: distributions, perplexity,
//!   likelihood and held-out inference
//!
//! Randomness is always an explicit `Rng` argument; a run seeded with
//! `seeded_rng` and driven by the same sequence of calls is bit-identical.

pub mod definition;
pub mod estimator;
pub mod runner;
pub mod state;
pub mod updater;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub use definition::{Concentration, ModelDefinition};
pub use estimator::TopicSummary;
pub use runner::{Runner, SweepRecord};
pub use state::SamplerState;
pub use updater::{sample_categorical, GibbsUpdater};

/// Deterministic random source for a seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
