//! # LDA Sampler
//!
//! Latent Dirichlet Allocation fitted by collapsed Gibbs sampling.
//!
//! ## Modules
//!
//! - `corpus` - Documents, LDA-C files, vocabularies and synthetic corpora
//! - `model` - Model definition, sampler state, Gibbs updates and estimates
//! - `utils` - Configuration, logging, evaluation and persistence
//!
//! ## Example
//!
//! ```rust
//! use lda_sampler::{seeded_rng, Corpus, ModelDefinition, Runner, SamplerState};
//!
//! let corpus = Corpus::new(vec![vec![0, 1, 2, 0], vec![3, 4, 3], vec![0, 2, 4]]);
//! let definition = ModelDefinition::for_corpus(&corpus)
//!     .unwrap()
//!     .n_topics(2)
//!     .alpha(0.1)
//!     .beta(0.01);
//!
//! let mut rng = seeded_rng(12345);
//! let mut state = SamplerState::initialize(&definition, &corpus, &mut rng).unwrap();
//! Runner::new(&definition, &corpus, &mut state)
//!     .unwrap()
//!     .run(&mut rng, 50);
//!
//! let theta = state.document_distribution();
//! assert_eq!(theta.dim(), (3, 2));
//! assert!(state.perplexity().is_finite());
//! ```

pub mod corpus;
pub mod error;
pub mod model;
pub mod utils;

pub use corpus::{Corpus, Document, Vocabulary};
pub use error::{LdaError, Result};
pub use model::{
    seeded_rng, Concentration, GibbsUpdater, ModelDefinition, Runner, SamplerState, SweepRecord,
    TopicSummary,
};
pub use utils::{setup_logging, Config};
