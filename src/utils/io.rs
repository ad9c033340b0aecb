//! I/O Utilities
//!
//! JSON persistence for fitted-model reports and sampler checkpoints.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::evaluation::ModelSummary;
use crate::corpus::{Corpus, Vocabulary};
use crate::error::Result;
use crate::model::{ModelDefinition, SamplerState, SweepRecord, TopicSummary};

/// Save data to JSON file
pub fn save_json<T: Serialize, P: AsRef<Path>>(data: &T, path: P) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, data)?;
    Ok(())
}

/// Load data from JSON file
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let data = serde_json::from_reader(reader)?;
    Ok(data)
}

/// Everything a fitted model exposes, in serializable form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    pub n_docs: usize,
    pub n_terms: usize,
    pub n_topics: usize,
    pub sweeps: usize,
    pub perplexity: f64,
    pub log_likelihood: f64,
    /// N x K document-topic mixtures
    pub document_distribution: Vec<Vec<f64>>,
    /// K x V topic-word distributions
    pub word_distribution: Vec<Vec<f64>>,
    pub topics: Vec<TopicSummary>,
    pub dominant_topics: Vec<usize>,
    pub summary: ModelSummary,
    #[serde(default)]
    pub history: Vec<SweepRecord>,
}

impl ModelReport {
    pub fn new(
        state: &SamplerState,
        corpus: &Corpus,
        vocabulary: Option<&Vocabulary>,
        top_terms: usize,
    ) -> Self {
        let rows = |a: ndarray::Array2<f64>| -> Vec<Vec<f64>> {
            a.outer_iter().map(|row| row.to_vec()).collect()
        };

        Self {
            n_docs: state.num_documents(),
            n_terms: state.num_terms(),
            n_topics: state.num_topics(),
            sweeps: state.sweeps(),
            perplexity: state.perplexity(),
            log_likelihood: state.log_likelihood(),
            document_distribution: rows(state.document_distribution()),
            word_distribution: rows(state.word_distribution()),
            topics: state.topics(top_terms, vocabulary),
            dominant_topics: state.dominant_topics(),
            summary: ModelSummary::from_state(state, corpus, top_terms),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: &[SweepRecord]) -> Self {
        self.history = history.to_vec();
        self
    }
}

/// Resumable snapshot of a sampler.
///
/// The RNG stream is not stored: a resumed run is a valid chain but does
/// not reproduce the uninterrupted one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub definition: ModelDefinition,
    pub sweeps: usize,
    pub assignments: Vec<Vec<usize>>,
}

impl Checkpoint {
    pub fn capture(definition: &ModelDefinition, state: &SamplerState) -> Self {
        Self {
            definition: definition.clone(),
            sweeps: state.sweeps(),
            assignments: state.assignments().to_vec(),
        }
    }

    /// Rebuild the sampler state for `corpus`
    pub fn restore(&self, corpus: &Corpus) -> Result<SamplerState> {
        let mut state =
            SamplerState::from_assignments(&self.definition, corpus, self.assignments.clone())?;
        state.set_sweeps(self.sweeps);
        info!(sweeps = self.sweeps, "restored sampler checkpoint");
        Ok(state)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }
}
