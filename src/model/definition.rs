//! Model definition and Dirichlet concentration parameters

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::{LdaError, Result};

/// Dirichlet concentration: one shared value or one value per index.
///
/// `alpha` is indexed by topic, `beta` by term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Concentration {
    /// Same value for every index
    Symmetric(f64),
    /// Explicit value for every index
    PerIndex(Vec<f64>),
}

impl Concentration {
    /// Concentration at index `i`
    #[inline]
    pub fn at(&self, i: usize) -> f64 {
        match self {
            Concentration::Symmetric(value) => *value,
            Concentration::PerIndex(values) => values[i],
        }
    }

    /// Sum of the concentration over `len` indices
    pub fn total(&self, len: usize) -> f64 {
        match self {
            Concentration::Symmetric(value) => value * len as f64,
            Concentration::PerIndex(values) => values.iter().sum(),
        }
    }

    /// Dense vector of `len` values
    pub fn to_vec(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.at(i)).collect()
    }

    /// Check positivity, finiteness and length against `len` indices
    pub fn validate(&self, name: &str, len: usize) -> Result<()> {
        match self {
            Concentration::Symmetric(value) => {
                if !(value.is_finite() && *value > 0.0) {
                    return Err(LdaError::invalid(format!(
                        "{name} must be positive and finite, got {value}"
                    )));
                }
            }
            Concentration::PerIndex(values) => {
                if values.len() != len {
                    return Err(LdaError::invalid(format!(
                        "{name} has {} values, expected {len}",
                        values.len()
                    )));
                }
                if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
                    return Err(LdaError::invalid(format!(
                        "{name} must be positive and finite, got {bad}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl From<f64> for Concentration {
    fn from(value: f64) -> Self {
        Concentration::Symmetric(value)
    }
}

impl From<Vec<f64>> for Concentration {
    fn from(values: Vec<f64>) -> Self {
        Concentration::PerIndex(values)
    }
}

/// Shape and hyperparameters of an LDA model.
///
/// Fixed for the lifetime of a run; inference never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Number of documents N
    pub n_docs: usize,
    /// Vocabulary size V
    pub n_terms: usize,
    /// Number of topics K
    pub n_topics: usize,
    /// Document-topic prior
    pub alpha: Concentration,
    /// Topic-term prior
    pub beta: Concentration,
}

impl ModelDefinition {
    /// Create a definition for `n_docs` documents over `n_terms` terms.
    ///
    /// Defaults to 10 topics, alpha = 0.1 and beta = 0.01.
    pub fn new(n_docs: usize, n_terms: usize) -> Result<Self> {
        if n_docs == 0 {
            return Err(LdaError::invalid("no documents"));
        }
        if n_terms == 0 {
            return Err(LdaError::invalid("no terms"));
        }
        Ok(Self {
            n_docs,
            n_terms,
            n_topics: 10,
            alpha: Concentration::Symmetric(0.1),
            beta: Concentration::Symmetric(0.01),
        })
    }

    /// Create a definition sized for a corpus
    pub fn for_corpus(corpus: &Corpus) -> Result<Self> {
        Self::new(corpus.num_documents(), corpus.num_terms())
    }

    /// Set number of topics
    pub fn n_topics(mut self, n_topics: usize) -> Self {
        self.n_topics = n_topics;
        self
    }

    /// Set alpha (document-topic prior)
    pub fn alpha(mut self, alpha: impl Into<Concentration>) -> Self {
        self.alpha = alpha.into();
        self
    }

    /// Set beta (topic-term prior)
    pub fn beta(mut self, beta: impl Into<Concentration>) -> Self {
        self.beta = beta.into();
        self
    }

    /// Check all parameters
    pub fn validate(&self) -> Result<()> {
        if self.n_docs == 0 {
            return Err(LdaError::invalid("no documents"));
        }
        if self.n_terms == 0 {
            return Err(LdaError::invalid("no terms"));
        }
        if self.n_topics == 0 {
            return Err(LdaError::invalid("number of topics must be positive"));
        }
        self.alpha.validate("alpha", self.n_topics)?;
        self.beta.validate("beta", self.n_terms)?;
        Ok(())
    }

    /// Check that a corpus fits this definition
    pub fn check_corpus(&self, corpus: &Corpus) -> Result<()> {
        if corpus.num_documents() != self.n_docs {
            return Err(LdaError::invalid(format!(
                "definition expects {} documents, corpus has {}",
                self.n_docs,
                corpus.num_documents()
            )));
        }
        if corpus.num_terms() > self.n_terms {
            return Err(LdaError::invalid(format!(
                "definition expects {} terms, corpus uses {}",
                self.n_terms,
                corpus.num_terms()
            )));
        }
        Ok(())
    }
}
