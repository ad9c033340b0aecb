//! Synthetic corpora drawn from the LDA generative process
//!
//! Topic-word distributions are drawn from Dir(beta), each document's
//! topic mixture from Dir(alpha), and every token by first drawing a topic
//! from the mixture and then a term from that topic. Useful for tests,
//! benchmarks and for checking that the sampler recovers known structure.

use ndarray::Array2;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_distr::Dirichlet;
use serde::{Deserialize, Serialize};

use super::Corpus;
use crate::error::{LdaError, Result};

const MAX_SIMPLEX_DRAWS: usize = 16;

/// Parameters of the generative process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of documents
    pub n_documents: usize,
    /// Vocabulary size
    pub n_terms: usize,
    /// Number of topics
    pub n_topics: usize,
    /// Tokens per document
    pub doc_length: usize,
    /// Document-topic concentration
    pub alpha: f64,
    /// Topic-term concentration
    pub beta: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_documents: 100,
            n_terms: 50,
            n_topics: 5,
            doc_length: 50,
            alpha: 0.1,
            beta: 0.05,
        }
    }
}

/// A generated corpus together with the parameters that produced it
#[derive(Debug, Clone)]
pub struct SyntheticCorpus {
    /// The generated documents
    pub corpus: Corpus,
    /// True document-topic mixtures (`n_documents` x `n_topics`)
    pub doc_topic: Array2<f64>,
    /// True topic-term distributions (`n_topics` x `n_terms`)
    pub topic_word: Array2<f64>,
    /// True topic of every token
    pub assignments: Vec<Vec<usize>>,
}

/// Generate a corpus from the LDA generative process
pub fn generate<R: Rng + ?Sized>(config: &SyntheticConfig, rng: &mut R) -> Result<SyntheticCorpus> {
    if config.n_topics < 2 || config.n_terms < 2 {
        return Err(LdaError::invalid(
            "synthetic corpus needs at least 2 topics and 2 terms",
        ));
    }
    if config.n_documents == 0 {
        return Err(LdaError::invalid("synthetic corpus needs at least 1 document"));
    }

    let topic_prior = Dirichlet::new_with_size(config.beta, config.n_terms)
        .map_err(|e| LdaError::invalid(format!("invalid beta {}: {:?}", config.beta, e)))?;
    let doc_prior = Dirichlet::new_with_size(config.alpha, config.n_topics)
        .map_err(|e| LdaError::invalid(format!("invalid alpha {}: {:?}", config.alpha, e)))?;

    let mut topic_word = Array2::zeros((config.n_topics, config.n_terms));
    let mut term_samplers = Vec::with_capacity(config.n_topics);
    for k in 0..config.n_topics {
        let phi = draw_simplex(&topic_prior, rng)?;
        for (w, &p) in phi.iter().enumerate() {
            topic_word[[k, w]] = p;
        }
        term_samplers.push(weighted(&phi)?);
    }

    let mut doc_topic = Array2::zeros((config.n_documents, config.n_topics));
    let mut documents = Vec::with_capacity(config.n_documents);
    let mut assignments = Vec::with_capacity(config.n_documents);

    for d in 0..config.n_documents {
        let theta = draw_simplex(&doc_prior, rng)?;
        for (k, &p) in theta.iter().enumerate() {
            doc_topic[[d, k]] = p;
        }
        let topic_sampler = weighted(&theta)?;

        let mut tokens = Vec::with_capacity(config.doc_length);
        let mut topics = Vec::with_capacity(config.doc_length);
        for _ in 0..config.doc_length {
            let k = topic_sampler.sample(rng);
            tokens.push(term_samplers[k].sample(rng));
            topics.push(k);
        }
        documents.push(tokens);
        assignments.push(topics);
    }

    Ok(SyntheticCorpus {
        corpus: Corpus::with_num_terms(documents, config.n_terms)?,
        doc_topic,
        topic_word,
        assignments,
    })
}

/// Draw from a Dirichlet, redrawing when very small concentrations
/// underflow to a degenerate vector
fn draw_simplex<R: Rng + ?Sized>(prior: &Dirichlet<f64>, rng: &mut R) -> Result<Vec<f64>> {
    for _ in 0..MAX_SIMPLEX_DRAWS {
        let sample = prior.sample(rng);
        let total: f64 = sample.iter().sum();
        if total > 0.0 && sample.iter().all(|p| p.is_finite()) {
            return Ok(sample);
        }
    }
    Err(LdaError::invalid(
        "concentration too small: Dirichlet draws underflow",
    ))
}

fn weighted(probs: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(probs).map_err(|e| LdaError::invalid(format!("invalid weights: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_shapes() {
        let config = SyntheticConfig {
            n_documents: 20,
            n_terms: 30,
            n_topics: 3,
            doc_length: 15,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let synthetic = generate(&config, &mut rng).unwrap();

        assert_eq!(synthetic.corpus.num_documents(), 20);
        assert_eq!(synthetic.corpus.num_terms(), 30);
        assert_eq!(synthetic.corpus.total_tokens(), 300);
        assert_eq!(synthetic.doc_topic.dim(), (20, 3));
        assert_eq!(synthetic.topic_word.dim(), (3, 30));

        for row in synthetic.topic_word.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
        assert!(synthetic
            .assignments
            .iter()
            .flatten()
            .all(|&k| k < config.n_topics));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = SyntheticConfig::default();
        let a = generate(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = generate(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a.corpus, b.corpus);
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn test_generate_rejects_bad_config() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = SyntheticConfig {
            n_topics: 1,
            ..Default::default()
        };
        assert!(generate(&config, &mut rng).is_err());

        let config = SyntheticConfig {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(generate(&config, &mut rng).is_err());
    }
}
