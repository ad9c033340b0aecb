//! Evaluation metrics for topic models

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::model::SamplerState;

/// Topic quality metrics computed from document co-occurrence
pub struct Evaluator {
    /// Distinct terms of every document
    doc_terms: Vec<HashSet<usize>>,
    /// Number of documents containing each term
    doc_freq: Vec<usize>,
}

impl Evaluator {
    /// Create an evaluator over the reference corpus
    pub fn new(corpus: &Corpus) -> Self {
        let doc_terms = corpus
            .iter()
            .map(|doc| doc.tokens().iter().copied().collect())
            .collect();
        Self {
            doc_terms,
            doc_freq: corpus.document_frequencies(),
        }
    }

    /// Compute UMass coherence for a topic given its top term ids
    /// (most probable first).
    ///
    /// Higher (less negative) values indicate more coherent topics.
    /// Returns `None` when fewer than two of the terms occur in the corpus.
    pub fn umass_coherence(&self, top_terms: &[usize]) -> Option<f64> {
        let terms: Vec<usize> = top_terms
            .iter()
            .copied()
            .filter(|&w| self.doc_freq.get(w).is_some_and(|&df| df > 0))
            .collect();

        if terms.len() < 2 {
            return None;
        }

        let epsilon = 1.0;
        let mut coherence = 0.0;
        let mut pair_count = 0;

        for (i, &w_i) in terms.iter().enumerate().skip(1) {
            for &w_j in &terms[..i] {
                let co_occurrences = self
                    .doc_terms
                    .iter()
                    .filter(|terms| terms.contains(&w_i) && terms.contains(&w_j))
                    .count() as f64;
                coherence += ((co_occurrences + epsilon) / self.doc_freq[w_j] as f64).ln();
                pair_count += 1;
            }
        }

        Some(coherence / pair_count as f64)
    }

    /// Fraction of unique terms across all topics' top terms
    pub fn topic_diversity(topics: &[Vec<usize>]) -> f64 {
        let total: usize = topics.iter().map(Vec::len).sum();
        if total == 0 {
            return 0.0;
        }
        let unique: HashSet<usize> = topics.iter().flatten().copied().collect();
        unique.len() as f64 / total as f64
    }

    /// Jaccard similarity between two topics' top terms
    pub fn topic_overlap(a: &[usize], b: &[usize]) -> f64 {
        let a: HashSet<usize> = a.iter().copied().collect();
        let b: HashSet<usize> = b.iter().copied().collect();

        let union = a.union(&b).count();
        if union == 0 {
            return 0.0;
        }
        a.intersection(&b).count() as f64 / union as f64
    }
}

/// Summary statistics for a fitted model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub n_topics: usize,
    pub sweeps: usize,
    pub perplexity: f64,
    pub log_likelihood: f64,
    /// Mean coherence over topics that have one
    pub avg_coherence: Option<f64>,
    pub diversity: f64,
    pub topic_coherences: Vec<Option<f64>>,
}

impl ModelSummary {
    /// Summarize a sampler state using the `n_top` terms of each topic
    pub fn from_state(state: &SamplerState, corpus: &Corpus, n_top: usize) -> Self {
        let evaluator = Evaluator::new(corpus);
        let topics: Vec<Vec<usize>> = (0..state.num_topics())
            .map(|k| state.top_terms(k, n_top).into_iter().map(|(w, _)| w).collect())
            .collect();

        let topic_coherences: Vec<Option<f64>> = topics
            .iter()
            .map(|terms| evaluator.umass_coherence(terms))
            .collect();

        let values: Vec<f64> = topic_coherences.iter().filter_map(|&c| c).collect();
        let avg_coherence = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };

        Self {
            n_topics: state.num_topics(),
            sweeps: state.sweeps(),
            perplexity: state.perplexity(),
            log_likelihood: state.log_likelihood(),
            avg_coherence,
            diversity: Evaluator::topic_diversity(&topics),
            topic_coherences,
        }
    }

    /// Print summary to console
    pub fn print(&self) {
        println!("=== Topic Model Summary ===");
        println!("Number of topics: {}", self.n_topics);
        println!("Sweeps: {}", self.sweeps);
        println!("Perplexity: {:.2}", self.perplexity);
        println!("Log-likelihood: {:.2}", self.log_likelihood);
        if let Some(coh) = self.avg_coherence {
            println!("Average coherence: {:.4}", coh);
        }
        println!("Topic diversity: {:.4}", self.diversity);

        println!("\nPer-topic coherence:");
        for (i, coh) in self.topic_coherences.iter().enumerate() {
            match coh {
                Some(c) => println!("  Topic {}: {:.4}", i, c),
                None => println!("  Topic {}: N/A", i),
            }
        }
    }
}
