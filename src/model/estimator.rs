//! Quantities derived from the current counts
//!
//! All distributions are closed-form Dirichlet-smoothed estimates read from
//! the count tables; none of them consume randomness, so repeated calls on
//! the same state return identical values.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

use super::state::SamplerState;
use super::updater::sample_categorical;
use crate::corpus::{Corpus, Vocabulary};
use crate::error::{LdaError, Result};

/// A topic described by its most probable terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic index
    pub index: usize,
    /// Top terms as (label, probability); label is the term id when no
    /// vocabulary was supplied
    pub top_words: Vec<(String, f64)>,
    /// Term ids of `top_words`
    pub top_term_ids: Vec<usize>,
    /// Share of corpus tokens assigned to the topic
    pub prevalence: f64,
}

impl fmt::Display for TopicSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Topic {}: (prevalence: {:.2}%) [",
            self.index,
            self.prevalence * 100.0
        )?;
        for (i, (word, prob)) in self.top_words.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.3}", word, prob)?;
        }
        write!(f, "]")
    }
}

impl SamplerState {
    /// Topic distribution of document `d`:
    /// `(n_dk + alpha_k) / (n_d + alpha_sum)`
    pub fn document_topic_distribution(&self, d: usize) -> Array1<f64> {
        let norm = self.doc_total(d) as f64 + self.alpha_sum();
        Array1::from_shape_fn(self.num_topics(), |k| {
            (self.doc_topic_count(d, k) as f64 + self.alpha().at(k)) / norm
        })
    }

    /// Topic distributions of all documents (N x K)
    pub fn document_distribution(&self) -> Array2<f64> {
        let n_topics = self.num_topics();
        let mut theta = Array2::zeros((self.num_documents(), n_topics));
        for d in 0..self.num_documents() {
            let norm = self.doc_total(d) as f64 + self.alpha_sum();
            for k in 0..n_topics {
                theta[[d, k]] = (self.doc_topic_count(d, k) as f64 + self.alpha().at(k)) / norm;
            }
        }
        theta
    }

    /// Term distribution of topic `k`:
    /// `(n_kw + beta_w) / (n_k + beta_sum)` over all V terms
    pub fn topic_word_distribution(&self, k: usize) -> Array1<f64> {
        let norm = self.topic_total(k) as f64 + self.beta_sum();
        Array1::from_shape_fn(self.num_terms(), |w| {
            (self.topic_term_count(k, w) as f64 + self.beta().at(w)) / norm
        })
    }

    /// Term distributions of all topics (K x V)
    pub fn word_distribution(&self) -> Array2<f64> {
        let n_terms = self.num_terms();
        let mut phi = Array2::zeros((self.num_topics(), n_terms));
        for k in 0..self.num_topics() {
            let norm = self.topic_total(k) as f64 + self.beta_sum();
            for w in 0..n_terms {
                phi[[k, w]] = (self.topic_term_count(k, w) as f64 + self.beta().at(w)) / norm;
            }
        }
        phi
    }

    /// Training perplexity: `exp(-sum log p(w_di) / N_tokens)` with
    /// `p(w) = sum_k theta_dk * phi_kw`. Lower is better.
    pub fn perplexity(&self) -> f64 {
        let theta = self.document_distribution();
        let phi = self.word_distribution();
        let log_likelihood: f64 = (0..self.num_documents())
            .map(|d| token_log_likelihood(self.document(d), theta.row(d), &phi))
            .sum();
        (-log_likelihood / self.total_tokens() as f64).exp()
    }

    /// Collapsed joint log-likelihood `log p(w, z)` with the Dirichlet
    /// parameters integrated out
    pub fn log_likelihood(&self) -> f64 {
        let n_topics = self.num_topics();
        let n_terms = self.num_terms();
        let beta_sum = self.beta_sum();
        let alpha_sum = self.alpha_sum();

        let lgamma_beta: Vec<f64> = (0..n_terms).map(|w| ln_gamma(self.beta().at(w))).collect();
        let mut ll = 0.0;

        // log p(w | z)
        for k in 0..n_topics {
            ll += ln_gamma(beta_sum) - ln_gamma(self.topic_total(k) as f64 + beta_sum);
            for w in 0..n_terms {
                let count = self.topic_term_count(k, w);
                if count > 0 {
                    ll += ln_gamma(count as f64 + self.beta().at(w)) - lgamma_beta[w];
                }
            }
        }

        // log p(z)
        let lgamma_alpha: Vec<f64> = (0..n_topics).map(|k| ln_gamma(self.alpha().at(k))).collect();
        for d in 0..self.num_documents() {
            ll += ln_gamma(alpha_sum) - ln_gamma(self.doc_total(d) as f64 + alpha_sum);
            for k in 0..n_topics {
                let count = self.doc_topic_count(d, k);
                if count > 0 {
                    ll += ln_gamma(count as f64 + self.alpha().at(k)) - lgamma_alpha[k];
                }
            }
        }

        ll
    }

    /// The `n` most probable terms of topic `k` as (term id, probability)
    pub fn top_terms(&self, k: usize, n: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self
            .topic_word_distribution(k)
            .iter()
            .copied()
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Summaries of every topic with its `n` top terms
    pub fn topics(&self, n: usize, vocabulary: Option<&Vocabulary>) -> Vec<TopicSummary> {
        let total = self.total_tokens() as f64;
        (0..self.num_topics())
            .map(|k| {
                let top = self.top_terms(k, n);
                let top_words = top
                    .iter()
                    .map(|&(w, p)| {
                        let label = vocabulary
                            .and_then(|v| v.term(w))
                            .map_or_else(|| w.to_string(), str::to_string);
                        (label, p)
                    })
                    .collect();
                TopicSummary {
                    index: k,
                    top_words,
                    top_term_ids: top.iter().map(|&(w, _)| w).collect(),
                    prevalence: self.topic_total(k) as f64 / total,
                }
            })
            .collect()
    }

    /// Most probable topic of every document (lowest index on ties)
    pub fn dominant_topics(&self) -> Vec<usize> {
        (0..self.num_documents())
            .map(|d| {
                let theta = self.document_topic_distribution(d);
                let mut best = 0;
                for k in 1..theta.len() {
                    if theta[k] > theta[best] {
                        best = k;
                    }
                }
                best
            })
            .collect()
    }

    /// Infer the topic distribution of an unseen document by Gibbs sampling
    /// its tokens against the frozen topic-term counts of this state.
    pub fn infer_document<R: Rng + ?Sized>(
        &self,
        tokens: &[usize],
        iterations: usize,
        rng: &mut R,
    ) -> Result<Array1<f64>> {
        let n_topics = self.num_topics();
        if let Some(&w) = tokens.iter().find(|&&w| w >= self.num_terms()) {
            return Err(LdaError::invalid(format!(
                "term id {w} outside vocabulary of size {}",
                self.num_terms()
            )));
        }

        let mut local = vec![0usize; n_topics];
        let mut topics: Vec<usize> = tokens
            .iter()
            .map(|_| {
                let k = rng.gen_range(0..n_topics);
                local[k] += 1;
                k
            })
            .collect();

        let mut weights = vec![0.0; n_topics];
        for _ in 0..iterations {
            for (i, &w) in tokens.iter().enumerate() {
                local[topics[i]] -= 1;
                let beta_w = self.beta().at(w);
                for (k, weight) in weights.iter_mut().enumerate() {
                    *weight = (local[k] as f64 + self.alpha().at(k))
                        * (self.topic_term_count(k, w) as f64 + beta_w)
                        / (self.topic_total(k) as f64 + self.beta_sum());
                }
                let k_new = sample_categorical(&weights, rng)
                    .unwrap_or_else(|| rng.gen_range(0..n_topics));
                topics[i] = k_new;
                local[k_new] += 1;
            }
        }

        let norm = tokens.len() as f64 + self.alpha_sum();
        Ok(Array1::from_shape_fn(n_topics, |k| {
            (local[k] as f64 + self.alpha().at(k)) / norm
        }))
    }

    /// Perplexity of a held-out corpus, folding each document in with
    /// `iterations` sweeps of `infer_document`
    pub fn held_out_perplexity<R: Rng + ?Sized>(
        &self,
        corpus: &Corpus,
        iterations: usize,
        rng: &mut R,
    ) -> Result<f64> {
        if corpus.total_tokens() == 0 {
            return Err(LdaError::invalid("held-out corpus has no tokens"));
        }
        let phi = self.word_distribution();
        let mut log_likelihood = 0.0;
        for doc in corpus.iter() {
            let theta = self.infer_document(doc.tokens(), iterations, rng)?;
            log_likelihood += token_log_likelihood(doc.tokens(), theta.view(), &phi);
        }
        Ok((-log_likelihood / corpus.total_tokens() as f64).exp())
    }
}

/// Sum over tokens of `log sum_k theta_k * phi_kw`
fn token_log_likelihood(tokens: &[usize], theta: ArrayView1<'_, f64>, phi: &Array2<f64>) -> f64 {
    tokens
        .iter()
        .map(|&w| {
            let p: f64 = theta
                .iter()
                .enumerate()
                .map(|(k, &t)| t * phi[[k, w]])
                .sum();
            p.ln()
        })
        .sum()
}
