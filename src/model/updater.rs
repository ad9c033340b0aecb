//! Collapsed Gibbs update for a single token
//!
//! With the token removed from the counts, its topic is drawn from
//!
//! ```text
//! p(z = k | rest) ∝ (n_dk + alpha_k) * (n_kw + beta_w) / (n_k + beta_sum)
//! ```
//!
//! where the Dirichlet document-topic and topic-term parameters have been
//! integrated out. One update costs O(K).

use rand::Rng;
use tracing::trace;

use super::state::SamplerState;

/// Resamples token topics; owns the scratch weight buffer
#[derive(Debug, Clone)]
pub struct GibbsUpdater {
    weights: Vec<f64>,
    degenerate_draws: u64,
}

impl GibbsUpdater {
    /// Create an updater for `n_topics` topics
    pub fn new(n_topics: usize) -> Self {
        Self {
            weights: vec![0.0; n_topics],
            degenerate_draws: 0,
        }
    }

    /// Resample the topic of token `i` in document `d`, returning the new topic
    pub fn resample<R: Rng + ?Sized>(
        &mut self,
        state: &mut SamplerState,
        d: usize,
        i: usize,
        rng: &mut R,
    ) -> usize {
        // Exclude the token from its own conditioning set
        let (w, _) = state.remove_token(d, i);

        self.conditional(state, d, w);
        let k_new = self.draw(rng);

        state.assign_token(d, i, k_new);
        k_new
    }

    /// Draw a topic from the weight buffer, uniformly when it is degenerate
    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        match sample_categorical(&self.weights, rng) {
            Some(k) => k,
            None => {
                self.degenerate_draws += 1;
                trace!(
                    draws = self.degenerate_draws,
                    "topic weights degenerate, drawing uniformly"
                );
                rng.gen_range(0..self.weights.len())
            }
        }
    }

    /// Fill the weight buffer with the unnormalized conditional for term `w`
    /// in document `d` (the token itself must already be removed)
    fn conditional(&mut self, state: &SamplerState, d: usize, w: usize) {
        let n_topics = state.num_topics();
        if self.weights.len() != n_topics {
            self.weights.resize(n_topics, 0.0);
        }

        let alpha = state.alpha();
        let beta_w = state.beta().at(w);
        let beta_sum = state.beta_sum();

        for (k, weight) in self.weights.iter_mut().enumerate() {
            let doc_part = state.doc_topic_count(d, k) as f64 + alpha.at(k);
            let term_part = state.topic_term_count(k, w) as f64 + beta_w;
            let topic_norm = state.topic_total(k) as f64 + beta_sum;
            *weight = doc_part * term_part / topic_norm;
        }
    }

    /// Draws that fell back to a uniform topic because every weight was zero
    pub fn degenerate_draws(&self) -> u64 {
        self.degenerate_draws
    }

    /// Last computed (unnormalized) conditional weights
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Draw an index proportionally to non-negative `weights` using one uniform
/// draw and a linear scan over the cumulative weights.
///
/// Returns `None` without consuming randomness when the total weight is
/// zero or not finite.
pub fn sample_categorical<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }

    let threshold = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    let mut last_positive = None;
    for (k, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            cumsum += weight;
            last_positive = Some(k);
            if threshold < cumsum {
                return Some(k);
            }
        }
    }

    // Rounding left the threshold just past the final cumulative sum
    last_positive
}
