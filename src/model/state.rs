//! Latent sampler state: per-token topic assignments and count tables
//!
//! The count tables are sufficient statistics of the assignment and are
//! kept in exact sync with it:
//! - `doc_topic[d, k]`: tokens of document d assigned topic k
//! - `topic_term[k, w]`: tokens of term w assigned topic k, corpus-wide
//! - `topic_total[k]`: row sums of `topic_term`
//! - `doc_total[d]`: tokens in document d (constant)

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use tracing::info;

use super::definition::{Concentration, ModelDefinition};
use crate::corpus::Corpus;
use crate::error::{LdaError, Result};

/// Topic assignment of every token plus derived counts
#[derive(Debug, Clone)]
pub struct SamplerState {
    n_topics: usize,
    n_terms: usize,
    alpha: Concentration,
    beta: Concentration,
    alpha_sum: f64,
    beta_sum: f64,
    /// Term id of every token, copied from the corpus
    tokens: Vec<Vec<usize>>,
    /// Topic of every token
    assignments: Vec<Vec<usize>>,
    doc_topic: Array2<usize>,
    topic_term: Array2<usize>,
    topic_total: Array1<usize>,
    doc_total: Vec<usize>,
    total_tokens: usize,
    /// Completed full sweeps
    sweeps: usize,
}

impl SamplerState {
    /// Assign every token a topic drawn uniformly from `[0, K)`.
    ///
    /// Tokens are visited in document order, then position order, one draw
    /// each, so the result is fully determined by the RNG state.
    pub fn initialize<R: Rng + ?Sized>(
        definition: &ModelDefinition,
        corpus: &Corpus,
        rng: &mut R,
    ) -> Result<Self> {
        let mut state = Self::empty(definition, corpus)?;
        let n_topics = state.n_topics;

        for d in 0..corpus.num_documents() {
            let topics: Vec<usize> = (0..corpus.token_count(d))
                .map(|_| rng.gen_range(0..n_topics))
                .collect();
            state.assignments[d] = topics;
        }
        state.rebuild_counts();

        info!(
            documents = corpus.num_documents(),
            terms = state.n_terms,
            topics = n_topics,
            tokens = state.total_tokens,
            "initialized sampler state"
        );
        Ok(state)
    }

    /// Build a state from an explicit topic assignment
    pub fn from_assignments(
        definition: &ModelDefinition,
        corpus: &Corpus,
        assignments: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let mut state = Self::empty(definition, corpus)?;

        if assignments.len() != corpus.num_documents() {
            return Err(LdaError::invalid(format!(
                "assignment covers {} documents, corpus has {}",
                assignments.len(),
                corpus.num_documents()
            )));
        }
        for (d, topics) in assignments.iter().enumerate() {
            if topics.len() != corpus.token_count(d) {
                return Err(LdaError::invalid(format!(
                    "document {d}: {} assignments for {} tokens",
                    topics.len(),
                    corpus.token_count(d)
                )));
            }
            if let Some(&k) = topics.iter().find(|&&k| k >= state.n_topics) {
                return Err(LdaError::invalid(format!(
                    "document {d}: topic {k} outside [0, {})",
                    state.n_topics
                )));
            }
        }

        state.assignments = assignments;
        state.rebuild_counts();
        Ok(state)
    }

    /// Validated, zero-count state shaped for a definition and corpus
    fn empty(definition: &ModelDefinition, corpus: &Corpus) -> Result<Self> {
        definition.validate()?;
        if corpus.is_empty() {
            return Err(LdaError::invalid("corpus is empty"));
        }
        if corpus.total_tokens() == 0 {
            return Err(LdaError::invalid("corpus has no tokens"));
        }
        definition.check_corpus(corpus)?;

        let n_docs = corpus.num_documents();
        let n_topics = definition.n_topics;
        let n_terms = definition.n_terms;

        Ok(Self {
            n_topics,
            n_terms,
            alpha: definition.alpha.clone(),
            beta: definition.beta.clone(),
            alpha_sum: definition.alpha.total(n_topics),
            beta_sum: definition.beta.total(n_terms),
            tokens: corpus.iter().map(|doc| doc.tokens().to_vec()).collect(),
            assignments: vec![Vec::new(); n_docs],
            doc_topic: Array2::zeros((n_docs, n_topics)),
            topic_term: Array2::zeros((n_topics, n_terms)),
            topic_total: Array1::zeros(n_topics),
            doc_total: corpus.iter().map(|doc| doc.len()).collect(),
            total_tokens: corpus.total_tokens(),
            sweeps: 0,
        })
    }

    fn rebuild_counts(&mut self) {
        self.doc_topic.fill(0);
        self.topic_term.fill(0);
        self.topic_total.fill(0);
        for (d, (terms, topics)) in self.tokens.iter().zip(&self.assignments).enumerate() {
            for (&w, &k) in terms.iter().zip(topics) {
                self.doc_topic[[d, k]] += 1;
                self.topic_term[[k, w]] += 1;
                self.topic_total[k] += 1;
            }
        }
    }

    /// Topic assigned to token `i` of document `d`
    #[inline]
    pub fn topic_of(&self, d: usize, i: usize) -> usize {
        self.assignments[d][i]
    }

    /// Term id of token `i` of document `d`
    #[inline]
    pub fn term_of(&self, d: usize, i: usize) -> usize {
        self.tokens[d][i]
    }

    /// Reassign token `i` of document `d` to topic `k`, moving its counts
    /// from the old topic to the new one.
    ///
    /// # Panics
    /// Panics if an index is out of range.
    pub fn set_topic(&mut self, d: usize, i: usize, k: usize) {
        assert!(k < self.n_topics, "topic {k} outside [0, {})", self.n_topics);
        if self.assignments[d][i] == k {
            return;
        }
        self.remove_token(d, i);
        self.assign_token(d, i, k);
    }

    /// Take token `(d, i)` out of the count tables, returning
    /// `(term, old_topic)`. Counts are out of sync with the assignment
    /// until `assign_token` is called for the same token.
    #[inline]
    pub(crate) fn remove_token(&mut self, d: usize, i: usize) -> (usize, usize) {
        let w = self.tokens[d][i];
        let k = self.assignments[d][i];
        self.doc_topic[[d, k]] -= 1;
        self.topic_term[[k, w]] -= 1;
        self.topic_total[k] -= 1;
        (w, k)
    }

    /// Put token `(d, i)` back into the count tables under topic `k`
    #[inline]
    pub(crate) fn assign_token(&mut self, d: usize, i: usize, k: usize) {
        let w = self.tokens[d][i];
        self.doc_topic[[d, k]] += 1;
        self.topic_term[[k, w]] += 1;
        self.topic_total[k] += 1;
        self.assignments[d][i] = k;
    }

    pub(crate) fn record_sweep(&mut self) {
        self.sweeps += 1;
    }

    pub(crate) fn set_sweeps(&mut self, sweeps: usize) {
        self.sweeps = sweeps;
    }

    /// Tokens of document `d` assigned topic `k`
    #[inline]
    pub fn doc_topic_count(&self, d: usize, k: usize) -> usize {
        self.doc_topic[[d, k]]
    }

    /// Tokens of term `w` assigned topic `k`
    #[inline]
    pub fn topic_term_count(&self, k: usize, w: usize) -> usize {
        self.topic_term[[k, w]]
    }

    /// Tokens assigned topic `k`
    #[inline]
    pub fn topic_total(&self, k: usize) -> usize {
        self.topic_total[k]
    }

    /// Tokens in document `d`
    #[inline]
    pub fn doc_total(&self, d: usize) -> usize {
        self.doc_total[d]
    }

    /// Document-topic count table (N x K)
    pub fn doc_topic_counts(&self) -> ArrayView2<'_, usize> {
        self.doc_topic.view()
    }

    /// Topic-term count table (K x V)
    pub fn topic_term_counts(&self) -> ArrayView2<'_, usize> {
        self.topic_term.view()
    }

    /// Per-topic token totals
    pub fn topic_totals(&self) -> ArrayView1<'_, usize> {
        self.topic_total.view()
    }

    /// Term ids of document `d`
    pub fn document(&self, d: usize) -> &[usize] {
        &self.tokens[d]
    }

    /// Topic of every token
    pub fn assignments(&self) -> &[Vec<usize>] {
        &self.assignments
    }

    /// Number of topics K
    pub fn num_topics(&self) -> usize {
        self.n_topics
    }

    /// Number of documents N
    pub fn num_documents(&self) -> usize {
        self.tokens.len()
    }

    /// Vocabulary size V
    pub fn num_terms(&self) -> usize {
        self.n_terms
    }

    /// Total number of tokens
    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Completed sweeps since initialization
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Document-topic prior
    pub fn alpha(&self) -> &Concentration {
        &self.alpha
    }

    /// Topic-term prior
    pub fn beta(&self) -> &Concentration {
        &self.beta
    }

    /// Sum of alpha over topics
    pub fn alpha_sum(&self) -> f64 {
        self.alpha_sum
    }

    /// Sum of beta over terms
    pub fn beta_sum(&self) -> f64 {
        self.beta_sum
    }

    /// Check that this state was built for `definition` over `corpus`
    pub fn check_compatible(&self, definition: &ModelDefinition, corpus: &Corpus) -> Result<()> {
        if definition.n_topics != self.n_topics
            || definition.n_terms != self.n_terms
            || definition.alpha != self.alpha
            || definition.beta != self.beta
        {
            return Err(LdaError::invalid(
                "sampler state was initialized with a different model definition",
            ));
        }
        if corpus.num_documents() != self.num_documents()
            || corpus.iter().zip(&self.tokens).any(|(doc, own)| doc.tokens() != own.as_slice())
        {
            return Err(LdaError::invalid(
                "sampler state was initialized from a different corpus",
            ));
        }
        Ok(())
    }

    /// Verify that every count table agrees with the assignment
    pub fn validate(&self) -> Result<()> {
        let mut doc_topic = Array2::<usize>::zeros(self.doc_topic.dim());
        let mut topic_term = Array2::<usize>::zeros(self.topic_term.dim());

        for (d, (terms, topics)) in self.tokens.iter().zip(&self.assignments).enumerate() {
            if terms.len() != topics.len() {
                return Err(LdaError::InconsistentState(format!(
                    "document {d}: {} tokens but {} assignments",
                    terms.len(),
                    topics.len()
                )));
            }
            for (&w, &k) in terms.iter().zip(topics) {
                if k >= self.n_topics {
                    return Err(LdaError::InconsistentState(format!(
                        "document {d}: topic {k} outside [0, {})",
                        self.n_topics
                    )));
                }
                doc_topic[[d, k]] += 1;
                topic_term[[k, w]] += 1;
            }
        }

        if doc_topic != self.doc_topic {
            return Err(LdaError::InconsistentState(
                "document-topic counts diverge from assignment".into(),
            ));
        }
        if topic_term != self.topic_term {
            return Err(LdaError::InconsistentState(
                "topic-term counts diverge from assignment".into(),
            ));
        }
        for (d, row) in self.doc_topic.rows().into_iter().enumerate() {
            if row.sum() != self.doc_total[d] {
                return Err(LdaError::InconsistentState(format!(
                    "document {d}: topic counts sum to {}, expected {}",
                    row.sum(),
                    self.doc_total[d]
                )));
            }
        }
        for (k, row) in self.topic_term.rows().into_iter().enumerate() {
            if row.sum() != self.topic_total[k] {
                return Err(LdaError::InconsistentState(format!(
                    "topic {k}: term counts sum to {}, cached total {}",
                    row.sum(),
                    self.topic_total[k]
                )));
            }
        }
        if self.topic_total.sum() != self.total_tokens {
            return Err(LdaError::InconsistentState(format!(
                "topic totals sum to {}, corpus has {} tokens",
                self.topic_total.sum(),
                self.total_tokens
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_corpus() -> Corpus {
        Corpus::new(vec![vec![0, 1, 2, 3], vec![0, 1, 4, 5], vec![0, 1, 5, 6]])
    }

    fn definition(corpus: &Corpus) -> ModelDefinition {
        ModelDefinition::for_corpus(corpus).unwrap().n_topics(3)
    }

    #[test]
    fn test_initialize_counts_consistent() {
        let corpus = small_corpus();
        let mut rng = StdRng::seed_from_u64(0);
        let state = SamplerState::initialize(&definition(&corpus), &corpus, &mut rng).unwrap();

        assert!(state.validate().is_ok());
        assert_eq!(state.num_topics(), 3);
        assert_eq!(state.total_tokens(), 12);
        assert_eq!(state.sweeps(), 0);
        let per_doc: usize = (0..3).map(|k| state.doc_topic_count(1, k)).sum();
        assert_eq!(per_doc, state.doc_total(1));
    }

    #[test]
    fn test_initialize_rejects_bad_input() {
        let corpus = small_corpus();
        let mut rng = StdRng::seed_from_u64(0);

        let no_topics = definition(&corpus).n_topics(0);
        assert!(matches!(
            SamplerState::initialize(&no_topics, &corpus, &mut rng),
            Err(LdaError::InvalidArgument(_))
        ));

        let empty = Corpus::new(vec![vec![], vec![]]);
        let defn = ModelDefinition::new(2, 1).unwrap();
        assert!(SamplerState::initialize(&defn, &empty, &mut rng).is_err());

        let wrong_docs = ModelDefinition::new(5, 7).unwrap();
        assert!(SamplerState::initialize(&wrong_docs, &corpus, &mut rng).is_err());
    }

    #[test]
    fn test_set_topic_moves_counts() {
        let corpus = small_corpus();
        let assignments = vec![vec![0, 1, 2, 0], vec![1, 1, 1, 1], vec![2, 2, 2, 0]];
        let mut state =
            SamplerState::from_assignments(&definition(&corpus), &corpus, assignments).unwrap();

        assert_eq!(state.topic_term_count(1, 1), 2);
        assert_eq!(state.topic_total(1), 5);

        state.set_topic(0, 1, 2);
        assert_eq!(state.topic_of(0, 1), 2);
        assert_eq!(state.topic_term_count(1, 1), 1);
        assert_eq!(state.topic_term_count(2, 1), 2);
        assert_eq!(state.doc_topic_count(0, 1), 0);
        assert_eq!(state.doc_topic_count(0, 2), 2);
        assert_eq!(state.topic_total(1), 4);
        assert!(state.validate().is_ok());

        // Same topic is a no-op
        state.set_topic(0, 1, 2);
        assert!(state.validate().is_ok());
        assert_eq!(state.topic_total(2), 5);
    }

    #[test]
    fn test_from_assignments_validation() {
        let corpus = small_corpus();
        let defn = definition(&corpus);

        let short = vec![vec![0, 1, 2, 0], vec![1, 1, 1]];
        assert!(SamplerState::from_assignments(&defn, &corpus, short).is_err());

        let out_of_range = vec![vec![0, 1, 2, 3], vec![1, 1, 1, 1], vec![2, 2, 2, 0]];
        assert!(SamplerState::from_assignments(&defn, &corpus, out_of_range).is_err());
    }

    #[test]
    fn test_validate_detects_drift() {
        let corpus = small_corpus();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = SamplerState::initialize(&definition(&corpus), &corpus, &mut rng).unwrap();

        let k = state.topic_of(0, 0);
        state.remove_token(0, 0);
        assert!(matches!(
            state.validate(),
            Err(LdaError::InconsistentState(_))
        ));
        state.assign_token(0, 0, k);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_check_compatible() {
        let corpus = small_corpus();
        let defn = definition(&corpus);
        let mut rng = StdRng::seed_from_u64(2);
        let state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();

        assert!(state.check_compatible(&defn, &corpus).is_ok());
        assert!(state.check_compatible(&defn.clone().n_topics(4), &corpus).is_err());

        let other = Corpus::new(vec![vec![0, 1, 2, 3], vec![0, 1, 4, 5], vec![6, 1, 5, 0]]);
        assert!(state.check_compatible(&defn, &other).is_err());
    }
}
