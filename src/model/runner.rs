//! Sweep orchestration
//!
//! A sweep visits every token exactly once, documents in ascending order
//! and positions in ascending order within each document. With a fixed RNG
//! stream the traversal, and therefore the whole run, is reproducible.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::definition::ModelDefinition;
use super::state::SamplerState;
use super::updater::GibbsUpdater;
use crate::corpus::Corpus;
use crate::error::Result;

/// Model fit recorded after a sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    /// Sweep number (1-based, counted since initialization)
    pub iteration: usize,
    /// Collapsed joint log-likelihood log p(w, z)
    pub log_likelihood: f64,
    /// Training perplexity
    pub perplexity: f64,
}

/// Drives repeated full-corpus sweeps over a sampler state
#[derive(Debug)]
pub struct Runner<'a> {
    state: &'a mut SamplerState,
    updater: GibbsUpdater,
    trace_every: usize,
    burn_in: usize,
    history: Vec<SweepRecord>,
}

impl<'a> Runner<'a> {
    /// Create a runner for a state initialized from `definition` and `corpus`
    pub fn new(
        definition: &ModelDefinition,
        corpus: &Corpus,
        state: &'a mut SamplerState,
    ) -> Result<Self> {
        definition.validate()?;
        state.check_compatible(definition, corpus)?;
        let updater = GibbsUpdater::new(state.num_topics());
        Ok(Self {
            state,
            updater,
            trace_every: 0,
            burn_in: 0,
            history: Vec::new(),
        })
    }

    /// Record fit every `every` sweeps once `burn_in` sweeps have completed.
    ///
    /// `every = 0` disables the trace.
    pub fn with_trace(mut self, every: usize, burn_in: usize) -> Self {
        self.trace_every = every;
        self.burn_in = burn_in;
        self
    }

    /// Run `n_iterations` full sweeps. Iterations accumulate across calls.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R, n_iterations: usize) -> &mut Self {
        let start = self.state.sweeps();
        let degenerate_before = self.updater.degenerate_draws();

        for _ in 0..n_iterations {
            self.sweep(rng);
        }

        let degenerate = self.updater.degenerate_draws() - degenerate_before;
        if degenerate > 0 {
            warn!(
                draws = degenerate,
                "uniform fallback used for degenerate topic weights"
            );
        }
        info!(
            from = start,
            to = self.state.sweeps(),
            "completed {} sweeps",
            n_iterations
        );
        self
    }

    /// Run a single full sweep
    pub fn sweep<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for d in 0..self.state.num_documents() {
            for i in 0..self.state.doc_total(d) {
                self.updater.resample(self.state, d, i, rng);
            }
        }
        self.state.record_sweep();

        debug_assert!(
            self.state.validate().is_ok(),
            "count tables out of sync after sweep {}",
            self.state.sweeps()
        );

        let iteration = self.state.sweeps();
        if self.trace_every > 0 && iteration > self.burn_in && iteration % self.trace_every == 0 {
            let record = SweepRecord {
                iteration,
                log_likelihood: self.state.log_likelihood(),
                perplexity: self.state.perplexity(),
            };
            debug!(
                iteration,
                log_likelihood = record.log_likelihood,
                perplexity = record.perplexity,
                "sweep"
            );
            self.history.push(record);
        }
    }

    /// The sampler state being driven
    pub fn state(&self) -> &SamplerState {
        self.state
    }

    /// Total sweeps applied to the state so far
    pub fn iterations(&self) -> usize {
        self.state.sweeps()
    }

    /// Fit trace recorded so far
    pub fn history(&self) -> &[SweepRecord] {
        &self.history
    }

    /// Degenerate draws seen by this runner's updater
    pub fn degenerate_draws(&self) -> u64 {
        self.updater.degenerate_draws()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (ModelDefinition, Corpus) {
        let corpus = Corpus::new(vec![
            vec![0, 1, 2, 0, 1, 2],
            vec![0, 1, 2, 1, 0],
            vec![3, 4, 5, 3, 4],
            vec![3, 4, 5, 5, 4, 3],
        ]);
        let defn = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(2);
        (defn, corpus)
    }

    #[test]
    fn test_iterations_accumulate() {
        let (defn, corpus) = setup();
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();

        let mut runner = Runner::new(&defn, &corpus, &mut state).unwrap();
        runner.run(&mut rng, 3).run(&mut rng, 2);
        assert_eq!(runner.iterations(), 5);
        assert!(runner.state().validate().is_ok());

        drop(runner);
        assert_eq!(state.sweeps(), 5);
    }

    #[test]
    fn test_trace_respects_burn_in() {
        let (defn, corpus) = setup();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();

        let mut runner = Runner::new(&defn, &corpus, &mut state)
            .unwrap()
            .with_trace(2, 4);
        runner.run(&mut rng, 10);

        let iterations: Vec<usize> = runner.history().iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![6, 8, 10]);
        assert!(runner.history().iter().all(|r| r.perplexity.is_finite()));
    }

    #[test]
    fn test_rejects_foreign_state() {
        let (defn, corpus) = setup();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();

        let other = defn.clone().n_topics(3);
        assert!(Runner::new(&other, &corpus, &mut state).is_err());
    }

    #[test]
    fn test_zero_iterations_is_noop() {
        let (defn, corpus) = setup();
        let mut rng = StdRng::seed_from_u64(8);
        let mut state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();
        let before = state.assignments().to_vec();

        Runner::new(&defn, &corpus, &mut state)
            .unwrap()
            .run(&mut rng, 0);
        assert_eq!(state.assignments(), before.as_slice());
        assert_eq!(state.sweeps(), 0);
    }
}
