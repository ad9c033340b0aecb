//! Integration tests for the LDA sampler

use approx::assert_abs_diff_eq;
use lda_sampler::corpus::synthetic::{self, SyntheticConfig};
use lda_sampler::corpus::ldac;
use lda_sampler::utils::{Checkpoint, ModelReport};
use lda_sampler::{seeded_rng, Corpus, ModelDefinition, Runner, SamplerState};
use tempfile::NamedTempFile;

fn small_corpus() -> Corpus {
    Corpus::new(vec![
        vec![0, 1, 0, 2, 1, 0],
        vec![3, 4, 3, 4, 4],
        vec![0, 1, 3, 4, 2, 2],
    ])
}

fn synthetic_corpus(seed: u64) -> Corpus {
    let config = SyntheticConfig {
        n_documents: 60,
        n_terms: 30,
        n_topics: 3,
        doc_length: 40,
        alpha: 0.1,
        beta: 0.05,
    };
    synthetic::generate(&config, &mut seeded_rng(seed))
        .unwrap()
        .corpus
}

fn fit(corpus: &Corpus, defn: &ModelDefinition, seed: u64, sweeps: usize) -> SamplerState {
    let mut rng = seeded_rng(seed);
    let mut state = SamplerState::initialize(defn, corpus, &mut rng).unwrap();
    Runner::new(defn, corpus, &mut state)
        .unwrap()
        .run(&mut rng, sweeps);
    state
}

#[test]
fn test_three_document_scenario() {
    let corpus = small_corpus();
    assert_eq!(corpus.num_terms(), 5);

    let defn = ModelDefinition::new(3, 5)
        .unwrap()
        .n_topics(2)
        .alpha(0.1)
        .beta(0.01);
    let state = fit(&corpus, &defn, 12345, 50);

    let theta = state.document_distribution();
    assert_eq!(theta.dim(), (3, 2));
    for row in theta.outer_iter() {
        assert_eq!(row.len(), 2);
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
    }

    let phi = state.word_distribution();
    assert_eq!(phi.dim(), (2, 5));
    for row in phi.outer_iter() {
        assert_eq!(row.len(), 5);
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_count_invariants_hold_after_sweeps() {
    let corpus = synthetic_corpus(5);
    let defn = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(4);
    let mut rng = seeded_rng(9);
    let mut state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();

    let mut runner = Runner::new(&defn, &corpus, &mut state).unwrap();
    for _ in 0..5 {
        runner.run(&mut rng, 3);
        assert!(runner.state().validate().is_ok());
    }

    for d in 0..corpus.num_documents() {
        let row: usize = state.doc_topic_counts().row(d).sum();
        assert_eq!(row, corpus.token_count(d));
    }
    for k in 0..state.num_topics() {
        let row: usize = state.topic_term_counts().row(k).sum();
        assert_eq!(row, state.topic_total(k));
    }
    assert_eq!(state.topic_totals().sum(), corpus.total_tokens());
}

#[test]
fn test_distributions_normalized_with_asymmetric_priors() {
    let corpus = synthetic_corpus(2);
    let defn = ModelDefinition::for_corpus(&corpus)
        .unwrap()
        .n_topics(3)
        .alpha(vec![0.5, 0.1, 0.05])
        .beta(0.02);
    let state = fit(&corpus, &defn, 4, 20);

    for d in 0..state.num_documents() {
        assert_abs_diff_eq!(state.document_topic_distribution(d).sum(), 1.0, epsilon = 1e-9);
    }
    for k in 0..state.num_topics() {
        assert_abs_diff_eq!(state.topic_word_distribution(k).sum(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_identical_seeds_are_bit_identical() {
    let corpus = synthetic_corpus(7);
    let defn = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(3);

    let a = fit(&corpus, &defn, 77, 25);
    let b = fit(&corpus, &defn, 77, 25);

    assert_eq!(a.assignments(), b.assignments());
    assert_eq!(a.document_distribution(), b.document_distribution());
    assert_eq!(a.word_distribution(), b.word_distribution());
    assert_eq!(a.perplexity().to_bits(), b.perplexity().to_bits());

    // Repeated reads of the same state do not change
    assert_eq!(a.word_distribution(), a.word_distribution());
}

#[test]
fn test_split_runs_match_single_run() {
    let corpus = synthetic_corpus(8);
    let defn = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(3);

    let single = fit(&corpus, &defn, 3, 20);

    let mut rng = seeded_rng(3);
    let mut split = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();
    Runner::new(&defn, &corpus, &mut split)
        .unwrap()
        .run(&mut rng, 8)
        .run(&mut rng, 12);

    assert_eq!(split.sweeps(), 20);
    assert_eq!(single.assignments(), split.assignments());
}

#[test]
fn test_more_sweeps_do_not_worsen_perplexity() {
    let corpus = synthetic_corpus(11);
    let defn = ModelDefinition::for_corpus(&corpus)
        .unwrap()
        .n_topics(3)
        .alpha(0.1)
        .beta(0.05);
    let mut rng = seeded_rng(21);
    let mut state = SamplerState::initialize(&defn, &corpus, &mut rng).unwrap();

    let mut runner = Runner::new(&defn, &corpus, &mut state).unwrap();
    runner.run(&mut rng, 100);
    let checkpoint = runner.state().perplexity();
    runner.run(&mut rng, 200);
    let later = runner.state().perplexity();

    assert!(
        later <= checkpoint * 1.05,
        "perplexity rose from {checkpoint} to {later}"
    );
}

#[test]
fn test_zero_iteration_baseline_is_worse() {
    let corpus = synthetic_corpus(13);
    let defn = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(3);

    let initial = fit(&corpus, &defn, 1, 0);
    let trained = fit(&corpus, &defn, 2, 50);

    assert_eq!(initial.sweeps(), 0);
    assert!(initial.perplexity() > trained.perplexity());
    assert!(initial.log_likelihood() < trained.log_likelihood());
}

#[test]
fn test_held_out_perplexity_beats_uniform() {
    let train = synthetic_corpus(17);
    let defn = ModelDefinition::for_corpus(&train).unwrap().n_topics(3);
    let state = fit(&train, &defn, 5, 100);

    let held_out = Corpus::new(
        (0..5)
            .map(|d| train.document(d).iter().rev().copied().collect())
            .collect(),
    );
    let perplexity = state
        .held_out_perplexity(&held_out, 20, &mut seeded_rng(6))
        .unwrap();

    assert!(perplexity.is_finite());
    assert!(perplexity < train.num_terms() as f64);
}

#[test]
fn test_ldac_file_to_report() {
    let corpus = small_corpus();
    let file = NamedTempFile::new().unwrap();
    ldac::save(&corpus, file.path()).unwrap();

    let loaded = ldac::load(file.path()).unwrap();
    assert_eq!(loaded.num_documents(), 3);
    assert_eq!(loaded.num_terms(), 5);
    assert_eq!(loaded.total_tokens(), corpus.total_tokens());

    let defn = ModelDefinition::for_corpus(&loaded).unwrap().n_topics(2);
    let state = fit(&loaded, &defn, 12345, 10);
    let report = ModelReport::new(&state, &loaded, None, 3);
    assert_eq!(report.n_topics, 2);
    assert_eq!(report.dominant_topics.len(), 3);
}

#[test]
fn test_checkpoint_resume_continues_chain() {
    let corpus = synthetic_corpus(19);
    let defn = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(3);
    let state = fit(&corpus, &defn, 31, 10);

    let file = NamedTempFile::new().unwrap();
    Checkpoint::capture(&defn, &state).save(file.path()).unwrap();

    let saved = Checkpoint::load(file.path()).unwrap();
    let mut resumed = saved.restore(&corpus).unwrap();
    let mut rng = seeded_rng(32);
    Runner::new(&saved.definition, &corpus, &mut resumed)
        .unwrap()
        .run(&mut rng, 5);

    assert_eq!(resumed.sweeps(), 15);
    assert!(resumed.validate().is_ok());
}

#[test]
fn test_malformed_corpus_is_format_error() {
    let err = ldac::parse("2 0:1 1:x\n".as_bytes()).unwrap_err();
    assert!(err.is_format_error());

    let err = ldac::parse("1 0:1\n2 0:-1 1:1\n".as_bytes()).unwrap_err();
    assert!(err.is_format_error());
}

#[test]
fn test_invalid_model_arguments() {
    let corpus = small_corpus();
    let zero_topics = ModelDefinition::for_corpus(&corpus).unwrap().n_topics(0);
    assert!(SamplerState::initialize(&zero_topics, &corpus, &mut seeded_rng(1)).is_err());

    let wrong_docs = ModelDefinition::new(4, 5).unwrap().n_topics(2);
    assert!(SamplerState::initialize(&wrong_docs, &corpus, &mut seeded_rng(1)).is_err());

    let empty = Corpus::new(vec![]);
    assert!(ModelDefinition::for_corpus(&empty).is_err());
}
