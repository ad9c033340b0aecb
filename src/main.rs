//! Command line driver for the LDA sampler
//!
//! - `fit`: sample topics for an LDA-C corpus and write a JSON report
//! - `generate`: write a synthetic LDA-C corpus
//! - `init-config`: write a default configuration file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use lda_sampler::corpus::{ldac, synthetic};
use lda_sampler::utils::logging::level_for_verbosity;
use lda_sampler::utils::{Checkpoint, Config, ModelReport};
use lda_sampler::{seeded_rng, setup_logging, Runner, SamplerState, Vocabulary};

#[derive(Parser)]
#[command(name = "lda")]
#[command(version = "0.1.0")]
#[command(about = "Latent Dirichlet Allocation by collapsed Gibbs sampling", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a topic model to an LDA-C corpus
    Fit {
        /// Corpus in LDA-C format
        #[arg(long)]
        corpus: PathBuf,

        /// Vocabulary file, one term per line
        #[arg(long)]
        vocab: Option<PathBuf>,

        /// Number of topics
        #[arg(short = 'k', long)]
        topics: Option<usize>,

        /// Number of sweeps
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON report output path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Write a checkpoint here after sampling
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Resume from a checkpoint instead of a random start
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Generate a synthetic corpus from the LDA generative process
    Generate {
        /// Output LDA-C file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of documents
        #[arg(long, default_value = "100")]
        docs: usize,

        /// Vocabulary size
        #[arg(long, default_value = "50")]
        terms: usize,

        /// Number of topics
        #[arg(short = 'k', long, default_value = "5")]
        topics: usize,

        /// Tokens per document
        #[arg(long, default_value = "50")]
        doc_length: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Write the default configuration
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config/default.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .with_context(|| format!("reading config {}", cli.config.display()))?
    } else {
        Config::default()
    };

    setup_logging(level_for_verbosity(&config.logging.level, cli.verbose))?;
    if !cli.config.exists() {
        warn!("config {} not found, using defaults", cli.config.display());
    }

    match cli.command {
        Commands::Fit {
            corpus,
            vocab,
            topics,
            iterations,
            seed,
            report,
            checkpoint,
            resume,
        } => {
            let mut config = config;
            if let Some(k) = topics {
                config.model.n_topics = k;
            }
            if let Some(n) = iterations {
                config.sampling.iterations = n;
            }
            if let Some(s) = seed {
                config.sampling.seed = s;
            }
            let paths = FitPaths {
                corpus: &corpus,
                vocab: vocab.as_deref(),
                report: report.as_deref(),
                checkpoint: checkpoint.as_deref(),
                resume: resume.as_deref(),
            };
            fit(&config, paths)?;
        }

        Commands::Generate {
            output,
            docs,
            terms,
            topics,
            doc_length,
            seed,
        } => {
            let settings = synthetic::SyntheticConfig {
                n_documents: docs,
                n_terms: terms,
                n_topics: topics,
                doc_length,
                ..Default::default()
            };
            let mut rng = seeded_rng(seed);
            let generated = synthetic::generate(&settings, &mut rng)?;
            ldac::save(&generated.corpus, &output)?;
            info!(
                documents = docs,
                tokens = generated.corpus.total_tokens(),
                "wrote synthetic corpus to {}",
                output.display()
            );
        }

        Commands::InitConfig { output } => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Config::create_default(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

struct FitPaths<'a> {
    corpus: &'a Path,
    vocab: Option<&'a Path>,
    report: Option<&'a Path>,
    checkpoint: Option<&'a Path>,
    resume: Option<&'a Path>,
}

fn fit(config: &Config, paths: FitPaths<'_>) -> Result<()> {
    let corpus = ldac::load(paths.corpus)
        .with_context(|| format!("loading corpus {}", paths.corpus.display()))?;
    let vocabulary = paths.vocab.map(Vocabulary::load).transpose()?;
    info!(
        documents = corpus.num_documents(),
        terms = corpus.num_terms(),
        tokens = corpus.total_tokens(),
        "loaded corpus"
    );

    let mut rng = seeded_rng(config.sampling.seed);
    let (definition, mut state) = match paths.resume {
        Some(path) => {
            let saved = Checkpoint::load(path)
                .with_context(|| format!("loading checkpoint {}", path.display()))?;
            let state = saved.restore(&corpus)?;
            (saved.definition, state)
        }
        None => {
            let definition = config.model.definition(&corpus)?;
            let state = SamplerState::initialize(&definition, &corpus, &mut rng)?;
            (definition, state)
        }
    };

    let mut runner = Runner::new(&definition, &corpus, &mut state)?
        .with_trace(config.sampling.trace_every, config.sampling.burn_in);
    runner.run(&mut rng, config.sampling.iterations);
    let history = runner.history().to_vec();

    println!("\n=== Discovered Topics ===");
    for topic in state.topics(config.output.top_terms, vocabulary.as_ref()) {
        println!("{}", topic);
    }
    println!();

    let report = ModelReport::new(&state, &corpus, vocabulary.as_ref(), config.output.top_terms)
        .with_history(&history);
    report.summary.print();

    if let Some(path) = paths.report {
        lda_sampler::utils::save_json(&report, path)?;
        info!("wrote report to {}", path.display());
    }
    if let Some(path) = paths.checkpoint {
        Checkpoint::capture(&definition, &state).save(path)?;
        info!("wrote checkpoint to {}", path.display());
    }

    Ok(())
}
