//! Configuration management
//!
//! Run settings are stored as TOML. Every section has defaults, so a
//! partial file only overrides what it names.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::model::{Concentration, ModelDefinition};

/// Model hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub n_topics: usize,
    pub alpha: Concentration,
    pub beta: Concentration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_topics: 10,
            alpha: Concentration::Symmetric(0.1),
            beta: Concentration::Symmetric(0.01),
        }
    }
}

impl ModelConfig {
    /// Build a validated model definition for a corpus
    pub fn definition(&self, corpus: &Corpus) -> crate::Result<ModelDefinition> {
        let definition = ModelDefinition::for_corpus(corpus)?
            .n_topics(self.n_topics)
            .alpha(self.alpha.clone())
            .beta(self.beta.clone());
        definition.validate()?;
        Ok(definition)
    }
}

/// Sampling schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub iterations: usize,
    pub seed: u64,
    /// Record fit every N sweeps (0 = off)
    pub trace_every: usize,
    pub burn_in: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: 42,
            trace_every: 0,
            burn_in: 0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub top_terms: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { top_terms: 10 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub sampling: SamplingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create default configuration file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        Config::default().save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.model.n_topics, 10);
        assert_eq!(config.model.alpha, Concentration::Symmetric(0.1));
        assert_eq!(config.sampling.iterations, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            "[model]\nn_topics = 4\nalpha = [0.1, 0.2, 0.3, 0.4]\n\n[sampling]\nseed = 7\n",
        )
        .unwrap();
        assert_eq!(config.model.n_topics, 4);
        assert_eq!(config.model.alpha.total(4), 1.0);
        assert_eq!(config.model.beta, Concentration::Symmetric(0.01));
        assert_eq!(config.sampling.seed, 7);
        assert_eq!(config.sampling.iterations, 1000);
    }

    #[test]
    fn test_config_file_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.model.n_topics = 3;
        config.save(file.path()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.model.n_topics, 3);
        assert_eq!(loaded.sampling.seed, config.sampling.seed);
    }

    #[test]
    fn test_model_definition_from_config() {
        let corpus = Corpus::new(vec![vec![0, 1], vec![2]]);
        let model = ModelConfig {
            n_topics: 2,
            ..Default::default()
        };
        let defn = model.definition(&corpus).unwrap();
        assert_eq!(defn.n_docs, 2);
        assert_eq!(defn.n_terms, 3);

        let bad = ModelConfig {
            n_topics: 0,
            ..Default::default()
        };
        assert!(bad.definition(&corpus).is_err());
    }
}
