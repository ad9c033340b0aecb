//! Vocabulary: mapping between term strings and term ids
//!
//! Used to turn raw text into a `Corpus` and to label topics with words.
//! Vocabulary files hold one term per line; the line index is the term id.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::{HashMap, HashSet};

use super::Corpus;
use crate::error::{LdaError, Result};

/// Ordered vocabulary with id lookup
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Term -> id
    index: HashMap<String, usize>,
    /// id -> term
    terms: Vec<String>,
    /// Words dropped by `tokenize`
    stop_words: HashSet<String>,
    /// Minimum token length kept by `tokenize`
    min_length: usize,
}

impl Vocabulary {
    /// Create an empty vocabulary with a small English stop word list
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            terms: Vec::new(),
            stop_words: default_stop_words(),
            min_length: 2,
        }
    }

    /// Create a vocabulary from an ordered list of terms
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for term in terms {
            vocab.add(term.into());
        }
        vocab
    }

    /// Set minimum token length used by `tokenize`
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Add custom stop words
    pub fn add_stop_words(&mut self, words: &[&str]) {
        for word in words {
            self.stop_words.insert(word.to_lowercase());
        }
    }

    /// Add a term, returning its id (existing id if already present)
    pub fn add(&mut self, term: String) -> usize {
        if let Some(&id) = self.index.get(&term) {
            return id;
        }
        let id = self.terms.len();
        self.index.insert(term.clone(), id);
        self.terms.push(term);
        id
    }

    /// Id of a term
    pub fn id(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Term for an id
    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    /// All terms in id order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Split text into lowercase alphabetic tokens, dropping stop words
    /// and tokens shorter than the minimum length
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphabetic())
            .filter(|tok| tok.chars().count() >= self.min_length)
            .filter(|tok| !self.stop_words.contains(*tok))
            .map(str::to_string)
            .collect()
    }

    /// Tokenize texts, growing the vocabulary, and build a corpus
    pub fn corpus_from_texts<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<Corpus> {
        let documents: Vec<Vec<usize>> = texts
            .iter()
            .map(|text| {
                self.tokenize(text.as_ref())
                    .into_iter()
                    .map(|tok| self.add(tok))
                    .collect()
            })
            .collect();
        Corpus::with_num_terms(documents, self.len())
    }

    /// Load a vocabulary file (one term per line)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut vocab = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let term = line.trim();
            if term.is_empty() {
                return Err(LdaError::format(idx + 1, "empty term"));
            }
            if vocab.id(term).is_some() {
                return Err(LdaError::format(idx + 1, format!("duplicate term '{term}'")));
            }
            vocab.add(term.to_string());
        }
        Ok(vocab)
    }

    /// Save the vocabulary (one term per line)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for term in &self.terms {
            writeln!(writer, "{term}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

fn default_stop_words() -> HashSet<String> {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it",
        "of", "on", "or", "that", "the", "to", "was", "were", "will", "with",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}
