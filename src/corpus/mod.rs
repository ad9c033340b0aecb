//! Corpus representation
//!
//! A corpus is an immutable, ordered collection of documents over a fixed
//! vocabulary. Each document is stored as its expanded token sequence
//! (one term id per occurrence) so the sampler can address tokens by
//! position.
//!
//! - `ldac`: LDA-C bag-of-words reader and writer
//! - `vocabulary`: term strings, tokenization and vocabulary files
//! - `synthetic`: corpora drawn from the LDA generative process

pub mod ldac;
pub mod synthetic;
pub mod vocabulary;

use std::collections::BTreeMap;

use crate::error::{LdaError, Result};

pub use vocabulary::Vocabulary;

/// Largest token count accepted for a single document
pub const MAX_DOCUMENT_TOKENS: usize = 1 << 26;

/// A single document: the ordered term ids of its tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<usize>,
}

impl Document {
    /// Create a document from its expanded token sequence
    pub fn new(tokens: Vec<usize>) -> Self {
        Self { tokens }
    }

    /// Create a document from (term, count) pairs, expanded in order.
    ///
    /// Fails when the counts add up to more than `MAX_DOCUMENT_TOKENS`.
    pub fn from_bag(bag: &[(usize, usize)]) -> Result<Self> {
        let total = bag
            .iter()
            .try_fold(0usize, |acc, &(_, count)| acc.checked_add(count))
            .filter(|&total| total <= MAX_DOCUMENT_TOKENS)
            .ok_or_else(|| {
                LdaError::invalid(format!(
                    "bag expands to more than {MAX_DOCUMENT_TOKENS} tokens"
                ))
            })?;

        let mut tokens = Vec::with_capacity(total);
        for &(term, count) in bag {
            tokens.extend(std::iter::repeat(term).take(count));
        }
        Ok(Self { tokens })
    }

    /// Term ids of the document's tokens
    pub fn tokens(&self) -> &[usize] {
        &self.tokens
    }

    /// Number of tokens in the document
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the document has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Bag-of-words view: (term, count) pairs sorted by term id
    pub fn bag(&self) -> Vec<(usize, usize)> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &term in &self.tokens {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }
}

/// Immutable collection of documents over a vocabulary of `num_terms` ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
    num_terms: usize,
    total_tokens: usize,
}

impl Corpus {
    /// Build a corpus from expanded token lists.
    ///
    /// The vocabulary size is the largest term id plus one.
    pub fn new(documents: Vec<Vec<usize>>) -> Self {
        let num_terms = documents
            .iter()
            .flat_map(|doc| doc.iter())
            .max()
            .map_or(0, |&max| max + 1);
        Self::assemble(documents.into_iter().map(Document::new).collect(), num_terms)
    }

    /// Build a corpus over an explicitly declared vocabulary size.
    ///
    /// Fails with a format error when a term id is outside `[0, num_terms)`.
    pub fn with_num_terms(documents: Vec<Vec<usize>>, num_terms: usize) -> Result<Self> {
        for (d, doc) in documents.iter().enumerate() {
            if let Some(&term) = doc.iter().find(|&&term| term >= num_terms) {
                return Err(LdaError::format(
                    d + 1,
                    format!("term id {term} outside vocabulary of size {num_terms}"),
                ));
            }
        }
        Ok(Self::assemble(
            documents.into_iter().map(Document::new).collect(),
            num_terms,
        ))
    }

    /// Build a corpus from bag-of-words documents of (term, count) pairs.
    ///
    /// The vocabulary size is the largest listed term id plus one, including
    /// ids listed with a zero count.
    pub fn from_bags(bags: Vec<Vec<(usize, usize)>>) -> Result<Self> {
        let num_terms = match bags.iter().flat_map(|bag| bag.iter().map(|&(term, _)| term)).max() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| LdaError::invalid(format!("term id {max} too large")))?,
            None => 0,
        };
        let documents = bags
            .iter()
            .map(|bag| Document::from_bag(bag))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::assemble(documents, num_terms))
    }

    fn assemble(documents: Vec<Document>, num_terms: usize) -> Self {
        let total_tokens = documents.iter().map(Document::len).sum();
        Self {
            documents,
            num_terms,
            total_tokens,
        }
    }

    /// Vocabulary size V
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    /// Number of documents N
    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    /// Term ids of document `d`
    ///
    /// # Panics
    /// Panics if `d` is out of range.
    pub fn document(&self, d: usize) -> &[usize] {
        self.documents[d].tokens()
    }

    /// Number of tokens in document `d`
    pub fn token_count(&self, d: usize) -> usize {
        self.documents[d].len()
    }

    /// (term, count) pairs of document `d`, sorted by term id
    pub fn bag(&self, d: usize) -> Vec<(usize, usize)> {
        self.documents[d].bag()
    }

    /// Total number of tokens in the corpus
    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Whether the corpus has no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over documents in order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Number of documents containing each term (document frequency)
    pub fn document_frequencies(&self) -> Vec<usize> {
        let mut df = vec![0usize; self.num_terms];
        for doc in &self.documents {
            for (term, _) in doc.bag() {
                df[term] += 1;
            }
        }
        df
    }
}
