//! LDA-C bag-of-words format
//!
//! One document per line: `<num_unique_terms> <term_id>:<count> ...`.
//! Vocabulary size is the largest term id plus one.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::{Corpus, MAX_DOCUMENT_TOKENS};
use crate::error::{LdaError, Result};

/// Parse an LDA-C corpus from a reader
pub fn parse<R: BufRead>(reader: R) -> Result<Corpus> {
    let mut bags = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        bags.push(parse_line(trimmed, idx + 1)?);
    }

    let corpus = Corpus::from_bags(bags)?;
    debug!(
        documents = corpus.num_documents(),
        terms = corpus.num_terms(),
        tokens = corpus.total_tokens(),
        "parsed LDA-C corpus"
    );
    Ok(corpus)
}

/// Parse one non-empty document line
fn parse_line(line: &str, line_no: usize) -> Result<Vec<(usize, usize)>> {
    let mut fields = line.split_whitespace();

    let header = fields
        .next()
        .ok_or_else(|| LdaError::format(line_no, "missing unique term count"))?;
    let declared: i64 = header
        .parse()
        .map_err(|_| LdaError::format(line_no, format!("invalid unique term count '{header}'")))?;
    if declared < 0 {
        return Err(LdaError::format(line_no, "negative unique term count"));
    }

    let mut bag = Vec::new();
    let mut total: usize = 0;
    for field in fields {
        let (term, count) = field
            .split_once(':')
            .ok_or_else(|| LdaError::format(line_no, format!("expected term:count, found '{field}'")))?;
        let term: i64 = term
            .parse()
            .map_err(|_| LdaError::format(line_no, format!("invalid term id '{term}'")))?;
        let count: i64 = count
            .parse()
            .map_err(|_| LdaError::format(line_no, format!("invalid count '{count}'")))?;
        if term < 0 {
            return Err(LdaError::format(line_no, format!("negative term id {term}")));
        }
        if count < 0 {
            return Err(LdaError::format(line_no, format!("negative count {count}")));
        }
        total = total
            .checked_add(count as usize)
            .filter(|&total| total <= MAX_DOCUMENT_TOKENS)
            .ok_or_else(|| {
                LdaError::format(
                    line_no,
                    format!("document exceeds {MAX_DOCUMENT_TOKENS} tokens"),
                )
            })?;
        bag.push((term as usize, count as usize));
    }

    if bag.len() as i64 != declared {
        return Err(LdaError::format(
            line_no,
            format!("declared {declared} unique terms, found {}", bag.len()),
        ));
    }

    Ok(bag)
}

/// Load an LDA-C corpus from a file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

/// Write a corpus in LDA-C format
pub fn write<W: Write>(corpus: &Corpus, mut writer: W) -> Result<()> {
    for doc in corpus.iter() {
        let bag = doc.bag();
        write!(writer, "{}", bag.len())?;
        for (term, count) in bag {
            write!(writer, " {term}:{count}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save a corpus to a file in LDA-C format
pub fn save<P: AsRef<Path>>(corpus: &Corpus, path: P) -> Result<()> {
    let file = File::create(path)?;
    write(corpus, BufWriter::new(file))
}
