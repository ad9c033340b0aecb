//! Error types for the LDA sampler

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, LdaError>;

/// Errors that can occur while building or sampling a topic model
#[derive(Error, Debug)]
pub enum LdaError {
    /// Malformed corpus, vocabulary or checkpoint input
    #[error("Format error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    /// Invalid model parameter or mismatched shapes
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Count tables disagree with the topic assignment
    #[error("Inconsistent sampler state: {0}")]
    InconsistentState(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LdaError {
    /// Shorthand for a format error on a given (1-based) line
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        LdaError::FormatError {
            line,
            message: message.into(),
        }
    }

    /// Shorthand for an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        LdaError::InvalidArgument(message.into())
    }

    /// Whether the error was caused by malformed input data
    pub fn is_format_error(&self) -> bool {
        matches!(self, LdaError::FormatError { .. })
    }
}
