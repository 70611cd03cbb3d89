//! Error types for the review core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the sentiment lexicons.
///
/// Lexicons are loaded once when the extractor is built; any of these
/// aborts construction instead of silently producing zero sentiment.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The lexicon file does not exist or could not be opened
    #[error("Lexicon resource missing: {path}")]
    Missing { path: PathBuf },

    /// A line could not be parsed
    #[error("Malformed lexicon {resource} at line {line}: {reason}")]
    Malformed {
        resource: String,
        line: usize,
        reason: String,
    },

    /// The resource parsed but holds no entries
    #[error("Lexicon {0} is empty")]
    Empty(String),

    /// I/O error while reading a resource
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the review core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Lexicon resources could not be loaded
    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    /// A keyword automaton could not be built
    #[error("Keyword matcher error: {0}")]
    Keywords(String),

    /// A sentiment analyzer produced an unusable result
    #[error("Sentiment analysis failed: {0}")]
    Sentiment(String),

    /// Two sub-extractors declare the same feature
    #[error("Feature {feature} is produced by both {first} and {second}")]
    DuplicateFeature {
        feature: String,
        first: &'static str,
        second: &'static str,
    },

    /// Unknown feature name
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
