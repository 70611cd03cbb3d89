//! Core of the review helpfulness predictor
//!
//! Everything that must behave identically at training time and at serving
//! time lives here, so both sides link the same code:
//!
//! Modules:
//! - `normalize`: Canonical text form fed to the feature extractor
//! - `labels`: Binary helpfulness label derivation from vote counts
//! - `features`: Named, ordered feature extraction (length, lexical, domain, sentiment)
//! - `gbdt`: Gradient boosted tree model in its inference form
//! - `serde_canon`: Canonical JSON and blake3 hashing for model files
//! - `types`: Review records shared by the trainer and the service

pub mod errors;
pub mod features;
pub mod gbdt;
pub mod labels;
pub mod normalize;
pub mod serde_canon;
pub mod types;

pub use errors::{CoreError, LexiconError};
pub use features::sentiment::{
    DirectoryLexicons, EmbeddedLexicons, LexiconLoader, Lexicons, PolarityScores, ValenceScores,
};
pub use features::{
    FeatureExtractor, FeatureName, FeatureSchema, FeatureVector, SubExtractor, SUB_EXTRACTORS,
};
pub use gbdt::{GbdtModel, ModelError, Node, Tree};
pub use labels::{label, label_review, Label, LabelPolicy, DEFAULT_HELPFUL_THRESHOLD};
pub use normalize::{normalize, normalize_text};
pub use types::{LabeledExample, Review};

/// Crate version string, recorded in trainer reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
