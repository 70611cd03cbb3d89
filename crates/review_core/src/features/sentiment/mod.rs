//! Sentiment features
//!
//! Diagnostic only: these values feed suggestions and API responses but are
//! not model columns.

pub mod lexicon;
pub mod polarity;
pub mod valence;

use super::{ExtractionInput, FeatureName, PartialFeatures};

pub use lexicon::{
    DirectoryLexicons, EmbeddedLexicons, LexiconLoader, Lexicons, PolarityEntry, PolarityLexicon,
    ValenceLexicon,
};
pub use polarity::{PolarityAnalyzer, PolarityScores};
pub use valence::{ValenceAnalyzer, ValenceScores};

pub fn extract_valence(input: &ExtractionInput<'_>) -> PartialFeatures {
    let scores = input.resources.valence.polarity_scores(input.text);
    vec![
        (FeatureName::VaderNeg, scores.neg),
        (FeatureName::VaderNeu, scores.neu),
        (FeatureName::VaderPos, scores.pos),
        (FeatureName::VaderCompound, scores.compound),
    ]
}

pub fn extract_polarity(input: &ExtractionInput<'_>) -> PartialFeatures {
    let scores = input.resources.polarity.analyze(input.text);
    vec![
        (FeatureName::TextblobPolarity, scores.polarity),
        (FeatureName::TextblobSubjectivity, scores.subjectivity),
    ]
}
