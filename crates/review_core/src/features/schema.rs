//! Feature names and model schemas

use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every feature the extractor can produce, in declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    CharCount,
    WordCount,
    AvgWordLength,
    SentenceCount,
    WordsPerSentence,
    ExclamationCount,
    QuestionCount,
    UppercaseWordCount,
    LexicalDiversity,
    DigitRatio,
    SpecificityScore,
    HasComparison,
    PersonalExperienceScore,
    PriceMention,
    VaderNeg,
    VaderNeu,
    VaderPos,
    VaderCompound,
    TextblobPolarity,
    TextblobSubjectivity,
    StarScore,
}

impl FeatureName {
    pub const ALL: [FeatureName; 21] = [
        FeatureName::CharCount,
        FeatureName::WordCount,
        FeatureName::AvgWordLength,
        FeatureName::SentenceCount,
        FeatureName::WordsPerSentence,
        FeatureName::ExclamationCount,
        FeatureName::QuestionCount,
        FeatureName::UppercaseWordCount,
        FeatureName::LexicalDiversity,
        FeatureName::DigitRatio,
        FeatureName::SpecificityScore,
        FeatureName::HasComparison,
        FeatureName::PersonalExperienceScore,
        FeatureName::PriceMention,
        FeatureName::VaderNeg,
        FeatureName::VaderNeu,
        FeatureName::VaderPos,
        FeatureName::VaderCompound,
        FeatureName::TextblobPolarity,
        FeatureName::TextblobSubjectivity,
        FeatureName::StarScore,
    ];

    /// Column name used in artifacts and API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::CharCount => "char_count",
            FeatureName::WordCount => "word_count",
            FeatureName::AvgWordLength => "avg_word_length",
            FeatureName::SentenceCount => "sentence_count",
            FeatureName::WordsPerSentence => "words_per_sentence",
            FeatureName::ExclamationCount => "exclamation_count",
            FeatureName::QuestionCount => "question_count",
            FeatureName::UppercaseWordCount => "uppercase_word_count",
            FeatureName::LexicalDiversity => "lexical_diversity",
            FeatureName::DigitRatio => "digit_ratio",
            FeatureName::SpecificityScore => "specificity_score",
            FeatureName::HasComparison => "has_comparison",
            FeatureName::PersonalExperienceScore => "personal_experience_score",
            FeatureName::PriceMention => "price_mention",
            FeatureName::VaderNeg => "vader_neg",
            FeatureName::VaderNeu => "vader_neu",
            FeatureName::VaderPos => "vader_pos",
            FeatureName::VaderCompound => "vader_compound",
            FeatureName::TextblobPolarity => "textblob_polarity",
            FeatureName::TextblobSubjectivity => "textblob_subjectivity",
            FeatureName::StarScore => "star_score",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CoreError::UnknownFeature(s.to_string()))
    }
}

/// A versioned, ordered list of the features a model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub version: &'static str,
    pub columns: &'static [FeatureName],
}

impl FeatureSchema {
    /// Writing-quality columns. Sentiment and star rating are left out so the
    /// model judges how a review is written, not which opinion it holds.
    pub const MODEL_V1: FeatureSchema = FeatureSchema {
        version: "model_v1",
        columns: &[
            FeatureName::CharCount,
            FeatureName::WordCount,
            FeatureName::AvgWordLength,
            FeatureName::SentenceCount,
            FeatureName::WordsPerSentence,
            FeatureName::ExclamationCount,
            FeatureName::QuestionCount,
            FeatureName::UppercaseWordCount,
            FeatureName::LexicalDiversity,
            FeatureName::DigitRatio,
            FeatureName::SpecificityScore,
            FeatureName::HasComparison,
            FeatureName::PersonalExperienceScore,
            FeatureName::PriceMention,
        ],
    };

    /// Column names as persisted in artifact sidecars.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
