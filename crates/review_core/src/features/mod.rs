//! Feature extraction for review helpfulness
//!
//! A [`FeatureExtractor`] runs a fixed, ordered list of sub-extractors over
//! normalized review text and merges their outputs into a [`FeatureVector`]
//! keyed by [`FeatureName`]. The trainer and the prediction service share
//! this code, and models consume features by name through a
//! [`FeatureSchema`], never by position.
//!
//! Sub-extractors, in merge order:
//! 1. `length`: character, word and sentence statistics
//! 2. `lexical`: punctuation, capitalization and vocabulary diversity
//! 3. `basic`: digit ratio
//! 4. `domain`: food vocabulary, comparisons, personal experience, price
//! 5. `valence`: VADER-style lexicon sentiment
//! 6. `polarity`: pattern-lexicon polarity and subjectivity
//! 7. `score`: the star rating, when supplied
//!
//! Only the columns of [`FeatureSchema::MODEL_V1`] reach the model; the
//! sentiment and score features are diagnostics used by suggestions.

pub mod domain;
pub mod length;
pub mod lexical;
pub mod schema;
pub mod sentiment;
pub mod vector;

use crate::errors::CoreError;
use domain::DomainKeywords;
use sentiment::{LexiconLoader, Lexicons, PolarityAnalyzer, ValenceAnalyzer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use schema::{FeatureName, FeatureSchema};
pub use vector::{FeatureVector, Projection};

/// Output of a single sub-extractor, in the order it was produced.
pub type PartialFeatures = Vec<(FeatureName, f64)>;

/// Read-only resources shared by every extraction.
#[derive(Debug)]
pub struct ExtractorResources {
    pub valence: ValenceAnalyzer,
    pub polarity: PolarityAnalyzer,
    pub keywords: DomainKeywords,
}

/// Everything a sub-extractor may look at.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    /// Normalized review text
    pub text: &'a str,
    /// Star rating, when known
    pub score: Option<u8>,
    pub resources: &'a ExtractorResources,
}

/// A named pure function contributing a group of features.
#[derive(Debug, Clone, Copy)]
pub struct SubExtractor {
    pub name: &'static str,
    /// Every feature `run` may produce
    pub emits: &'static [FeatureName],
    pub run: fn(&ExtractionInput<'_>) -> PartialFeatures,
}

/// Fail when two sub-extractors declare the same feature.
pub fn check_disjoint(subs: &[SubExtractor]) -> Result<(), CoreError> {
    let mut owners: HashMap<FeatureName, &'static str> = HashMap::new();
    for sub in subs {
        for &feature in sub.emits {
            if let Some(first) = owners.insert(feature, sub.name) {
                return Err(CoreError::DuplicateFeature {
                    feature: feature.to_string(),
                    first,
                    second: sub.name,
                });
            }
        }
    }
    Ok(())
}

/// The sub-extractors in merge order.
pub const SUB_EXTRACTORS: &[SubExtractor] = &[
    SubExtractor {
        name: "length",
        emits: &[
            FeatureName::CharCount,
            FeatureName::WordCount,
            FeatureName::AvgWordLength,
            FeatureName::SentenceCount,
            FeatureName::WordsPerSentence,
        ],
        run: length::extract,
    },
    SubExtractor {
        name: "lexical",
        emits: &[
            FeatureName::ExclamationCount,
            FeatureName::QuestionCount,
            FeatureName::UppercaseWordCount,
            FeatureName::LexicalDiversity,
        ],
        run: lexical::extract,
    },
    SubExtractor {
        name: "basic",
        emits: &[FeatureName::DigitRatio],
        run: lexical::extract_basic,
    },
    SubExtractor {
        name: "domain",
        emits: &[
            FeatureName::SpecificityScore,
            FeatureName::HasComparison,
            FeatureName::PersonalExperienceScore,
            FeatureName::PriceMention,
        ],
        run: domain::extract,
    },
    SubExtractor {
        name: "valence",
        emits: &[
            FeatureName::VaderNeg,
            FeatureName::VaderNeu,
            FeatureName::VaderPos,
            FeatureName::VaderCompound,
        ],
        run: sentiment::extract_valence,
    },
    SubExtractor {
        name: "polarity",
        emits: &[FeatureName::TextblobPolarity, FeatureName::TextblobSubjectivity],
        run: sentiment::extract_polarity,
    },
    SubExtractor {
        name: "score",
        emits: &[FeatureName::StarScore],
        run: extract_score,
    },
];

fn extract_score(input: &ExtractionInput<'_>) -> PartialFeatures {
    match input.score {
        Some(score) => vec![(FeatureName::StarScore, f64::from(score))],
        None => Vec::new(),
    }
}

/// Deterministic feature extractor over normalized text.
///
/// Cheap to clone; clones share the loaded lexicons and keyword automata.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    resources: Arc<ExtractorResources>,
}

impl FeatureExtractor {
    /// Build an extractor from already loaded lexicons.
    pub fn new(lexicons: Lexicons) -> Result<Self, CoreError> {
        check_disjoint(SUB_EXTRACTORS)?;
        let resources = ExtractorResources {
            valence: ValenceAnalyzer::new(lexicons.valence),
            polarity: PolarityAnalyzer::new(lexicons.polarity),
            keywords: DomainKeywords::new()?,
        };
        Ok(Self {
            resources: Arc::new(resources),
        })
    }

    /// Load lexicons through `loader` and build an extractor, failing fast
    /// when a resource is missing or malformed.
    pub fn from_loader(loader: &dyn LexiconLoader) -> Result<Self, CoreError> {
        let lexicons = loader.load()?;
        debug!(
            valence_entries = lexicons.valence.len(),
            polarity_entries = lexicons.polarity.len(),
            "Loaded sentiment lexicons"
        );
        Self::new(lexicons)
    }

    /// Extract every feature from normalized `text`.
    ///
    /// Pure with respect to `(text, score)`: calling it twice yields
    /// bit-identical vectors.
    pub fn extract(&self, text: &str, score: Option<u8>) -> FeatureVector {
        let input = ExtractionInput {
            text,
            score,
            resources: &self.resources,
        };
        let mut vector = FeatureVector::new();
        for sub in SUB_EXTRACTORS {
            vector.merge((sub.run)(&input));
        }
        vector
    }

    /// Shared resources, for callers that need a single analyzer.
    pub fn resources(&self) -> &ExtractorResources {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiment::EmbeddedLexicons;
    use std::collections::HashSet;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::from_loader(&EmbeddedLexicons).unwrap()
    }

    #[test]
    fn test_sub_extractor_keys_never_collide() {
        let extractor = extractor();
        let input = ExtractionInput {
            text: "i love this tea, better than coffee! worth the price?",
            score: Some(4),
            resources: extractor.resources(),
        };
        let mut seen = HashSet::new();
        for sub in SUB_EXTRACTORS {
            for (name, _) in (sub.run)(&input) {
                assert!(sub.emits.contains(&name), "{} emitted undeclared {}", sub.name, name);
                assert!(seen.insert(name), "{} emitted duplicate {}", sub.name, name);
            }
        }
        assert_eq!(seen.len(), FeatureName::ALL.len());
        assert!(check_disjoint(SUB_EXTRACTORS).is_ok());
    }

    #[test]
    fn test_overlapping_declarations_are_rejected() {
        let overlapping = [
            SUB_EXTRACTORS[0],
            SubExtractor {
                name: "word_stats",
                emits: &[FeatureName::AvgWordLength],
                run: length::extract,
            },
        ];
        match check_disjoint(&overlapping) {
            Err(CoreError::DuplicateFeature {
                feature,
                first,
                second,
            }) => {
                assert_eq!(feature, "avg_word_length");
                assert_eq!(first, "length");
                assert_eq!(second, "word_stats");
            }
            other => panic!("expected duplicate feature error, got {other:?}"),
        }
    }

    #[test]
    fn test_vector_holds_every_feature_in_declaration_order() {
        let vector = extractor().extract("good stuff. would buy again!", Some(5));
        let names: Vec<FeatureName> = vector.names().collect();
        assert_eq!(names, FeatureName::ALL.to_vec());
    }

    #[test]
    fn test_score_feature_only_when_supplied() {
        let extractor = extractor();
        let with = extractor.extract("nice and fresh", Some(3));
        let without = extractor.extract("nice and fresh", None);
        assert_eq!(with.get(FeatureName::StarScore), Some(3.0));
        assert_eq!(without.get(FeatureName::StarScore), None);
        assert_eq!(with.len(), without.len() + 1);
    }

    #[test]
    fn test_model_columns_independent_of_score() {
        let extractor = extractor();
        let columns = FeatureSchema::MODEL_V1.column_names();
        let low = extractor.extract("excellent! works perfectly.", Some(1));
        let high = extractor.extract("excellent! works perfectly.", Some(5));
        assert_eq!(low.project(&columns).values, high.project(&columns).values);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let extractor = extractor();
        let text = "i bought this for my kids. they love the crunchy texture, better than chips!";
        let a = extractor.extract(text, Some(4));
        let b = extractor.extract(text, Some(4));
        for ((na, va), (nb, vb)) in a.iter().zip(b.iter()) {
            assert_eq!(na, nb);
            assert_eq!(va.to_bits(), vb.to_bits());
        }
    }

    #[test]
    fn test_clones_share_resources() {
        let extractor = extractor();
        let clone = extractor.clone();
        assert!(Arc::ptr_eq(&extractor.resources, &clone.resources));
    }
}
