//! Pattern-lexicon polarity and subjectivity
//!
//! Words found in the polarity lexicon are assessments. An adverb with an
//! intensity other than 1 directly before another lexicon word modifies
//! that word instead of being scored itself, and a negation earlier in the
//! same sentence flips and halves the next assessment. The result is the
//! mean over all assessments, `(0.0, 0.0)` when there are none.

use super::lexicon::PolarityLexicon;
use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use tracing::warn;

const NEGATIONS: &[&str] = &["not", "never", "no", "nor", "neither", "without", "cannot"];
const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    /// In [-1, 1]
    pub polarity: f64,
    /// In [0, 1]
    pub subjectivity: f64,
}

#[derive(Debug, Clone)]
pub struct PolarityAnalyzer {
    lexicon: PolarityLexicon,
}

struct Word<'a> {
    text: &'a str,
    ends_sentence: bool,
}

fn words(text: &str) -> Vec<Word<'_>> {
    text.split_whitespace()
        .filter_map(|raw| {
            let ends_sentence = raw.ends_with(['.', '!', '?']);
            let trimmed = raw.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'');
            if trimmed.is_empty() {
                None
            } else {
                Some(Word {
                    text: trimmed,
                    ends_sentence,
                })
            }
        })
        .collect()
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

impl PolarityAnalyzer {
    pub fn new(lexicon: PolarityLexicon) -> Self {
        Self { lexicon }
    }

    /// Score `text`; any internal failure degrades to `(0.0, 0.0)`.
    pub fn analyze(&self, text: &str) -> PolarityScores {
        match self.try_analyze(text) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "Polarity analysis failed, using neutral scores");
                PolarityScores::default()
            }
        }
    }

    pub fn try_analyze(&self, text: &str) -> Result<PolarityScores, CoreError> {
        let lowered = text.to_lowercase();
        let words = words(&lowered);
        let mut assessments: Vec<(f64, f64)> = Vec::new();
        let mut negated = false;
        let mut intensity: Option<f64> = None;

        for (i, word) in words.iter().enumerate() {
            if is_negation(word.text) {
                negated = true;
            } else if let Some(entry) = self.lexicon.get(word.text) {
                let modifies_next = entry.is_modifier()
                    && !word.ends_sentence
                    && words
                        .get(i + 1)
                        .is_some_and(|next| self.lexicon.get(next.text).is_some());
                if modifies_next {
                    intensity = Some(intensity.unwrap_or(1.0) * entry.intensity);
                } else {
                    let factor = intensity.take().unwrap_or(1.0);
                    let mut polarity = entry.polarity * factor;
                    let subjectivity = (entry.subjectivity * factor).min(1.0);
                    if negated {
                        polarity *= NEGATION_FACTOR;
                        negated = false;
                    }
                    assessments.push((polarity, subjectivity));
                }
            } else {
                intensity = None;
            }

            if word.ends_sentence {
                negated = false;
                intensity = None;
            }
        }

        if assessments.is_empty() {
            return Ok(PolarityScores::default());
        }
        let n = assessments.len() as f64;
        let polarity = assessments.iter().map(|(p, _)| p).sum::<f64>() / n;
        let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f64>() / n;
        if !polarity.is_finite() || !subjectivity.is_finite() {
            return Err(CoreError::Sentiment(format!(
                "non-finite polarity result ({polarity}, {subjectivity})"
            )));
        }
        Ok(PolarityScores {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        })
    }
}
