//! Food-review domain vocabulary
//!
//! Counts are case-insensitive substring occurrences summed over every
//! keyword of a group, so "sweetness" counts for "sweet" and "every" also
//! matches inside "everyday".

use super::{ExtractionInput, FeatureName, PartialFeatures};
use crate::errors::CoreError;
use aho_corasick::AhoCorasick;

const TASTE_WORDS: &[&str] = &[
    "sweet", "salty", "bitter", "sour", "umami", "flavor", "taste", "spicy", "bland",
];
const TEXTURE_WORDS: &[&str] = &[
    "crunchy", "soft", "chewy", "tender", "crispy", "smooth", "creamy", "hard",
];
const QUALITY_WORDS: &[&str] = &[
    "fresh", "stale", "rancid", "expired", "organic", "natural", "premium",
];
const COMPARISON_WORDS: &[&str] = &[
    "than",
    "better",
    "worse",
    "compared",
    "versus",
    "vs",
    "instead",
    "alternative",
    "similar",
];
const PERSONAL_PRONOUNS: &[&str] = &["i ", "my ", "me ", "we ", "our ", "i've", "i'll"];
const TIME_WORDS: &[&str] = &[
    "days", "weeks", "months", "years", "always", "daily", "every", "usually",
];
const PRICE_WORDS: &[&str] = &[
    "price",
    "cost",
    "expensive",
    "cheap",
    "worth",
    "value",
    "money",
    "overpriced",
    "affordable",
];

/// Prebuilt keyword automata, one per feature.
#[derive(Debug)]
pub struct DomainKeywords {
    specificity: AhoCorasick,
    comparison: AhoCorasick,
    personal: AhoCorasick,
    price: AhoCorasick,
}

impl DomainKeywords {
    pub fn new() -> Result<Self, CoreError> {
        let specificity: Vec<&str> = TASTE_WORDS
            .iter()
            .chain(TEXTURE_WORDS)
            .chain(QUALITY_WORDS)
            .copied()
            .collect();
        let personal: Vec<&str> = PERSONAL_PRONOUNS
            .iter()
            .chain(TIME_WORDS)
            .copied()
            .collect();

        Ok(Self {
            specificity: build("specificity", &specificity)?,
            comparison: build("comparison", COMPARISON_WORDS)?,
            personal: build("personal experience", &personal)?,
            price: build("price", PRICE_WORDS)?,
        })
    }

    /// Occurrences of every keyword in `text`, overlaps between different
    /// keywords included.
    fn count(matcher: &AhoCorasick, text: &str) -> usize {
        matcher.find_overlapping_iter(text).count()
    }
}

fn build(group: &str, words: &[&str]) -> Result<AhoCorasick, CoreError> {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(words)
        .map_err(|e| CoreError::Keywords(format!("Failed to build {group} matcher: {e}")))
}

pub fn extract(input: &ExtractionInput<'_>) -> PartialFeatures {
    let keywords = &input.resources.keywords;
    let text = input.text;
    let flag = |hit: bool| if hit { 1.0 } else { 0.0 };

    vec![
        (
            FeatureName::SpecificityScore,
            DomainKeywords::count(&keywords.specificity, text) as f64,
        ),
        (
            FeatureName::HasComparison,
            flag(keywords.comparison.is_match(text)),
        ),
        (
            FeatureName::PersonalExperienceScore,
            DomainKeywords::count(&keywords.personal, text) as f64,
        ),
        (FeatureName::PriceMention, flag(keywords.price.is_match(text))),
    ]
}
