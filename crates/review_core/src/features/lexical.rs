//! Punctuation, capitalization and vocabulary features

use super::{ExtractionInput, FeatureName, PartialFeatures};
use std::collections::HashSet;

pub fn extract(input: &ExtractionInput<'_>) -> PartialFeatures {
    let text = input.text;
    let words: Vec<&str> = text.split_whitespace().collect();
    let uppercase_words = words.iter().filter(|w| is_shouted(w)).count();
    let lexical_diversity = if words.is_empty() {
        0.0
    } else {
        let distinct: HashSet<&str> = words.iter().copied().collect();
        distinct.len() as f64 / words.len() as f64
    };

    vec![
        (FeatureName::ExclamationCount, count_char(text, '!') as f64),
        (FeatureName::QuestionCount, count_char(text, '?') as f64),
        (FeatureName::UppercaseWordCount, uppercase_words as f64),
        (FeatureName::LexicalDiversity, lexical_diversity),
    ]
}

/// Share of digit characters.
pub fn extract_basic(input: &ExtractionInput<'_>) -> PartialFeatures {
    let total = input.text.chars().count();
    let digit_ratio = if total == 0 {
        0.0
    } else {
        let digits = input.text.chars().filter(|c| c.is_ascii_digit()).count();
        digits as f64 / total as f64
    };
    vec![(FeatureName::DigitRatio, digit_ratio)]
}

fn count_char(text: &str, needle: char) -> usize {
    text.chars().filter(|c| *c == needle).count()
}

/// A token written entirely in capitals: at least one cased character,
/// no lower-case one, longer than a single character.
fn is_shouted(word: &str) -> bool {
    let mut has_cased = false;
    for ch in word.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased && word.chars().count() > 1
}
