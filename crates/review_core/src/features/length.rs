//! Length and sentence statistics

use super::{ExtractionInput, FeatureName, PartialFeatures};

pub fn extract(input: &ExtractionInput<'_>) -> PartialFeatures {
    let text = input.text;
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let avg_word_length = if word_count == 0 {
        0.0
    } else {
        let total: usize = words.iter().map(|w| w.chars().count()).sum();
        total as f64 / word_count as f64
    };
    let sentences = sentence_count(text);
    let words_per_sentence = if sentences == 0 {
        0.0
    } else {
        word_count as f64 / sentences as f64
    };

    vec![
        (FeatureName::CharCount, text.chars().count() as f64),
        (FeatureName::WordCount, word_count as f64),
        (FeatureName::AvgWordLength, avg_word_length),
        (FeatureName::SentenceCount, sentences as f64),
        (FeatureName::WordsPerSentence, words_per_sentence),
    ]
}

/// Tokens that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "etc", "e.g", "i.e", "approx",
];

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Whether the single `.` at `dot` closes a known abbreviation.
fn ends_abbreviation(chars: &[char], dot: usize) -> bool {
    let start = chars[..dot]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |p| p + 1);
    let token: String = chars[start..dot]
        .iter()
        .skip_while(|c| !c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    ABBREVIATIONS.contains(&token.as_str())
}

/// Count sentences.
///
/// A run of `.`, `!` or `?` followed by whitespace or the end of the text
/// closes a sentence, provided the sentence holds something besides
/// punctuation. A lone `.` after a known abbreviation ("mr.", "vs.") does
/// not close one unless it ends the text. Trailing text without a
/// terminator is a sentence too, and text made only of punctuation counts
/// as one sentence.
pub fn sentence_count(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut count = 0;
    let mut has_content = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if is_terminal(ch) {
            let mut end = i;
            while end < chars.len() && is_terminal(chars[end]) {
                end += 1;
            }
            let closes = end == chars.len()
                || (chars[end].is_whitespace()
                    && !(ch == '.' && end == i + 1 && ends_abbreviation(&chars, i)));
            if closes && has_content {
                count += 1;
                has_content = false;
            }
            i = end;
            continue;
        }
        if !ch.is_whitespace() {
            has_content = true;
        }
        i += 1;
    }
    if has_content {
        count += 1;
    }
    if count == 0 && chars.iter().any(|c| !c.is_whitespace()) {
        count = 1;
    }
    count
}
