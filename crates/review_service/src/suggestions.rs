//! Writing suggestions derived from extracted features

use review_core::{FeatureName, FeatureVector};

pub const TOO_SHORT: &str =
    "Your review is very short. Add more details about your experience with the product.";
pub const ADD_SPECIFICS: &str =
    "Consider adding more specific information about the product's characteristics.";
pub const ADD_STRUCTURE: &str =
    "Split your review into several points to make it clearer and easier to read.";
pub const STATE_OPINION: &str =
    "Your review reads as neutral. State clearly whether you recommend the product and why.";
pub const VARY_VOCABULARY: &str = "Use a more varied vocabulary to make your review more engaging.";
pub const FEWER_QUESTIONS: &str =
    "Avoid asking too many questions. Give clear answers and opinions instead.";
pub const FEWER_EXCLAMATIONS: &str =
    "Cut back on exclamation marks to give the review a more measured tone.";
pub const PRAISE: &str =
    "Excellent review! It is informative and will likely be useful to other shoppers.";
pub const GOOD_ADD_DETAIL: &str =
    "Your review is good, but it could benefit from more specific details.";
pub const BE_SPECIFIC: &str =
    "Try to be more specific and detailed about your experience with the product.";

/// Suggestions for `features` predicted at probability `p`, in a fixed order.
///
/// Absent features count as 0. The closing remark is only added when no
/// other rule fired.
pub fn suggestions(features: &FeatureVector, p: f64) -> Vec<String> {
    let value = |name| features.value_or_zero(name);
    let mut out = Vec::new();

    let word_count = value(FeatureName::WordCount);
    if word_count < 20.0 {
        out.push(TOO_SHORT);
    } else if word_count < 50.0 {
        out.push(ADD_SPECIFICS);
    }
    if value(FeatureName::SentenceCount) < 3.0 {
        out.push(ADD_STRUCTURE);
    }
    if value(FeatureName::VaderCompound).abs() < 0.2
        && value(FeatureName::TextblobPolarity).abs() < 0.2
    {
        out.push(STATE_OPINION);
    }
    if value(FeatureName::LexicalDiversity) < 0.5 {
        out.push(VARY_VOCABULARY);
    }
    if value(FeatureName::QuestionCount) > 3.0 {
        out.push(FEWER_QUESTIONS);
    }
    if value(FeatureName::ExclamationCount) > 5.0 {
        out.push(FEWER_EXCLAMATIONS);
    }

    if out.is_empty() {
        out.push(if p > 0.7 {
            PRAISE
        } else if p > 0.5 {
            GOOD_ADD_DETAIL
        } else {
            BE_SPECIFIC
        });
    }
    out.into_iter().map(str::to_string).collect()
}
