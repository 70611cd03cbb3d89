//! Helpfulness label derivation
//!
//! A review is "helpful" when the share of readers who voted it helpful
//! reaches the policy threshold. Reviews nobody voted on carry no signal
//! and never receive a label.

use crate::types::{LabeledExample, Review};
use serde::{Deserialize, Serialize};

/// Default share of helpful votes needed for the positive class (inclusive).
pub const DEFAULT_HELPFUL_THRESHOLD: f64 = 0.7;

/// Labeling policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LabelPolicy {
    pub threshold: f64,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_HELPFUL_THRESHOLD,
        }
    }
}

/// Derived label for one vote tally
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub helpfulness_rate: f64,
    pub is_helpful: bool,
}

/// Derive a label from vote counts, `None` when nobody voted.
pub fn label(numerator: u32, denominator: u32, threshold: f64) -> Option<Label> {
    if denominator < 1 {
        return None;
    }
    let helpfulness_rate = f64::from(numerator) / f64::from(denominator);
    Some(Label {
        helpfulness_rate,
        is_helpful: helpfulness_rate >= threshold,
    })
}

/// Attach a label to a review under the given policy.
pub fn label_review(review: &Review, policy: &LabelPolicy) -> Option<LabeledExample> {
    let derived = label(
        review.helpfulness_numerator,
        review.helpfulness_denominator,
        policy.threshold,
    )?;
    Some(LabeledExample {
        review: review.clone(),
        helpfulness_rate: derived.helpfulness_rate,
        is_helpful: derived.is_helpful,
    })
}
