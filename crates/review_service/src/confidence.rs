//! Confidence tiers

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Tier of a positive-class probability.
    ///
    /// The checks run in order: `high` when `p >= 0.7 || p <= 0.3`, else
    /// `medium` when `p >= 0.55 || p <= 0.45`, else `low`.
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.7 || p <= 0.3 {
            Confidence::High
        } else if p >= 0.55 || p <= 0.45 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
