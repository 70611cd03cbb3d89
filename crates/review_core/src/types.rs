//! Review records shared by the trainer and the service.

use serde::{Deserialize, Serialize};

/// A single product review as it appears in the source dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub product_id: String,
    pub user_id: String,
    /// Star rating, 1 to 5
    pub score: u8,
    /// Unix seconds
    pub time: i64,
    pub summary: Option<String>,
    pub text: Option<String>,
    pub helpfulness_numerator: u32,
    pub helpfulness_denominator: u32,
}

/// A review that received at least one helpfulness vote, with its derived label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledExample {
    pub review: Review,
    pub helpfulness_rate: f64,
    pub is_helpful: bool,
}
