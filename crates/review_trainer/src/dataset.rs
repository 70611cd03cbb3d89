//! Review dataset loading
//!
//! Reads the Amazon fine-food review CSV export. Extra columns such as
//! `Id` or `ProfileName` are ignored; a missing required column aborts the
//! load before any row is read.

use crate::errors::TrainerError;
use review_core::labels::{label_review, LabelPolicy};
use review_core::types::{LabeledExample, Review};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const REQUIRED_COLUMNS: &[&str] = &[
    "ProductId",
    "UserId",
    "Score",
    "Time",
    "Summary",
    "Text",
    "HelpfulnessNumerator",
    "HelpfulnessDenominator",
];

#[derive(Debug, Deserialize)]
struct CsvReview {
    #[serde(rename = "ProductId")]
    product_id: String,
    #[serde(rename = "UserId")]
    user_id: String,
    #[serde(rename = "Score")]
    score: u8,
    #[serde(rename = "Time")]
    time: i64,
    #[serde(rename = "Summary")]
    summary: Option<String>,
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "HelpfulnessNumerator")]
    helpfulness_numerator: u32,
    #[serde(rename = "HelpfulnessDenominator")]
    helpfulness_denominator: u32,
}

impl From<CsvReview> for Review {
    fn from(row: CsvReview) -> Self {
        Review {
            product_id: row.product_id,
            user_id: row.user_id,
            score: row.score,
            time: row.time,
            summary: row.summary,
            text: row.text,
            helpfulness_numerator: row.helpfulness_numerator,
            helpfulness_denominator: row.helpfulness_denominator,
        }
    }
}

/// Numeric training matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Summary counts for logging and reports
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DatasetStats {
    pub total_reviews: usize,
    pub voted_reviews: usize,
    pub helpful_reviews: usize,
    pub helpful_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewDataset {
    pub reviews: Vec<Review>,
}

impl ReviewDataset {
    /// Load reviews from a CSV file, reading at most `limit` rows.
    pub fn from_csv<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            TrainerError::Dataset(format!("cannot open {}: {e}", path.display()))
        })?;
        let dataset = Self::from_reader(file, limit)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            "Loaded review dataset"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, limit: Option<usize>) -> Result<Self, TrainerError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !headers.iter().any(|h| h.trim() == *required))
            .collect();
        if !missing.is_empty() {
            return Err(TrainerError::Dataset(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut reviews = Vec::new();
        for (idx, record) in csv_reader.deserialize::<CsvReview>().enumerate() {
            if limit.is_some_and(|l| reviews.len() >= l) {
                break;
            }
            // header is line 1
            let row = record
                .map_err(|e| TrainerError::Dataset(format!("row {}: {e}", idx + 2)))?;
            if !(1..=5).contains(&row.score) {
                return Err(TrainerError::Dataset(format!(
                    "row {}: score {} outside 1..=5",
                    idx + 2,
                    row.score
                )));
            }
            reviews.push(Review::from(row));
        }
        Ok(Self { reviews })
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Label every review that received votes; the rest are dropped.
    pub fn labeled(&self, policy: &LabelPolicy) -> Vec<LabeledExample> {
        let labeled: Vec<LabeledExample> = self
            .reviews
            .iter()
            .filter_map(|r| label_review(r, policy))
            .collect();
        let dropped = self.reviews.len() - labeled.len();
        if dropped > 0 {
            info!(dropped, "Dropped reviews without helpfulness votes");
        }
        if labeled.is_empty() && !self.reviews.is_empty() {
            warn!("No review in the dataset received a helpfulness vote");
        }
        labeled
    }

    pub fn stats(&self, labeled: &[LabeledExample]) -> DatasetStats {
        let helpful = labeled.iter().filter(|e| e.is_helpful).count();
        DatasetStats {
            total_reviews: self.reviews.len(),
            voted_reviews: labeled.len(),
            helpful_reviews: helpful,
            helpful_rate: if labeled.is_empty() {
                0.0
            } else {
                helpful as f64 / labeled.len() as f64
            },
        }
    }
}
