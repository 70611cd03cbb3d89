//! Binary log-loss GBDT model
//!
//! The raw score is `init_score` plus the sum of every tree's leaf value;
//! the probability of the positive class is its logistic sigmoid.

use super::tree::Tree;
use crate::serde_canon::{hash_canonical_hex, to_canonical_json, CanonicalError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// GBDT Model errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(#[from] CanonicalError),
}

pub const MODEL_FORMAT_VERSION: i32 = 1;
pub const BINARY_OBJECTIVE: &str = "binary";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GbdtModel {
    /// Model format version
    pub version: i32,

    /// Training objective, always "binary"
    pub objective: String,

    /// Length of the input rows the trees index into
    pub feature_count: usize,

    /// Log-odds of the training positive rate
    pub init_score: f64,

    pub trees: Vec<Tree>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl GbdtModel {
    pub fn new(feature_count: usize, init_score: f64, trees: Vec<Tree>) -> Self {
        Self {
            version: MODEL_FORMAT_VERSION,
            objective: BINARY_OBJECTIVE.to_string(),
            feature_count,
            init_score,
            trees,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }
        if self.objective != BINARY_OBJECTIVE {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported objective: {}",
                self.objective
            )));
        }
        if self.feature_count == 0 {
            return Err(ModelError::ValidationFailed(
                "Model declares no features".to_string(),
            ));
        }
        if !self.init_score.is_finite() {
            return Err(ModelError::ValidationFailed(format!(
                "Invalid init_score: {}",
                self.init_score
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count).map_err(|e| {
                ModelError::ValidationFailed(format!("Tree {i} validation failed: {e}"))
            })?;
        }
        Ok(())
    }

    /// Raw additive score (log-odds)
    pub fn raw_score(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.init_score, |acc, tree| acc + tree.evaluate(features))
    }

    /// Probability of the positive class, in [0, 1]
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.raw_score(features))
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Split gain summed per feature index over all trees.
    pub fn feature_gains(&self) -> Vec<f64> {
        let mut gains = vec![0.0; self.feature_count];
        for node in self.trees.iter().flat_map(|t| t.nodes.iter()) {
            if node.is_leaf() {
                continue;
            }
            if let Some(slot) = gains.get_mut(node.feature_idx as usize) {
                *slot += node.gain;
            }
        }
        gains
    }

    /// Serialize model to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 hash of the canonical JSON, as hex
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(hash_canonical_hex(self)?)
    }

    /// Parse and validate a model from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: GbdtModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Save model to JSON file with canonical serialization
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        self.validate()?;
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load model from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
