//! Prediction over the currently served artifact
//!
//! [`ServingContext`] owns the swappable model. Each request takes an
//! `Arc` snapshot under a short read lock and works on it without holding
//! the lock, so a reload never blocks or tears an in-flight prediction.

use crate::confidence::Confidence;
use crate::errors::{Result, ServiceError};
use crate::suggestions::suggestions;
use parking_lot::RwLock;
use review_core::{normalize_text, FeatureExtractor, FeatureName, FeatureVector, GbdtModel};
use review_registry::{ArtifactId, ArtifactMetadata, ArtifactRef, ModelArtifact, ModelRegistry};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const MIN_TEXT_CHARS: usize = 10;
pub const HELPFUL_CUTOFF: f64 = 0.5;

/// An artifact ready to serve.
#[derive(Debug)]
pub struct LoadedModel {
    pub id: ArtifactId,
    pub model: GbdtModel,
    pub metadata: ArtifactMetadata,
    pub model_path: PathBuf,
    /// Declared columns the extractor never produces; always fed as 0.0
    pub unknown_columns: Vec<String>,
}

impl LoadedModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        let unknown_columns: Vec<String> = artifact
            .metadata
            .feature_columns
            .iter()
            .filter(|c| FeatureName::from_str(c).is_err())
            .cloned()
            .collect();
        if !unknown_columns.is_empty() {
            warn!(
                id = %artifact.id,
                columns = ?unknown_columns,
                "Artifact declares columns the extractor does not produce; they will be 0.0"
            );
        }
        Self {
            id: artifact.id,
            model: artifact.model,
            metadata: artifact.metadata,
            model_path: artifact.model_path,
            unknown_columns,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.metadata.feature_columns
    }
}

/// Holder of the model currently being served.
#[derive(Debug)]
pub struct ServingContext {
    registry: ModelRegistry,
    current: RwLock<Option<Arc<LoadedModel>>>,
}

impl ServingContext {
    /// A context with no model loaded yet.
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            current: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// The served model, if any.
    pub fn snapshot(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }

    /// Swap in `artifact` and return the new snapshot.
    pub fn install(&self, artifact: ModelArtifact) -> Arc<LoadedModel> {
        let loaded = Arc::new(LoadedModel::from_artifact(artifact));
        let previous = self.current.write().replace(Arc::clone(&loaded));
        info!(
            id = %loaded.id,
            previous = ?previous.as_ref().map(|m| m.id.to_string()),
            features = loaded.feature_columns().len(),
            "Serving model"
        );
        loaded
    }

    /// Load "latest" from the registry and swap it in.
    ///
    /// On failure the previously served model, if any, stays in place.
    pub fn reload(&self) -> Result<Arc<LoadedModel>> {
        let artifact = self.registry.load(&ArtifactRef::Latest)?;
        Ok(self.install(artifact))
    }
}

/// Prediction before response formatting.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub probability: f64,
    pub is_helpful: bool,
    pub confidence: Confidence,
    pub features: FeatureVector,
    pub suggestions: Vec<String>,
    pub model_id: ArtifactId,
}

/// JSON body of a prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub is_helpful_probability: f64,
    pub is_helpful: bool,
    pub confidence: Confidence,
    pub features: FeatureVector,
    pub suggestions: Vec<String>,
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            is_helpful_probability: round4(result.probability),
            is_helpful: result.is_helpful,
            confidence: result.confidence,
            features: result.features,
            suggestions: result.suggestions,
        }
    }
}

/// Validates requests and scores them with the served model.
#[derive(Debug, Clone)]
pub struct PredictionService {
    extractor: FeatureExtractor,
    context: Arc<ServingContext>,
}

impl PredictionService {
    pub fn new(extractor: FeatureExtractor, context: Arc<ServingContext>) -> Self {
        Self { extractor, context }
    }

    pub fn context(&self) -> &Arc<ServingContext> {
        &self.context
    }

    pub fn predict(&self, text: &str, score: i64) -> Result<PredictionResult> {
        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(ServiceError::Validation(format!(
                "text must be at least {MIN_TEXT_CHARS} characters"
            )));
        }
        let score = u8::try_from(score)
            .ok()
            .filter(|s| (1..=5).contains(s))
            .ok_or_else(|| {
                ServiceError::Validation(format!("score must be between 1 and 5, got {score}"))
            })?;

        let loaded = self.context.snapshot().ok_or_else(|| {
            ServiceError::ServiceUnavailable(
                "no model loaded; train one and reload".to_string(),
            )
        })?;

        let normalized = normalize_text(text);
        let features = self.extractor.extract(&normalized, Some(score));
        let projection = features.project(loaded.feature_columns());
        if !projection.missing.is_empty() {
            warn!(
                id = %loaded.id,
                columns = ?projection.missing,
                "Model columns missing from extracted features, using 0.0"
            );
        }

        let probability = loaded.model.predict_proba(&projection.values);
        if !probability.is_finite() {
            return Err(ServiceError::Internal(format!(
                "model {} produced a non-finite probability",
                loaded.id
            )));
        }
        let confidence = Confidence::from_probability(probability);
        let suggestions = suggestions(&features, probability);
        debug!(id = %loaded.id, probability, %confidence, "Scored review");

        Ok(PredictionResult {
            probability,
            is_helpful: probability >= HELPFUL_CUTOFF,
            confidence,
            features,
            suggestions,
            model_id: loaded.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestions::TOO_SHORT;
    use chrono::{Duration, Utc};
    use review_core::{EmbeddedLexicons, FeatureSchema, Node, Tree};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    /// Positive when word_count > 10.
    fn word_count_model(columns: &[String]) -> GbdtModel {
        let idx = columns
            .iter()
            .position(|c| c == "word_count")
            .unwrap_or(0) as i32;
        GbdtModel::new(
            columns.len(),
            0.0,
            vec![Tree::new(vec![
                Node::internal(0, idx, 10.5, 1, 2),
                Node::leaf(1, -3.0),
                Node::leaf(2, 3.0),
            ])],
        )
    }

    fn service_with(columns: Vec<String>) -> (TempDir, PredictionService) {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(dir.path(), "review_model").unwrap();
        registry
            .save(&word_count_model(&columns), &columns, &BTreeMap::new())
            .unwrap();
        let context = Arc::new(ServingContext::new(registry));
        context.reload().unwrap();
        let extractor = FeatureExtractor::from_loader(&EmbeddedLexicons).unwrap();
        (dir, PredictionService::new(extractor, context))
    }

    fn schema_service() -> (TempDir, PredictionService) {
        service_with(FeatureSchema::MODEL_V1.column_names())
    }

    const DETAILED: &str = "I bought this kettle last spring and use it twice a day. \
        It boils a full litre quickly, the handle stays cool, and the lid opens wide. \
        Compared to my old one it is quieter. I would happily recommend it to friends.";

    #[test]
    fn test_validation() {
        let (_dir, service) = schema_service();
        assert!(matches!(
            service.predict("too short", 3),
            Err(ServiceError::Validation(_))
        ));
        for score in [0, 6, -1, 300] {
            assert!(matches!(
                service.predict(DETAILED, score),
                Err(ServiceError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_unavailable_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::open(dir.path(), "review_model").unwrap();
        let context = Arc::new(ServingContext::new(registry));
        assert!(context.reload().is_err());
        let extractor = FeatureExtractor::from_loader(&EmbeddedLexicons).unwrap();
        let service = PredictionService::new(extractor, context);
        assert!(matches!(
            service.predict(DETAILED, 4),
            Err(ServiceError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_prediction_fields() {
        let (_dir, service) = schema_service();
        let result = service.predict(DETAILED, 5).unwrap();
        assert!((0.0..=1.0).contains(&result.probability));
        assert_eq!(result.is_helpful, result.probability >= 0.5);
        assert!(result.is_helpful);
        assert_eq!(result.confidence, Confidence::High);
        assert!(result.features.contains(FeatureName::StarScore));

        let short = service.predict("Good stuff.", 5).unwrap();
        assert!(!short.is_helpful);
        assert_eq!(short.suggestions[0], TOO_SHORT);
    }

    #[test]
    fn test_unknown_column_predicts_with_zero() {
        let mut columns = FeatureSchema::MODEL_V1.column_names();
        columns.push("reviewer_reputation".to_string());
        let (_dir, service) = service_with(columns);
        let loaded = service.context().snapshot().unwrap();
        assert_eq!(loaded.unknown_columns, vec!["reviewer_reputation".to_string()]);
        assert!(service.predict(DETAILED, 4).is_ok());
    }

    #[test]
    fn test_response_rounds_probability() {
        let (_dir, service) = schema_service();
        let mut result = service.predict(DETAILED, 5).unwrap();
        result.probability = 0.123456;
        let response = PredictionResponse::from(result);
        assert_eq!(response.is_helpful_probability, 0.1235);
    }

    #[test]
    fn test_reload_swaps_snapshot() {
        let (_dir, service) = schema_service();
        let before = service.context().snapshot().unwrap();

        let columns = vec!["word_count".to_string()];
        service
            .context()
            .registry()
            .save_at(
                &word_count_model(&columns),
                &columns,
                &BTreeMap::new(),
                Utc::now() + Duration::days(1),
            )
            .unwrap();
        let after = service.context().reload().unwrap();
        assert_ne!(before.id, after.id);
        assert_eq!(after.feature_columns().len(), 1);
        // the old snapshot is still usable by whoever holds it
        assert_eq!(before.feature_columns().len(), 14);
        assert!(service.predict(DETAILED, 3).unwrap().is_helpful);
    }
}
