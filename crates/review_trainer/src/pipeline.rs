//! End-to-end training run
//!
//! CSV → labels → normalized text → features → stratified test split →
//! boosting → holdout evaluation → registry artifact.

use crate::dataset::{DatasetStats, FeatureMatrix, ReviewDataset};
use crate::deterministic::{derive_seed, VALIDATION_SPLIT_STREAM};
use crate::errors::TrainerError;
use crate::evaluator::{evaluate, feature_importance, EvaluationReport, FeatureImportance};
use crate::params::TrainingParams;
use crate::split::{select, stratified_split};
use crate::trainer::GbdtTrainer;
use review_core::features::{FeatureExtractor, FeatureSchema};
use review_core::labels::LabelPolicy;
use review_core::normalize::normalize;
use review_core::types::LabeledExample;
use review_registry::{ArtifactId, ModelRegistry};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_MODEL_NAME: &str = "review_helpfulness_model";

/// Reject helpfulness thresholds outside (0, 1], NaN included.
pub fn check_threshold(threshold: f64) -> Result<(), TrainerError> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(TrainerError::InvalidParameter {
            key: "threshold".to_string(),
            reason: format!("{threshold} is not in (0, 1]"),
        })
    }
}

/// Seed of the early-stopping split inside the training rows, kept apart
/// from the seed of the test split.
pub fn validation_seed(seed: u64) -> u64 {
    derive_seed(seed, VALIDATION_SPLIT_STREAM)
}

/// Everything a training run needs besides the extractor.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub models_dir: PathBuf,
    pub model_name: String,
    /// Cap on CSV rows read
    pub limit: Option<usize>,
    pub label_policy: LabelPolicy,
    /// Share of labeled rows held out for evaluation
    pub test_size: f64,
    /// Share of the training rows used for early stopping (0 disables it)
    pub validation_ratio: f64,
    pub params: TrainingParams,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            models_dir: models_dir.into(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            limit: None,
            label_policy: LabelPolicy::default(),
            test_size: 0.2,
            validation_ratio: 0.2,
            params: TrainingParams::default(),
        }
    }
}

/// Summary of a finished run, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub artifact_id: ArtifactId,
    pub dataset: DatasetStats,
    pub train_rows: usize,
    pub test_rows: usize,
    pub best_iteration: usize,
    pub evaluation: EvaluationReport,
    pub importance: Vec<FeatureImportance>,
}

/// Feature rows in `columns` order for each labeled example.
///
/// Text goes through the same normalization the service applies; the score
/// is passed to the extractor but only reaches the model if `columns`
/// names it.
pub fn build_features(
    extractor: &FeatureExtractor,
    examples: &[LabeledExample],
    columns: &[String],
) -> Result<(FeatureMatrix, Vec<bool>), TrainerError> {
    let mut rows = Vec::with_capacity(examples.len());
    let mut labels = Vec::with_capacity(examples.len());
    for example in examples {
        let review = &example.review;
        let text = normalize(review.summary.as_deref(), review.text.as_deref());
        let projection = extractor.extract(&text, Some(review.score)).project(columns);
        if !projection.missing.is_empty() {
            return Err(TrainerError::Training(format!(
                "extractor does not produce columns: {}",
                projection.missing.join(", ")
            )));
        }
        rows.push(projection.values);
        labels.push(example.is_helpful);
    }
    Ok((
        FeatureMatrix {
            columns: columns.to_vec(),
            rows,
        },
        labels,
    ))
}

/// Run the whole pipeline and save the resulting artifact.
pub fn run(
    config: &PipelineConfig,
    extractor: &FeatureExtractor,
) -> Result<PipelineReport, TrainerError> {
    if !(config.test_size > 0.0 && config.test_size < 1.0) {
        return Err(TrainerError::InvalidParameter {
            key: "test_size".to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }
    check_threshold(config.label_policy.threshold)?;
    config.params.validate()?;

    let dataset = ReviewDataset::from_csv(&config.input, config.limit)?;
    let labeled = dataset.labeled(&config.label_policy);
    let stats = dataset.stats(&labeled);
    info!(
        total = stats.total_reviews,
        voted = stats.voted_reviews,
        helpful = stats.helpful_reviews,
        helpful_rate = stats.helpful_rate,
        threshold = config.label_policy.threshold,
        "Labeled dataset"
    );
    if labeled.is_empty() {
        return Err(TrainerError::Dataset(
            "no reviews with helpfulness votes".to_string(),
        ));
    }

    let columns = FeatureSchema::MODEL_V1.column_names();
    let (features, labels) = build_features(extractor, &labeled, &columns)?;
    info!(
        rows = features.rows.len(),
        schema = FeatureSchema::MODEL_V1.version,
        columns = columns.len(),
        "Extracted features"
    );

    let seed = config.params.seed;
    let split = stratified_split(&labels, config.test_size, seed);
    let train_x = FeatureMatrix {
        columns: columns.clone(),
        rows: select(&features.rows, &split.train),
    };
    let train_y = select(&labels, &split.train);
    let test_x = select(&features.rows, &split.holdout);
    let test_y = select(&labels, &split.holdout);
    info!(
        train_rows = train_y.len(),
        test_rows = test_y.len(),
        "Stratified test split"
    );

    let trainer = GbdtTrainer::new(config.params.clone());
    let trained = trainer.train(
        &train_x,
        &train_y,
        config.validation_ratio,
        validation_seed(seed),
    )?;

    let evaluation = evaluate(&trained.model, &test_x, &test_y)?;
    info!(
        accuracy = evaluation.accuracy,
        precision = evaluation.precision,
        recall = evaluation.recall,
        f1_score = evaluation.f1_score,
        roc_auc = evaluation.roc_auc,
        "Holdout evaluation"
    );
    if evaluation.roc_auc < 0.5 {
        warn!(roc_auc = evaluation.roc_auc, "Model ranks worse than chance on the holdout");
    }

    let importance = feature_importance(&trained.model, &trained.feature_columns);
    for entry in importance.iter().take(5) {
        info!(feature = %entry.feature, gain = entry.importance, "Top feature");
    }

    let registry = ModelRegistry::open(&config.models_dir, &config.model_name)?;
    let artifact_id = registry.save(
        &trained.model,
        &trained.feature_columns,
        &evaluation.metrics(),
    )?;

    Ok(PipelineReport {
        artifact_id,
        dataset: stats,
        train_rows: train_y.len(),
        test_rows: test_y.len(),
        best_iteration: trained.best_iteration,
        evaluation,
        importance,
    })
}
