//! Review helpfulness trainer
//!
//! Offline pipeline that turns the review CSV into a gradient boosted
//! classifier: labeling, feature extraction, a reproducible histogram GBDT
//! trainer, holdout evaluation and registry export.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod evaluator;
pub mod histogram;
pub mod params;
pub mod pipeline;
pub mod split;
pub mod trainer;

pub use dataset::{DatasetStats, FeatureMatrix, ReviewDataset, REQUIRED_COLUMNS};
pub use deterministic::LcgRng;
pub use errors::TrainerError;
pub use evaluator::{evaluate, feature_importance, EvaluationReport, FeatureImportance};
pub use params::{TrainingParams, RECOGNIZED_KEYS};
pub use pipeline::{
    build_features, check_threshold, run, validation_seed, PipelineConfig, PipelineReport,
    DEFAULT_MODEL_NAME,
};
pub use trainer::{GbdtTrainer, TrainedModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
