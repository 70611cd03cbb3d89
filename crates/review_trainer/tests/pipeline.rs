//! End-to-end training on a synthetic review CSV.

use review_core::features::sentiment::EmbeddedLexicons;
use review_core::normalize::normalize;
use review_core::FeatureExtractor;
use review_registry::{ArtifactRef, ModelRegistry};
use review_trainer::split::stratified_split;
use review_trainer::{
    build_features, run, LcgRng, PipelineConfig, ReviewDataset, TrainerError, TrainingParams,
};
use std::path::Path;

const DETAILED: &[&str] = &[
    "I tried this coffee for three weeks and compared it to the brand I usually buy.",
    "The flavor is richer, the texture is smooth and the price is fair for the size.",
    "My family drinks it every morning and my daughter even prefers it over tea.",
    "After a month the bag still smells fresh because the seal is very good.",
    "Specifically the dark roast works better than the medium one in a french press.",
    "I would recommend it to anyone who wants a strong cup without bitterness.",
];

const TERSE: &[&str] = &["Great!", "bad stuff", "ok", "Love it!!", "meh", "Yummy"];

fn write_csv(path: &Path, rows: usize, seed: u64) {
    let mut rng = LcgRng::new(seed);
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer
        .write_record([
            "Id",
            "ProductId",
            "UserId",
            "ProfileName",
            "HelpfulnessNumerator",
            "HelpfulnessDenominator",
            "Score",
            "Time",
            "Summary",
            "Text",
        ])
        .unwrap();
    for i in 0..rows {
        let detailed = rng.next_f64() < 0.5;
        let noisy = rng.next_f64() < 0.05;
        let text = if detailed {
            let n = 3 + rng.next_below(DETAILED.len() - 2);
            let start = rng.next_below(DETAILED.len());
            (0..n)
                .map(|k| DETAILED[(start + k) % DETAILED.len()])
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            TERSE[rng.next_below(TERSE.len())].to_string()
        };
        let helpful = detailed != noisy;
        let (num, den) = match i % 17 {
            0 => (0, 0),
            _ if helpful => (8, 10),
            _ => (1, 10),
        };
        let score = 1 + rng.next_below(5);
        writer
            .write_record([
                (i + 1).to_string(),
                format!("B{:05}", i % 40),
                format!("U{i:06}"),
                "reviewer".to_string(),
                num.to_string(),
                den.to_string(),
                score.to_string(),
                (1_300_000_000 + i as i64 * 3600).to_string(),
                "Coffee".to_string(),
                text,
            ])
            .unwrap();
    }
    writer.flush().unwrap();
}

fn quick_params() -> TrainingParams {
    TrainingParams {
        num_boost_round: 60,
        fallback_boost_round: 40,
        early_stopping_rounds: 10,
        learning_rate: 0.2,
        ..TrainingParams::default()
    }
}

fn extractor() -> FeatureExtractor {
    FeatureExtractor::from_loader(&EmbeddedLexicons).unwrap()
}

#[test]
fn test_pipeline_trains_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("reviews.csv");
    write_csv(&csv, 400, 7);

    let mut config = PipelineConfig::new(&csv, dir.path().join("models"));
    config.params = quick_params();
    let report = run(&config, &extractor()).unwrap();

    assert_eq!(report.dataset.total_reviews, 400);
    assert!(report.dataset.voted_reviews < 400);
    assert!(report.evaluation.accuracy > 0.8);
    assert!(report.evaluation.roc_auc > 0.8);
    assert_eq!(report.importance.len(), 14);

    let registry = ModelRegistry::open(dir.path().join("models"), "review_helpfulness_model")
        .unwrap();
    let artifact = registry.load(&ArtifactRef::Latest).unwrap();
    assert_eq!(artifact.id, report.artifact_id);
    assert_eq!(artifact.metadata.feature_columns.len(), 14);
    assert_eq!(
        artifact.metadata.metrics.get("roc_auc"),
        Some(&report.evaluation.roc_auc)
    );
}

#[test]
fn test_registry_model_reproduces_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("reviews.csv");
    write_csv(&csv, 300, 11);

    let mut config = PipelineConfig::new(&csv, dir.path().join("models"));
    config.params = quick_params();
    let extractor = extractor();
    let report = run(&config, &extractor).unwrap();

    let artifact = ModelRegistry::open(dir.path().join("models"), &config.model_name)
        .unwrap()
        .load(&ArtifactRef::Latest)
        .unwrap();

    // rebuild the holdout rows the way the pipeline did
    let dataset = ReviewDataset::from_csv(&csv, None).unwrap();
    let labeled = dataset.labeled(&config.label_policy);
    let (_, labels) = build_features(&extractor, &labeled, &artifact.metadata.feature_columns)
        .unwrap();
    let split = stratified_split(&labels, config.test_size, config.params.seed);
    assert_eq!(split.holdout.len(), report.evaluation.probabilities.len());

    for (i, &row) in split.holdout.iter().enumerate() {
        let review = &labeled[row].review;
        let text = normalize(review.summary.as_deref(), review.text.as_deref());
        let values = extractor
            .extract(&text, Some(review.score))
            .project(&artifact.metadata.feature_columns)
            .values;
        assert_eq!(
            artifact.model.predict_proba(&values),
            report.evaluation.probabilities[i]
        );
    }
}

#[test]
fn test_training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("reviews.csv");
    write_csv(&csv, 250, 3);
    let extractor = extractor();

    let mut hashes = Vec::new();
    for run_dir in ["a", "b"] {
        let mut config = PipelineConfig::new(&csv, dir.path().join(run_dir));
        config.params = quick_params();
        run(&config, &extractor).unwrap();
        let artifact = ModelRegistry::open(dir.path().join(run_dir), &config.model_name)
            .unwrap()
            .load(&ArtifactRef::Latest)
            .unwrap();
        hashes.push(artifact.metadata.model_hash);
    }
    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn test_dataset_without_votes_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("reviews.csv");
    std::fs::write(
        &csv,
        "ProductId,UserId,Score,Time,Summary,Text,HelpfulnessNumerator,HelpfulnessDenominator\n\
         B1,U1,5,0,Nice,Tasty snack for the road,0,0\n",
    )
    .unwrap();
    let config = PipelineConfig::new(&csv, dir.path().join("models"));
    assert!(matches!(
        run(&config, &extractor()),
        Err(TrainerError::Dataset(_))
    ));
}

#[test]
fn test_invalid_test_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::new(dir.path().join("missing.csv"), dir.path());
    config.test_size = 0.0;
    assert!(matches!(
        run(&config, &extractor()),
        Err(TrainerError::InvalidParameter { .. })
    ));
}

#[test]
fn test_invalid_threshold_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("reviews.csv");
    write_csv(&csv, 50, 5);
    for threshold in [f64::NAN, 1.2] {
        let mut config = PipelineConfig::new(&csv, dir.path().join("models"));
        config.label_policy.threshold = threshold;
        assert!(matches!(
            run(&config, &extractor()),
            Err(TrainerError::InvalidParameter { .. })
        ));
    }
    assert!(!dir.path().join("models").exists());
}
