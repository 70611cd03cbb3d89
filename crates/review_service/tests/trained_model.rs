//! Predictions from models produced by the training pipeline, plus the
//! suggestion rules on a long review.

use review_core::{EmbeddedLexicons, FeatureExtractor, FeatureName, FeatureSchema, GbdtModel};
use review_registry::ModelRegistry;
use review_service::suggestions::{ADD_STRUCTURE, PRAISE, TOO_SHORT};
use review_service::{PredictionService, ServingContext};
use review_trainer::{run, LcgRng, PipelineConfig, TrainingParams, DEFAULT_MODEL_NAME};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const DETAILED: &[&str] = &[
    "I tried this coffee for three weeks and compared it to the brand I usually buy.",
    "The flavor is richer, the texture is smooth and the price is fair for the size.",
    "My family drinks it every morning and my daughter even prefers it over tea.",
    "After a month the bag still smells fresh because the seal is very good.",
    "Specifically the dark roast works better than the medium one in a french press.",
    "I would recommend it to anyone who wants a strong cup without bitterness.",
];

const TERSE: &[&str] = &["Great!", "Love it!!", "Yummy", "ok", "bad stuff", "Tasty!"];

const LONG_REVIEW: &str = "I have been brewing this dark roast coffee every morning for about four months now, \
and it has quietly become the highlight of my daily routine before work. The beans arrive in a sturdy \
resealable bag with a one way valve, which keeps them fragrant and oily for weeks after opening, even in \
our humid kitchen. Ground medium fine for my french press, they produce a rich, full bodied cup with notes \
of cocoa, toasted almond and a gentle hint of cherry on the finish that lingers pleasantly after each sip. \
There is almost no bitterness, even when I forget the timer and let it steep an extra minute while packing \
lunches for the kids. My husband, who usually drinks green tea, now asks for a mug on weekends and says it \
tastes smoother than anything from our local cafe downtown, where a single latte costs nearly as much as \
half a bag. Compared with the supermarket brand we bought before, this roast is fresher, more aromatic and \
noticeably less acidic on the stomach, which matters to both of us. The price per pound is slightly \
higher, yet the flavor easily justifies spending a few extra dollars each month on something we enjoy \
every single day. I also tried it as cold brew during a hot week in July, steeping a coarse grind \
overnight in the fridge, and the result was sweet, mellow and wonderfully refreshing over ice with a \
splash of oat milk. Shipping was fast, the package arrived undamaged, and customer service answered my \
question about roast dates within a single afternoon, politely and with real detail. Overall I would \
happily recommend this excellent coffee to anyone who enjoys a bold but balanced cup without harsh edges, \
and I have already ordered two more bags as gifts for friends and neighbors.";

/// Reviews where long, specific text earns helpful votes and short
/// exclamations do not, with a little label noise.
fn write_reviews(path: &Path, rows: usize, seed: u64) {
    let mut rng = LcgRng::new(seed);
    let mut out = String::from(
        "Id,ProductId,UserId,HelpfulnessNumerator,HelpfulnessDenominator,Score,Time,Summary,Text\n",
    );
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
        let (num, den) = if detailed != noisy { (9, 10) } else { (1, 10) };
        // short reviews rate high just as often, so stars cannot stand in for text
        let score = 1 + rng.next_below(5);
        writeln!(
            out,
            "{},B{:04},U{i:05},{num},{den},{score},{},Coffee,\"{text}\"",
            i + 1,
            i % 25,
            1_300_000_000 + i as i64 * 60,
        )
        .unwrap();
    }
    std::fs::write(path, out).unwrap();
}

fn extractor() -> FeatureExtractor {
    FeatureExtractor::from_loader(&EmbeddedLexicons).unwrap()
}

fn serve(dir: &Path) -> PredictionService {
    let registry = ModelRegistry::open(dir, DEFAULT_MODEL_NAME).unwrap();
    let context = Arc::new(ServingContext::new(registry));
    context.reload().unwrap();
    PredictionService::new(extractor(), context)
}

fn trained_service() -> (TempDir, PredictionService) {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("reviews.csv");
    write_reviews(&csv, 400, 21);

    let models = dir.path().join("models");
    let mut config = PipelineConfig::new(&csv, &models);
    config.params = TrainingParams {
        num_boost_round: 60,
        fallback_boost_round: 40,
        early_stopping_rounds: 10,
        learning_rate: 0.2,
        ..TrainingParams::default()
    };
    run(&config, &extractor()).unwrap();
    let service = serve(&models);
    (dir, service)
}

#[test]
fn test_trained_model_rates_short_enthusiastic_review_unhelpful() {
    let (_dir, service) = trained_service();

    let short = service.predict("Excellent! Works perfectly.", 5).unwrap();
    assert!(short.probability < 0.5, "p = {}", short.probability);
    assert!(!short.is_helpful);
    assert_eq!(short.suggestions[0], TOO_SHORT);
    assert!(short.suggestions.contains(&ADD_STRUCTURE.to_string()));
    assert!(!short.suggestions.contains(&PRAISE.to_string()));

    // strong sentiment and a five-star score do not reach the model
    let one_star = service.predict("Excellent! Works perfectly.", 1).unwrap();
    assert_eq!(one_star.probability, short.probability);
    assert!(short.features.value_or_zero(FeatureName::VaderCompound) > 0.5);

    let detailed = service.predict(&DETAILED.join(" "), 3).unwrap();
    assert!(detailed.probability > 0.5, "p = {}", detailed.probability);
    assert!(detailed.probability > short.probability);
}

#[test]
fn test_long_balanced_review_gets_praise_only() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::open(dir.path(), DEFAULT_MODEL_NAME).unwrap();
    let columns = FeatureSchema::MODEL_V1.column_names();
    // no trees: every row scores sigmoid(2.0) ~ 0.88
    let confident = GbdtModel::new(columns.len(), 2.0, Vec::new());
    registry.save(&confident, &columns, &BTreeMap::new()).unwrap();
    let service = serve(dir.path());

    let result = service.predict(LONG_REVIEW, 5).unwrap();
    assert!(result.probability > 0.7);
    assert!(result.features.value_or_zero(FeatureName::WordCount) >= 300.0);
    assert_eq!(result.features.get(FeatureName::SentenceCount), Some(10.0));
    assert!(result.features.value_or_zero(FeatureName::LexicalDiversity) >= 0.5);
    assert_eq!(result.suggestions, vec![PRAISE.to_string()]);
}
