//! Review helpfulness trainer CLI
//!
//! Trains a model from the review CSV and saves it to the registry.

use anyhow::{Context, Result};
use clap::Parser;
use review_core::features::sentiment::{DirectoryLexicons, EmbeddedLexicons, LexiconLoader};
use review_core::{FeatureExtractor, LabelPolicy};
use review_trainer::{check_threshold, run, PipelineConfig, TrainingParams, DEFAULT_MODEL_NAME};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "review-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the review helpfulness model", long_about = None)]
struct Args {
    /// Review CSV (Amazon fine-food export)
    #[arg(short, long)]
    input: PathBuf,

    /// Registry directory for saved artifacts
    #[arg(short, long, default_value = "models")]
    models_dir: PathBuf,

    /// Artifact name inside the registry
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    name: String,

    /// Read at most this many CSV rows
    #[arg(long)]
    limit: Option<usize>,

    /// Helpful-vote share needed for a positive label, in (0, 1]
    #[arg(long, default_value = "0.7", value_parser = parse_threshold)]
    threshold: f64,

    /// Share of labeled rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Share of training rows used for early stopping; 0 disables it
    #[arg(long, default_value = "0.2")]
    validation_ratio: f64,

    /// Seed for splits, bagging and feature sampling
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with boosting parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Parameter override, e.g. `--param num_leaves=63` (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Load sentiment lexicons from this directory instead of the built-in ones
    #[arg(long)]
    lexicon_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let threshold: f64 = raw.parse().map_err(|e| format!("{raw:?}: {e}"))?;
    check_threshold(threshold).map_err(|e| e.to_string())?;
    Ok(threshold)
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))
}

fn load_params(args: &Args) -> Result<TrainingParams> {
    let mut params = match &args.params {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            TrainingParams::from_toml_str(&contents)
                .with_context(|| format!("Invalid parameter file {}", path.display()))?
        }
        None => TrainingParams::default(),
    };
    params
        .apply_overrides(&args.overrides)
        .context("Invalid --param override")?;
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    params.validate().context("Invalid training parameters")?;
    Ok(params)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!(version = review_trainer::VERSION, "Review helpfulness trainer");

    let params = load_params(&args)?;
    let loader: Box<dyn LexiconLoader> = match &args.lexicon_dir {
        Some(dir) => Box::new(DirectoryLexicons::new(dir)),
        None => Box::new(EmbeddedLexicons),
    };
    let extractor =
        FeatureExtractor::from_loader(loader.as_ref()).context("Failed to load lexicons")?;

    let config = PipelineConfig {
        input: args.input.clone(),
        models_dir: args.models_dir.clone(),
        model_name: args.name.clone(),
        limit: args.limit,
        label_policy: LabelPolicy {
            threshold: args.threshold,
        },
        test_size: args.test_size,
        validation_ratio: args.validation_ratio,
        params,
    };

    let report = run(&config, &extractor).context("Training run failed")?;
    info!(
        artifact = %report.artifact_id,
        dir = %config.models_dir.display(),
        "Training completed"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to render report")?
    );
    Ok(())
}
