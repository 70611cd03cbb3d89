//! Gradient boosted decision tree trainer
//!
//! Binary log-loss boosting in the LightGBM manner: start from the log-odds
//! of the positive rate, then add leaf-wise histogram trees fitted to the
//! gradient `p - y` and hessian `p(1 - p)` of the current predictions. With
//! a validation split, training stops once the validation log-loss has not
//! improved for `early_stopping_rounds` rounds and the ensemble is cut back
//! to the best round.

use crate::cart::{LeafWiseBuilder, TreeConfig};
use crate::dataset::FeatureMatrix;
use crate::deterministic::{LcgRng, BAGGING_STREAM, FEATURE_STREAM};
use crate::errors::TrainerError;
use crate::histogram::BinnedMatrix;
use crate::params::TrainingParams;
use crate::split::{select, stratified_split};
use review_core::gbdt::{GbdtModel, Tree};
use tracing::{debug, info};

const PROB_EPSILON: f64 = 1e-15;
const LOG_PERIOD: usize = 20;

/// Output of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: GbdtModel,
    pub feature_columns: Vec<String>,
    /// Number of boosting rounds kept in the model
    pub best_iteration: usize,
    pub train_loss: Vec<f64>,
    /// Empty when trained without validation
    pub valid_loss: Vec<f64>,
}

pub struct GbdtTrainer {
    params: TrainingParams,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean binary log-loss of raw scores against labels.
pub fn log_loss(raw_scores: &[f64], labels: &[bool]) -> f64 {
    if raw_scores.is_empty() {
        return 0.0;
    }
    let total: f64 = raw_scores
        .iter()
        .zip(labels)
        .map(|(&raw, &y)| {
            let p = sigmoid(raw).clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
            if y {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / raw_scores.len() as f64
}

fn check_shape(features: &FeatureMatrix, labels: &[bool]) -> Result<(), TrainerError> {
    if features.rows.is_empty() {
        return Err(TrainerError::Training("training set is empty".to_string()));
    }
    if features.rows.len() != labels.len() {
        return Err(TrainerError::Training(format!(
            "{} feature rows but {} labels",
            features.rows.len(),
            labels.len()
        )));
    }
    let width = features.columns.len();
    if width == 0 {
        return Err(TrainerError::Training("no feature columns".to_string()));
    }
    if let Some(i) = features.rows.iter().position(|r| r.len() != width) {
        return Err(TrainerError::Training(format!(
            "row {i} has {} values, expected {width}",
            features.rows[i].len()
        )));
    }
    Ok(())
}

impl GbdtTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Split off a stratified validation set and fit.
    ///
    /// `validation_ratio == 0` trains for `fallback_boost_round` rounds
    /// without early stopping.
    pub fn train(
        &self,
        features: &FeatureMatrix,
        labels: &[bool],
        validation_ratio: f64,
        seed: u64,
    ) -> Result<TrainedModel, TrainerError> {
        check_shape(features, labels)?;
        if !(0.0..1.0).contains(&validation_ratio) {
            return Err(TrainerError::InvalidParameter {
                key: "validation_ratio".to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }

        if validation_ratio == 0.0 {
            return self.fit(features, labels, None);
        }
        let split = stratified_split(labels, validation_ratio, seed);
        let train_x = FeatureMatrix {
            columns: features.columns.clone(),
            rows: select(&features.rows, &split.train),
        };
        let train_y = select(labels, &split.train);
        let valid_x = FeatureMatrix {
            columns: features.columns.clone(),
            rows: select(&features.rows, &split.holdout),
        };
        let valid_y = select(labels, &split.holdout);
        info!(
            train_rows = train_y.len(),
            valid_rows = valid_y.len(),
            "Stratified validation split"
        );
        if valid_y.is_empty() {
            return self.fit(&train_x, &train_y, None);
        }
        self.fit(&train_x, &train_y, Some((&valid_x, &valid_y)))
    }

    /// Boost on prepared training data with an optional validation set.
    pub fn fit(
        &self,
        train_x: &FeatureMatrix,
        train_y: &[bool],
        valid: Option<(&FeatureMatrix, &[bool])>,
    ) -> Result<TrainedModel, TrainerError> {
        self.params.validate()?;
        check_shape(train_x, train_y)?;
        if let Some((vx, vy)) = valid {
            check_shape(vx, vy)?;
            if vx.columns != train_x.columns {
                return Err(TrainerError::Training(
                    "validation columns differ from training columns".to_string(),
                ));
            }
        }

        let n = train_y.len();
        let positives = train_y.iter().filter(|&&y| y).count();
        if positives == 0 || positives == n {
            return Err(TrainerError::Training(
                "training labels contain a single class".to_string(),
            ));
        }
        let positive_rate = positives as f64 / n as f64;
        let init_score = (positive_rate / (1.0 - positive_rate)).ln();

        let p = &self.params;
        let num_features = train_x.columns.len();
        let data = BinnedMatrix::from_rows(&train_x.rows, num_features, p.max_bin);
        let tree_config = TreeConfig {
            num_leaves: p.num_leaves,
            min_data_in_leaf: p.min_data_in_leaf,
            min_sum_hessian_in_leaf: p.min_sum_hessian_in_leaf,
            lambda_l2: p.lambda_l2,
            learning_rate: p.learning_rate,
        };
        let max_rounds = if valid.is_some() {
            p.num_boost_round
        } else {
            p.fallback_boost_round
        };
        info!(
            rows = n,
            features = num_features,
            positive_rate,
            max_rounds,
            early_stopping = valid.is_some(),
            "Starting boosting"
        );

        let mut bag_rng = LcgRng::derive(p.seed, BAGGING_STREAM);
        let mut feature_rng = LcgRng::derive(p.seed, FEATURE_STREAM);
        let use_bagging = p.bagging_freq > 0 && p.bagging_fraction < 1.0;
        let bag_size = ((n as f64 * p.bagging_fraction).round() as usize).clamp(1, n);
        let features_per_tree =
            ((num_features as f64 * p.feature_fraction).round() as usize).clamp(1, num_features);

        let mut train_scores = vec![init_score; n];
        let mut valid_scores: Vec<f64> = valid
            .map(|(_, vy)| vec![init_score; vy.len()])
            .unwrap_or_default();
        let mut gradients = vec![0.0; n];
        let mut hessians = vec![0.0; n];
        let mut bag: Vec<usize> = (0..n).collect();

        let mut trees: Vec<Tree> = Vec::with_capacity(max_rounds);
        let mut train_loss = Vec::with_capacity(max_rounds);
        let mut valid_loss = Vec::new();
        let mut best: Option<(usize, f64)> = None;

        for round in 0..max_rounds {
            for i in 0..n {
                let prob = sigmoid(train_scores[i]);
                let y = if train_y[i] { 1.0 } else { 0.0 };
                gradients[i] = prob - y;
                hessians[i] = prob * (1.0 - prob);
            }
            if use_bagging && round % p.bagging_freq == 0 {
                bag = bag_rng.sample_indices(n, bag_size);
            }
            let features = if features_per_tree < num_features {
                feature_rng.sample_indices(num_features, features_per_tree)
            } else {
                (0..num_features).collect()
            };

            let tree = LeafWiseBuilder::new(&data, &gradients, &hessians, &features, &tree_config)
                .build(bag.clone());

            for (score, row) in train_scores.iter_mut().zip(&train_x.rows) {
                *score += tree.evaluate(row);
            }
            train_loss.push(log_loss(&train_scores, train_y));

            if let Some((vx, vy)) = valid {
                for (score, row) in valid_scores.iter_mut().zip(&vx.rows) {
                    *score += tree.evaluate(row);
                }
                let loss = log_loss(&valid_scores, vy);
                valid_loss.push(loss);
                if best.map_or(true, |(_, best_loss)| loss < best_loss) {
                    best = Some((round, loss));
                }
            }
            trees.push(tree);

            if (round + 1) % LOG_PERIOD == 0 {
                match valid_loss.last() {
                    Some(v) => info!(round = round + 1, train_loss = train_loss[round], valid_loss = v, "Boosting progress"),
                    None => info!(round = round + 1, train_loss = train_loss[round], "Boosting progress"),
                }
            } else {
                debug!(round = round + 1, leaves = trees[round].num_leaves(), "Tree built");
            }

            if let Some((best_round, _)) = best {
                if round - best_round >= p.early_stopping_rounds {
                    info!(
                        round = round + 1,
                        best_iteration = best_round + 1,
                        "Early stopping"
                    );
                    break;
                }
            }
        }

        let best_iteration = best.map_or(trees.len(), |(round, _)| round + 1);
        trees.truncate(best_iteration);
        let model = GbdtModel::new(num_features, init_score, trees);
        model
            .validate()
            .map_err(|e| TrainerError::Training(format!("trained model is invalid: {e}")))?;

        info!(best_iteration, trees = model.num_trees(), "Training complete");
        Ok(TrainedModel {
            model,
            feature_columns: train_x.columns.clone(),
            best_iteration,
            train_loss,
            valid_loss,
        })
    }
}
