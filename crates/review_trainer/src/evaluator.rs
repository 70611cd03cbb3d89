//! Holdout evaluation and feature importance
//!
//! Metrics are reported and attached to the saved artifact; they never
//! decide whether a model is saved.

use crate::errors::TrainerError;
use review_core::gbdt::GbdtModel;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
    pub confusion: ConfusionMatrix,
    /// Positive-class probability per evaluated row
    #[serde(skip)]
    pub probabilities: Vec<f64>,
}

impl EvaluationReport {
    /// The metric map stored in the artifact sidecar.
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("accuracy".to_string(), self.accuracy),
            ("precision".to_string(), self.precision),
            ("recall".to_string(), self.recall),
            ("f1_score".to_string(), self.f1_score),
            ("roc_auc".to_string(), self.roc_auc),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Total split gain
    pub importance: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score `features` with `model` and compare against `labels`.
pub fn evaluate(
    model: &GbdtModel,
    features: &[Vec<f64>],
    labels: &[bool],
) -> Result<EvaluationReport, TrainerError> {
    if features.is_empty() {
        return Err(TrainerError::Training("evaluation set is empty".to_string()));
    }
    if features.len() != labels.len() {
        return Err(TrainerError::Training(format!(
            "{} evaluation rows but {} labels",
            features.len(),
            labels.len()
        )));
    }

    let probabilities: Vec<f64> = features.iter().map(|r| model.predict_proba(r)).collect();
    let mut confusion = ConfusionMatrix::default();
    for (&p, &y) in probabilities.iter().zip(labels) {
        match (p >= DECISION_THRESHOLD, y) {
            (true, true) => confusion.true_positive += 1,
            (true, false) => confusion.false_positive += 1,
            (false, false) => confusion.true_negative += 1,
            (false, true) => confusion.false_negative += 1,
        }
    }

    let accuracy = ratio(
        confusion.true_positive + confusion.true_negative,
        labels.len(),
    );
    let precision = ratio(
        confusion.true_positive,
        confusion.true_positive + confusion.false_positive,
    );
    let recall = ratio(
        confusion.true_positive,
        confusion.true_positive + confusion.false_negative,
    );
    let f1_score = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    Ok(EvaluationReport {
        accuracy,
        precision,
        recall,
        f1_score,
        roc_auc: roc_auc(&probabilities, labels),
        confusion,
        probabilities,
    })
}

/// Area under the ROC curve from average ranks (ties share their rank).
///
/// 0.5 when only one class is present.
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> f64 {
    let positives = labels.iter().filter(|&&y| y).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_positive = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // ranks are 1-based; the tie group i..=j shares their mean
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if labels[idx] {
                rank_sum_positive += avg_rank;
            }
        }
        i = j + 1;
    }

    let p = positives as f64;
    (rank_sum_positive - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}

/// Total split gain per column, highest first; ties keep column order.
pub fn feature_importance(model: &GbdtModel, columns: &[String]) -> Vec<FeatureImportance> {
    let gains = model.feature_gains();
    let mut importance: Vec<FeatureImportance> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| FeatureImportance {
            feature: name.clone(),
            importance: gains.get(i).copied().unwrap_or(0.0),
        })
        .collect();
    importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    importance
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::gbdt::{Node, Tree};

    /// p = sigmoid(+-2) split on feature 0 at 0.5
    fn step_model() -> GbdtModel {
        GbdtModel::new(
            2,
            0.0,
            vec![Tree::new(vec![
                Node::internal(0, 0, 0.5, 1, 2).with_gain(7.0),
                Node::leaf(1, -2.0),
                Node::leaf(2, 2.0),
            ])],
        )
    }

    #[test]
    fn test_metrics() {
        let features = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 0.0]];
        let labels = vec![false, true, false, true];
        let report = evaluate(&step_model(), &features, &labels).unwrap();
        assert_eq!(
            report.confusion,
            ConfusionMatrix {
                true_positive: 1,
                false_positive: 1,
                true_negative: 1,
                false_negative: 1,
            }
        );
        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.precision, 0.5);
        assert_eq!(report.recall, 0.5);
        assert_eq!(report.f1_score, 0.5);
        assert_eq!(report.roc_auc, 0.5);
        assert_eq!(report.probabilities.len(), 4);
        assert_eq!(report.metrics().len(), 5);
        assert!(report.metrics().contains_key("f1_score"));
    }

    #[test]
    fn test_zero_division_yields_zero() {
        let features = vec![vec![0.0, 0.0], vec![0.0, 0.0]];
        let report = evaluate(&step_model(), &features, &[true, false]).unwrap();
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1_score, 0.0);
    }

    #[test]
    fn test_roc_auc() {
        assert_eq!(roc_auc(&[0.1, 0.4, 0.35, 0.8], &[false, false, true, true]), 0.75);
        assert_eq!(roc_auc(&[0.1, 0.9], &[false, true]), 1.0);
        assert_eq!(roc_auc(&[0.5, 0.5], &[false, true]), 0.5);
        assert_eq!(roc_auc(&[0.2, 0.7], &[true, true]), 0.5);
    }

    #[test]
    fn test_feature_importance_sorted() {
        let columns = vec!["char_count".to_string(), "word_count".to_string()];
        let importance = feature_importance(&step_model(), &columns);
        assert_eq!(importance[0].feature, "char_count");
        assert_eq!(importance[0].importance, 7.0);
        assert_eq!(importance[1].importance, 0.0);
    }

    #[test]
    fn test_rejects_empty_or_mismatched() {
        assert!(evaluate(&step_model(), &[], &[]).is_err());
        assert!(evaluate(&step_model(), &[vec![0.0, 0.0]], &[true, false]).is_err());
    }
}
