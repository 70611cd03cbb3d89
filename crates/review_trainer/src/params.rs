//! Boosting hyper-parameters
//!
//! Defaults mirror a LightGBM binary classifier. Parameters can be read
//! from a TOML table or overridden with `key=value` pairs; only the keys in
//! [`RECOGNIZED_KEYS`] are accepted.

use crate::errors::TrainerError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const RECOGNIZED_KEYS: &[&str] = &[
    "num_leaves",
    "learning_rate",
    "feature_fraction",
    "bagging_fraction",
    "bagging_freq",
    "num_boost_round",
    "early_stopping_rounds",
    "fallback_boost_round",
    "min_data_in_leaf",
    "min_sum_hessian_in_leaf",
    "lambda_l2",
    "max_bin",
    "seed",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrainingParams {
    /// Maximum leaves per tree
    pub num_leaves: usize,
    pub learning_rate: f64,
    /// Share of features considered by each tree
    pub feature_fraction: f64,
    /// Share of rows used by each tree
    pub bagging_fraction: f64,
    /// Redraw the row bag every this many rounds (0 disables bagging)
    pub bagging_freq: usize,
    /// Round limit when a validation split is present
    pub num_boost_round: usize,
    pub early_stopping_rounds: usize,
    /// Rounds trained when there is no validation split
    pub fallback_boost_round: usize,
    pub min_data_in_leaf: usize,
    pub min_sum_hessian_in_leaf: f64,
    pub lambda_l2: f64,
    /// Histogram bins per feature
    pub max_bin: usize,
    /// Seed for bagging and feature subsampling
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            num_leaves: 31,
            learning_rate: 0.05,
            feature_fraction: 0.9,
            bagging_fraction: 0.8,
            bagging_freq: 5,
            num_boost_round: 200,
            early_stopping_rounds: 20,
            fallback_boost_round: 100,
            min_data_in_leaf: 20,
            min_sum_hessian_in_leaf: 1e-3,
            lambda_l2: 0.0,
            max_bin: 255,
            seed: 42,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, TrainerError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| TrainerError::InvalidParameter {
            key: key.to_string(),
            reason: format!("{raw:?}: {e}"),
        })
}

fn invalid(key: &str, reason: &str) -> TrainerError {
    TrainerError::InvalidParameter {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

impl TrainingParams {
    /// Parse a TOML table of parameters; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, TrainerError> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e: toml::de::Error| invalid("<toml>", &e.to_string()))?;
        if let Some(unknown) = table
            .keys()
            .find(|k| !RECOGNIZED_KEYS.contains(&k.as_str()))
        {
            return Err(TrainerError::UnknownParameter(unknown.clone()));
        }
        let params: TrainingParams = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| invalid("<toml>", &e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Set one parameter from its textual value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), TrainerError> {
        match key {
            "num_leaves" => self.num_leaves = parse_value(key, value)?,
            "learning_rate" => self.learning_rate = parse_value(key, value)?,
            "feature_fraction" => self.feature_fraction = parse_value(key, value)?,
            "bagging_fraction" => self.bagging_fraction = parse_value(key, value)?,
            "bagging_freq" => self.bagging_freq = parse_value(key, value)?,
            "num_boost_round" => self.num_boost_round = parse_value(key, value)?,
            "early_stopping_rounds" => self.early_stopping_rounds = parse_value(key, value)?,
            "fallback_boost_round" => self.fallback_boost_round = parse_value(key, value)?,
            "min_data_in_leaf" => self.min_data_in_leaf = parse_value(key, value)?,
            "min_sum_hessian_in_leaf" => self.min_sum_hessian_in_leaf = parse_value(key, value)?,
            "lambda_l2" => self.lambda_l2 = parse_value(key, value)?,
            "max_bin" => self.max_bin = parse_value(key, value)?,
            "seed" => self.seed = parse_value(key, value)?,
            other => return Err(TrainerError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Apply `key=value` overrides in order, then validate.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<(), TrainerError> {
        for raw in overrides {
            let raw = raw.as_ref();
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| invalid(raw, "expected key=value"))?;
            self.set(key.trim(), value)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        let fraction_ok = |v: f64| v > 0.0 && v <= 1.0;
        if self.num_leaves < 2 {
            return Err(invalid("num_leaves", "must be at least 2"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid("learning_rate", "must be a positive number"));
        }
        if !fraction_ok(self.feature_fraction) {
            return Err(invalid("feature_fraction", "must be in (0, 1]"));
        }
        if !fraction_ok(self.bagging_fraction) {
            return Err(invalid("bagging_fraction", "must be in (0, 1]"));
        }
        if self.num_boost_round == 0 {
            return Err(invalid("num_boost_round", "must be at least 1"));
        }
        if self.early_stopping_rounds == 0 {
            return Err(invalid("early_stopping_rounds", "must be at least 1"));
        }
        if self.fallback_boost_round == 0 {
            return Err(invalid("fallback_boost_round", "must be at least 1"));
        }
        if self.min_data_in_leaf == 0 {
            return Err(invalid("min_data_in_leaf", "must be at least 1"));
        }
        if !(self.min_sum_hessian_in_leaf.is_finite() && self.min_sum_hessian_in_leaf >= 0.0) {
            return Err(invalid("min_sum_hessian_in_leaf", "must be non-negative"));
        }
        if !(self.lambda_l2.is_finite() && self.lambda_l2 >= 0.0) {
            return Err(invalid("lambda_l2", "must be non-negative"));
        }
        if !(2..=usize::from(u16::MAX)).contains(&self.max_bin) {
            return Err(invalid("max_bin", "must be between 2 and 65535"));
        }
        Ok(())
    }
}
