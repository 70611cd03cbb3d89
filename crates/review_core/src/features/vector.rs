//! Ordered feature vector and projection onto model columns

use super::schema::FeatureName;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::str::FromStr;

/// Ordered mapping from [`FeatureName`] to value.
///
/// Keeps insertion order, which follows the sub-extractor order, and
/// serializes as a `{name: value}` JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(FeatureName, f64)>,
}

/// Values laid out in a model's declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub values: Vec<f64>,
    /// Declared columns this vector could not supply, valued 0.0
    pub missing: Vec<String>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: FeatureName) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Value by column name; `0.0` when absent. Convenient for rule checks
    /// over diagnostic features.
    pub fn value_or_zero(&self, name: FeatureName) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn contains(&self, name: FeatureName) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = FeatureName> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Append entries whose key is not present yet. Existing keys win.
    ///
    /// Returns the number of rejected entries.
    pub fn merge(&mut self, partial: Vec<(FeatureName, f64)>) -> usize {
        let mut rejected = 0;
        for (name, value) in partial {
            if self.contains(name) {
                rejected += 1;
            } else {
                self.entries.push((name, value));
            }
        }
        rejected
    }

    /// Lay values out in `columns` order, by name.
    ///
    /// Unknown or absent columns are valued `0.0` and reported in
    /// [`Projection::missing`]; callers decide how loudly to log them.
    pub fn project(&self, columns: &[String]) -> Projection {
        let mut values = Vec::with_capacity(columns.len());
        let mut missing = Vec::new();
        for column in columns {
            let value = FeatureName::from_str(column)
                .ok()
                .and_then(|name| self.get(name));
            match value {
                Some(v) => values.push(v),
                None => {
                    values.push(0.0);
                    missing.push(column.clone());
                }
            }
        }
        Projection { values, missing }
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}
