//! Artifact identifiers and metadata

use chrono::{DateTime, NaiveDateTime, Utc};
use review_core::GbdtModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// `strftime` layout of artifact timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File-name tag of the mutable "latest" copy
pub const LATEST_TAG: &str = "latest";

/// Timestamp identifying one immutable artifact, e.g. `20240131_142500`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Accepts only well-formed timestamps.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .ok()
            .map(|_| Self(s.to_string()))
    }

    pub(crate) fn from_raw(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which artifact to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    Latest,
    Id(ArtifactId),
}

impl ArtifactRef {
    /// Tag used in file names
    pub fn tag(&self) -> &str {
        match self {
            ArtifactRef::Latest => LATEST_TAG,
            ArtifactRef::Id(id) => id.as_str(),
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Sidecar stored next to every model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Column order of the model's input rows
    pub feature_columns: Vec<String>,
    pub metrics: BTreeMap<String, f64>,
    pub timestamp: String,
    /// blake3 hex of the model file bytes
    pub model_hash: String,
}

/// A model paired with the sidecar that describes it.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub id: ArtifactId,
    pub model: GbdtModel,
    pub metadata: ArtifactMetadata,
    /// File the model was read from
    pub model_path: PathBuf,
}
