//! Filesystem-backed model registry
//!
//! Layout for a registry named `review_helpfulness_model`:
//!
//! ```text
//! review_helpfulness_model_20240131_142500.model.json      immutable
//! review_helpfulness_model_20240131_142500_metadata.json   immutable
//! review_helpfulness_model_latest.model.json               replaced on save
//! review_helpfulness_model_latest_metadata.json            replaced on save
//! ```
//!
//! Every file is written to a temp file in the registry directory and then
//! renamed into place. The latest pair is two renames, so a reader can
//! observe a new model next to an old sidecar; the sidecar hash catches
//! that and the load is retried. When the sidecar rename fails after the
//! model rename succeeded, the previous latest model is put back so the
//! pair stays consistent.

use crate::errors::{RegistryError, Result};
use crate::types::{ArtifactId, ArtifactMetadata, ArtifactRef, ModelArtifact};
use chrono::{DateTime, Utc};
use review_core::serde_canon::hash_bytes_hex;
use review_core::GbdtModel;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const MODEL_SUFFIX: &str = ".model.json";
const METADATA_SUFFIX: &str = "_metadata.json";
const LOAD_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_millis(20);

/// Versioned artifacts of one named model in one directory.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    dir: PathBuf,
    name: String,
}

fn read_artifact_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RegistryError::NotFound(path.display().to_string()),
        _ => RegistryError::Io(e),
    })
}

impl ModelRegistry {
    /// Open (and create if needed) the registry directory.
    pub fn open(dir: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        let name = name.into();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(RegistryError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid model name {name:?}"),
            )));
        }
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, name })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_path(&self, reference: &ArtifactRef) -> PathBuf {
        self.dir
            .join(format!("{}_{}{MODEL_SUFFIX}", self.name, reference.tag()))
    }

    pub fn metadata_path(&self, reference: &ArtifactRef) -> PathBuf {
        self.dir
            .join(format!("{}_{}{METADATA_SUFFIX}", self.name, reference.tag()))
    }

    /// Save a new artifact stamped with the current UTC time and make it latest.
    pub fn save(
        &self,
        model: &GbdtModel,
        feature_columns: &[String],
        metrics: &BTreeMap<String, f64>,
    ) -> Result<ArtifactId> {
        self.save_at(model, feature_columns, metrics, Utc::now())
    }

    /// Save a new artifact under an explicit timestamp.
    ///
    /// Fails with `AlreadyExists` if an artifact with the same id is present;
    /// the latest pair is left untouched in that case.
    #[instrument(skip(self, model, feature_columns, metrics), fields(name = %self.name))]
    pub fn save_at(
        &self,
        model: &GbdtModel,
        feature_columns: &[String],
        metrics: &BTreeMap<String, f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<ArtifactId> {
        model.validate()?;
        if feature_columns.len() != model.feature_count {
            warn!(
                columns = feature_columns.len(),
                feature_count = model.feature_count,
                "Saving model whose column list and feature count differ"
            );
        }

        let id = ArtifactId::from_timestamp(timestamp);
        let model_json = model.to_canonical_json()?;
        let metadata = ArtifactMetadata {
            feature_columns: feature_columns.to_vec(),
            metrics: metrics.clone(),
            timestamp: id.to_string(),
            model_hash: hash_bytes_hex(model_json.as_bytes()),
        };
        let metadata_json = serde_json::to_vec_pretty(&metadata)?;

        let versioned = ArtifactRef::Id(id.clone());
        self.write_new(&self.model_path(&versioned), model_json.as_bytes(), &id)?;
        self.write_new(&self.metadata_path(&versioned), &metadata_json, &id)?;

        self.replace_latest(model_json.as_bytes(), &metadata_json)?;

        info!(
            id = %id,
            hash = %metadata.model_hash,
            path = %self.model_path(&versioned).display(),
            "Saved model artifact"
        );
        Ok(id)
    }

    /// Load an artifact, pairing the model with the sidecar that hashes it.
    #[instrument(skip(self), fields(name = %self.name))]
    pub fn load(&self, reference: &ArtifactRef) -> Result<ModelArtifact> {
        let model_path = self.model_path(reference);
        let metadata_path = self.metadata_path(reference);

        let mut last_mismatch = None;
        for attempt in 0..LOAD_ATTEMPTS {
            let model_bytes = read_artifact_file(&model_path)?;
            let metadata_bytes = read_artifact_file(&metadata_path)?;
            let metadata: ArtifactMetadata = serde_json::from_slice(&metadata_bytes)?;
            let actual = hash_bytes_hex(&model_bytes);

            if actual != metadata.model_hash {
                debug!(attempt, "Model and sidecar out of step, retrying");
                last_mismatch = Some((metadata.model_hash, actual));
                thread::sleep(RETRY_DELAY * (attempt + 1));
                continue;
            }

            let json = std::str::from_utf8(&model_bytes)
                .map_err(|e| RegistryError::Io(io::Error::new(ErrorKind::InvalidData, e)))?;
            let model = GbdtModel::from_json_str(json)?;
            if metadata.feature_columns.len() != model.feature_count {
                warn!(
                    columns = metadata.feature_columns.len(),
                    feature_count = model.feature_count,
                    "Sidecar column count differs from the model's feature count"
                );
            }
            let id = match reference {
                ArtifactRef::Id(id) => id.clone(),
                ArtifactRef::Latest => ArtifactId::parse(&metadata.timestamp).unwrap_or_else(|| {
                    warn!(timestamp = %metadata.timestamp, "Sidecar timestamp is malformed");
                    ArtifactId::from_raw(&metadata.timestamp)
                }),
            };

            info!(
                id = %id,
                trees = model.num_trees(),
                features = metadata.feature_columns.len(),
                "Loaded model artifact"
            );
            return Ok(ModelArtifact {
                id,
                model,
                metadata,
                model_path,
            });
        }

        let (expected, actual) = last_mismatch.unwrap_or_default();
        warn!(reference = %reference, "Model hash mismatch persisted after retries");
        Err(RegistryError::HashMismatch {
            id: reference.to_string(),
            expected,
            actual,
        })
    }

    /// Timestamped artifacts present in the directory, newest first.
    pub fn list(&self) -> Result<Vec<ArtifactId>> {
        let prefix = format!("{}_", self.name);
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let file_name = entry?.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let id = file_name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(MODEL_SUFFIX))
                .and_then(ArtifactId::parse);
            if let Some(id) = id {
                ids.push(id);
            }
        }
        ids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    fn temp_file(&self, bytes: &[u8]) -> Result<tempfile::NamedTempFile> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .tempfile_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    fn write_new(&self, path: &Path, bytes: &[u8], id: &ArtifactId) -> Result<()> {
        self.temp_file(bytes)?
            .persist_noclobber(path)
            .map_err(|e| match e.error.kind() {
                ErrorKind::AlreadyExists => RegistryError::AlreadyExists(id.to_string()),
                _ => RegistryError::Io(e.error),
            })?;
        Ok(())
    }

    /// Swap in a new latest pair, model first.
    fn replace_latest(&self, model_bytes: &[u8], metadata_bytes: &[u8]) -> Result<()> {
        let model_path = self.model_path(&ArtifactRef::Latest);
        let metadata_path = self.metadata_path(&ArtifactRef::Latest);
        let model_tmp = self.temp_file(model_bytes)?;
        let metadata_tmp = self.temp_file(metadata_bytes)?;
        let previous = match fs::read(&model_path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(RegistryError::Io(e)),
        };

        model_tmp
            .persist(&model_path)
            .map_err(|e| RegistryError::Io(e.error))?;
        if let Err(e) = metadata_tmp.persist(&metadata_path) {
            warn!(error = %e.error, "Latest sidecar not replaced, restoring previous latest model");
            if let Err(restore) = self.restore_latest_model(&model_path, previous.as_deref()) {
                warn!(error = %restore, "Failed to restore previous latest model");
            }
            return Err(RegistryError::Io(e.error));
        }
        Ok(())
    }

    fn restore_latest_model(&self, path: &Path, previous: Option<&[u8]>) -> Result<()> {
        match previous {
            Some(bytes) => {
                self.temp_file(bytes)?
                    .persist(path)
                    .map_err(|e| RegistryError::Io(e.error))?;
            }
            None => fs::remove_file(path)?,
        }
        Ok(())
    }
}
