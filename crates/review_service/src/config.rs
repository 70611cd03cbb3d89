//! Service configuration
//!
//! Defaults, then an optional TOML file named by `REVIEW_SERVICE_CONFIG`,
//! then individual `REVIEW_*` environment variables.

use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "REVIEW_SERVICE_CONFIG";
pub const BIND_ADDR_ENV: &str = "REVIEW_BIND_ADDR";
pub const MODELS_DIR_ENV: &str = "REVIEW_MODELS_DIR";
pub const MODEL_NAME_ENV: &str = "REVIEW_MODEL_NAME";
pub const LEXICON_DIR_ENV: &str = "REVIEW_LEXICON_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listen address, `host:port`
    pub bind_addr: String,
    pub models_dir: PathBuf,
    pub model_name: String,
    /// Sentiment lexicon directory; the built-in lexicons when unset
    pub lexicon_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            models_dir: PathBuf::from("models"),
            model_name: "review_helpfulness_model".to_string(),
            lexicon_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ServiceError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ServiceError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded service configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ServiceError> {
        toml::from_str(content)
            .map_err(|e| ServiceError::Config(format!("failed to parse config: {e}")))
    }

    /// Apply `REVIEW_*` overrides; `lookup` returns a variable's value if set.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
        if let Some(dir) = lookup(MODELS_DIR_ENV) {
            self.models_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup(MODEL_NAME_ENV) {
            self.model_name = name;
        }
        if let Some(dir) = lookup(LEXICON_DIR_ENV) {
            self.lexicon_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
    }
}
