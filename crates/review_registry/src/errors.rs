//! Error types for the model registry

use review_core::ModelError;
use thiserror::Error;

/// Errors that can occur while saving or loading artifacts
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Model or sidecar file absent
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// An immutable artifact with this id already exists
    #[error("Artifact already exists: {0}")]
    AlreadyExists(String),

    /// Sidecar hash does not describe the model file read alongside it
    #[error("Model hash mismatch for {id}: sidecar {expected}, file {actual}")]
    HashMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model file failed to parse or validate
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
