//! Model artifact registry
//!
//! Stores trained models as immutable, timestamped artifacts (canonical
//! JSON model plus a metadata sidecar) and maintains a "latest" copy that
//! readers load. Loading verifies the sidecar's blake3 hash against the
//! model bytes, so a model is never paired with another version's metadata.

pub mod errors;
pub mod registry;
pub mod types;

pub use errors::{RegistryError, Result};
pub use registry::ModelRegistry;
pub use types::{
    ArtifactId, ArtifactMetadata, ArtifactRef, ModelArtifact, LATEST_TAG, TIMESTAMP_FORMAT,
};
