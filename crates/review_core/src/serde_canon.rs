//! Canonical JSON serialization for model files
//!
//! Object keys are sorted recursively and the output carries no whitespace,
//! so equal models always hash to the same blake3 digest.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace).
///
/// Going through `serde_json::Value` sorts every object, nested ones
/// included: its map is a `BTreeMap` as long as the `preserve_order`
/// feature of serde_json stays off, which the workspace manifest ensures.
///
/// Non-finite floats have no JSON form and come out as `null`; model
/// validation rejects them before anything is written.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json_value = serde_json::to_value(value)
        .map_err(|e| CanonicalError::SerializationError(e.to_string()))?;
    serde_json::to_string(&json_value)
        .map_err(|e| CanonicalError::SerializationError(e.to_string()))
}

/// Blake3 hash of arbitrary bytes as lowercase hex.
pub fn hash_bytes_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}

/// Blake3 hash of the canonical JSON representation, as hex.
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json = to_canonical_json(value)?;
    Ok(hash_bytes_hex(json.as_bytes()))
}
