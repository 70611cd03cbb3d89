//! Review helpfulness prediction service
//!
//! Serves the registry's latest artifact over HTTP. The model sits behind a
//! [`ServingContext`] that can be swapped at runtime with `POST /model/reload`;
//! the service starts degraded when no artifact exists yet.

pub mod confidence;
pub mod config;
pub mod errors;
pub mod server;
pub mod service;
pub mod suggestions;

pub use confidence::Confidence;
pub use config::ServiceConfig;
pub use errors::{Result, ServiceError};
pub use server::{build_router, start_server, PredictRequest};
pub use service::{
    LoadedModel, PredictionResponse, PredictionResult, PredictionService, ServingContext,
};

/// Service version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
