//! HTTP shell over [`PredictionService`]

use crate::errors::ServiceError;
use crate::service::{PredictionResponse, PredictionService};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

type SharedState = Arc<PredictionService>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            warn!(error = %err, "Request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
    pub score: i64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_path: Option<String>,
    features_count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ModelInfoResponse {
    model_path: String,
    features_count: usize,
    feature_columns: Vec<String>,
    metrics: BTreeMap<String, f64>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    status: &'static str,
    id: String,
    features_count: usize,
}

pub fn build_router(service: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/model/info", get(handle_model_info))
        .route("/model/reload", post(handle_reload))
        .route("/reviews/predict_helpfulness", post(handle_predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve until `shutdown` resolves.
pub async fn start_server<F>(service: SharedState, addr: &str, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(service);
    let listener = bind_listener(addr).await?;
    info!(addr = %addr, "Prediction service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

async fn handle_root() -> Json<Value> {
    Json(json!({
        "message": "Review Helpfulness Prediction API",
        "version": crate::VERSION,
        "endpoints": {
            "health": "/health",
            "predict": "/reviews/predict_helpfulness",
            "model_info": "/model/info",
            "reload": "/model/reload",
        }
    }))
}

async fn handle_health(State(service): State<SharedState>) -> Json<HealthResponse> {
    let loaded = service.context().snapshot();
    Json(HealthResponse {
        status: if loaded.is_some() { "healthy" } else { "degraded" },
        model_loaded: loaded.is_some(),
        model_path: loaded
            .as_ref()
            .map(|m| m.model_path.display().to_string()),
        features_count: loaded.as_ref().map(|m| m.feature_columns().len()),
    })
}

async fn handle_model_info(
    State(service): State<SharedState>,
) -> Result<Json<ModelInfoResponse>, ApiError> {
    let loaded = service.context().snapshot().ok_or_else(|| {
        ApiError::from(ServiceError::ServiceUnavailable("no model loaded".to_string()))
    })?;
    Ok(Json(ModelInfoResponse {
        model_path: loaded.model_path.display().to_string(),
        features_count: loaded.feature_columns().len(),
        feature_columns: loaded.feature_columns().to_vec(),
        metrics: loaded.metadata.metrics.clone(),
        timestamp: loaded.metadata.timestamp.clone(),
    }))
}

async fn handle_predict(
    State(service): State<SharedState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let result = service.predict(&request.text, request.score)?;
    Ok(Json(result.into()))
}

async fn handle_reload(State(service): State<SharedState>) -> Result<Json<ReloadResponse>, ApiError> {
    let context = Arc::clone(service.context());
    let loaded = tokio::task::spawn_blocking(move || context.reload())
        .await
        .map_err(|e| ApiError::from(ServiceError::Internal(format!("reload task failed: {e}"))))??;
    Ok(Json(ReloadResponse {
        status: "reloaded",
        id: loaded.id.to_string(),
        features_count: loaded.feature_columns().len(),
    }))
}
