//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use review_core::{EmbeddedLexicons, FeatureExtractor, FeatureSchema, GbdtModel, Node, Tree};
use review_registry::ModelRegistry;
use review_service::{build_router, PredictionService, ServingContext};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const REVIEW: &str = "I bought this grinder for my espresso machine and it has been great. \
    The burrs are consistent, it is easy to clean, and the hopper holds plenty of beans.";

fn save_model(registry: &ModelRegistry) {
    let columns = FeatureSchema::MODEL_V1.column_names();
    let model = GbdtModel::new(
        columns.len(),
        0.0,
        vec![Tree::new(vec![
            Node::internal(0, 1, 10.5, 1, 2),
            Node::leaf(1, -2.0),
            Node::leaf(2, 2.0),
        ])],
    );
    let metrics = BTreeMap::from([("accuracy".to_string(), 0.9)]);
    registry.save(&model, &columns, &metrics).unwrap();
}

fn app(with_model: bool) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let registry = ModelRegistry::open(dir.path(), "review_helpfulness_model").unwrap();
    if with_model {
        save_model(&registry);
    }
    let context = Arc::new(ServingContext::new(registry));
    if with_model {
        context.reload().unwrap();
    }
    let extractor = FeatureExtractor::from_loader(&EmbeddedLexicons).unwrap();
    let service = Arc::new(PredictionService::new(extractor, context));
    (dir, build_router(service))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (_dir, app) = app(false);
    let (status, body) = send(app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["predict"], "/reviews/predict_helpfulness");
}

#[tokio::test]
async fn test_health_degraded_without_model() {
    let (_dir, app) = app(false);
    let (status, body) = send(app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model_loaded"], false);
    assert!(body["model_path"].is_null());
}

#[tokio::test]
async fn test_predict_unavailable_without_model() {
    let (_dir, app) = app(false);
    let request = json!({ "text": REVIEW, "score": 4 });
    let (status, body) = send(app.clone(), Method::POST, "/reviews/predict_helpfulness", Some(request)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());

    let (status, _) = send(app, Method::GET, "/model/info", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_predict_with_model() {
    let (_dir, app) = app(true);
    let request = json!({ "text": REVIEW, "score": 5 });
    let (status, body) = send(app, Method::POST, "/reviews/predict_helpfulness", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let p = body["is_helpful_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!(body["is_helpful"], p >= 0.5);
    assert_eq!(body["confidence"], "high");
    assert!(body["features"]["word_count"].as_f64().unwrap() > 10.0);
    assert_eq!(body["features"]["star_score"], 5.0);
    assert!(!body["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_predict_validation_errors() {
    let (_dir, app) = app(true);
    let short = json!({ "text": "Good", "score": 5 });
    let (status, _) = send(app.clone(), Method::POST, "/reviews/predict_helpfulness", Some(short)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let bad_score = json!({ "text": REVIEW, "score": 9 });
    let (status, _) = send(app, Method::POST, "/reviews/predict_helpfulness", Some(bad_score)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_model_info_and_health_with_model() {
    let (_dir, app) = app(true);
    let (status, body) = send(app.clone(), Method::GET, "/model/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features_count"], 14);
    assert_eq!(body["feature_columns"][0], "char_count");
    assert_eq!(body["metrics"]["accuracy"], 0.9);

    let (_, health) = send(app, Method::GET, "/health", None).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["features_count"], 14);
}

#[tokio::test]
async fn test_reload_picks_up_new_model() {
    let (dir, app) = app(false);
    let (status, _) = send(app.clone(), Method::POST, "/model/reload", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let registry = ModelRegistry::open(dir.path(), "review_helpfulness_model").unwrap();
    save_model(&registry);
    let (status, body) = send(app.clone(), Method::POST, "/model/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reloaded");

    let (_, health) = send(app, Method::GET, "/health", None).await;
    assert_eq!(health["model_loaded"], true);
}
