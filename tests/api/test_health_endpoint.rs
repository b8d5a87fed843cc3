// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health and GET /version

use super::helpers::*;
use acne_analyzer::api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use std::sync::Arc;
use tower::util::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(AppState::new_for_test(dir.path()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["model_loaded"], false);
    let issues = json["issues"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|i| i.as_str().unwrap().contains("model not loaded")));
}

#[tokio::test]
async fn test_health_with_detector() {
    let dir = tempfile::tempdir().unwrap();
    let detector = Arc::new(StubDetector { detections: vec![] });
    let app = create_router(state_with_detector(dir.path(), detector).await);

    let response = app.oneshot(get("/health")).await.unwrap();
    let json = json_body(response).await;

    assert_eq!(json["model_loaded"], true);
    // Test state has no label font, so the service is degraded rather than healthy
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["models"][0]["name"], "stub-detector");
    assert_eq!(json["models"][0]["available"], true);
}

#[tokio::test]
async fn test_version_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(AppState::new_for_test(dir.path()));

    let response = app.oneshot(get("/version")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["features"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "batch-cli"));
}

#[tokio::test]
async fn test_analyze_rejects_get() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(AppState::new_for_test(dir.path()));

    let response = app.oneshot(get("/analyze_acne/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
