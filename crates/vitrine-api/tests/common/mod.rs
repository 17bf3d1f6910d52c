//! Shared helpers for router tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use vitrine_api::{router, ApiConfig, AppState, Credentials};
use vitrine_db::test_fixtures::TestDatabase;
use vitrine_inference::mock::MockGenerationBackend;

pub const TOKEN: &str = "test-token";
pub const BASE: &str = "https://caasexpresss.com";

pub fn config() -> ApiConfig {
    ApiConfig::default().with_credentials(Credentials::new("admin", "abcd efgh ijkl", TOKEN))
}

pub fn app(test_db: &TestDatabase) -> Router {
    router(AppState::new(test_db.db.clone(), config()))
}

pub fn app_with_backend(test_db: &TestDatabase, backend: &MockGenerationBackend) -> Router {
    router(AppState::new(test_db.db.clone(), config()).with_backend(Arc::new(backend.clone())))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Authenticated JSON request.
pub fn send_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Authenticated request without a body.
pub fn send_empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}
