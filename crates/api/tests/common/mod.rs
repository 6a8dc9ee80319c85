#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use reelforge_api::{build_app_router, AppState, ServerConfig};
use reelforge_pipeline::SceneProcessor;
use reelforge_provider::{HttpGenerationProvider, HttpMediaStorage};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses. The collaborator
/// clients point at unroutable endpoints; tests that would reach them
/// must not enqueue any work.
pub fn build_test_app(pool: PgPool) -> Router {
    let provider = Arc::new(HttpGenerationProvider::new(
        "http://127.0.0.1:1".to_string(),
        String::new(),
    ));
    let storage = Arc::new(HttpMediaStorage::new("http://127.0.0.1:1".to_string()));
    let processor = Arc::new(SceneProcessor::new(pool.clone(), provider, storage));

    let state = AppState { pool, processor };
    build_app_router(state, &test_config())
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a bodyless POST request to the app.
pub async fn post(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the response status, returning the JSON body for further checks.
pub async fn assert_status_json(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), expected);
    body_json(response).await
}
