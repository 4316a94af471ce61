//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use taleweaver_core::clock::Clock;
use taleweaver_core::story::UserId;
use taleweaver_store::pg_story_repository::PgStoryRepository;
use taleweaver_test_support::{
    FixedClock, InMemoryAssetStore, RecordingSpeechSynthesizer, ScriptedTextGenerator,
    StaticImageGenerator,
};
use tower::ServiceExt;

use taleweaver_api::auth::TokenAuthenticator;
use taleweaver_api::routes;
use taleweaver_api::state::AppState;

/// Bearer token issued to `author`.
pub const AUTHOR_TOKEN: &str = "author-token";
/// Bearer token issued to `reader`.
pub const READER_TOKEN: &str = "reader-token";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router with a real `PgStoryRepository`, an in-memory
/// asset store and a text generator answering nothing usable, so generated
/// scenes come from the fallbacks.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_completion(pool, "no scene today")
}

/// Build the full app router with a text generator answering `completion`.
pub fn build_test_app_with_completion(pool: PgPool, completion: &str) -> Router {
    let app_state = AppState::new(
        fixed_clock(),
        Arc::new(PgStoryRepository::new(pool)),
        Arc::new(ScriptedTextGenerator::replying(completion)),
        Arc::new(RecordingSpeechSynthesizer::new()),
        Arc::new(StaticImageGenerator::new("https://img.example/cover.png")),
        Arc::new(InMemoryAssetStore::new()),
        Arc::new(TokenAuthenticator::new([
            (AUTHOR_TOKEN, UserId::new("author")),
            (READER_TOKEN, UserId::new("reader")),
        ])),
    );

    routes::router().with_state(app_state)
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send an authenticated POST request with a JSON body.
pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(token), Some(body)).await
}

/// Send an authenticated PATCH request with a JSON body.
pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PATCH", uri, Some(token), Some(body)).await
}

/// Send an authenticated PUT request with a JSON body.
pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

/// Send an authenticated DELETE request.
pub async fn delete(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Send a GET request, authenticated when `token` is given.
pub async fn get_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, token, None).await
}
