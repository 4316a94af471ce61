//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod generation;
pub mod health;
pub mod progress;
pub mod scenes;
pub mod stories;

/// Returns the health check plus every `/api/v1` route.
pub fn router() -> Router<AppState> {
    Router::new().merge(health::router()).nest(
        "/api/v1",
        stories::router()
            .merge(scenes::router())
            .merge(generation::router())
            .merge(progress::router()),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use taleweaver_core::story::UserId;
    use taleweaver_test_support::{
        FixedClock, InMemoryAssetStore, InMemoryStoryRepository, RecordingSpeechSynthesizer,
        ScriptedTextGenerator, StaticImageGenerator, fixed_now,
    };
    use tower::ServiceExt;

    use crate::auth::TokenAuthenticator;
    use crate::state::AppState;

    pub(crate) const TOKEN: &str = "token-user-1";
    pub(crate) const OTHER_TOKEN: &str = "token-user-2";
    pub(crate) const IMAGE_URL: &str = "https://img.example/generated.png";

    pub(crate) fn owner() -> UserId {
        UserId::new("user_1")
    }

    /// State over `repo` with scripted generators answering `completion`.
    pub(crate) fn state_with(repo: Arc<InMemoryStoryRepository>, completion: &str) -> AppState {
        AppState::new(
            Arc::new(FixedClock(fixed_now())),
            repo,
            Arc::new(ScriptedTextGenerator::replying(completion)),
            Arc::new(RecordingSpeechSynthesizer::new()),
            Arc::new(StaticImageGenerator::new(IMAGE_URL)),
            Arc::new(InMemoryAssetStore::new()),
            Arc::new(TokenAuthenticator::new([
                (TOKEN, owner()),
                (OTHER_TOKEN, UserId::new("user_2")),
            ])),
        )
    }

    /// Sends a request and returns the status with the JSON body, or
    /// `Value::Null` for an empty body.
    pub(crate) async fn send(
        app: Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }
}
