//! TaleWeaver — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use taleweaver_core::error::DomainError;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migrations could not be applied.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The asset directory could not be prepared.
    #[error("asset store error: {0}")]
    Assets(#[from] DomainError),

    /// The tracing pipeline could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            DomainError::StoryNotFound(_) => (StatusCode::NOT_FOUND, "story_not_found"),
            DomainError::SceneNotFound(_) => (StatusCode::NOT_FOUND, "scene_not_found"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            DomainError::UpstreamGeneration(_) => {
                (StatusCode::BAD_GATEWAY, "upstream_generation_failure")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let message = if self.0.is_internal() {
            error!(error = %self.0, status = status.as_u16(), "request failed");
            match self.0 {
                DomainError::UpstreamGeneration(_) => "a generation service failed".to_owned(),
                _ => "internal server error".to_owned(),
            }
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
