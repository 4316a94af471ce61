//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The caller presented no session, or one that could not be verified.
    #[error("unauthorized")]
    Unauthorized,

    /// A story does not exist or is not owned by the caller.
    #[error("story not found: {0}")]
    StoryNotFound(Uuid),

    /// A scene does not exist within the addressed story.
    #[error("scene not found: {0}")]
    SceneNotFound(Uuid),

    /// A required field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A write would break a uniqueness invariant (e.g. duplicate step number).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A text, speech or image provider returned a non-2xx status or a
    /// payload that could not be interpreted.
    #[error("upstream generation failure: {0}")]
    UpstreamGeneration(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns true for errors whose detail must not reach the end user.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UpstreamGeneration(_) | Self::Infrastructure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_are_flagged() {
        assert!(DomainError::UpstreamGeneration("502".into()).is_internal());
        assert!(DomainError::Infrastructure("pool closed".into()).is_internal());
        assert!(!DomainError::Validation("text is required".into()).is_internal());
        assert!(!DomainError::StoryNotFound(Uuid::new_v4()).is_internal());
    }
}
