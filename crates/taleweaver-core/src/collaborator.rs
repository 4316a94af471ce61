//! External collaborators: generation services, asset storage, sessions.
//!
//! Every call is a single attempt. Providers report non-2xx responses and
//! unreadable payloads as `DomainError::UpstreamGeneration`; nothing here
//! retries.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::story::UserId;

/// Text-completion service used to write the next scene.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Text-to-speech service.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Renders `text` with the given voice and returns encoded audio bytes.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, DomainError>;
}

/// Image-generation service.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates an illustration and returns its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Storage for generated assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL.
    async fn put(&self, bytes: &[u8], key: &str) -> Result<String, DomainError>;

    /// Removes the asset stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}

/// Resolves a bearer token into the user it was issued to.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Fails with `DomainError::Unauthorized` for unknown tokens.
    async fn authenticate(&self, token: &str) -> Result<UserId, DomainError>;
}
