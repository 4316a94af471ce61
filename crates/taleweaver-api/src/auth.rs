//! Bearer-token authentication.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use taleweaver_core::collaborator::Authenticator;
use taleweaver_core::error::DomainError;
use taleweaver_core::story::UserId;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

type TokenDigest = [u8; 32];

fn digest(token: &str) -> TokenDigest {
    Sha256::digest(token.as_bytes()).into()
}

/// Authenticator backed by a fixed table of issued tokens. Only SHA-256
/// digests of the tokens are kept in memory.
#[derive(Debug, Default)]
pub struct TokenAuthenticator {
    users: HashMap<TokenDigest, UserId>,
}

impl TokenAuthenticator {
    /// Creates an authenticator accepting each `(token, user)` pair.
    #[must_use]
    pub fn new<T: AsRef<str>>(tokens: impl IntoIterator<Item = (T, UserId)>) -> Self {
        let users = tokens
            .into_iter()
            .map(|(token, user)| (digest(token.as_ref()), user))
            .collect();
        Self { users }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<UserId, DomainError> {
        self.users
            .get(&digest(token))
            .cloned()
            .ok_or(DomainError::Unauthorized)
    }
}

/// The user a request was made by, resolved from its
/// `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                debug!("request without bearer token");
                ApiError(DomainError::Unauthorized)
            })?;

        let user = state.authenticator.authenticate(token).await?;
        Ok(Self(user))
    }
}
