//! Provider error types.

use reqwest::Response;
use taleweaver_core::error::DomainError;
use thiserror::Error;
use tracing::error;

/// Failure talking to a generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-2xx status.
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("{provider} returned an unreadable payload: {detail}")]
    Payload {
        provider: &'static str,
        detail: String,
    },
}

impl From<ProviderError> for DomainError {
    fn from(err: ProviderError) -> Self {
        DomainError::UpstreamGeneration(err.to_string())
    }
}

/// Sends a prepared request and rejects non-2xx responses.
pub(crate) async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(|source| {
        error!(provider, error = ?source, "provider request failed");
        ProviderError::Transport { provider, source }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(provider, status = %status, body = %body, "provider returned error");
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

pub(crate) fn payload(provider: &'static str, detail: impl Into<String>) -> ProviderError {
    let detail = detail.into();
    error!(provider, detail = %detail, "unreadable provider payload");
    ProviderError::Payload { provider, detail }
}
