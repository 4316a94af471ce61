//! fal.ai image-generation client (FLUX dev model, synchronous endpoint).

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use taleweaver_core::collaborator::ImageGenerator;
use taleweaver_core::error::DomainError;
use tracing::{debug, instrument};

use crate::error::{payload, send};

/// Public fal.ai synchronous run endpoint.
pub const DEFAULT_BASE_URL: &str = "https://fal.run";

const PROVIDER: &str = "fal";
const MODEL: &str = "fal-ai/flux/dev";
const IMAGE_SIZE: &str = "landscape_16_9";

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    image_size: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: String,
}

/// Image generator backed by fal.ai. Returns the provider-hosted image URL.
#[derive(Debug, Clone)]
pub struct FalClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FalClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        debug!("creating fal client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl ImageGenerator for FalClient {
    #[instrument(skip(self, prompt), fields(model = MODEL))]
    async fn generate_image(&self, prompt: &str) -> Result<String, DomainError> {
        let request = self
            .client
            .post(format!("{}/{MODEL}", self.base_url))
            .header(AUTHORIZATION, format!("Key {}", self.api_key))
            .json(&ImageRequest {
                prompt,
                image_size: IMAGE_SIZE,
            });
        let response = send(PROVIDER, request).await?;

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| payload(PROVIDER, e.to_string()))?;
        let url = parsed
            .images
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| payload(PROVIDER, "response carried no images"))?;

        debug!(url = %url, "image generated");
        Ok(url)
    }
}
