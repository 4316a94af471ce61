//! Mistral chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use taleweaver_core::collaborator::TextGenerator;
use taleweaver_core::error::DomainError;
use tracing::{debug, instrument};

use crate::error::{payload, send};

/// Public Mistral API root.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "mistral-small-latest";

const PROVIDER: &str = "mistral";
const SYSTEM_PROMPT: &str =
    "You are a creative storyteller generating engaging interactive fiction.";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Text generator backed by Mistral chat completions.
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl MistralClient {
    /// Creates a client for `base_url` (e.g. [`DEFAULT_BASE_URL`]).
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        debug!("creating Mistral client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for MistralClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);
        let response = send(PROVIDER, request).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| payload(PROVIDER, e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| payload(PROVIDER, "response carried no message content"))?;

        debug!(len = content.len(), "received completion");
        Ok(content)
    }
}
