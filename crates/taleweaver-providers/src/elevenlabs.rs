//! ElevenLabs text-to-speech client.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use taleweaver_core::collaborator::SpeechSynthesizer;
use taleweaver_core::error::DomainError;
use tracing::{debug, instrument};

use crate::error::{payload, send};

/// Public ElevenLabs API root.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

const PROVIDER: &str = "elevenlabs";
const MODEL_ID: &str = "eleven_monolingual_v1";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'static str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Speech synthesizer backed by the ElevenLabs API. Returns MP3 bytes.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        debug!("creating ElevenLabs client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, DomainError> {
        let body = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let request = self
            .client
            .post(format!("{}/text-to-speech/{voice_id}", self.base_url))
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&body);
        let response = send(PROVIDER, request).await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| payload(PROVIDER, e.to_string()))?;
        if audio.is_empty() {
            return Err(payload(PROVIDER, "empty audio body").into());
        }

        debug!(bytes = audio.len(), "received audio");
        Ok(audio.to_vec())
    }
}
