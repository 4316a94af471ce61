//! Test collaborators — stand-ins for the generation providers and the asset
//! store.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use taleweaver_core::collaborator::{AssetStore, ImageGenerator, SpeechSynthesizer, TextGenerator};
use taleweaver_core::error::DomainError;

/// A text generator that replays scripted completions in order and records
/// every prompt it receives. Once the script runs out it fails with an
/// upstream error.
#[derive(Debug, Default)]
pub struct ScriptedTextGenerator {
    responses: Mutex<VecDeque<Result<String, DomainError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTextGenerator {
    /// Creates a generator that answers with `responses`, one per call.
    #[must_use]
    pub fn new(responses: Vec<Result<String, DomainError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Creates a generator that answers a single call with `completion`.
    #[must_use]
    pub fn replying(completion: impl Into<String>) -> Self {
        Self::new(vec![Ok(completion.into())])
    }

    /// Returns every prompt received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::UpstreamGeneration("script exhausted".into())))
    }
}

/// A speech synthesizer that returns `"{voice_id}:{text}"` as the audio bytes
/// and records each `(text, voice_id)` pair.
#[derive(Debug, Default)]
pub struct RecordingSpeechSynthesizer {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingSpeechSynthesizer {
    /// Creates a new recording synthesizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every `(text, voice_id)` synthesized.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeechSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_owned(), voice_id.to_owned()));
        Ok(format!("{voice_id}:{text}").into_bytes())
    }
}

/// A speech synthesizer whose provider always answers with an error.
#[derive(Debug)]
pub struct FailingSpeechSynthesizer;

#[async_trait]
impl SpeechSynthesizer for FailingSpeechSynthesizer {
    async fn synthesize(&self, _text: &str, _voice_id: &str) -> Result<Vec<u8>, DomainError> {
        Err(DomainError::UpstreamGeneration(
            "text-to-speech returned 500".into(),
        ))
    }
}

/// An image generator that always returns the same URL and records prompts.
#[derive(Debug)]
pub struct StaticImageGenerator {
    url: String,
    prompts: Mutex<Vec<String>>,
}

impl StaticImageGenerator {
    /// Creates a generator answering every prompt with `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns every prompt received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for StaticImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        Ok(self.url.clone())
    }
}

/// An image generator whose provider always answers with an error.
#[derive(Debug)]
pub struct FailingImageGenerator;

#[async_trait]
impl ImageGenerator for FailingImageGenerator {
    async fn generate_image(&self, _prompt: &str) -> Result<String, DomainError> {
        Err(DomainError::UpstreamGeneration(
            "image generation returned 503".into(),
        ))
    }
}

/// An asset store held in memory. URLs are `memory://{key}`.
#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    assets: Mutex<HashMap<String, Vec<u8>>>,
    deleted: Mutex<Vec<String>>,
}

impl InMemoryAssetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.assets.lock().unwrap().get(key).cloned()
    }

    /// Returns all stored keys, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.assets.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns every key passed to `delete`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn put(&self, bytes: &[u8], key: &str) -> Result<String, DomainError> {
        self.assets
            .lock()
            .unwrap()
            .insert(key.to_owned(), bytes.to_vec());
        Ok(format!("memory://{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.assets.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_owned());
        Ok(())
    }
}
