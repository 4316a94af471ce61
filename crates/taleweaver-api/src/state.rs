//! Shared application state.

use std::sync::Arc;

use taleweaver_core::clock::Clock;
use taleweaver_core::collaborator::{
    AssetStore, Authenticator, ImageGenerator, SpeechSynthesizer, TextGenerator,
};
use taleweaver_core::repository::StoryRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of record timestamps and asset key suffixes.
    pub clock: Arc<dyn Clock>,
    /// Story and scene persistence.
    pub story_repository: Arc<dyn StoryRepository>,
    /// Writes the next scene.
    pub text_generator: Arc<dyn TextGenerator>,
    /// Voices scene text.
    pub speech_synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Illustrates scenes and covers.
    pub image_generator: Arc<dyn ImageGenerator>,
    /// Stores generated audio.
    pub asset_store: Arc<dyn AssetStore>,
    /// Resolves bearer tokens.
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        story_repository: Arc<dyn StoryRepository>,
        text_generator: Arc<dyn TextGenerator>,
        speech_synthesizer: Arc<dyn SpeechSynthesizer>,
        image_generator: Arc<dyn ImageGenerator>,
        asset_store: Arc<dyn AssetStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            clock,
            story_repository,
            text_generator,
            speech_synthesizer,
            image_generator,
            asset_store,
            authenticator,
        }
    }
}
