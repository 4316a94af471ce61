//! Shared test mocks and utilities for TaleWeaver.

mod clock;
mod collaborators;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use collaborators::{
    FailingImageGenerator, FailingSpeechSynthesizer, InMemoryAssetStore, RecordingSpeechSynthesizer,
    ScriptedTextGenerator, StaticImageGenerator,
};
pub use repository::{FailingStoryRepository, InMemoryStoryRepository};
