//! Commands for the Scene Generation context.

use taleweaver_core::command::Command;
use taleweaver_core::story::{AudioKind, UserId};
use uuid::Uuid;

/// Command to write, voice and append the next scene of a story.
#[derive(Debug, Clone)]
pub struct GenerateNextScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story to extend.
    pub story_id: Uuid,
    /// Text of the choice taken from the latest scene. `None` starts the
    /// story.
    pub choice: Option<String>,
    /// Choices taken before this one, oldest first.
    pub previous_choices: Vec<String>,
}

impl Command for GenerateNextScene {
    fn command_type(&self) -> &'static str {
        "generation.generate_next_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to (re)generate the audio clip for one text field of a scene.
#[derive(Debug, Clone)]
pub struct SynthesizeSceneAudio {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story owning the scene.
    pub story_id: Uuid,
    /// The scene to voice.
    pub scene_id: Uuid,
    /// Which text field to voice.
    pub kind: AudioKind,
    /// Voice to use; the default narrator when absent.
    pub voice_id: Option<String>,
}

impl Command for SynthesizeSceneAudio {
    fn command_type(&self) -> &'static str {
        "generation.synthesize_scene_audio"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to illustrate a scene.
#[derive(Debug, Clone)]
pub struct GenerateSceneImage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story owning the scene.
    pub story_id: Uuid,
    /// The scene to illustrate.
    pub scene_id: Uuid,
    /// Prompt override; the scene description when absent.
    pub prompt: Option<String>,
}

impl Command for GenerateSceneImage {
    fn command_type(&self) -> &'static str {
        "generation.generate_scene_image"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to generate a story's cover image.
#[derive(Debug, Clone)]
pub struct GenerateCoverImage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story to illustrate.
    pub story_id: Uuid,
    /// Image prompt.
    pub prompt: String,
}

impl Command for GenerateCoverImage {
    fn command_type(&self) -> &'static str {
        "generation.generate_cover_image"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to voice arbitrary text without storing it, for voice previews.
#[derive(Debug, Clone)]
pub struct SynthesizePreview {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Text to speak.
    pub text: String,
    /// Voice to use; the default narrator when absent.
    pub voice_id: Option<String>,
}

impl Command for SynthesizePreview {
    fn command_type(&self) -> &'static str {
        "generation.synthesize_preview"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
