//! Commands for the Story & Scene management context.

use taleweaver_core::command::Command;
use taleweaver_core::error::DomainError;
use taleweaver_core::story::{Choice, Scene, UserId};
use uuid::Uuid;

/// Command to create a new, empty story.
#[derive(Debug, Clone)]
pub struct CreateStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user creating the story.
    pub owner: UserId,
    /// Display title.
    pub title: String,
}

impl Command for CreateStory {
    fn command_type(&self) -> &'static str {
        "stories.create_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change a story's title or cover image.
#[derive(Debug, Clone)]
pub struct UpdateStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the update.
    pub owner: UserId,
    /// The story to update.
    pub story_id: Uuid,
    /// New title, if changing.
    pub title: Option<String>,
    /// New cover image URL, if changing.
    pub image_url: Option<String>,
}

impl Command for UpdateStory {
    fn command_type(&self) -> &'static str {
        "stories.update_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a story and all of its scenes.
#[derive(Debug, Clone)]
pub struct DeleteStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the delete.
    pub owner: UserId,
    /// The story to delete.
    pub story_id: Uuid,
}

impl Command for DeleteStory {
    fn command_type(&self) -> &'static str {
        "stories.delete_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Scene fields supplied by a client. `None` leaves a field as it is (or at
/// its default when creating).
#[derive(Debug, Clone, Default)]
pub struct SceneFields {
    pub step_number: Option<i32>,
    pub narration: Option<String>,
    pub dialog: Option<String>,
    pub description: Option<String>,
    pub narration_audio_url: Option<String>,
    pub dialog_audio_url: Option<String>,
    pub description_audio_url: Option<String>,
    pub image_url: Option<String>,
    pub choices: Option<Vec<Choice>>,
}

impl SceneFields {
    /// Rejects step numbers below 1.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a non-positive step number.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self.step_number {
            Some(step) if step < 1 => Err(DomainError::Validation(format!(
                "step_number must be at least 1, got {step}"
            ))),
            _ => Ok(()),
        }
    }

    /// Copies every supplied field onto `scene`.
    pub fn apply_to(self, scene: &mut Scene) {
        if let Some(step) = self.step_number {
            scene.step_number = step;
        }
        if let Some(text) = self.narration {
            scene.narration = text;
        }
        if let Some(text) = self.dialog {
            scene.dialog = text;
        }
        if let Some(text) = self.description {
            scene.description = text;
        }
        if let Some(url) = self.narration_audio_url {
            scene.narration_audio_url = Some(url);
        }
        if let Some(url) = self.dialog_audio_url {
            scene.dialog_audio_url = Some(url);
        }
        if let Some(url) = self.description_audio_url {
            scene.description_audio_url = Some(url);
        }
        if let Some(url) = self.image_url {
            scene.image_url = Some(url);
        }
        if let Some(choices) = self.choices {
            scene.choices = choices;
        }
    }
}

/// Command to add a scene to a story.
#[derive(Debug, Clone)]
pub struct CreateScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story receiving the scene.
    pub story_id: Uuid,
    /// Scene content. Without a step number the scene is appended.
    pub fields: SceneFields,
}

impl Command for CreateScene {
    fn command_type(&self) -> &'static str {
        "stories.create_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to edit a scene in place.
#[derive(Debug, Clone)]
pub struct UpdateScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story owning the scene.
    pub story_id: Uuid,
    /// The scene to edit.
    pub scene_id: Uuid,
    /// Fields to change.
    pub fields: SceneFields,
}

impl Command for UpdateScene {
    fn command_type(&self) -> &'static str {
        "stories.update_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a scene.
#[derive(Debug, Clone)]
pub struct DeleteScene {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user issuing the command.
    pub owner: UserId,
    /// The story owning the scene.
    pub story_id: Uuid,
    /// The scene to remove.
    pub scene_id: Uuid,
}

impl Command for DeleteScene {
    fn command_type(&self) -> &'static str {
        "stories.delete_scene"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to record where a reader is in a story.
#[derive(Debug, Clone)]
pub struct SaveProgress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The reader saving their place.
    pub reader: UserId,
    /// The story being read.
    pub story_id: Uuid,
    /// Step number of the scene the reader is on.
    pub step_number: i32,
    /// Texts of the choices taken so far, oldest first.
    pub choices: Vec<String>,
}

impl Command for SaveProgress {
    fn command_type(&self) -> &'static str {
        "stories.save_progress"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
