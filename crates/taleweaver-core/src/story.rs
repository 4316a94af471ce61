//! Story, scene and choice records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of the user that owns a story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw user identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three text fields of a scene that can carry generated audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    /// Atmospheric narration.
    Narration,
    /// Character dialog.
    Dialog,
    /// Description of the environment.
    Description,
}

impl AudioKind {
    /// Fixed playback order of a scene's clips.
    pub const PLAYBACK_ORDER: [AudioKind; 3] =
        [AudioKind::Narration, AudioKind::Dialog, AudioKind::Description];

    /// Lower-case name used in asset keys and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Narration => "narration",
            Self::Dialog => "dialog",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A branch offered at the end of a scene.
///
/// Not persisted on its own; serialized into the owning scene's `choices`
/// column as `{"text", "consequence", "voiceId"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the reader.
    pub text: String,
    /// Free-form hint of what follows.
    #[serde(default)]
    pub consequence: String,
    /// Narrator voice used for the scene this choice leads to.
    #[serde(default, rename = "voiceId")]
    pub voice_id: String,
}

/// A story owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// Owning user.
    pub owner: UserId,
    /// Display title.
    pub title: String,
    /// Cover illustration.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Creates a story with no cover image.
    #[must_use]
    pub fn new(id: Uuid, owner: UserId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            title: title.into(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `user` owns this story.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner == *user
    }
}

/// One step of a branching story.
///
/// `step_number` is unique within a story and defines playback order. Audio
/// URLs point at immutable assets; regenerating a field replaces the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene identifier.
    pub id: Uuid,
    /// Parent story.
    pub story_id: Uuid,
    /// Position in the story's play order.
    pub step_number: i32,
    /// Narration text.
    pub narration: String,
    /// Dialog text.
    pub dialog: String,
    /// Description text.
    pub description: String,
    /// Narration clip.
    pub narration_audio_url: Option<String>,
    /// Dialog clip.
    pub dialog_audio_url: Option<String>,
    /// Description clip.
    pub description_audio_url: Option<String>,
    /// Scene illustration.
    pub image_url: Option<String>,
    /// Branches offered after this scene.
    pub choices: Vec<Choice>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Scene {
    /// Creates a scene with no audio, image or choices.
    #[must_use]
    pub fn new(id: Uuid, story_id: Uuid, step_number: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            story_id,
            step_number,
            narration: String::new(),
            dialog: String::new(),
            description: String::new(),
            narration_audio_url: None,
            dialog_audio_url: None,
            description_audio_url: None,
            image_url: None,
            choices: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the text field for `kind`.
    #[must_use]
    pub fn text(&self, kind: AudioKind) -> &str {
        match kind {
            AudioKind::Narration => &self.narration,
            AudioKind::Dialog => &self.dialog,
            AudioKind::Description => &self.description,
        }
    }

    /// Returns the audio URL for `kind`, if one was generated.
    #[must_use]
    pub fn audio_url(&self, kind: AudioKind) -> Option<&str> {
        match kind {
            AudioKind::Narration => self.narration_audio_url.as_deref(),
            AudioKind::Dialog => self.dialog_audio_url.as_deref(),
            AudioKind::Description => self.description_audio_url.as_deref(),
        }
    }

    /// Replaces the audio URL for `kind`, returning the previous one.
    pub fn set_audio_url(&mut self, kind: AudioKind, url: String) -> Option<String> {
        let slot = match kind {
            AudioKind::Narration => &mut self.narration_audio_url,
            AudioKind::Dialog => &mut self.dialog_audio_url,
            AudioKind::Description => &mut self.description_audio_url,
        };
        slot.replace(url)
    }
}

/// A reader's saved place in a story.
///
/// There is at most one record per reader and story; saving again overwrites
/// it. Readers need not own the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryProgress {
    /// The reader the progress belongs to.
    pub reader: UserId,
    /// The story being read.
    pub story_id: Uuid,
    /// Step number of the scene the reader is on.
    pub step_number: i32,
    /// Texts of the choices taken so far, oldest first.
    pub choices: Vec<String>,
    /// When the progress was last saved.
    pub updated_at: DateTime<Utc>,
}
