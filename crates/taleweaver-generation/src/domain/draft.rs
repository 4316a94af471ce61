//! Scene drafts: parsing generated scenes and the hand-authored fallbacks.

use serde::Deserialize;
use taleweaver_core::story::Choice;
use thiserror::Error;

/// Choices kept from a generated scene.
pub const CHOICES_PER_SCENE: usize = 3;

/// Scene text produced by the text generator, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDraft {
    pub narration: String,
    #[serde(default)]
    pub dialog: String,
    #[serde(default)]
    pub scene_description: String,
    pub choices: Vec<Choice>,
}

/// Why a completion could not be turned into a scene.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The text generator call itself failed.
    #[error("text generation failed: {0}")]
    Upstream(String),

    /// The completion contained no `{ ... }` block.
    #[error("completion contains no JSON object")]
    NoJson,

    /// The JSON block did not match the scene shape.
    #[error("malformed scene: {0}")]
    Malformed(String),
}

/// Extracts the scene from a completion.
///
/// Models tend to wrap the JSON in prose or code fences, so the object is
/// taken from the first `{` to the last `}`. Extra choices beyond
/// [`CHOICES_PER_SCENE`] are dropped.
///
/// # Errors
///
/// Returns `GenerationError::NoJson` if there is no object, and
/// `GenerationError::Malformed` if it does not describe a scene with
/// narration and at least one choice.
pub fn parse_scene_draft(completion: &str) -> Result<SceneDraft, GenerationError> {
    let start = completion.find('{').ok_or(GenerationError::NoJson)?;
    let end = completion
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or(GenerationError::NoJson)?;

    let mut draft: SceneDraft = serde_json::from_str(&completion[start..=end])
        .map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if draft.narration.trim().is_empty() {
        return Err(GenerationError::Malformed("narration is empty".into()));
    }
    draft.choices.retain(|choice| !choice.text.trim().is_empty());
    if draft.choices.is_empty() {
        return Err(GenerationError::Malformed("scene offers no choices".into()));
    }
    draft.choices.truncate(CHOICES_PER_SCENE);
    Ok(draft)
}

struct FallbackScene {
    narration: &'static str,
    dialog: &'static str,
    description: &'static str,
    choices: [(&'static str, &'static str, &'static str); CHOICES_PER_SCENE],
}

impl FallbackScene {
    fn to_draft(&self) -> SceneDraft {
        SceneDraft {
            narration: self.narration.to_owned(),
            dialog: self.dialog.to_owned(),
            scene_description: self.description.to_owned(),
            choices: self
                .choices
                .iter()
                .map(|&(text, consequence, voice_id)| Choice {
                    text: text.to_owned(),
                    consequence: consequence.to_owned(),
                    voice_id: voice_id.to_owned(),
                })
                .collect(),
        }
    }
}

const OPENING_SCENE: FallbackScene = FallbackScene {
    narration: "Welcome to an enchanted realm where magic and mystery intertwine.",
    dialog: "Welcome to your adventure! What would you like to do?",
    description: "You stand at the beginning of your journey, where multiple paths await your choice.",
    choices: [
        (
            "Enter the enchanted forest",
            "The forest holds many secrets",
            "21m00Tcm4TlvDq8ikWAM",
        ),
        (
            "Visit the ancient temple",
            "Ancient wisdom awaits",
            "AZnzlk1XvdvUeBnXmlld",
        ),
        (
            "Meet the village elder",
            "Guidance from the wise",
            "EXAVITQu4vr4xnSDxMaL",
        ),
    ],
};

const FALLBACKS: [(&str, FallbackScene); 1] = [(
    "Enter the enchanted forest",
    FallbackScene {
        narration: "The forest comes alive with mysterious sounds and shifting shadows.",
        dialog: "The trees seem to whisper ancient secrets...",
        description: "Towering trees surround you, their branches creating intricate patterns overhead.",
        choices: [
            (
                "Follow a glowing path",
                "The light beckons you deeper",
                "21m00Tcm4TlvDq8ikWAM",
            ),
            (
                "Investigate strange sounds",
                "Something moves in the shadows",
                "AZnzlk1XvdvUeBnXmlld",
            ),
            (
                "Climb a massive tree",
                "A better view awaits above",
                "EXAVITQu4vr4xnSDxMaL",
            ),
        ],
    },
)];

/// Hand-authored scene for the choice just taken, or the opening scene when
/// there is no fallback for it.
#[must_use]
pub fn fallback_scene(current_scene: &str) -> SceneDraft {
    FALLBACKS
        .iter()
        .find(|(choice, _)| *choice == current_scene)
        .map_or_else(|| OPENING_SCENE.to_draft(), |(_, scene)| scene.to_draft())
}
