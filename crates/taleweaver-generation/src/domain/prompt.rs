//! Prompt construction for next-scene generation.

/// What the text generator is told about the story so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryContext {
    /// The choice just taken, or a summary of where the story stands.
    pub current_scene: String,
    /// Choices taken earlier, oldest first.
    pub previous_choices: Vec<String>,
}

/// Builds the completion prompt. The reply is expected to contain a single
/// JSON object with `narration`, `dialog`, `sceneDescription` and three
/// `choices`.
#[must_use]
pub fn build_prompt(context: &StoryContext) -> String {
    let previous = if context.previous_choices.is_empty() {
        "none".to_owned()
    } else {
        context.previous_choices.join(", ")
    };

    format!(
        r#"Write the next scene of an interactive story.

Story so far:
- Current scene: "{current}"
- Previous choices: {previous}

The scene needs an atmospheric narration, lines of character dialog, a
detailed description of the surroundings, and three distinct choices for
the reader.

Reply with exactly this JSON shape:
{{
  "narration": "A short, atmospheric account of the moment",
  "dialog": "What the characters say",
  "sceneDescription": "A detailed description of the surroundings",
  "choices": [
    {{ "text": "First choice", "consequence": "A hint of what follows", "voiceId": "21m00Tcm4TlvDq8ikWAM" }},
    {{ "text": "Second choice", "consequence": "A hint of what follows", "voiceId": "AZnzlk1XvdvUeBnXmlld" }},
    {{ "text": "Third choice", "consequence": "A hint of what follows", "voiceId": "EXAVITQu4vr4xnSDxMaL" }}
  ]
}}

Keep the story consistent with the choices already made."#,
        current = context.current_scene,
    )
}
