//! Command handlers for the Scene Generation context.
//!
//! Generated audio is written to the asset store before the scene record is
//! persisted. When persisting fails the stored clip is deleted again so no
//! asset is left without a scene pointing at it.

use taleweaver_core::clock::Clock;
use taleweaver_core::collaborator::{AssetStore, ImageGenerator, SpeechSynthesizer, TextGenerator};
use taleweaver_core::command::Command;
use taleweaver_core::error::DomainError;
use taleweaver_core::repository::StoryRepository;
use taleweaver_core::story::{AudioKind, Scene, Story, UserId};
use taleweaver_stories::application::query_handlers::get_owned_story;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::commands::{
    GenerateCoverImage, GenerateNextScene, GenerateSceneImage, SynthesizePreview,
    SynthesizeSceneAudio,
};
use crate::domain::draft::{GenerationError, SceneDraft, fallback_scene, parse_scene_draft};
use crate::domain::prompt::{StoryContext, build_prompt};
use crate::domain::voices::DEFAULT_VOICE_ID;

const STORY_START: &str = "The story begins";

/// Asks the text generator for the next scene and parses its reply.
///
/// # Errors
///
/// Returns `GenerationError::Upstream` if the generator call fails, or a
/// parse error if the completion is not a usable scene.
pub async fn generate_scene_draft(
    context: &StoryContext,
    text: &dyn TextGenerator,
) -> Result<SceneDraft, GenerationError> {
    let completion = text
        .complete(&build_prompt(context))
        .await
        .map_err(|e| GenerationError::Upstream(e.to_string()))?;
    debug!(completion_len = completion.len(), "completion received");
    parse_scene_draft(&completion)
}

/// Handles the `GenerateNextScene` command.
///
/// The scene is written by the text generator, or taken from the
/// hand-authored fallbacks when generation fails. Its narration is voiced
/// with the voice attached to the choice taken; a failed synthesis leaves
/// the scene without narration audio rather than failing the command.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the caller does not own the story,
/// or the repository's error if the scene cannot be stored.
pub async fn handle_generate_next_scene(
    command: &GenerateNextScene,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
    text: &dyn TextGenerator,
    speech: &dyn SpeechSynthesizer,
    assets: &dyn AssetStore,
) -> Result<Scene, DomainError> {
    get_owned_story(command.story_id, &command.owner, repo).await?;
    let scenes = repo.list_scenes(command.story_id).await?;
    let latest = scenes.last();

    let context = story_context(command, latest);
    let draft = match generate_scene_draft(&context, text).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!(
                correlation_id = %command.correlation_id(),
                error = %e,
                "scene generation failed, using fallback scene"
            );
            fallback_scene(&context.current_scene)
        }
    };

    let step_number = latest.map_or(1, |scene| scene.step_number + 1);
    let mut scene = Scene::new(Uuid::new_v4(), command.story_id, step_number, clock.now());
    scene.narration = draft.narration;
    scene.dialog = draft.dialog;
    scene.description = draft.scene_description;
    scene.choices = draft.choices;

    let voice_id = narration_voice(command.choice.as_deref(), latest);
    let key = asset_key(&command.owner, scene.id, AudioKind::Narration, clock);
    let stored_key = match store_clip(&scene.narration, voice_id, &key, speech, assets).await {
        Ok(url) => {
            scene.narration_audio_url = Some(url);
            Some(key)
        }
        Err(e) => {
            warn!(
                correlation_id = %command.correlation_id(),
                scene_id = %scene.id,
                error = %e,
                "narration audio unavailable, storing scene without it"
            );
            None
        }
    };

    if let Err(e) = repo.insert_scene(&scene).await {
        if let Some(key) = stored_key {
            discard_asset(assets, &key).await;
        }
        return Err(e);
    }

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %scene.story_id,
        scene_id = %scene.id,
        step = scene.step_number,
        "scene generated"
    );
    Ok(scene)
}

/// Handles the `SynthesizeSceneAudio` command. A previous clip reference of
/// the same kind is replaced; the old asset is left in place.
///
/// # Errors
///
/// Returns `DomainError::SceneNotFound` if the scene does not exist,
/// `DomainError::Validation` if the addressed text field is empty, and
/// `DomainError::UpstreamGeneration` if synthesis fails.
pub async fn handle_synthesize_scene_audio(
    command: &SynthesizeSceneAudio,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
    speech: &dyn SpeechSynthesizer,
    assets: &dyn AssetStore,
) -> Result<Scene, DomainError> {
    let mut scene = owned_scene(command.story_id, command.scene_id, &command.owner, repo).await?;

    let text = scene.text(command.kind).trim().to_owned();
    if text.is_empty() {
        return Err(DomainError::Validation(format!(
            "scene has no {} text to voice",
            command.kind
        )));
    }

    let voice_id = command.voice_id.as_deref().unwrap_or(DEFAULT_VOICE_ID);
    let key = asset_key(&command.owner, scene.id, command.kind, clock);
    let url = store_clip(&text, voice_id, &key, speech, assets).await?;

    let previous = scene.set_audio_url(command.kind, url);
    scene.updated_at = clock.now();
    if let Err(e) = repo.update_scene(&scene).await {
        discard_asset(assets, &key).await;
        return Err(e);
    }

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        scene_id = %scene.id,
        kind = %command.kind,
        replaced = previous.is_some(),
        "scene audio synthesized"
    );
    Ok(scene)
}

/// Handles the `GenerateSceneImage` command.
///
/// # Errors
///
/// Returns `DomainError::SceneNotFound` if the scene does not exist,
/// `DomainError::Validation` if there is nothing to prompt with, and
/// `DomainError::UpstreamGeneration` if the image cannot be generated.
pub async fn handle_generate_scene_image(
    command: &GenerateSceneImage,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
    images: &dyn ImageGenerator,
) -> Result<Scene, DomainError> {
    let mut scene = owned_scene(command.story_id, command.scene_id, &command.owner, repo).await?;

    let prompt = command
        .prompt
        .as_deref()
        .unwrap_or(&scene.description)
        .trim()
        .to_owned();
    if prompt.is_empty() {
        return Err(DomainError::Validation(
            "an image prompt or scene description is required".into(),
        ));
    }

    scene.image_url = Some(images.generate_image(&prompt).await?);
    scene.updated_at = clock.now();
    repo.update_scene(&scene).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        scene_id = %scene.id,
        "scene image generated"
    );
    Ok(scene)
}

/// Handles the `GenerateCoverImage` command.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the caller does not own the story,
/// `DomainError::Validation` for a blank prompt, and
/// `DomainError::UpstreamGeneration` if the image cannot be generated.
pub async fn handle_generate_cover_image(
    command: &GenerateCoverImage,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
    images: &dyn ImageGenerator,
) -> Result<Story, DomainError> {
    let prompt = command.prompt.trim();
    if prompt.is_empty() {
        return Err(DomainError::Validation("image prompt must not be empty".into()));
    }
    let mut story = get_owned_story(command.story_id, &command.owner, repo).await?;

    story.image_url = Some(images.generate_image(prompt).await?);
    story.updated_at = clock.now();
    repo.update_story(&story).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %story.id,
        "cover image generated"
    );
    Ok(story)
}

/// Handles the `SynthesizePreview` command. Nothing is stored.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank text and
/// `DomainError::UpstreamGeneration` if synthesis fails.
pub async fn handle_synthesize_preview(
    command: &SynthesizePreview,
    speech: &dyn SpeechSynthesizer,
) -> Result<Vec<u8>, DomainError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation("text must not be empty".into()));
    }
    let voice_id = command.voice_id.as_deref().unwrap_or(DEFAULT_VOICE_ID);
    let audio = speech.synthesize(text, voice_id).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        voice_id,
        bytes = audio.len(),
        "preview synthesized"
    );
    Ok(audio)
}

fn story_context(command: &GenerateNextScene, latest: Option<&Scene>) -> StoryContext {
    let current_scene = match (&command.choice, latest) {
        (Some(choice), _) => choice.clone(),
        (None, Some(scene)) if !scene.narration.is_empty() => scene.narration.clone(),
        _ => STORY_START.to_owned(),
    };
    StoryContext {
        current_scene,
        previous_choices: command.previous_choices.clone(),
    }
}

/// Voice of the choice taken from `latest`, or the default narrator.
fn narration_voice<'a>(choice: Option<&str>, latest: Option<&'a Scene>) -> &'a str {
    latest
        .zip(choice)
        .and_then(|(scene, choice)| scene.choices.iter().find(|c| c.text == choice))
        .map(|c| c.voice_id.as_str())
        .filter(|voice| !voice.is_empty())
        .unwrap_or(DEFAULT_VOICE_ID)
}

/// Key of a new clip. Never reused, even for two clips of the same field
/// stored within one millisecond.
fn asset_key(owner: &UserId, scene_id: Uuid, kind: AudioKind, clock: &dyn Clock) -> String {
    format!(
        "audio/{owner}/{scene_id}/{kind}-{}-{}.mp3",
        clock.now_millis(),
        Uuid::new_v4()
    )
}

async fn store_clip(
    text: &str,
    voice_id: &str,
    key: &str,
    speech: &dyn SpeechSynthesizer,
    assets: &dyn AssetStore,
) -> Result<String, DomainError> {
    let audio = speech.synthesize(text, voice_id).await?;
    assets.put(&audio, key).await
}

async fn discard_asset(assets: &dyn AssetStore, key: &str) {
    if let Err(e) = assets.delete(key).await {
        warn!(key, error = %e, "failed to remove orphaned asset");
    }
}

async fn owned_scene(
    story_id: Uuid,
    scene_id: Uuid,
    owner: &UserId,
    repo: &dyn StoryRepository,
) -> Result<Scene, DomainError> {
    get_owned_story(story_id, owner, repo).await?;
    repo.find_scene(story_id, scene_id)
        .await?
        .ok_or(DomainError::SceneNotFound(scene_id))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use taleweaver_core::error::DomainError;
    use taleweaver_core::story::{AudioKind, Choice, Scene, Story, UserId};
    use uuid::Uuid;

    use crate::application::command_handlers::{
        handle_generate_cover_image, handle_generate_next_scene, handle_generate_scene_image,
        handle_synthesize_preview, handle_synthesize_scene_audio,
    };
    use crate::domain::commands::{
        GenerateCoverImage, GenerateNextScene, GenerateSceneImage, SynthesizePreview,
        SynthesizeSceneAudio,
    };
    use crate::domain::voices::DEFAULT_VOICE_ID;
    use taleweaver_test_support::{
        FailingImageGenerator, FailingSpeechSynthesizer, FixedClock, InMemoryAssetStore,
        InMemoryStoryRepository, RecordingSpeechSynthesizer, ScriptedTextGenerator,
        StaticImageGenerator, fixed_now,
    };

    const GENERATED: &str = r#"Sure! {
        "narration": "Lanterns sway between the trunks.",
        "dialog": "Welcome, traveller.",
        "sceneDescription": "A clearing lit by floating lanterns.",
        "choices": [
            { "text": "Greet the lantern keeper", "consequence": "A new friend", "voiceId": "EXAVITQu4vr4xnSDxMaL" },
            { "text": "Slip past quietly", "consequence": "Unseen, for now", "voiceId": "AZnzlk1XvdvUeBnXmlld" }
        ]
    }"#;

    fn owner() -> UserId {
        UserId::new("user_1")
    }

    fn opening_scene(story_id: Uuid) -> Scene {
        let mut scene = Scene::new(Uuid::new_v4(), story_id, 1, fixed_now());
        scene.narration = "Welcome to an enchanted realm.".into();
        scene.dialog = "What would you like to do?".into();
        scene.description = "A crossroads under a violet sky.".into();
        scene.choices = vec![
            Choice {
                text: "Enter the enchanted forest".into(),
                consequence: "The forest holds many secrets".into(),
                voice_id: "AZnzlk1XvdvUeBnXmlld".into(),
            },
            Choice {
                text: "Visit the ancient temple".into(),
                consequence: String::new(),
                voice_id: String::new(),
            },
        ];
        scene
    }

    fn seeded() -> (Story, Scene, InMemoryStoryRepository) {
        let story = Story::new(Uuid::new_v4(), owner(), "The Glade", fixed_now());
        let scene = opening_scene(story.id);
        let repo = InMemoryStoryRepository::with(vec![story.clone()], vec![scene.clone()]);
        (story, scene, repo)
    }

    fn next_scene(story_id: Uuid, choice: Option<&str>) -> GenerateNextScene {
        GenerateNextScene {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id,
            choice: choice.map(str::to_owned),
            previous_choices: vec!["Meet the village elder".into()],
        }
    }

    fn synthesize(story_id: Uuid, scene_id: Uuid, kind: AudioKind) -> SynthesizeSceneAudio {
        SynthesizeSceneAudio {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id,
            scene_id,
            kind,
            voice_id: None,
        }
    }

    #[tokio::test]
    async fn test_generate_next_scene_appends_voiced_scene() {
        // Arrange
        let (story, _, repo) = seeded();
        let clock = FixedClock(fixed_now());
        let text = ScriptedTextGenerator::replying(GENERATED);
        let speech = RecordingSpeechSynthesizer::new();
        let assets = InMemoryAssetStore::new();
        let command = next_scene(story.id, Some("Enter the enchanted forest"));

        // Act
        let scene = handle_generate_next_scene(&command, &clock, &repo, &text, &speech, &assets)
            .await
            .unwrap();

        // Assert
        assert_eq!(scene.step_number, 2);
        assert_eq!(scene.narration, "Lanterns sway between the trunks.");
        assert_eq!(scene.description, "A clearing lit by floating lanterns.");
        assert_eq!(scene.choices.len(), 2);

        let url = scene.narration_audio_url.clone().unwrap();
        let key = url.strip_prefix("memory://").unwrap();
        assert!(key.starts_with(&format!(
            "audio/user_1/{}/narration-{}-",
            scene.id,
            fixed_now().timestamp_millis()
        )));
        assert!(key.ends_with(".mp3"));
        assert_eq!(
            assets.get(key),
            Some(b"AZnzlk1XvdvUeBnXmlld:Lanterns sway between the trunks.".to_vec())
        );
        assert_eq!(
            speech.calls(),
            vec![(
                "Lanterns sway between the trunks.".to_owned(),
                "AZnzlk1XvdvUeBnXmlld".to_owned()
            )]
        );

        let prompts = text.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Current scene: \"Enter the enchanted forest\""));
        assert!(prompts[0].contains("Previous choices: Meet the village elder"));

        assert_eq!(repo.scenes_of(story.id).len(), 2);
    }

    #[tokio::test]
    async fn test_generate_next_scene_uses_default_voice_for_unvoiced_choice() {
        let (story, _, repo) = seeded();
        let text = ScriptedTextGenerator::replying(GENERATED);
        let speech = RecordingSpeechSynthesizer::new();
        let command = next_scene(story.id, Some("Visit the ancient temple"));

        handle_generate_next_scene(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &text,
            &speech,
            &InMemoryAssetStore::new(),
        )
        .await
        .unwrap();

        assert_eq!(speech.calls()[0].1, DEFAULT_VOICE_ID);
    }

    #[tokio::test]
    async fn test_generate_next_scene_falls_back_on_unparseable_completion() {
        let (story, _, repo) = seeded();
        let text = ScriptedTextGenerator::replying("I'd rather write a poem.");
        let command = next_scene(story.id, Some("Enter the enchanted forest"));

        let scene = handle_generate_next_scene(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &text,
            &RecordingSpeechSynthesizer::new(),
            &InMemoryAssetStore::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            scene.narration,
            "The forest comes alive with mysterious sounds and shifting shadows."
        );
        assert_eq!(scene.choices[0].text, "Follow a glowing path");
        assert_eq!(scene.step_number, 2);
    }

    #[tokio::test]
    async fn test_generate_first_scene_falls_back_to_opening_on_upstream_failure() {
        // Arrange
        let story = Story::new(Uuid::new_v4(), owner(), "Blank Page", fixed_now());
        let repo = InMemoryStoryRepository::with(vec![story.clone()], Vec::new());
        let text = ScriptedTextGenerator::new(vec![Err(DomainError::UpstreamGeneration(
            "rate limited".into(),
        ))]);
        let command = next_scene(story.id, None);

        // Act
        let scene = handle_generate_next_scene(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &text,
            &RecordingSpeechSynthesizer::new(),
            &InMemoryAssetStore::new(),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(scene.step_number, 1);
        assert_eq!(
            scene.narration,
            "Welcome to an enchanted realm where magic and mystery intertwine."
        );
        assert!(text.prompts()[0].contains("The story begins"));
    }

    #[tokio::test]
    async fn test_generate_next_scene_survives_speech_failure() {
        let (story, _, repo) = seeded();
        let assets = InMemoryAssetStore::new();
        let command = next_scene(story.id, Some("Enter the enchanted forest"));

        let scene = handle_generate_next_scene(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &ScriptedTextGenerator::replying(GENERATED),
            &FailingSpeechSynthesizer,
            &assets,
        )
        .await
        .unwrap();

        assert_eq!(scene.narration_audio_url, None);
        assert!(assets.keys().is_empty());
        assert_eq!(repo.scenes_of(story.id)[1], scene);
    }

    #[tokio::test]
    async fn test_generate_next_scene_for_foreign_story_is_not_found() {
        let (story, _, repo) = seeded();
        let text = ScriptedTextGenerator::replying(GENERATED);
        let mut command = next_scene(story.id, None);
        command.owner = UserId::new("intruder");

        let result = handle_generate_next_scene(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &text,
            &RecordingSpeechSynthesizer::new(),
            &InMemoryAssetStore::new(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::StoryNotFound(id)) if id == story.id));
        assert!(text.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_scene_audio_stores_clip_and_reference() {
        // Arrange
        let (story, scene, repo) = seeded();
        let later = fixed_now() + Duration::minutes(5);
        let clock = FixedClock(later);
        let speech = RecordingSpeechSynthesizer::new();
        let assets = InMemoryAssetStore::new();
        let mut command = synthesize(story.id, scene.id, AudioKind::Dialog);
        command.voice_id = Some("EXAVITQu4vr4xnSDxMaL".into());

        // Act
        let updated = handle_synthesize_scene_audio(&command, &clock, &repo, &speech, &assets)
            .await
            .unwrap();

        // Assert
        let url = updated.dialog_audio_url.clone().unwrap();
        assert!(url.starts_with(&format!(
            "memory://audio/user_1/{}/dialog-{}-",
            scene.id,
            later.timestamp_millis()
        )));
        assert_eq!(assets.keys(), vec![url["memory://".len()..].to_owned()]);
        assert_eq!(updated.updated_at, later);
        assert_eq!(
            speech.calls(),
            vec![(
                "What would you like to do?".to_owned(),
                "EXAVITQu4vr4xnSDxMaL".to_owned()
            )]
        );
        assert_eq!(repo.scenes_of(story.id)[0], updated);
    }

    #[tokio::test]
    async fn test_synthesize_scene_audio_replaces_previous_reference() {
        let story = Story::new(Uuid::new_v4(), owner(), "The Glade", fixed_now());
        let mut scene = opening_scene(story.id);
        scene.narration_audio_url = Some("memory://old.mp3".into());
        let repo = InMemoryStoryRepository::with(vec![story.clone()], vec![scene.clone()]);
        let assets = InMemoryAssetStore::new();

        let updated = handle_synthesize_scene_audio(
            &synthesize(story.id, scene.id, AudioKind::Narration),
            &FixedClock(fixed_now()),
            &repo,
            &RecordingSpeechSynthesizer::new(),
            &assets,
        )
        .await
        .unwrap();

        assert_ne!(updated.narration_audio_url.as_deref(), Some("memory://old.mp3"));
        assert!(assets.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_scene_audio_rejects_empty_text() {
        let story = Story::new(Uuid::new_v4(), owner(), "The Glade", fixed_now());
        let scene = Scene::new(Uuid::new_v4(), story.id, 1, fixed_now());
        let repo = InMemoryStoryRepository::with(vec![story.clone()], vec![scene.clone()]);
        let speech = RecordingSpeechSynthesizer::new();

        let result = handle_synthesize_scene_audio(
            &synthesize(story.id, scene.id, AudioKind::Description),
            &FixedClock(fixed_now()),
            &repo,
            &speech,
            &InMemoryAssetStore::new(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(speech.calls().is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_scene_audio_removes_clip_when_update_fails() {
        // Arrange
        let (story, scene, repo) = seeded();
        repo.reject_scene_updates();
        let assets = InMemoryAssetStore::new();

        // Act
        let result = handle_synthesize_scene_audio(
            &synthesize(story.id, scene.id, AudioKind::Narration),
            &FixedClock(fixed_now()),
            &repo,
            &RecordingSpeechSynthesizer::new(),
            &assets,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(assets.keys().is_empty());
        assert_eq!(assets.deleted().len(), 1);
        assert_eq!(repo.scenes_of(story.id)[0].narration_audio_url, None);
    }

    #[tokio::test]
    async fn test_failed_regeneration_keeps_clip_of_saved_scene() {
        // Arrange
        let (story, scene, repo) = seeded();
        let clock = FixedClock(fixed_now());
        let speech = RecordingSpeechSynthesizer::new();
        let assets = InMemoryAssetStore::new();
        let command = synthesize(story.id, scene.id, AudioKind::Narration);
        let saved = handle_synthesize_scene_audio(&command, &clock, &repo, &speech, &assets)
            .await
            .unwrap();
        let saved_key = saved.narration_audio_url.unwrap()["memory://".len()..].to_owned();

        // Act
        repo.reject_scene_updates();
        let result = handle_synthesize_scene_audio(&command, &clock, &repo, &speech, &assets).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert_eq!(assets.keys(), vec![saved_key.clone()]);
        let deleted = assets.deleted();
        assert_eq!(deleted.len(), 1);
        assert_ne!(deleted[0], saved_key);
        assert_eq!(
            repo.scenes_of(story.id)[0].narration_audio_url,
            Some(format!("memory://{saved_key}"))
        );
    }

    #[tokio::test]
    async fn test_synthesize_scene_audio_propagates_speech_failure() {
        let (story, scene, repo) = seeded();
        let assets = InMemoryAssetStore::new();

        let result = handle_synthesize_scene_audio(
            &synthesize(story.id, scene.id, AudioKind::Narration),
            &FixedClock(fixed_now()),
            &repo,
            &FailingSpeechSynthesizer,
            &assets,
        )
        .await;

        assert!(matches!(result, Err(DomainError::UpstreamGeneration(_))));
        assert!(assets.keys().is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_scene_audio_for_missing_scene() {
        let (story, _, repo) = seeded();
        let missing = Uuid::new_v4();

        let result = handle_synthesize_scene_audio(
            &synthesize(story.id, missing, AudioKind::Narration),
            &FixedClock(fixed_now()),
            &repo,
            &RecordingSpeechSynthesizer::new(),
            &InMemoryAssetStore::new(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::SceneNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_generate_scene_image_prompts_with_description() {
        let (story, scene, repo) = seeded();
        let images = StaticImageGenerator::new("https://img.example/forest.png");
        let command = GenerateSceneImage {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id: story.id,
            scene_id: scene.id,
            prompt: None,
        };

        let updated = handle_generate_scene_image(&command, &FixedClock(fixed_now()), &repo, &images)
            .await
            .unwrap();

        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://img.example/forest.png")
        );
        assert_eq!(images.prompts(), vec!["A crossroads under a violet sky.".to_owned()]);
        assert_eq!(repo.scenes_of(story.id)[0], updated);
    }

    #[tokio::test]
    async fn test_generate_scene_image_requires_prompt_or_description() {
        let story = Story::new(Uuid::new_v4(), owner(), "The Glade", fixed_now());
        let scene = Scene::new(Uuid::new_v4(), story.id, 1, fixed_now());
        let repo = InMemoryStoryRepository::with(vec![story.clone()], vec![scene.clone()]);
        let images = StaticImageGenerator::new("https://img.example/x.png");
        let command = GenerateSceneImage {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id: story.id,
            scene_id: scene.id,
            prompt: Some("  ".into()),
        };

        let result =
            handle_generate_scene_image(&command, &FixedClock(fixed_now()), &repo, &images).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(images.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_generate_scene_image_failure_leaves_scene_unchanged() {
        let (story, scene, repo) = seeded();
        let command = GenerateSceneImage {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id: story.id,
            scene_id: scene.id,
            prompt: Some("A glowing clearing".into()),
        };

        let result = handle_generate_scene_image(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &FailingImageGenerator,
        )
        .await;

        assert!(matches!(result, Err(DomainError::UpstreamGeneration(_))));
        assert_eq!(repo.scenes_of(story.id)[0], scene);
    }

    #[tokio::test]
    async fn test_generate_cover_image_sets_story_image() {
        let (story, _, repo) = seeded();
        let images = StaticImageGenerator::new("https://img.example/cover.png");
        let command = GenerateCoverImage {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id: story.id,
            prompt: "An enchanted forest at dusk".into(),
        };

        let updated = handle_generate_cover_image(&command, &FixedClock(fixed_now()), &repo, &images)
            .await
            .unwrap();

        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://img.example/cover.png")
        );
        assert_eq!(repo.story(story.id), Some(updated));
    }

    #[tokio::test]
    async fn test_generate_cover_image_rejects_blank_prompt() {
        let (story, _, repo) = seeded();
        let command = GenerateCoverImage {
            correlation_id: Uuid::new_v4(),
            owner: owner(),
            story_id: story.id,
            prompt: String::new(),
        };

        let result = handle_generate_cover_image(
            &command,
            &FixedClock(fixed_now()),
            &repo,
            &StaticImageGenerator::new("https://img.example/cover.png"),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_synthesize_preview_uses_default_voice() {
        let speech = RecordingSpeechSynthesizer::new();
        let command = SynthesizePreview {
            correlation_id: Uuid::new_v4(),
            text: "Hello there".into(),
            voice_id: None,
        };

        let audio = handle_synthesize_preview(&command, &speech).await.unwrap();

        assert_eq!(audio, format!("{DEFAULT_VOICE_ID}:Hello there").into_bytes());
    }

    #[tokio::test]
    async fn test_synthesize_preview_rejects_blank_text() {
        let command = SynthesizePreview {
            correlation_id: Uuid::new_v4(),
            text: " ".into(),
            voice_id: Some("AZnzlk1XvdvUeBnXmlld".into()),
        };

        let result = handle_synthesize_preview(&command, &RecordingSpeechSynthesizer::new()).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
