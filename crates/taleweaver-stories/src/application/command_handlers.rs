//! Command handlers for the Story & Scene management context.
//!
//! Each authoring handler checks that the caller owns the addressed story,
//! applies the change, and persists it through the `StoryRepository`. Saving
//! reading progress only needs the story to exist.

use taleweaver_core::clock::Clock;
use taleweaver_core::command::Command;
use taleweaver_core::error::DomainError;
use taleweaver_core::repository::StoryRepository;
use taleweaver_core::story::{Scene, Story, StoryProgress};
use tracing::info;
use uuid::Uuid;

use crate::application::query_handlers::get_owned_story;
use crate::domain::commands::{
    CreateScene, CreateStory, DeleteScene, DeleteStory, SaveProgress, UpdateScene, UpdateStory,
};

fn validated_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("title must not be empty".into()));
    }
    Ok(title.to_owned())
}

/// Handles the `CreateStory` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank title, or the repository's
/// error if the insert fails.
pub async fn handle_create_story(
    command: &CreateStory,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
) -> Result<Story, DomainError> {
    let title = validated_title(&command.title)?;
    let story = Story::new(Uuid::new_v4(), command.owner.clone(), title, clock.now());
    repo.insert_story(&story).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %story.id,
        "story created"
    );
    Ok(story)
}

/// Handles the `UpdateStory` command.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the caller does not own the story,
/// `DomainError::Validation` for a blank title.
pub async fn handle_update_story(
    command: &UpdateStory,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
) -> Result<Story, DomainError> {
    let mut story = get_owned_story(command.story_id, &command.owner, repo).await?;

    if let Some(title) = &command.title {
        story.title = validated_title(title)?;
    }
    if let Some(image_url) = &command.image_url {
        story.image_url = Some(image_url.clone());
    }
    story.updated_at = clock.now();
    repo.update_story(&story).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %story.id,
        "story updated"
    );
    Ok(story)
}

/// Handles the `DeleteStory` command. Scenes go with the story.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the caller does not own the story.
pub async fn handle_delete_story(
    command: &DeleteStory,
    repo: &dyn StoryRepository,
) -> Result<(), DomainError> {
    get_owned_story(command.story_id, &command.owner, repo).await?;
    repo.delete_story(command.story_id).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %command.story_id,
        "story deleted"
    );
    Ok(())
}

/// Handles the `CreateScene` command.
///
/// Without an explicit step number the scene is appended after the current
/// last step.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the caller does not own the story,
/// `DomainError::Validation` for a bad step number, and `DomainError::Conflict`
/// if the step is already taken.
pub async fn handle_create_scene(
    command: &CreateScene,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
) -> Result<Scene, DomainError> {
    command.fields.validate()?;
    get_owned_story(command.story_id, &command.owner, repo).await?;

    let step_number = match command.fields.step_number {
        Some(step) => step,
        None => next_step_number(command.story_id, repo).await?,
    };
    let mut scene = Scene::new(Uuid::new_v4(), command.story_id, step_number, clock.now());
    command.fields.clone().apply_to(&mut scene);
    repo.insert_scene(&scene).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %scene.story_id,
        scene_id = %scene.id,
        step = scene.step_number,
        "scene created"
    );
    Ok(scene)
}

/// Step number for a scene appended to `story_id`.
///
/// # Errors
///
/// Returns the repository's error if the scenes cannot be listed.
pub async fn next_step_number(
    story_id: Uuid,
    repo: &dyn StoryRepository,
) -> Result<i32, DomainError> {
    let scenes = repo.list_scenes(story_id).await?;
    Ok(scenes.iter().map(|s| s.step_number).max().unwrap_or(0) + 1)
}

/// Handles the `UpdateScene` command.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` / `DomainError::SceneNotFound` if the
/// scene is not reachable by the caller, `DomainError::Conflict` if a new step
/// number is already taken.
pub async fn handle_update_scene(
    command: &UpdateScene,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
) -> Result<Scene, DomainError> {
    command.fields.validate()?;
    get_owned_story(command.story_id, &command.owner, repo).await?;

    let mut scene = repo
        .find_scene(command.story_id, command.scene_id)
        .await?
        .ok_or(DomainError::SceneNotFound(command.scene_id))?;
    command.fields.clone().apply_to(&mut scene);
    scene.updated_at = clock.now();
    repo.update_scene(&scene).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        scene_id = %scene.id,
        "scene updated"
    );
    Ok(scene)
}

/// Handles the `DeleteScene` command. Generated assets are left in place.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` / `DomainError::SceneNotFound` if the
/// scene is not reachable by the caller.
pub async fn handle_delete_scene(
    command: &DeleteScene,
    repo: &dyn StoryRepository,
) -> Result<(), DomainError> {
    get_owned_story(command.story_id, &command.owner, repo).await?;
    repo.delete_scene(command.story_id, command.scene_id).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        scene_id = %command.scene_id,
        "scene deleted"
    );
    Ok(())
}

/// Handles the `SaveProgress` command, replacing any earlier save of the
/// same reader in the same story.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the story does not exist and
/// `DomainError::Validation` if it has no scene at the given step or a choice
/// text is blank.
pub async fn handle_save_progress(
    command: &SaveProgress,
    clock: &dyn Clock,
    repo: &dyn StoryRepository,
) -> Result<StoryProgress, DomainError> {
    repo.find_story(command.story_id)
        .await?
        .ok_or(DomainError::StoryNotFound(command.story_id))?;

    let scenes = repo.list_scenes(command.story_id).await?;
    if !scenes.iter().any(|s| s.step_number == command.step_number) {
        return Err(DomainError::Validation(format!(
            "story {} has no scene at step {}",
            command.story_id, command.step_number
        )));
    }
    if command.choices.iter().any(|c| c.trim().is_empty()) {
        return Err(DomainError::Validation("choice texts must not be empty".into()));
    }

    let progress = StoryProgress {
        reader: command.reader.clone(),
        story_id: command.story_id,
        step_number: command.step_number,
        choices: command.choices.clone(),
        updated_at: clock.now(),
    };
    repo.save_progress(&progress).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        story_id = %progress.story_id,
        step = progress.step_number,
        "progress saved"
    );
    Ok(progress)
}
