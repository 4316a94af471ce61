//! Query handlers for the Story & Scene management context.
//!
//! This module contains read-side handlers that load stories and scenes from
//! the repository and return read-only view DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taleweaver_core::error::DomainError;
use taleweaver_core::repository::StoryRepository;
use taleweaver_core::story::{Scene, Story, StoryProgress, UserId};
use uuid::Uuid;

/// A story with its scenes in step order. Omits the owner.
#[derive(Debug, Serialize)]
pub struct StoryView {
    /// The story identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Cover illustration.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Scenes ordered by ascending step number.
    pub scenes: Vec<Scene>,
}

/// Text-only digest of a scene, used in story listings.
#[derive(Debug, Serialize)]
pub struct SceneSummary {
    pub id: Uuid,
    pub step_number: i32,
    pub narration: String,
    pub dialog: String,
    pub description: String,
}

/// One entry of a user's story list.
#[derive(Debug, Serialize)]
pub struct StorySummary {
    /// The story identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Cover illustration.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Scene digests in step order.
    pub scenes: Vec<SceneSummary>,
}

fn story_view(story: Story, scenes: Vec<Scene>) -> StoryView {
    StoryView {
        id: story.id,
        title: story.title,
        image_url: story.image_url,
        created_at: story.created_at,
        updated_at: story.updated_at,
        scenes,
    }
}

/// Retrieves a story and its scenes. Public: no ownership check.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the story does not exist.
pub async fn get_story(
    story_id: Uuid,
    repo: &dyn StoryRepository,
) -> Result<StoryView, DomainError> {
    let story = repo
        .find_story(story_id)
        .await?
        .ok_or(DomainError::StoryNotFound(story_id))?;
    let scenes = repo.list_scenes(story_id).await?;
    Ok(story_view(story, scenes))
}

/// Loads a story the caller owns.
///
/// A story owned by someone else is reported exactly like a missing one.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the story does not exist or
/// belongs to another user.
pub async fn get_owned_story(
    story_id: Uuid,
    owner: &UserId,
    repo: &dyn StoryRepository,
) -> Result<Story, DomainError> {
    match repo.find_story(story_id).await? {
        Some(story) if story.is_owned_by(owner) => Ok(story),
        Some(_) => {
            tracing::debug!(%story_id, %owner, "story belongs to another user");
            Err(DomainError::StoryNotFound(story_id))
        }
        None => Err(DomainError::StoryNotFound(story_id)),
    }
}

/// Lists the caller's stories, newest first, with scene digests.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository fails.
pub async fn list_stories(
    owner: &UserId,
    repo: &dyn StoryRepository,
) -> Result<Vec<StorySummary>, DomainError> {
    let stories = repo.list_stories(owner).await?;
    let mut summaries = Vec::with_capacity(stories.len());
    for story in stories {
        let scenes = repo
            .list_scenes(story.id)
            .await?
            .into_iter()
            .map(|scene| SceneSummary {
                id: scene.id,
                step_number: scene.step_number,
                narration: scene.narration,
                dialog: scene.dialog,
                description: scene.description,
            })
            .collect();
        summaries.push(StorySummary {
            id: story.id,
            title: story.title,
            image_url: story.image_url,
            created_at: story.created_at,
            updated_at: story.updated_at,
            scenes,
        });
    }
    Ok(summaries)
}

/// Retrieves one scene of a story the caller owns.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the story is missing or not owned
/// by the caller, `DomainError::SceneNotFound` if the scene is not part of it.
pub async fn get_scene(
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

/// Loads the reader's saved progress in a story.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` if the story does not exist.
pub async fn load_progress(
    story_id: Uuid,
    reader: &UserId,
    repo: &dyn StoryRepository,
) -> Result<Option<StoryProgress>, DomainError> {
    repo.find_story(story_id)
        .await?
        .ok_or(DomainError::StoryNotFound(story_id))?;
    repo.find_progress(reader, story_id).await
}

/// Loads the reader's most recent save across all stories.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository fails.
pub async fn latest_progress(
    reader: &UserId,
    repo: &dyn StoryRepository,
) -> Result<Option<StoryProgress>, DomainError> {
    repo.latest_progress(reader).await
}
