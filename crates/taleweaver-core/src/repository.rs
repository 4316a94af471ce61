//! Story store abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::story::{Scene, Story, StoryProgress, UserId};

/// Repository for story and scene records.
///
/// Implementations do not check ownership; application handlers do that
/// before calling in.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Persist a new story.
    async fn insert_story(&self, story: &Story) -> Result<(), DomainError>;

    /// Load a story without its scenes.
    async fn find_story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError>;

    /// All stories owned by `owner`, newest first.
    async fn list_stories(&self, owner: &UserId) -> Result<Vec<Story>, DomainError>;

    /// Overwrite the mutable fields of an existing story.
    ///
    /// Fails with `StoryNotFound` if the story does not exist.
    async fn update_story(&self, story: &Story) -> Result<(), DomainError>;

    /// Delete a story with all of its scenes and saved progress.
    ///
    /// Fails with `StoryNotFound` if the story does not exist.
    async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError>;

    /// Scenes of a story ordered by ascending step number.
    async fn list_scenes(&self, story_id: Uuid) -> Result<Vec<Scene>, DomainError>;

    /// Load one scene of a story.
    async fn find_scene(&self, story_id: Uuid, scene_id: Uuid)
    -> Result<Option<Scene>, DomainError>;

    /// Persist a new scene.
    ///
    /// Fails with `Conflict` if the story already has a scene at the same
    /// step number.
    async fn insert_scene(&self, scene: &Scene) -> Result<(), DomainError>;

    /// Overwrite an existing scene.
    ///
    /// Fails with `SceneNotFound` if the scene does not exist in its story and
    /// with `Conflict` if the new step number is taken.
    async fn update_scene(&self, scene: &Scene) -> Result<(), DomainError>;

    /// Delete one scene of a story.
    ///
    /// Fails with `SceneNotFound` if the scene does not exist in that story.
    async fn delete_scene(&self, story_id: Uuid, scene_id: Uuid) -> Result<(), DomainError>;

    /// Insert or overwrite the reader's progress in a story.
    ///
    /// Fails with `StoryNotFound` if the story does not exist.
    async fn save_progress(&self, progress: &StoryProgress) -> Result<(), DomainError>;

    /// The reader's saved progress in one story.
    async fn find_progress(
        &self,
        reader: &UserId,
        story_id: Uuid,
    ) -> Result<Option<StoryProgress>, DomainError>;

    /// The reader's most recently saved progress across all stories.
    async fn latest_progress(&self, reader: &UserId)
    -> Result<Option<StoryProgress>, DomainError>;
}
