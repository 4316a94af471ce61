//! Test repositories — mock `StoryRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use taleweaver_core::error::DomainError;
use taleweaver_core::repository::StoryRepository;
use taleweaver_core::story::{Scene, Story, StoryProgress, UserId};
use uuid::Uuid;

/// A story repository held in memory. Enforces the same invariants as the
/// PostgreSQL implementation: unique step numbers per story, one progress
/// record per reader and story, and cascading deletion.
#[derive(Debug, Default)]
pub struct InMemoryStoryRepository {
    stories: Mutex<HashMap<Uuid, Story>>,
    scenes: Mutex<HashMap<Uuid, Scene>>,
    progress: Mutex<HashMap<(UserId, Uuid), StoryProgress>>,
    reject_scene_updates: AtomicBool,
}

impl InMemoryStoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `stories` and `scenes`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with(stories: Vec<Story>, scenes: Vec<Scene>) -> Self {
        let repo = Self::new();
        {
            let mut guard = repo.stories.lock().unwrap();
            for story in stories {
                guard.insert(story.id, story);
            }
        }
        {
            let mut guard = repo.scenes.lock().unwrap();
            for scene in scenes {
                guard.insert(scene.id, scene);
            }
        }
        repo
    }

    /// Returns a snapshot of every stored scene of `story_id`, by step.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn scenes_of(&self, story_id: Uuid) -> Vec<Scene> {
        let mut scenes: Vec<Scene> = self
            .scenes
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.story_id == story_id)
            .cloned()
            .collect();
        scenes.sort_by_key(|s| s.step_number);
        scenes
    }

    /// Returns a snapshot of a stored story.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn story(&self, story_id: Uuid) -> Option<Story> {
        self.stories.lock().unwrap().get(&story_id).cloned()
    }

    /// Makes every later `update_scene` call fail with an infrastructure
    /// error, leaving reads and inserts intact.
    pub fn reject_scene_updates(&self) {
        self.reject_scene_updates.store(true, Ordering::SeqCst);
    }

    fn step_taken(scenes: &HashMap<Uuid, Scene>, candidate: &Scene) -> bool {
        scenes.values().any(|s| {
            s.story_id == candidate.story_id
                && s.step_number == candidate.step_number
                && s.id != candidate.id
        })
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryRepository {
    async fn insert_story(&self, story: &Story) -> Result<(), DomainError> {
        self.stories.lock().unwrap().insert(story.id, story.clone());
        Ok(())
    }

    async fn find_story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        Ok(self.stories.lock().unwrap().get(&story_id).cloned())
    }

    async fn list_stories(&self, owner: &UserId) -> Result<Vec<Story>, DomainError> {
        let mut stories: Vec<Story> = self
            .stories
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.owner == *owner)
            .cloned()
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn update_story(&self, story: &Story) -> Result<(), DomainError> {
        let mut stories = self.stories.lock().unwrap();
        match stories.get_mut(&story.id) {
            Some(existing) => {
                *existing = story.clone();
                Ok(())
            }
            None => Err(DomainError::StoryNotFound(story.id)),
        }
    }

    async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError> {
        if self.stories.lock().unwrap().remove(&story_id).is_none() {
            return Err(DomainError::StoryNotFound(story_id));
        }
        self.scenes
            .lock()
            .unwrap()
            .retain(|_, s| s.story_id != story_id);
        self.progress
            .lock()
            .unwrap()
            .retain(|(_, id), _| *id != story_id);
        Ok(())
    }

    async fn list_scenes(&self, story_id: Uuid) -> Result<Vec<Scene>, DomainError> {
        Ok(self.scenes_of(story_id))
    }

    async fn find_scene(
        &self,
        story_id: Uuid,
        scene_id: Uuid,
    ) -> Result<Option<Scene>, DomainError> {
        Ok(self
            .scenes
            .lock()
            .unwrap()
            .get(&scene_id)
            .filter(|s| s.story_id == story_id)
            .cloned())
    }

    async fn insert_scene(&self, scene: &Scene) -> Result<(), DomainError> {
        let mut scenes = self.scenes.lock().unwrap();
        if Self::step_taken(&scenes, scene) {
            return Err(DomainError::Conflict(format!(
                "step {} already exists in story {}",
                scene.step_number, scene.story_id
            )));
        }
        scenes.insert(scene.id, scene.clone());
        Ok(())
    }

    async fn update_scene(&self, scene: &Scene) -> Result<(), DomainError> {
        if self.reject_scene_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("scene update rejected".into()));
        }
        let mut scenes = self.scenes.lock().unwrap();
        let exists = scenes
            .get(&scene.id)
            .is_some_and(|s| s.story_id == scene.story_id);
        if !exists {
            return Err(DomainError::SceneNotFound(scene.id));
        }
        if Self::step_taken(&scenes, scene) {
            return Err(DomainError::Conflict(format!(
                "step {} already exists in story {}",
                scene.step_number, scene.story_id
            )));
        }
        scenes.insert(scene.id, scene.clone());
        Ok(())
    }

    async fn delete_scene(&self, story_id: Uuid, scene_id: Uuid) -> Result<(), DomainError> {
        let mut scenes = self.scenes.lock().unwrap();
        let exists = scenes
            .get(&scene_id)
            .is_some_and(|s| s.story_id == story_id);
        if !exists {
            return Err(DomainError::SceneNotFound(scene_id));
        }
        scenes.remove(&scene_id);
        Ok(())
    }

    async fn save_progress(&self, progress: &StoryProgress) -> Result<(), DomainError> {
        if !self.stories.lock().unwrap().contains_key(&progress.story_id) {
            return Err(DomainError::StoryNotFound(progress.story_id));
        }
        self.progress.lock().unwrap().insert(
            (progress.reader.clone(), progress.story_id),
            progress.clone(),
        );
        Ok(())
    }

    async fn find_progress(
        &self,
        reader: &UserId,
        story_id: Uuid,
    ) -> Result<Option<StoryProgress>, DomainError> {
        Ok(self
            .progress
            .lock()
            .unwrap()
            .get(&(reader.clone(), story_id))
            .cloned())
    }

    async fn latest_progress(
        &self,
        reader: &UserId,
    ) -> Result<Option<StoryProgress>, DomainError> {
        Ok(self
            .progress
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.reader == *reader)
            .max_by_key(|p| p.updated_at)
            .cloned())
    }
}

/// A story repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingStoryRepository;

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl StoryRepository for FailingStoryRepository {
    async fn insert_story(&self, _story: &Story) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn find_story(&self, _story_id: Uuid) -> Result<Option<Story>, DomainError> {
        Err(connection_refused())
    }

    async fn list_stories(&self, _owner: &UserId) -> Result<Vec<Story>, DomainError> {
        Err(connection_refused())
    }

    async fn update_story(&self, _story: &Story) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn delete_story(&self, _story_id: Uuid) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn list_scenes(&self, _story_id: Uuid) -> Result<Vec<Scene>, DomainError> {
        Err(connection_refused())
    }

    async fn find_scene(
        &self,
        _story_id: Uuid,
        _scene_id: Uuid,
    ) -> Result<Option<Scene>, DomainError> {
        Err(connection_refused())
    }

    async fn insert_scene(&self, _scene: &Scene) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn update_scene(&self, _scene: &Scene) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn delete_scene(&self, _story_id: Uuid, _scene_id: Uuid) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn save_progress(&self, _progress: &StoryProgress) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn find_progress(
        &self,
        _reader: &UserId,
        _story_id: Uuid,
    ) -> Result<Option<StoryProgress>, DomainError> {
        Err(connection_refused())
    }

    async fn latest_progress(
        &self,
        _reader: &UserId,
    ) -> Result<Option<StoryProgress>, DomainError> {
        Err(connection_refused())
    }
}
