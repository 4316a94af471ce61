//! `PostgreSQL` implementation of the `StoryRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use taleweaver_core::error::DomainError;
use taleweaver_core::repository::StoryRepository;
use taleweaver_core::story::{Choice, Scene, Story, StoryProgress, UserId};

/// PostgreSQL-backed story repository.
#[derive(Debug, Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    /// Creates a new `PgStoryRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: Uuid,
    owner_id: String,
    title: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Self {
            id: row.id,
            owner: UserId::new(row.owner_id),
            title: row.title,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SceneRow {
    id: Uuid,
    story_id: Uuid,
    step_number: i32,
    narration: String,
    dialog: String,
    description: String,
    narration_audio_url: Option<String>,
    dialog_audio_url: Option<String>,
    description_audio_url: Option<String>,
    image_url: Option<String>,
    choices: Json<Vec<Choice>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SceneRow> for Scene {
    fn from(row: SceneRow) -> Self {
        Self {
            id: row.id,
            story_id: row.story_id,
            step_number: row.step_number,
            narration: row.narration,
            dialog: row.dialog,
            description: row.description,
            narration_audio_url: row.narration_audio_url,
            dialog_audio_url: row.dialog_audio_url,
            description_audio_url: row.description_audio_url,
            image_url: row.image_url,
            choices: row.choices.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    reader_id: String,
    story_id: Uuid,
    step_number: i32,
    choices: Json<Vec<String>>,
    updated_at: DateTime<Utc>,
}

impl From<ProgressRow> for StoryProgress {
    fn from(row: ProgressRow) -> Self {
        Self {
            reader: UserId::new(row.reader_id),
            story_id: row.story_id,
            step_number: row.step_number,
            choices: row.choices.0,
            updated_at: row.updated_at,
        }
    }
}

const PROGRESS_COLUMNS: &str = "reader_id, story_id, step_number, choices, updated_at";

const SCENE_COLUMNS: &str = "id, story_id, step_number, narration, dialog, description, \
     narration_audio_url, dialog_audio_url, description_audio_url, image_url, choices, \
     created_at, updated_at";

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("database error: {err}"))
}

/// Maps a unique-constraint violation on `(story_id, step_number)` to
/// `Conflict`; everything else is an infrastructure error.
fn scene_write_error(err: sqlx::Error, scene: &Scene) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Conflict(format!(
            "step {} already exists in story {}",
            scene.step_number, scene.story_id
        )),
        _ => infrastructure(err),
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn insert_story(&self, story: &Story) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO stories (id, owner_id, title, image_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(story.id)
        .bind(story.owner.as_str())
        .bind(&story.title)
        .bind(&story.image_url)
        .bind(story.created_at)
        .bind(story.updated_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(())
    }

    async fn find_story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        let row: Option<StoryRow> = sqlx::query_as(
            "SELECT id, owner_id, title, image_url, created_at, updated_at \
             FROM stories WHERE id = $1",
        )
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(Story::from))
    }

    async fn list_stories(&self, owner: &UserId) -> Result<Vec<Story>, DomainError> {
        let rows: Vec<StoryRow> = sqlx::query_as(
            "SELECT id, owner_id, title, image_url, created_at, updated_at \
             FROM stories WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(Story::from).collect())
    }

    async fn update_story(&self, story: &Story) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE stories SET title = $2, image_url = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(&story.image_url)
        .bind(story.updated_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StoryNotFound(story.id));
        }
        Ok(())
    }

    async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1")
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StoryNotFound(story_id));
        }
        Ok(())
    }

    async fn list_scenes(&self, story_id: Uuid) -> Result<Vec<Scene>, DomainError> {
        let rows: Vec<SceneRow> = sqlx::query_as(&format!(
            "SELECT {SCENE_COLUMNS} FROM scenes WHERE story_id = $1 ORDER BY step_number ASC"
        ))
        .bind(story_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(Scene::from).collect())
    }

    async fn find_scene(
        &self,
        story_id: Uuid,
        scene_id: Uuid,
    ) -> Result<Option<Scene>, DomainError> {
        let row: Option<SceneRow> = sqlx::query_as(&format!(
            "SELECT {SCENE_COLUMNS} FROM scenes WHERE id = $1 AND story_id = $2"
        ))
        .bind(scene_id)
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(Scene::from))
    }

    async fn insert_scene(&self, scene: &Scene) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO scenes ({SCENE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(scene.id)
        .bind(scene.story_id)
        .bind(scene.step_number)
        .bind(&scene.narration)
        .bind(&scene.dialog)
        .bind(&scene.description)
        .bind(&scene.narration_audio_url)
        .bind(&scene.dialog_audio_url)
        .bind(&scene.description_audio_url)
        .bind(&scene.image_url)
        .bind(Json(&scene.choices))
        .bind(scene.created_at)
        .bind(scene.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| scene_write_error(e, scene))?;

        Ok(())
    }

    async fn update_scene(&self, scene: &Scene) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE scenes SET step_number = $3, narration = $4, dialog = $5, \
             description = $6, narration_audio_url = $7, dialog_audio_url = $8, \
             description_audio_url = $9, image_url = $10, choices = $11, updated_at = $12 \
             WHERE id = $1 AND story_id = $2",
        )
        .bind(scene.id)
        .bind(scene.story_id)
        .bind(scene.step_number)
        .bind(&scene.narration)
        .bind(&scene.dialog)
        .bind(&scene.description)
        .bind(&scene.narration_audio_url)
        .bind(&scene.dialog_audio_url)
        .bind(&scene.description_audio_url)
        .bind(&scene.image_url)
        .bind(Json(&scene.choices))
        .bind(scene.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| scene_write_error(e, scene))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SceneNotFound(scene.id));
        }
        Ok(())
    }

    async fn delete_scene(&self, story_id: Uuid, scene_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM scenes WHERE id = $1 AND story_id = $2")
            .bind(scene_id)
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SceneNotFound(scene_id));
        }
        Ok(())
    }

    async fn save_progress(&self, progress: &StoryProgress) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO player_progress ({PROGRESS_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (reader_id, story_id) DO UPDATE SET \
             step_number = EXCLUDED.step_number, choices = EXCLUDED.choices, \
             updated_at = EXCLUDED.updated_at"
        ))
        .bind(progress.reader.as_str())
        .bind(progress.story_id)
        .bind(progress.step_number)
        .bind(Json(&progress.choices))
        .bind(progress.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DomainError::StoryNotFound(progress.story_id)
            }
            _ => infrastructure(e),
        })?;

        Ok(())
    }

    async fn find_progress(
        &self,
        reader: &UserId,
        story_id: Uuid,
    ) -> Result<Option<StoryProgress>, DomainError> {
        let row: Option<ProgressRow> = sqlx::query_as(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM player_progress \
             WHERE reader_id = $1 AND story_id = $2"
        ))
        .bind(reader.as_str())
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(StoryProgress::from))
    }

    async fn latest_progress(
        &self,
        reader: &UserId,
    ) -> Result<Option<StoryProgress>, DomainError> {
        let row: Option<ProgressRow> = sqlx::query_as(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM player_progress \
             WHERE reader_id = $1 ORDER BY updated_at DESC LIMIT 1"
        ))
        .bind(reader.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(StoryProgress::from))
    }
}
