//! Routes for the Story & Scene management context: scenes of a story.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taleweaver_core::story::{Choice, Scene};
use tracing::{info, instrument};
use uuid::Uuid;

use taleweaver_stories::application::command_handlers;
use taleweaver_stories::application::query_handlers;
use taleweaver_stories::domain::commands::{self, SceneFields};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or updating a scene. Absent fields are left
/// unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneRequest {
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

impl From<SceneRequest> for SceneFields {
    fn from(request: SceneRequest) -> Self {
        Self {
            step_number: request.step_number,
            narration: request.narration,
            dialog: request.dialog,
            description: request.description,
            narration_audio_url: request.narration_audio_url,
            dialog_audio_url: request.dialog_audio_url,
            description_audio_url: request.description_audio_url,
            image_url: request.image_url,
            choices: request.choices,
        }
    }
}

/// POST /stories/{story_id}/scenes
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn create_scene(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
    Json(request): Json<SceneRequest>,
) -> Result<(StatusCode, Json<Scene>), ApiError> {
    let command = commands::CreateScene {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        fields: request.into(),
    };

    info!(correlation_id = %command.correlation_id, "handling create_scene command");

    let scene = command_handlers::handle_create_scene(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(scene)))
}

/// GET /stories/{story_id}/scenes/{scene_id}
#[instrument(skip(state, user), fields(owner = %user.0))]
async fn get_scene(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((story_id, scene_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Scene>, ApiError> {
    let scene =
        query_handlers::get_scene(story_id, scene_id, &user.0, &*state.story_repository).await?;
    Ok(Json(scene))
}

/// PATCH /stories/{story_id}/scenes/{scene_id}
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn update_scene(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((story_id, scene_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SceneRequest>,
) -> Result<Json<Scene>, ApiError> {
    let command = commands::UpdateScene {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        scene_id,
        fields: request.into(),
    };

    info!(correlation_id = %command.correlation_id, "handling update_scene command");

    let scene = command_handlers::handle_update_scene(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
    )
    .await?;

    Ok(Json(scene))
}

/// DELETE /stories/{story_id}/scenes/{scene_id}
#[instrument(skip(state, user), fields(owner = %user.0))]
async fn delete_scene(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((story_id, scene_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteScene {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        scene_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_scene command");

    command_handlers::handle_delete_scene(&command, &*state.story_repository).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for scenes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stories/{story_id}/scenes", post(create_scene))
        .route(
            "/stories/{story_id}/scenes/{scene_id}",
            get(get_scene).patch(update_scene).delete(delete_scene),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;
    use taleweaver_core::story::Story;
    use taleweaver_test_support::{InMemoryStoryRepository, fixed_now};

    use crate::routes::testing::{OTHER_TOKEN, TOKEN, owner, send, state_with};

    fn seeded() -> (Story, Scene, Arc<InMemoryStoryRepository>) {
        let story = Story::new(Uuid::new_v4(), owner(), "The Glade", fixed_now());
        let mut scene = Scene::new(Uuid::new_v4(), story.id, 1, fixed_now());
        scene.narration = "Dawn breaks.".into();
        let repo = InMemoryStoryRepository::with(vec![story.clone()], vec![scene.clone()]);
        (story, scene, Arc::new(repo))
    }

    fn app_with(repo: Arc<InMemoryStoryRepository>) -> Router {
        router().with_state(state_with(repo, "{}"))
    }

    #[tokio::test]
    async fn test_create_scene_appends_after_last_step() {
        // Arrange
        let (story, _, repo) = seeded();
        let body = json!({
            "narration": "The road forks.",
            "choices": [{ "text": "Go left", "consequence": "Shade", "voiceId": "AZnzlk1XvdvUeBnXmlld" }]
        });

        // Act
        let (status, json) = send(
            app_with(repo.clone()),
            "POST",
            &format!("/stories/{}/scenes", story.id),
            Some(TOKEN),
            Some(body),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["step_number"], 2);
        assert_eq!(json["choices"][0]["voiceId"], "AZnzlk1XvdvUeBnXmlld");
        assert_eq!(repo.scenes_of(story.id).len(), 2);
    }

    #[tokio::test]
    async fn test_create_scene_with_taken_step_returns_409() {
        let (story, _, repo) = seeded();

        let (status, json) = send(
            app_with(repo),
            "POST",
            &format!("/stories/{}/scenes", story.id),
            Some(TOKEN),
            Some(json!({ "step_number": 1, "narration": "Again?" })),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "conflict");
    }

    #[tokio::test]
    async fn test_create_scene_with_step_zero_returns_400() {
        let (story, _, repo) = seeded();

        let (status, _) = send(
            app_with(repo),
            "POST",
            &format!("/stories/{}/scenes", story.id),
            Some(TOKEN),
            Some(json!({ "step_number": 0 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_scene_requires_ownership() {
        let (story, scene, repo) = seeded();
        let uri = format!("/stories/{}/scenes/{}", story.id, scene.id);

        let (own_status, json) = send(app_with(repo.clone()), "GET", &uri, Some(TOKEN), None).await;
        let (other_status, _) = send(app_with(repo), "GET", &uri, Some(OTHER_TOKEN), None).await;

        assert_eq!(own_status, StatusCode::OK);
        assert_eq!(json["narration"], "Dawn breaks.");
        assert_eq!(other_status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_unknown_scene_returns_404() {
        let (story, _, repo) = seeded();

        let (status, json) = send(
            app_with(repo),
            "GET",
            &format!("/stories/{}/scenes/{}", story.id, Uuid::new_v4()),
            Some(TOKEN),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "scene_not_found");
    }

    #[tokio::test]
    async fn test_update_scene_changes_only_supplied_fields() {
        let (story, scene, repo) = seeded();

        let (status, json) = send(
            app_with(repo),
            "PATCH",
            &format!("/stories/{}/scenes/{}", story.id, scene.id),
            Some(TOKEN),
            Some(json!({ "dialog": "Who goes there?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["dialog"], "Who goes there?");
        assert_eq!(json["narration"], "Dawn breaks.");
    }

    #[tokio::test]
    async fn test_delete_scene_returns_204() {
        let (story, scene, repo) = seeded();

        let (status, _) = send(
            app_with(repo.clone()),
            "DELETE",
            &format!("/stories/{}/scenes/{}", story.id, scene.id),
            Some(TOKEN),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(repo.scenes_of(story.id).is_empty());
    }
}
