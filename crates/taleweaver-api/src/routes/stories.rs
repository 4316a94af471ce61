//! Routes for the Story & Scene management context: stories and their
//! playback timeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use taleweaver_core::story::Story;
use taleweaver_player::Timeline;
use tracing::{info, instrument};
use uuid::Uuid;

use taleweaver_stories::application::query_handlers::{self, StorySummary, StoryView};
use taleweaver_stories::application::command_handlers;
use taleweaver_stories::domain::commands;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /stories.
#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    /// Story title.
    pub title: String,
}

/// Request body for PATCH /stories/{story_id}.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateStoryRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
}

/// Playback plan of one scene.
#[derive(Debug, Serialize)]
pub struct SceneTimeline {
    pub scene_id: Uuid,
    pub step_number: i32,
    pub timeline: Timeline,
}

/// Response body for GET /stories/{story_id}/timeline.
#[derive(Debug, Serialize)]
pub struct StoryTimeline {
    pub story_id: Uuid,
    /// Scenes in playback order.
    pub scenes: Vec<SceneTimeline>,
}

/// GET /stories
#[instrument(skip(state, user), fields(owner = %user.0))]
async fn list_stories(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<StorySummary>>, ApiError> {
    let stories = query_handlers::list_stories(&user.0, &*state.story_repository).await?;
    Ok(Json(stories))
}

/// POST /stories
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn create_story(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<Story>), ApiError> {
    let command = commands::CreateStory {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        title: request.title,
    };

    info!(correlation_id = %command.correlation_id, "handling create_story command");

    let story = command_handlers::handle_create_story(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(story)))
}

/// GET /stories/{story_id}
#[instrument(skip(state))]
async fn get_story(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StoryView>, ApiError> {
    let story = query_handlers::get_story(story_id, &*state.story_repository).await?;
    Ok(Json(story))
}

/// PATCH /stories/{story_id}
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn update_story(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
    Json(request): Json<UpdateStoryRequest>,
) -> Result<Json<Story>, ApiError> {
    let command = commands::UpdateStory {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        title: request.title,
        image_url: request.image_url,
    };

    info!(correlation_id = %command.correlation_id, "handling update_story command");

    let story = command_handlers::handle_update_story(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
    )
    .await?;

    Ok(Json(story))
}

/// DELETE /stories/{story_id}
#[instrument(skip(state, user), fields(owner = %user.0))]
async fn delete_story(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteStory {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_story command");

    command_handlers::handle_delete_story(&command, &*state.story_repository).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /stories/{story_id}/timeline
///
/// Durations are unknown until a player loads the clips, so every entry
/// carries `duration: null`.
#[instrument(skip(state))]
async fn get_timeline(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StoryTimeline>, ApiError> {
    let story = query_handlers::get_story(story_id, &*state.story_repository).await?;
    let scenes = story
        .scenes
        .iter()
        .map(|scene| SceneTimeline {
            scene_id: scene.id,
            step_number: scene.step_number,
            timeline: Timeline::for_scene(scene),
        })
        .collect();

    Ok(Json(StoryTimeline { story_id, scenes }))
}

/// Returns the router for stories.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stories", get(list_stories).post(create_story))
        .route(
            "/stories/{story_id}",
            get(get_story).patch(update_story).delete(delete_story),
        )
        .route("/stories/{story_id}/timeline", get(get_timeline))
}
