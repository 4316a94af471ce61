//! Routes for readers' saved progress.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use taleweaver_core::story::StoryProgress;
use tracing::{info, instrument};
use uuid::Uuid;

use taleweaver_stories::application::command_handlers;
use taleweaver_stories::application::query_handlers;
use taleweaver_stories::domain::commands;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for PUT /stories/{story_id}/progress.
#[derive(Debug, Deserialize)]
pub struct SaveProgressRequest {
    /// Step number of the scene the reader is on.
    pub step_number: i32,
    /// Choices taken so far, oldest first.
    #[serde(default)]
    pub choices: Vec<String>,
}

/// PUT /stories/{story_id}/progress
#[instrument(skip(state, user, request), fields(reader = %user.0))]
async fn save_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
    Json(request): Json<SaveProgressRequest>,
) -> Result<Json<StoryProgress>, ApiError> {
    let command = commands::SaveProgress {
        correlation_id: Uuid::new_v4(),
        reader: user.0,
        story_id,
        step_number: request.step_number,
        choices: request.choices,
    };

    info!(correlation_id = %command.correlation_id, "handling save_progress command");

    let progress = command_handlers::handle_save_progress(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
    )
    .await?;

    Ok(Json(progress))
}

/// GET /stories/{story_id}/progress
///
/// Answers `null` when the reader has not saved in this story yet.
#[instrument(skip(state, user), fields(reader = %user.0))]
async fn load_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
) -> Result<Json<Option<StoryProgress>>, ApiError> {
    let progress =
        query_handlers::load_progress(story_id, &user.0, &*state.story_repository).await?;
    Ok(Json(progress))
}

/// GET /progress
#[instrument(skip(state, user), fields(reader = %user.0))]
async fn latest_progress(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Option<StoryProgress>>, ApiError> {
    let progress = query_handlers::latest_progress(&user.0, &*state.story_repository).await?;
    Ok(Json(progress))
}

/// Returns the router for saved progress.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress", get(latest_progress))
        .route(
            "/stories/{story_id}/progress",
            get(load_progress).put(save_progress),
        )
}
