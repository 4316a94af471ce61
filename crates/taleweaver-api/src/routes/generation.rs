//! Routes for the Scene Generation context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taleweaver_core::story::{AudioKind, Scene, Story};
use tracing::{info, instrument};
use uuid::Uuid;

use taleweaver_generation::application::{command_handlers, query_handlers};
use taleweaver_generation::domain::commands;
use taleweaver_generation::domain::voices::VoicePreset;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /stories/{story_id}/scenes/generate.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateSceneRequest {
    /// Text of the choice taken from the latest scene.
    pub choice: Option<String>,
    /// Earlier choice texts, oldest first.
    pub previous_choices: Vec<String>,
}

/// Request body for POST /stories/{story_id}/scenes/{scene_id}/audio.
#[derive(Debug, Deserialize)]
pub struct SceneAudioRequest {
    pub kind: AudioKind,
    pub voice_id: Option<String>,
}

/// Request body for POST /stories/{story_id}/scenes/{scene_id}/image.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneImageRequest {
    pub prompt: Option<String>,
}

/// Request body for POST /stories/{story_id}/cover.
#[derive(Debug, Deserialize)]
pub struct CoverImageRequest {
    pub prompt: String,
}

/// Request body for POST /synthesize.
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    pub voice_id: Option<String>,
}

/// POST /stories/{story_id}/scenes/generate
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn generate_scene(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
    Json(request): Json<GenerateSceneRequest>,
) -> Result<(StatusCode, Json<Scene>), ApiError> {
    let command = commands::GenerateNextScene {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        choice: request.choice,
        previous_choices: request.previous_choices,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_next_scene command");

    let scene = command_handlers::handle_generate_next_scene(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
        &*state.text_generator,
        &*state.speech_synthesizer,
        &*state.asset_store,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(scene)))
}

/// POST /stories/{story_id}/scenes/{scene_id}/audio
#[instrument(skip(state, user, request), fields(owner = %user.0, kind = %request.kind))]
async fn synthesize_scene_audio(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((story_id, scene_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SceneAudioRequest>,
) -> Result<Json<Scene>, ApiError> {
    let command = commands::SynthesizeSceneAudio {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        scene_id,
        kind: request.kind,
        voice_id: request.voice_id,
    };

    info!(correlation_id = %command.correlation_id, "handling synthesize_scene_audio command");

    let scene = command_handlers::handle_synthesize_scene_audio(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
        &*state.speech_synthesizer,
        &*state.asset_store,
    )
    .await?;

    Ok(Json(scene))
}

/// POST /stories/{story_id}/scenes/{scene_id}/image
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn generate_scene_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((story_id, scene_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SceneImageRequest>,
) -> Result<Json<Scene>, ApiError> {
    let command = commands::GenerateSceneImage {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        scene_id,
        prompt: request.prompt,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_scene_image command");

    let scene = command_handlers::handle_generate_scene_image(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
        &*state.image_generator,
    )
    .await?;

    Ok(Json(scene))
}

/// POST /stories/{story_id}/cover
#[instrument(skip(state, user, request), fields(owner = %user.0))]
async fn generate_cover_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(story_id): Path<Uuid>,
    Json(request): Json<CoverImageRequest>,
) -> Result<Json<Story>, ApiError> {
    let command = commands::GenerateCoverImage {
        correlation_id: Uuid::new_v4(),
        owner: user.0,
        story_id,
        prompt: request.prompt,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_cover_image command");

    let story = command_handlers::handle_generate_cover_image(
        &command,
        state.clock.as_ref(),
        &*state.story_repository,
        &*state.image_generator,
    )
    .await?;

    Ok(Json(story))
}

/// POST /synthesize
///
/// Answers with the raw `audio/mpeg` bytes. Nothing is stored.
#[instrument(skip(state, _user, request))]
async fn synthesize_preview(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<SynthesizeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = commands::SynthesizePreview {
        correlation_id: Uuid::new_v4(),
        text: request.text,
        voice_id: request.voice_id,
    };

    info!(correlation_id = %command.correlation_id, "handling synthesize_preview command");

    let audio =
        command_handlers::handle_synthesize_preview(&command, &*state.speech_synthesizer).await?;

    Ok(([(CONTENT_TYPE, "audio/mpeg")], audio))
}

/// GET /voices
async fn list_voices() -> Json<&'static [VoicePreset]> {
    Json(query_handlers::voice_presets())
}

/// Returns the router for the generation context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stories/{story_id}/scenes/generate", post(generate_scene))
        .route(
            "/stories/{story_id}/scenes/{scene_id}/audio",
            post(synthesize_scene_audio),
        )
        .route(
            "/stories/{story_id}/scenes/{scene_id}/image",
            post(generate_scene_image),
        )
        .route("/stories/{story_id}/cover", post(generate_cover_image))
        .route("/synthesize", post(synthesize_preview))
        .route("/voices", get(list_voices))
}
