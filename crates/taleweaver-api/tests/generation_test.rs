//! Integration tests for scene generation.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::AUTHOR_TOKEN;

async fn create_story(pool: &PgPool) -> String {
    let (status, json) = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/stories",
        AUTHOR_TOKEN,
        &json!({ "title": "Generated" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_owned()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unusable_completions_fall_back_to_authored_scenes(pool: PgPool) {
    let story_id = create_story(&pool).await;
    let uri = format!("/api/v1/stories/{story_id}/scenes/generate");

    // The first scene without a choice is the opening scene
    let (status, opening) = common::post_json(
        common::build_test_app(pool.clone()),
        &uri,
        AUTHOR_TOKEN,
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(opening["step_number"], 1);
    assert_eq!(opening["choices"][0]["text"], "Enter the enchanted forest");
    assert!(opening["narration_audio_url"].is_string());

    // Taking the forest choice leads to the forest scene
    let (status, forest) = common::post_json(
        common::build_test_app(pool.clone()),
        &uri,
        AUTHOR_TOKEN,
        &json!({ "choice": "Enter the enchanted forest" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(forest["step_number"], 2);
    assert_eq!(
        forest["narration"],
        "The forest comes alive with mysterious sounds and shifting shadows."
    );

    let (_, story) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/v1/stories/{story_id}"),
        None,
    )
    .await;
    assert_eq!(story["scenes"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_generated_scene_is_persisted(pool: PgPool) {
    let story_id = create_story(&pool).await;
    let completion = r#"{
        "narration": "Snow settles on the rooftops.",
        "dialog": "Hush now.",
        "sceneDescription": "A sleeping village under snow.",
        "choices": [{ "text": "Knock on a door", "consequence": "Warmth", "voiceId": "EXAVITQu4vr4xnSDxMaL" }]
    }"#;

    let (status, scene) = common::post_json(
        common::build_test_app_with_completion(pool.clone(), completion),
        &format!("/api/v1/stories/{story_id}/scenes/generate"),
        AUTHOR_TOKEN,
        &json!({ "previous_choices": ["Leave the harbour"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let scene_id = scene["id"].as_str().unwrap();
    let (status, stored) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/v1/stories/{story_id}/scenes/{scene_id}"),
        Some(AUTHOR_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["narration"], "Snow settles on the rooftops.");
    assert_eq!(stored["description"], "A sleeping village under snow.");
    assert_eq!(stored["choices"][0]["voiceId"], "EXAVITQu4vr4xnSDxMaL");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_cover_image_is_stored_on_story(pool: PgPool) {
    let story_id = create_story(&pool).await;

    let (status, _) = common::post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/stories/{story_id}/cover"),
        AUTHOR_TOKEN,
        &json!({ "prompt": "A lighthouse in a storm" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, story) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/v1/stories/{story_id}"),
        None,
    )
    .await;
    assert_eq!(story["image_url"], "https://img.example/cover.png");
}
