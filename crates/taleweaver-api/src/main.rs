//! TaleWeaver API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use taleweaver_api::auth::TokenAuthenticator;
use taleweaver_api::config::Config;
use taleweaver_api::error::AppError;
use taleweaver_api::routes;
use taleweaver_api::state::AppState;
use taleweaver_api::telemetry;
use taleweaver_core::clock::SystemClock;
use taleweaver_providers::{ElevenLabsClient, FalClient, MistralClient};
use taleweaver_store::fs_asset_store::FsAssetStore;
use taleweaver_store::pg_story_repository::PgStoryRepository;
use taleweaver_store::schema::MIGRATOR;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting TaleWeaver API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let assets = FsAssetStore::new(&config.asset_dir, &config.asset_base_url)?;

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(PgStoryRepository::new(pool)),
        Arc::new(MistralClient::new(
            &config.mistral_api_key,
            &config.mistral_base_url,
            &config.mistral_model,
        )),
        Arc::new(ElevenLabsClient::new(
            &config.elevenlabs_api_key,
            &config.elevenlabs_base_url,
        )),
        Arc::new(FalClient::new(&config.fal_key, &config.fal_base_url)),
        Arc::new(assets.clone()),
        Arc::new(TokenAuthenticator::new(config.api_tokens.clone())),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::router())
        .nest_service("/assets", ServeDir::new(assets.base_dir()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app).await;

    telemetry.shutdown();
    served?;
    Ok(())
}
