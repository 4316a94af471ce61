//! Server configuration read from the environment.

use std::path::PathBuf;

use taleweaver_core::story::UserId;
use taleweaver_providers::{elevenlabs, fal, mistral};

use crate::error::AppError;

/// Everything the server needs to start, read once at startup.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Upper bound of the connection pool.
    pub database_max_connections: u32,
    pub mistral_api_key: String,
    pub mistral_base_url: String,
    pub mistral_model: String,
    pub elevenlabs_api_key: String,
    pub elevenlabs_base_url: String,
    pub fal_key: String,
    pub fal_base_url: String,
    /// Directory generated audio is written to.
    pub asset_dir: PathBuf,
    /// URL prefix the asset directory is served under.
    pub asset_base_url: String,
    /// Accepted bearer tokens and the user each one was issued to.
    pub api_tokens: Vec<(String, UserId)>,
    /// OTLP collector endpoint. Span export is off when absent.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| AppError::Config(format!("{name} environment variable must be set")))
        };
        let or_default = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_owned());

        let port = or_default("PORT", "3000")
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let database_max_connections = or_default("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?;
        let api_tokens = parse_api_tokens(&var("TALEWEAVER_API_TOKENS").unwrap_or_default())?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port,
            database_max_connections,
            mistral_api_key: required("MISTRAL_API_KEY")?,
            mistral_base_url: or_default("MISTRAL_BASE_URL", mistral::DEFAULT_BASE_URL),
            mistral_model: or_default("MISTRAL_MODEL", mistral::DEFAULT_MODEL),
            elevenlabs_api_key: required("ELEVENLABS_API_KEY")?,
            elevenlabs_base_url: or_default("ELEVENLABS_BASE_URL", elevenlabs::DEFAULT_BASE_URL),
            fal_key: required("FAL_KEY")?,
            fal_base_url: or_default("FAL_BASE_URL", fal::DEFAULT_BASE_URL),
            asset_dir: PathBuf::from(or_default("ASSET_DIR", "./assets")),
            asset_base_url: or_default("ASSET_BASE_URL", "/assets"),
            api_tokens,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

/// Parses `token=user,token2=user2`. Blank entries are ignored.
fn parse_api_tokens(raw: &str) -> Result<Vec<(String, UserId)>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, user) = entry
                .split_once('=')
                .map(|(token, user)| (token.trim(), user.trim()))
                .filter(|(token, user)| !token.is_empty() && !user.is_empty())
                .ok_or_else(|| {
                    AppError::Config("TALEWEAVER_API_TOKENS entries must look like token=user".into())
                })?;
            Ok((token.to_owned(), UserId::new(user)))
        })
        .collect()
}
