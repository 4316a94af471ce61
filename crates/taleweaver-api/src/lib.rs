//! TaleWeaver API — HTTP surface for authoring and reading stories.
//!
//! Story and scene management, scene generation, and the derived playback
//! timeline are exposed under `/api/v1`. Writes require a bearer token;
//! reading a story and its timeline is public.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
