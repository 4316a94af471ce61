//! TaleWeaver Store — persistence for stories, scenes and generated assets.
//!
//! `PgStoryRepository` keeps story and scene records in PostgreSQL;
//! `FsAssetStore` writes generated audio to a local directory that the API
//! serves back under a public URL prefix.

pub mod fs_asset_store;
pub mod pg_story_repository;
pub mod schema;
