//! Story store database schema.

use sqlx::migrate::Migrator;

/// Embedded migrations creating the `stories` and `scenes` tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
