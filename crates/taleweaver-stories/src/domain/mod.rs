//! Domain layer: commands and scene field updates.

pub mod commands;
