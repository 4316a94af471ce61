//! Domain layer: commands, scene drafts, prompts and voice presets.

pub mod commands;
pub mod draft;
pub mod prompt;
pub mod voices;
