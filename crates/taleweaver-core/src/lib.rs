//! TaleWeaver Core — shared domain types and collaborator traits.
//!
//! This crate defines the story and scene records every other crate works
//! with, the error taxonomy, and the traits behind which persistence and the
//! third-party generation services live. It contains no infrastructure code.

pub mod clock;
pub mod collaborator;
pub mod command;
pub mod error;
pub mod repository;
pub mod story;
