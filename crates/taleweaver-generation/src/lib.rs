//! TaleWeaver — Scene Generation bounded context.
//!
//! Responsible for writing the next scene of a story with the text
//! generator, voicing scene text with the speech synthesizer, and
//! illustrating scenes and covers with the image generator. Generated audio
//! is persisted through the asset store; generated images stay where the
//! provider hosts them.

pub mod application;
pub mod domain;
