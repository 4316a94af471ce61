//! TaleWeaver — Story & Scene management bounded context.
//!
//! Responsible for creating, listing, editing and deleting stories and their
//! scenes, for the ownership checks that guard every mutation, and for
//! readers' saved progress.

pub mod application;
pub mod domain;
