//! TaleWeaver Player — continuous, captioned playback of a story's scenes.
//!
//! A scene carries up to three independent clips (narration, dialog,
//! description). [`Timeline`] orders the ones that exist and learns their
//! durations as they load; [`StoryPlayer`] drives a single [`AudioOutput`]
//! through them, maps playback time to captions, and moves on to the next
//! scene when one finishes.
//!
//! The player is synchronous and event-driven. The host forwards every
//! output event together with the [`SourceToken`] it was issued for;
//! events for a source the player has since replaced are dropped.

mod output;
mod player;
mod timeline;

pub use output::{AudioOutput, OutputError, OutputEvent, SourceToken};
pub use player::{PlaybackState, PlayerNotice, StoryPlayer};
pub use timeline::{Timeline, TimelineEntry};
