//! The single audio output a player drives.

use thiserror::Error;

/// Identifies one `load` call on an [`AudioOutput`]. Events reported for an
/// older token belong to a source that has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceToken(pub(crate) u64);

impl SourceToken {
    /// Raw token value, for hosts that need to stash it.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Something the output reports back about the source it was given.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// The source is ready; `duration` is its length in seconds.
    Loaded {
        /// Clip length in seconds.
        duration: f64,
    },
    /// The source played to its natural end.
    Ended,
    /// The source could not be loaded or decoded.
    Failed {
        /// Host-provided description.
        reason: String,
    },
}

/// Error returned when the output refuses to start playback.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The device or media element rejected the play request.
    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// A media element or device that plays one source at a time.
///
/// `load` replaces whatever source was active. Implementations report
/// progress asynchronously through the host, which hands each event to
/// [`crate::StoryPlayer::handle`] with the token passed to `load`.
pub trait AudioOutput {
    /// Swap in a new source. Must not start playback by itself.
    fn load(&mut self, source: &str, token: SourceToken);

    /// Start or resume the loaded source.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if the output refuses to play.
    fn play(&mut self) -> Result<(), OutputError>;

    /// Suspend playback, keeping the position.
    fn pause(&mut self);

    /// Halt playback and drop the source.
    fn stop(&mut self);

    /// Position within the loaded source, in seconds.
    fn position(&self) -> f64;

    /// Move within the loaded source.
    fn seek(&mut self, offset: f64);

    /// Effective output gain in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
}
