//! Query handlers for the Scene Generation context.

use crate::domain::voices::{VOICE_PRESETS, VoicePreset};

/// Returns the narrator voices authors can pick from.
#[must_use]
pub fn voice_presets() -> &'static [VoicePreset] {
    &VOICE_PRESETS
}
