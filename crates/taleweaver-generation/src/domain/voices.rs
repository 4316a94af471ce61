//! Narrator voice presets.

use serde::Serialize;

/// A named narrator voice offered to authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoicePreset {
    /// Speech-provider voice identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Character the voice suits.
    pub description: &'static str,
}

/// Voice used when a scene or request names none.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// The preset voices, default narrator first.
pub const VOICE_PRESETS: [VoicePreset; 4] = [
    VoicePreset {
        id: DEFAULT_VOICE_ID,
        name: "Rachel",
        description: "Main narrator - Warm and friendly",
    },
    VoicePreset {
        id: "AZnzlk1XvdvUeBnXmlld",
        name: "Domi",
        description: "Mystical character - Soft and ethereal",
    },
    VoicePreset {
        id: "EXAVITQu4vr4xnSDxMaL",
        name: "Bella",
        description: "Guide character - Wise and gentle",
    },
    VoicePreset {
        id: "ErXwobaYiN019PkySvjV",
        name: "Antoni",
        description: "Mentor character - Deep and authoritative",
    },
];
