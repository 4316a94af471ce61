//! Ordering and timing of one scene's clips.

use serde::Serialize;
use taleweaver_core::story::{AudioKind, Scene};

/// One clip of a scene's timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Which text field the clip voices.
    pub kind: AudioKind,
    /// Audio URL.
    pub source: String,
    /// Caption text.
    pub text: String,
    /// Clip length in seconds, once the clip has been loaded.
    pub duration: Option<f64>,
}

/// The clips of one scene, in narration → dialog → description order.
///
/// Start offsets are cumulative durations. A duration is only known once the
/// clip has been loaded, so an entry's start is known only when every entry
/// before it has loaded (or been skipped, which counts as zero length).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Derives the timeline of `scene`: one entry per text field that has
    /// generated audio.
    #[must_use]
    pub fn for_scene(scene: &Scene) -> Self {
        let entries = AudioKind::PLAYBACK_ORDER
            .iter()
            .filter_map(|&kind| {
                scene.audio_url(kind).map(|source| TimelineEntry {
                    kind,
                    source: source.to_owned(),
                    text: scene.text(kind).to_owned(),
                    duration: None,
                })
            })
            .collect();
        Self { entries }
    }

    /// Number of clips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the scene has no audio at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in play order.
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    /// Records the length of the clip at `index`. Non-finite values (live
    /// streams report infinity) leave the duration unknown; negative values
    /// count as zero.
    pub fn record_duration(&mut self, index: usize, seconds: f64) {
        if let Some(entry) = self.entries.get_mut(index) {
            if seconds.is_finite() {
                entry.duration = Some(seconds.max(0.0));
            }
        }
    }

    /// Marks the clip at `index` as zero-length unless its duration is
    /// already known. Used for clips that failed to load.
    pub fn record_skipped(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.duration.get_or_insert(0.0);
        }
    }

    /// Start of the clip at `index` on the scene timeline, if every earlier
    /// duration is known.
    #[must_use]
    pub fn start_offset(&self, index: usize) -> Option<f64> {
        if index >= self.entries.len() {
            return None;
        }
        self.entries[..index]
            .iter()
            .try_fold(0.0, |acc, entry| entry.duration.map(|d| acc + d))
    }

    /// Total length, if every duration is known.
    #[must_use]
    pub fn known_duration(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .try_fold(0.0, |acc, entry| entry.duration.map(|d| acc + d))
    }

    /// The entry whose `[start, next_start)` interval contains `t`.
    ///
    /// The last entry ends at its own end; an entry whose duration is not yet
    /// known is open-ended. Returns `None` before the first start, past the
    /// known end, and for empty timelines.
    #[must_use]
    pub fn caption_at(&self, t: f64) -> Option<&TimelineEntry> {
        if t.is_nan() || t < 0.0 {
            return None;
        }
        let mut start = 0.0;
        for entry in &self.entries {
            match entry.duration {
                Some(duration) => {
                    if t < start + duration {
                        return Some(entry);
                    }
                    start += duration;
                }
                None => return Some(entry),
            }
        }
        None
    }

    /// Maps a scene-relative position to `(index, offset within clip)`.
    ///
    /// Positions past the last known start land in that entry, with the
    /// offset clamped to its duration when that is known. Negative or NaN
    /// positions map to the start. The mapping into a clip whose duration is
    /// still unknown is approximate: the offset may exceed the real clip, in
    /// which case the output simply ends it.
    #[must_use]
    pub fn locate(&self, global: f64) -> Option<(usize, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let global = if global.is_nan() { 0.0 } else { global.max(0.0) };
        let last = self.entries.len() - 1;
        let mut start = 0.0;
        for (index, entry) in self.entries.iter().enumerate() {
            match entry.duration {
                Some(duration) => {
                    if global < start + duration {
                        return Some((index, global - start));
                    }
                    if index == last {
                        return Some((index, duration));
                    }
                    start += duration;
                }
                None => return Some((index, global - start)),
            }
        }
        None
    }
}
