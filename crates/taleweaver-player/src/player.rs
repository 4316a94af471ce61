//! The story player: one audio output, one scene timeline at a time.

use taleweaver_core::story::{AudioKind, Scene};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::output::{AudioOutput, OutputEvent, SourceToken};
use crate::timeline::{Timeline, TimelineEntry};

/// Playback state of the current scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    /// Nothing loaded, position 0.
    Idle,
    /// The clip at `index` is the output's source.
    Playing {
        /// Timeline index.
        index: usize,
    },
    /// Suspended at `offset` seconds into clip `index`.
    Paused {
        /// Timeline index.
        index: usize,
        /// Offset within the clip, in seconds.
        offset: f64,
    },
    /// Every clip of the scene has played. Only persists on the last scene.
    SceneComplete,
}

/// Something the host UI may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotice {
    /// A clip started or resumed playing.
    ClipStarted { index: usize, kind: AudioKind },
    /// A clip failed and was skipped.
    ClipSkipped {
        index: usize,
        kind: AudioKind,
        reason: String,
    },
    /// The current scene finished playing.
    SceneCompleted { scene_id: Uuid },
    /// A different scene is now loaded.
    SceneChanged { scene_id: Uuid, step_number: i32 },
    /// The last scene finished; nothing follows.
    StoryFinished,
}

#[derive(Debug, Clone, Copy)]
struct ActiveClip {
    index: usize,
    token: SourceToken,
    ready: bool,
    resume_at: f64,
}

/// Plays a story's scenes in step order through a single [`AudioOutput`].
///
/// All methods are synchronous. Output events reach the player through
/// [`StoryPlayer::handle`]; the returned notices describe what changed.
#[derive(Debug)]
pub struct StoryPlayer<O> {
    scenes: Vec<Scene>,
    scene_index: usize,
    timeline: Timeline,
    state: PlaybackState,
    output: O,
    active: Option<ActiveClip>,
    issued: u64,
    volume: f32,
    muted: bool,
    captions_enabled: bool,
}

impl<O: AudioOutput> StoryPlayer<O> {
    /// Creates a player positioned at the first scene by step number.
    #[must_use]
    pub fn new(mut scenes: Vec<Scene>, mut output: O) -> Self {
        scenes.sort_by_key(|scene| scene.step_number);
        let timeline = scenes.first().map(Timeline::for_scene).unwrap_or_default();
        output.set_volume(1.0);
        Self {
            scenes,
            scene_index: 0,
            timeline,
            state: PlaybackState::Idle,
            output,
            active: None,
            issued: 0,
            volume: 1.0,
            muted: false,
            captions_enabled: true,
        }
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Timeline of the current scene.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Index of the current scene in the story.
    #[must_use]
    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    /// The current scene, or `None` for a story without scenes.
    #[must_use]
    pub fn current_scene(&self) -> Option<&Scene> {
        self.scenes.get(self.scene_index)
    }

    /// The audio output driven by this player.
    #[must_use]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Mutable access to the audio output.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Volume in `[0, 1]`, kept while muted.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether the output is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether captions are shown.
    #[must_use]
    pub fn captions_enabled(&self) -> bool {
        self.captions_enabled
    }

    /// Starts or resumes playback of the current scene.
    ///
    /// Resumes a paused clip at its offset; starts from the first clip when
    /// idle or after the scene completed. Does nothing while playing or when
    /// the scene has no audio.
    pub fn play(&mut self) -> Vec<PlayerNotice> {
        if self.timeline.is_empty() {
            debug!(scene_index = self.scene_index, "scene has no audio, nothing to play");
            return Vec::new();
        }
        let (index, offset) = match self.state {
            PlaybackState::Playing { .. } => return Vec::new(),
            PlaybackState::Paused { index, offset } => (index, offset),
            PlaybackState::Idle | PlaybackState::SceneComplete => (0, 0.0),
        };
        self.state = PlaybackState::Playing { index };
        self.start_clip(index, offset)
    }

    /// Suspends playback, remembering the clip and offset.
    pub fn pause(&mut self) {
        let PlaybackState::Playing { index } = self.state else {
            return;
        };
        let offset = match self.active {
            Some(clip) if clip.index == index && clip.ready => {
                let at = self.output.position();
                self.output.pause();
                at
            }
            Some(clip) if clip.index == index => clip.resume_at,
            _ => 0.0,
        };
        debug!(index, offset, "paused");
        self.state = PlaybackState::Paused { index, offset };
    }

    /// Moves to a scene-relative position in seconds.
    ///
    /// Keeps playing if playing, otherwise leaves the player paused at the
    /// new position. See [`Timeline::locate`] for how positions past the
    /// known part of the timeline are clamped.
    pub fn seek(&mut self, global: f64) -> Vec<PlayerNotice> {
        let Some((index, offset)) = self.timeline.locate(global) else {
            return Vec::new();
        };
        debug!(global, index, offset, "seek");

        match (self.state, self.active) {
            (PlaybackState::Playing { .. }, Some(clip)) if clip.index == index && clip.ready => {
                self.state = PlaybackState::Playing { index };
                self.output.seek(offset);
                Vec::new()
            }
            (PlaybackState::Playing { .. }, _) => {
                self.state = PlaybackState::Playing { index };
                self.start_clip(index, offset)
            }
            (_, active) => {
                if let Some(clip) = active.filter(|clip| clip.index == index) {
                    if clip.ready {
                        self.output.seek(offset);
                    } else {
                        self.set_resume_at(offset);
                    }
                }
                self.state = PlaybackState::Paused { index, offset };
                Vec::new()
            }
        }
    }

    /// Loads the following scene, idle. No-op on the last scene.
    pub fn next(&mut self) -> Vec<PlayerNotice> {
        if self.scene_index + 1 >= self.scenes.len() {
            debug!("already at the last scene");
            return Vec::new();
        }
        self.change_scene(self.scene_index + 1)
    }

    /// Loads the preceding scene, idle. No-op on the first scene.
    pub fn previous(&mut self) -> Vec<PlayerNotice> {
        if self.scene_index == 0 {
            debug!("already at the first scene");
            return Vec::new();
        }
        self.change_scene(self.scene_index - 1)
    }

    /// Sets the volume, clamped to `[0, 1]`, and applies it immediately.
    ///
    /// A volume of zero mutes; any other volume unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.muted = self.volume <= 0.0;
        self.apply_volume();
    }

    /// Mutes or unmutes without forgetting the volume.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    /// Shows or hides captions. Playback is unaffected.
    pub fn set_captions_enabled(&mut self, enabled: bool) {
        self.captions_enabled = enabled;
    }

    /// Scene-relative playback position in seconds.
    #[must_use]
    pub fn position(&self) -> f64 {
        let (index, offset) = match self.state {
            PlaybackState::Playing { index } => {
                let offset = match self.active {
                    Some(clip) if clip.index == index && clip.ready => self.output.position(),
                    Some(clip) if clip.index == index => clip.resume_at,
                    _ => 0.0,
                };
                (index, offset)
            }
            PlaybackState::Paused { index, offset } => (index, offset),
            PlaybackState::Idle => return 0.0,
            PlaybackState::SceneComplete => return self.timeline.known_duration().unwrap_or(0.0),
        };
        self.timeline.start_offset(index).unwrap_or(0.0) + offset
    }

    /// Fraction of the scene played, once every clip duration is known.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.timeline
            .known_duration()
            .filter(|total| *total > 0.0)
            .map(|total| (self.position() / total).clamp(0.0, 1.0))
    }

    /// Caption for the current position. `None` with captions off or while no
    /// clip is loaded.
    #[must_use]
    pub fn current_caption(&self) -> Option<&TimelineEntry> {
        if !self.captions_enabled || self.active.is_none() {
            return None;
        }
        self.timeline.caption_at(self.position())
    }

    /// Applies an output event reported for `token`.
    ///
    /// Events for any source other than the current one are dropped.
    pub fn handle(&mut self, token: SourceToken, event: OutputEvent) -> Vec<PlayerNotice> {
        let Some(clip) = self.active.filter(|clip| clip.token == token) else {
            debug!(token = token.value(), ?event, "ignoring event for a replaced source");
            return Vec::new();
        };

        match event {
            OutputEvent::Loaded { duration } => {
                self.timeline.record_duration(clip.index, duration);
                if let Some(active) = self.active.as_mut() {
                    active.ready = true;
                }
                if clip.resume_at > 0.0 {
                    self.output.seek(clip.resume_at);
                }
                match self.state {
                    PlaybackState::Playing { index } if index == clip.index => {
                        self.resume_output(index)
                    }
                    _ => Vec::new(),
                }
            }
            OutputEvent::Ended => {
                if self.state == (PlaybackState::Playing { index: clip.index }) {
                    self.advance(clip.index)
                } else {
                    Vec::new()
                }
            }
            OutputEvent::Failed { reason } => self.skip_clip(clip.index, &reason),
        }
    }

    fn start_clip(&mut self, index: usize, offset: f64) -> Vec<PlayerNotice> {
        match self.active {
            Some(clip) if clip.index == index && clip.ready => {
                self.output.seek(offset);
                self.resume_output(index)
            }
            Some(clip) if clip.index == index => {
                self.set_resume_at(offset);
                Vec::new()
            }
            _ => {
                self.load_clip(index, offset);
                Vec::new()
            }
        }
    }

    fn load_clip(&mut self, index: usize, offset: f64) {
        let Some(entry) = self.timeline.get(index) else {
            return;
        };
        self.issued += 1;
        let token = SourceToken(self.issued);
        debug!(index, kind = %entry.kind, source = %entry.source, token = token.value(), "loading clip");
        self.output.load(&entry.source, token);
        self.active = Some(ActiveClip {
            index,
            token,
            ready: false,
            resume_at: offset,
        });
    }

    fn set_resume_at(&mut self, offset: f64) {
        if let Some(active) = self.active.as_mut() {
            active.resume_at = offset;
        }
    }

    fn resume_output(&mut self, index: usize) -> Vec<PlayerNotice> {
        let kind = self.timeline.entries()[index].kind;
        match self.output.play() {
            Ok(()) => {
                info!(index, %kind, "clip playing");
                vec![PlayerNotice::ClipStarted { index, kind }]
            }
            Err(e) => self.skip_clip(index, &e.to_string()),
        }
    }

    fn skip_clip(&mut self, index: usize, reason: &str) -> Vec<PlayerNotice> {
        let kind = self.timeline.entries()[index].kind;
        warn!(index, %kind, reason, "clip failed, skipping");
        self.timeline.record_skipped(index);

        let mut notices = vec![PlayerNotice::ClipSkipped {
            index,
            kind,
            reason: reason.to_owned(),
        }];
        if self.state == (PlaybackState::Playing { index }) {
            notices.extend(self.advance(index));
        } else {
            // Paused on a clip that failed while loading; play() retries it.
            self.active = None;
        }
        notices
    }

    fn advance(&mut self, index: usize) -> Vec<PlayerNotice> {
        let next = index + 1;
        if next < self.timeline.len() {
            self.state = PlaybackState::Playing { index: next };
            self.start_clip(next, 0.0)
        } else {
            self.complete_scene()
        }
    }

    fn complete_scene(&mut self) -> Vec<PlayerNotice> {
        self.output.stop();
        self.active = None;
        self.state = PlaybackState::SceneComplete;

        let mut notices = Vec::new();
        if let Some(scene) = self.current_scene() {
            info!(scene_id = %scene.id, step = scene.step_number, "scene complete");
            notices.push(PlayerNotice::SceneCompleted { scene_id: scene.id });
        }

        if self.scene_index + 1 < self.scenes.len() {
            notices.extend(self.change_scene(self.scene_index + 1));
            notices.extend(self.play());
        } else {
            info!("end of story");
            notices.push(PlayerNotice::StoryFinished);
        }
        notices
    }

    fn change_scene(&mut self, target: usize) -> Vec<PlayerNotice> {
        self.output.stop();
        self.active = None;
        self.state = PlaybackState::Idle;
        self.scene_index = target;

        let scene = &self.scenes[target];
        self.timeline = Timeline::for_scene(scene);
        info!(scene_id = %scene.id, step = scene.step_number, clips = self.timeline.len(), "scene loaded");
        vec![PlayerNotice::SceneChanged {
            scene_id: scene.id,
            step_number: scene.step_number,
        }]
    }

    fn apply_volume(&mut self) {
        let gain = if self.muted { 0.0 } else { self.volume };
        self.output.set_volume(gain);
    }
}
