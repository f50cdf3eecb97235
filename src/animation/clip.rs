use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::animation::binder::ResolvedProperties;
use crate::animation::controller::ControllerId;
use crate::animation::key::KeyValue;
use crate::animation::track_data::TrackData;
use crate::animation::tracks::{PlaybackBounds, Track};
use crate::animation::values::AnimationValue;
use crate::errors::{GorgonError, Result};
use crate::utils::named_list::{Named, NamedList};

/// Playback state of an [`Animation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Playing,
    Stopped,
}

/// Events an animation keeps until drained. Older ones are dropped first.
pub const MAX_PENDING_EVENTS: usize = 16;

/// Notifications queued by an animation, see [`Animation::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationEvent {
    Started,
    Stopped,
    /// The playhead moved. Consecutive advances coalesce into one event.
    Advanced { time: f32, delta: f32 },
}

/// Input to an advance hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvanceArgs {
    /// Time the playhead is about to move to, before wrapping or clamping.
    pub proposed_time: f32,
    /// Distance from the current time.
    pub delta: f32,
}

/// Called on every advance; returns the time to use instead of the proposal.
pub type AdvanceHook = Arc<dyn Fn(AdvanceArgs) -> f32 + Send + Sync>;

impl Named for TrackData {
    fn name(&self) -> &str {
        TrackData::name(self)
    }
}

/// A named set of tracks sharing one playhead.
///
/// Times are in milliseconds. A non-positive length makes the animation
/// unbounded.
pub struct Animation {
    name: String,
    length: f32,
    looped: bool,
    loop_count: u32,
    fps: f32,
    speed: f32,
    enabled: bool,
    current_time: f32,
    state: AnimationState,
    tracks: NamedList<TrackData>,

    owner: Option<ControllerId>,
    advance_hook: Option<AdvanceHook>,
    events: SmallVec<[AnimationEvent; 4]>,
}

impl Named for Animation {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Animation {
    /// Creates an empty, playing animation.
    ///
    /// Fails with [`GorgonError::InvalidName`] for a blank name.
    pub fn new(name: impl Into<String>, length: f32) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GorgonError::InvalidName(name));
        }

        let mut animation = Self {
            name,
            length: 0.0,
            looped: false,
            loop_count: 0,
            fps: 60.0,
            speed: 1.0,
            enabled: true,
            current_time: 0.0,
            state: AnimationState::Playing,
            tracks: NamedList::new(),
            owner: None,
            advance_hook: None,
            events: SmallVec::new(),
        };
        animation.set_length(length);
        Ok(animation)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Non-positive lengths make the animation unbounded.
    pub fn set_length(&mut self, length: f32) {
        self.length = if length > 0.0 { length } else { f32::MAX };
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Clamped to at least 1.
    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps.max(1.0);
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[must_use]
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
    }

    /// Informational; playback loops forever while looped.
    #[must_use]
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn set_loop_count(&mut self, loop_count: u32) {
        self.loop_count = loop_count;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also stops playback.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == AnimationState::Playing
    }

    #[must_use]
    pub fn bounds(&self) -> PlaybackBounds {
        PlaybackBounds {
            length: self.length,
            looped: self.looped,
        }
    }

    /// Controller currently holding this animation.
    #[must_use]
    pub fn owner(&self) -> Option<ControllerId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<ControllerId>) {
        self.owner = owner;
    }

    /// Installs a hook that may rewrite every proposed playhead time.
    pub fn set_advance_hook(&mut self, hook: impl Fn(AdvanceArgs) -> f32 + Send + Sync + 'static) {
        self.advance_hook = Some(Arc::new(hook));
    }

    pub fn clear_advance_hook(&mut self) {
        self.advance_hook = None;
    }

    /// Takes every queued event, oldest first.
    ///
    /// At most [`MAX_PENDING_EVENTS`] are kept between drains.
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        self.events.drain(..).collect()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Starts playback. A disabled animation stays stopped.
    pub fn play(&mut self) {
        if !self.enabled || self.state == AnimationState::Playing {
            return;
        }
        self.state = AnimationState::Playing;
        self.push_event(AnimationEvent::Started);
    }

    pub fn stop(&mut self) {
        if self.state == AnimationState::Stopped {
            return;
        }
        self.state = AnimationState::Stopped;
        self.push_event(AnimationEvent::Stopped);
    }

    /// Stops and moves the playhead back to 0 without writing a frame.
    pub(crate) fn reset_playhead(&mut self) {
        self.stop();
        self.current_time = 0.0;
    }

    /// Moves the playhead back to 0 and plays from there.
    pub(crate) fn rewind(&mut self) {
        self.current_time = 0.0;
        self.play();
    }

    /// Moves the playhead to `time`. Ignored while stopped.
    ///
    /// Looped animations wrap into `[0, length)`. Others clamp to
    /// `[0, length]` and stop on reaching either end.
    pub fn set_current_time(&mut self, time: f32) {
        if self.state == AnimationState::Stopped {
            return;
        }

        let delta = time - self.current_time;
        let mut time = match &self.advance_hook {
            Some(hook) => hook(AdvanceArgs {
                proposed_time: time,
                delta,
            }),
            None => time,
        };
        self.push_advanced(time, delta);

        if self.looped {
            time = self.bounds().normalize(time);
        } else if time < 0.0 {
            time = 0.0;
            self.stop();
        } else if time >= self.length {
            time = self.length;
            self.stop();
        }

        self.current_time = time;
    }

    /// Advances the playhead by `delta` milliseconds.
    pub fn advance(&mut self, delta: f32) {
        self.set_current_time(self.current_time + delta);
    }

    fn push_advanced(&mut self, time: f32, delta: f32) {
        let event = AnimationEvent::Advanced { time, delta };
        match self.events.last_mut() {
            Some(last @ AnimationEvent::Advanced { .. }) => *last = event,
            _ => self.push_event(event),
        }
    }

    fn push_event(&mut self, event: AnimationEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    // ========================================================================
    // Applying frames
    // ========================================================================

    /// Writes the frame at the current time into `target`.
    ///
    /// Does nothing while disabled or stopped.
    pub fn apply_to<O>(&self, target: &mut O, properties: &ResolvedProperties<O>) {
        if !self.enabled || self.state == AnimationState::Stopped {
            return;
        }
        self.write_frame(target, properties);
    }

    /// Jumps to time 0 and writes that frame, even while stopped.
    pub fn reset<O>(&mut self, target: &mut O, properties: &ResolvedProperties<O>) {
        self.current_time = 0.0;
        self.write_frame(target, properties);
    }

    pub(crate) fn write_frame<O>(&self, target: &mut O, properties: &ResolvedProperties<O>) {
        let bounds = self.bounds();
        for track in &self.tracks {
            if !track.is_enabled() || track.is_empty() {
                continue;
            }
            // Tracks without a property are custom tracks, driven elsewhere.
            let Some(property) = properties.get(track.name()) else {
                continue;
            };
            let Some(value) = track.value_at(self.current_time, bounds) else {
                continue;
            };
            if !property.write(target, value) {
                log::warn!(
                    "Animation '{}': property '{}' of {} rejected a {} value",
                    self.name,
                    property.name(),
                    properties.type_name(),
                    track.data_type()
                );
            }
        }
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Tracks in insertion order.
    pub fn tracks(&self) -> impl Iterator<Item = &TrackData> {
        self.tracks.iter()
    }

    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut TrackData> {
        self.tracks.iter_mut()
    }

    #[must_use]
    pub fn contains_track(&self, name: &str) -> bool {
        self.tracks.contains(name)
    }

    #[must_use]
    pub fn track(&self, name: &str) -> Option<&TrackData> {
        self.tracks.get(name)
    }

    pub fn track_mut(&mut self, name: &str) -> Option<&mut TrackData> {
        self.tracks.get_mut(name)
    }

    /// Typed access to a track; `None` if absent or of another type.
    #[must_use]
    pub fn track_typed<T: KeyValue>(&self, name: &str) -> Option<&Track<T>> {
        self.tracks.get(name)?.as_track()
    }

    pub fn track_mut_typed<T: KeyValue>(&mut self, name: &str) -> Option<&mut Track<T>> {
        self.tracks.get_mut(name)?.as_track_mut()
    }

    /// Adds a track; names must be unique within the animation.
    pub fn add_track(&mut self, track: impl Into<TrackData>) -> Result<()> {
        let track = track.into();
        if track.name().trim().is_empty() {
            return Err(GorgonError::InvalidName(track.name().to_string()));
        }
        self.tracks
            .push(track)
            .map_err(|track| GorgonError::DuplicateTrack(track.name().to_string()))
    }

    pub fn remove_track(&mut self, name: &str) -> Result<TrackData> {
        self.tracks
            .remove(name)
            .ok_or_else(|| GorgonError::TrackNotFound(name.to_string()))
    }

    pub fn clear_tracks(&mut self) {
        self.tracks.clear();
    }

    /// Value of the named track at the current time.
    ///
    /// `None` if the track is missing or has no keys.
    #[must_use]
    pub fn value_at(&self, track_name: &str) -> Option<AnimationValue> {
        self.tracks.get(track_name)?.value_at(self.current_time, self.bounds())
    }

    /// Latest key time over all tracks.
    #[must_use]
    pub fn key_span(&self) -> f32 {
        self.tracks.iter().map(TrackData::duration).fold(0.0, f32::max)
    }
}

/// A clone is detached: no owner, no hook, no pending events.
impl Clone for Animation {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            length: self.length,
            looped: self.looped,
            loop_count: self.loop_count,
            fps: self.fps,
            speed: self.speed,
            enabled: self.enabled,
            current_time: self.current_time,
            state: self.state,
            tracks: self.tracks.clone(),
            owner: None,
            advance_hook: None,
            events: SmallVec::new(),
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("looped", &self.looped)
            .field("fps", &self.fps)
            .field("speed", &self.speed)
            .field("enabled", &self.enabled)
            .field("current_time", &self.current_time)
            .field("state", &self.state)
            .field("tracks", &self.tracks.names().collect::<Vec<_>>())
            .field("owner", &self.owner)
            .field("has_advance_hook", &self.advance_hook.is_some())
            .finish()
    }
}
