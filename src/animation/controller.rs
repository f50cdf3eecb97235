use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::animation::binder::{PropertyResolver, ResolvedProperties};
use crate::animation::binding::Animated;
use crate::animation::clip::{Animation, AnimationState};
use crate::animation::settings::AnimationSettings;
use crate::errors::{GorgonError, Result};
use crate::utils::named_list::NamedList;

/// Identity of an [`AnimationController`], recorded as an animation's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(u64);

impl ControllerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Plays one animation at a time against targets of type `O`.
///
/// The controller owns its animations. The target is passed to each call
/// that writes a frame, so one controller can drive any `O` the caller
/// chooses, typically the same object every frame.
///
/// ```rust,ignore
/// let mut controller = AnimationController::<Sprite>::new()?;
/// controller.create_animation("Walk", 200.0)?;
/// controller.play(&mut sprite, "Walk")?;
///
/// // Per frame, with the frame delta in seconds:
/// controller.update(&mut sprite, dt);
/// ```
pub struct AnimationController<O: Animated> {
    id: ControllerId,
    settings: AnimationSettings,
    properties: Arc<ResolvedProperties<O>>,
    animations: NamedList<Animation>,
    current: Option<String>,
}

impl<O: Animated> AnimationController<O> {
    /// Fails with [`GorgonError::NoAnimatableProperties`] when `O` exposes no properties.
    pub fn new() -> Result<Self> {
        Self::with_settings(AnimationSettings::default())
    }

    pub fn with_settings(settings: AnimationSettings) -> Result<Self> {
        Ok(Self {
            id: ControllerId::next(),
            settings,
            properties: PropertyResolver::resolve::<O>()?,
            animations: NamedList::new(),
            current: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.id
    }

    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: AnimationSettings) {
        self.settings = settings;
    }

    /// The resolved properties of `O` that tracks bind to.
    #[must_use]
    pub fn properties(&self) -> &ResolvedProperties<O> {
        &self.properties
    }

    // ========================================================================
    // Collection
    // ========================================================================

    /// Creates an animation with one empty track per property of `O` and adds it.
    pub fn create_animation(&mut self, name: &str, length: f32) -> Result<&mut Animation> {
        if self.animations.contains(name) {
            return Err(GorgonError::DuplicateAnimation(name.to_string()));
        }

        let mut animation = Animation::new(name, length)?;
        for track in self.properties.create_tracks() {
            animation.add_track(track)?;
        }
        self.add(animation)?;

        self.animations
            .get_mut(name)
            .ok_or_else(|| GorgonError::AnimationNotFound(name.to_string()))
    }

    /// Takes ownership of `animation`.
    ///
    /// Fails if the name is taken or a track binds to a property of another type.
    pub fn add(&mut self, mut animation: Animation) -> Result<()> {
        if self.animations.contains(animation.name()) {
            return Err(GorgonError::DuplicateAnimation(animation.name().to_string()));
        }
        self.check_bindings(&animation)?;

        self.attach(&mut animation);
        self.animations
            .push(animation)
            .map_err(|animation| GorgonError::DuplicateAnimation(animation.name().to_string()))
    }

    /// Adds `animation`, replacing one with the same name.
    ///
    /// Replacing the current animation stops playback first. Returns the
    /// replaced animation, detached.
    pub fn set(&mut self, mut animation: Animation) -> Result<Option<Animation>> {
        self.check_bindings(&animation)?;

        if self.current.as_deref() == Some(animation.name()) {
            self.stop();
        }

        self.attach(&mut animation);
        let mut replaced = self.animations.replace(animation);
        if let Some(old) = replaced.as_mut() {
            old.set_owner(None);
        }
        Ok(replaced)
    }

    /// Removes and returns the named animation, detached.
    pub fn remove(&mut self, name: &str) -> Result<Animation> {
        if self.current.as_deref() == Some(name) {
            self.stop();
        }

        let mut animation = self
            .animations
            .remove(name)
            .ok_or_else(|| GorgonError::AnimationNotFound(name.to_string()))?;
        animation.set_owner(None);
        Ok(animation)
    }

    /// Stops playback and drops every animation.
    pub fn clear(&mut self) {
        self.stop();
        self.animations.clear();
    }

    /// Moves the named animation out of `other` into this controller.
    ///
    /// On failure both controllers are left unchanged.
    pub fn adopt<P: Animated>(&mut self, other: &mut AnimationController<P>, name: &str) -> Result<()> {
        if self.animations.contains(name) {
            return Err(GorgonError::DuplicateAnimation(name.to_string()));
        }
        let animation = other
            .animation(name)
            .ok_or_else(|| GorgonError::AnimationNotFound(name.to_string()))?;
        self.check_bindings(animation)?;

        let animation = other.remove(name)?;
        log::debug!("Animation '{name}' moved from controller {:?} to {:?}", other.id, self.id);
        self.add(animation)
    }

    #[must_use]
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn animation_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.get_mut(name)
    }

    #[must_use]
    pub fn animation_at(&self, index: usize) -> Option<&Animation> {
        self.animations.get_index(index)
    }

    pub fn animations(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.animations.names()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains(name)
    }

    fn attach(&self, animation: &mut Animation) {
        if let Some(previous) = animation.owner().filter(|owner| *owner != self.id) {
            log::debug!(
                "Animation '{}' re-parented from controller {previous:?} to {:?}",
                animation.name(),
                self.id
            );
        }
        animation.set_owner(Some(self.id));
    }

    fn check_bindings(&self, animation: &Animation) -> Result<()> {
        for track in animation.tracks() {
            let Some(property) = self.properties.get(track.name()) else {
                continue;
            };
            if property.data_type() != track.data_type() {
                return Err(GorgonError::TypeMismatch {
                    name: track.name().to_string(),
                    expected: property.data_type(),
                    found: track.data_type(),
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Makes the named animation current and plays it from 0.
    ///
    /// Playing the animation that is already current does nothing.
    pub fn play(&mut self, target: &mut O, name: &str) -> Result<()> {
        if !self.animations.contains(name) {
            return Err(GorgonError::AnimationNotFound(name.to_string()));
        }
        if self.current.as_deref() == Some(name) {
            return Ok(());
        }

        if let Some(previous) = self.current.take()
            && let Some(animation) = self.animations.get_mut(&previous)
        {
            animation.reset_playhead();
        }

        let Some(animation) = self.animations.get_mut(name) else {
            return Err(GorgonError::AnimationNotFound(name.to_string()));
        };
        animation.rewind();
        if !animation.is_enabled() {
            log::warn!("Animation '{name}' is disabled and will not advance");
        }

        log::debug!("Playing animation '{name}'");
        self.current = Some(name.to_string());
        self.update(target, 0.0);
        Ok(())
    }

    pub fn play_index(&mut self, target: &mut O, index: usize) -> Result<()> {
        let name = self
            .animations
            .get_index(index)
            .map(|animation| animation.name().to_string())
            .ok_or(GorgonError::AnimationIndexOutOfBounds {
                index,
                count: self.animations.len(),
            })?;
        self.play(target, &name)
    }

    /// Advances the current animation by `delta_seconds` and writes the frame.
    pub fn update(&mut self, target: &mut O, delta_seconds: f32) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        let Some(animation) = self.animations.get_mut(name) else {
            self.current = None;
            return;
        };

        let was_playing = animation.is_playing();
        let increment = animation.speed() * delta_seconds * self.settings.time_scale;
        animation.advance(increment);

        // The tick that reaches the end still writes its frame.
        if was_playing && animation.is_enabled() {
            animation.write_frame(target, &*self.properties);
        }

        let finished = !animation.is_looped()
            && (animation.current_time() >= animation.length() || animation.state() == AnimationState::Stopped);
        if finished {
            log::trace!("Animation '{}' finished at {}", animation.name(), animation.current_time());
            self.stop();
        }
    }

    /// Stops the current animation, keeping its time, and clears the current reference.
    pub fn stop(&mut self) {
        if let Some(name) = self.current.take()
            && let Some(animation) = self.animations.get_mut(&name)
        {
            log::debug!("Stopping animation '{name}' at {}", animation.current_time());
            animation.stop();
        }
    }

    /// State of the current animation; `Stopped` when there is none.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.current_animation()
            .map_or(AnimationState::Stopped, Animation::state)
    }

    #[must_use]
    pub fn current_animation(&self) -> Option<&Animation> {
        self.animations.get(self.current.as_deref()?)
    }

    pub fn current_animation_mut(&mut self) -> Option<&mut Animation> {
        self.animations.get_mut(self.current.as_deref()?)
    }

    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Rewinds the current animation to 0 and writes that frame.
    pub fn reset(&mut self, target: &mut O) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        if let Some(animation) = self.animations.get_mut(name) {
            animation.reset(target, &*self.properties);
        }
    }
}

impl<O: Animated> std::fmt::Debug for AnimationController<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("id", &self.id)
            .field("target", &self.properties.type_name())
            .field("animations", &self.animations.names().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}
