//! Keyframe Animation
//!
//! - [`Track`]: time-sorted keys of one value type with nearest-key lookup
//!   and linear/spline/step interpolation
//! - [`TrackData`]: a track of any built-in key type
//! - [`Animation`]: named tracks sharing a playhead, with loop and clamp semantics
//! - [`AnimationController`]: owns animations and drives one at a time against a target
//! - [`AnimationBuilder`]: authoring helper that frame-aligns keys
//!
//! Targets opt in through [`Animated`], usually via
//! [`animated_properties!`](crate::animated_properties). Tracks bind to
//! properties by name.

pub mod binder;
pub mod binding;
pub mod builder;
pub mod clip;
pub mod controller;
pub mod io;
pub mod key;
pub mod settings;
pub mod track_data;
pub mod tracks;
pub mod values;

pub use binder::{PropertyResolver, ResolvedProperties, ResolvedProperty};
pub use binding::{Animated, AnimatedProperty};
pub use builder::AnimationBuilder;
pub use clip::{AdvanceArgs, AdvanceHook, Animation, AnimationEvent, AnimationState, MAX_PENDING_EVENTS};
pub use controller::{AnimationController, ControllerId};
pub use io::{ANIMATION_MAGIC, NoTextureResolver, TextureResolver};
pub use key::{KeyFrame, KeyValue};
pub use settings::AnimationSettings;
pub use track_data::TrackData;
pub use tracks::{KEY_TIME_EPSILON, KeyEditGuard, NearestKeys, PlaybackBounds, Track, TrackInterpolationMode, time_eq};
pub use values::{
    AnimationValue, Color, DataType, Interpolatable, RectF, TextureHandle, TextureRef, TextureRegion,
};
