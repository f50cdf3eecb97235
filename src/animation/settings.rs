//! Animation Settings
//!
//! Tunables shared by the [`AnimationController`](super::AnimationController)
//! and the [`AnimationBuilder`](super::AnimationBuilder).
//!
//! ```rust,ignore
//! use gorgon::animation::AnimationSettings;
//!
//! // Drive animations authored in seconds instead of milliseconds.
//! let settings = AnimationSettings {
//!     time_scale: 1.0,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// Playback and authoring defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Converts the per-frame delta (seconds) into animation time units.
    ///
    /// Animation time is in milliseconds, so this defaults to 1000.
    pub time_scale: f32,
    /// Frame rate used by the builder when none is given.
    pub default_fps: f32,
    /// Length (ms) of animations created without an explicit length.
    pub default_length: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            time_scale: 1000.0,
            default_fps: 60.0,
            default_length: 1000.0,
        }
    }
}
