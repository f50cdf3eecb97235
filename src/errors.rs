//! Error Types
//!
//! This module defines the error types used throughout the animation core.
//!
//! # Overview
//!
//! The main error type [`GorgonError`] covers all failure modes including:
//! - Lookups of animations, tracks or keys that do not exist
//! - Duplicate names in owning collections
//! - Value/track data type mismatches
//! - Precondition violations (empty tracks, targets without animatable properties)
//! - Binary stream decoding errors
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, GorgonError>`.
//!
//! ```rust,ignore
//! use gorgon::errors::{GorgonError, Result};
//!
//! fn play_walk(controller: &mut AnimationController<Sprite>, sprite: &mut Sprite) -> Result<()> {
//!     controller.play(sprite, "Walk")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::{DataType, TrackInterpolationMode};

/// The main error type for the Gorgon animation core.
///
/// Nothing in the core retries internally: every variant is surfaced to the
/// immediate caller, and a failed mutation leaves the owning collection
/// untouched.
#[derive(Error, Debug)]
pub enum GorgonError {
    // ========================================================================
    // Not-found Errors
    // ========================================================================
    /// No animation with the given name exists in the controller.
    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    /// Animation index out of bounds.
    #[error("Animation index out of bounds: {index} (count: {count})")]
    AnimationIndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Number of animations in the collection
        count: usize,
    },

    /// No track with the given name exists in the animation or builder.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Key index out of bounds.
    #[error("Key index out of bounds on track '{track}': {index} (count: {count})")]
    KeyIndexOutOfBounds {
        /// Name of the track being accessed
        track: String,
        /// The invalid index
        index: usize,
        /// Number of keys on the track
        count: usize,
    },

    // ========================================================================
    // Duplicate-name Errors
    // ========================================================================
    /// An animation with this name already exists in the controller.
    #[error("An animation named '{0}' already exists")]
    DuplicateAnimation(String),

    /// A track with this name already exists in the animation.
    #[error("A track named '{0}' already exists")]
    DuplicateTrack(String),

    /// Names of animations and tracks must not be empty or whitespace.
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    // ========================================================================
    // Type Errors
    // ========================================================================
    /// A value (or track) of the wrong data type was supplied.
    #[error("Type mismatch on '{name}': expected {expected:?}, found {found:?}")]
    TypeMismatch {
        /// Name of the track or property
        name: String,
        /// The data type required by the track or property
        expected: DataType,
        /// The data type that was supplied
        found: DataType,
    },

    /// The requested interpolation mode is not supported by the key type.
    #[error("Track '{track}' does not support interpolation mode {requested:?} (supported: {supported:?})")]
    UnsupportedInterpolation {
        /// Name of the track
        track: String,
        /// The mode that was requested
        requested: TrackInterpolationMode,
        /// The modes the key type supports
        supported: TrackInterpolationMode,
    },

    // ========================================================================
    // Precondition Violations
    // ========================================================================
    /// Nearest-key lookup was requested on a track without keys.
    #[error("Track '{0}' has no keys")]
    EmptyTrack(String),

    /// The target type exposes no animatable properties.
    #[error("Type '{0}' has no animatable properties")]
    NoAnimatableProperties(&'static str),

    // ========================================================================
    // Stream Errors
    // ========================================================================
    /// The binary data is not in a known format.
    #[error("Invalid animation data: {0}")]
    InvalidFormat(String),

    /// Stream I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<std::string::FromUtf8Error> for GorgonError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GorgonError::InvalidFormat(err.to_string())
    }
}

/// Alias for `Result<T, GorgonError>`.
pub type Result<T> = std::result::Result<T, GorgonError>;
