//! # Gorgon
//!
//! Keyframe animation core: typed tracks with nearest-key interpolation,
//! animations that loop or clamp, and a controller that writes each frame
//! into the properties of a target object.
//!
//! ```rust,ignore
//! use glam::Vec2;
//! use gorgon::animation::{AnimationController, KeyFrame};
//!
//! struct Sprite {
//!     position: Vec2,
//! }
//!
//! gorgon::animated_properties! {
//!     Sprite { position: Vec2 }
//! }
//!
//! let mut sprite = Sprite { position: Vec2::ZERO };
//! let mut controller = AnimationController::<Sprite>::new()?;
//!
//! let walk = controller.create_animation("Walk", 200.0)?;
//! let track = walk.track_mut_typed::<Vec2>("position").unwrap();
//! track.add_key(KeyFrame::new(0.0, Vec2::ZERO));
//! track.add_key(KeyFrame::new(200.0, Vec2::new(64.0, 0.0)));
//!
//! controller.play(&mut sprite, "Walk")?;
//! controller.update(&mut sprite, 0.1); // sprite.position == (32, 0)
//! ```

pub mod animation;
pub mod errors;
pub mod utils;

pub use animation::{Animated, Animation, AnimationBuilder, AnimationController, KeyFrame, Track, TrackData};
pub use errors::{GorgonError, Result};
