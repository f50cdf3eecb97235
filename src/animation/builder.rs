use crate::animation::clip::Animation;
use crate::animation::key::KeyValue;
use crate::animation::settings::AnimationSettings;
use crate::animation::track_data::TrackData;
use crate::animation::tracks::{Track, TrackInterpolationMode, time_eq};
use crate::animation::values::DataType;
use crate::errors::{GorgonError, Result};
use crate::utils::named_list::NamedList;

/// Authoring helper that collects tracks and produces frame-aligned animations.
///
/// ```rust,ignore
/// let mut builder = AnimationBuilder::new();
/// builder.edit::<Vec2>("position")?.add_key(KeyFrame::new(0.0, Vec2::ZERO));
/// builder.edit::<Vec2>("position")?.add_key(KeyFrame::new(98.0, Vec2::X));
/// let walk = builder.build("Walk", Some(10.0), None)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnimationBuilder {
    settings: AnimationSettings,
    tracks: NamedList<TrackData>,
}

impl AnimationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: AnimationSettings) -> Self {
        Self {
            settings,
            tracks: NamedList::new(),
        }
    }

    /// The named track, created empty on first use.
    ///
    /// Fails with [`GorgonError::TypeMismatch`] if a track of another type
    /// already uses the name.
    pub fn edit<T: KeyValue>(&mut self, name: &str) -> Result<&mut Track<T>> {
        if !self.tracks.contains(name) {
            if name.trim().is_empty() {
                return Err(GorgonError::InvalidName(name.to_string()));
            }
            self.tracks.replace(Track::<T>::new(name).into());
        }

        let Some(track) = self.tracks.get_mut(name) else {
            return Err(GorgonError::TrackNotFound(name.to_string()));
        };
        let found = track.data_type();
        track.as_track_mut::<T>().ok_or_else(|| GorgonError::TypeMismatch {
            name: name.to_string(),
            expected: T::DATA_TYPE,
            found,
        })
    }

    pub fn delete(&mut self, name: &str) -> Result<&mut Self> {
        self.tracks
            .remove(name)
            .ok_or_else(|| GorgonError::TrackNotFound(name.to_string()))?;
        Ok(self)
    }

    pub fn clear(&mut self) -> &mut Self {
        self.tracks.clear();
        self
    }

    /// Replaces the collected tracks with copies of `animation`'s.
    pub fn reset_to(&mut self, animation: &Animation) -> &mut Self {
        self.tracks.clear();
        for track in animation.tracks() {
            self.tracks.replace(track.clone());
        }
        self
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Builds an animation from the collected tracks.
    ///
    /// Key times snap to the nearest frame boundary for `fps` (defaulting to
    /// the configured rate). Without an explicit `length` the animation runs
    /// one frame past its last key.
    pub fn build(&self, name: &str, fps: Option<f32>, length: Option<f32>) -> Result<Animation> {
        let fps = fps.unwrap_or(self.settings.default_fps).max(1.0);
        let frame = 1000.0 / fps;

        let mut tracks = Vec::with_capacity(self.tracks.len());
        let mut last_key = None::<f32>;
        for source in &self.tracks {
            let mut track = source.clone();
            snap_to_frames(&mut track, fps);
            if track.data_type() == DataType::Texture2D {
                track.set_interpolation_mode(TrackInterpolationMode::NONE)?;
            }
            if !track.is_empty() {
                last_key = Some(last_key.map_or(track.duration(), |t| t.max(track.duration())));
            }
            tracks.push(track);
        }

        let length = match (length, last_key) {
            (Some(length), _) => length,
            (None, Some(last)) => (last + frame).max(frame),
            (None, None) => self.settings.default_length,
        };

        let mut animation = Animation::new(name, length)?;
        animation.set_fps(fps);
        for track in tracks {
            animation.add_track(track)?;
        }

        log::debug!(
            "Built animation '{name}': {} tracks, length {}, {fps} fps",
            animation.track_count(),
            animation.length()
        );
        Ok(animation)
    }
}

fn snap_time(time: f32, fps: f32) -> f32 {
    let snapped = (time * fps / 1000.0).round() * 1000.0 / fps;
    if time_eq(time, snapped) { time } else { snapped }
}

fn snap_to_frames(track: &mut TrackData, fps: f32) {
    macro_rules! snap {
        ($track:expr) => {{
            let mut keys = $track.edit_keys();
            for key in keys.iter_mut() {
                key.set_time(snap_time(key.time(), fps));
            }
        }};
    }

    match track {
        TrackData::Single(t) => snap!(t),
        TrackData::Vector2(t) => snap!(t),
        TrackData::Vector3(t) => snap!(t),
        TrackData::Vector4(t) => snap!(t),
        TrackData::Quaternion(t) => snap!(t),
        TrackData::Color(t) => snap!(t),
        TrackData::Rectangle(t) => snap!(t),
        TrackData::Texture2D(t) => snap!(t),
    }
}
