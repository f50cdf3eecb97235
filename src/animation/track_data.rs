use std::io::{Read, Write};

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::animation::io::TextureResolver;
use crate::animation::key::{KeyFrame, KeyValue};
use crate::animation::tracks::{PlaybackBounds, Track, TrackInterpolationMode};
use crate::animation::values::{AnimationValue, Color, DataType, RectF, TextureRegion};
use crate::errors::{GorgonError, Result};

/// A track of any built-in key type.
///
/// Lets one animation hold tracks of different value types side by side.
#[derive(Debug, Clone)]
pub enum TrackData {
    Single(Track<f32>),
    Vector2(Track<Vec2>),
    Vector3(Track<Vec3>),
    Vector4(Track<Vec4>),
    Quaternion(Track<Quat>),
    Color(Track<Color>),
    Rectangle(Track<RectF>),
    Texture2D(Track<TextureRegion>),
}

macro_rules! dispatch {
    ($data:expr, $track:ident => $body:expr) => {
        match $data {
            TrackData::Single($track) => $body,
            TrackData::Vector2($track) => $body,
            TrackData::Vector3($track) => $body,
            TrackData::Vector4($track) => $body,
            TrackData::Quaternion($track) => $body,
            TrackData::Color($track) => $body,
            TrackData::Rectangle($track) => $body,
            TrackData::Texture2D($track) => $body,
        }
    };
}

impl<T: KeyValue> From<Track<T>> for TrackData {
    fn from(track: Track<T>) -> Self {
        T::wrap_track(track)
    }
}

impl TrackData {
    /// Creates an empty track for `data_type`.
    ///
    /// Returns `None` for [`DataType::Custom`], which has no built-in track.
    #[must_use]
    pub fn for_data_type(name: &str, data_type: DataType) -> Option<Self> {
        Some(match data_type {
            DataType::Single => Track::<f32>::new(name).into(),
            DataType::Vector2 => Track::<Vec2>::new(name).into(),
            DataType::Vector3 => Track::<Vec3>::new(name).into(),
            DataType::Vector4 => Track::<Vec4>::new(name).into(),
            DataType::Quaternion => Track::<Quat>::new(name).into(),
            DataType::Color => Track::<Color>::new(name).into(),
            DataType::Rectangle => Track::<RectF>::new(name).into(),
            DataType::Texture2D => Track::<TextureRegion>::new(name).into(),
            DataType::Custom(_) => return None,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        dispatch!(self, t => t.name())
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        dispatch!(self, t => t.data_type())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        dispatch!(self, t => t.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        dispatch!(self, t => t.is_empty())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        dispatch!(self, t => t.is_enabled())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        dispatch!(self, t => t.set_enabled(enabled));
    }

    #[must_use]
    pub fn interpolation_mode(&self) -> TrackInterpolationMode {
        dispatch!(self, t => t.interpolation_mode())
    }

    pub fn set_interpolation_mode(&mut self, mode: TrackInterpolationMode) -> Result<()> {
        dispatch!(self, t => t.set_interpolation_mode(mode))
    }

    #[must_use]
    pub fn supported_interpolation(&self) -> TrackInterpolationMode {
        dispatch!(self, t => t.supported_interpolation())
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        dispatch!(self, t => t.version())
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        dispatch!(self, t => t.duration())
    }

    pub fn clear(&mut self) {
        dispatch!(self, t => t.clear());
    }

    /// Key times in order.
    #[must_use]
    pub fn key_times(&self) -> Vec<f32> {
        dispatch!(self, t => t.keys().iter().map(KeyFrame::time).collect())
    }

    /// Type-erased value at `time`; `None` for an empty track.
    #[must_use]
    pub fn value_at(&self, time: f32, bounds: PlaybackBounds) -> Option<AnimationValue> {
        dispatch!(self, t => t.value_at(time, bounds).map(KeyValue::into_value))
    }

    /// Adds a type-erased key. The value must match the track's data type exactly.
    pub fn add_value(&mut self, time: f32, value: AnimationValue) -> Result<usize> {
        let expected = self.data_type();
        let found = value.data_type();
        if expected != found {
            return Err(GorgonError::TypeMismatch {
                name: self.name().to_string(),
                expected,
                found,
            });
        }

        dispatch!(self, t => {
            let value = KeyValue::from_value(value).ok_or_else(|| GorgonError::TypeMismatch {
                name: t.name().to_string(),
                expected,
                found,
            })?;
            Ok(t.add_key(KeyFrame::new(time, value)))
        })
    }

    #[must_use]
    pub fn as_track<T: KeyValue>(&self) -> Option<&Track<T>> {
        T::track_ref(self)
    }

    #[must_use]
    pub fn as_track_mut<T: KeyValue>(&mut self) -> Option<&mut Track<T>> {
        T::track_mut(self)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        dispatch!(self, t => t.write_to(writer))
    }

    /// Reads a track of `data_type` written by [`TrackData::write_to`].
    pub fn read_from<R: Read>(
        reader: &mut R,
        name: &str,
        data_type: DataType,
        resolver: &dyn TextureResolver,
    ) -> Result<Self> {
        Ok(match data_type {
            DataType::Single => Track::<f32>::read_from(reader, name, resolver)?.into(),
            DataType::Vector2 => Track::<Vec2>::read_from(reader, name, resolver)?.into(),
            DataType::Vector3 => Track::<Vec3>::read_from(reader, name, resolver)?.into(),
            DataType::Vector4 => Track::<Vec4>::read_from(reader, name, resolver)?.into(),
            DataType::Quaternion => Track::<Quat>::read_from(reader, name, resolver)?.into(),
            DataType::Color => Track::<Color>::read_from(reader, name, resolver)?.into(),
            DataType::Rectangle => Track::<RectF>::read_from(reader, name, resolver)?.into(),
            DataType::Texture2D => Track::<TextureRegion>::read_from(reader, name, resolver)?.into(),
            DataType::Custom(custom) => {
                return Err(GorgonError::InvalidFormat(format!("custom data type '{custom}' has no codec")));
            }
        })
    }
}
