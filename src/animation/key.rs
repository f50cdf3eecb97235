use std::fmt;
use std::io::{Read, Write};

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::animation::io::{self, TextureResolver};
use crate::animation::track_data::TrackData;
use crate::animation::tracks::{Track, TrackInterpolationMode};
use crate::animation::values::{
    AnimationValue, Color, DataType, Interpolatable, RectF, TextureRegion,
};
use crate::errors::Result;

/// Contract implemented by every concrete key payload type.
///
/// Ties a Rust type to its [`DataType`] tag, declares which interpolation
/// modes its tracks support, and provides the tween, codec and type-erasure
/// hooks the generic [`Track`] needs.
pub trait KeyValue: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    const DATA_TYPE: DataType;
    const SUPPORTED_INTERPOLATION: TrackInterpolationMode;

    fn tween_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Spline tween between `v0` and `v1` using the precomputed key tangents.
    fn tween_spline(v0: &Self, tangent0: &Self, tangent1: &Self, v1: &Self, t: f32) -> Self;

    fn spline_tangent(prev: &Self, next: &Self) -> Self;

    fn into_value(self) -> AnimationValue;

    /// Unwraps an erased value, accepting lossless re-interpretations.
    fn from_value(value: AnimationValue) -> Option<Self>;

    fn encode<W: Write>(&self, writer: &mut W) -> Result<()>;

    fn decode<R: Read>(reader: &mut R, resolver: &dyn TextureResolver) -> Result<Self>;

    fn wrap_track(track: Track<Self>) -> TrackData;

    fn track_ref(data: &TrackData) -> Option<&Track<Self>>;

    fn track_mut(data: &mut TrackData) -> Option<&mut Track<Self>>;
}

macro_rules! impl_blended_key_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl KeyValue for $ty {
                const DATA_TYPE: DataType = DataType::$variant;
                const SUPPORTED_INTERPOLATION: TrackInterpolationMode =
                    TrackInterpolationMode::LINEAR.union(TrackInterpolationMode::SPLINE);

                fn tween_linear(start: &Self, end: &Self, t: f32) -> Self {
                    <$ty as Interpolatable>::interpolate_linear(*start, *end, t)
                }

                fn tween_spline(v0: &Self, tangent0: &Self, tangent1: &Self, v1: &Self, t: f32) -> Self {
                    <$ty as Interpolatable>::interpolate_cubic(*v0, *tangent0, *tangent1, *v1, t, 1.0)
                }

                fn spline_tangent(prev: &Self, next: &Self) -> Self {
                    <$ty as Interpolatable>::catmull_rom_tangent(*prev, *next)
                }

                fn into_value(self) -> AnimationValue {
                    AnimationValue::$variant(self)
                }

                fn from_value(value: AnimationValue) -> Option<Self> {
                    match value.convert(DataType::$variant)? {
                        AnimationValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
                    io::write_pod(writer, self)
                }

                fn decode<R: Read>(reader: &mut R, _resolver: &dyn TextureResolver) -> Result<Self> {
                    io::read_pod(reader)
                }

                fn wrap_track(track: Track<Self>) -> TrackData {
                    TrackData::$variant(track)
                }

                fn track_ref(data: &TrackData) -> Option<&Track<Self>> {
                    match data {
                        TrackData::$variant(track) => Some(track),
                        _ => None,
                    }
                }

                fn track_mut(data: &mut TrackData) -> Option<&mut Track<Self>> {
                    match data {
                        TrackData::$variant(track) => Some(track),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_blended_key_value!(
    f32 => Single,
    Vec2 => Vector2,
    Vec3 => Vector3,
    Vec4 => Vector4,
    Quat => Quaternion,
    Color => Color,
    RectF => Rectangle,
);

impl KeyValue for TextureRegion {
    const DATA_TYPE: DataType = DataType::Texture2D;
    const SUPPORTED_INTERPOLATION: TrackInterpolationMode = TrackInterpolationMode::NONE;

    // Frames are never blended; the previous key holds until the next one.
    fn tween_linear(start: &Self, _end: &Self, _t: f32) -> Self {
        start.clone()
    }

    fn tween_spline(v0: &Self, _tangent0: &Self, _tangent1: &Self, _v1: &Self, _t: f32) -> Self {
        v0.clone()
    }

    fn spline_tangent(prev: &Self, _next: &Self) -> Self {
        prev.clone()
    }

    fn into_value(self) -> AnimationValue {
        AnimationValue::Texture2D(self)
    }

    fn from_value(value: AnimationValue) -> Option<Self> {
        match value {
            AnimationValue::Texture2D(region) => Some(region),
            _ => None,
        }
    }

    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        io::write_texture_region(writer, self)
    }

    fn decode<R: Read>(reader: &mut R, resolver: &dyn TextureResolver) -> Result<Self> {
        io::read_texture_region(reader, resolver)
    }

    fn wrap_track(track: Track<Self>) -> TrackData {
        TrackData::Texture2D(track)
    }

    fn track_ref(data: &TrackData) -> Option<&Track<Self>> {
        match data {
            TrackData::Texture2D(track) => Some(track),
            _ => None,
        }
    }

    fn track_mut(data: &mut TrackData) -> Option<&mut Track<Self>> {
        match data {
            TrackData::Texture2D(track) => Some(track),
            _ => None,
        }
    }
}

/// A single time-stamped sample of a property value.
///
/// Keys placed on a [`Track`] are only reachable mutably through the track
/// (see [`Track::edit_keys`]), so every change to a key's time re-sorts its
/// owner. A cloned key is fully detached from the track it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame<T: KeyValue> {
    time: f32,
    value: T,
    interpolation: Option<TrackInterpolationMode>,
}

impl<T: KeyValue> KeyFrame<T> {
    #[must_use]
    pub fn new(time: f32, value: T) -> Self {
        Self {
            time,
            value,
            interpolation: None,
        }
    }

    /// Overrides the track's interpolation mode for the segment starting at this key.
    #[must_use]
    pub fn with_interpolation(mut self, mode: TrackInterpolationMode) -> Self {
        self.interpolation = Some(mode);
        self
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    #[must_use]
    pub fn interpolation(&self) -> Option<TrackInterpolationMode> {
        self.interpolation
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    pub fn set_interpolation(&mut self, mode: Option<TrackInterpolationMode>) {
        self.interpolation = mode;
    }

    /// Detached copy of this key moved to `time`.
    ///
    /// Use [`Track::copy_key_to`] to also place the copy on the owning track.
    #[must_use]
    pub fn copy_to(&self, time: f32) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }
}
