use std::fmt;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3, Vec4};

/// Interpolation math shared by every blendable key value.
pub trait Interpolatable: Copy + Clone + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Cubic Hermite interpolation between `v0` and `v1`.
    fn interpolate_cubic(
        v0: Self,
        out_tangent0: Self,
        in_tangent1: Self,
        v1: Self,
        t: f32,
        dt: f32,
    ) -> Self;

    /// Catmull-Rom tangent for a key whose neighbours are `prev` and `next`.
    fn catmull_rom_tangent(prev: Self, next: Self) -> Self;
}

/// Hermite basis weights `(s0, s1, s2, s3)` for `t`.
#[inline]
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;

    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;

    (s0, s1, s2, s3)
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        s0 * v0 + s1 * (out_tangent0 * dt) + s2 * v1 + s3 * (in_tangent1 * dt)
    }

    fn catmull_rom_tangent(prev: Self, next: Self) -> Self {
        (next - prev) * 0.5
    }
}

macro_rules! impl_interpolatable_vector {
    ($($vector:ty),* $(,)?) => {
        $(
            impl Interpolatable for $vector {
                fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
                    start.lerp(end, t)
                }

                fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
                    let (s0, s1, s2, s3) = hermite_basis(t);
                    v0 * s0 + (out_tangent0 * dt) * s1 + v1 * s2 + (in_tangent1 * dt) * s3
                }

                fn catmull_rom_tangent(prev: Self, next: Self) -> Self {
                    (next - prev) * 0.5
                }
            }
        )*
    };
}

impl_interpolatable_vector!(Vec2, Vec3, Vec4);

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let result = Vec4::interpolate_cubic(
            Vec4::from(v0),
            Vec4::from(out_tangent0),
            Vec4::from(in_tangent1),
            Vec4::from(v1),
            t,
            dt,
        );

        Quat::from_vec4(result).normalize()
    }

    fn catmull_rom_tangent(prev: Self, next: Self) -> Self {
        Quat::from_vec4(Vec4::catmull_rom_tangent(Vec4::from(prev), Vec4::from(next)))
    }
}

// ============================================================================
// Color
// ============================================================================

/// Linear RGBA color with `f32` components.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Color> for Vec4 {
    fn from(c: Color) -> Self {
        Vec4::new(c.r, c.g, c.b, c.a)
    }
}

impl Interpolatable for Color {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        Vec4::interpolate_linear(start.into(), end.into(), t).into()
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        Vec4::interpolate_cubic(v0.into(), out_tangent0.into(), in_tangent1.into(), v1.into(), t, dt).into()
    }

    fn catmull_rom_tangent(prev: Self, next: Self) -> Self {
        Vec4::catmull_rom_tangent(prev.into(), next.into()).into()
    }
}

// ============================================================================
// Rectangle
// ============================================================================

/// Axis-aligned rectangle stored as position + size.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    #[must_use]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

impl From<Vec4> for RectF {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<RectF> for Vec4 {
    fn from(r: RectF) -> Self {
        Vec4::new(r.x, r.y, r.width, r.height)
    }
}

impl Interpolatable for RectF {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        Vec4::interpolate_linear(start.into(), end.into(), t).into()
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        Vec4::interpolate_cubic(v0.into(), out_tangent0.into(), in_tangent1.into(), v1.into(), t, dt).into()
    }

    fn catmull_rom_tangent(prev: Self, next: Self) -> Self {
        Vec4::catmull_rom_tangent(prev.into(), next.into()).into()
    }
}

// ============================================================================
// Texture regions
// ============================================================================

/// Opaque handle to a texture owned by the graphics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// A texture referenced by name, optionally resolved to a live handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    pub name: Arc<str>,
    pub handle: Option<TextureHandle>,
}

impl TextureRef {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            handle: None,
        }
    }

    #[must_use]
    pub fn resolved(name: &str, handle: TextureHandle) -> Self {
        Self {
            name: Arc::from(name),
            handle: Some(handle),
        }
    }
}

/// A region of a texture used for frame-flipping animation.
///
/// Texture regions are never blended: tracks of this type only support
/// stepping from key to key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureRegion {
    pub texture: Option<TextureRef>,
    pub coords: RectF,
    pub array_index: i32,
}

impl TextureRegion {
    #[must_use]
    pub fn new(texture: Option<TextureRef>, coords: RectF, array_index: i32) -> Self {
        Self {
            texture,
            coords,
            array_index,
        }
    }
}

// ============================================================================
// Data type tags & type-erased values
// ============================================================================

/// Tag identifying the payload type of a key, track or property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Single,
    Vector2,
    Vector3,
    Vector4,
    Quaternion,
    Color,
    Rectangle,
    Texture2D,
    /// A property type with no built-in track implementation.
    Custom(&'static str),
}

impl DataType {
    /// Binary tag used by the stream codec. `None` for custom types.
    #[must_use]
    pub fn tag(self) -> Option<u8> {
        Some(match self {
            DataType::Single => 0,
            DataType::Vector2 => 1,
            DataType::Vector3 => 2,
            DataType::Vector4 => 3,
            DataType::Quaternion => 4,
            DataType::Color => 5,
            DataType::Rectangle => 6,
            DataType::Texture2D => 7,
            DataType::Custom(_) => return None,
        })
    }

    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => DataType::Single,
            1 => DataType::Vector2,
            2 => DataType::Vector3,
            3 => DataType::Vector4,
            4 => DataType::Quaternion,
            5 => DataType::Color,
            6 => DataType::Rectangle,
            7 => DataType::Texture2D,
            _ => return None,
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Custom(name) => write!(f, "Custom({name})"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// A key value with its type erased, as read from or written to a property.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationValue {
    Single(f32),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Quaternion(Quat),
    Color(Color),
    Rectangle(RectF),
    Texture2D(TextureRegion),
}

impl AnimationValue {
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            AnimationValue::Single(_) => DataType::Single,
            AnimationValue::Vector2(_) => DataType::Vector2,
            AnimationValue::Vector3(_) => DataType::Vector3,
            AnimationValue::Vector4(_) => DataType::Vector4,
            AnimationValue::Quaternion(_) => DataType::Quaternion,
            AnimationValue::Color(_) => DataType::Color,
            AnimationValue::Rectangle(_) => DataType::Rectangle,
            AnimationValue::Texture2D(_) => DataType::Texture2D,
        }
    }

    /// Re-interprets the value as `target`.
    ///
    /// Only lossless re-interpretations are allowed (`Color`/`Rectangle` to
    /// and from `Vector4`). Returns `None` for anything else.
    #[must_use]
    pub fn convert(self, target: DataType) -> Option<AnimationValue> {
        if self.data_type() == target {
            return Some(self);
        }

        match (self, target) {
            (AnimationValue::Color(c), DataType::Vector4) => Some(AnimationValue::Vector4(c.into())),
            (AnimationValue::Rectangle(r), DataType::Vector4) => Some(AnimationValue::Vector4(r.into())),
            (AnimationValue::Vector4(v), DataType::Color) => Some(AnimationValue::Color(v.into())),
            (AnimationValue::Vector4(v), DataType::Rectangle) => Some(AnimationValue::Rectangle(v.into())),
            _ => None,
        }
    }
}
