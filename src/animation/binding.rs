//! Property Binding
//!
//! Types opt into animation by implementing [`Animated`], which lists the
//! fields a track may drive. Each entry carries plain function pointers for
//! reading and writing the field as an [`AnimationValue`], so applying a frame
//! never goes through reflection.
//!
//! The [`animated_properties!`](crate::animated_properties) macro generates the
//! implementation from a field list:
//!
//! ```rust,ignore
//! use glam::Vec2;
//! use gorgon::animation::{Color, DataType};
//!
//! struct Sprite {
//!     position: Vec2,
//!     rotation: f32,
//!     tint: Color,
//! }
//!
//! gorgon::animated_properties! {
//!     Sprite {
//!         position: Vec2,
//!         rotation: f32,
//!         // Exposed to tracks as a plain Vector4.
//!         #[display = "Tint"]
//!         #[data_type = DataType::Vector4]
//!         tint: Color,
//!     }
//! }
//! ```

use std::fmt;

use crate::animation::values::{AnimationValue, DataType};

/// A type whose fields can be driven by animation tracks.
pub trait Animated: 'static {
    /// The animatable properties, in declaration order.
    fn animated_properties() -> &'static [AnimatedProperty<Self>]
    where
        Self: Sized;
}

/// One animatable field of `O`.
pub struct AnimatedProperty<O> {
    /// Track name that binds to this property.
    pub name: &'static str,
    pub display_name: Option<&'static str>,
    /// Type of the track bound to this property.
    pub data_type: DataType,
    pub get: fn(&O) -> AnimationValue,
    /// Returns `false` when the value cannot be stored in the field.
    pub set: fn(&mut O, AnimationValue) -> bool,
}

// Manual impls: derives would require `O: Clone`.
impl<O> Clone for AnimatedProperty<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for AnimatedProperty<O> {}

impl<O> fmt::Debug for AnimatedProperty<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedProperty")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

/// Re-interprets a field value as the property's declared type, leaving it
/// untouched when no lossless conversion exists.
#[doc(hidden)]
#[must_use]
pub fn coerce_value(value: AnimationValue, data_type: DataType) -> AnimationValue {
    if value.data_type() == data_type {
        return value;
    }
    value.clone().convert(data_type).unwrap_or(value)
}

/// Implements [`Animated`] for a struct from a list of its fields.
///
/// Each field type must implement [`KeyValue`](crate::animation::KeyValue).
/// Optional attributes, in this order:
///
/// - `#[display = "..."]`: human readable name.
/// - `#[data_type = ...]`: track type, when it differs from the field's own.
#[macro_export]
macro_rules! animated_properties {
    (
        $target:ty {
            $(
                $(#[display = $display:literal])?
                $(#[data_type = $data_type:expr])?
                $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        impl $crate::animation::Animated for $target {
            fn animated_properties() -> &'static [$crate::animation::AnimatedProperty<Self>] {
                static PROPERTIES: &[$crate::animation::AnimatedProperty<$target>] = &[
                    $(
                        $crate::animation::AnimatedProperty {
                            name: stringify!($field),
                            display_name: $crate::__animated_display!($($display)?),
                            data_type: $crate::__animated_data_type!($field_ty $(, $data_type)?),
                            get: |target: &$target| -> $crate::animation::AnimationValue {
                                let value = <$field_ty as $crate::animation::KeyValue>::into_value(
                                    ::std::clone::Clone::clone(&target.$field),
                                );
                                $crate::animation::binding::coerce_value(
                                    value,
                                    $crate::__animated_data_type!($field_ty $(, $data_type)?),
                                )
                            },
                            set: |target: &mut $target, value: $crate::animation::AnimationValue| -> bool {
                                match <$field_ty as $crate::animation::KeyValue>::from_value(value) {
                                    ::std::option::Option::Some(value) => {
                                        target.$field = value;
                                        true
                                    }
                                    ::std::option::Option::None => false,
                                }
                            },
                        },
                    )*
                ];
                PROPERTIES
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __animated_display {
    () => {
        ::std::option::Option::None
    };
    ($display:literal) => {
        ::std::option::Option::Some($display)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __animated_data_type {
    ($field_ty:ty) => {
        <$field_ty as $crate::animation::KeyValue>::DATA_TYPE
    };
    ($field_ty:ty, $data_type:expr) => {
        $data_type
    };
}
