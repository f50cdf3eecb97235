//! Binary Animation Codec
//!
//! Stream-based persistence for tracks and whole animations.
//!
//! # Layout
//!
//! All scalars and vector payloads are written as their plain-old-data bytes
//! (native byte order, via `bytemuck`). Strings are a `u32` byte length
//! followed by UTF-8 data.
//!
//! A track is written as:
//!
//! | Field              | Type                      |
//! |--------------------|---------------------------|
//! | interpolation mode | `i32`                     |
//! | key count          | `i32`                     |
//! | keys...            | time `f32`, payload, override `i32` (-1 = none) |
//!
//! An animation is the magic `GORANM30`, then name, length, fps, looped,
//! loop count, speed, enabled, track count, and for each track its data type
//! tag (`u8`), name, enabled flag and track payload.
//!
//! Textures are persisted by name only. The caller supplies a
//! [`TextureResolver`] to map names back to live handles on load.

use std::io::{Read, Write};

use bytemuck::Pod;

use crate::animation::clip::Animation;
use crate::animation::key::{KeyFrame, KeyValue};
use crate::animation::track_data::TrackData;
use crate::animation::tracks::{Track, TrackInterpolationMode};
use crate::animation::values::{DataType, RectF, TextureHandle, TextureRef, TextureRegion};
use crate::errors::{GorgonError, Result};

/// File magic for serialized animations.
pub const ANIMATION_MAGIC: &[u8; 8] = b"GORANM30";

const MAX_STRING_LEN: usize = 1 << 20;

/// Maps texture names found in animation data to live texture handles.
pub trait TextureResolver {
    fn resolve_texture(&self, name: &str) -> Option<TextureHandle>;
}

/// Resolver that knows no textures; every reference stays unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextureResolver;

impl TextureResolver for NoTextureResolver {
    fn resolve_texture(&self, _name: &str) -> Option<TextureHandle> {
        None
    }
}

impl<F> TextureResolver for F
where
    F: Fn(&str) -> Option<TextureHandle>,
{
    fn resolve_texture(&self, name: &str) -> Option<TextureHandle> {
        self(name)
    }
}

// ============================================================================
// Primitive helpers
// ============================================================================

pub(crate) fn write_pod<W: Write, P: Pod>(writer: &mut W, value: &P) -> Result<()> {
    writer.write_all(bytemuck::bytes_of(value))?;
    Ok(())
}

pub(crate) fn read_pod<R: Read, P: Pod>(reader: &mut R) -> Result<P> {
    let mut value = P::zeroed();
    reader.read_exact(bytemuck::bytes_of_mut(&mut value))?;
    Ok(value)
}

fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<()> {
    write_pod(writer, &u8::from(value))
}

fn read_bool<R: Read>(reader: &mut R) -> Result<bool> {
    Ok(read_pod::<_, u8>(reader)? != 0)
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| GorgonError::InvalidFormat(format!("string too long ({} bytes)", value.len())))?;
    write_pod(writer, &len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_pod::<_, u32>(reader)? as usize;
    if len > MAX_STRING_LEN {
        return Err(GorgonError::InvalidFormat(format!("string length {len} exceeds limit")));
    }
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let count: i32 = read_pod(reader)?;
    usize::try_from(count).map_err(|_| GorgonError::InvalidFormat(format!("negative {what} count: {count}")))
}

fn write_count<W: Write>(writer: &mut W, count: usize) -> Result<()> {
    let count = i32::try_from(count)
        .map_err(|_| GorgonError::InvalidFormat(format!("count {count} does not fit the format")))?;
    write_pod(writer, &count)
}

fn read_mode<R: Read>(reader: &mut R) -> Result<TrackInterpolationMode> {
    let bits: i32 = read_pod(reader)?;
    u32::try_from(bits)
        .ok()
        .and_then(TrackInterpolationMode::from_bits)
        .ok_or_else(|| GorgonError::InvalidFormat(format!("unknown interpolation mode: {bits}")))
}

// ============================================================================
// Texture regions
// ============================================================================

pub(crate) fn write_texture_region<W: Write>(writer: &mut W, region: &TextureRegion) -> Result<()> {
    match &region.texture {
        Some(texture) => {
            write_pod(writer, &1u8)?;
            write_string(writer, &texture.name)?;
        }
        None => write_pod(writer, &0u8)?,
    }
    write_pod(writer, &region.coords)?;
    write_pod(writer, &region.array_index)
}

pub(crate) fn read_texture_region<R: Read>(reader: &mut R, resolver: &dyn TextureResolver) -> Result<TextureRegion> {
    let has_texture: u8 = read_pod(reader)?;
    let texture = if has_texture == 0 {
        None
    } else {
        let name = read_string(reader)?;
        let handle = resolver.resolve_texture(&name);
        if handle.is_none() {
            log::debug!("Texture '{name}' referenced by animation data is not loaded; keeping the name only");
        }
        Some(TextureRef {
            name: name.into(),
            handle,
        })
    };
    let coords: RectF = read_pod(reader)?;
    let array_index: i32 = read_pod(reader)?;

    Ok(TextureRegion {
        texture,
        coords,
        array_index,
    })
}

// ============================================================================
// Tracks
// ============================================================================

impl<T: KeyValue> Track<T> {
    /// Writes the interpolation mode, key count and every key in order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_pod(writer, &(self.interpolation_mode().bits() as i32))?;
        write_count(writer, self.len())?;

        for key in self.keys() {
            write_pod(writer, &key.time())?;
            key.value().encode(writer)?;
            let key_mode = key.interpolation().map_or(-1, |m| m.bits() as i32);
            write_pod(writer, &key_mode)?;
        }
        Ok(())
    }

    /// Reads a track written by [`Track::write_to`].
    pub fn read_from<R: Read>(reader: &mut R, name: &str, resolver: &dyn TextureResolver) -> Result<Self> {
        let mut track = Track::new(name);
        track.set_interpolation_mode(read_mode(reader)?)?;

        let count = read_count(reader, "key")?;
        let mut keys = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let time: f32 = read_pod(reader)?;
            let value = T::decode(reader, resolver)?;
            let mut key = KeyFrame::new(time, value);

            let key_mode: i32 = read_pod(reader)?;
            if key_mode >= 0 {
                let mode = TrackInterpolationMode::from_bits(key_mode as u32)
                    .ok_or_else(|| GorgonError::InvalidFormat(format!("unknown key interpolation mode: {key_mode}")))?;
                key.set_interpolation(Some(mode));
            }
            keys.push(key);
        }

        track.add_keys(keys);
        Ok(track)
    }
}

// ============================================================================
// Animations
// ============================================================================

impl Animation {
    /// Serializes the animation's settings and all of its built-in tracks.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(ANIMATION_MAGIC)?;
        write_string(writer, self.name())?;
        write_pod(writer, &self.length())?;
        write_pod(writer, &self.fps())?;
        write_bool(writer, self.is_looped())?;
        write_pod(writer, &(self.loop_count() as i32))?;
        write_pod(writer, &self.speed())?;
        write_bool(writer, self.is_enabled())?;

        write_count(writer, self.track_count())?;
        for track in self.tracks() {
            let tag = track.data_type().tag().ok_or_else(|| {
                GorgonError::InvalidFormat(format!("track '{}' has no serializable data type", track.name()))
            })?;
            write_pod(writer, &tag)?;
            write_string(writer, track.name())?;
            write_bool(writer, track.is_enabled())?;
            track.write_to(writer)?;
        }
        Ok(())
    }

    /// Reads an animation written by [`Animation::write_to`].
    ///
    /// The result is detached from any controller and starts at time 0.
    pub fn read_from<R: Read>(reader: &mut R, resolver: &dyn TextureResolver) -> Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if &magic != ANIMATION_MAGIC {
            return Err(GorgonError::InvalidFormat("the animation data is not in a known format".into()));
        }

        let name = read_string(reader)?;
        let length: f32 = read_pod(reader)?;
        let fps: f32 = read_pod(reader)?;
        let looped = read_bool(reader)?;
        let loop_count: i32 = read_pod(reader)?;
        let speed: f32 = read_pod(reader)?;
        let enabled = read_bool(reader)?;

        let mut animation = Animation::new(name, length)?;
        animation.set_fps(fps);
        animation.set_looped(looped);
        animation.set_loop_count(u32::try_from(loop_count).unwrap_or(0));
        animation.set_speed(speed);

        let track_count = read_count(reader, "track")?;
        for _ in 0..track_count {
            let tag: u8 = read_pod(reader)?;
            let data_type = DataType::from_tag(tag)
                .ok_or_else(|| GorgonError::InvalidFormat(format!("unknown track data type tag: {tag}")))?;
            let track_name = read_string(reader)?;
            let track_enabled = read_bool(reader)?;

            let mut track = TrackData::read_from(reader, &track_name, data_type, resolver)?;
            track.set_enabled(track_enabled);
            animation.add_track(track)?;
        }

        animation.set_enabled(enabled);
        Ok(animation)
    }
}
