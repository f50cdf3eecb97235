use std::ops::{Deref, DerefMut};

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::animation::key::{KeyFrame, KeyValue};
use crate::animation::values::DataType;
use crate::errors::{GorgonError, Result};

bitflags! {
    /// How values are produced between two keys.
    ///
    /// An empty set ([`TrackInterpolationMode::NONE`]) steps: the previous
    /// key's value holds until the next key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TrackInterpolationMode: u32 {
        const LINEAR = 1;
        const SPLINE = 2;
    }
}

impl TrackInterpolationMode {
    pub const NONE: Self = Self::empty();
}

/// Tolerance used for every key time comparison.
pub const KEY_TIME_EPSILON: f32 = 1e-4;

#[inline]
#[must_use]
pub fn time_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= KEY_TIME_EPSILON
}

// -0.0 and 0.0 must land on the same index slot.
#[inline]
fn time_bits(time: f32) -> u32 {
    (time + 0.0).to_bits()
}

/// Length and looping policy of the animation a track is sampled for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackBounds {
    pub length: f32,
    pub looped: bool,
}

impl Default for PlaybackBounds {
    fn default() -> Self {
        Self::once(f32::MAX)
    }
}

impl PlaybackBounds {
    #[must_use]
    pub fn once(length: f32) -> Self {
        Self {
            length,
            looped: false,
        }
    }

    #[must_use]
    pub fn looped(length: f32) -> Self {
        Self {
            length,
            looped: true,
        }
    }

    /// Maps `time` into the bounds.
    ///
    /// Times past `length` wrap back into `[0, length)` whether or not the
    /// bounds loop, so tracks with keys beyond the length cycle seamlessly.
    /// Looped bounds also wrap negative times back from the end.
    #[must_use]
    pub fn normalize(&self, time: f32) -> f32 {
        let wraps = self.looped || time > self.length;
        if !wraps || self.length <= 0.0 || !time.is_finite() {
            return time;
        }
        let wrapped = time.rem_euclid(self.length);
        // rem_euclid can round up to `length` for tiny negative inputs.
        if wrapped >= self.length { 0.0 } else { wrapped }
    }
}

/// Result of a nearest-key lookup: the pair of keys bracketing a time.
#[derive(Debug, Clone, Copy)]
pub struct NearestKeys<'a, T: KeyValue> {
    /// Time as passed by the caller.
    pub requested_time: f32,
    /// Time after wrapping into the playback bounds.
    pub time: f32,
    pub previous: &'a KeyFrame<T>,
    pub previous_index: usize,
    pub next: &'a KeyFrame<T>,
    pub next_index: usize,
    /// Normalised position between `previous` and `next`, never negative.
    pub delta: f32,
}

#[derive(Debug, Clone)]
struct Spline<T> {
    tangents: Vec<T>,
}

/// A time-sorted set of keys animating one property.
#[derive(Debug, Clone)]
pub struct Track<T: KeyValue> {
    name: String,
    keys: Vec<KeyFrame<T>>,
    time_index: FxHashMap<u32, usize>,
    interpolation_mode: TrackInterpolationMode,
    enabled: bool,
    spline: Option<Spline<T>>,
    version: u64,
}

impl<T: KeyValue> Track<T> {
    /// Creates an empty track. Blendable key types default to linear interpolation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
            time_index: FxHashMap::default(),
            interpolation_mode: T::SUPPORTED_INTERPOLATION & TrackInterpolationMode::LINEAR,
            enabled: true,
            spline: None,
            version: 0,
        }
    }

    #[must_use]
    pub fn with_keys(name: impl Into<String>, keys: impl IntoIterator<Item = KeyFrame<T>>) -> Self {
        let mut track = Self::new(name);
        track.add_keys(keys);
        track
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    #[must_use]
    pub fn supported_interpolation(&self) -> TrackInterpolationMode {
        T::SUPPORTED_INTERPOLATION
    }

    #[must_use]
    pub fn interpolation_mode(&self) -> TrackInterpolationMode {
        self.interpolation_mode
    }

    pub fn set_interpolation_mode(&mut self, mode: TrackInterpolationMode) -> Result<()> {
        if !T::SUPPORTED_INTERPOLATION.contains(mode) {
            return Err(GorgonError::UnsupportedInterpolation {
                track: self.name.clone(),
                requested: mode,
                supported: T::SUPPORTED_INTERPOLATION,
            });
        }

        if self.interpolation_mode != mode {
            self.interpolation_mode = mode;
            self.rebuild_spline();
            self.version = self.version.wrapping_add(1);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Change counter, bumped by every mutation of keys or interpolation mode.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn has_spline(&self) -> bool {
        self.spline.is_some()
    }

    // ------------------------------------------------------------------------
    // Key access
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> &[KeyFrame<T>] {
        &self.keys
    }

    #[must_use]
    pub fn key(&self, index: usize) -> Option<&KeyFrame<T>> {
        self.keys.get(index)
    }

    #[must_use]
    pub fn first_key(&self) -> Option<&KeyFrame<T>> {
        self.keys.first()
    }

    #[must_use]
    pub fn last_key(&self) -> Option<&KeyFrame<T>> {
        self.keys.last()
    }

    /// Time of the last key, or 0 for an empty track.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, KeyFrame::time)
    }

    /// Index of the key placed at `time` (within [`KEY_TIME_EPSILON`]).
    #[must_use]
    pub fn find_key_index(&self, time: f32) -> Option<usize> {
        if let Some(&index) = self.time_index.get(&time_bits(time)) {
            return Some(index);
        }

        let pos = self.keys.partition_point(|k| k.time() < time);
        [pos.checked_sub(1), Some(pos)]
            .into_iter()
            .flatten()
            .find(|&i| self.keys.get(i).is_some_and(|k| time_eq(k.time(), time)))
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Places `key` on the track, replacing any key already at its time.
    /// Returns the key's index after sorting.
    pub fn add_key(&mut self, key: KeyFrame<T>) -> usize {
        let time = key.time();
        match self.find_key_index(time) {
            Some(existing) => self.keys[existing] = key,
            None => self.keys.push(key),
        }
        self.invalidate();
        self.index_of_time(time)
    }

    /// Places several keys at once; on equal times the later key wins.
    pub fn add_keys(&mut self, keys: impl IntoIterator<Item = KeyFrame<T>>) {
        self.keys.extend(keys);
        self.invalidate();
    }

    /// Inserts `key` at `index`. The key's time decides its final position.
    pub fn insert_key(&mut self, index: usize, key: KeyFrame<T>) -> Result<usize> {
        if index > self.keys.len() {
            return Err(self.out_of_bounds(index));
        }

        let time = key.time();
        if let Some(existing) = self.find_key_index(time) {
            self.keys.remove(existing);
        }
        let index = index.min(self.keys.len());
        self.keys.insert(index, key);
        self.invalidate();
        Ok(self.index_of_time(time))
    }

    /// Replaces the key at `index`. Returns the new key's index after sorting.
    pub fn set_key(&mut self, index: usize, key: KeyFrame<T>) -> Result<usize> {
        if index >= self.keys.len() {
            return Err(self.out_of_bounds(index));
        }

        let time = key.time();
        self.keys[index] = key;
        if let Some(other) = self.duplicate_of(index) {
            self.keys.remove(other);
        }
        self.invalidate();
        Ok(self.index_of_time(time))
    }

    /// Moves the key at `index` to `time`, replacing any key already there.
    pub fn set_key_time(&mut self, index: usize, time: f32) -> Result<usize> {
        let key = self
            .keys
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))?
            .copy_to(time);
        self.set_key(index, key)
    }

    /// Clones the key at `index` to `time` and places the copy on this track.
    pub fn copy_key_to(&mut self, index: usize, time: f32) -> Result<usize> {
        let copy = self
            .keys
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))?
            .copy_to(time);
        Ok(self.add_key(copy))
    }

    pub fn remove_key(&mut self, index: usize) -> Result<KeyFrame<T>> {
        if index >= self.keys.len() {
            return Err(self.out_of_bounds(index));
        }

        let key = self.keys.remove(index);
        self.invalidate();
        Ok(key)
    }

    pub fn remove_key_at_time(&mut self, time: f32) -> Option<KeyFrame<T>> {
        let index = self.find_key_index(time)?;
        let key = self.keys.remove(index);
        self.invalidate();
        Some(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.invalidate();
    }

    /// Direct mutable access to the key list.
    ///
    /// The track is re-sorted, de-duplicated and re-indexed when the guard drops.
    pub fn edit_keys(&mut self) -> KeyEditGuard<'_, T> {
        KeyEditGuard { track: self }
    }

    fn out_of_bounds(&self, index: usize) -> GorgonError {
        GorgonError::KeyIndexOutOfBounds {
            track: self.name.clone(),
            index,
            count: self.keys.len(),
        }
    }

    fn duplicate_of(&self, index: usize) -> Option<usize> {
        let time = self.keys[index].time();
        self.keys
            .iter()
            .enumerate()
            .find(|&(i, k)| i != index && time_eq(k.time(), time))
            .map(|(i, _)| i)
    }

    fn index_of_time(&self, time: f32) -> usize {
        self.find_key_index(time).unwrap_or(0)
    }

    /// Restores every invariant after the key list changed.
    fn invalidate(&mut self) {
        self.keys.sort_by(|a, b| a.time().total_cmp(&b.time()));
        self.collapse_equal_times();

        self.time_index.clear();
        for (index, key) in self.keys.iter().enumerate() {
            self.time_index.insert(time_bits(key.time()), index);
        }

        self.rebuild_spline();
        self.version = self.version.wrapping_add(1);
    }

    /// Merges each run of keys lying within [`KEY_TIME_EPSILON`] of the run's
    /// first key. The last entry of a run wins, placed at the run's time.
    fn collapse_equal_times(&mut self) {
        let mut kept: Vec<KeyFrame<T>> = Vec::with_capacity(self.keys.len());
        let mut run_time = None;

        for mut key in self.keys.drain(..) {
            if let Some(anchor) = run_time
                && time_eq(key.time(), anchor)
                && let Some(last) = kept.last_mut()
            {
                key.set_time(anchor);
                *last = key;
            } else {
                run_time = Some(key.time());
                kept.push(key);
            }
        }

        self.keys = kept;
    }

    fn rebuild_spline(&mut self) {
        let wants_spline = self.interpolation_mode.contains(TrackInterpolationMode::SPLINE)
            || self
                .keys
                .iter()
                .any(|k| k.interpolation().is_some_and(|m| m.contains(TrackInterpolationMode::SPLINE)));

        if !wants_spline
            || !T::SUPPORTED_INTERPOLATION.contains(TrackInterpolationMode::SPLINE)
            || self.keys.is_empty()
        {
            self.spline = None;
            return;
        }

        let last = self.keys.len() - 1;
        let tangents = (0..=last)
            .map(|i| {
                let prev = self.keys[i.saturating_sub(1)].value();
                let next = self.keys[(i + 1).min(last)].value();
                T::spline_tangent(prev, next)
            })
            .collect();

        self.spline = Some(Spline { tangents });
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Locates the keys bracketing `requested_time`.
    ///
    /// Fails with [`GorgonError::EmptyTrack`] when the track has no keys.
    pub fn find_nearest(&self, requested_time: f32, bounds: PlaybackBounds) -> Result<NearestKeys<'_, T>> {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return Err(GorgonError::EmptyTrack(self.name.clone()));
        };

        let time = bounds.normalize(requested_time);
        let count = self.keys.len();

        let (previous_index, next_index, raw_next_time) = if first.time() <= time {
            // keys[0] <= time, so the first key after `time` has index >= 1.
            let next = self.keys.partition_point(|k| k.time() <= time);
            if next < count {
                (next - 1, next, self.keys[next].time())
            } else if bounds.looped {
                // Interpolate through the loop point back to the first key.
                (count - 1, 0, bounds.length)
            } else {
                (count - 1, count - 1, last.time())
            }
        } else {
            (0, 0, first.time())
        };

        let previous = &self.keys[previous_index];
        let delta = if time_eq(previous.time(), raw_next_time) {
            0.0
        } else {
            ((time - previous.time()) / (raw_next_time - previous.time())).max(0.0)
        };

        Ok(NearestKeys {
            requested_time,
            time,
            previous,
            previous_index,
            next: &self.keys[next_index],
            next_index,
            delta,
        })
    }

    /// Key at `time`: an existing key on an exact hit or past either end,
    /// otherwise a tween key interpolated between the nearest pair.
    ///
    /// Returns `None` only for an empty track.
    #[must_use]
    pub fn key_at_time(&self, time: f32, bounds: PlaybackBounds) -> Option<KeyFrame<T>> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;

        let time = if bounds.looped { bounds.normalize(time) } else { time };

        if let Some(&index) = self.time_index.get(&time_bits(time)) {
            return Some(self.keys[index].clone());
        }
        if time > last.time() {
            return Some(last.clone());
        }
        if time <= 0.0 {
            return Some(first.clone());
        }

        let nearest = self.find_nearest(time, bounds).ok()?;
        if nearest.delta == 0.0 {
            return Some(nearest.previous.clone());
        }

        Some(self.tween(&nearest))
    }

    /// Value at `time`, see [`Track::key_at_time`].
    #[must_use]
    pub fn value_at(&self, time: f32, bounds: PlaybackBounds) -> Option<T> {
        self.key_at_time(time, bounds).map(KeyFrame::into_inner)
    }

    /// Synthesises the key between `nearest.previous` and `nearest.next`.
    #[must_use]
    pub fn tween(&self, nearest: &NearestKeys<'_, T>) -> KeyFrame<T> {
        let previous = nearest.previous;
        let next = nearest.next;
        let mode = previous.interpolation().unwrap_or(self.interpolation_mode) & T::SUPPORTED_INTERPOLATION;

        let value = match &self.spline {
            Some(spline) if mode.contains(TrackInterpolationMode::SPLINE) && self.keys.len() >= 2 => T::tween_spline(
                previous.value(),
                &spline.tangents[nearest.previous_index],
                &spline.tangents[nearest.next_index],
                next.value(),
                nearest.delta,
            ),
            _ if mode.intersects(TrackInterpolationMode::LINEAR | TrackInterpolationMode::SPLINE) => {
                T::tween_linear(previous.value(), next.value(), nearest.delta)
            }
            _ => previous.value().clone(),
        };

        KeyFrame::new(nearest.time, value)
    }
}

/// Mutable view of a track's keys; restores ordering and indices on drop.
pub struct KeyEditGuard<'a, T: KeyValue> {
    track: &'a mut Track<T>,
}

impl<T: KeyValue> Deref for KeyEditGuard<'_, T> {
    type Target = Vec<KeyFrame<T>>;

    fn deref(&self) -> &Self::Target {
        &self.track.keys
    }
}

impl<T: KeyValue> DerefMut for KeyEditGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.track.keys
    }
}

impl<T: KeyValue> Drop for KeyEditGuard<'_, T> {
    fn drop(&mut self) {
        self.track.invalidate();
    }
}
