//! Animation Track Tests
//!
//! Tests for:
//! - Track key ordering and replacement under every mutation
//! - Nearest-key lookup (bracketing, end hold, wrap past the length)
//! - key_at_time fast paths and linear/step/spline tweens
//! - TrackData type erasure
//! - Animation playhead wrap and clamp

use glam::{Quat, Vec2, Vec3};

use gorgon::animation::{
    Animation, AnimationState, AnimationValue, Color, DataType, KeyFrame, PlaybackBounds, Track, TrackData,
    TrackInterpolationMode,
};
use gorgon::errors::GorgonError;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn ramp(times: &[f32]) -> Track<f32> {
    Track::with_keys("value", times.iter().map(|&t| KeyFrame::new(t, t / 100.0)))
}

fn is_sorted(track: &Track<f32>) -> bool {
    track.keys().windows(2).all(|w| w[0].time() < w[1].time())
}

// ============================================================================
// Track: Ordering
// ============================================================================

#[test]
fn keys_sorted_after_unordered_add() {
    let mut track = Track::<f32>::new("value");
    for t in [300.0, 0.0, 150.0, 75.0, 225.0] {
        track.add_key(KeyFrame::new(t, t));
    }

    assert!(is_sorted(&track));
    assert_eq!(track.len(), 5);
    assert_eq!(track.first_key().map(KeyFrame::time), Some(0.0));
    assert_eq!(track.duration(), 300.0);
}

#[test]
fn add_key_replaces_same_time() {
    let mut track = ramp(&[0.0, 100.0]);
    let version = track.version();

    let index = track.add_key(KeyFrame::new(100.0, 42.0));
    assert_eq!(index, 1);
    assert_eq!(track.len(), 2);
    assert_eq!(*track.key(1).unwrap().value(), 42.0);
    assert!(track.version() > version);
}

#[test]
fn add_key_within_epsilon_replaces() {
    let mut track = ramp(&[0.0, 100.0]);
    track.add_key(KeyFrame::new(100.00001, 7.0));
    assert_eq!(track.len(), 2);
    assert_eq!(*track.last_key().unwrap().value(), 7.0);
}

#[test]
fn insert_key_position_follows_time() {
    let mut track = ramp(&[0.0, 100.0, 200.0]);
    let index = track.insert_key(0, KeyFrame::new(150.0, 9.0)).unwrap();

    assert_eq!(index, 2);
    assert!(is_sorted(&track));
    assert!(matches!(
        track.insert_key(10, KeyFrame::new(1.0, 0.0)),
        Err(GorgonError::KeyIndexOutOfBounds { index: 10, count: 4, .. })
    ));
}

#[test]
fn set_key_time_reorders_and_replaces() {
    let mut track = ramp(&[0.0, 100.0, 200.0]);

    let index = track.set_key_time(0, 250.0).unwrap();
    assert_eq!(index, 2);
    assert!(is_sorted(&track));
    assert_eq!(track.keys()[2].value(), &0.0);

    // Moving onto an occupied time replaces the key there.
    track.set_key_time(0, 200.0).unwrap();
    assert_eq!(track.len(), 2);
    assert!(is_sorted(&track));
}

#[test]
fn copy_and_remove_keys() {
    let mut track = ramp(&[0.0, 100.0]);
    track.copy_key_to(1, 50.0).unwrap();
    assert_eq!(track.len(), 3);
    assert_eq!(track.keys()[1].value(), &1.0);

    let removed = track.remove_key_at_time(50.0).unwrap();
    assert_eq!(removed.time(), 50.0);
    assert!(track.remove_key_at_time(75.0).is_none());

    let removed = track.remove_key(0).unwrap();
    assert_eq!(removed.time(), 0.0);
    assert!(track.remove_key(5).is_err());
    assert_eq!(track.len(), 1);
}

#[test]
fn edit_guard_restores_order() {
    let mut track = ramp(&[0.0, 100.0, 200.0]);
    {
        let mut keys = track.edit_keys();
        keys[0].set_time(500.0);
        keys.push(KeyFrame::new(50.0, 0.5));
    }

    assert!(is_sorted(&track));
    assert_eq!(track.len(), 4);
    assert_eq!(track.find_key_index(500.0), Some(3));
    assert_eq!(track.find_key_index(50.0), Some(0));
}

#[test]
fn find_key_index_tolerates_epsilon() {
    let track = ramp(&[0.0, 100.0]);
    assert_eq!(track.find_key_index(100.00005), Some(1));
    assert_eq!(track.find_key_index(99.0), None);
}

// ============================================================================
// Track: Nearest-key lookup
// ============================================================================

#[test]
fn empty_track_lookup_fails() {
    let track = Track::<f32>::new("value");
    assert!(matches!(
        track.find_nearest(10.0, PlaybackBounds::default()),
        Err(GorgonError::EmptyTrack(_))
    ));
    assert!(track.key_at_time(10.0, PlaybackBounds::default()).is_none());
}

#[test]
fn nearest_brackets_time() {
    let track = ramp(&[0.0, 100.0, 200.0]);
    let nearest = track.find_nearest(150.0, PlaybackBounds::once(200.0)).unwrap();

    assert_eq!(nearest.previous_index, 1);
    assert_eq!(nearest.next_index, 2);
    assert!(approx(nearest.delta, 0.5));
    assert!(nearest.previous.time() <= nearest.time);
    assert!(nearest.time <= nearest.next.time());
}

#[test]
fn nearest_before_first_key() {
    let track = ramp(&[50.0, 100.0]);
    let nearest = track.find_nearest(10.0, PlaybackBounds::once(200.0)).unwrap();

    assert_eq!(nearest.previous_index, 0);
    assert_eq!(nearest.next_index, 0);
    assert_eq!(nearest.delta, 0.0);
}

#[test]
fn nearest_holds_last_key_when_not_looped() {
    let track = ramp(&[0.0, 100.0]);
    let nearest = track.find_nearest(130.0, PlaybackBounds::once(150.0)).unwrap();

    assert_eq!(nearest.previous_index, 1);
    assert_eq!(nearest.next_index, 1);
    assert_eq!(nearest.delta, 0.0);
    assert_eq!(nearest.time, 130.0);
}

#[test]
fn nearest_wraps_time_past_length_when_not_looped() {
    let track = ramp(&[0.0, 100.0]);
    let nearest = track.find_nearest(1000.0, PlaybackBounds::once(150.0)).unwrap();

    // 1000 - 6 * 150
    assert_eq!(nearest.time, 100.0);
    assert_eq!(nearest.requested_time, 1000.0);
    assert_eq!(nearest.previous_index, 1);
    assert_eq!(nearest.delta, 0.0);
}

#[test]
fn keys_beyond_length_cycle_through_the_animation() {
    let track = Track::with_keys("value", [KeyFrame::new(0.0, 0.0_f32), KeyFrame::new(200.0, 20.0)]);
    let bounds = PlaybackBounds::once(100.0);

    let key = track.key_at_time(150.0, bounds).unwrap();
    assert!(approx(key.time(), 50.0));
    assert!(approx(*key.value(), 5.0));
    assert!(approx(track.value_at(50.0, bounds).unwrap(), 5.0));

    // Past the last key the stored key is returned as is.
    assert_eq!(track.value_at(250.0, bounds), Some(20.0));
}

#[test]
fn nearest_wraps_through_loop_point() {
    // Between the last key (100) and the loop length (200) the next key is the first.
    let track = ramp(&[0.0, 100.0]);
    let nearest = track.find_nearest(150.0, PlaybackBounds::looped(200.0)).unwrap();

    assert_eq!(nearest.previous_index, 1);
    assert_eq!(nearest.next_index, 0);
    assert!(approx(nearest.delta, 0.5));
}

#[test]
fn looped_wraparound_is_equivalent() {
    let track = ramp(&[0.0, 120.0, 400.0, 900.0]);
    let bounds = PlaybackBounds::looped(1000.0);

    for x in [0.0, 60.0, 250.0, 500.0, 950.0] {
        let direct = track.value_at(x, bounds).unwrap();
        let wrapped = track.value_at(1000.0 + x, bounds).unwrap();
        assert!(approx(direct, wrapped), "x = {x}: {direct} vs {wrapped}");
    }
}

#[test]
fn clamp_past_end_returns_last_value() {
    let track = ramp(&[0.0, 100.0, 200.0]);
    let bounds = PlaybackBounds::once(200.0);

    assert_eq!(track.value_at(5000.0, bounds), Some(2.0));
    assert_eq!(track.value_at(-10.0, bounds), Some(0.0));
}

// ============================================================================
// Track: key_at_time
// ============================================================================

#[test]
fn exact_hit_returns_stored_key() {
    let mut track = ramp(&[0.0, 100.0]);
    track.add_key(KeyFrame::new(50.0, 99.0).with_interpolation(TrackInterpolationMode::NONE));

    let key = track.key_at_time(50.0, PlaybackBounds::once(100.0)).unwrap();
    assert_eq!(key, track.keys()[1]);
    assert_eq!(key.interpolation(), Some(TrackInterpolationMode::NONE));
}

#[test]
fn looped_thousand_ms_scenario() {
    let track = Track::with_keys("value", [KeyFrame::new(0.0, 0.0_f32), KeyFrame::new(1000.0, 10.0)]);
    let bounds = PlaybackBounds::looped(1000.0);

    let at_500 = track.key_at_time(500.0, bounds).unwrap();
    let at_1500 = track.key_at_time(1500.0, bounds).unwrap();
    assert!(approx(*at_500.value(), 5.0));
    assert!(approx(*at_1500.value(), 5.0));
    assert!(approx(at_1500.time(), 500.0));
}

#[test]
fn step_holds_previous_value() {
    let mut track = ramp(&[0.0, 100.0]);
    track.set_interpolation_mode(TrackInterpolationMode::NONE).unwrap();
    assert_eq!(track.value_at(99.0, PlaybackBounds::once(100.0)), Some(0.0));
}

#[test]
fn key_override_beats_track_mode() {
    let mut track = Track::<f32>::new("value");
    track.add_key(KeyFrame::new(0.0, 0.0).with_interpolation(TrackInterpolationMode::NONE));
    track.add_key(KeyFrame::new(100.0, 10.0));
    track.add_key(KeyFrame::new(200.0, 20.0));

    let bounds = PlaybackBounds::once(200.0);
    assert_eq!(track.value_at(50.0, bounds), Some(0.0));
    assert!(approx(track.value_at(150.0, bounds).unwrap(), 15.0));
}

#[test]
fn spline_passes_through_keys_and_stays_smooth() {
    let mut track = Track::with_keys(
        "value",
        [
            KeyFrame::new(0.0, 0.0_f32),
            KeyFrame::new(100.0, 10.0),
            KeyFrame::new(200.0, 0.0),
        ],
    );
    track.set_interpolation_mode(TrackInterpolationMode::SPLINE).unwrap();
    let bounds = PlaybackBounds::once(200.0);

    assert!(approx(track.value_at(100.0, bounds).unwrap(), 10.0));
    // Linear would give 5; the spline bulges above it toward the peak.
    let mid = track.value_at(50.0, bounds).unwrap();
    assert!(mid > 5.0 && mid < 10.0, "spline midpoint {mid}");
}

#[test]
fn texture_tracks_reject_blending() {
    let mut track = Track::<gorgon::animation::TextureRegion>::new("frame");
    assert_eq!(track.interpolation_mode(), TrackInterpolationMode::NONE);
    assert!(matches!(
        track.set_interpolation_mode(TrackInterpolationMode::LINEAR),
        Err(GorgonError::UnsupportedInterpolation { .. })
    ));
}

#[test]
fn quaternion_track_slerps() {
    let track = Track::with_keys(
        "rotation",
        [
            KeyFrame::new(0.0, Quat::IDENTITY),
            KeyFrame::new(100.0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
        ],
    );

    let q = track.value_at(50.0, PlaybackBounds::once(100.0)).unwrap();
    let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
    assert!(q.angle_between(expected) < 1e-3);
}

// ============================================================================
// TrackData
// ============================================================================

#[test]
fn track_data_dispatches_by_type() {
    let mut data = TrackData::for_data_type("tint", DataType::Color).unwrap();
    assert_eq!(data.data_type(), DataType::Color);
    assert!(TrackData::for_data_type("custom", DataType::Custom("Glyph")).is_none());

    data.add_value(0.0, AnimationValue::Color(Color::BLACK)).unwrap();
    data.add_value(100.0, AnimationValue::Color(Color::WHITE)).unwrap();
    assert!(matches!(
        data.add_value(50.0, AnimationValue::Single(1.0)),
        Err(GorgonError::TypeMismatch { .. })
    ));

    let Some(AnimationValue::Color(mid)) = data.value_at(50.0, PlaybackBounds::once(100.0)) else {
        panic!("expected a color");
    };
    assert!(approx(mid.r, 0.5));
    assert!(data.as_track::<Color>().is_some());
    assert!(data.as_track::<Vec3>().is_none());
}

// ============================================================================
// Animation playhead
// ============================================================================

#[test]
fn animation_values_follow_playhead() {
    let mut animation = Animation::new("Slide", 400.0).unwrap();
    animation.set_looped(true);
    animation
        .add_track(Track::with_keys(
            "offset",
            [KeyFrame::new(0.0, Vec2::ZERO), KeyFrame::new(400.0, Vec2::new(40.0, 0.0))],
        ))
        .unwrap();

    animation.advance(500.0);
    assert!(approx(animation.current_time(), 100.0));
    let Some(AnimationValue::Vector2(offset)) = animation.value_at("offset") else {
        panic!("expected a vector");
    };
    assert!(approx(offset.x, 10.0));
    assert_eq!(animation.state(), AnimationState::Playing);
}

#[test]
fn animation_clamps_when_not_looped() {
    let mut animation = Animation::new("Once", 300.0).unwrap();
    animation.set_current_time(450.0);

    assert_eq!(animation.current_time(), 300.0);
    assert_eq!(animation.state(), AnimationState::Stopped);
}

#[test]
fn typed_track_access() {
    let mut animation = Animation::new("Fade", 100.0).unwrap();
    animation.add_track(Track::<f32>::new("alpha")).unwrap();

    let alpha = animation.track_mut_typed::<f32>("alpha").unwrap();
    alpha.add_key(KeyFrame::new(0.0, 1.0));
    assert!(animation.track_mut_typed::<Vec2>("alpha").is_none());
    assert_eq!(animation.track("alpha").map(TrackData::len), Some(1));

    animation.clear_tracks();
    assert_eq!(animation.track_count(), 0);
}
