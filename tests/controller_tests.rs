//! Animation Controller Tests
//!
//! Tests for:
//! - Property binding through `animated_properties!`
//! - Play / update / stop state transitions
//! - Final-frame write and clamp at a non-looping end
//! - Collection management and re-parenting between controllers

use glam::Vec2;

use gorgon::animation::{
    Animation, AnimationController, AnimationEvent, AnimationSettings, AnimationState, Color, DataType, KeyFrame,
    MAX_PENDING_EVENTS, Track,
};
use gorgon::errors::GorgonError;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Sprite {
    position: Vec2,
    angle: f32,
    tint: Color,
}

gorgon::animated_properties! {
    Sprite {
        #[display = "Position"]
        position: Vec2,
        angle: f32,
        tint: Color,
    }
}

#[derive(Debug, Default)]
struct Label {
    angle: f32,
    scale: Vec2,
}

gorgon::animated_properties! {
    Label {
        angle: f32,
        scale: Vec2,
    }
}

/// Walk (200 ms, not looped) slides `position` from 0 to 200 on x; Run loops.
fn walk_and_run() -> anyhow::Result<AnimationController<Sprite>> {
    let mut controller = AnimationController::<Sprite>::new()?;

    let walk = controller.create_animation("Walk", 200.0)?;
    let position = walk.track_mut_typed::<Vec2>("position").expect("position track");
    position.add_key(KeyFrame::new(0.0, Vec2::ZERO));
    position.add_key(KeyFrame::new(200.0, Vec2::new(200.0, 0.0)));

    let run = controller.create_animation("Run", 100.0)?;
    run.set_looped(true);
    let angle = run.track_mut_typed::<f32>("angle").expect("angle track");
    angle.add_key(KeyFrame::new(0.0, 0.0));
    angle.add_key(KeyFrame::new(100.0, 1.0));

    Ok(controller)
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn create_animation_builds_track_per_property() -> anyhow::Result<()> {
    let mut controller = AnimationController::<Sprite>::new()?;
    let animation = controller.create_animation("Idle", 100.0)?;

    let names: Vec<_> = animation.tracks().map(|t| t.name().to_string()).collect();
    assert_eq!(names, ["position", "angle", "tint"]);
    assert_eq!(animation.track("tint").unwrap().data_type(), DataType::Color);
    assert_eq!(controller.properties().get("position").unwrap().display_name(), "Position");
    assert_eq!(controller.properties().get("angle").unwrap().display_name(), "angle");
    Ok(())
}

#[test]
fn mismatched_track_type_is_rejected() -> anyhow::Result<()> {
    let mut controller = AnimationController::<Sprite>::new()?;
    let mut animation = Animation::new("Broken", 100.0)?;
    animation.add_track(Track::<f32>::new("position"))?;

    let result = controller.add(animation);
    assert!(matches!(
        result,
        Err(GorgonError::TypeMismatch {
            expected: DataType::Vector2,
            found: DataType::Single,
            ..
        })
    ));
    assert!(controller.is_empty());
    Ok(())
}

#[test]
fn custom_tracks_are_skipped_on_apply() -> anyhow::Result<()> {
    let mut controller = AnimationController::<Sprite>::new()?;
    let mut animation = Animation::new("Extra", 100.0)?;
    let mut custom = Track::<f32>::new("not_a_property");
    custom.add_key(KeyFrame::new(0.0, 5.0));
    animation.add_track(custom)?;
    controller.add(animation)?;

    let mut sprite = Sprite::default();
    controller.play(&mut sprite, "Extra")?;
    assert_eq!(sprite, Sprite::default());
    Ok(())
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn play_writes_frame_zero() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite {
        position: Vec2::new(-1.0, -1.0),
        ..Default::default()
    };

    controller.play(&mut sprite, "Walk")?;
    assert_eq!(sprite.position, Vec2::ZERO);
    assert_eq!(controller.current_name(), Some("Walk"));
    assert_eq!(controller.state(), AnimationState::Playing);
    Ok(())
}

#[test]
fn update_scales_seconds_to_milliseconds() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Walk")?;
    controller.update(&mut sprite, 0.05);
    assert!(approx(controller.current_animation().unwrap().current_time(), 50.0));
    assert!(approx(sprite.position.x, 50.0));
    Ok(())
}

#[test]
fn walk_stops_and_clamps_at_end() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Walk")?;
    for _ in 0..3 {
        controller.update(&mut sprite, 0.25);
    }

    let walk = controller.animation("Walk").unwrap();
    assert_eq!(walk.state(), AnimationState::Stopped);
    assert_eq!(walk.current_time(), 200.0);
    assert_eq!(controller.state(), AnimationState::Stopped);
    assert!(controller.current_animation().is_none());
    // The tick that reached the end still wrote the last frame.
    assert!(approx(sprite.position.x, 200.0));
    Ok(())
}

#[test]
fn looped_animation_keeps_playing() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Run")?;
    controller.update(&mut sprite, 0.125);
    assert_eq!(controller.state(), AnimationState::Playing);
    assert!(approx(controller.current_animation().unwrap().current_time(), 25.0));
    assert!(approx(sprite.angle, 0.25));
    Ok(())
}

#[test]
fn switching_resets_previous_animation() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Walk")?;
    controller.update(&mut sprite, 0.1);
    controller.play(&mut sprite, "Run")?;

    let walk = controller.animation("Walk").unwrap();
    assert_eq!(walk.current_time(), 0.0);
    assert_eq!(walk.state(), AnimationState::Stopped);
    assert_eq!(controller.current_name(), Some("Run"));
    Ok(())
}

#[test]
fn undrained_events_stay_bounded_while_switching() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    for _ in 0..1000 {
        controller.play(&mut sprite, "Walk")?;
        controller.update(&mut sprite, 0.016);
        controller.play(&mut sprite, "Run")?;
        controller.update(&mut sprite, 0.016);
    }

    let walk = controller.animation_mut("Walk").unwrap();
    let events = walk.drain_events();
    assert!(events.len() <= MAX_PENDING_EVENTS);
    assert_eq!(events.last(), Some(&AnimationEvent::Stopped));

    let run = controller.animation_mut("Run").unwrap();
    assert!(run.drain_events().len() <= MAX_PENDING_EVENTS);
    Ok(())
}

#[test]
fn playing_current_again_is_noop() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Walk")?;
    controller.update(&mut sprite, 0.1);
    controller.play(&mut sprite, "Walk")?;
    assert!(approx(controller.current_animation().unwrap().current_time(), 100.0));
    Ok(())
}

#[test]
fn stop_keeps_time() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Walk")?;
    controller.update(&mut sprite, 0.08);
    controller.stop();

    assert!(controller.current_animation().is_none());
    assert!(approx(controller.animation("Walk").unwrap().current_time(), 80.0));

    // Updating without a current animation does nothing.
    let before = sprite.clone();
    controller.update(&mut sprite, 1.0);
    assert_eq!(sprite, before);
    Ok(())
}

#[test]
fn speed_and_time_scale_apply() -> anyhow::Result<()> {
    let settings = AnimationSettings {
        time_scale: 100.0,
        ..Default::default()
    };
    let mut controller = AnimationController::<Sprite>::with_settings(settings)?;
    let walk = controller.create_animation("Walk", 200.0)?;
    walk.set_speed(2.0);

    let mut sprite = Sprite::default();
    controller.play(&mut sprite, "Walk")?;
    controller.update(&mut sprite, 0.5);
    assert!(approx(controller.current_animation().unwrap().current_time(), 100.0));
    Ok(())
}

#[test]
fn play_missing_animation_fails() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    assert!(matches!(
        controller.play(&mut sprite, "Jump"),
        Err(GorgonError::AnimationNotFound(_))
    ));
    assert!(matches!(
        controller.play_index(&mut sprite, 7),
        Err(GorgonError::AnimationIndexOutOfBounds { index: 7, count: 2 })
    ));

    controller.play_index(&mut sprite, 1)?;
    assert_eq!(controller.current_name(), Some("Run"));
    Ok(())
}

#[test]
fn reset_writes_first_frame() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();

    controller.play(&mut sprite, "Walk")?;
    controller.update(&mut sprite, 0.15);
    controller.reset(&mut sprite);

    assert_eq!(sprite.position, Vec2::ZERO);
    assert_eq!(controller.current_animation().unwrap().current_time(), 0.0);
    Ok(())
}

// ============================================================================
// Collection
// ============================================================================

#[test]
fn duplicate_names_are_rejected() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    assert!(matches!(
        controller.add(Animation::new("Walk", 10.0)?),
        Err(GorgonError::DuplicateAnimation(_))
    ));
    assert!(matches!(
        controller.create_animation("Run", 10.0),
        Err(GorgonError::DuplicateAnimation(_))
    ));
    assert_eq!(controller.len(), 2);
    Ok(())
}

#[test]
fn remove_current_stops_and_detaches() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();
    controller.play(&mut sprite, "Walk")?;

    let walk = controller.remove("Walk")?;
    assert_eq!(walk.owner(), None);
    assert_eq!(controller.state(), AnimationState::Stopped);
    assert!(!controller.contains("Walk"));
    assert!(matches!(controller.remove("Walk"), Err(GorgonError::AnimationNotFound(_))));
    Ok(())
}

#[test]
fn set_replaces_in_place() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();
    controller.play(&mut sprite, "Walk")?;

    let replaced = controller.set(Animation::new("Walk", 50.0)?)?;
    assert_eq!(replaced.map(|a| a.length()), Some(200.0));
    assert_eq!(controller.current_animation().map(Animation::name), None);
    assert_eq!(controller.animation("Walk").unwrap().length(), 50.0);
    assert_eq!(controller.names().collect::<Vec<_>>(), ["Walk", "Run"]);

    assert!(controller.set(Animation::new("Jump", 30.0)?)?.is_none());
    assert_eq!(controller.len(), 3);
    Ok(())
}

#[test]
fn added_animation_records_owner() -> anyhow::Result<()> {
    let controller = walk_and_run()?;
    let walk = controller.animation("Walk").unwrap();
    assert_eq!(walk.owner(), Some(controller.id()));

    // Clones are detached.
    assert_eq!(walk.clone().owner(), None);
    Ok(())
}

#[test]
fn adopt_moves_between_controllers() -> anyhow::Result<()> {
    let mut first = walk_and_run()?;
    let mut second = AnimationController::<Sprite>::new()?;

    second.adopt(&mut first, "Walk")?;
    assert!(!first.contains("Walk"));
    assert_eq!(second.animation("Walk").unwrap().owner(), Some(second.id()));

    // Re-adopting the same animation is rejected without side effects.
    assert!(matches!(
        second.adopt(&mut first, "Walk"),
        Err(GorgonError::DuplicateAnimation(_))
    ));
    assert!(matches!(first.adopt(&mut second, "Jump"), Err(GorgonError::AnimationNotFound(_))));
    assert_eq!(second.len(), 1);
    assert_eq!(first.len(), 1);
    Ok(())
}

#[test]
fn adopt_across_target_types_checks_bindings() -> anyhow::Result<()> {
    let mut sprites = walk_and_run()?;
    let mut labels = AnimationController::<Label>::new()?;

    // Run animates `angle`, which Label also exposes as f32.
    labels.adopt(&mut sprites, "Run")?;

    // Walk carries a Vec2 `position` track, unknown to Label: a custom track.
    labels.adopt(&mut sprites, "Walk")?;
    assert!(sprites.is_empty());

    let mut label = Label::default();
    labels.play(&mut label, "Run")?;
    labels.update(&mut label, 0.05);
    assert!(approx(label.angle, 0.5));
    assert_eq!(label.scale, Vec2::ZERO);
    Ok(())
}

#[test]
fn adopt_rejects_conflicting_binding() -> anyhow::Result<()> {
    let mut sprites = AnimationController::<Sprite>::new()?;
    let mut bad = Animation::new("Grow", 100.0)?;
    bad.add_track(Track::<f32>::new("scale"))?;
    sprites.add(bad)?;

    let mut labels = AnimationController::<Label>::new()?;
    assert!(matches!(
        labels.adopt(&mut sprites, "Grow"),
        Err(GorgonError::TypeMismatch { .. })
    ));
    assert!(sprites.contains("Grow"));
    assert!(labels.is_empty());
    Ok(())
}

#[test]
fn clear_drops_everything() -> anyhow::Result<()> {
    let mut controller = walk_and_run()?;
    let mut sprite = Sprite::default();
    controller.play(&mut sprite, "Run")?;

    controller.clear();
    assert!(controller.is_empty());
    assert_eq!(controller.state(), AnimationState::Stopped);
    Ok(())
}
