#[allow(dead_code)]
mod common;

use std::time::{Duration, Instant};

use approx::assert_relative_eq;

use loupe_core::buffer::Rgba;
use loupe_core::config::{BounceConfig, EngineConfig};
use loupe_core::engine::ViewportEngine;
use loupe_core::error::LoupeError;
use loupe_core::geometry::{Size, Vec2};
use loupe_core::pan::PanDirection;
use loupe_core::resample::{Kernel, Quality};

const BG: Rgba = Rgba([30, 30, 30, 255]);
const RED: Rgba = Rgba([200, 0, 0, 255]);
const FRAME: Duration = Duration::from_millis(16);

fn inline_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.render.background_quality_pass = false;
    config
}

/// 800x600 viewport showing a 1600x1200 solid red image at scale 1.
fn loaded_engine(config: EngineConfig) -> ViewportEngine {
    let mut engine = ViewportEngine::new(config, Size::new(800, 600)).unwrap();
    engine.load(common::solid_rgb(1600, 1200, [200, 0, 0])).unwrap();
    engine
}

fn origin(engine: &ViewportEngine) -> Vec2 {
    engine.transform().unwrap().origin()
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = inline_config();
    config.pan.friction = 1.5;
    let err = ViewportEngine::new(config, Size::new(100, 100)).err().unwrap();
    assert!(matches!(err, LoupeError::Configuration(_)));
}

#[test]
fn test_new_rejects_empty_viewport() {
    assert!(ViewportEngine::new(inline_config(), Size::new(0, 100)).is_err());
}

#[test]
fn test_no_content_renders_background_and_ignores_input() {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(40, 30)).unwrap();
    engine.tick(Instant::now());
    let info = engine.frame_info().unwrap();
    assert_eq!(info.kernel, None);
    assert_eq!(engine.current_frame().size(), Size::new(40, 30));
    assert_eq!(engine.current_frame().pixel(20, 15), Some(BG));

    let generation = engine.debug_snapshot().generation;
    engine.on_wheel(3.0, Vec2::new(10.0, 10.0)).unwrap();
    engine.on_key_pan(PanDirection::Left);
    engine.on_zoom_in();
    engine.on_reset_zoom();
    assert!(engine.transform().is_none());
    assert_eq!(engine.debug_snapshot().generation, generation);

    let snap = engine.debug_snapshot();
    assert_eq!(snap.content, None);
    assert_eq!(snap.cursor_content_coord, None);
    assert_eq!(snap.pixel_color_under_cursor, None);
}

#[test]
fn test_load_centers_and_renders_interactive_frame() {
    let mut engine = loaded_engine(inline_config());
    let state = engine.transform().unwrap();
    assert_relative_eq!(state.scale(), 1.0);
    assert_relative_eq!(state.origin().x, 400.0);
    assert_relative_eq!(state.origin().y, 300.0);

    engine.tick(Instant::now());
    let info = engine.frame_info().unwrap();
    assert_eq!(info.quality, Quality::Interactive);
    assert_eq!(info.kernel, Some(Kernel::Nearest));
    assert_eq!(engine.current_frame().size(), Size::new(800, 600));
    assert_eq!(engine.current_frame().pixel(0, 0), Some(RED));
}

#[test]
fn test_clear_then_reload_starts_fresh() {
    let mut engine = loaded_engine(inline_config());
    let before = *engine.transform().unwrap();
    engine.clear();
    assert!(!engine.has_content());
    engine.tick(Instant::now());
    assert_eq!(engine.current_frame().pixel(400, 300), Some(BG));
    engine.load(common::solid_rgb(1600, 1200, [200, 0, 0])).unwrap();
    assert_eq!(*engine.transform().unwrap(), before);
}

#[test]
fn test_wheel_zoom_keeps_point_under_cursor() {
    let mut engine = loaded_engine(inline_config());
    let cursor = Vec2::new(200.0, 100.0);
    let before = engine.transform().unwrap().screen_to_content(cursor);
    engine.on_wheel(1.0, cursor).unwrap();
    let state = engine.transform().unwrap();
    assert_relative_eq!(state.scale(), 1.1, epsilon = 1e-12);
    let after = state.screen_to_content(cursor);
    assert_relative_eq!(after.x, before.x, epsilon = 1e-9);
    assert_relative_eq!(after.y, before.y, epsilon = 1e-9);
}

#[test]
fn test_wheel_rejects_non_finite_input() {
    let mut engine = loaded_engine(inline_config());
    let err = engine.on_wheel(f64::NAN, Vec2::new(1.0, 1.0)).err().unwrap();
    assert!(matches!(err, LoupeError::InvalidInput(_)));
    assert!(engine.on_wheel(1.0, Vec2::new(f64::INFINITY, 0.0)).is_err());
    assert!(engine.on_drag_move(Vec2::new(f64::NAN, 0.0)).is_err());
}

#[test]
fn test_zoom_at_bound_does_not_schedule_frame() {
    let mut engine = loaded_engine(inline_config());
    let cursor = Vec2::new(400.0, 300.0);
    engine.on_wheel(-200.0, cursor).unwrap();
    assert_relative_eq!(engine.transform().unwrap().scale(), 0.05);
    let generation = engine.debug_snapshot().generation;
    engine.on_wheel(-1.0, cursor).unwrap();
    engine.on_zoom_out();
    assert_eq!(engine.debug_snapshot().generation, generation);
}

#[test]
fn test_changes_between_ticks_coalesce() {
    let mut engine = loaded_engine(inline_config());
    let t0 = Instant::now();
    engine.tick(t0);
    for _ in 0..3 {
        engine.on_wheel(1.0, Vec2::new(10.0, 10.0)).unwrap();
    }
    engine.on_key_pan(PanDirection::Down);
    engine.tick(t0 + FRAME);
    let info = engine.frame_info().unwrap();
    assert_eq!(info.generation, engine.debug_snapshot().generation);
    assert_eq!(info.quality, Quality::Interactive);
}

#[test]
fn test_settled_frame_after_quiet_window() {
    let mut engine = loaded_engine(inline_config());
    let t0 = Instant::now();
    engine.tick(t0);
    assert_eq!(engine.frame_info().unwrap().quality, Quality::Interactive);
    assert!(engine.needs_tick());

    engine.tick(t0 + Duration::from_millis(50));
    assert_eq!(engine.frame_info().unwrap().quality, Quality::Interactive);

    engine.tick(t0 + Duration::from_millis(120));
    let info = engine.frame_info().unwrap();
    assert_eq!(info.quality, Quality::Settled);
    assert_eq!(info.kernel, Some(Kernel::Bicubic));
    assert!(!engine.needs_tick());
}

#[test]
fn test_settled_frame_downscaled_uses_lanczos() {
    let mut engine = loaded_engine(inline_config());
    engine.on_fit();
    let t0 = Instant::now();
    engine.tick(t0);
    assert_eq!(engine.frame_info().unwrap().kernel, Some(Kernel::Bilinear));
    engine.tick(t0 + Duration::from_secs(1));
    assert_eq!(engine.frame_info().unwrap().kernel, Some(Kernel::Lanczos3));
}

#[test]
fn test_settled_frame_from_worker() {
    let mut engine = loaded_engine(EngineConfig::default());
    let t0 = Instant::now();
    engine.tick(t0);
    engine.tick(t0 + Duration::from_millis(200));
    assert!(engine.wait_for_settled(Duration::from_secs(30)));
    let info = engine.frame_info().unwrap();
    assert_eq!(info.quality, Quality::Settled);
    assert_eq!(info.generation, engine.debug_snapshot().generation);
    assert_eq!(engine.current_frame().pixel(400, 300), Some(RED));
}

#[test]
fn test_worker_result_for_old_state_is_discarded() {
    let mut engine = loaded_engine(EngineConfig::default());
    let t0 = Instant::now();
    engine.tick(t0);
    engine.tick(t0 + Duration::from_millis(200));
    engine.on_key_pan(PanDirection::Right);

    assert!(!engine.wait_for_settled(Duration::from_millis(500)));
    assert_eq!(engine.frame_info().unwrap().quality, Quality::Interactive);

    engine.tick(t0 + Duration::from_millis(216));
    let info = engine.frame_info().unwrap();
    assert_eq!(info.quality, Quality::Interactive);
    assert_eq!(info.generation, engine.debug_snapshot().generation);
}

#[test]
fn test_drag_pans_and_fling_continues() {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(400, 300)).unwrap();
    engine.load(common::solid_rgb(4000, 3000, [200, 0, 0])).unwrap();
    let mut now = Instant::now();
    engine.tick(now);
    let start = origin(&engine);

    engine.on_drag_start(Vec2::new(200.0, 150.0)).unwrap();
    for i in 1..=4 {
        engine.on_drag_move(Vec2::new(200.0 - 10.0 * i as f64, 150.0)).unwrap();
        now += FRAME;
        engine.tick(now);
    }
    engine.on_drag_move(Vec2::new(150.0, 150.0)).unwrap();
    assert_relative_eq!(origin(&engine).x, start.x + 50.0, epsilon = 1e-9);
    engine.on_drag_end(Vec2::new(150.0, 150.0)).unwrap();
    assert!(engine.is_animating());

    let released = origin(&engine);
    let mut ticks = 0;
    while engine.is_animating() {
        now += FRAME;
        engine.tick(now);
        ticks += 1;
        assert!(ticks < 200, "momentum never stopped");
    }
    let end = origin(&engine);
    assert!(end.x > released.x);
    assert_relative_eq!(end.y, released.y);
}

/// Drag left at 20 px per tick for three ticks, split into `events` moves per
/// tick, release, and return how far momentum carries the origin.
fn fling_distance(events: u32) -> f64 {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(400, 300)).unwrap();
    engine.load(common::solid_rgb(4000, 3000, [200, 0, 0])).unwrap();
    let mut now = Instant::now();
    engine.tick(now);

    let step = 20.0 / events as f64;
    let mut x = 200.0;
    engine.on_drag_start(Vec2::new(x, 150.0)).unwrap();
    for _ in 0..3 {
        for _ in 0..events {
            x -= step;
            engine.on_drag_move(Vec2::new(x, 150.0)).unwrap();
        }
        now += FRAME;
        engine.tick(now);
    }
    engine.on_drag_end(Vec2::new(x, 150.0)).unwrap();
    let released = origin(&engine);
    let mut ticks = 0;
    while engine.is_animating() {
        now += FRAME;
        engine.tick(now);
        ticks += 1;
        assert!(ticks < 200, "momentum never stopped");
    }
    origin(&engine).x - released.x
}

#[test]
fn test_fling_distance_ignores_move_event_rate() {
    let coarse = fling_distance(1);
    let fine = fling_distance(4);
    assert!(coarse > 20.0, "{coarse}");
    assert_relative_eq!(coarse, fine, epsilon = 1e-6);
}

#[test]
fn test_new_input_cancels_momentum() {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(400, 300)).unwrap();
    engine.load(common::solid_rgb(4000, 3000, [200, 0, 0])).unwrap();
    let now = Instant::now();
    engine.tick(now);
    engine.on_drag_start(Vec2::new(200.0, 150.0)).unwrap();
    engine.on_drag_move(Vec2::new(170.0, 150.0)).unwrap();
    engine.on_drag_end(Vec2::new(170.0, 150.0)).unwrap();
    assert!(engine.is_animating());

    engine.on_key_pan(PanDirection::Up);
    assert!(!engine.is_animating());
}

#[test]
fn test_release_after_pause_has_no_momentum() {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(400, 300)).unwrap();
    engine.load(common::solid_rgb(4000, 3000, [200, 0, 0])).unwrap();
    let mut now = Instant::now();
    engine.on_drag_start(Vec2::new(200.0, 150.0)).unwrap();
    engine.on_drag_move(Vec2::new(170.0, 150.0)).unwrap();
    for _ in 0..10 {
        now += FRAME;
        engine.tick(now);
    }
    engine.on_drag_end(Vec2::new(170.0, 150.0)).unwrap();
    assert!(!engine.is_animating());
}

#[test]
fn test_bounce_back_shows_gap_then_settles() {
    let mut config = inline_config();
    config.pan.bounce_back = Some(BounceConfig::default());
    let mut engine = loaded_engine(config);
    let mut now = Instant::now();
    engine.tick(now);

    engine.on_drag_start(Vec2::new(100.0, 300.0)).unwrap();
    for i in 1..=3 {
        engine.on_drag_move(Vec2::new(100.0 + 50.0 * i as f64, 300.0)).unwrap();
        now += FRAME;
        engine.tick(now);
    }
    engine.on_drag_end(Vec2::new(250.0, 300.0)).unwrap();

    let mut saw_gap = false;
    let mut ticks = 0;
    while engine.is_animating() {
        now += FRAME;
        engine.tick(now);
        let o = origin(&engine);
        assert!(o.x >= 0.0, "transform left its bounds: {o:?}");
        if engine.current_frame().pixel(0, 300) == Some(BG) {
            saw_gap = true;
        }
        ticks += 1;
        assert!(ticks < 200);
    }
    assert!(saw_gap);
    assert_relative_eq!(origin(&engine).x, 0.0);

    now += FRAME;
    engine.tick(now);
    assert_eq!(engine.current_frame().pixel(0, 300), Some(RED));
}

#[test]
fn test_key_pan_moves_by_step() {
    let mut engine = loaded_engine(inline_config());
    engine.on_key_pan(PanDirection::Right);
    assert_relative_eq!(origin(&engine).x, 420.0);
    engine.on_key_pan(PanDirection::Up);
    assert_relative_eq!(origin(&engine).y, 280.0);
}

#[test]
fn test_keyboard_zoom_focus() {
    let mut engine = loaded_engine(inline_config());
    let center = Vec2::new(400.0, 300.0);
    let at_center = engine.transform().unwrap().screen_to_content(center);
    engine.on_zoom_in();
    let moved = engine.transform().unwrap().screen_to_content(center);
    assert_relative_eq!(moved.x, at_center.x, epsilon = 1e-9);
    assert_relative_eq!(moved.y, at_center.y, epsilon = 1e-9);

    let cursor = Vec2::new(100.0, 50.0);
    engine.on_cursor_move(cursor).unwrap();
    let under = engine.transform().unwrap().screen_to_content(cursor);
    engine.on_zoom_in();
    let still = engine.transform().unwrap().screen_to_content(cursor);
    assert_relative_eq!(still.x, under.x, epsilon = 1e-9);
    assert_relative_eq!(still.y, under.y, epsilon = 1e-9);
}

#[test]
fn test_reset_and_fit() {
    let mut engine = loaded_engine(inline_config());
    engine.on_wheel(5.0, Vec2::new(10.0, 10.0)).unwrap();
    engine.on_reset_zoom();
    assert_relative_eq!(engine.transform().unwrap().scale(), 1.0);
    assert_relative_eq!(origin(&engine).x, 400.0, epsilon = 1e-9);

    engine.on_fit();
    let state = engine.transform().unwrap();
    assert_relative_eq!(state.scale(), 0.5);
    assert_relative_eq!(state.origin().x, 0.0, epsilon = 1e-9);
}

#[test]
fn test_resize_reclamps_and_rerenders() {
    let mut engine = loaded_engine(inline_config());
    assert!(engine.on_resize(Size::new(0, 600)).is_err());

    let generation = engine.debug_snapshot().generation;
    engine.on_resize(Size::new(2000, 1500)).unwrap();
    assert!(engine.debug_snapshot().generation > generation);
    let state = engine.transform().unwrap();
    assert_eq!(state.fits(), (true, true));
    assert_relative_eq!(state.origin().x, -200.0);
    assert_relative_eq!(state.origin().y, -150.0);

    engine.tick(Instant::now());
    assert_eq!(engine.current_frame().size(), Size::new(2000, 1500));
    assert_eq!(engine.current_frame().pixel(100, 100), Some(BG));
    assert_eq!(engine.current_frame().pixel(1000, 750), Some(RED));
}

#[test]
fn test_debug_snapshot_reports_pixel_under_cursor() {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(300, 200)).unwrap();
    engine.load(common::coordinate_rgb(300, 200)).unwrap();
    engine.on_cursor_move(Vec2::new(10.0, 20.0)).unwrap();

    let snap = engine.debug_snapshot();
    assert_eq!(snap.cursor, Some(Vec2::new(10.0, 20.0)));
    let c = snap.cursor_content_coord.unwrap();
    assert_relative_eq!(c.x, 10.0);
    assert_relative_eq!(c.y, 20.0);
    assert_relative_eq!(snap.scale, 1.0);
    assert_eq!(snap.content, Some(Size::new(300, 200)));
    let color = snap.pixel_color_under_cursor.unwrap();
    assert_eq!(color, Rgba([10, 20, 30, 255]));
    assert_eq!(color.hex(), "#0A141E");

    engine.on_cursor_leave();
    let snap = engine.debug_snapshot();
    assert_eq!(snap.cursor, None);
    assert_eq!(snap.pixel_color_under_cursor, None);
}

#[test]
fn test_debug_snapshot_off_image_has_no_color() {
    let mut engine = ViewportEngine::new(inline_config(), Size::new(300, 200)).unwrap();
    engine.load(common::solid_rgb(100, 100, [1, 2, 3])).unwrap();
    engine.on_cursor_move(Vec2::new(5.0, 5.0)).unwrap();
    let snap = engine.debug_snapshot();
    assert!(snap.cursor_content_coord.is_some());
    assert_eq!(snap.pixel_color_under_cursor, None);
}
