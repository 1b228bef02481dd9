// Host-side tests for scene generation, warp easing and the starfield renderer.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use starwarp_core::*;

#[derive(Default)]
struct RecordingCanvas {
    transforms: Vec<Transform>,
    clears: usize,
    dots: Vec<(Vec2, f32, f32)>,
    lines: Vec<(Vec2, Vec2, f32, f32)>,
}

impl StarCanvas for RecordingCanvas {
    fn set_transform(&mut self, transform: &Transform) {
        self.transforms.push(*transform);
    }
    fn clear(&mut self, _width: f32, _height: f32) {
        self.clears += 1;
    }
    fn dot(&mut self, at: Vec2, radius: f32, alpha: f32) {
        self.dots.push((at, radius, alpha));
    }
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, alpha: f32) {
        self.lines.push((from, to, width, alpha));
    }
}

fn viewport() -> Viewport {
    Viewport::new(800.0, 600.0, 2.0)
}

fn assert_depth_invariant(field: &Starfield) {
    let max_depth = field.scene().max_depth;
    for (i, star) in field.scene().stars.iter().enumerate() {
        assert!(
            star.pos.z >= MIN_DEPTH && star.pos.z <= max_depth,
            "star {i} left the depth range: z = {}",
            star.pos.z
        );
    }
}

#[test]
fn scene_generation_respects_spread_and_ranges() {
    let mut rng = StdRng::seed_from_u64(1);
    let scene = Scene::generate(800.0, 600.0, &mut rng);
    assert_eq!(scene.stars.len(), STAR_COUNT);
    assert_eq!(scene.max_depth, MAX_DEPTH);
    for star in &scene.stars {
        assert!(star.pos.x.abs() <= 1600.0, "x outside 2w: {}", star.pos.x);
        assert!(star.pos.y.abs() <= 1200.0, "y outside 2h: {}", star.pos.y);
        assert!(star.pos.z >= MIN_DEPTH && star.pos.z <= MAX_DEPTH);
        assert!(star.brightness >= BRIGHTNESS_MIN && star.brightness <= BRIGHTNESS_MAX);
    }
    // A uniform draw over +-2w should reach well past the viewport itself
    assert!(scene.stars.iter().any(|s| s.pos.x.abs() > 800.0));
}

#[test]
fn warp_converges_monotonically_without_overshoot() {
    let mut warp = WarpState::default();
    let dt = 1.0 / 60.0;
    for target in [12.0_f32, -10.0, 1.0, 4.0] {
        warp.target = target;
        let mut prev = warp.current;
        for _ in 0..240 {
            let before_gap = target - prev;
            let now = warp.ease(dt);
            let step = now - prev;
            // Every step moves toward the target by at most min(1, rate*dt) of the gap
            assert!(step * before_gap >= 0.0, "moved away from target {target}");
            assert!(
                step.abs() <= before_gap.abs() * ease_factor(dt, WARP_EASE_RATE) + 1e-5,
                "step {step} exceeds the easing bound"
            );
            assert!((target - now).abs() <= before_gap.abs() + 1e-6, "overshot {target}");
            prev = now;
        }
        assert!((warp.current - target).abs() < 1e-3, "did not converge to {target}");
    }
}

#[test]
fn ease_factor_saturates_at_one() {
    assert_eq!(ease_factor(1.0, WARP_EASE_RATE), 1.0);
    assert_eq!(ease_factor(-1.0, WARP_EASE_RATE), 0.0);
    let mut warp = WarpState {
        target: 7.0,
        current: 1.0,
    };
    warp.ease(10.0);
    assert_eq!(warp.current, 7.0, "a full step lands exactly on the target");
}

#[test]
fn stars_stay_in_depth_range_for_any_dt_sequence() {
    let mut field = Starfield::new(viewport(), 7);
    let dts = [0.016_f32, 0.1, 5.0, -0.3, f32::NAN, 0.0, 0.033, f32::INFINITY];
    for (round, warp) in [1.0_f32, 12.0, -10.0, 0.0, 4.0, -4.0].into_iter().enumerate() {
        field.set_warp(warp);
        for i in 0..120 {
            field.update(dts[(i + round) % dts.len()]);
            assert_depth_invariant(&field);
        }
    }
}

#[test]
fn reverse_travel_respawns_near_the_camera() {
    let mut field = Starfield::new(viewport(), 11);
    field.set_warp(-10.0);
    for _ in 0..400 {
        field.update(0.05);
    }
    assert!(field.speed() < 0.0, "negative warp flies backward");
    let near = field
        .scene()
        .stars
        .iter()
        .filter(|s| s.pos.z <= MIN_DEPTH + RESPAWN_NEAR_JITTER + 1e-3)
        .count();
    assert!(near > 0, "some stars should have wrapped in near the camera");
    assert_depth_invariant(&field);
}

#[test]
fn star_count_is_constant_across_updates() {
    let mut field = Starfield::new(viewport(), 3);
    field.set_warp(12.0);
    for _ in 0..500 {
        field.update(0.1);
    }
    assert_eq!(field.scene().stars.len(), STAR_COUNT);
}

#[test]
fn projection_scales_by_focal_over_depth() {
    let center = Vec2::new(400.0, 300.0);
    let (p, scale) = project(Vec3::new(0.0, 0.0, 150.0), center, FOCAL_LENGTH);
    assert_eq!(p, center, "on-axis stars project to the center");
    assert!((scale - FOCAL_LENGTH / 150.0).abs() < 1e-6);

    let (p, _) = project(Vec3::new(100.0, -50.0, FOCAL_LENGTH), center, FOCAL_LENGTH);
    assert!((p.x - 500.0).abs() < 1e-4 && (p.y - 250.0).abs() < 1e-4);
}

#[test]
fn resize_sets_absolute_transform_and_regenerates_scene() {
    let mut field = Starfield::new(viewport(), 5);
    let before = field.scene().stars.clone();

    field.resize(Viewport::new(1024.0, 768.0, 2.0));
    field.resize(Viewport::new(1024.0, 768.0, 3.0));
    assert_eq!(field.transform(), Transform::for_device_pixel_ratio(3.0));
    assert_ne!(field.scene().stars, before, "resize regenerates the scene");
    assert_eq!(field.scene().half_extent(), [2048.0, 1536.0]);
    assert_eq!(field.viewport().backing_size(), (3072, 2304));

    let mut canvas = RecordingCanvas::default();
    field.draw(&mut canvas);
    field.draw(&mut canvas);
    assert_eq!(canvas.transforms.len(), 2);
    for t in &canvas.transforms {
        assert_eq!(t.a, 3.0, "transform must not compound across frames");
        assert_eq!(t.d, 3.0);
    }
    assert_eq!(canvas.clears, 2);
}

#[test]
fn every_star_is_drawn_or_culled() {
    let mut field = Starfield::new(viewport(), 9);
    let mut canvas = RecordingCanvas::default();
    let stats = field.frame(1.0 / 60.0, &mut canvas).expect("running");
    assert_eq!(stats.trails + stats.points + stats.culled, STAR_COUNT);
    assert_eq!(canvas.dots.len(), stats.trails + stats.points);
    assert_eq!(canvas.lines.len(), stats.trails);
    for (at, radius, alpha) in &canvas.dots {
        assert!(viewport().contains(*at, CULL_MARGIN_PX));
        assert!(*radius >= HEAD_RADIUS_MIN && *radius <= HEAD_RADIUS_MAX);
        assert!(*alpha >= HEAD_ALPHA_MIN && *alpha <= 1.0);
    }
}

#[test]
fn high_warp_draws_trails_at_reduced_opacity() {
    let mut field = Starfield::new(viewport(), 13);
    field.set_warp(SKIP_WARP_FORWARD);
    for _ in 0..60 {
        field.update(0.05);
    }
    let mut canvas = RecordingCanvas::default();
    let stats = field.draw(&mut canvas);
    assert!(stats.trails > 0, "warp speed should streak stars");
    for (from, to, width, alpha) in &canvas.lines {
        assert!(from.distance(*to) > TRAIL_MIN_PX);
        assert!(*width >= HEAD_RADIUS_MIN);
        assert!(*alpha <= TRAIL_ALPHA + 1e-6);
    }
}

#[test]
fn stalled_warp_draws_points_only() {
    let mut field = Starfield::new(viewport(), 17);
    field.set_warp(0.0);
    for _ in 0..200 {
        field.update(0.05);
    }
    assert!(field.speed().abs() < 1e-3);
    let mut canvas = RecordingCanvas::default();
    let stats = field.draw(&mut canvas);
    assert_eq!(stats.trails, 0);
    assert!(canvas.lines.is_empty());
}

#[test]
fn stopped_starfield_neither_moves_nor_draws() {
    let mut field = Starfield::new(viewport(), 21);
    field.stop();
    let before = field.scene().stars.clone();
    let mut canvas = RecordingCanvas::default();
    assert!(field.frame(0.05, &mut canvas).is_none());
    assert_eq!(field.scene().stars, before);
    assert_eq!(canvas.clears, 0);

    field.start();
    assert!(field.frame(0.05, &mut canvas).is_some());
    assert_ne!(field.scene().stars, before);
}

#[test]
fn warp_target_handle_is_shared_with_the_renderer() {
    let mut field = Starfield::new(viewport(), 23);
    let handle = field.warp_target();
    handle.set(-10.0);
    field.update(0.05);
    assert_eq!(field.warp().target, -10.0);
    assert!(field.warp().current < 1.0, "current eases toward the new target");
    assert!(field.warp().current > -10.0, "but does not jump");

    handle.set(f32::NAN);
    assert_eq!(handle.get(), -10.0, "non-finite multipliers are ignored");
    handle.reset();
    assert!(handle.is_neutral());
}
