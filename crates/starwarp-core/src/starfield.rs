//! Perspective starfield renderer.
//!
//! Platform-independent: drawing goes through [`StarCanvas`], time arrives as
//! `dt` from whatever frame driver the host uses.

use crate::constants::*;
use crate::scene::Scene;
use crate::warp::{WarpState, WarpTarget};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Drawing surface for one frame, in CSS pixels after `set_transform`.
pub trait StarCanvas {
    fn set_transform(&mut self, transform: &Transform);
    fn clear(&mut self, width: f32, height: f32);
    fn dot(&mut self, at: Vec2, radius: f32, alpha: f32);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, alpha: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical (CSS pixel) size.
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            device_pixel_ratio: dpr,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Backing-store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.width * self.device_pixel_ratio) as u32;
        let h = (self.height * self.device_pixel_ratio) as u32;
        (w.max(1), h.max(1))
    }

    #[inline]
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= -margin && p.x <= self.width + margin && p.y >= -margin && p.y <= self.height + margin
    }
}

/// 2D affine transform in canvas `setTransform(a, b, c, d, e, f)` order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    /// Absolute CSS-pixel to device-pixel scale. Never composed with a
    /// previous transform.
    pub fn for_device_pixel_ratio(dpr: f32) -> Self {
        Self {
            a: dpr,
            b: 0.0,
            c: 0.0,
            d: dpr,
            e: 0.0,
            f: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StarfieldParams {
    pub star_count: usize,
    pub max_depth: f32,
    pub base_speed: f32,
    pub ease_rate: f32,
    pub focal_length: f32,
    pub trail_factor: f32,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            star_count: STAR_COUNT,
            max_depth: MAX_DEPTH,
            base_speed: BASE_SPEED,
            ease_rate: WARP_EASE_RATE,
            focal_length: FOCAL_LENGTH,
            trail_factor: TRAIL_FACTOR,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub trails: usize,
    pub points: usize,
    pub culled: usize,
}

/// Project a world-space star onto the screen. Returns the screen position
/// and the perspective scale `focal / z`.
#[inline]
pub fn project(pos: Vec3, center: Vec2, focal_length: f32) -> (Vec2, f32) {
    let scale = focal_length / pos.z.max(MIN_DEPTH);
    (center + Vec2::new(pos.x, pos.y) * scale, scale)
}

pub struct Starfield<R: Rng = StdRng> {
    params: StarfieldParams,
    viewport: Viewport,
    transform: Transform,
    scene: Scene,
    warp: WarpState,
    target: WarpTarget,
    speed: f32,
    running: bool,
    rng: R,
}

impl Starfield<StdRng> {
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self::with_rng(viewport, StarfieldParams::default(), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Starfield<R> {
    pub fn with_rng(viewport: Viewport, params: StarfieldParams, mut rng: R) -> Self {
        let scene = Scene::with_count(
            viewport.width,
            viewport.height,
            params.star_count,
            params.max_depth,
            &mut rng,
        );
        Self {
            transform: Transform::for_device_pixel_ratio(viewport.device_pixel_ratio),
            speed: params.base_speed,
            params,
            viewport,
            scene,
            warp: WarpState::default(),
            target: WarpTarget::new(),
            running: true,
            rng,
        }
    }

    /// Handle through which controllers steer this starfield.
    pub fn warp_target(&self) -> WarpTarget {
        self.target.clone()
    }

    /// The renderer's sole external control: 1 neutral, negative reverse.
    pub fn set_warp(&self, multiplier: f32) {
        self.target.set(multiplier);
    }

    pub fn warp(&self) -> WarpState {
        self.warp
    }

    /// Signed travel speed computed by the last update.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Rebuild the scene and transform for a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.transform = Transform::for_device_pixel_ratio(viewport.device_pixel_ratio);
        self.scene = Scene::with_count(
            viewport.width,
            viewport.height,
            self.params.star_count,
            self.params.max_depth,
            &mut self.rng,
        );
        log::debug!(
            "[starfield] resized to {}x{} @{}x, {} stars",
            viewport.width,
            viewport.height,
            viewport.device_pixel_ratio,
            self.scene.stars.len()
        );
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ease warp and move every star by one frame. Returns the signed speed.
    pub fn update(&mut self, dt_sec: f32) -> f32 {
        let dt = if dt_sec.is_finite() {
            dt_sec.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.warp.target = self.target.get();
        let warp = self.warp.ease_with_rate(dt, self.params.ease_rate);
        self.speed = self.params.base_speed * warp;

        let step = self.speed * dt;
        let half_extent = self.scene.half_extent();
        let max_depth = self.scene.max_depth;
        for star in &mut self.scene.stars {
            star.pos.z -= step;
            if star.pos.z <= MIN_DEPTH || star.pos.z > max_depth {
                Scene::respawn(star, half_extent, max_depth, &mut self.rng);
            }
        }
        self.speed
    }

    /// Draw the current scene.
    pub fn draw<C: StarCanvas + ?Sized>(&self, canvas: &mut C) -> FrameStats {
        let mut stats = FrameStats::default();
        canvas.set_transform(&self.transform);
        canvas.clear(self.viewport.width, self.viewport.height);

        let center = self.viewport.center();
        let focal = self.params.focal_length;
        let trail_len = self.speed.abs() * self.params.trail_factor;

        for star in &self.scene.stars {
            let (head, scale) = project(star.pos, center, focal);
            if !self.viewport.contains(head, CULL_MARGIN_PX) {
                stats.culled += 1;
                continue;
            }
            let radius = (scale * HEAD_RADIUS_SCALE).clamp(HEAD_RADIUS_MIN, HEAD_RADIUS_MAX);
            let alpha = (star.brightness * (scale * HEAD_ALPHA_SCALE).min(1.0)).max(HEAD_ALPHA_MIN);

            let (tail, _) = project(star.pos + Vec3::Z * trail_len, center, focal);
            if tail.distance(head) > TRAIL_MIN_PX {
                canvas.line(tail, head, radius, alpha * TRAIL_ALPHA);
                stats.trails += 1;
            } else {
                stats.points += 1;
            }
            canvas.dot(head, radius, alpha);
        }
        stats
    }

    /// One animation frame: update then draw. Does nothing while stopped.
    pub fn frame<C: StarCanvas + ?Sized>(&mut self, dt_sec: f32, canvas: &mut C) -> Option<FrameStats> {
        if !self.running {
            return None;
        }
        self.update(dt_sec);
        Some(self.draw(canvas))
    }
}
