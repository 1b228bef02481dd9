//! Star scene generation.
//!
//! A [`Scene`] is bound to the viewport it was generated for: lateral spread
//! is viewport-relative, so a resize replaces the whole scene rather than
//! adjusting it in place.

use crate::constants::*;
use glam::Vec3;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// World-space position; `z` is depth in front of the camera.
    pub pos: Vec3,
    /// Fixed at creation, in `[BRIGHTNESS_MIN, BRIGHTNESS_MAX]`.
    pub brightness: f32,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub stars: Vec<Star>,
    pub max_depth: f32,
    half_extent: [f32; 2],
}

impl Scene {
    /// Generate `STAR_COUNT` stars for a `width` x `height` viewport.
    pub fn generate<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        Self::with_count(width, height, STAR_COUNT, MAX_DEPTH, rng)
    }

    pub fn with_count<R: Rng + ?Sized>(
        width: f32,
        height: f32,
        count: usize,
        max_depth: f32,
        rng: &mut R,
    ) -> Self {
        let half_extent = [
            width.max(1.0) * LATERAL_SPREAD,
            height.max(1.0) * LATERAL_SPREAD,
        ];
        let max_depth = max_depth.max(MIN_DEPTH + 1.0);
        let stars = (0..count)
            .map(|_| {
                let [x, y] = random_lateral(half_extent, rng);
                Star {
                    pos: Vec3::new(x, y, rng.gen_range(MIN_DEPTH..=max_depth)),
                    brightness: rng.gen_range(BRIGHTNESS_MIN..=BRIGHTNESS_MAX),
                }
            })
            .collect();
        Self {
            stars,
            max_depth,
            half_extent,
        }
    }

    /// Half-size of the lateral spawn rectangle (`[2w, 2h]`).
    pub fn half_extent(&self) -> [f32; 2] {
        self.half_extent
    }

    /// Move `star` back into range after it left `[MIN_DEPTH, max_depth]`.
    ///
    /// Stars that passed the camera reappear at the far plane; stars that
    /// drifted beyond the far plane (reverse travel) reappear just in front of
    /// the camera. Lateral position is redrawn either way.
    pub fn respawn<R: Rng + ?Sized>(star: &mut Star, half_extent: [f32; 2], max_depth: f32, rng: &mut R) {
        let z = if star.pos.z <= MIN_DEPTH {
            max_depth
        } else {
            let jitter = RESPAWN_NEAR_JITTER.min(max_depth - MIN_DEPTH);
            MIN_DEPTH + rng.gen_range(0.0..=jitter)
        };
        let [x, y] = random_lateral(half_extent, rng);
        star.pos = Vec3::new(x, y, z);
    }
}

#[inline]
fn random_lateral<R: Rng + ?Sized>(half_extent: [f32; 2], rng: &mut R) -> [f32; 2] {
    [
        rng.gen_range(-half_extent[0]..=half_extent[0]),
        rng.gen_range(-half_extent[1]..=half_extent[1]),
    ]
}
