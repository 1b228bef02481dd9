//! Warp easing: the starfield's speed multiplier.
//!
//! Controllers write the target at effect boundaries through a [`WarpTarget`]
//! handle; the renderer owns a [`WarpState`] and eases `current` toward the
//! target once per frame, so `current` never jumps.

use crate::constants::{NEUTRAL_WARP, WARP_EASE_RATE};
use std::cell::Cell;
use std::rc::Rc;

/// Shared, cheaply cloned handle to the warp target.
#[derive(Clone, Debug)]
pub struct WarpTarget(Rc<Cell<f32>>);

impl Default for WarpTarget {
    fn default() -> Self {
        Self(Rc::new(Cell::new(NEUTRAL_WARP)))
    }
}

impl WarpTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1 is neutral, negative flies backward, magnitude is speed.
    pub fn set(&self, multiplier: f32) {
        if multiplier.is_finite() {
            self.0.set(multiplier);
        } else {
            log::warn!("[warp] ignoring non-finite multiplier {multiplier}");
        }
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn reset(&self) {
        self.0.set(NEUTRAL_WARP);
    }

    pub fn is_neutral(&self) -> bool {
        self.0.get() == NEUTRAL_WARP
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpState {
    pub target: f32,
    pub current: f32,
}

impl Default for WarpState {
    fn default() -> Self {
        Self {
            target: NEUTRAL_WARP,
            current: NEUTRAL_WARP,
        }
    }
}

impl WarpState {
    /// Advance `current` toward `target` by one frame of `dt_sec`.
    pub fn ease(&mut self, dt_sec: f32) -> f32 {
        self.ease_with_rate(dt_sec, WARP_EASE_RATE)
    }

    pub fn ease_with_rate(&mut self, dt_sec: f32, rate: f32) -> f32 {
        let alpha = ease_factor(dt_sec, rate);
        self.current += (self.target - self.current) * alpha;
        self.current
    }
}

/// Fraction of the remaining distance covered in one step: `min(1, rate * dt)`.
#[inline]
pub fn ease_factor(dt_sec: f32, rate: f32) -> f32 {
    (rate * dt_sec.max(0.0)).min(1.0)
}
