//! Tuning and shared plumbing for the skip and scrub controllers.

use crate::audio::AudioGraph;
use crate::constants::*;
use crate::gain::GainController;
use crate::session::AudioSession;
use crate::timers::Timers;
use crate::transport::{Direction, Transport};
use crate::warp::WarpTarget;

/// Runtime tuning for skip and scrub. Defaults come from `constants.rs`.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectsTuning {
    pub tick_sec: f64,
    pub skip_duration_sec: f64,
    pub skip_timeout_slack_sec: f64,
    pub skip_warp_forward: f32,
    pub skip_warp_backward: f32,
    pub skip_duck_fraction: f32,
    /// Play the one-shot whoosh when a skip starts.
    pub skip_whoosh: bool,
    pub skip_whoosh_peak: f32,
    pub scrub_jump_sec: f64,
    pub scrub_rate: f64,
    pub scrub_warp_forward: f32,
    pub scrub_warp_backward: f32,
    pub scrub_duck_fraction: f32,
}

impl Default for EffectsTuning {
    fn default() -> Self {
        Self {
            tick_sec: EFFECT_TICK_SEC,
            skip_duration_sec: SKIP_DURATION_SEC,
            skip_timeout_slack_sec: SKIP_TIMEOUT_SLACK_SEC,
            skip_warp_forward: SKIP_WARP_FORWARD,
            skip_warp_backward: SKIP_WARP_BACKWARD,
            skip_duck_fraction: SKIP_DUCK_FRACTION,
            skip_whoosh: true,
            skip_whoosh_peak: SKIP_WHOOSH_PEAK,
            scrub_jump_sec: SCRUB_JUMP_SEC,
            scrub_rate: SCRUB_RATE,
            scrub_warp_forward: SCRUB_WARP_FORWARD,
            scrub_warp_backward: SCRUB_WARP_BACKWARD,
            scrub_duck_fraction: SCRUB_DUCK_FRACTION,
        }
    }
}

impl EffectsTuning {
    pub fn skip_warp(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Forward => self.skip_warp_forward,
            Direction::Backward => self.skip_warp_backward,
        }
    }

    pub fn scrub_warp(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Forward => self.scrub_warp_forward,
            Direction::Backward => self.scrub_warp_backward,
        }
    }
}

/// Borrowed view of everything a controller may touch during one call.
pub struct Effects<'a, G: AudioGraph, T: Transport> {
    pub gain: &'a mut GainController,
    pub audio: Option<&'a mut AudioSession<G>>,
    pub warp: &'a WarpTarget,
    pub timers: &'a mut Timers,
    pub transport: &'a mut T,
    pub tuning: &'a EffectsTuning,
}

impl<'a, G: AudioGraph, T: Transport> Effects<'a, G, T> {
    pub fn duck(&mut self, fraction: f32) {
        let graph = self.audio.as_deref_mut().map(AudioSession::graph_mut);
        self.gain.duck(graph, fraction);
    }

    pub fn restore(&mut self) {
        let graph = self.audio.as_deref_mut().map(AudioSession::graph_mut);
        self.gain.restore(graph);
    }

    /// Warp back to neutral and undo any ducking.
    pub fn neutralize(&mut self) {
        self.warp.reset();
        self.restore();
    }

    pub fn session(&mut self) -> Option<&mut AudioSession<G>> {
        self.audio.as_deref_mut()
    }

    /// Session for starting effect sounds; `None` while muted, since voices
    /// do not pass through the master gain.
    pub fn sfx(&mut self) -> Option<&mut AudioSession<G>> {
        if self.gain.is_muted() {
            return None;
        }
        self.audio.as_deref_mut()
    }

    /// Track duration if it is known and usable.
    pub fn known_duration(&self) -> Option<f64> {
        self.transport
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
    }
}
