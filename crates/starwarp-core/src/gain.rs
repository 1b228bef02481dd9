//! Ramped master volume.
//!
//! Every change is scheduled as a short ramp anchored at the gain's
//! instantaneous value, so the level never steps. Without an attached graph
//! the controller still tracks the user's preference and applies it on
//! [`GainController::sync`].

use crate::audio::{AudioGraph, ParamEvent};
use crate::constants::{DEFAULT_VOLUME, SILENCE_EPSILON, VOLUME_RAMP_SEC};
use crate::error::AudioError;

#[derive(Clone, Debug, PartialEq)]
pub struct GainState {
    /// Destination of the most recent ramp.
    pub current_level: f32,
    /// Level the user asked for, before ducking or muting.
    pub user_level: f32,
    /// Saved user level while muted.
    pub previous_level: Option<f32>,
    /// Active duck fraction, if an effect is holding the volume down.
    pub duck: Option<f32>,
}

/// Ramp curve for a move from `from` to `level`, ending at `end`.
///
/// Exponential curves cannot reach zero (and engines reject a zero target),
/// so anything at or below `SILENCE_EPSILON` goes linearly to exactly 0.
/// Leaving silence is linear too: an exponential curve starting at 0 stays
/// at 0 until it jumps at `end`.
pub fn ramp_event(level: f32, from: f32, end: f64) -> ParamEvent {
    let level = clamp_level(level);
    if level <= SILENCE_EPSILON {
        ParamEvent::LinearRamp { value: 0.0, end }
    } else if from <= SILENCE_EPSILON {
        ParamEvent::LinearRamp { value: level, end }
    } else {
        ParamEvent::ExponentialRamp { value: level, end }
    }
}

/// Where a ramp toward `level` settles.
#[inline]
pub fn settled_level(level: f32) -> f32 {
    let level = clamp_level(level);
    if level <= SILENCE_EPSILON {
        0.0
    } else {
        level
    }
}

#[inline]
fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Clone, Debug)]
pub struct GainController {
    state: GainState,
}

impl Default for GainController {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl GainController {
    pub fn new(user_level: f32) -> Self {
        let level = clamp_level(user_level);
        Self {
            state: GainState {
                current_level: settled_level(level),
                user_level: level,
                previous_level: None,
                duck: None,
            },
        }
    }

    pub fn state(&self) -> &GainState {
        &self.state
    }

    pub fn user_level(&self) -> f32 {
        self.state.user_level
    }

    pub fn current_level(&self) -> f32 {
        self.state.current_level
    }

    pub fn is_muted(&self) -> bool {
        self.state.previous_level.is_some()
    }

    pub fn is_ducked(&self) -> bool {
        self.state.duck.is_some()
    }

    /// Set the user level. Unmutes.
    pub fn set_volume<G: AudioGraph>(&mut self, graph: Option<&mut G>, level: f32) {
        if !level.is_finite() {
            log::warn!("[gain] ignoring non-finite volume {level}");
            return;
        }
        self.state.user_level = clamp_level(level);
        self.state.previous_level = None;
        self.apply(graph);
    }

    /// Hold the volume at `user_level * fraction` until [`Self::restore`].
    pub fn duck<G: AudioGraph>(&mut self, graph: Option<&mut G>, fraction: f32) {
        self.state.duck = Some(clamp_level(fraction));
        self.apply(graph);
    }

    pub fn restore<G: AudioGraph>(&mut self, graph: Option<&mut G>) {
        self.state.duck = None;
        self.apply(graph);
    }

    /// Mute, or unmute back to the saved level. Returns the new muted state.
    pub fn toggle_mute<G: AudioGraph>(&mut self, graph: Option<&mut G>) -> bool {
        match self.state.previous_level.take() {
            Some(saved) => self.state.user_level = saved,
            None => self.state.previous_level = Some(self.state.user_level),
        }
        self.apply(graph);
        self.is_muted()
    }

    /// Bring a freshly attached graph to the tracked level without a ramp.
    pub fn sync<G: AudioGraph>(&mut self, graph: &mut G) {
        let level = settled_level(self.target_level());
        self.state.current_level = level;
        let now = graph.current_time();
        let result = graph
            .schedule_master(ParamEvent::Cancel { from: now })
            .and_then(|_| graph.schedule_master(ParamEvent::SetValue { value: level, at: now }));
        if let Err(e) = result {
            log::warn!("[gain] sync failed: {e}");
        }
    }

    fn target_level(&self) -> f32 {
        if self.is_muted() {
            0.0
        } else {
            self.state.user_level * self.state.duck.unwrap_or(1.0)
        }
    }

    fn apply<G: AudioGraph>(&mut self, graph: Option<&mut G>) {
        let target = self.target_level();
        self.state.current_level = settled_level(target);
        let Some(graph) = graph else {
            return;
        };
        if let Err(e) = ramp_master(graph, target) {
            log::warn!("[gain] ramp to {target:.3} failed: {e}");
        }
    }
}

fn ramp_master<G: AudioGraph>(graph: &mut G, level: f32) -> Result<(), AudioError> {
    let now = graph.current_time();
    let from = graph.master_value();
    graph.schedule_master(ParamEvent::Cancel { from: now })?;
    graph.schedule_master(ParamEvent::SetValue { value: from, at: now })?;
    graph.schedule_master(ramp_event(level, from, now + VOLUME_RAMP_SEC))
}
