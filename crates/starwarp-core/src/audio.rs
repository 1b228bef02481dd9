//! Audio graph seam.
//!
//! The effects engine never touches a concrete audio API. Everything it needs
//! (one master gain, shared buffers, filtered buffer-source voices and
//! sample-accurate parameter automation) is expressed through [`AudioGraph`].
//! The web frontend maps it onto WebAudio nodes; [`crate::OfflineGraph`]
//! renders it in software.

use crate::error::AudioError;

/// Parameter automation, following WebAudio `AudioParam` semantics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamEvent {
    SetValue { value: f32, at: f64 },
    /// Linear ramp from the previous event's value, ending at `end`.
    LinearRamp { value: f32, end: f64 },
    /// Exponential ramp; `value` and the previous value must be positive.
    ExponentialRamp { value: f32, end: f64 },
    /// Drop every event scheduled at or after `from`.
    Cancel { from: f64 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { at, .. } => at,
            ParamEvent::LinearRamp { end, .. } | ParamEvent::ExponentialRamp { end, .. } => end,
            ParamEvent::Cancel { from } => from,
        }
    }

    /// Value this event settles at, if it schedules one.
    pub fn value(&self) -> Option<f32> {
        match *self {
            ParamEvent::SetValue { value, .. }
            | ParamEvent::LinearRamp { value, .. }
            | ParamEvent::ExponentialRamp { value, .. } => Some(value),
            ParamEvent::Cancel { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceParam {
    Gain,
    FilterFrequency,
}

/// Buffer source -> band-pass filter -> gain -> destination.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceSpec {
    pub looping: bool,
    pub filter_q: f32,
    pub start_at: f64,
}

pub trait AudioGraph {
    type Buffer: Clone;
    type Voice;

    /// Audio clock in seconds.
    fn current_time(&self) -> f64;
    fn sample_rate(&self) -> f32;
    /// Wake the graph if the host suspended it. Called before every play.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Instantaneous value of the master (music) gain.
    fn master_value(&self) -> f32;
    fn schedule_master(&mut self, event: ParamEvent) -> Result<(), AudioError>;

    fn create_buffer(&mut self, samples: &[f32]) -> Result<Self::Buffer, AudioError>;
    fn start_voice(&mut self, buffer: &Self::Buffer, spec: &VoiceSpec) -> Result<Self::Voice, AudioError>;
    fn schedule_voice(
        &mut self,
        voice: &Self::Voice,
        param: VoiceParam,
        event: ParamEvent,
    ) -> Result<(), AudioError>;
    fn stop_voice(&mut self, voice: &Self::Voice, at: f64) -> Result<(), AudioError>;
}

/// Piecewise automation curve for one parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct AutomationTimeline {
    default: f32,
    events: Vec<ParamEvent>,
}

impl AutomationTimeline {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    pub fn insert(&mut self, event: ParamEvent) -> Result<(), AudioError> {
        match event {
            ParamEvent::Cancel { from } => {
                self.events.retain(|e| e.time() < from);
                return Ok(());
            }
            ParamEvent::ExponentialRamp { value, .. } if value <= 0.0 || !value.is_finite() => {
                return Err(AudioError::NonPositiveExponentialTarget(value));
            }
            _ => {}
        }
        let t = event.time();
        let idx = self.events.partition_point(|e| e.time() <= t);
        self.events.insert(idx, event);
        Ok(())
    }

    /// Drop events that ended before `t`, keeping the one that defines the
    /// value at `t`.
    pub fn prune_before(&mut self, t: f64) {
        let settled = self.events.partition_point(|e| e.time() <= t);
        if settled > 1 {
            self.events.drain(..settled - 1);
        }
    }

    pub fn value_at(&self, t: f64) -> f32 {
        let mut prev_time = 0.0_f64;
        let mut prev_value = self.default;
        for event in &self.events {
            let end = event.time();
            if end <= t {
                if let Some(v) = event.value() {
                    prev_value = v;
                }
                prev_time = end;
                continue;
            }
            return match *event {
                ParamEvent::LinearRamp { value, end } => {
                    let frac = ((t - prev_time) / (end - prev_time)).clamp(0.0, 1.0) as f32;
                    prev_value + (value - prev_value) * frac
                }
                ParamEvent::ExponentialRamp { value, end } => {
                    if prev_value == 0.0 || (prev_value < 0.0) != (value < 0.0) {
                        prev_value
                    } else {
                        let frac = ((t - prev_time) / (end - prev_time)).clamp(0.0, 1.0) as f32;
                        prev_value * (value / prev_value).powf(frac)
                    }
                }
                _ => prev_value,
            };
        }
        prev_value
    }

    /// Value once every scheduled event has completed.
    pub fn final_value(&self) -> f32 {
        self.events
            .iter()
            .rev()
            .find_map(|e| e.value())
            .unwrap_or(self.default)
    }
}
