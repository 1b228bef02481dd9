//! Procedural whoosh synthesis: shared white noise through a swept band-pass.

use crate::audio::{AudioGraph, ParamEvent, VoiceParam, VoiceSpec};
use crate::constants::*;
use crate::error::AudioError;
use crate::transport::Direction;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::{smallvec, SmallVec};

/// Automation for one one-shot whoosh.
#[derive(Clone, Debug, PartialEq)]
pub struct WhooshPlan {
    pub start: f64,
    pub stop_at: f64,
    pub frequency: SmallVec<[ParamEvent; 2]>,
    pub gain: SmallVec<[ParamEvent; 4]>,
}

/// Rising sweep forward, falling sweep backward; attack over the first 15%,
/// sag to 85% of peak by 70%, fade out at the end.
pub fn whoosh_plan(direction: Direction, start: f64, duration: f64, peak: f32) -> WhooshPlan {
    let duration = duration.max(0.01);
    let end = start + duration;
    let (from_hz, to_hz) = match direction {
        Direction::Forward => (WHOOSH_LOW_HZ, WHOOSH_HIGH_HZ),
        Direction::Backward => (WHOOSH_HIGH_HZ, WHOOSH_LOW_HZ),
    };
    let peak = peak.max(0.0);
    WhooshPlan {
        start,
        stop_at: end,
        frequency: smallvec![
            ParamEvent::SetValue { value: from_hz, at: start },
            ParamEvent::ExponentialRamp { value: to_hz, end },
        ],
        gain: smallvec![
            ParamEvent::SetValue { value: 0.0, at: start },
            ParamEvent::LinearRamp {
                value: peak,
                end: start + duration * WHOOSH_ATTACK_FRAC,
            },
            ParamEvent::LinearRamp {
                value: peak * WHOOSH_HOLD_LEVEL,
                end: start + duration * WHOOSH_HOLD_FRAC,
            },
            ParamEvent::LinearRamp { value: 0.0, end },
        ],
    }
}

/// Center frequency of the held-scrub loop.
pub fn sustained_frequency(direction: Direction) -> f32 {
    match direction {
        Direction::Forward => SUSTAIN_FORWARD_HZ,
        Direction::Backward => SUSTAIN_BACKWARD_HZ,
    }
}

/// `len` independent uniform samples in `[-1, 1]`.
pub fn noise_samples<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}

struct Sustained<V> {
    voice: V,
    direction: Direction,
    started_at: f64,
}

impl<V> Sustained<V> {
    // Gain of the loop at `t` while its fade-in is the only automation.
    fn level_at(&self, t: f64) -> f32 {
        let progress = ((t - self.started_at) / SUSTAIN_FADE_IN_SEC).clamp(0.0, 1.0);
        SUSTAIN_VOLUME * progress as f32
    }
}

pub struct SfxSynth<G: AudioGraph> {
    noise: Option<G::Buffer>,
    sustained: Option<Sustained<G::Voice>>,
    rng: StdRng,
}

impl<G: AudioGraph> SfxSynth<G> {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: None,
            sustained: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn has_noise_buffer(&self) -> bool {
        self.noise.is_some()
    }

    pub fn sustained_direction(&self) -> Option<Direction> {
        self.sustained.as_ref().map(|s| s.direction)
    }

    /// Create the shared noise buffer on first use.
    pub fn ensure_noise_buffer(&mut self, graph: &mut G) -> Result<G::Buffer, AudioError> {
        if let Some(buffer) = &self.noise {
            return Ok(buffer.clone());
        }
        let len = (graph.sample_rate() * NOISE_BUFFER_SEC).round().max(1.0) as usize;
        let samples = noise_samples(len, &mut self.rng);
        let buffer = graph.create_buffer(&samples)?;
        log::debug!("[sfx] noise buffer ready ({len} samples)");
        self.noise = Some(buffer.clone());
        Ok(buffer)
    }

    /// Fire-and-forget whoosh; the voice stops itself after `duration`.
    pub fn play_whoosh(
        &mut self,
        graph: &mut G,
        direction: Direction,
        duration: f64,
        peak: f32,
    ) -> Result<(), AudioError> {
        let buffer = self.ensure_noise_buffer(graph)?;
        let plan = whoosh_plan(direction, graph.current_time(), duration, peak);
        let voice = graph.start_voice(
            &buffer,
            &VoiceSpec {
                looping: false,
                filter_q: WHOOSH_Q,
                start_at: plan.start,
            },
        )?;
        for event in &plan.frequency {
            graph.schedule_voice(&voice, VoiceParam::FilterFrequency, *event)?;
        }
        for event in &plan.gain {
            graph.schedule_voice(&voice, VoiceParam::Gain, *event)?;
        }
        graph.stop_voice(&voice, plan.stop_at)
    }

    /// Start the looping scrub whoosh, replacing any loop already running.
    pub fn play_sustained_whoosh(&mut self, graph: &mut G, direction: Direction) -> Result<(), AudioError> {
        if self.sustained.is_some() {
            self.stop_sustained_whoosh(graph)?;
        }
        let buffer = self.ensure_noise_buffer(graph)?;
        let now = graph.current_time();
        let voice = graph.start_voice(
            &buffer,
            &VoiceSpec {
                looping: true,
                filter_q: WHOOSH_Q,
                start_at: now,
            },
        )?;
        graph.schedule_voice(
            &voice,
            VoiceParam::FilterFrequency,
            ParamEvent::SetValue {
                value: sustained_frequency(direction),
                at: now,
            },
        )?;
        graph.schedule_voice(&voice, VoiceParam::Gain, ParamEvent::SetValue { value: 0.0, at: now })?;
        graph.schedule_voice(
            &voice,
            VoiceParam::Gain,
            ParamEvent::LinearRamp {
                value: SUSTAIN_VOLUME,
                end: now + SUSTAIN_FADE_IN_SEC,
            },
        )?;
        self.sustained = Some(Sustained {
            voice,
            direction,
            started_at: now,
        });
        Ok(())
    }

    /// Fade the loop out and stop it once silent. No-op if none is running.
    pub fn stop_sustained_whoosh(&mut self, graph: &mut G) -> Result<(), AudioError> {
        let Some(sustained) = self.sustained.take() else {
            return Ok(());
        };
        let now = graph.current_time();
        let end = now + SUSTAIN_FADE_OUT_SEC;
        let voice = &sustained.voice;
        graph.schedule_voice(voice, VoiceParam::Gain, ParamEvent::Cancel { from: now })?;
        graph.schedule_voice(
            voice,
            VoiceParam::Gain,
            ParamEvent::SetValue {
                value: sustained.level_at(now),
                at: now,
            },
        )?;
        graph.schedule_voice(voice, VoiceParam::Gain, ParamEvent::LinearRamp { value: 0.0, end })?;
        graph.stop_voice(voice, end)
    }
}
