//! Software [`AudioGraph`] that renders into sample blocks.
//!
//! Used by the native driver and by tests to hear (and measure) exactly what
//! the effects engine schedules. Voices are buffer sources run through a
//! state-variable band-pass and a per-voice gain; the master gain scales an
//! optional program (music) source, as the WebAudio graph does for the
//! `<audio>` element.

use crate::audio::{AudioGraph, AutomationTimeline, ParamEvent, VoiceParam, VoiceSpec};
use crate::error::AudioError;
use std::f32::consts::PI;
use std::rc::Rc;

// WebAudio defaults for GainNode.gain and BiquadFilterNode.frequency
const DEFAULT_VOICE_GAIN: f32 = 1.0;
const DEFAULT_FILTER_HZ: f32 = 350.0;

#[derive(Clone, Debug)]
pub struct OfflineBuffer(Rc<[f32]>);

impl OfflineBuffer {
    pub fn samples(&self) -> &[f32] {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

/// Zero-delay-feedback state-variable filter, band-pass output normalized
/// to unity gain at the center frequency.
#[derive(Clone, Debug, Default)]
struct BandPass {
    ic1eq: f32,
    ic2eq: f32,
}

impl BandPass {
    #[inline]
    fn process(&mut self, input: f32, center_hz: f32, q: f32, sample_rate: f32) -> f32 {
        let cutoff = center_hz.clamp(20.0, sample_rate * 0.49);
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / q.max(0.05);
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;

        let v3 = input - self.ic2eq;
        let v1 = a1 * self.ic1eq + a2 * v3;
        let v2 = self.ic2eq + a2 * self.ic1eq + a3 * v3;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        k * v1
    }
}

struct OfflineVoice {
    id: VoiceId,
    buffer: OfflineBuffer,
    looping: bool,
    q: f32,
    start_at: f64,
    stop_at: Option<f64>,
    cursor: usize,
    gain: AutomationTimeline,
    frequency: AutomationTimeline,
    filter: BandPass,
    finished: bool,
}

impl OfflineVoice {
    fn next_sample(&mut self, t: f64, sample_rate: f32) -> f32 {
        if self.finished || t < self.start_at {
            return 0.0;
        }
        if self.stop_at.is_some_and(|stop| t >= stop) {
            self.finished = true;
            return 0.0;
        }
        let samples = self.buffer.samples();
        if self.cursor >= samples.len() {
            if self.looping && !samples.is_empty() {
                self.cursor = 0;
            } else {
                self.finished = true;
                return 0.0;
            }
        }
        let x = samples[self.cursor];
        self.cursor += 1;
        let y = self
            .filter
            .process(x, self.frequency.value_at(t), self.q, sample_rate);
        y * self.gain.value_at(t)
    }
}

pub struct OfflineGraph {
    sample_rate: f32,
    frames_rendered: u64,
    master: AutomationTimeline,
    voices: Vec<OfflineVoice>,
    next_voice: u64,
    program: Option<Box<dyn FnMut(f64) -> f32>>,
    resumes: usize,
}

impl OfflineGraph {
    pub fn new(sample_rate: f32, master_level: f32) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            frames_rendered: 0,
            master: AutomationTimeline::new(master_level),
            voices: Vec::new(),
            next_voice: 0,
            program: None,
            resumes: 0,
        }
    }

    /// Source routed through the master gain, sampled at audio time `t`.
    pub fn with_program(mut self, program: impl FnMut(f64) -> f32 + 'static) -> Self {
        self.program = Some(Box::new(program));
        self
    }

    pub fn master(&self) -> &AutomationTimeline {
        &self.master
    }

    /// Times the engine asked the graph to resume.
    pub fn resume_count(&self) -> usize {
        self.resumes
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voice_timeline(&self, voice: &VoiceId, param: VoiceParam) -> Option<&AutomationTimeline> {
        self.voices.iter().find(|v| v.id == *voice).map(|v| match param {
            VoiceParam::Gain => &v.gain,
            VoiceParam::FilterFrequency => &v.frequency,
        })
    }

    /// Render the next `out.len()` mono frames and advance the audio clock.
    pub fn render(&mut self, out: &mut [f32]) {
        let sr = self.sample_rate;
        for slot in out.iter_mut() {
            let t = self.frames_rendered as f64 / sr as f64;
            let mut mix = match self.program.as_mut() {
                Some(program) => program(t) * self.master.value_at(t),
                None => 0.0,
            };
            for voice in &mut self.voices {
                mix += voice.next_sample(t, sr);
            }
            *slot = mix;
            self.frames_rendered += 1;
        }
        self.voices.retain(|v| !v.finished);
        let now = self.current_time();
        self.master.prune_before(now);
    }

    /// Render `seconds` of audio and return it.
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds.max(0.0) * self.sample_rate as f64).round() as usize;
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    fn voice_mut(&mut self, voice: &VoiceId) -> Result<&mut OfflineVoice, AudioError> {
        self.voices
            .iter_mut()
            .find(|v| v.id == *voice)
            .ok_or(AudioError::UnknownVoice(voice.0 as usize))
    }
}

impl AudioGraph for OfflineGraph {
    type Buffer = OfflineBuffer;
    type Voice = VoiceId;

    fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    // Never suspended; just counted
    fn resume(&mut self) -> Result<(), AudioError> {
        self.resumes += 1;
        Ok(())
    }

    fn master_value(&self) -> f32 {
        self.master.value_at(self.current_time())
    }

    fn schedule_master(&mut self, event: ParamEvent) -> Result<(), AudioError> {
        self.master.insert(event)
    }

    fn create_buffer(&mut self, samples: &[f32]) -> Result<Self::Buffer, AudioError> {
        if samples.is_empty() {
            return Err(AudioError::Node("empty buffer".into()));
        }
        Ok(OfflineBuffer(Rc::from(samples)))
    }

    fn start_voice(&mut self, buffer: &Self::Buffer, spec: &VoiceSpec) -> Result<Self::Voice, AudioError> {
        self.next_voice += 1;
        let id = VoiceId(self.next_voice);
        self.voices.push(OfflineVoice {
            id,
            buffer: buffer.clone(),
            looping: spec.looping,
            q: spec.filter_q,
            start_at: spec.start_at,
            stop_at: None,
            cursor: 0,
            gain: AutomationTimeline::new(DEFAULT_VOICE_GAIN),
            frequency: AutomationTimeline::new(DEFAULT_FILTER_HZ),
            filter: BandPass::default(),
            finished: false,
        });
        Ok(id)
    }

    fn schedule_voice(
        &mut self,
        voice: &Self::Voice,
        param: VoiceParam,
        event: ParamEvent,
    ) -> Result<(), AudioError> {
        let v = self.voice_mut(voice)?;
        match param {
            VoiceParam::Gain => v.gain.insert(event),
            VoiceParam::FilterFrequency => v.frequency.insert(event),
        }
    }

    fn stop_voice(&mut self, voice: &Self::Voice, at: f64) -> Result<(), AudioError> {
        let v = self.voice_mut(voice)?;
        v.stop_at = Some(v.stop_at.map_or(at, |prev| prev.min(at)));
        Ok(())
    }
}
