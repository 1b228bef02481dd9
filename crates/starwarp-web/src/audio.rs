use starwarp_core::{AudioError, AudioGraph, ParamEvent, VoiceParam, VoiceSpec};
use wasm_bindgen::JsValue;
use web_sys as web;

#[inline]
fn node_err(what: &str, e: JsValue) -> AudioError {
    AudioError::Node(format!("{what}: {e:?}"))
}

/// One playing whoosh: buffer source -> band-pass -> gain -> destination.
#[derive(Clone)]
pub struct WebVoice {
    source: web::AudioBufferSourceNode,
    filter: web::BiquadFilterNode,
    gain: web::GainNode,
}

impl WebVoice {
    fn scheduled(&self) -> &web::AudioScheduledSourceNode {
        self.source.as_ref()
    }
}

/// The page's audio graph. The `<audio>` element is routed through the
/// master gain; effect voices go straight to the destination so ducking the
/// music leaves them untouched.
pub struct WebAudioGraph {
    ctx: web::AudioContext,
    master: web::GainNode,
    _program: web::MediaElementAudioSourceNode,
}

impl WebAudioGraph {
    /// Must run inside a user gesture; a media element can be captured only
    /// once per page.
    pub fn new(player: &web::HtmlAudioElement) -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext: {:?}", e))?;
        _ = ctx.resume();
        let master = ctx
            .create_gain()
            .map_err(|e| anyhow::anyhow!("master GainNode: {:?}", e))?;
        let program = ctx
            .create_media_element_source(player)
            .map_err(|e| anyhow::anyhow!("MediaElementAudioSourceNode: {:?}", e))?;
        program
            .connect_with_audio_node(&master)
            .map_err(|e| anyhow::anyhow!("connect program: {:?}", e))?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow::anyhow!("connect master: {:?}", e))?;
        log::info!("[audio] context ready at {} Hz", ctx.sample_rate());
        Ok(Self {
            ctx,
            master,
            _program: program,
        })
    }
}

fn apply(param: &web::AudioParam, event: ParamEvent) -> Result<(), AudioError> {
    match event {
        ParamEvent::SetValue { value, at } => param
            .set_value_at_time(value, at)
            .map(|_| ())
            .map_err(|e| node_err("setValueAtTime", e)),
        ParamEvent::LinearRamp { value, end } => param
            .linear_ramp_to_value_at_time(value, end)
            .map(|_| ())
            .map_err(|e| node_err("linearRampToValueAtTime", e)),
        ParamEvent::ExponentialRamp { value, .. } if value <= 0.0 => {
            Err(AudioError::NonPositiveExponentialTarget(value))
        }
        ParamEvent::ExponentialRamp { value, end } => param
            .exponential_ramp_to_value_at_time(value, end)
            .map(|_| ())
            .map_err(|e| node_err("exponentialRampToValueAtTime", e)),
        ParamEvent::Cancel { from } => param
            .cancel_scheduled_values(from)
            .map(|_| ())
            .map_err(|e| node_err("cancelScheduledValues", e)),
    }
}

impl AudioGraph for WebAudioGraph {
    type Buffer = web::AudioBuffer;
    type Voice = WebVoice;

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    // Browsers suspend idle contexts; the music path goes dark until resumed
    fn resume(&mut self) -> Result<(), AudioError> {
        if self.ctx.state() == web::AudioContextState::Suspended {
            log::info!("[audio] resuming suspended context");
            self.ctx.resume().map_err(|e| node_err("resume", e))?;
        }
        Ok(())
    }

    fn master_value(&self) -> f32 {
        self.master.gain().value()
    }

    fn schedule_master(&mut self, event: ParamEvent) -> Result<(), AudioError> {
        apply(&self.master.gain(), event)
    }

    fn create_buffer(&mut self, samples: &[f32]) -> Result<Self::Buffer, AudioError> {
        let buffer = self
            .ctx
            .create_buffer(1, samples.len() as u32, self.ctx.sample_rate())
            .map_err(|e| node_err("createBuffer", e))?;
        let mut data = samples.to_vec();
        buffer
            .copy_to_channel(&mut data, 0)
            .map_err(|e| node_err("copyToChannel", e))?;
        Ok(buffer)
    }

    fn start_voice(&mut self, buffer: &Self::Buffer, spec: &VoiceSpec) -> Result<Self::Voice, AudioError> {
        let source = self
            .ctx
            .create_buffer_source()
            .map_err(|e| node_err("createBufferSource", e))?;
        source.set_buffer(Some(buffer));
        source.set_loop(spec.looping);

        let filter = self
            .ctx
            .create_biquad_filter()
            .map_err(|e| node_err("createBiquadFilter", e))?;
        filter.set_type(web::BiquadFilterType::Bandpass);
        filter.q().set_value(spec.filter_q);

        let gain = self.ctx.create_gain().map_err(|e| node_err("createGain", e))?;
        gain.gain().set_value(0.0);

        source
            .connect_with_audio_node(&filter)
            .map_err(|e| node_err("connect source", e))?;
        filter
            .connect_with_audio_node(&gain)
            .map_err(|e| node_err("connect filter", e))?;
        gain.connect_with_audio_node(&self.ctx.destination())
            .map_err(|e| node_err("connect voice", e))?;

        let voice = WebVoice { source, filter, gain };
        voice
            .scheduled()
            .start_with_when(spec.start_at)
            .map_err(|e| node_err("start", e))?;
        Ok(voice)
    }

    fn schedule_voice(&mut self, voice: &Self::Voice, param: VoiceParam, event: ParamEvent) -> Result<(), AudioError> {
        match param {
            VoiceParam::Gain => apply(&voice.gain.gain(), event),
            VoiceParam::FilterFrequency => apply(&voice.filter.frequency(), event),
        }
    }

    fn stop_voice(&mut self, voice: &Self::Voice, at: f64) -> Result<(), AudioError> {
        voice
            .scheduled()
            .stop_with_when(at)
            .map_err(|e| node_err("stop", e))
    }
}
