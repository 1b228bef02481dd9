//! Orchestrator: routes user intents into the skip/scrub controllers and
//! drives their timers.
//!
//! The engine owns the warp target handle it shares with the starfield, the
//! gain controller, the optional audio session, the transport and the
//! playlist. Hosts call [`EffectsEngine::advance`] from an interval timer;
//! the starfield runs on its own frame loop and only reads the warp target.

use crate::audio::AudioGraph;
use crate::effects::{Effects, EffectsTuning};
use crate::error::EngineError;
use crate::gain::GainController;
use crate::playlist::Playlist;
use crate::scrub::{ScrubController, ScrubSession};
use crate::session::AudioSession;
use crate::skip::{SkipController, SkipSession, SkipStart};
use crate::timers::Timers;
use crate::transport::{Direction, Transport};
use crate::warp::WarpTarget;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct EffectsEngine<G: AudioGraph, T: Transport> {
    tuning: EffectsTuning,
    warp: WarpTarget,
    gain: GainController,
    audio: Option<AudioSession<G>>,
    timers: Timers,
    transport: T,
    playlist: Playlist,
    skip: SkipController,
    scrub: ScrubController,
    rng: StdRng,
    seed: u64,
}

impl<G: AudioGraph, T: Transport> EffectsEngine<G, T> {
    pub fn new(warp: WarpTarget, transport: T, playlist: Playlist, seed: u64) -> Self {
        Self {
            tuning: EffectsTuning::default(),
            warp,
            gain: GainController::default(),
            audio: None,
            timers: Timers::new(),
            transport,
            playlist,
            skip: SkipController::new(),
            scrub: ScrubController::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn with_tuning(mut self, tuning: EffectsTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn tuning(&self) -> &EffectsTuning {
        &self.tuning
    }

    pub fn warp(&self) -> &WarpTarget {
        &self.warp
    }

    pub fn gain(&self) -> &GainController {
        &self.gain
    }

    pub fn audio(&self) -> Option<&AudioSession<G>> {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> Option<&mut AudioSession<G>> {
        self.audio.as_mut()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn playlist_mut(&mut self) -> &mut Playlist {
        &mut self.playlist
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn skip_session(&self) -> Option<&SkipSession> {
        self.skip.session()
    }

    pub fn skips_started(&self) -> u64 {
        self.skip.sessions_started()
    }

    pub fn scrub_session(&self) -> Option<&ScrubSession> {
        self.scrub.session()
    }

    /// True while a skip or scrub is in flight.
    pub fn is_busy(&self) -> bool {
        self.skip.is_active() || self.scrub.is_active()
    }

    // ---------------- Audio session lifecycle ----------------

    /// Adopt the audio graph created inside the first user gesture.
    pub fn attach_audio(&mut self, graph: G) {
        if self.audio.is_some() {
            log::warn!("[engine] audio already attached; replacing session");
            self.detach_audio();
        }
        let mut session = AudioSession::new(graph, self.seed ^ 0x5EED_A0D1);
        session.prepare();
        self.gain.sync(session.graph_mut());
        self.audio = Some(session);
        log::info!("[engine] audio attached, volume {:.2}", self.gain.current_level());
    }

    /// Tear down the audio session, cancelling any effect first.
    pub fn detach_audio(&mut self) -> Option<G> {
        self.cancel_effects();
        self.audio.take().map(AudioSession::close)
    }

    // ---------------- Volume ----------------

    pub fn set_volume(&mut self, level: f32) {
        let graph = self.audio.as_mut().map(AudioSession::graph_mut);
        self.gain.set_volume(graph, level);
    }

    /// Muting also silences a running sustained whoosh; effect voices bypass
    /// the master gain.
    pub fn toggle_mute(&mut self) -> bool {
        let graph = self.audio.as_mut().map(AudioSession::graph_mut);
        let muted = self.gain.toggle_mute(graph);
        if muted {
            if let Some(audio) = self.audio.as_mut() {
                audio.stop_sustained();
            }
        }
        muted
    }

    // ---------------- Plain navigation ----------------

    /// Load and play track `index`, waking a suspended audio context first.
    pub fn play_track(&mut self, index: usize) -> Result<(), EngineError> {
        self.playlist.load(index, &mut self.transport)?;
        if let Some(audio) = self.audio.as_mut() {
            if let Err(e) = audio.graph_mut().resume() {
                log::warn!("[engine] audio resume failed: {e}");
            }
        }
        self.transport.play()
    }

    pub fn next_track(&mut self) -> Result<(), EngineError> {
        let index = self.playlist.next_index().ok_or(EngineError::EmptyPlaylist)?;
        self.play_track(index)
    }

    pub fn previous_track(&mut self) -> Result<(), EngineError> {
        let index = self.playlist.previous_index().ok_or(EngineError::EmptyPlaylist)?;
        self.play_track(index)
    }

    /// Auto-advance when the element reports the end of a track.
    pub fn on_track_ended(&mut self) -> Result<(), EngineError> {
        if self.skip.is_active() {
            // the skip's own finish changes the track
            return Ok(());
        }
        if self.scrub.is_active() {
            self.end_scrub();
        }
        self.next_track()
    }

    // ---------------- Effects ----------------

    pub fn skip_forward(&mut self) -> Result<(), EngineError> {
        self.begin_skip(Direction::Forward, None)
    }

    pub fn skip_backward(&mut self) -> Result<(), EngineError> {
        self.begin_skip(Direction::Backward, None)
    }

    /// Warp forward to a random other track. Returns the chosen index, or
    /// `None` if an effect was already running.
    pub fn shuffle(&mut self) -> Result<Option<usize>, EngineError> {
        if self.is_busy() {
            return Ok(None);
        }
        let index = self
            .playlist
            .random_index(&mut self.rng)
            .ok_or(EngineError::EmptyPlaylist)?;
        self.shuffle_to(index)?;
        Ok(Some(index))
    }

    pub fn shuffle_to(&mut self, index: usize) -> Result<(), EngineError> {
        let len = self.playlist.len();
        if index >= len {
            return Err(EngineError::TrackOutOfRange { index, len });
        }
        self.begin_skip(Direction::Forward, Some(index))
    }

    /// Start a skip. Ignored while another effect runs; degrades to an
    /// immediate track change when the duration is unknown.
    pub fn begin_skip(&mut self, direction: Direction, target: Option<usize>) -> Result<(), EngineError> {
        if self.scrub.is_active() {
            log::debug!("[engine] skip ignored while scrubbing");
            return Ok(());
        }
        if self.playlist.is_empty() {
            return Err(EngineError::EmptyPlaylist);
        }
        let (skip, _, mut fx) = self.parts();
        match skip.begin(&mut fx, direction, target) {
            SkipStart::Animated | SkipStart::Busy => Ok(()),
            SkipStart::NoDuration => self.change_track(direction, target),
        }
    }

    /// Press-and-hold start. Returns false if ignored.
    pub fn begin_scrub(&mut self, direction: Direction) -> bool {
        if self.skip.is_active() {
            log::debug!("[engine] scrub ignored while skipping");
            return false;
        }
        let (_, scrub, mut fx) = self.parts();
        scrub.begin(&mut fx, direction)
    }

    /// Release, pointer-leave or cancel. Returns false if not scrubbing.
    pub fn end_scrub(&mut self) -> bool {
        let (_, scrub, mut fx) = self.parts();
        scrub.end(&mut fx)
    }

    /// Abort whatever effect is running without changing tracks, leaving
    /// warp and volume neutral.
    pub fn cancel_effects(&mut self) {
        let (skip, scrub, mut fx) = self.parts();
        if skip.finish(&mut fx).is_some() {
            log::info!("[engine] skip cancelled");
        }
        scrub.end(&mut fx);
    }

    /// Advance the effect clock by `dt_sec` and run every timer that came
    /// due. Returns the error of a track change that failed to start, or a
    /// playback rejection the transport reported since the last call.
    pub fn advance(&mut self, dt_sec: f64) -> Result<(), EngineError> {
        let until = self.timers.now() + dt_sec.max(0.0);
        let mut result = Ok(());
        while let Some(id) = self.timers.pop_due(until) {
            let (skip, scrub, mut fx) = self.parts();
            if let Some(done) = skip.on_timer(&mut fx, id) {
                if let Err(e) = self.change_track(done.direction, done.target_index) {
                    log::warn!("[engine] track change after skip failed: {e}");
                    result = Err(e);
                }
            } else {
                scrub.on_timer(&mut fx, id);
            }
        }
        self.timers.settle(until);
        if let Some(e) = self.transport.take_rejection() {
            log::warn!("[engine] {e}");
            if result.is_ok() {
                result = Err(e);
            }
        }
        result
    }

    fn change_track(&mut self, direction: Direction, target: Option<usize>) -> Result<(), EngineError> {
        let index = match (target, direction) {
            (Some(index), _) => Some(index),
            (None, Direction::Forward) => self.playlist.next_index(),
            (None, Direction::Backward) => self.playlist.previous_index(),
        }
        .ok_or(EngineError::EmptyPlaylist)?;
        self.play_track(index)
    }

    fn parts(&mut self) -> (&mut SkipController, &mut ScrubController, Effects<'_, G, T>) {
        (
            &mut self.skip,
            &mut self.scrub,
            Effects {
                gain: &mut self.gain,
                audio: self.audio.as_mut(),
                warp: &self.warp,
                timers: &mut self.timers,
                transport: &mut self.transport,
                tuning: &self.tuning,
            },
        )
    }
}
