//! Playback transport seam.
//!
//! The engine never decodes audio; it reads and writes a numeric position on
//! whatever element plays the track and observes its duration.

use crate::error::EngineError;
use fnv::FnvHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub fn is_forward(self) -> bool {
        self == Direction::Forward
    }
}

pub trait Transport {
    /// Playback position in seconds.
    fn position(&self) -> f64;
    fn set_position(&mut self, seconds: f64);
    /// `None` until the track's metadata has loaded.
    fn duration(&self) -> Option<f64>;
    fn load(&mut self, source: &str);
    fn play(&mut self) -> Result<(), EngineError>;
    fn pause(&mut self);
    /// A rejection of an earlier `play` that arrived after it returned.
    /// Taking it clears it.
    fn take_rejection(&mut self) -> Option<EngineError> {
        None
    }
}

/// Clamp `position` into `[0, duration]`, or `[0, inf)` while the duration
/// is unknown.
#[inline]
pub fn clamp_position(position: f64, duration: Option<f64>) -> f64 {
    let upper = duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(f64::INFINITY);
    if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, upper)
    }
}

/// In-memory transport for headless driving and tests.
#[derive(Debug, Default)]
pub struct ManualTransport {
    position: f64,
    duration: Option<f64>,
    source: Option<String>,
    playing: bool,
    reject_play: bool,
    late_rejection: Option<String>,
    durations: FnvHashMap<String, f64>,
    loads: usize,
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration reported after `source` is loaded. Unlisted sources report
    /// no duration.
    pub fn with_duration_for(mut self, source: &str, seconds: f64) -> Self {
        self.durations.insert(source.to_string(), seconds);
        self
    }

    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration;
    }

    /// Make subsequent `play` calls fail, as a blocked autoplay would.
    pub fn set_reject_play(&mut self, reject: bool) {
        self.reject_play = reject;
    }

    /// Stop playback and report `reason` on the next `take_rejection`, as a
    /// play promise rejected after the fact would.
    pub fn reject_late(&mut self, reason: &str) {
        self.playing = false;
        self.late_rejection = Some(reason.to_string());
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Advance playback by `dt` real seconds at normal rate. Returns true if
    /// the track reached its end.
    pub fn advance(&mut self, dt: f64) -> bool {
        if !self.playing {
            return false;
        }
        self.position = clamp_position(self.position + dt.max(0.0), self.duration);
        match self.duration {
            Some(d) if self.position >= d => {
                self.playing = false;
                true
            }
            _ => false,
        }
    }
}

impl Transport for ManualTransport {
    fn position(&self) -> f64 {
        self.position
    }

    fn set_position(&mut self, seconds: f64) {
        self.position = clamp_position(seconds, self.duration);
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn load(&mut self, source: &str) {
        self.source = Some(source.to_string());
        self.position = 0.0;
        self.duration = self.durations.get(source).copied();
        self.playing = false;
        self.loads += 1;
    }

    fn play(&mut self) -> Result<(), EngineError> {
        if self.reject_play {
            return Err(EngineError::PlaybackRejected("play() requires a user gesture".into()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn take_rejection(&mut self) -> Option<EngineError> {
        self.late_rejection.take().map(EngineError::PlaybackRejected)
    }
}
