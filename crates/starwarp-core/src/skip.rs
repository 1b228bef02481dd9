//! Skip: a one-second animated run to the end (or start) of the track before
//! changing tracks.
//!
//! `Idle -> Skipping -> Idle`. While skipping, the position advances on every
//! tick at whatever rate covers the remaining distance in the fixed window,
//! so a skip always takes the same time wherever it began. A safety timeout
//! guarantees the finish even if the boundary is never observed.

use crate::audio::AudioGraph;
use crate::effects::Effects;
use crate::timers::TimerId;
use crate::transport::{clamp_position, Direction, Transport};

#[derive(Clone, Debug, PartialEq)]
pub struct SkipSession {
    pub direction: Direction,
    /// Explicit destination (shuffle); `None` means the adjacent track.
    pub target_index: Option<usize>,
    /// Playback seconds per real second.
    pub scrub_rate: f64,
    pub interval: TimerId,
    pub timeout: TimerId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipStart {
    Animated,
    /// Another skip is in flight.
    Busy,
    /// Duration unknown; the caller should change tracks directly.
    NoDuration,
}

#[derive(Debug, Default)]
pub struct SkipController {
    session: Option<SkipSession>,
    started: u64,
}

impl SkipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SkipSession> {
        self.session.as_ref()
    }

    /// Number of sessions started so far.
    pub fn sessions_started(&self) -> u64 {
        self.started
    }

    pub fn begin<G: AudioGraph, T: Transport>(
        &mut self,
        fx: &mut Effects<'_, G, T>,
        direction: Direction,
        target_index: Option<usize>,
    ) -> SkipStart {
        if self.session.is_some() {
            log::debug!("[skip] already skipping; ignoring");
            return SkipStart::Busy;
        }
        let Some(duration) = fx.known_duration() else {
            log::info!("[skip] duration unknown; changing track without animation");
            return SkipStart::NoDuration;
        };

        let position = clamp_position(fx.transport.position(), Some(duration));
        let time_to_skip = match direction {
            Direction::Forward => duration - position,
            Direction::Backward => position,
        };
        let window = fx.tuning.skip_duration_sec;
        let scrub_rate = time_to_skip / window;

        fx.warp.set(fx.tuning.skip_warp(direction));
        fx.duck(fx.tuning.skip_duck_fraction);
        if fx.tuning.skip_whoosh {
            let peak = fx.tuning.skip_whoosh_peak;
            if let Some(session) = fx.sfx() {
                session.play_whoosh(direction, window, peak);
            }
        }

        let interval = fx.timers.set_interval(fx.tuning.tick_sec);
        let timeout = fx.timers.set_timeout(window + fx.tuning.skip_timeout_slack_sec);
        self.session = Some(SkipSession {
            direction,
            target_index,
            scrub_rate,
            interval,
            timeout,
        });
        self.started += 1;
        log::info!(
            "[skip] {:?} from {:.1}s of {:.1}s at {:.1}x",
            direction,
            position,
            duration,
            scrub_rate
        );
        SkipStart::Animated
    }

    /// Handle a fired timer. Returns the finished session when this timer
    /// ended the skip.
    pub fn on_timer<G: AudioGraph, T: Transport>(
        &mut self,
        fx: &mut Effects<'_, G, T>,
        id: TimerId,
    ) -> Option<SkipSession> {
        let session = self.session.as_ref()?;
        if id == session.timeout {
            log::debug!("[skip] safety timeout");
            return self.finish(fx);
        }
        if id != session.interval {
            return None;
        }
        let (direction, rate) = (session.direction, session.scrub_rate);
        let duration = fx.known_duration();
        let step = rate * fx.tuning.tick_sec * direction.sign();
        let next = clamp_position(fx.transport.position() + step, duration);
        fx.transport.set_position(next);

        let at_boundary = match direction {
            Direction::Forward => duration.is_some_and(|d| next >= d),
            Direction::Backward => next <= 0.0,
        };
        if at_boundary {
            self.finish(fx)
        } else {
            None
        }
    }

    /// Stop the animation and return to neutral. The caller changes tracks.
    pub fn finish<G: AudioGraph, T: Transport>(&mut self, fx: &mut Effects<'_, G, T>) -> Option<SkipSession> {
        let session = self.session.take()?;
        fx.timers.clear(session.interval);
        fx.timers.clear(session.timeout);
        fx.neutralize();
        log::debug!("[skip] finished {:?}", session.direction);
        Some(session)
    }
}
