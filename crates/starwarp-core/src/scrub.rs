//! Scrub: fast seek through the current track for as long as a control is
//! held. `Idle -> Scrubbing -> Idle`.

use crate::audio::AudioGraph;
use crate::effects::Effects;
use crate::timers::TimerId;
use crate::transport::{clamp_position, Direction, Transport};

#[derive(Clone, Debug, PartialEq)]
pub struct ScrubSession {
    pub direction: Direction,
    pub interval: TimerId,
    /// Whether a sustained whoosh was started (false without audio or while
    /// muted).
    pub sustained_sfx: bool,
}

#[derive(Debug, Default)]
pub struct ScrubController {
    session: Option<ScrubSession>,
}

impl ScrubController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ScrubSession> {
        self.session.as_ref()
    }

    /// Returns false if a scrub was already running.
    pub fn begin<G: AudioGraph, T: Transport>(&mut self, fx: &mut Effects<'_, G, T>, direction: Direction) -> bool {
        if self.session.is_some() {
            return false;
        }
        let duration = fx.known_duration();
        let jump = fx.tuning.scrub_jump_sec * direction.sign();
        let position = clamp_position(fx.transport.position() + jump, duration);
        fx.transport.set_position(position);

        fx.warp.set(fx.tuning.scrub_warp(direction));
        fx.duck(fx.tuning.scrub_duck_fraction);
        let sustained_sfx = match fx.sfx() {
            Some(session) => {
                session.start_sustained(direction);
                true
            }
            None => false,
        };

        let interval = fx.timers.set_interval(fx.tuning.tick_sec);
        self.session = Some(ScrubSession {
            direction,
            interval,
            sustained_sfx,
        });
        log::info!("[scrub] {:?} from {:.1}s", direction, position);
        true
    }

    /// Advance the position if `id` is this scrub's interval.
    pub fn on_timer<G: AudioGraph, T: Transport>(&mut self, fx: &mut Effects<'_, G, T>, id: TimerId) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        if id != session.interval {
            return false;
        }
        let step = fx.tuning.scrub_rate * fx.tuning.tick_sec * session.direction.sign();
        let next = clamp_position(fx.transport.position() + step, fx.known_duration());
        fx.transport.set_position(next);
        true
    }

    /// Release: returns false if no scrub was running.
    pub fn end<G: AudioGraph, T: Transport>(&mut self, fx: &mut Effects<'_, G, T>) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        fx.timers.clear(session.interval);
        fx.neutralize();
        if let Some(audio) = fx.session() {
            audio.stop_sustained();
        }
        log::info!("[scrub] released at {:.1}s", fx.transport.position());
        true
    }
}
