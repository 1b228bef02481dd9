//! Host-agnostic interval/timeout scheduler.
//!
//! The host advances the clock (from `setInterval`, a frame loop or a test)
//! and the owner drains due timers one at a time with [`Timers::pop_due`], so
//! a handler that clears another timer prevents it from firing later in the
//! same advance.

use fnv::FnvHashMap;

/// Identity of a scheduled timer. Never reused within one [`Timers`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

// Tolerance for accumulated float error in host-provided deltas.
const TIME_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
enum Kind {
    Interval { start: f64, period: f64, fired: u64 },
    Timeout,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    due: f64,
    kind: Kind,
}

#[derive(Debug, Default)]
pub struct Timers {
    now: f64,
    next_id: u64,
    timers: FnvHashMap<TimerId, Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the scheduler was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn set_interval(&mut self, period_sec: f64) -> TimerId {
        let period = period_sec.max(1e-3);
        let id = self.alloc();
        self.timers.insert(
            id,
            Timer {
                due: self.now + period,
                kind: Kind::Interval {
                    start: self.now,
                    period,
                    fired: 0,
                },
            },
        );
        id
    }

    pub fn set_timeout(&mut self, delay_sec: f64) -> TimerId {
        let id = self.alloc();
        self.timers.insert(
            id,
            Timer {
                due: self.now + delay_sec.max(0.0),
                kind: Kind::Timeout,
            },
        );
        id
    }

    /// Cancel a timer. Returns false if it already fired (timeouts) or was
    /// cleared before.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Intervals are rescheduled, timeouts removed. Call
    /// [`Timers::settle`] once no timer is left due.
    pub fn pop_due(&mut self, until: f64) -> Option<TimerId> {
        let (id, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= until + TIME_EPSILON)
            .min_by(|(a_id, a), (b_id, b)| a.due.total_cmp(&b.due).then(a_id.cmp(b_id)))
            .map(|(id, t)| (*id, *t))?;

        self.now = self.now.max(timer.due);
        match timer.kind {
            Kind::Interval {
                start,
                period,
                fired,
            } => {
                let fired = fired + 1;
                if let Some(t) = self.timers.get_mut(&id) {
                    t.due = start + period * (fired + 1) as f64;
                    t.kind = Kind::Interval {
                        start,
                        period,
                        fired,
                    };
                }
            }
            Kind::Timeout => {
                self.timers.remove(&id);
            }
        }
        Some(id)
    }

    /// Move the clock to `until` after all due timers were drained.
    pub fn settle(&mut self, until: f64) {
        self.now = self.now.max(until);
    }

    fn alloc(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}
