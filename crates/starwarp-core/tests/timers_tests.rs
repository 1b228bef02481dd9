// Host-side tests for the interval/timeout scheduler.

use starwarp_core::*;

fn drain(timers: &mut Timers, until: f64) -> Vec<TimerId> {
    let mut fired = Vec::new();
    while let Some(id) = timers.pop_due(until) {
        fired.push(id);
    }
    timers.settle(until);
    fired
}

#[test]
fn interval_fires_once_per_period() {
    let mut timers = Timers::new();
    let id = timers.set_interval(0.05);
    assert!(drain(&mut timers, 0.049).is_empty());
    assert_eq!(drain(&mut timers, 0.05), vec![id]);
    assert_eq!(drain(&mut timers, 0.2).len(), 3, "catches up on missed periods");
    assert!((timers.now() - 0.2).abs() < 1e-12);
    assert!(timers.is_active(id));
}

#[test]
fn many_small_steps_do_not_drift() {
    let mut timers = Timers::new();
    timers.set_interval(0.05);
    let mut fired = 0;
    let mut until = 0.0;
    for _ in 0..1000 {
        until += 0.01;
        fired += drain(&mut timers, until).len();
    }
    assert_eq!(fired, 200);
}

#[test]
fn timeout_fires_once_and_is_removed() {
    let mut timers = Timers::new();
    let id = timers.set_timeout(1.2);
    assert!(drain(&mut timers, 1.0).is_empty());
    assert_eq!(drain(&mut timers, 1.3), vec![id]);
    assert!(!timers.is_active(id));
    assert!(!timers.clear(id), "already fired");
    assert!(timers.is_empty());
}

#[test]
fn due_timers_pop_in_deadline_order() {
    let mut timers = Timers::new();
    let late = timers.set_timeout(0.4);
    let tick = timers.set_interval(0.125);
    let early = timers.set_timeout(0.2);
    assert_eq!(drain(&mut timers, 0.4), vec![tick, early, tick, tick, late]);
}

#[test]
fn clearing_inside_a_drain_prevents_later_firing() {
    let mut timers = Timers::new();
    let tick = timers.set_interval(0.05);
    let timeout = timers.set_timeout(0.12);

    let mut fired = Vec::new();
    while let Some(id) = timers.pop_due(1.0) {
        fired.push(id);
        if id == timeout {
            timers.clear(tick);
        }
    }
    assert_eq!(fired, vec![tick, tick, timeout]);
    assert!(timers.is_empty());
}

#[test]
fn clock_moves_to_each_deadline_while_draining() {
    let mut timers = Timers::new();
    timers.set_interval(0.25);
    timers.pop_due(1.0).expect("first");
    assert_eq!(timers.now(), 0.25);
    timers.pop_due(1.0).expect("second");
    assert_eq!(timers.now(), 0.5);
}

#[test]
fn ids_are_never_reused() {
    let mut timers = Timers::new();
    let a = timers.set_timeout(0.0);
    timers.clear(a);
    let b = timers.set_timeout(0.0);
    assert_ne!(a, b);
}
