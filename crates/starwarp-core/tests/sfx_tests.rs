// Host-side tests for the whoosh synthesizer, automation curves and the
// offline graph that renders them.

use rand::rngs::StdRng;
use rand::SeedableRng;
use starwarp_core::*;

const SR: f32 = 48_000.0;

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

fn timeline(events: &[ParamEvent], default: f32) -> AutomationTimeline {
    let mut t = AutomationTimeline::new(default);
    for e in events {
        t.insert(*e).expect("valid automation");
    }
    t
}

#[test]
fn whoosh_envelope_follows_attack_hold_release() {
    let plan = whoosh_plan(Direction::Forward, 0.0, 1.0, 0.12);
    assert_eq!(plan.stop_at, 1.0);
    let gain = timeline(&plan.gain, 1.0);

    assert_eq!(gain.value_at(0.0), 0.0);
    assert!((gain.value_at(0.075) - 0.06).abs() < 1e-6, "halfway up the attack");
    assert!((gain.value_at(0.15) - 0.12).abs() < 1e-6);
    assert!((gain.value_at(0.70) - 0.12 * WHOOSH_HOLD_LEVEL).abs() < 1e-6);
    assert!(gain.value_at(1.0).abs() < 1e-6);
    assert_eq!(gain.final_value(), 0.0);
}

#[test]
fn whoosh_sweeps_exponentially_in_the_travel_direction() {
    let forward = timeline(&whoosh_plan(Direction::Forward, 2.0, 1.0, 0.1).frequency, 350.0);
    assert_eq!(forward.value_at(2.0), WHOOSH_LOW_HZ);
    let geometric_mid = (WHOOSH_LOW_HZ * WHOOSH_HIGH_HZ).sqrt();
    assert!((forward.value_at(2.5) - geometric_mid).abs() < 0.5);
    assert!((forward.value_at(3.0) - WHOOSH_HIGH_HZ).abs() < 1e-3);

    let backward = timeline(&whoosh_plan(Direction::Backward, 0.0, 1.0, 0.1).frequency, 350.0);
    assert_eq!(backward.value_at(0.0), WHOOSH_HIGH_HZ);
    assert!((backward.value_at(1.0) - WHOOSH_LOW_HZ).abs() < 1e-3);
    assert!(backward.value_at(0.3) > backward.value_at(0.6));
}

#[test]
fn automation_rejects_exponential_ramps_to_zero() {
    let mut t = AutomationTimeline::new(0.5);
    let err = t
        .insert(ParamEvent::ExponentialRamp { value: 0.0, end: 1.0 })
        .unwrap_err();
    assert_eq!(err, AudioError::NonPositiveExponentialTarget(0.0));
    assert!(t.events().is_empty());
}

#[test]
fn automation_interpolates_like_web_audio() {
    let t = timeline(
        &[
            ParamEvent::SetValue { value: 0.2, at: 1.0 },
            ParamEvent::LinearRamp { value: 0.6, end: 2.0 },
            ParamEvent::ExponentialRamp { value: 0.15, end: 3.0 },
        ],
        1.0,
    );
    assert_eq!(t.value_at(0.5), 1.0, "default before the first event");
    assert!((t.value_at(1.5) - 0.4).abs() < 1e-6);
    assert!((t.value_at(2.5) - 0.3).abs() < 1e-5, "geometric mean of 0.6 and 0.15");
    assert_eq!(t.value_at(10.0), 0.15);
}

#[test]
fn cancel_drops_events_at_or_after_its_time() {
    let mut t = timeline(
        &[
            ParamEvent::SetValue { value: 0.2, at: 0.0 },
            ParamEvent::LinearRamp { value: 0.8, end: 1.0 },
        ],
        1.0,
    );
    t.insert(ParamEvent::Cancel { from: 0.5 }).expect("cancel");
    assert_eq!(t.events().len(), 1);
    assert_eq!(t.final_value(), 0.2);
}

#[test]
fn noise_buffer_is_created_once_and_shared() {
    let mut graph = OfflineGraph::new(SR, 1.0);
    let mut sfx = SfxSynth::<OfflineGraph>::new(7);
    assert!(!sfx.has_noise_buffer());

    let a = sfx.ensure_noise_buffer(&mut graph).expect("buffer");
    let b = sfx.ensure_noise_buffer(&mut graph).expect("buffer");
    assert!(sfx.has_noise_buffer());
    assert_eq!(a.samples().as_ptr(), b.samples().as_ptr(), "same allocation");
    assert_eq!(a.samples().len(), (SR * NOISE_BUFFER_SEC) as usize);
}

#[test]
fn noise_is_bounded_and_centered() {
    let mut rng = StdRng::seed_from_u64(99);
    let noise = noise_samples(96_000, &mut rng);
    assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));
    let mean = noise.iter().sum::<f32>() / noise.len() as f32;
    assert!(mean.abs() < 0.02, "white noise should average near zero: {mean}");
    assert!(rms(&noise) > 0.5, "uniform noise has rms ~0.577");
}

#[test]
fn one_shot_whoosh_sounds_then_releases_its_voice() {
    let mut graph = OfflineGraph::new(SR, 1.0);
    let mut sfx = SfxSynth::<OfflineGraph>::new(3);
    sfx.play_whoosh(&mut graph, Direction::Forward, 1.0, SKIP_WHOOSH_PEAK)
        .expect("whoosh");
    assert_eq!(graph.active_voices(), 1);

    let attack = graph.render_seconds(0.05);
    let body = graph.render_seconds(0.5);
    assert!(rms(&body) > 1e-3, "whoosh should be audible");
    assert!(rms(&attack) < rms(&body), "starts from silence");
    let peak = body.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    assert!(peak < 1.0, "stays well below full scale: {peak}");

    graph.render_seconds(0.5);
    assert_eq!(graph.active_voices(), 0, "voice stops at the end of its window");
    assert!(rms(&graph.render_seconds(0.1)) == 0.0);
}

#[test]
fn sustained_whoosh_fades_in_loops_and_fades_out() {
    let mut graph = OfflineGraph::new(SR, 1.0);
    let mut sfx = SfxSynth::<OfflineGraph>::new(5);
    sfx.play_sustained_whoosh(&mut graph, Direction::Backward)
        .expect("loop");
    assert_eq!(sfx.sustained_direction(), Some(Direction::Backward));

    // Longer than the noise buffer, so the loop must wrap
    let held = graph.render_seconds(NOISE_BUFFER_SEC as f64 + 0.5);
    let tail = &held[held.len() - 4_800..];
    assert!(rms(tail) > 1e-4, "loop still sounding after wrap");
    assert_eq!(graph.active_voices(), 1);

    sfx.stop_sustained_whoosh(&mut graph).expect("stop");
    assert_eq!(sfx.sustained_direction(), None);
    let fade = graph.render_seconds(SUSTAIN_FADE_OUT_SEC + 0.01);
    assert!(rms(&fade[..480]) > 0.0, "fade-out is not an instant cut");
    assert_eq!(graph.active_voices(), 0);

    // Stopping twice is harmless
    sfx.stop_sustained_whoosh(&mut graph).expect("idempotent stop");
}

#[test]
fn replacing_the_loop_stops_the_previous_voice() {
    let mut graph = OfflineGraph::new(SR, 1.0);
    let mut sfx = SfxSynth::<OfflineGraph>::new(5);
    sfx.play_sustained_whoosh(&mut graph, Direction::Forward).expect("first");
    graph.render_seconds(0.05);
    sfx.play_sustained_whoosh(&mut graph, Direction::Backward).expect("second");
    assert_eq!(sfx.sustained_direction(), Some(Direction::Backward));

    graph.render_seconds(SUSTAIN_FADE_OUT_SEC + 0.05);
    assert_eq!(graph.active_voices(), 1, "only the replacement keeps looping");
}

#[test]
fn stopping_during_fade_in_ramps_from_the_current_level() {
    let mut graph = OfflineGraph::new(SR, 1.0);
    let mut sfx = SfxSynth::<OfflineGraph>::new(5);
    sfx.play_sustained_whoosh(&mut graph, Direction::Forward).expect("loop");
    graph.render_seconds(0.055);
    let before = graph.render_seconds(0.02);
    sfx.stop_sustained_whoosh(&mut graph).expect("stop");
    let after = graph.render_seconds(0.02);
    let ratio = rms(&after) / rms(&before);
    assert!(ratio > 0.6 && ratio < 1.6, "level jumped across the stop: {ratio}");
}

#[test]
fn program_is_scaled_by_master_gain() {
    let mut graph = OfflineGraph::new(SR, 0.5).with_program(|_| 1.0);
    let out = graph.render_seconds(0.01);
    assert!(out.iter().all(|s| (*s - 0.5).abs() < 1e-6));

    graph
        .schedule_master(ParamEvent::SetValue { value: 0.0, at: graph.current_time() })
        .expect("set");
    let out = graph.render_seconds(0.01);
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn finished_voices_are_dropped_from_the_graph() {
    let mut graph = OfflineGraph::new(SR, 1.0);
    let mut sfx = SfxSynth::<OfflineGraph>::new(1);
    sfx.play_whoosh(&mut graph, Direction::Forward, 0.1, 0.1).expect("whoosh");
    graph.render_seconds(0.2);
    assert_eq!(graph.active_voices(), 0);

    let buffer = sfx.ensure_noise_buffer(&mut graph).expect("buffer");
    let voice = graph
        .start_voice(&buffer, &VoiceSpec { looping: false, filter_q: 1.0, start_at: 0.2 })
        .expect("voice");
    assert!(graph.voice_timeline(&voice, VoiceParam::Gain).is_some());
    graph.render_seconds(NOISE_BUFFER_SEC as f64 + 0.1);
    assert!(graph.voice_timeline(&voice, VoiceParam::Gain).is_none());
    let err = graph
        .schedule_voice(&voice, VoiceParam::Gain, ParamEvent::SetValue { value: 0.5, at: 3.0 })
        .unwrap_err();
    assert!(matches!(err, AudioError::UnknownVoice(_)));
}
