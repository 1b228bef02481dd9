use glam::Vec2;
use instant::Instant;
use starwarp_core::{
    AudioGraph, Direction, EffectsEngine, ManualTransport, OfflineGraph, Playlist, StarCanvas, Starfield, Transform,
    Transport, Viewport, DEFAULT_VOLUME,
};

const SAMPLE_RATE: f32 = 48_000.0;
const FRAME_DT: f64 = 1.0 / 60.0;
const RUN_SEC: f64 = 10.0;
const REPORT_EVERY_SEC: f64 = 0.25;
const PROGRAM_HZ: f64 = 220.0;

const DEMO_PLAYLIST: &str = r#"{
  "tracks": [
    {"title": "Departure", "artist": "Starwarp", "filePath": "/music/departure.mp3"},
    {"title": "Parallax", "artist": "Starwarp", "filePath": "/music/parallax.mp3"},
    {"title": "Redshift", "artist": "Starwarp", "filePath": "/music/redshift.mp3"}
  ]
}"#;

type Engine = EffectsEngine<OfflineGraph, ManualTransport>;

/// Counts draw calls instead of rasterizing.
#[derive(Default)]
struct CountingCanvas {
    clears: u64,
    dots: u64,
    lines: u64,
}

impl StarCanvas for CountingCanvas {
    fn set_transform(&mut self, _transform: &Transform) {}

    fn clear(&mut self, _width: f32, _height: f32) {
        self.clears += 1;
    }

    fn dot(&mut self, _at: Vec2, _radius: f32, _alpha: f32) {
        self.dots += 1;
    }

    fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _alpha: f32) {
        self.lines += 1;
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    SkipForward,
    BeginScrub(Direction),
    EndScrub,
    Shuffle,
    Volume(f32),
    ToggleMute,
}

// (time in seconds, action), in order
const SCRIPT: &[(f64, Action)] = &[
    (1.0, Action::SkipForward),
    (3.0, Action::BeginScrub(Direction::Backward)),
    (5.0, Action::EndScrub),
    (6.0, Action::Shuffle),
    (8.0, Action::Volume(0.2)),
    (8.5, Action::ToggleMute),
    (9.0, Action::ToggleMute),
];

fn perform(engine: &mut Engine, action: Action) -> anyhow::Result<()> {
    log::info!("[script] {action:?}");
    match action {
        Action::SkipForward => engine.skip_forward()?,
        Action::BeginScrub(direction) => {
            if !engine.begin_scrub(direction) {
                log::warn!("[script] scrub refused while another effect runs");
            }
        }
        Action::EndScrub => {
            engine.end_scrub();
        }
        Action::Shuffle => {
            if let Some(index) = engine.shuffle()? {
                log::info!("[script] shuffled to track {index}");
            }
        }
        Action::Volume(level) => engine.set_volume(level),
        Action::ToggleMute => {
            let muted = engine.toggle_mute();
            log::info!("[script] muted: {muted}");
        }
    }
    Ok(())
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut playlist = Playlist::from_json(DEMO_PLAYLIST)?;
    playlist.subscribe(|track| {
        log::info!("[now playing] {} - {}", track.artist, track.title);
        Ok(())
    });
    let mut transport = ManualTransport::new()
        .with_duration_for("/music/departure.mp3", 4.0)
        .with_duration_for("/music/parallax.mp3", 180.0)
        .with_duration_for("/music/redshift.mp3", 240.0);
    playlist.load(0, &mut transport)?;

    let seed = 0x5EED_A0D1;
    let mut field = Starfield::new(Viewport::new(1280.0, 720.0, 1.0), seed);
    let mut engine = Engine::new(field.warp_target(), transport, playlist, seed);

    let program = OfflineGraph::new(SAMPLE_RATE, DEFAULT_VOLUME)
        .with_program(|t| (t * PROGRAM_HZ * std::f64::consts::TAU).sin() as f32 * 0.5);
    engine.attach_audio(program);
    engine.transport_mut().play()?;

    let mut canvas = CountingCanvas::default();
    let mut script = SCRIPT.iter().peekable();
    let mut t = 0.0;
    let mut next_report = 0.0;
    let mut block_rms = 0.0;
    let started = Instant::now();

    while t < RUN_SEC {
        while let Some(&&(at, action)) = script.peek() {
            if at > t {
                break;
            }
            script.next();
            if let Err(e) = perform(&mut engine, action) {
                log::warn!("[script] {action:?} failed: {e}");
            }
        }

        if let Err(e) = engine.advance(FRAME_DT) {
            log::warn!("[engine] {e}");
        }
        if engine.transport_mut().advance(FRAME_DT) {
            if let Err(e) = engine.on_track_ended() {
                log::warn!("[engine] advance after track end failed: {e}");
            }
        }
        field.frame(FRAME_DT as f32, &mut canvas);
        if let Some(session) = engine.audio_mut() {
            block_rms = rms(&session.graph_mut().render_seconds(FRAME_DT));
        }

        t += FRAME_DT;
        if t >= next_report {
            next_report += REPORT_EVERY_SEC;
            let master = engine.audio().map(|s| s.graph().master_value()).unwrap_or(0.0);
            log::info!(
                "t={:5.2}s warp={:+6.2} speed={:6.2} pos={:6.2}s master={:.3} rms={:.3}",
                t,
                field.warp().current,
                field.speed(),
                engine.transport().position(),
                master,
                block_rms,
            );
        }
    }

    log::info!(
        "done: {} frames ({} trails, {} points), {} skips in {:?}",
        canvas.clears,
        canvas.lines,
        canvas.dots,
        engine.skips_started(),
        started.elapsed()
    );
    if let Some(graph) = engine.detach_audio() {
        log::info!("[audio] {} voices still active at exit", graph.active_voices());
    }
    Ok(())
}
