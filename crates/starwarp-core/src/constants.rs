// Shared visual/audio tuning constants used by the web and native frontends.

// Starfield layout
pub const STAR_COUNT: usize = 400;
pub const MAX_DEPTH: f32 = 1500.0; // depth units; stars live in [MIN_DEPTH, MAX_DEPTH]
pub const MIN_DEPTH: f32 = 1.0; // the camera plane
pub const LATERAL_SPREAD: f32 = 2.0; // x/y span +-SPREAD * viewport
pub const BRIGHTNESS_MIN: f32 = 0.4;
pub const BRIGHTNESS_MAX: f32 = 1.0;
pub const RESPAWN_NEAR_JITTER: f32 = 50.0; // depth jitter when respawning behind the camera

// Projection and motion
pub const FOCAL_LENGTH: f32 = 300.0;
pub const BASE_SPEED: f32 = 120.0; // depth units per second at warp 1
pub const WARP_EASE_RATE: f32 = 5.0; // per second
pub const MAX_FRAME_DT: f32 = 0.1; // clamp for background-tab stalls
pub const CULL_MARGIN_PX: f32 = 50.0;

// Star drawing
pub const TRAIL_FACTOR: f32 = 0.035; // trail depth per unit of speed
pub const TRAIL_MIN_PX: f32 = 1.5; // shorter trails draw as a point
pub const TRAIL_ALPHA: f32 = 0.5;
pub const HEAD_RADIUS_SCALE: f32 = 1.2;
pub const HEAD_RADIUS_MIN: f32 = 0.4;
pub const HEAD_RADIUS_MAX: f32 = 3.5;
pub const HEAD_ALPHA_SCALE: f32 = 1.5;
pub const HEAD_ALPHA_MIN: f32 = 0.15;

// Gain
pub const DEFAULT_VOLUME: f32 = 0.5;
pub const VOLUME_RAMP_SEC: f64 = 0.1;
pub const SILENCE_EPSILON: f32 = 0.005; // exponential ramps cannot reach 0

// Whoosh synthesis
pub const NOISE_BUFFER_SEC: f32 = 2.0;
pub const WHOOSH_LOW_HZ: f32 = 300.0;
pub const WHOOSH_HIGH_HZ: f32 = 3000.0;
pub const WHOOSH_Q: f32 = 1.2;
pub const WHOOSH_ATTACK_FRAC: f64 = 0.15;
pub const WHOOSH_HOLD_FRAC: f64 = 0.70;
pub const WHOOSH_HOLD_LEVEL: f32 = 0.85; // of peak, reached at WHOOSH_HOLD_FRAC
pub const SUSTAIN_VOLUME: f32 = 0.04;
pub const SUSTAIN_FORWARD_HZ: f32 = 1800.0;
pub const SUSTAIN_BACKWARD_HZ: f32 = 600.0;
pub const SUSTAIN_FADE_IN_SEC: f64 = 0.15;
pub const SUSTAIN_FADE_OUT_SEC: f64 = 0.15;

// Skip
pub const SKIP_DURATION_SEC: f64 = 1.0;
pub const SKIP_TIMEOUT_SLACK_SEC: f64 = 0.2;
pub const SKIP_WARP_FORWARD: f32 = 12.0;
pub const SKIP_WARP_BACKWARD: f32 = -10.0;
pub const SKIP_DUCK_FRACTION: f32 = 0.25;
pub const SKIP_WHOOSH_PEAK: f32 = 0.12;

// Scrub
pub const SCRUB_JUMP_SEC: f64 = 5.0;
pub const SCRUB_RATE: f64 = 10.0; // playback seconds per real second
pub const SCRUB_WARP_FORWARD: f32 = 4.0;
pub const SCRUB_WARP_BACKWARD: f32 = -4.0;
pub const SCRUB_DUCK_FRACTION: f32 = 0.4;

// Shared effect timing
pub const EFFECT_TICK_SEC: f64 = 0.05;
pub const NEUTRAL_WARP: f32 = 1.0;
