pub mod audio;
pub mod constants;
pub mod effects;
pub mod engine;
pub mod error;
pub mod gain;
pub mod offline;
pub mod playlist;
pub mod scene;
pub mod scrub;
pub mod session;
pub mod sfx;
pub mod skip;
pub mod starfield;
pub mod timers;
pub mod transport;
pub mod warp;

pub use audio::*;
pub use constants::*;
pub use effects::*;
pub use engine::*;
pub use error::*;
pub use gain::*;
pub use offline::*;
pub use playlist::*;
pub use scene::*;
pub use scrub::*;
pub use session::*;
pub use sfx::*;
pub use skip::*;
pub use starfield::*;
pub use timers::*;
pub use transport::*;
pub use warp::*;
