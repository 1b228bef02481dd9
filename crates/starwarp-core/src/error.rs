use thiserror::Error;

/// Failures raised by an [`AudioGraph`](crate::AudioGraph) implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    /// Exponential curves are undefined at or below zero.
    #[error("exponential ramp target must be positive, got {0}")]
    NonPositiveExponentialTarget(f32),
    #[error("unknown voice {0}")]
    UnknownVoice(usize),
    #[error("audio node error: {0}")]
    Node(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("playlist is empty")]
    EmptyPlaylist,
    #[error("track index {index} out of range ({len} tracks)")]
    TrackOutOfRange { index: usize, len: usize },
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("invalid playlist: {0}")]
    Playlist(#[from] serde_json::Error),
}
