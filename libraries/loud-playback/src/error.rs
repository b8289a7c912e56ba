//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Track reference does not point at anything on disk
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Directory holds no recognised audio files
    #[error("No audio files in directory: {0}")]
    EmptyDirectory(String),

    /// Source declares more channels than the render scratch can hold
    #[error("Unsupported channel count: {channels} (max {max})")]
    TooManyChannels { channels: usize, max: usize },

    /// Audio source error
    #[error("Audio source error: {0}")]
    AudioSource(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
