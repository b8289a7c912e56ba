//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default bound on the number of remembered tracks
pub const DEFAULT_HISTORY_SIZE: usize = 20;

/// Reference to a decodable audio source on disk
///
/// Opaque beyond an existence check at load time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(PathBuf);

impl TrackRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// True for the empty reference, which is never recorded in history
    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    pub fn exists(&self) -> bool {
        !self.is_empty() && self.0.exists()
    }

    pub fn is_dir(&self) -> bool {
        !self.is_empty() && self.0.is_dir()
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for TrackRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for TrackRef {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for TrackRef {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

/// How the end of a track is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceMode {
    /// Track was set explicitly; silence follows it
    #[default]
    Manual,

    /// End of track pulls the next entry from the queue
    Queue,
}

/// Configuration for the playback manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 20)
    pub history_size: usize,

    /// Initial linear volume (0.0-1.0, default: 1.0)
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            volume: 1.0,
        }
    }
}

/// Point-in-time copy of the player state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub now_playing: Option<TrackRef>,

    /// Pending tracks, front first
    pub queue: Vec<TrackRef>,

    /// Recently played tracks, most recent first
    pub history: Vec<TrackRef>,

    pub mode: AdvanceMode,
    pub volume: f32,
    pub paused: bool,

    /// Whether a decoder session is loaded
    pub has_session: bool,

    /// Entries in the active directory playlist (0 when none)
    pub playlist_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.history_size, 20);
        assert_eq!(config.volume, 1.0);
    }

    #[test]
    fn default_mode_is_manual() {
        assert_eq!(AdvanceMode::default(), AdvanceMode::Manual);
    }

    #[test]
    fn empty_track_ref_never_exists() {
        let track = TrackRef::from("");
        assert!(track.is_empty());
        assert!(!track.exists());
        assert!(!track.is_dir());
    }

    #[test]
    fn track_ref_display_is_path() {
        let track = TrackRef::from("/music/song.mp3");
        assert_eq!(track.to_string(), "/music/song.mp3");
    }

    #[test]
    fn snapshot_serializes_paths_as_strings() {
        let snapshot = PlayerSnapshot {
            now_playing: Some(TrackRef::from("/a.mp3")),
            queue: vec![TrackRef::from("/b.mp3")],
            history: Vec::new(),
            mode: AdvanceMode::Queue,
            volume: 0.5,
            paused: false,
            has_session: true,
            playlist_len: 0,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["now_playing"], "/a.mp3");
        assert_eq!(json["queue"][0], "/b.mp3");
        assert_eq!(json["mode"], "Queue");
    }
}
