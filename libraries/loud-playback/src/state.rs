//! Shared player state guarded by the manager's state lock

use crate::history::History;
use crate::playlist::Playlist;
use crate::queue::Queue;
use crate::source::AudioSource;
use crate::types::{AdvanceMode, PlaybackConfig, PlayerSnapshot, TrackRef};
use crate::volume::Volume;

pub(crate) struct PlayerState {
    pub(crate) now_playing: Option<TrackRef>,
    pub(crate) queue: Queue,
    pub(crate) history: History,
    pub(crate) mode: AdvanceMode,
    pub(crate) session: Option<Box<dyn AudioSource>>,
    pub(crate) playlist: Option<Playlist>,
    pub(crate) volume: Volume,
    pub(crate) paused: bool,

    /// Set by the render engine when the live session came up short
    pub(crate) track_ended: bool,

    /// Whether the current end of track has been logged
    pub(crate) end_reported: bool,
}

impl PlayerState {
    pub(crate) fn new(config: &PlaybackConfig) -> Self {
        Self {
            now_playing: None,
            queue: Queue::new(),
            history: History::new(config.history_size),
            mode: AdvanceMode::Manual,
            session: None,
            playlist: None,
            volume: Volume::new(config.volume),
            paused: false,
            track_ended: false,
            end_reported: false,
        }
    }

    /// Move the current track (if any) into history
    pub(crate) fn retire_now_playing(&mut self) {
        if let Some(current) = self.now_playing.take() {
            self.history.push(current);
        }
    }

    /// Swap in a freshly opened session
    ///
    /// Returns the replaced session so the caller can drop it after
    /// releasing the lock.
    pub(crate) fn install(
        &mut self,
        track: TrackRef,
        session: Box<dyn AudioSource>,
    ) -> Option<Box<dyn AudioSource>> {
        self.now_playing = Some(track);
        self.paused = false;
        self.track_ended = false;
        self.end_reported = false;
        self.session.replace(session)
    }

    /// Drop to silence, returning the old session
    pub(crate) fn unload(&mut self) -> Option<Box<dyn AudioSource>> {
        self.now_playing = None;
        self.track_ended = false;
        self.end_reported = false;
        self.session.take()
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            now_playing: self.now_playing.clone(),
            queue: self.queue.iter().cloned().collect(),
            history: self.history.iter().cloned().collect(),
            mode: self.mode,
            volume: self.volume.gain(),
            paused: self.paused,
            has_session: self.session.is_some(),
            playlist_len: self.playlist.as_ref().map_or(0, Playlist::len),
        }
    }
}
