//! Playback state machine
//!
//! [`PlaybackManager`] is the single synchronization point between the
//! control thread (commands) and the render thread (end of track).
//!
//! Two locks are involved:
//! - the state lock guards now-playing, queue, history, mode, session and
//!   volume. Every hold is short.
//! - the transition lock serializes track changes. Control operations block
//!   on it; the render thread only ever `try_lock`s it.
//!
//! Track changes are two-phase: decide under the state lock, open the new
//! session with no lock held, then commit under the state lock. Replaced
//! sessions are dropped after the state lock is released.

use crate::error::{PlaybackError, Result};
use crate::library::collect_audio_files;
use crate::playlist::Playlist;
use crate::shuffle::shuffle_tracks;
use crate::source::{AudioSource, SourceLoader};
use crate::state::PlayerState;
use crate::types::{AdvanceMode, PlaybackConfig, PlayerSnapshot, TrackRef};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use tracing::{debug, info, warn};

/// Result of [`PlaybackManager::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A queued track was loaded
    Advanced(TrackRef),

    /// Queue exhausted (or every remaining entry was unplayable)
    NothingToPlay,
}

/// Result of end-of-track handling, consumed by the render engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEndOutcome {
    /// A new session is live; the caller may read from it
    Loaded,

    /// No follow-up track; the caller emits silence
    Declined,

    /// A control-thread transition is in flight; retry on the next callback
    Deferred,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Forward,
    Back,
}

struct Shared {
    state: Mutex<PlayerState>,
    transition: Mutex<()>,
    loader: Arc<dyn SourceLoader>,
    shutdown: AtomicBool,
}

/// Shared handle to the playback state machine
///
/// Cheap to clone. The composition root creates one and hands clones to
/// the command dispatcher and the render engine.
#[derive(Clone)]
pub struct PlaybackManager {
    shared: Arc<Shared>,
}

impl PlaybackManager {
    /// Create new playback manager
    pub fn new(config: PlaybackConfig, loader: Arc<dyn SourceLoader>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PlayerState::new(&config)),
                transition: Mutex::new(()),
                loader,
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    // ===== Playback Control =====

    /// Replace playback with a single file
    ///
    /// Clears the queue, retires the current track to history and switches
    /// to manual mode. A missing or undecodable file leaves everything
    /// untouched.
    pub fn play_file(&self, path: impl AsRef<Path>) {
        let _transition = self.begin_transition();
        let track = TrackRef::from(path.as_ref());

        let Some(session) = self.open(&track) else {
            return;
        };

        let retired = {
            let mut state = self.lock_state();
            state.queue.clear();
            state.playlist = None;
            state.retire_now_playing();
            state.mode = AdvanceMode::Manual;
            state.install(track.clone(), session)
        };
        drop(retired);

        info!("Playing {}", track);
    }

    /// Replace playback with a shuffled directory
    ///
    /// The first playable shuffled file starts immediately, the rest are
    /// queued behind it in shuffled order. No-op when the directory holds
    /// nothing playable.
    pub fn play_directory(&self, path: impl AsRef<Path>) {
        let _transition = self.begin_transition();
        let mut candidates = match shuffled_directory(path.as_ref()) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Cannot play {}: {}", path.as_ref().display(), e);
                return;
            }
        };

        let Some((track, session)) = self.open_first(&mut candidates) else {
            warn!("Nothing playable in {}", path.as_ref().display());
            return;
        };

        let retired = {
            let mut state = self.lock_state();
            state.queue.clear();
            state.queue.extend(candidates);
            state.playlist = None;
            state.retire_now_playing();
            state.mode = AdvanceMode::Queue;
            state.install(track.clone(), session)
        };
        drop(retired);

        info!("Playing {} (directory, {} queued)", track, self.queue_len());
    }

    /// Append a file to the queue
    ///
    /// Starts it straight away when nothing is playing; otherwise the queue
    /// continues after the current track.
    pub fn enqueue_file(&self, path: impl AsRef<Path>) {
        let _transition = self.begin_transition();
        let track = TrackRef::from(path.as_ref());

        if !track.exists() {
            warn!("Cannot enqueue {}: not found", track);
            return;
        }

        self.enqueue_and_maybe_start(vec![track]);
    }

    /// Append a shuffled directory listing to the queue
    pub fn enqueue_directory(&self, path: impl AsRef<Path>) {
        let _transition = self.begin_transition();
        let tracks = match shuffled_directory(path.as_ref()) {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("Cannot enqueue {}: {}", path.as_ref().display(), e);
                return;
            }
        };

        self.enqueue_and_maybe_start(tracks);
    }

    /// Pop the queue front and load it
    ///
    /// Unplayable entries are skipped, at most once per entry present on
    /// entry. When the queue runs dry the mode drops back to manual.
    pub fn advance(&self) -> AdvanceOutcome {
        let _transition = self.begin_transition();
        self.advance_locked()
    }

    /// Skip to the next queued track; no-op on an empty queue
    pub fn next(&self) -> AdvanceOutcome {
        let _transition = self.begin_transition();
        if self.lock_state().queue.is_empty() {
            debug!("Next ignored: queue empty");
            return AdvanceOutcome::NothingToPlay;
        }
        self.advance_locked()
    }

    /// Go back to the most recent history entry
    ///
    /// The bumped current track goes to the queue front so it resumes next.
    /// A history entry that no longer opens is discarded.
    pub fn previous(&self) {
        let _transition = self.begin_transition();

        let Some(candidate) = self.lock_state().history.peek().cloned() else {
            debug!("Previous ignored: history empty");
            return;
        };

        let Some((session, playlist)) = self.open_entry(&candidate) else {
            self.lock_state().history.pop();
            return;
        };

        let retired = {
            let mut state = self.lock_state();
            state.history.pop();
            if let Some(current) = state.now_playing.take() {
                state.queue.push_front(current);
            }
            state.playlist = playlist;
            state.mode = AdvanceMode::Queue;
            state.install(candidate.clone(), session)
        };
        drop(retired);

        info!("Playing {} (previous)", candidate);
    }

    /// Unload the session and go silent; queue and history are kept
    pub fn stop(&self) {
        let _transition = self.begin_transition();
        let retired = {
            let mut state = self.lock_state();
            state.mode = AdvanceMode::Manual;
            state.paused = false;
            state.playlist = None;
            state.unload()
        };
        if retired.is_some() {
            info!("Stopped");
        }
    }

    /// Clear everything and request shutdown
    ///
    /// The owner of the audio output observes
    /// [`is_shutdown_requested`](Self::is_shutdown_requested) and releases
    /// the device.
    pub fn quit(&self) {
        let _transition = self.begin_transition();
        let retired = {
            let mut state = self.lock_state();
            state.queue.clear();
            state.history.clear();
            state.playlist = None;
            state.mode = AdvanceMode::Manual;
            state.paused = false;
            state.unload()
        };
        drop(retired);

        self.shared.shutdown.store(true, Ordering::SeqCst);
        info!("Shutdown requested");
    }

    /// Play a literal path, bypassing the queue
    ///
    /// An existing path becomes now-playing in manual mode. Loading is then
    /// attempted regardless: a directory becomes a shuffled playlist, a file
    /// is opened directly, and a failed load leaves the engine silent.
    pub fn play_legacy(&self, path: impl AsRef<Path>) {
        let _transition = self.begin_transition();
        let track = TrackRef::from(path.as_ref());
        let exists = track.exists();

        let mut empty_directory = false;
        let loaded = if track.is_dir() {
            match self.open_directory(track.path()) {
                Ok((session, list)) => Some((session, Some(list))),
                Err(e) => {
                    warn!("Cannot play {}: {}", track, e);
                    empty_directory = matches!(e, PlaybackError::EmptyDirectory(_));
                    None
                }
            }
        } else {
            self.open(&track).map(|session| (session, None))
        };

        let retired = {
            let mut state = self.lock_state();
            if exists {
                state.retire_now_playing();
                state.now_playing = Some(track.clone());
                state.mode = AdvanceMode::Manual;
            }

            match loaded {
                Some((session, playlist)) => {
                    state.playlist = playlist;
                    let current = state.now_playing.clone().unwrap_or_else(|| track.clone());
                    state.install(current, session)
                }
                None if empty_directory => {
                    // Paused with nothing to play until the next command
                    state.playlist = None;
                    let retired = state.session.take();
                    state.paused = true;
                    retired
                }
                None => {
                    state.playlist = None;
                    state.unload()
                }
            }
        };
        drop(retired);

        info!("Legacy play {}", track);
    }

    /// Pause output; the session is kept
    pub fn pause(&self) {
        self.lock_state().paused = true;
    }

    /// Resume output after [`pause`](Self::pause)
    pub fn resume(&self) {
        self.lock_state().paused = false;
    }

    /// Cycle the directory playlist forward; no-op without one
    pub fn playlist_next(&self) -> bool {
        let _transition = self.begin_transition();
        self.step_playlist(Step::Forward)
    }

    /// Cycle the directory playlist backward; no-op without one
    pub fn playlist_previous(&self) -> bool {
        let _transition = self.begin_transition();
        self.step_playlist(Step::Back)
    }

    // ===== Volume =====

    /// Set linear volume, clamped to `[0.0, 1.0]`
    pub fn set_volume(&self, volume: f32) {
        self.lock_state().volume.set(volume);
    }

    pub fn volume(&self) -> f32 {
        self.lock_state().volume.gain()
    }

    // ===== End of Track =====

    /// React to the live session running dry
    ///
    /// Called by the render engine with the state lock released. Never
    /// blocks on a control-thread transition.
    pub fn handle_track_end(&self) -> TrackEndOutcome {
        let _transition = match self.shared.transition.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return TrackEndOutcome::Deferred,
        };

        let continue_queue = {
            let mut state = self.lock_state();
            if state.session.is_none() {
                return TrackEndOutcome::Declined;
            }
            if !state.track_ended {
                // Replaced while the lock was released
                return TrackEndOutcome::Loaded;
            }
            if !state.end_reported {
                state.end_reported = true;
                debug!(
                    "Track finished: {}",
                    state
                        .now_playing
                        .as_ref()
                        .map_or_else(String::new, ToString::to_string)
                );
            }

            if state.mode == AdvanceMode::Queue && !state.queue.is_empty() {
                true
            } else {
                state.mode = AdvanceMode::Manual;
                false
            }
        };

        if continue_queue {
            return match self.advance_locked() {
                AdvanceOutcome::Advanced(_) => TrackEndOutcome::Loaded,
                AdvanceOutcome::NothingToPlay => TrackEndOutcome::Declined,
            };
        }

        let cycle_playlist = self
            .lock_state()
            .playlist
            .as_ref()
            .is_some_and(|list| list.len() > 1);

        if !cycle_playlist {
            return TrackEndOutcome::Declined;
        }
        if self.step_playlist(Step::Forward) {
            return TrackEndOutcome::Loaded;
        }

        // Nothing in the playlist opens any more; stop retrying every callback
        let retired = {
            let mut state = self.lock_state();
            state.playlist = None;
            state.unload()
        };
        drop(retired);
        TrackEndOutcome::Declined
    }

    // ===== State Access =====

    /// Copy of the current state for inspection
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.lock_state().snapshot()
    }

    pub fn now_playing(&self) -> Option<TrackRef> {
        self.lock_state().now_playing.clone()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    /// Lock the shared state, recovering from a poisoned lock
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, PlayerState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Internals =====

    fn begin_transition(&self) -> MutexGuard<'_, ()> {
        self.shared
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn queue_len(&self) -> usize {
        self.lock_state().queue.len()
    }

    /// Open a session, logging and swallowing failures
    fn open(&self, track: &TrackRef) -> Option<Box<dyn AudioSource>> {
        if !track.exists() {
            warn!("Not found: {}", track);
            return None;
        }
        match self.shared.loader.open(track) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Failed to open {}: {}", track, e);
                None
            }
        }
    }

    /// Open the first playable candidate, removing it and any unplayable
    /// entries before it
    fn open_first(
        &self,
        candidates: &mut Vec<TrackRef>,
    ) -> Option<(TrackRef, Box<dyn AudioSource>)> {
        while !candidates.is_empty() {
            let track = candidates.remove(0);
            if let Some(session) = self.open(&track) {
                return Some((track, session));
            }
        }
        None
    }

    /// Open a history or queue entry
    ///
    /// Directories get there through legacy play and reopen as a freshly
    /// shuffled playlist.
    fn open_entry(&self, track: &TrackRef) -> Option<(Box<dyn AudioSource>, Option<Playlist>)> {
        if !track.is_dir() {
            return self.open(track).map(|session| (session, None));
        }
        match self.open_directory(track.path()) {
            Ok((session, list)) => Some((session, Some(list))),
            Err(e) => {
                warn!("Cannot play {}: {}", track, e);
                None
            }
        }
    }

    /// Shuffle a directory into a playlist and open its first playable entry
    fn open_directory(&self, dir: &Path) -> Result<(Box<dyn AudioSource>, Playlist)> {
        let mut list = Playlist::new(shuffled_directory(dir)?);
        match self.open_playlist_entry(&mut list, Step::Forward, true) {
            Some((_, session)) => Ok((session, list)),
            None => Err(PlaybackError::AudioSource(format!(
                "nothing playable in {}",
                dir.display()
            ))),
        }
    }

    /// Queue tracks and start playback if idle (transition lock held)
    fn enqueue_and_maybe_start(&self, tracks: Vec<TrackRef>) {
        let count = tracks.len();
        let idle = {
            let mut state = self.lock_state();
            state.queue.extend(tracks);
            let idle = state.now_playing.is_none();
            if !idle {
                state.mode = AdvanceMode::Queue;
            }
            idle
        };

        info!("Queued {} track(s)", count);

        if idle {
            self.advance_locked();
        }
    }

    /// Body of [`advance`](Self::advance) (transition lock held)
    fn advance_locked(&self) -> AdvanceOutcome {
        let attempts = self.queue_len();

        for _ in 0..attempts {
            let Some(track) = self.lock_state().queue.pop_front() else {
                break;
            };

            let Some((session, playlist)) = self.open_entry(&track) else {
                continue;
            };

            let retired = {
                let mut state = self.lock_state();
                state.retire_now_playing();
                state.playlist = playlist;
                state.mode = AdvanceMode::Queue;
                state.install(track.clone(), session)
            };
            drop(retired);

            info!("Playing {} (queue)", track);
            return AdvanceOutcome::Advanced(track);
        }

        self.lock_state().mode = AdvanceMode::Manual;
        debug!("Queue exhausted");
        AdvanceOutcome::NothingToPlay
    }

    /// Move through a playlist until an entry opens, at most one lap
    ///
    /// With `include_current` the current entry is tried first.
    fn open_playlist_entry(
        &self,
        list: &mut Playlist,
        step: Step,
        include_current: bool,
    ) -> Option<(TrackRef, Box<dyn AudioSource>)> {
        for attempt in 0..list.len() {
            let candidate = if include_current && attempt == 0 {
                list.current()
            } else {
                match step {
                    Step::Forward => list.advance(),
                    Step::Back => list.retreat(),
                }
            };
            let Some(track) = candidate.cloned() else {
                break;
            };
            if let Some(session) = self.open(&track) {
                return Some((track, session));
            }
        }
        None
    }

    /// Cycle the active playlist (transition lock held)
    fn step_playlist(&self, step: Step) -> bool {
        let Some(mut list) = self.lock_state().playlist.take() else {
            return false;
        };

        let loaded = self.open_playlist_entry(&mut list, step, false);

        let retired = {
            let mut state = self.lock_state();
            match loaded {
                Some((track, session)) => {
                    info!("Playing {} (playlist {}/{})", track, list.index() + 1, list.len());
                    state.playlist = Some(list);
                    Some(state.install(track, session))
                }
                None => {
                    warn!("No playable entries left in playlist");
                    state.playlist = Some(list);
                    None
                }
            }
        };

        match retired {
            Some(old) => {
                drop(old);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for PlaybackManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackManager")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// Audio files directly inside `dir`, in random order
fn shuffled_directory(dir: &Path) -> Result<Vec<TrackRef>> {
    let mut tracks = collect_audio_files(dir)?;
    if tracks.is_empty() {
        return Err(PlaybackError::EmptyDirectory(dir.display().to_string()));
    }
    shuffle_tracks(&mut tracks);
    Ok(tracks)
}
