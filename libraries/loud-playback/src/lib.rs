//! Loud - Playback Management
//!
//! Platform-agnostic core of the loud daemon.
//!
//! This crate provides:
//! - The playback state machine (now-playing, queue, bounded history)
//! - Shuffled directory playback and directory-shuffle playlists
//! - The realtime render engine (channel mapping, volume, end-of-track)
//! - Decoder session traits implemented by platform crates
//!
//! # Architecture
//!
//! `loud-playback` has no dependency on an audio device or codec library.
//! Decoding is plugged in through [`SourceLoader`]; the audio backend pulls
//! samples through [`RenderEngine::render`].
//!
//! # Example
//!
//! ```rust
//! use loud_playback::{
//!     AudioSource, MemorySource, PlaybackConfig, PlaybackManager, RenderEngine, Result,
//!     SourceLoader, TrackRef,
//! };
//! use std::sync::Arc;
//!
//! struct ToneLoader;
//!
//! impl SourceLoader for ToneLoader {
//!     fn open(&self, _track: &TrackRef) -> Result<Box<dyn AudioSource>> {
//!         Ok(Box::new(MemorySource::constant(0.1, 44_100, 2, 44_100)))
//!     }
//! }
//!
//! let manager = PlaybackManager::new(PlaybackConfig::default(), Arc::new(ToneLoader));
//! let mut engine = RenderEngine::new(manager.clone(), 2);
//!
//! manager.play_file("/music/song.mp3"); // no-op unless the file exists
//! manager.set_volume(0.8);
//!
//! let mut buffer = vec![0.0f32; 512];
//! engine.render(&mut buffer);
//! ```

pub mod channels;
pub mod error;
pub mod history;
pub mod library;
pub mod manager;
pub mod playlist;
pub mod queue;
pub mod render;
pub mod shuffle;
pub mod source;
mod state;
pub mod types;
pub mod volume;

pub use channels::{map_channels, MAX_CHANNELS};
pub use error::{PlaybackError, Result};
pub use history::History;
pub use library::{collect_audio_files, is_audio_file, AUDIO_EXTENSIONS};
pub use manager::{AdvanceOutcome, PlaybackManager, TrackEndOutcome};
pub use playlist::Playlist;
pub use queue::Queue;
pub use render::{RenderEngine, MAX_BLOCK_FRAMES};
pub use source::{AudioSource, MemorySource, SourceLoader};
pub use types::{AdvanceMode, PlaybackConfig, PlayerSnapshot, TrackRef, DEFAULT_HISTORY_SIZE};
pub use volume::Volume;
