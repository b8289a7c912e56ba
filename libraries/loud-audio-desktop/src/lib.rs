//! Desktop decoding and audio output for Loud
//!
//! This crate plugs the platform pieces into `loud-playback`:
//!
//! - [`SymphoniaSession`]: decoder session over a file or in-memory buffer,
//!   resampled to the output rate with rubato
//! - [`SymphoniaLoader`]: the [`SourceLoader`](loud_playback::SourceLoader)
//!   handed to the playback state machine
//! - [`probe_default_output`] and [`AudioOutput`]: the CPAL stream that
//!   pulls from the render engine
//!
//! # Example
//!
//! ```no_run
//! use loud_audio_desktop::{probe_default_output, AudioOutput, SymphoniaLoader};
//! use loud_playback::{PlaybackConfig, PlaybackManager, RenderEngine};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = probe_default_output();
//! let loader = Arc::new(SymphoniaLoader::new(spec.sample_rate));
//! let manager = PlaybackManager::new(PlaybackConfig::default(), loader);
//!
//! let engine = RenderEngine::new(manager.clone(), spec.channels);
//! let _output = AudioOutput::start(spec, engine)?;
//!
//! manager.play_file("/music/song.flac");
//! # Ok(())
//! # }
//! ```

mod device;
mod error;
mod loader;
mod output;
pub mod sources;

pub use device::{probe_default_output, OutputSpec};
pub use error::{AudioError, Result};
pub use loader::SymphoniaLoader;
pub use output::AudioOutput;
pub use sources::SymphoniaSession;
