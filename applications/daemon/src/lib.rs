//! Loud Daemon Library
//!
//! Background audio player controlled by single UDP text messages.
//!
//! The composition root [`run`] owns everything: one [`PlaybackManager`]
//! shared by the [`Dispatcher`] (network side) and the render engine
//! (audio side), the audio output, and the control socket.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod listener;

pub use command::Command;
pub use config::{DaemonConfig, DEFAULT_CONTROL_PORT};
pub use dispatcher::Dispatcher;
pub use error::{DaemonError, Result};
pub use listener::{ControlListener, MAX_MESSAGE_LEN};

use anyhow::Context;
use loud_audio_desktop::{probe_default_output, AudioOutput, SymphoniaLoader};
use loud_playback::{PlaybackManager, RenderEngine};
use std::sync::Arc;
use tracing::info;

/// Run the daemon until `q`, Ctrl+C or SIGTERM
pub async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    config.validate()?;

    let spec = probe_default_output();
    let loader = Arc::new(SymphoniaLoader::new(spec.sample_rate));
    let manager = PlaybackManager::new(config.playback_config(), loader);

    let addr = config.control_addr();
    let listener = ControlListener::bind(addr, Dispatcher::new(manager.clone()))
        .await
        .with_context(|| format!("Failed to bind control socket on {}", addr))?;

    let engine = RenderEngine::new(manager.clone(), spec.channels);
    let mut output = AudioOutput::start(spec, engine).context("Failed to start audio output")?;

    listener.run().await?;

    if !manager.is_shutdown_requested() {
        manager.stop();
    }
    output.shutdown();

    info!("Daemon stopped");
    Ok(())
}
