/// Sender error types
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SenderError>;

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("Daemon executable not found next to {0}")]
    DaemonNotFound(PathBuf),

    #[error("Failed to launch daemon: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Daemon did not start listening on port {port}")]
    NotReady { port: u16 },

    #[error("Failed to send command: {0}")]
    Send(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] loud_daemon::DaemonError),
}
