/// Daemon configuration
use crate::error::{DaemonError, Result};
use loud_playback::{PlaybackConfig, DEFAULT_HISTORY_SIZE};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port the daemon listens on and the sender talks to
pub const DEFAULT_CONTROL_PORT: u16 = 7001;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonConfig {
    #[serde(default = "default_control")]
    pub control: ControlSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlSettings {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Number of finished tracks kept for `p`
    #[serde(default = "default_history")]
    pub history: usize,
}

impl DaemonConfig {
    /// Load configuration from `LOUD_*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(Self::environment())
    }

    /// Load from an explicit environment source
    pub fn load_from(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(environment)
            .build()
            .map_err(|e| DaemonError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// The `LOUD_` environment source, e.g. `LOUD_CONTROL_PORT=7002`
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("LOUD")
            .separator("_")
            .try_parsing(true)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.control.port == 0 {
            return Err(DaemonError::Config(
                "Control port must be non-zero (set LOUD_CONTROL_PORT)".to_string(),
            ));
        }

        if self.playback.history == 0 || self.playback.history > DEFAULT_HISTORY_SIZE {
            return Err(DaemonError::Config(format!(
                "History size must be between 1 and {} (set LOUD_PLAYBACK_HISTORY)",
                DEFAULT_HISTORY_SIZE
            )));
        }

        if !self.playback.volume.is_finite() {
            return Err(DaemonError::Config(format!(
                "Invalid volume: {}",
                self.playback.volume
            )));
        }

        Ok(())
    }

    pub fn control_addr(&self) -> SocketAddr {
        SocketAddr::new(self.control.host, self.control.port)
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            history_size: self.playback.history,
            volume: self.playback.volume,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            control: default_control(),
            playback: default_playback(),
        }
    }
}

// Default values
fn default_control() -> ControlSettings {
    ControlSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_CONTROL_PORT
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        history: default_history(),
    }
}

fn default_volume() -> f32 {
    1.0
}

fn default_history() -> usize {
    DEFAULT_HISTORY_SIZE
}
