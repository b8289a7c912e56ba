// loud-audio-desktop/src/device.rs
//
// Default output device probing

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::SampleFormat;
use tracing::{info, warn};

/// Shape of the stream the output will open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    pub channels: usize,
    pub sample_rate: u32,
    pub sample_format: SampleFormat,
}

impl OutputSpec {
    /// Used when the device cannot describe itself
    pub const FALLBACK: Self = Self {
        channels: 2,
        sample_rate: 44100,
        sample_format: SampleFormat::F32,
    };
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Ask the default output device for its native layout
///
/// Falls back to stereo at 44.1 kHz when there is no default device or it
/// reports no usable configuration. Whether a stream can actually be opened
/// is decided later by [`AudioOutput::start`](crate::AudioOutput::start).
pub fn probe_default_output() -> OutputSpec {
    let host = cpal::default_host();

    let Some(device) = host.default_output_device() else {
        warn!("No default output device; assuming stereo 44100 Hz");
        return OutputSpec::FALLBACK;
    };

    match device.default_output_config() {
        Ok(config) if config.channels() > 0 => {
            let spec = OutputSpec {
                channels: usize::from(config.channels()),
                sample_rate: config.sample_rate(),
                sample_format: config.sample_format(),
            };
            info!(
                "Detected {} output channels at {} Hz ({:?})",
                spec.channels, spec.sample_rate, spec.sample_format
            );
            spec
        }
        Ok(_) => {
            warn!("Output device reports no channels; assuming stereo 44100 Hz");
            OutputSpec::FALLBACK
        }
        Err(e) => {
            warn!("Could not query output device ({}); assuming stereo 44100 Hz", e);
            OutputSpec::FALLBACK
        }
    }
}
