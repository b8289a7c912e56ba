//! Platform-agnostic decoder session traits
//!
//! Abstracts audio decoding so the state machine and render engine never
//! depend on a codec library directly.

use crate::error::Result;
use crate::types::TrackRef;

/// A live decode context bound to exactly one audio source
///
/// Produces interleaved `f32` frames at the engine's output sample rate and
/// the source's native channel count. Sessions are replaced wholesale on
/// every track change, never rewound or reconfigured.
pub trait AudioSource: Send {
    /// Channels per frame in the buffers filled by [`read_frames`](Self::read_frames)
    fn channels(&self) -> usize;

    /// Rate of the produced frames in Hz
    fn sample_rate(&self) -> u32;

    /// Fill `buffer` with whole interleaved frames
    ///
    /// Reads at most `buffer.len() / channels()` frames and returns how many
    /// were written. A count below the request signals end of stream.
    fn read_frames(&mut self, buffer: &mut [f32]) -> Result<usize>;
}

/// Opens decoder sessions for track references
///
/// Called outside the state lock, so implementations may touch the
/// filesystem and do arbitrary setup work.
pub trait SourceLoader: Send + Sync {
    fn open(&self, track: &TrackRef) -> Result<Box<dyn AudioSource>>;
}

/// Pre-decoded PCM held in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
    position: usize,
}

impl MemorySource {
    /// Wrap interleaved samples; a trailing partial frame is dropped
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let mut samples = samples;
        samples.truncate(samples.len() - samples.len() % channels);
        Self {
            samples,
            channels,
            sample_rate,
            position: 0,
        }
    }

    /// Constant-valued source, handy for tracing which track was rendered
    pub fn constant(value: f32, frames: usize, channels: usize, sample_rate: u32) -> Self {
        Self::new(vec![value; frames * channels.max(1)], channels, sample_rate)
    }

    pub fn frames_remaining(&self) -> usize {
        (self.samples.len() - self.position) / self.channels
    }
}

impl AudioSource for MemorySource {
    fn channels(&self) -> usize {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_frames(&mut self, buffer: &mut [f32]) -> Result<usize> {
        let frames = (buffer.len() / self.channels).min(self.frames_remaining());
        let count = frames * self.channels;
        buffer[..count].copy_from_slice(&self.samples[self.position..self.position + count]);
        self.position += count;
        Ok(frames)
    }
}
