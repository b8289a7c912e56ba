//! Symphonia-backed decoder session
//!
//! Decodes packets on demand into interleaved `f32` at the file's native
//! channel count, resampling to the output rate when the two differ.
//! Files and in-memory buffers share the same pipeline.

use loud_playback::{AudioSource, PlaybackError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Consecutive undecodable packets tolerated before giving up
const MAX_DECODE_RETRIES: usize = 3;

/// Resampler input chunk, in source frames
const RESAMPLE_CHUNK_FRAMES: usize = 1024;

struct StreamResampler {
    resampler: SincFixedIn<f32>,

    /// Interleaved source samples waiting for a full chunk
    pending: Vec<f32>,

    /// Per-channel staging for rubato's planar input
    planar: Vec<Vec<f32>>,
}

impl StreamResampler {
    fn new(source_rate: u32, target_rate: u32, channels: usize) -> Result<Self> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            f64::from(target_rate) / f64::from(source_rate),
            2.0,
            params,
            RESAMPLE_CHUNK_FRAMES,
            channels,
        )
        .map_err(|e| PlaybackError::AudioSource(format!("Failed to create resampler: {}", e)))?;

        Ok(Self {
            resampler,
            pending: Vec::new(),
            planar: vec![Vec::with_capacity(RESAMPLE_CHUNK_FRAMES); channels],
        })
    }

    /// Resample every complete chunk in `pending`, or everything at end of stream
    fn drain(&mut self, output: &mut VecDeque<f32>, flush: bool) -> Result<()> {
        let channels = self.planar.len();

        loop {
            let needed = self.resampler.input_frames_next();
            let available = self.pending.len() / channels;
            let frames = if available >= needed {
                needed
            } else if flush && available > 0 {
                available
            } else {
                return Ok(());
            };

            for (ch, plane) in self.planar.iter_mut().enumerate() {
                plane.clear();
                plane.extend(
                    self.pending[..frames * channels]
                        .iter()
                        .skip(ch)
                        .step_by(channels),
                );
            }
            self.pending.drain(..frames * channels);

            let resampled = if frames == needed {
                self.resampler.process(self.planar.as_slice(), None)
            } else {
                self.resampler
                    .process_partial(Some(self.planar.as_slice()), None)
            }
            .map_err(|e| PlaybackError::AudioSource(format!("Resampling error: {}", e)))?;

            let out_frames = resampled.first().map_or(0, Vec::len);
            for frame in 0..out_frames {
                output.extend(resampled.iter().map(|plane| plane[frame]));
            }
        }
    }
}

/// Decoder session over a file or an in-memory buffer
pub struct SymphoniaSession {
    label: String,
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: usize,
    source_sample_rate: u32,
    target_sample_rate: u32,

    sample_buf: Option<SampleBuffer<f32>>,
    resampler: Option<StreamResampler>,

    /// Decoded, resampled samples ready for the render engine
    ready: VecDeque<f32>,
    is_eof: bool,
}

impl SymphoniaSession {
    /// Open a file for playback at `target_sample_rate`
    pub fn open(path: impl AsRef<Path>, target_sample_rate: u32) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PlaybackError::AudioSource(format!("Failed to open file: {}", e)))?;

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        Self::from_source(
            Box::new(file),
            hint,
            path.display().to_string(),
            target_sample_rate,
        )
    }

    /// Decode an in-memory encoded buffer (any supported container)
    pub fn from_bytes(
        bytes: Vec<u8>,
        extension: Option<&str>,
        target_sample_rate: u32,
    ) -> Result<Self> {
        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        Self::from_source(
            Box::new(Cursor::new(bytes)),
            hint,
            "<memory>".to_string(),
            target_sample_rate,
        )
    }

    fn from_source(
        source: Box<dyn MediaSource>,
        hint: Hint,
        label: String,
        target_sample_rate: u32,
    ) -> Result<Self> {
        let mss = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PlaybackError::AudioSource(format!("Failed to probe {}: {}", label, e)))?;

        let format_reader = probed.format;
        let track = format_reader
            .default_track()
            .ok_or_else(|| PlaybackError::AudioSource("No audio tracks found".into()))?;

        let track_id = track.id;
        let source_sample_rate = track.codec_params.sample_rate.unwrap_or(target_sample_rate);
        let channels = track.codec_params.channels.map_or(0, |c| c.count());

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::AudioSource(format!("Failed to create decoder: {}", e)))?;

        let mut session = Self {
            label,
            format_reader,
            decoder,
            track_id,
            channels,
            source_sample_rate,
            target_sample_rate,
            sample_buf: None,
            resampler: None,
            ready: VecDeque::new(),
            is_eof: false,
        };

        // Some containers only reveal the layout once a packet is decoded
        if session.channels == 0 {
            session.prime()?;
        }
        if session.channels == 0 {
            return Err(PlaybackError::AudioSource(format!(
                "No decodable audio in {}",
                session.label
            )));
        }

        if source_sample_rate != target_sample_rate {
            let mut resampler =
                StreamResampler::new(source_sample_rate, target_sample_rate, session.channels)?;
            // Anything decoded while priming is still at the source rate
            resampler.pending.extend(session.ready.drain(..));
            session.resampler = Some(resampler);
        }

        debug!(
            "Opened {}: {} ch, {} Hz -> {} Hz",
            session.label, session.channels, source_sample_rate, target_sample_rate
        );

        Ok(session)
    }

    pub fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }

    pub fn needs_resampling(&self) -> bool {
        self.resampler.is_some()
    }

    fn prime(&mut self) -> Result<()> {
        while self.channels == 0 && !self.is_eof {
            self.decode_next_packet()?;
        }
        Ok(())
    }

    /// Decode one packet into the ready (or pending) buffer
    fn decode_next_packet(&mut self) -> Result<()> {
        let mut failures = 0;

        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                // End of stream, or a chained stream we do not follow
                Err(SymphoniaError::IoError(_) | SymphoniaError::ResetRequired) => {
                    return self.finish();
                }
                Err(e) => {
                    debug!("Stopping {} on read error: {}", self.label, e);
                    return self.finish();
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) if failures < MAX_DECODE_RETRIES => {
                    trace!("Skipping bad packet in {}: {}", self.label, e);
                    failures += 1;
                    continue;
                }
                Err(e) => {
                    debug!("Stopping {} on decode error: {}", self.label, e);
                    return self.finish();
                }
            };

            let spec = *decoded.spec();
            if self.channels == 0 {
                self.channels = spec.channels.count();
            }

            let needs_new_buffer = self
                .sample_buf
                .as_ref()
                .map_or(true, |buf| buf.capacity() < decoded.capacity() * spec.channels.count());
            if needs_new_buffer {
                self.sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
            }

            if let Some(buf) = self.sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                match self.resampler.as_mut() {
                    Some(resampler) => {
                        resampler.pending.extend_from_slice(buf.samples());
                        resampler.drain(&mut self.ready, false)?;
                    }
                    None => self.ready.extend(buf.samples().iter().copied()),
                }
            }

            return Ok(());
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.is_eof = true;
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.drain(&mut self.ready, true)?;
        }
        Ok(())
    }
}

impl AudioSource for SymphoniaSession {
    fn channels(&self) -> usize {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    fn read_frames(&mut self, buffer: &mut [f32]) -> Result<usize> {
        let wanted = (buffer.len() / self.channels) * self.channels;

        while self.ready.len() < wanted && !self.is_eof {
            self.decode_next_packet()?;
        }

        let available = (self.ready.len() / self.channels) * self.channels;
        let count = wanted.min(available);
        for (dst, src) in buffer[..count].iter_mut().zip(self.ready.drain(..count)) {
            *dst = src;
        }

        Ok(count / self.channels)
    }
}
