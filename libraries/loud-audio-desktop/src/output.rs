/// CPAL-based audio output driven by the render engine
use crate::device::OutputSpec;
use crate::error::{AudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use loud_playback::{RenderEngine, MAX_BLOCK_FRAMES};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Commands sent to the audio thread
enum AudioCommand {
    /// Stop the stream and exit the audio thread
    Shutdown,
}

/// Live output stream
///
/// **Architecture**: a dedicated audio thread owns the CPAL `Stream`, which
/// is not `Send` on every platform. The handle talks to it over a channel
/// and shuts it down on drop, releasing the device.
pub struct AudioOutput {
    command_tx: Sender<AudioCommand>,
    spec: OutputSpec,
    audio_thread: Option<JoinHandle<()>>,
}

impl AudioOutput {
    /// Open the default device and start pulling from `engine`
    ///
    /// Blocks until the stream is playing or has failed to start.
    pub fn start(spec: OutputSpec, engine: RenderEngine) -> Result<Self> {
        let (command_tx, command_rx) = bounded::<AudioCommand>(4);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let audio_thread = thread::Builder::new()
            .name("loud-audio".into())
            .spawn(move || Self::audio_thread_run(spec, engine, &ready_tx, &command_rx))
            .map_err(|e| AudioError::CpalError(format!("Failed to spawn audio thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!(
                    "Audio output started: {} ch, {} Hz, {:?}",
                    spec.channels, spec.sample_rate, spec.sample_format
                );
                Ok(Self {
                    command_tx,
                    spec,
                    audio_thread: Some(audio_thread),
                })
            }
            Ok(Err(e)) => {
                let _ = audio_thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = audio_thread.join();
                Err(AudioError::ThreadExited)
            }
        }
    }

    pub fn spec(&self) -> OutputSpec {
        self.spec
    }

    /// Stop the stream and wait for the audio thread to exit
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            if handle.join().is_err() {
                error!("Audio thread panicked");
            }
            debug!("Audio output closed");
        }
    }

    /// Audio thread main loop
    ///
    /// Builds and starts the stream, reports the outcome, then parks on the
    /// command channel until shutdown.
    fn audio_thread_run(
        spec: OutputSpec,
        engine: RenderEngine,
        ready_tx: &Sender<Result<()>>,
        command_rx: &Receiver<AudioCommand>,
    ) {
        let stream = match Self::open_stream(spec, engine) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        if ready_tx.send(Ok(())).is_err() {
            return;
        }

        // Any command (or a dropped handle) ends the stream
        match command_rx.recv() {
            Ok(AudioCommand::Shutdown) | Err(_) => {}
        }

        drop(stream);
    }

    fn open_stream(spec: OutputSpec, engine: RenderEngine) -> Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let config = StreamConfig {
            channels: spec.channels as u16,
            sample_rate: spec.sample_rate,
            buffer_size: BufferSize::Default,
        };

        let stream = match spec.sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, engine)?,
            SampleFormat::F64 => Self::build_stream::<f64>(&device, &config, engine)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, engine)?,
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &config, engine)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, engine)?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };

        stream.play()?;
        Ok(stream)
    }

    /// Build a stream for device sample type `T`
    ///
    /// The engine renders `f32` into a scratch buffer allocated here, then
    /// each block is converted into the device buffer.
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        mut engine: RenderEngine,
    ) -> std::result::Result<Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let channels = usize::from(config.channels).max(1);
        let mut scratch = vec![0.0f32; MAX_BLOCK_FRAMES * channels];

        device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for block in data.chunks_mut(scratch.len()) {
                    let rendered = &mut scratch[..block.len()];
                    engine.render(rendered);
                    for (out, sample) in block.iter_mut().zip(rendered.iter()) {
                        *out = T::from_sample(*sample);
                    }
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.shutdown();
    }
}
