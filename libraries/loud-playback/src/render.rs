//! Realtime render engine
//!
//! Pulled by the audio backend once per output buffer. Reads from the live
//! decoder session, maps channels, applies volume and triggers end-of-track
//! handling. Allocation-free after construction.

use crate::channels::{map_channels, MAX_CHANNELS};
use crate::manager::{PlaybackManager, TrackEndOutcome};
use crate::state::PlayerState;

/// Frames decoded per pass through the scratch buffer
pub const MAX_BLOCK_FRAMES: usize = 4096;

pub struct RenderEngine {
    manager: PlaybackManager,
    output_channels: usize,

    /// Decoded frames at the session's native width
    scratch: Vec<f32>,
}

impl RenderEngine {
    pub fn new(manager: PlaybackManager, output_channels: usize) -> Self {
        Self {
            manager,
            output_channels: output_channels.max(1),
            scratch: vec![0.0; MAX_BLOCK_FRAMES * MAX_CHANNELS],
        }
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Fill one interleaved output buffer
    ///
    /// The whole buffer is always written: decoded audio first, silence for
    /// whatever the session could not supply.
    pub fn render(&mut self, output: &mut [f32]) {
        let channels = self.output_channels;
        let requested = output.len() / channels;

        let mut written = {
            let mut state = self.manager.lock_state();
            if state.paused || state.session.is_none() {
                output.fill(0.0);
                return;
            }

            let written = fill_from_session(&mut state, &mut self.scratch, output, channels);
            if written < requested {
                state.track_ended = true;
            }
            written
        };

        // Lock released: end-of-track handling may open files
        if written < requested && self.manager.handle_track_end() == TrackEndOutcome::Loaded {
            let mut state = self.manager.lock_state();
            if !state.paused {
                let tail = &mut output[written * channels..];
                let extra = fill_from_session(&mut state, &mut self.scratch, tail, channels);
                if extra < tail.len() / channels {
                    state.track_ended = true;
                }
                written += extra;
            }
        }

        output[written * channels..].fill(0.0);
    }
}

/// Decode into `output` until it is full or the session comes up short
fn fill_from_session(
    state: &mut PlayerState,
    scratch: &mut [f32],
    output: &mut [f32],
    out_channels: usize,
) -> usize {
    let volume = state.volume;
    let Some(session) = state.session.as_mut() else {
        return 0;
    };

    let in_channels = session.channels();
    if in_channels == 0 {
        return 0;
    }

    // Wider-than-supported sessions get fewer frames per pass
    let block_frames = scratch.len() / in_channels;
    if block_frames == 0 {
        return 0;
    }

    let wanted = output.len() / out_channels;
    let mut done = 0;

    while done < wanted {
        let chunk = (wanted - done).min(block_frames);
        let read = session
            .read_frames(&mut scratch[..chunk * in_channels])
            .unwrap_or(0)
            .min(chunk);

        let dst = &mut output[done * out_channels..(done + read) * out_channels];
        map_channels(&scratch[..read * in_channels], in_channels, dst, out_channels);
        volume.apply(dst);
        done += read;

        if read < chunk {
            break;
        }
    }

    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::source::{AudioSource, MemorySource, SourceLoader};
    use crate::types::{PlaybackConfig, TrackRef};
    use std::sync::Arc;

    struct NullLoader;

    impl SourceLoader for NullLoader {
        fn open(&self, track: &TrackRef) -> Result<Box<dyn AudioSource>> {
            Err(crate::error::PlaybackError::TrackNotFound(track.to_string()))
        }
    }

    fn engine(channels: usize) -> (PlaybackManager, RenderEngine) {
        let manager = PlaybackManager::new(PlaybackConfig::default(), Arc::new(NullLoader));
        let engine = RenderEngine::new(manager.clone(), channels);
        (manager, engine)
    }

    fn load(manager: &PlaybackManager, source: MemorySource) {
        let mut state = manager.lock_state();
        state.install(TrackRef::from("/mem"), Box::new(source));
    }

    #[test]
    fn silence_without_session() {
        let (_, mut engine) = engine(2);
        let mut output = [1.0; 16];
        engine.render(&mut output);
        assert!(output.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn silence_while_paused() {
        let (manager, mut engine) = engine(2);
        load(&manager, MemorySource::constant(0.5, 100, 2, 44100));
        manager.pause();

        let mut output = [1.0; 16];
        engine.render(&mut output);
        assert!(output.iter().all(|s| *s == 0.0));

        manager.resume();
        engine.render(&mut output);
        assert!(output.iter().all(|s| *s == 0.5));
    }

    #[test]
    fn volume_scales_output() {
        let (manager, mut engine) = engine(1);
        load(&manager, MemorySource::constant(0.8, 100, 1, 44100));
        manager.set_volume(0.5);

        let mut output = [0.0; 8];
        engine.render(&mut output);
        assert!(output.iter().all(|s| (*s - 0.4).abs() < 1e-6));
    }

    #[test]
    fn mono_session_fills_every_output_channel() {
        let (manager, mut engine) = engine(6);
        load(&manager, MemorySource::constant(0.25, 10, 1, 44100));

        let mut output = [0.0; 12];
        engine.render(&mut output);
        assert!(output.iter().all(|s| *s == 0.25));
    }

    #[test]
    fn short_read_zero_fills_tail() {
        let (manager, mut engine) = engine(2);
        load(&manager, MemorySource::constant(0.5, 3, 2, 44100));

        let mut output = [1.0; 10];
        engine.render(&mut output);

        assert_eq!(&output[..6], &[0.5; 6]);
        assert_eq!(&output[6..], &[0.0; 4]);
        assert!(manager.lock_state().track_ended);
    }

    #[test]
    fn large_requests_span_several_blocks() {
        let frames = MAX_BLOCK_FRAMES * 2 + 17;
        let (manager, mut engine) = engine(2);
        load(&manager, MemorySource::constant(0.1, frames, 2, 44100));

        let mut output = vec![0.0; frames * 2];
        engine.render(&mut output);
        assert!(output.iter().all(|s| *s == 0.1));
    }

    #[test]
    fn oversized_channel_count_truncates_per_pass() {
        let channels = MAX_CHANNELS * 2;
        let frames = 10;
        let (manager, mut engine) = engine(1);
        load(&manager, MemorySource::constant(0.3, frames, channels, 44100));

        let mut output = [0.0; 10];
        engine.render(&mut output);
        assert!(output.iter().all(|s| (*s - 0.3).abs() < 1e-6));
    }
}
