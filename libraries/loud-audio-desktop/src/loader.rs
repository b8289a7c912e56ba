//! Session loader handed to the playback state machine

use crate::sources::SymphoniaSession;
use loud_playback::{AudioSource, PlaybackError, Result, SourceLoader, TrackRef, MAX_CHANNELS};

/// Opens tracks with symphonia at a fixed output sample rate
#[derive(Debug, Clone)]
pub struct SymphoniaLoader {
    target_sample_rate: u32,
}

impl SymphoniaLoader {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }
}

impl SourceLoader for SymphoniaLoader {
    fn open(&self, track: &TrackRef) -> Result<Box<dyn AudioSource>> {
        let session = SymphoniaSession::open(track.path(), self.target_sample_rate)?;

        // Wider layouts would not fit the render scratch buffer
        if session.channels() > MAX_CHANNELS {
            return Err(PlaybackError::TooManyChannels {
                channels: session.channels(),
                max: MAX_CHANNELS,
            });
        }

        Ok(Box::new(session))
    }
}
