//! Pending track queue
//!
//! FIFO consumption with priority re-insert at the front.

use crate::types::TrackRef;
use std::collections::VecDeque;

/// Unbounded queue of tracks awaiting playback
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: VecDeque<TrackRef>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the end
    pub fn push_back(&mut self, track: TrackRef) {
        self.tracks.push_back(track);
    }

    /// Re-insert ahead of everything else (used by "previous")
    pub fn push_front(&mut self, track: TrackRef) {
        self.tracks.push_front(track);
    }

    pub fn pop_front(&mut self) -> Option<TrackRef> {
        self.tracks.pop_front()
    }

    pub fn front(&self) -> Option<&TrackRef> {
        self.tracks.front()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }
}

impl Extend<TrackRef> for Queue {
    fn extend<I: IntoIterator<Item = TrackRef>>(&mut self, iter: I) {
        self.tracks.extend(iter);
    }
}
