//! Directory-shuffle playlist
//!
//! Materialized once from a directory listing, then cycled by index with
//! wraparound in both directions.

use crate::types::TrackRef;

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    entries: Vec<TrackRef>,
    index: usize,
}

impl Playlist {
    /// Build a playlist positioned on its first entry
    pub fn new(entries: Vec<TrackRef>) -> Self {
        Self { entries, index: 0 }
    }

    pub fn current(&self) -> Option<&TrackRef> {
        self.entries.get(self.index)
    }

    /// Step forward, wrapping to the first entry after the last
    pub fn advance(&mut self) -> Option<&TrackRef> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.entries.len();
        self.current()
    }

    /// Step back, wrapping to the last entry before the first
    pub fn retreat(&mut self) -> Option<&TrackRef> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.entries.len() - 1);
        self.current()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TrackRef] {
        &self.entries
    }
}
