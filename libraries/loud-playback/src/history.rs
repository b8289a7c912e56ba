//! Playback history tracking
//!
//! Maintains a bounded history of played tracks for "previous" navigation

use crate::types::{TrackRef, DEFAULT_HISTORY_SIZE};
use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Most recent entry sits at the front. Pushing past the bound
/// discards the oldest entry from the back.
#[derive(Debug, Clone)]
pub struct History {
    tracks: VecDeque<TrackRef>,
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    ///
    /// The size is clamped to `1..=DEFAULT_HISTORY_SIZE`.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.clamp(1, DEFAULT_HISTORY_SIZE);
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a track as most recent
    ///
    /// Empty references are ignored.
    pub fn push(&mut self, track: TrackRef) {
        if track.is_empty() {
            return;
        }
        if self.tracks.len() >= self.max_size {
            self.tracks.pop_back();
        }
        self.tracks.push_front(track);
    }

    /// Most recent track without removing it
    pub fn peek(&self) -> Option<&TrackRef> {
        self.tracks.front()
    }

    /// Remove and return the most recent track
    pub fn pop(&mut self) -> Option<TrackRef> {
        self.tracks.pop_front()
    }

    /// All tracks, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
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

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str) -> TrackRef {
        TrackRef::from(format!("/music/{}.mp3", name).as_str())
    }

    #[test]
    fn create_history() {
        let history = History::new(10);
        assert_eq!(history.max_size(), 10);
        assert!(history.is_empty());
    }

    #[test]
    fn zero_size_is_raised_to_one() {
        let mut history = History::new(0);
        history.push(track("a"));
        history.push(track("b"));
        assert_eq!(history.len(), 1);
        assert_eq!(history.peek(), Some(&track("b")));
    }

    #[test]
    fn oversized_bound_is_capped() {
        let mut history = History::new(50);
        assert_eq!(history.max_size(), DEFAULT_HISTORY_SIZE);

        for i in 0..40 {
            history.push(track(&i.to_string()));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_SIZE);
        assert_eq!(history.peek(), Some(&track("39")));
    }

    #[test]
    fn most_recent_first() {
        let mut history = History::new(10);
        history.push(track("1"));
        history.push(track("2"));
        history.push(track("3"));

        let all: Vec<_> = history.iter().cloned().collect();
        assert_eq!(all, vec![track("3"), track("2"), track("1")]);
    }

    #[test]
    fn pop_returns_most_recent() {
        let mut history = History::new(10);
        history.push(track("1"));
        history.push(track("2"));

        assert_eq!(history.pop(), Some(track("2")));
        assert_eq!(history.pop(), Some(track("1")));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn history_bounded() {
        let mut history = History::new(3);
        for i in 1..=4 {
            history.push(track(&i.to_string()));
        }

        assert_eq!(history.len(), 3);
        // Track 1 was the oldest and got evicted
        let all: Vec<_> = history.iter().cloned().collect();
        assert_eq!(all, vec![track("4"), track("3"), track("2")]);
    }

    #[test]
    fn empty_reference_not_recorded() {
        let mut history = History::default();
        history.push(TrackRef::from(""));
        assert!(history.is_empty());
    }

    #[test]
    fn default_history() {
        assert_eq!(History::default().max_size(), 20);
    }
}
