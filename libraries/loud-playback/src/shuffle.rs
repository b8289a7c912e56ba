//! Track shuffling
//!
//! Uniform Fisher-Yates permutation via `rand`.

use crate::types::TrackRef;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shuffle tracks in place using the thread-local RNG
pub fn shuffle_tracks(tracks: &mut [TrackRef]) {
    shuffle_tracks_with(tracks, &mut thread_rng());
}

/// Shuffle tracks with a caller-provided RNG (deterministic in tests)
pub fn shuffle_tracks_with<R: Rng + ?Sized>(tracks: &mut [TrackRef], rng: &mut R) {
    tracks.shuffle(rng);
}
