//! Directory scanning for audio files

use crate::error::{PlaybackError, Result};
use crate::types::TrackRef;
use std::fs;
use std::path::Path;

/// Extensions recognised as audio, compared case-insensitively
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "ogg", "flac", "aac", "wma", "m4a", "aiff", "opus",
];

/// Whether a path carries a recognised audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// List the audio files directly inside `dir` (no recursion)
///
/// Entries come back sorted by path so callers start from a stable order
/// before shuffling. Unreadable entries are skipped.
pub fn collect_audio_files(dir: &Path) -> Result<Vec<TrackRef>> {
    if !dir.is_dir() {
        return Err(PlaybackError::TrackNotFound(dir.display().to_string()));
    }

    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| is_audio_file(path))
        .collect();
    files.sort();

    Ok(files.into_iter().map(TrackRef::from).collect())
}
