//! Shared fixtures for daemon tests
#![allow(dead_code)]

use loud_daemon::Dispatcher;
use loud_playback::{
    AudioSource, MemorySource, PlaybackConfig, PlaybackError, PlaybackManager, Result,
    SourceLoader, TrackRef,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Opens any file except those whose name contains "broken"
pub struct ToneLoader;

impl SourceLoader for ToneLoader {
    fn open(&self, track: &TrackRef) -> Result<Box<dyn AudioSource>> {
        if track.to_string().contains("broken") {
            return Err(PlaybackError::AudioSource("unsupported format".into()));
        }
        Ok(Box::new(MemorySource::constant(0.5, 4096, 2, 44100)))
    }
}

pub struct Library {
    dir: TempDir,
}

impl Library {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    pub fn folder(&self, name: &str, files: &[&str]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir(&path).unwrap();
        for file in files {
            File::create(path.join(file)).unwrap();
        }
        path
    }

    pub fn missing(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn dispatcher() -> Dispatcher {
    let manager = PlaybackManager::new(PlaybackConfig::default(), Arc::new(ToneLoader));
    Dispatcher::new(manager)
}

pub fn track(path: &Path) -> TrackRef {
    TrackRef::from(path)
}
