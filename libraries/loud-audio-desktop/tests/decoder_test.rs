//! Decoder session tests against WAV fixtures written with hound

use hound::{WavSpec, WavWriter};
use loud_audio_desktop::{SymphoniaLoader, SymphoniaSession};
use loud_playback::{
    AudioSource, PlaybackConfig, PlaybackManager, RenderEngine, SourceLoader, TrackRef,
};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// ===== Helpers =====

fn wav_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write `frames` frames where every sample on channel `c` equals `levels[c]`
fn write_wav(path: &Path, sample_rate: u32, levels: &[f32], frames: usize) {
    let mut writer = WavWriter::create(path, wav_spec(levels.len() as u16, sample_rate)).unwrap();
    for _ in 0..frames {
        for level in levels {
            writer
                .write_sample((level * f32::from(i16::MAX)) as i16)
                .unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn read_all(source: &mut dyn AudioSource) -> Vec<f32> {
    let mut all = Vec::new();
    let mut buffer = vec![0.0; 1000 * source.channels()];
    loop {
        let frames = source.read_frames(&mut buffer).unwrap();
        all.extend_from_slice(&buffer[..frames * source.channels()]);
        if frames < 1000 {
            break;
        }
    }
    all
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ===== Decoding =====

#[test]
fn mono_file_keeps_native_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mono.wav");
    write_wav(&path, 44100, &[0.5], 4410);

    let mut session = SymphoniaSession::open(&path, 44100).unwrap();
    assert_eq!(session.channels(), 1);
    assert_eq!(session.sample_rate(), 44100);
    assert!(!session.needs_resampling());

    let samples = read_all(&mut session);
    assert_eq!(samples.len(), 4410);
    assert!(samples.iter().all(|s| close(*s, 0.5)));
}

#[test]
fn stereo_channels_stay_separate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stereo.wav");
    write_wav(&path, 48000, &[0.25, -0.25], 1000);

    let mut session = SymphoniaSession::open(&path, 48000).unwrap();
    assert_eq!(session.channels(), 2);

    let samples = read_all(&mut session);
    assert_eq!(samples.len(), 2000);
    for frame in samples.chunks_exact(2) {
        assert!(close(frame[0], 0.25));
        assert!(close(frame[1], -0.25));
    }
}

#[test]
fn short_read_signals_end_of_stream() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.wav");
    write_wav(&path, 44100, &[0.1, 0.1], 10);

    let mut session = SymphoniaSession::open(&path, 44100).unwrap();
    let mut buffer = vec![0.0; 64];

    assert_eq!(session.read_frames(&mut buffer).unwrap(), 10);
    assert_eq!(session.read_frames(&mut buffer).unwrap(), 0);
}

#[test]
fn resamples_to_output_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("48k.wav");
    let frames = 48000;
    write_wav(&path, 48000, &[0.3, 0.3], frames);

    let mut session = SymphoniaSession::open(&path, 44100).unwrap();
    assert!(session.needs_resampling());
    assert_eq!(session.source_sample_rate(), 48000);
    assert_eq!(session.sample_rate(), 44100);

    let produced = read_all(&mut session).len() / 2;
    let expected = 44100;
    // Half the 256-tap sinc window, in output frames
    let filter_delay = 128;
    // One 1024-frame input chunk after resampling; the zero-padded tail
    // chunk may add up to this much
    let tail_chunk = (1024 * 44100usize).div_ceil(48000);
    assert!(
        produced + filter_delay >= expected && produced <= expected + tail_chunk,
        "expected {} frames (-{} / +{}), got {}",
        expected,
        filter_delay,
        tail_chunk,
        produced
    );
}

#[test]
fn decodes_from_memory() {
    let mut bytes = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut bytes, wav_spec(1, 22050)).unwrap();
        for _ in 0..2205 {
            writer.write_sample(i16::MAX / 4).unwrap();
        }
        writer.finalize().unwrap();
    }

    let mut session = SymphoniaSession::from_bytes(bytes.into_inner(), Some("wav"), 22050).unwrap();
    assert_eq!(session.channels(), 1);

    let samples = read_all(&mut session);
    assert_eq!(samples.len(), 2205);
    assert!(samples.iter().all(|s| close(*s, 0.25)));
}

// ===== Loader =====

#[test]
fn loader_rejects_missing_and_corrupt_files() {
    let dir = TempDir::new().unwrap();
    let corrupt = dir.path().join("corrupt.mp3");
    std::fs::write(&corrupt, b"this is not audio").unwrap();

    let loader = SymphoniaLoader::new(44100);
    assert!(loader
        .open(&TrackRef::from(dir.path().join("missing.wav")))
        .is_err());
    assert!(loader.open(&TrackRef::from(corrupt)).is_err());
}

#[test]
fn loader_opens_at_configured_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.wav");
    write_wav(&path, 44100, &[0.2], 100);

    let loader = SymphoniaLoader::new(48000);
    let session = loader.open(&TrackRef::from(path)).unwrap();
    assert_eq!(session.sample_rate(), 48000);
    assert_eq!(loader.target_sample_rate(), 48000);
}

// ===== End to End =====

#[test]
fn render_engine_plays_decoded_queue() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");
    write_wav(&first, 44100, &[0.5], 100);
    write_wav(&second, 44100, &[-0.5, -0.5], 1000);

    let manager = PlaybackManager::new(
        PlaybackConfig::default(),
        Arc::new(SymphoniaLoader::new(44100)),
    );
    let mut engine = RenderEngine::new(manager.clone(), 2);

    manager.enqueue_file(&first);
    manager.enqueue_file(&second);

    let mut output = vec![0.0; 300 * 2];
    engine.render(&mut output);

    assert!(output[..200].iter().all(|s| close(*s, 0.5)));
    assert!(output[200..].iter().all(|s| close(*s, -0.5)));
    assert_eq!(manager.now_playing(), Some(TrackRef::from(second)));
}
