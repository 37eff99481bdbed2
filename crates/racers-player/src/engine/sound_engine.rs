//! Sound engine — audio playback via rodio
//!
//! Clips are read from the assets directory once at startup, by file stem
//! (`engine`, `crash`, `background_music`) with any of the extensions in
//! `CLIP_EXTENSIONS`. A missing clip, an undecodable file or a missing output
//! device turns the corresponding request into a no-op.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use racers_game::{AudioSink, Channel, Clip, Track};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

pub const CLIP_EXTENSIONS: [&str; 4] = ["wav", "ogg", "mp3", "flac"];

/// Every stem the game can ask for
const STEMS: [&str; 3] = ["engine", "crash", "background_music"];

/// First existing `<dir>/<stem>.<ext>`
pub fn find_clip(dir: &Path, stem: &str) -> Option<PathBuf> {
    CLIP_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

/// Raw bytes of every clip present in `dir`, keyed by stem
pub fn load_clips(dir: &Path) -> HashMap<&'static str, Vec<u8>> {
    let mut clips = HashMap::new();
    for stem in STEMS {
        let Some(path) = find_clip(dir, stem) else {
            tracing::warn!("Sound '{}' not found in {}", stem, dir.display());
            continue;
        };
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!("Loaded sound '{}' ({} bytes)", path.display(), bytes.len());
                clips.insert(stem, bytes);
            }
            Err(e) => tracing::warn!("Failed to read {}: {}", path.display(), e),
        }
    }
    clips
}

/// Central sound engine — output stream, looping tracks and one-shot effects
pub struct SoundEngine {
    /// rodio output stream (must be kept alive)
    _stream: OutputStream,
    /// Handle for creating new sinks
    handle: OutputStreamHandle,
    clips: HashMap<&'static str, Vec<u8>>,
    loops: HashMap<Track, Sink>,
    /// One-shot effects (kept alive until finished)
    sfx_sinks: Vec<Sink>,
    volumes: HashMap<Channel, f32>,
}

impl SoundEngine {
    /// Open the default output device. Returns None if it is unavailable.
    pub fn new(assets_dir: &Path) -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => {
                tracing::info!("Audio output initialized");
                Some(Self {
                    _stream: stream,
                    handle,
                    clips: load_clips(assets_dir),
                    loops: HashMap::new(),
                    sfx_sinks: Vec::new(),
                    volumes: HashMap::new(),
                })
            }
            Err(e) => {
                tracing::warn!("Failed to initialize audio: {}", e);
                None
            }
        }
    }

    fn volume(&self, channel: Channel) -> f32 {
        self.volumes.get(&channel).copied().unwrap_or(1.0)
    }

    fn decode(&self, stem: &str) -> Option<Decoder<Cursor<Vec<u8>>>> {
        let bytes = self.clips.get(stem)?;
        match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!("Failed to decode sound '{}': {}", stem, e);
                None
            }
        }
    }

    fn new_sink(&self) -> Option<Sink> {
        match Sink::try_new(&self.handle) {
            Ok(sink) => Some(sink),
            Err(e) => {
                tracing::warn!("Failed to create sink: {}", e);
                None
            }
        }
    }

    /// Drop finished effect sinks
    fn gc(&mut self) {
        self.sfx_sinks.retain(|s| !s.empty());
    }
}

impl AudioSink for SoundEngine {
    fn start_loop(&mut self, track: Track) {
        if self.loops.contains_key(&track) {
            return;
        }
        let Some(source) = self.decode(track.file_stem()) else {
            return;
        };
        let Some(sink) = self.new_sink() else {
            return;
        };
        sink.set_volume(self.volume(track.channel()));
        sink.append(source.repeat_infinite());
        self.loops.insert(track, sink);
        tracing::debug!("Loop started: {:?}", track);
    }

    fn set_volume(&mut self, channel: Channel, level: f32) {
        let level = level.clamp(0.0, 1.0);
        self.volumes.insert(channel, level);
        for (track, sink) in &self.loops {
            if track.channel() == channel {
                sink.set_volume(level);
            }
        }
        if channel == Channel::Effects {
            for sink in &self.sfx_sinks {
                sink.set_volume(level);
            }
        }
    }

    fn play_once(&mut self, clip: Clip) {
        self.gc();
        let Some(source) = self.decode(clip.file_stem()) else {
            return;
        };
        let Some(sink) = self.new_sink() else {
            return;
        };
        sink.set_volume(self.volume(Channel::Effects));
        sink.append(source);
        self.sfx_sinks.push(sink);
    }

    fn release_all(&mut self) {
        for (_, sink) in self.loops.drain() {
            sink.stop();
        }
        for sink in self.sfx_sinks.drain(..) {
            sink.stop();
        }
        tracing::debug!("Audio released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_assets(name: &str) -> PathBuf {
        let dir = env::temp_dir().join("racers_test_assets").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn finds_clip_by_any_extension() {
        let dir = temp_assets("extensions");
        std::fs::write(dir.join("crash.ogg"), b"x").unwrap();
        assert_eq!(find_clip(&dir, "crash"), Some(dir.join("crash.ogg")));
        assert_eq!(find_clip(&dir, "engine"), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn prefers_wav_when_several_exist() {
        let dir = temp_assets("prefer");
        std::fs::write(dir.join("engine.mp3"), b"x").unwrap();
        std::fs::write(dir.join("engine.wav"), b"x").unwrap();
        assert_eq!(find_clip(&dir, "engine"), Some(dir.join("engine.wav")));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_clips_are_skipped() {
        let dir = temp_assets("partial");
        std::fs::write(dir.join("background_music.wav"), b"RIFF").unwrap();
        let clips = load_clips(&dir);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips.get("background_music").map(Vec::len), Some(4));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_loads_nothing() {
        let clips = load_clips(Path::new("/nonexistent/racers/assets"));
        assert!(clips.is_empty());
    }
}
