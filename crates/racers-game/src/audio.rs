//! Sound collaborator interface
//!
//! The game core only ever *asks* for sounds; it never waits for them and
//! never learns whether they played. Implementations must tolerate missing
//! clips or a missing output device by doing nothing.

/// Looping tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Engine drone, volume follows the car's speed
    Engine,
    BackgroundMusic,
}

impl Track {
    /// File name (without extension) looked up in the assets directory
    pub fn file_stem(&self) -> &'static str {
        match self {
            Track::Engine => "engine",
            Track::BackgroundMusic => "background_music",
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Track::Engine => Channel::Engine,
            Track::BackgroundMusic => Channel::Music,
        }
    }
}

/// One-shot effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    Crash,
}

impl Clip {
    pub fn file_stem(&self) -> &'static str {
        match self {
            Clip::Crash => "crash",
        }
    }
}

/// Volume channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Engine,
    Music,
    Effects,
}

/// Fire-and-forget sound output
pub trait AudioSink {
    /// Start a looping track. No-op if it is already playing.
    fn start_loop(&mut self, track: Track);
    /// Set a channel's volume (0.0 – 1.0)
    fn set_volume(&mut self, channel: Channel, level: f32);
    fn play_once(&mut self, clip: Clip);
    /// Stop and free everything
    fn release_all(&mut self);
}

/// Audio sink that plays nothing (muted, or no output device)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn start_loop(&mut self, track: Track) {
        tracing::trace!("(silent) loop {:?}", track);
    }

    fn set_volume(&mut self, _channel: Channel, _level: f32) {}

    fn play_once(&mut self, clip: Clip) {
        tracing::trace!("(silent) play {:?}", clip);
    }

    fn release_all(&mut self) {}
}
