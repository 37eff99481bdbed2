//! Common configuration and types shared across Racers crates
//!
//! - `Difficulty` — the three selectable difficulty levels
//! - `Tuning` — physics and timing constants, overridable from the config file
//! - `AppConfig` — everything the player binary reads from `racers.toml`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid tuning value: {0}")]
    InvalidTuning(String),

    #[error("Unknown difficulty '{0}' (expected easy, normal or hard)")]
    UnknownDifficulty(String),

    #[error("Invalid window scale {0} (expected 1 to 4)")]
    InvalidWindowScale(usize),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Selectable difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Game-speed multiplier a difficulty selection assigns
    pub fn game_speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Physics and timing constants.
///
/// Defaults are the values the game shipped with; every field can be
/// overridden from the `[tuning]` table of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Top forward speed
    pub max_speed: f32,
    /// Speed added per accelerate input
    pub acceleration_rate: f32,
    /// Speed removed per brake input
    pub brake_rate: f32,
    /// Lateral units per steer input at full lock and full speed
    pub steering_rate: f32,
    /// Speed lost every tick without input
    pub natural_deceleration: f32,
    /// Multiplicative self-centering applied to the steering angle each tick
    pub steering_return: f32,
    /// Fixed tick cadence in milliseconds
    pub tick_interval_ms: u64,
    /// Lower bound of the randomized AI spawn delay
    pub spawn_interval_min_ms: u64,
    /// Upper bound of the randomized AI spawn delay
    pub spawn_interval_max_ms: u64,
    /// Catch-up ticks a slow frame may run before the backlog is dropped
    pub max_catch_up_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_speed: 300.0,
            acceleration_rate: 5.0,
            brake_rate: 8.0,
            steering_rate: 3.0,
            natural_deceleration: 2.0,
            steering_return: 0.95,
            tick_interval_ms: 16,
            spawn_interval_min_ms: 2000,
            spawn_interval_max_ms: 4000,
            max_catch_up_ticks: 5,
        }
    }
}

impl Tuning {
    /// Reject values the physics cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.max_speed > 0.0) {
            return Err(ConfigError::InvalidTuning(format!(
                "max_speed must be positive, got {}",
                self.max_speed
            )));
        }
        if self.acceleration_rate < 0.0 || self.brake_rate < 0.0 || self.natural_deceleration < 0.0 {
            return Err(ConfigError::InvalidTuning(
                "acceleration_rate, brake_rate and natural_deceleration must not be negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.steering_return) {
            return Err(ConfigError::InvalidTuning(format!(
                "steering_return must lie in [0, 1], got {}",
                self.steering_return
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTuning("tick_interval_ms must be at least 1".into()));
        }
        if self.spawn_interval_min_ms == 0 || self.spawn_interval_min_ms > self.spawn_interval_max_ms {
            return Err(ConfigError::InvalidTuning(format!(
                "spawn interval {}..{} ms is empty",
                self.spawn_interval_min_ms, self.spawn_interval_max_ms
            )));
        }
        Ok(())
    }
}

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// tracing directive added on top of `RUST_LOG`
    pub log_filter: String,
    /// Directory holding the high score file
    pub save_dir: PathBuf,
    /// Directory holding engine / crash / background_music clips
    pub assets_dir: PathBuf,
    pub difficulty: Difficulty,
    /// Fixed RNG seed for reproducible traffic; random when absent
    pub seed: Option<u64>,
    pub mute: bool,
    /// Integer upscale of the logical framebuffer
    pub window_scale: usize,
    pub tuning: Tuning,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "racers=debug".to_string(),
            save_dir: PathBuf::from("."),
            assets_dir: PathBuf::from("assets"),
            difficulty: Difficulty::Normal,
            seed: None,
            mute: false,
            window_scale: 1,
            tuning: Tuning::default(),
        }
    }
}

impl AppConfig {
    /// Load the config file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        if !(1..=4).contains(&config.window_scale) {
            return Err(ConfigError::InvalidWindowScale(config.window_scale));
        }
        config.tuning.validate()?;
        Ok(config)
    }
}
