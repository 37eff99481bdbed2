/// Racers — top-down lane racer
///
/// Architecture:
///   racers-common — config file, tuning, difficulty
///   racers-game   — physics, traffic, collisions, session, high score
///   engine/       — window, input mapping, renderer, audio (this crate)

mod engine;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use racers_common::{AppConfig, Difficulty};
use racers_game::{AudioSink, Game, HighScoreFile, SilentAudio};
use tracing_subscriber::EnvFilter;

use engine::sound_engine::SoundEngine;

#[derive(Parser, Debug)]
#[command(name = "racers", version, about = "Dodge the traffic for as long as you can")]
struct Cli {
    /// Config file (TOML); defaults are used when it does not exist
    #[arg(long, default_value = "racers.toml")]
    config: PathBuf,

    /// Starting difficulty: easy, normal or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Directory for the high score file
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Directory with engine / crash / background_music clips
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Fixed seed for reproducible traffic
    #[arg(long)]
    seed: Option<u64>,

    /// Disable all audio
    #[arg(long)]
    mute: bool,

    /// Window scale factor (1-4)
    #[arg(long)]
    scale: Option<usize>,
}

impl Cli {
    /// Command-line flags win over the config file
    fn apply(self, config: &mut AppConfig) {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(dir) = self.save_dir {
            config.save_dir = dir;
        }
        if let Some(dir) = self.assets {
            config.assets_dir = dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.mute {
            config.mute = true;
        }
        if let Some(scale) = self.scale {
            config.window_scale = scale.clamp(1, 4);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    cli.apply(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                config
                    .log_filter
                    .parse()
                    .with_context(|| format!("Invalid log filter '{}'", config.log_filter))?,
            ),
        )
        .init();

    tracing::info!("Racers v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Config: difficulty {}, save dir {}, assets {}",
        config.difficulty,
        config.save_dir.display(),
        config.assets_dir.display()
    );

    let audio: Box<dyn AudioSink> = if config.mute {
        tracing::info!("Audio muted");
        Box::new(SilentAudio)
    } else {
        match SoundEngine::new(&config.assets_dir) {
            Some(engine) => Box::new(engine),
            None => Box::new(SilentAudio),
        }
    };

    let store = HighScoreFile::open(&config.save_dir);

    let mut game = Game::new(
        &config.tuning,
        config.difficulty,
        config.seed,
        audio,
        Box::new(store),
    );

    let result = engine::run(&mut game, config.window_scale);
    game.shutdown();
    result
}
