//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::Arena;
use crate::util::time::DEFAULT_TPS;

/// Runner configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Character roster file
    pub catalog_path: PathBuf,

    /// Arena width in world units
    pub arena_width: f32,
    /// Arena height in world units
    pub arena_height: f32,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Ticks between debug snapshots
    pub snapshot_every: u32,
    /// Hard stop for the headless runner
    pub max_ticks: u64,

    /// Seed for the demo bots
    pub demo_seed: u64,
    /// Character picked for player one (first roster entry if unset)
    pub player1: Option<String>,
    /// Character picked for player two (second roster entry if unset)
    pub player2: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            catalog_path: PathBuf::from("assets/characters.json"),
            arena_width: 800.0,
            arena_height: 600.0,
            tick_rate: DEFAULT_TPS,
            snapshot_every: 30,
            max_ticks: 7200,
            demo_seed: 7,
            player1: None,
            player2: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            catalog_path: env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            arena_width: parse_var("ARENA_WIDTH", defaults.arena_width)?,
            arena_height: parse_var("ARENA_HEIGHT", defaults.arena_height)?,
            tick_rate: parse_var("TICK_RATE", defaults.tick_rate)?,
            snapshot_every: parse_var("SNAPSHOT_EVERY", defaults.snapshot_every)?,
            max_ticks: parse_var("MAX_TICKS", defaults.max_ticks)?,
            demo_seed: parse_var("DEMO_SEED", defaults.demo_seed)?,
            player1: env::var("PLAYER1").ok().filter(|s| !s.is_empty()),
            player2: env::var("PLAYER2").ok().filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_width > 0.0) || !(self.arena_height > 0.0) {
            return Err(ConfigError::Invalid("ARENA_WIDTH/ARENA_HEIGHT"));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("TICK_RATE"));
        }
        if self.snapshot_every == 0 {
            return Err(ConfigError::Invalid("SNAPSHOT_EVERY"));
        }
        Ok(())
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.arena_height)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
