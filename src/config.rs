use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn};

const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const DEFAULT_POLL_INTERVAL_MS: u64 = 5;
const DEFAULT_FOOD_INTERVAL_TICKS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Time between two simulation steps.
    pub tick_interval_ms: u64,
    /// How long the loop yields between input polls.
    pub poll_interval_ms: u64,
    /// Food is spawned on ticks that are a multiple of this, when none is on the board.
    /// Zero disables spawning.
    pub food_interval_ticks: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            food_interval_ticks: DEFAULT_FOOD_INTERVAL_TICKS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults, overridden by `SNAKE_TICK_MS`, `SNAKE_FOOD_INTERVAL` and `SNAKE_SEED`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = GameConfig::default();

        if let Some(ms) = parse_var(&lookup, "SNAKE_TICK_MS") {
            if ms == 0 {
                warn!("SNAKE_TICK_MS must be positive, keeping {}", config.tick_interval_ms);
            } else {
                config.tick_interval_ms = ms;
            }
        }
        if let Some(ticks) = parse_var(&lookup, "SNAKE_FOOD_INTERVAL") {
            config.food_interval_ticks = ticks;
        }
        config.seed = parse_var(&lookup, "SNAKE_SEED");

        info!("Configuration: {:?}", config);
        config
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
