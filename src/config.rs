//! Runtime settings for the demo binary, read from the environment.

use std::env;
use std::str::FromStr;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY, MiningOptions};
use crate::error::{ChainError, Result};

const DEFAULT_BLOCK_INTERVAL_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub difficulty: u32,
    pub max_attempts: Option<u64>,
    pub mining_seed: Option<u64>,
    /// Pause between the two demo blocks.
    pub block_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_attempts: None,
            mining_seed: None,
            block_interval_secs: DEFAULT_BLOCK_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Read `DIFFICULTY`, `MINING_MAX_ATTEMPTS`, `MINING_SEED` and
    /// `BLOCK_INTERVAL_SECS` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let difficulty = parse_var(&lookup, "DIFFICULTY")?.unwrap_or(defaults.difficulty);
        if difficulty > MAX_DIFFICULTY {
            return Err(ChainError::Config {
                key: "DIFFICULTY",
                value: difficulty.to_string(),
            });
        }

        Ok(Self {
            difficulty,
            max_attempts: parse_var(&lookup, "MINING_MAX_ATTEMPTS")?,
            mining_seed: parse_var(&lookup, "MINING_SEED")?,
            block_interval_secs: parse_var(&lookup, "BLOCK_INTERVAL_SECS")?
                .unwrap_or(defaults.block_interval_secs),
        })
    }

    pub fn mining_options(&self) -> MiningOptions {
        MiningOptions {
            max_attempts: self.max_attempts,
            seed: self.mining_seed,
            cancel: None,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ChainError::Config { key, value: raw }),
    }
}
