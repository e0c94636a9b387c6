//! Tunable match parameters loaded from TOML.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waveguard_core::{MatchSetup, TowerKind, STARTING_PLAYER_HEALTH};
use waveguard_world::{WorldSettings, DEFAULT_STARTING_MONEY, DEFAULT_TICKS_PER_SECOND};

/// Seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x5eed_cafe;

/// Failure raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has unexpected fields.
    #[error("invalid simulation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The tick rate must be positive.
    #[error("ticks_per_second must be greater than zero")]
    ZeroTickRate,
    /// Player health must be a positive finite number.
    #[error("player_health must be positive, got {0}")]
    InvalidPlayerHealth(f32),
}

/// Parameters shared by every match the simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fixed simulation steps per simulated second.
    pub ticks_per_second: u32,
    /// Money available at match start when no account is attached.
    pub starting_money: u64,
    /// Player health at match start.
    pub player_health: f32,
    /// Seed of every random stream in the match.
    pub seed: u64,
    /// Tower kinds available without an account, or every kind when absent.
    pub unlocked_towers: Option<BTreeSet<TowerKind>>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            starting_money: DEFAULT_STARTING_MONEY,
            player_health: STARTING_PLAYER_HEALTH,
            seed: DEFAULT_SEED,
            unlocked_towers: None,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document; missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a match cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if !self.player_health.is_finite() || self.player_health <= 0.0 {
            return Err(ConfigError::InvalidPlayerHealth(self.player_health));
        }
        Ok(())
    }

    /// World settings for a match on `setup`.
    #[must_use]
    pub fn world_settings(&self, setup: MatchSetup) -> WorldSettings {
        WorldSettings {
            setup,
            ticks_per_second: self.ticks_per_second,
            starting_money: self.starting_money,
            player_health: self.player_health,
            unlocked: self.unlocked_towers.clone(),
        }
    }
}
