//! Game configuration.
//!
//! Loaded from YAML; every field has a default so a partial file is fine.
//!
//! ```yaml
//! game:
//!   target_score: 10000
//!   entry_minimum: 300
//! players:
//!   - { name: "Ada", kind: human }
//!   - { name: "Bot", kind: automated, profile: aggressive }
//! ai:
//!   think_delay_ms: 600
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::RiskProfile;
use crate::round::PlayerKind;
use crate::rules::{
    DEFAULT_TARGET_SCORE, ENTRY_MINIMUM, LEGACY_ENTRY_MINIMUM, MAX_PLAYERS, MIN_TARGET_SCORE,
    SCORE_GRANULARITY,
};

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    /// Seating order. Turn rotation follows this list.
    #[serde(default = "default_players")]
    pub players: Vec<PlayerConfig>,
    #[serde(default)]
    pub ai: AiConfig,
}

/// Rule parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameConfig {
    /// Reaching this score triggers the final round.
    #[serde(default = "default_target_score")]
    pub target_score: u32,
    /// Minimum single-turn score before a player's first points count.
    ///
    /// 300 is canonical. 250 reproduces an older rule set and must be chosen
    /// explicitly.
    #[serde(default = "default_entry_minimum")]
    pub entry_minimum: u32,
}

fn default_target_score() -> u32 {
    DEFAULT_TARGET_SCORE
}

fn default_entry_minimum() -> u32 {
    ENTRY_MINIMUM
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            target_score: default_target_score(),
            entry_minimum: default_entry_minimum(),
        }
    }
}

impl GameConfig {
    /// True when the non-canonical 250-point entry rule is in effect.
    pub fn uses_legacy_entry_minimum(&self) -> bool {
        self.entry_minimum == LEGACY_ENTRY_MINIMUM
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: PlayerKind,
}

impl PlayerConfig {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Human,
        }
    }

    pub fn automated(name: impl Into<String>, profile: RiskProfile) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Automated { profile },
        }
    }
}

fn default_players() -> Vec<PlayerConfig> {
    vec![
        PlayerConfig::human("Player"),
        PlayerConfig::automated("Rival", RiskProfile::Moderate),
    ]
}

/// Automated-player pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AiConfig {
    /// Delay before each automated action, purely for presentation.
    #[serde(default = "default_think_delay_ms")]
    pub think_delay_ms: u64,
    /// Seed for automated decisions. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_think_delay_ms() -> u64 {
    600
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            think_delay_ms: default_think_delay_ms(),
            seed: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            players: default_players(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations no game can start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_game(&self.game)?;
        validate_players(&self.players)
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

pub fn validate_game(game: &GameConfig) -> Result<(), ConfigError> {
    if game.target_score < MIN_TARGET_SCORE {
        return Err(invalid(format!(
            "game.target_score must be >= {MIN_TARGET_SCORE} (got {})",
            game.target_score
        )));
    }
    if game.target_score % SCORE_GRANULARITY != 0 {
        return Err(invalid(format!(
            "game.target_score must be a multiple of {SCORE_GRANULARITY}"
        )));
    }
    if game.entry_minimum % SCORE_GRANULARITY != 0 {
        return Err(invalid(format!(
            "game.entry_minimum must be a multiple of {SCORE_GRANULARITY}"
        )));
    }
    if game.entry_minimum > game.target_score {
        return Err(invalid("game.entry_minimum must not exceed game.target_score"));
    }
    Ok(())
}

pub fn validate_players(players: &[PlayerConfig]) -> Result<(), ConfigError> {
    if players.is_empty() {
        return Err(invalid("players must be non-empty"));
    }
    if players.len() > MAX_PLAYERS {
        return Err(invalid(format!(
            "at most {MAX_PLAYERS} players are supported (got {})",
            players.len()
        )));
    }
    let mut seen = HashSet::new();
    for p in players {
        let name = p.name.trim();
        if name.is_empty() {
            return Err(invalid("player names must be non-empty"));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(invalid(format!("duplicate player name: {name}")));
        }
    }
    Ok(())
}
