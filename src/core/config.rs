//! Game configuration with documented constants
//!
//! All tuning numbers live here with a note on what they control.
//! A TOML file may override any subset of them; missing keys keep defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{CourierError, Result};

/// Configuration for the simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === RUN ===
    /// Length of a run in simulated seconds
    ///
    /// Time running out without reaching the income goal is a defeat.
    pub run_duration_secs: f64,

    /// Bonus added to the final score when the goal is reached early
    pub early_victory_bonus: u64,

    /// Fraction of the run that counts as "early" for the bonus
    pub early_victory_fraction: f64,

    /// Reputation strictly below this ends the run in defeat
    pub defeat_reputation: i32,

    // === INVENTORY ===
    /// Maximum total weight the courier can carry
    pub max_carry_weight: f64,

    // === COURIER ===
    /// Tiles per second before any multiplier
    pub base_speed: f64,

    /// Reputation a new courier starts with
    pub starting_reputation: i32,

    /// Stamina a new courier starts with
    pub starting_stamina: f64,

    /// Simulated seconds the courier must stand still to recover once
    ///
    /// Each full interval without a move applies one recovery step
    /// (+5, or +10 on a rest point tile).
    pub idle_recovery_interval_secs: f64,

    // === WEATHER ===
    /// Lower bound of the random delay between weather changes
    pub weather_min_interval_secs: f64,

    /// Upper bound of the random delay between weather changes
    pub weather_max_interval_secs: f64,

    /// Length of the linear blend from one condition to the next
    pub weather_blend_secs: f64,

    // === HISTORY ===
    /// Number of snapshots kept for undo
    pub undo_depth: usize,

    /// Number of entries kept on the leaderboard
    pub leaderboard_size: usize,

    // === RANDOMNESS ===
    /// Seed for weather and spawn randomness. None draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            run_duration_secs: 600.0,
            early_victory_bonus: 500,
            early_victory_fraction: 0.8,
            defeat_reputation: 20,

            max_carry_weight: 10.0,

            base_speed: 3.0,
            starting_reputation: 70,
            starting_stamina: 100.0,
            idle_recovery_interval_secs: 1.0,

            weather_min_interval_secs: 45.0,
            weather_max_interval_secs: 60.0,
            weather_blend_secs: 4.0,

            undo_depth: 10,
            leaderboard_size: 10,

            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| CourierError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.run_duration_secs <= 0.0 {
            return Err(CourierError::Config("run_duration_secs must be positive".into()));
        }

        if self.max_carry_weight <= 0.0 {
            return Err(CourierError::Config("max_carry_weight must be positive".into()));
        }

        if self.weather_min_interval_secs > self.weather_max_interval_secs {
            return Err(CourierError::Config(format!(
                "weather_min_interval_secs ({}) should be <= weather_max_interval_secs ({})",
                self.weather_min_interval_secs, self.weather_max_interval_secs
            )));
        }

        if self.weather_blend_secs <= 0.0 || self.idle_recovery_interval_secs <= 0.0 {
            return Err(CourierError::Config("Blend and recovery intervals must be positive".into()));
        }

        if self.undo_depth == 0 || self.leaderboard_size == 0 {
            return Err(CourierError::Config("undo_depth and leaderboard_size must be at least 1".into()));
        }

        if !(0..=100).contains(&self.starting_reputation) {
            return Err(CourierError::Config("starting_reputation must be within 0..=100".into()));
        }

        Ok(())
    }
}

/// Where the content provider looks for data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the live city API, with trailing slash
    pub base_url: String,

    /// Directory refreshed by every successful live fetch
    pub cache_dir: PathBuf,

    /// Bundled offline data, read when the cache has no copy
    pub fallback_dir: PathBuf,

    /// Upper bound for a single live request
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tigerds-api.kindflower-ccaf48b6.eastus.azurecontainerapps.io/".into(),
            cache_dir: PathBuf::from("api_cache"),
            fallback_dir: PathBuf::from("data"),
            timeout_secs: 5,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str("run_duration_secs = 300.0\nseed = 7\n").unwrap();
        assert_eq!(config.run_duration_secs, 300.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_carry_weight, 10.0);
        assert_eq!(config.undo_depth, 10);
    }

    #[test]
    fn test_inverted_weather_interval_rejected() {
        let config = GameConfig {
            weather_min_interval_secs: 70.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(CourierError::Config(_))));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert!(matches!(
            GameConfig::from_toml_str("run_duration_secs = \"soon\""),
            Err(CourierError::Config(_))
        ));
    }
}
