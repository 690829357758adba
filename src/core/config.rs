//! Battle configuration with documented defaults
//!
//! Every field has a default, so a TOML file only needs to name what it
//! changes. Values are checked once by `validate` before a battle is built.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::battle::constants::{
    DEFAULT_DEPLOYMENT_DEPTH, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_HEAT_DISSIPATION,
    DEFAULT_SHUTDOWN_CHANCE, DEFAULT_SHUTDOWN_THRESHOLD, MAX_HEAT,
};
use crate::battle::terrain::TerrainProfile;
use crate::core::error::{Result, SetupError};

/// Top-level configuration for one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub grid: GridConfig,
    pub heat: HeatConfig,
    /// Columns reserved on each map edge for deployment
    pub deployment_depth: u32,
}

/// Map dimensions and terrain mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    pub terrain: TerrainProfile,
}

/// Heat accumulation and shutdown rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    /// Heat at or above which a unit risks shutdown at end of turn
    pub shutdown_threshold: u32,
    /// Heat removed at the start of each of the unit's turns
    pub dissipation: u32,
    /// Probability that an overheated unit shuts down
    pub shutdown_chance: f64,
    /// Heat added by a completed move
    pub movement_heat: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            heat: HeatConfig::default(),
            deployment_depth: DEFAULT_DEPLOYMENT_DEPTH,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            terrain: TerrainProfile::default(),
        }
    }
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            shutdown_threshold: DEFAULT_SHUTDOWN_THRESHOLD,
            dissipation: DEFAULT_HEAT_DISSIPATION,
            shutdown_chance: DEFAULT_SHUTDOWN_CHANCE,
            movement_heat: 0,
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(SetupError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }

        if self.deployment_depth == 0 || self.deployment_depth * 2 > self.grid.width {
            return Err(SetupError::InvalidConfig(format!(
                "deployment_depth ({}) must be positive and fit twice in width ({})",
                self.deployment_depth, self.grid.width
            )));
        }

        if self.heat.shutdown_threshold == 0 || self.heat.shutdown_threshold > MAX_HEAT {
            return Err(SetupError::InvalidConfig(format!(
                "shutdown_threshold ({}) must be within 1..={}",
                self.heat.shutdown_threshold, MAX_HEAT
            )));
        }

        // Shut-down units only recover through dissipation
        if self.heat.dissipation == 0 {
            return Err(SetupError::InvalidConfig(
                "heat dissipation must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.heat.shutdown_chance) {
            return Err(SetupError::InvalidConfig(format!(
                "shutdown_chance ({}) must be within [0, 1]",
                self.heat.shutdown_chance
            )));
        }

        self.grid.terrain.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BattleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_heat_rules() {
        let config = BattleConfig::default();
        assert_eq!(config.heat.shutdown_threshold, 30);
        assert_eq!(config.heat.dissipation, 10);
        assert_eq!(config.heat.shutdown_chance, 0.5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BattleConfig::from_toml_str(
            r#"
            [grid]
            width = 20

            [heat]
            shutdown_threshold = 25
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.grid.width, 20);
        assert_eq!(config.grid.height, DEFAULT_GRID_HEIGHT);
        assert_eq!(config.heat.shutdown_threshold, 25);
        assert_eq!(config.heat.dissipation, DEFAULT_HEAT_DISSIPATION);
    }

    #[test]
    fn test_threshold_above_heat_cap_rejected() {
        let mut config = BattleConfig::default();
        config.heat.shutdown_threshold = MAX_HEAT + 1;
        assert!(matches!(config.validate(), Err(SetupError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_dissipation_rejected() {
        let mut config = BattleConfig::default();
        config.heat.dissipation = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deployment_must_fit() {
        let mut config = BattleConfig::default();
        config.grid.width = 4;
        config.deployment_depth = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let result = BattleConfig::from_toml_str("grid = 12");
        assert!(matches!(result, Err(SetupError::TomlError(_))));
    }

    #[test]
    fn test_load_sample_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/battle.toml");
        let config = BattleConfig::load(path).expect("sample config should load");
        assert!(config.validate().is_ok());
    }
}
