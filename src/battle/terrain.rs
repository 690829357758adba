//! Battle terrain types and their effects
//!
//! Terrain is rolled once when the map is built and never changes.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{DEFAULT_MOVEMENT_COST, MAX_ELEVATION};
use crate::core::error::{Result, SetupError};
use crate::core::rng::RandomSource;

/// Primary terrain type for a battle hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    Open,
    Forest,
    Rough,
    Urban,
    Water,
    HighRelief,
}

impl TerrainKind {
    /// Movement points spent to enter a hex of this terrain
    pub fn movement_cost(&self) -> u32 {
        match self {
            TerrainKind::Open => DEFAULT_MOVEMENT_COST,
            TerrainKind::Forest => 2,
            TerrainKind::Rough => 2,
            TerrainKind::Urban => 2,
            TerrainKind::Water => 3,
            TerrainKind::HighRelief => 3,
        }
    }

    /// Does this terrain raise the ground?
    pub fn is_elevated(&self) -> bool {
        matches!(self, TerrainKind::Rough | TerrainKind::HighRelief)
    }
}

/// Immutable per-hex attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TerrainCell {
    pub kind: TerrainKind,
    pub elevation: u8,
}

impl TerrainCell {
    pub fn new(kind: TerrainKind, elevation: u8) -> Self {
        Self {
            kind,
            elevation: elevation.min(MAX_ELEVATION),
        }
    }

    pub fn movement_cost(&self) -> u32 {
        self.kind.movement_cost()
    }
}

/// Relative frequency of each non-open terrain kind on a generated map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainProfile {
    pub forest: f64,
    pub rough: f64,
    pub urban: f64,
    pub water: f64,
    pub high_relief: f64,
    pub max_elevation: u8,
}

impl Default for TerrainProfile {
    fn default() -> Self {
        Self {
            forest: 0.15,
            rough: 0.10,
            urban: 0.05,
            water: 0.05,
            high_relief: 0.05,
            max_elevation: MAX_ELEVATION,
        }
    }
}

impl TerrainProfile {
    /// All open ground, flat
    pub fn open() -> Self {
        Self {
            forest: 0.0,
            rough: 0.0,
            urban: 0.0,
            water: 0.0,
            high_relief: 0.0,
            max_elevation: 0,
        }
    }

    fn bands(&self) -> [(TerrainKind, f64); 5] {
        [
            (TerrainKind::Forest, self.forest),
            (TerrainKind::Rough, self.rough),
            (TerrainKind::Urban, self.urban),
            (TerrainKind::Water, self.water),
            (TerrainKind::HighRelief, self.high_relief),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let bands = self.bands();
        if bands.iter().any(|(_, f)| *f < 0.0) {
            return Err(SetupError::InvalidConfig(
                "terrain frequencies must be non-negative".into(),
            ));
        }
        let total: f64 = bands.iter().map(|(_, f)| f).sum();
        if total > 1.0 {
            return Err(SetupError::InvalidConfig(format!(
                "terrain frequencies sum to {:.2}, expected at most 1.0",
                total
            )));
        }
        if self.max_elevation > MAX_ELEVATION {
            return Err(SetupError::InvalidConfig(format!(
                "max_elevation ({}) exceeds {}",
                self.max_elevation, MAX_ELEVATION
            )));
        }
        Ok(())
    }

    /// Roll one cell. Draw order: kind, then elevation for raised ground.
    pub fn roll_cell(&self, rng: &mut dyn RandomSource) -> TerrainCell {
        let draw = rng.roll();
        let mut cumulative = 0.0;
        let mut kind = TerrainKind::Open;
        for (band_kind, frequency) in self.bands() {
            cumulative += frequency;
            if draw < cumulative {
                kind = band_kind;
                break;
            }
        }

        let elevation = match kind {
            TerrainKind::HighRelief => {
                let low = (self.max_elevation / 2) as i32;
                rng.roll_range(low, self.max_elevation as i32) as u8
            }
            TerrainKind::Rough => rng.roll_range(0, (self.max_elevation / 2) as i32) as u8,
            _ => 0,
        };

        TerrainCell::new(kind, elevation)
    }
}
