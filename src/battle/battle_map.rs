//! Battle map: bounded hex grid, terrain lookup, and occupancy
//!
//! The occupancy map is the single record of which hex holds which unit.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::battle::constants::DEFAULT_MOVEMENT_COST;
use crate::battle::hex::HexCoord;
use crate::battle::terrain::{TerrainCell, TerrainKind, TerrainProfile};
use crate::core::error::GridError;
use crate::core::rng::RandomSource;
use crate::core::types::UnitId;

/// The full battle map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleMap {
    pub width: u32,
    pub height: u32,
    cells: HashMap<HexCoord, TerrainCell>,
    occupancy: HashMap<HexCoord, UnitId>,
}

impl BattleMap {
    /// Create a new battle map with open, flat terrain
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = HashMap::new();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                cells.insert(HexCoord::new(col, row), TerrainCell::default());
            }
        }

        Self {
            width,
            height,
            cells,
            occupancy: HashMap::new(),
        }
    }

    /// Roll terrain for every hex, row-major, from the profile
    pub fn generate(
        width: u32,
        height: u32,
        profile: &TerrainProfile,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let mut map = Self::new(width, height);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let cell = profile.roll_cell(rng);
                map.cells.insert(HexCoord::new(col, row), cell);
            }
        }
        map
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.in_bounds(self.width, self.height)
    }

    /// Exact hex distance
    pub fn distance(&self, a: HexCoord, b: HexCoord) -> u32 {
        a.distance(&b)
    }

    /// Up to 6 adjacent hexes inside the map
    pub fn neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.in_bounds(*n))
            .collect()
    }

    /// Valid hexes within `radius` of `center`
    pub fn hexes_in_range(&self, center: HexCoord, radius: u32) -> BTreeSet<HexCoord> {
        center
            .hexes_in_range(radius)
            .into_iter()
            .filter(|h| self.in_bounds(*h))
            .collect()
    }

    /// Every valid hex, row-major
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height as i32)
            .flat_map(move |row| (0..self.width as i32).map(move |col| HexCoord::new(col, row)))
    }

    pub fn terrain(&self, coord: HexCoord) -> Option<&TerrainCell> {
        self.cells.get(&coord)
    }

    /// Set terrain at a coordinate (map construction only)
    pub fn set_terrain(&mut self, coord: HexCoord, kind: TerrainKind) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            *cell = TerrainCell::new(kind, cell.elevation);
        }
    }

    /// Set elevation at a coordinate (map construction only)
    pub fn set_elevation(&mut self, coord: HexCoord, elevation: u8) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            *cell = TerrainCell::new(cell.kind, elevation);
        }
    }

    pub fn elevation(&self, coord: HexCoord) -> u8 {
        self.terrain(coord).map(|c| c.elevation).unwrap_or(0)
    }

    /// Cost to enter a hex; hexes without a terrain record cost the default
    pub fn movement_cost(&self, coord: HexCoord) -> u32 {
        self.terrain(coord)
            .map(|c| c.movement_cost())
            .unwrap_or(DEFAULT_MOVEMENT_COST)
    }

    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.occupancy.contains_key(&coord)
    }

    pub fn unit_at(&self, coord: HexCoord) -> Option<UnitId> {
        self.occupancy.get(&coord).copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.len()
    }

    pub fn place_unit(&mut self, coord: HexCoord, unit: UnitId) -> Result<(), GridError> {
        if !self.in_bounds(coord) {
            return Err(GridError::OutOfBounds(coord));
        }
        if let Some(occupant) = self.unit_at(coord) {
            return Err(GridError::Occupied {
                hex: coord,
                occupant,
            });
        }
        self.occupancy.insert(coord, unit);
        Ok(())
    }

    pub fn remove_unit(&mut self, coord: HexCoord) -> Result<UnitId, GridError> {
        self.occupancy
            .remove(&coord)
            .ok_or(GridError::Empty(coord))
    }

    /// Move whatever occupies `from` to `to`. Moving onto itself is a no-op.
    pub fn move_unit(&mut self, from: HexCoord, to: HexCoord) -> Result<UnitId, GridError> {
        let unit = self.unit_at(from).ok_or(GridError::Empty(from))?;
        if from == to {
            return Ok(unit);
        }
        if !self.in_bounds(to) {
            return Err(GridError::OutOfBounds(to));
        }
        if let Some(occupant) = self.unit_at(to) {
            return Err(GridError::Occupied { hex: to, occupant });
        }
        self.occupancy.remove(&from);
        self.occupancy.insert(to, unit);
        Ok(unit)
    }
}
