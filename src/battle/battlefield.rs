//! Map plus unit roster, kept in agreement
//!
//! Every position change goes through here so the occupancy map and
//! `CombatUnit::position` are updated by the same call.

use serde::{Deserialize, Serialize};

use crate::battle::battle_map::BattleMap;
use crate::battle::hex::HexCoord;
use crate::battle::units::{CombatUnit, Side};
use crate::core::error::GridError;
use crate::core::types::UnitId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battlefield {
    pub map: BattleMap,
    units: Vec<CombatUnit>,
}

impl Battlefield {
    pub fn new(map: BattleMap) -> Self {
        Self {
            map,
            units: Vec::new(),
        }
    }

    /// Place a unit at its starting position and add it to the roster
    pub fn deploy(&mut self, unit: CombatUnit) -> Result<(), GridError> {
        self.map.place_unit(unit.position(), unit.id)?;
        self.units.push(unit);
        Ok(())
    }

    /// Move a unit, updating map and unit together. Returns the old hex.
    pub fn relocate(&mut self, id: UnitId, to: HexCoord) -> Result<HexCoord, GridError> {
        let index = self.index_of(id).ok_or(GridError::UnknownUnit(id))?;
        let from = self.units[index].position();
        self.map.move_unit(from, to)?;
        self.units[index].set_position(to);
        Ok(from)
    }

    /// Clear a destroyed unit's hex. The unit stays in the roster.
    pub fn remove_wreck(&mut self, id: UnitId) -> Result<(), GridError> {
        let position = self.unit(id).ok_or(GridError::UnknownUnit(id))?.position();
        if self.map.unit_at(position) == Some(id) {
            self.map.remove_unit(position)?;
        }
        Ok(())
    }

    fn index_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&CombatUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut CombatUnit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// All units in deployment order
    pub fn units(&self) -> &[CombatUnit] {
        &self.units
    }

    /// Two distinct units, both mutable
    pub fn pair_mut(
        &mut self,
        a: UnitId,
        b: UnitId,
    ) -> Option<(&mut CombatUnit, &mut CombatUnit)> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.units.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.units.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Forget last round's moves so they no longer count against targets
    pub fn clear_round_movement(&mut self) {
        for unit in &mut self.units {
            unit.has_moved = false;
        }
    }

    /// Living units on one side, in deployment order
    pub fn living(&self, side: Side) -> impl Iterator<Item = &CombatUnit> {
        self.units
            .iter()
            .filter(move |u| u.side == side && !u.is_destroyed())
    }

    pub fn side_eliminated(&self, side: Side) -> bool {
        self.living(side).next().is_none()
    }

    /// Every unit's position matches the occupancy map
    pub fn positions_consistent(&self) -> bool {
        let is_placed = |u: &CombatUnit| self.map.unit_at(u.position()) == Some(u.id);
        let living_placed = self
            .units
            .iter()
            .filter(|u| !u.is_destroyed())
            .all(is_placed);
        let placed = self.units.iter().filter(|u| is_placed(*u)).count();
        living_placed && self.map.occupied_count() == placed
    }
}
