//! Damage model: armor absorbs first, structure second, within one location
//!
//! Damage beyond a location's remaining structure is discarded. Nothing
//! cascades to neighboring locations.

use serde::{Deserialize, Serialize};

use crate::combat::body_zone::BodyLocation;

/// Remaining and maximum protection at one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationState {
    pub armor: u32,
    pub max_armor: u32,
    pub structure: u32,
    pub max_structure: u32,
}

impl LocationState {
    /// A fresh location at full armor and structure
    pub fn new(armor: u32, structure: u32) -> Self {
        Self {
            armor,
            max_armor: armor,
            structure,
            max_structure: structure,
        }
    }

    /// Armor plus structure left
    pub fn remaining(&self) -> u32 {
        self.armor + self.structure
    }

    pub fn is_destroyed(&self) -> bool {
        self.structure == 0
    }

    /// Apply one damage event: armor first, spillover to structure
    pub fn absorb(&mut self, damage: u32) -> Absorption {
        let armor = damage.min(self.armor);
        self.armor -= armor;

        let spillover = damage - armor;
        let structure = spillover.min(self.structure);
        self.structure -= structure;

        Absorption {
            armor,
            structure,
            discarded: spillover - structure,
        }
    }
}

/// How one damage event was split across a location's layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Absorption {
    pub armor: u32,
    pub structure: u32,
    /// Excess beyond remaining structure
    pub discarded: u32,
}

impl Absorption {
    /// Damage that actually reduced the location
    pub fn applied(&self) -> u32 {
        self.armor + self.structure
    }
}

/// Side effect of a location losing all structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalEffect {
    /// Leg destroyed: maximum movement reduced by one
    MobilityLoss,
    /// Recorded only; weapon bookkeeping lives outside this core
    Recorded,
}

/// A critical hit, at most one per location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalHit {
    pub location: BodyLocation,
    pub effect: CriticalEffect,
}

impl CriticalHit {
    pub fn at(location: BodyLocation) -> Self {
        let effect = if location.is_leg() {
            CriticalEffect::MobilityLoss
        } else {
            CriticalEffect::Recorded
        };
        Self { location, effect }
    }
}

/// Result of applying one damage event to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub location: BodyLocation,
    pub incoming: u32,
    pub absorption: Absorption,
    /// Set only the first time the location's structure hits zero
    pub critical: Option<CriticalHit>,
    /// Set only on the event that destroyed the unit
    pub destroyed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armor_absorbs_first() {
        let mut loc = LocationState::new(10, 5);
        let split = loc.absorb(8);
        assert_eq!(split, Absorption { armor: 8, structure: 0, discarded: 0 });
        assert_eq!((loc.armor, loc.structure), (2, 5));
    }

    #[test]
    fn test_spillover_hits_structure() {
        let mut loc = LocationState::new(2, 5);
        let split = loc.absorb(4);
        assert_eq!(split.armor, 2);
        assert_eq!(split.structure, 2);
        assert_eq!((loc.armor, loc.structure), (0, 3));
    }

    #[test]
    fn test_excess_is_discarded() {
        let mut loc = LocationState::new(2, 5);
        let split = loc.absorb(10);
        assert_eq!(split, Absorption { armor: 2, structure: 5, discarded: 3 });
        assert!(loc.is_destroyed());
        assert_eq!(loc.remaining(), 0);
    }

    #[test]
    fn test_zero_damage_changes_nothing() {
        let mut loc = LocationState::new(4, 4);
        let split = loc.absorb(0);
        assert_eq!(split.applied(), 0);
        assert_eq!(loc, LocationState::new(4, 4));
    }

    #[test]
    fn test_leg_critical_costs_mobility() {
        assert_eq!(
            CriticalHit::at(BodyLocation::LeftLeg).effect,
            CriticalEffect::MobilityLoss
        );
        assert_eq!(
            CriticalHit::at(BodyLocation::RightArm).effect,
            CriticalEffect::Recorded
        );
    }
}
