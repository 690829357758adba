//! Combat units: position, movement budget, heat, and the location damage model
//!
//! A unit's position is only changed through `Battlefield`, which keeps it in
//! step with the map's occupancy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::battle::constants::{
    DEFAULT_SHUTDOWN_THRESHOLD, MAX_HEAT, MIN_MOVEMENT_POINTS, UNPILOTED_GUNNERY,
};
use crate::battle::hex::{HexCoord, HexDirection};
use crate::combat::body_zone::{BodyLocation, LocationTable};
use crate::combat::damage::{CriticalEffect, CriticalHit, DamageReport, LocationState};
use crate::combat::weapons::WeaponKind;
use crate::core::error::InvariantViolation;
use crate::core::rng::RandomSource;
use crate::core::types::UnitId;

/// Which side of the battle a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The player's company
    Attacker,
    /// Hostile forces
    Defender,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Attacker => "player",
            Side::Defender => "hostile",
        }
    }
}

/// Who issues this unit's commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    #[default]
    Player,
    Ai,
}

/// Chassis weight tier. Affects base stats only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightClass {
    Light,
    Medium,
    Heavy,
    Assault,
}

impl WeightClass {
    pub fn all() -> [WeightClass; 4] {
        [
            WeightClass::Light,
            WeightClass::Medium,
            WeightClass::Heavy,
            WeightClass::Assault,
        ]
    }

    /// Movement points per round
    pub fn base_movement(&self) -> u32 {
        match self {
            WeightClass::Light => 6,
            WeightClass::Medium => 5,
            WeightClass::Heavy => 4,
            WeightClass::Assault => 3,
        }
    }

    /// Armor and structure scale, in percent of a light chassis
    pub fn protection_pct(&self) -> u32 {
        match self {
            WeightClass::Light => 100,
            WeightClass::Medium => 150,
            WeightClass::Heavy => 200,
            WeightClass::Assault => 250,
        }
    }

    pub fn default_weapon(&self) -> WeaponKind {
        match self {
            WeightClass::Light => WeaponKind::Laser,
            WeightClass::Medium => WeaponKind::Missile,
            WeightClass::Heavy | WeightClass::Assault => WeaponKind::Autocannon,
        }
    }
}

/// An assigned pilot. Lower skill numbers are better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    pub name: String,
    pub gunnery: u8,
    pub piloting: u8,
}

impl Pilot {
    pub fn new(name: impl Into<String>, gunnery: u8, piloting: u8) -> Self {
        Self {
            name: name.into(),
            gunnery,
            piloting,
        }
    }
}

/// Status tags carried between turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTag {
    /// Overheated: cannot move or act
    Shutdown,
}

/// Result of the end-of-turn heat check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatCheck {
    /// Below threshold, nothing to clear
    Nominal,
    /// Over threshold but the roll passed
    Held,
    /// Shutdown applied this turn
    ShutDown,
    /// Heat fell below threshold and shutdown was cleared
    Restarted,
}

/// The per-unit combat record simulated each turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: UnitId,
    pub name: String,
    pub side: Side,
    pub weight_class: WeightClass,
    pub controller: Controller,
    pub pilot: Option<Pilot>,
    pub weapon: WeaponKind,

    // Position
    position: HexCoord,
    pub facing: HexDirection,

    // Resources
    pub movement_points: u32,
    pub max_movement_points: u32,
    pub heat: u32,
    pub heat_threshold: u32,
    /// Moved this round; cleared when a round opens
    pub has_moved: bool,
    pub has_acted: bool,

    // Damage model
    pub locations: LocationTable<LocationState>,
    pub status: BTreeSet<StatusTag>,
    pub criticals: Vec<CriticalHit>,
    destroyed: bool,
}

impl CombatUnit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        side: Side,
        weight_class: WeightClass,
        locations: LocationTable<LocationState>,
        max_movement_points: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            weight_class,
            controller: Controller::default(),
            pilot: None,
            weapon: weight_class.default_weapon(),
            position: HexCoord::default(),
            facing: HexDirection::default(),
            movement_points: max_movement_points,
            max_movement_points,
            heat: 0,
            heat_threshold: DEFAULT_SHUTDOWN_THRESHOLD,
            has_moved: false,
            has_acted: false,
            locations,
            status: BTreeSet::new(),
            criticals: Vec::new(),
            destroyed: false,
        }
    }

    /// Set the starting hex. Only meaningful before deployment.
    pub fn at(mut self, position: HexCoord) -> Self {
        self.position = position;
        self
    }

    pub fn with_pilot(mut self, pilot: Pilot) -> Self {
        self.pilot = Some(pilot);
        self
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_weapon(mut self, weapon: WeaponKind) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn position(&self) -> HexCoord {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: HexCoord) {
        self.position = position;
    }

    pub fn gunnery(&self) -> u8 {
        self.pilot.as_ref().map_or(UNPILOTED_GUNNERY, |p| p.gunnery)
    }

    pub fn piloting(&self) -> Option<u8> {
        self.pilot.as_ref().map(|p| p.piloting)
    }

    /// Sum of remaining armor and structure over all locations
    pub fn health(&self) -> u32 {
        self.locations.values().map(|l| l.remaining()).sum()
    }

    pub fn max_health(&self) -> u32 {
        self.locations
            .values()
            .map(|l| l.max_armor + l.max_structure)
            .sum()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_shutdown(&self) -> bool {
        self.status.contains(&StatusTag::Shutdown)
    }

    pub fn can_move(&self) -> bool {
        !self.destroyed && !self.has_moved && !self.is_shutdown()
    }

    pub fn can_act(&self) -> bool {
        !self.destroyed && !self.has_acted && !self.is_shutdown()
    }

    /// Both budgets spent, or nothing can be spent at all
    pub fn turn_exhausted(&self) -> bool {
        self.destroyed || self.is_shutdown() || (self.has_moved && self.has_acted)
    }

    pub fn has_critical(&self, location: BodyLocation) -> bool {
        self.criticals.iter().any(|c| c.location == location)
    }

    /// Start-of-turn reset: refill movement, clear flags, shed heat
    pub fn start_turn(&mut self, dissipation: u32) {
        self.movement_points = self.max_movement_points;
        self.has_moved = false;
        self.has_acted = false;
        self.heat = self.heat.saturating_sub(dissipation);
    }

    /// Add heat, saturating at the cap
    pub fn add_heat(&mut self, amount: u32) {
        self.heat = self.heat.saturating_add(amount).min(MAX_HEAT);
    }

    /// End-of-turn heat check. Draws exactly one roll when overheated.
    pub fn check_heat(&mut self, shutdown_chance: f64, rng: &mut dyn RandomSource) -> HeatCheck {
        if self.heat >= self.heat_threshold {
            if rng.roll() < shutdown_chance {
                self.status.insert(StatusTag::Shutdown);
                HeatCheck::ShutDown
            } else {
                HeatCheck::Held
            }
        } else if self.status.remove(&StatusTag::Shutdown) {
            HeatCheck::Restarted
        } else {
            HeatCheck::Nominal
        }
    }

    /// Apply one damage event to a location.
    ///
    /// Records a critical hit the first time the location's structure hits
    /// zero and re-evaluates destruction; `destroyed` in the report is set
    /// only on the transition.
    pub fn apply_damage(&mut self, location: BodyLocation, amount: u32) -> DamageReport {
        let absorption = self.locations[location].absorb(amount);

        let mut critical = None;
        if self.locations[location].is_destroyed() && !self.has_critical(location) {
            let hit = CriticalHit::at(location);
            if hit.effect == CriticalEffect::MobilityLoss {
                self.max_movement_points = self
                    .max_movement_points
                    .saturating_sub(1)
                    .max(MIN_MOVEMENT_POINTS);
                self.movement_points = self.movement_points.min(self.max_movement_points);
            }
            self.criticals.push(hit);
            critical = Some(hit);
        }

        let was_destroyed = self.destroyed;
        self.destroyed = self.destroyed || self.is_wrecked();

        DamageReport {
            location,
            incoming: amount,
            absorption,
            critical,
            destroyed: self.destroyed && !was_destroyed,
        }
    }

    /// No health left, or a vital location has no structure
    fn is_wrecked(&self) -> bool {
        self.health() == 0
            || BodyLocation::all()
                .into_iter()
                .filter(|l| l.is_vital())
                .any(|l| self.locations[l].is_destroyed())
    }

    /// Check damage-model and heat invariants
    pub fn audit(&self) -> Result<(), InvariantViolation> {
        let fault = |detail: String| InvariantViolation {
            unit: self.id,
            detail,
        };

        for (location, state) in self.locations.iter() {
            if state.armor > state.max_armor {
                return Err(fault(format!(
                    "{} armor {} above maximum {}",
                    location, state.armor, state.max_armor
                )));
            }
            if state.structure > state.max_structure {
                return Err(fault(format!(
                    "{} structure {} above maximum {}",
                    location, state.structure, state.max_structure
                )));
            }
        }
        if self.heat > MAX_HEAT {
            return Err(fault(format!("heat {} above cap {}", self.heat, MAX_HEAT)));
        }
        if self.is_wrecked() && !self.destroyed {
            return Err(fault("wrecked but not marked destroyed".into()));
        }
        Ok(())
    }

    /// Force the record back inside its invariants
    pub fn clamp_to_invariants(&mut self) {
        for state in self.locations.values_mut() {
            state.armor = state.armor.min(state.max_armor);
            state.structure = state.structure.min(state.max_structure);
        }
        self.heat = self.heat.min(MAX_HEAT);
        self.destroyed = self.destroyed || self.is_wrecked();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedRolls;

    fn uniform(armor: u32, structure: u32) -> LocationTable<LocationState> {
        LocationTable::from_fn(|_| LocationState::new(armor, structure))
    }

    fn test_unit() -> CombatUnit {
        CombatUnit::new(UnitId(1), "Test", Side::Attacker, WeightClass::Medium, uniform(10, 5), 5)
    }

    #[test]
    fn test_health_sums_locations() {
        let unit = test_unit();
        assert_eq!(unit.health(), 8 * 15);
        assert_eq!(unit.max_health(), unit.health());
    }

    #[test]
    fn test_center_torso_scenario() {
        let mut unit = test_unit();

        let first = unit.apply_damage(BodyLocation::CenterTorso, 8);
        let ct = unit.locations[BodyLocation::CenterTorso];
        assert_eq!((ct.armor, ct.structure), (2, 5));
        assert!(first.critical.is_none());
        assert!(!first.destroyed);

        let second = unit.apply_damage(BodyLocation::CenterTorso, 10);
        let ct = unit.locations[BodyLocation::CenterTorso];
        assert_eq!((ct.armor, ct.structure), (0, 0));
        assert_eq!(second.absorption.discarded, 3);
        assert!(second.critical.is_some());
        assert!(second.destroyed);
        assert!(unit.is_destroyed());
    }

    #[test]
    fn test_destruction_reported_once() {
        let mut unit = test_unit();
        assert!(unit.apply_damage(BodyLocation::Head, 50).destroyed);
        let again = unit.apply_damage(BodyLocation::Head, 50);
        assert!(!again.destroyed);
        assert!(again.critical.is_none());
        assert!(unit.is_destroyed());
    }

    #[test]
    fn test_arm_loss_is_not_fatal() {
        let mut unit = test_unit();
        let report = unit.apply_damage(BodyLocation::LeftArm, 40);
        assert!(report.critical.is_some());
        assert!(!report.destroyed);
        assert!(!unit.is_destroyed());
    }

    #[test]
    fn test_leg_critical_reduces_movement_once() {
        let mut unit = test_unit();
        unit.apply_damage(BodyLocation::LeftLeg, 15);
        assert_eq!(unit.max_movement_points, 4);
        unit.apply_damage(BodyLocation::LeftLeg, 15);
        assert_eq!(unit.max_movement_points, 4);
        unit.apply_damage(BodyLocation::RightLeg, 15);
        assert_eq!(unit.max_movement_points, 3);
    }

    #[test]
    fn test_leg_critical_floor_is_one() {
        let mut unit = CombatUnit::new(UnitId(2), "Crawler", Side::Defender, WeightClass::Assault, uniform(1, 1), 1);
        unit.apply_damage(BodyLocation::RightLeg, 5);
        assert_eq!(unit.max_movement_points, 1);
    }

    #[test]
    fn test_zero_health_destroys() {
        let mut unit = CombatUnit::new(UnitId(3), "Paper", Side::Defender, WeightClass::Light, uniform(0, 1), 4);
        for loc in BodyLocation::all() {
            if !loc.is_vital() {
                unit.apply_damage(loc, 1);
            }
        }
        assert!(!unit.is_destroyed());
        assert!(unit.apply_damage(BodyLocation::Head, 1).destroyed);
    }

    #[test]
    fn test_heat_caps_at_fifty() {
        let mut unit = test_unit();
        unit.add_heat(45);
        unit.add_heat(45);
        assert_eq!(unit.heat, MAX_HEAT);
    }

    #[test]
    fn test_start_turn_resets_budget() {
        let mut unit = test_unit();
        unit.has_moved = true;
        unit.has_acted = true;
        unit.movement_points = 0;
        unit.heat = 14;
        unit.start_turn(10);
        assert!(!unit.has_moved && !unit.has_acted);
        assert_eq!(unit.movement_points, 5);
        assert_eq!(unit.heat, 4);
        unit.start_turn(10);
        assert_eq!(unit.heat, 0);
    }

    #[test]
    fn test_heat_check_shutdown_branch() {
        let mut unit = test_unit();
        unit.heat = 32;
        assert_eq!(unit.check_heat(0.5, &mut ScriptedRolls::constant(0.5)), HeatCheck::Held);
        assert!(!unit.is_shutdown());
        assert_eq!(unit.check_heat(0.5, &mut ScriptedRolls::constant(0.49)), HeatCheck::ShutDown);
        assert!(unit.is_shutdown());
        assert!(!unit.can_move() && !unit.can_act());
    }

    #[test]
    fn test_shutdown_clears_below_threshold() {
        let mut unit = test_unit();
        unit.status.insert(StatusTag::Shutdown);
        unit.heat = 29;
        let mut rng = ScriptedRolls::constant(0.0);
        assert_eq!(unit.check_heat(0.5, &mut rng), HeatCheck::Restarted);
        assert!(!unit.is_shutdown());
        assert_eq!(unit.check_heat(0.5, &mut rng), HeatCheck::Nominal);
    }

    #[test]
    fn test_audit_flags_overfull_location() {
        let mut unit = test_unit();
        assert!(unit.audit().is_ok());
        unit.locations[BodyLocation::LeftArm].armor = 99;
        let fault = unit.audit().unwrap_err();
        assert_eq!(fault.unit, UnitId(1));
        unit.clamp_to_invariants();
        assert!(unit.audit().is_ok());
        assert_eq!(unit.locations[BodyLocation::LeftArm].armor, 10);
    }

    #[test]
    fn test_gunnery_defaults_without_pilot() {
        let unit = test_unit();
        assert_eq!(unit.gunnery(), UNPILOTED_GUNNERY);
        assert_eq!(unit.piloting(), None);

        let piloted = test_unit().with_pilot(Pilot::new("Ace", 2, 3));
        assert_eq!(piloted.gunnery(), 2);
        assert_eq!(piloted.piloting(), Some(3));
    }
}
