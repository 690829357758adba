//! Unit templates, mission parameters, and the opposing-force factory
//!
//! Templates arrive from the company roster (player units) or are rolled by
//! a `UnitFactory` (hostiles). Both are validated before any unit exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::battle::constants::{DEFAULT_HEALTH_VARIANCE_PCT, MAX_SKILL};
use crate::battle::units::{CombatUnit, Controller, Pilot, Side, WeightClass};
use crate::combat::body_zone::{BodyLocation, LocationTable};
use crate::combat::damage::LocationState;
use crate::combat::weapons::WeaponKind;
use crate::core::error::{Result, SetupError};
use crate::core::rng::RandomSource;
use crate::core::types::UnitId;

/// Armor and structure maxima for one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMax {
    pub armor: u32,
    pub structure: u32,
}

impl LocationMax {
    pub fn new(armor: u32, structure: u32) -> Self {
        Self { armor, structure }
    }
}

/// Chassis stats for a unit about to enter battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChassisTemplate {
    pub name: String,
    pub weight_class: WeightClass,
    pub base_movement: u32,
    #[serde(default)]
    pub weapon: Option<WeaponKind>,
    /// Keyed by location so a missing entry can be reported
    pub locations: BTreeMap<BodyLocation, LocationMax>,
}

impl ChassisTemplate {
    /// The stock chassis for a weight class
    pub fn standard(name: impl Into<String>, weight_class: WeightClass) -> Self {
        let pct = weight_class.protection_pct();
        let scale = |v: u32| (v * pct / 100).max(1);

        let locations = BodyLocation::all()
            .into_iter()
            .map(|loc| {
                let (armor, structure) = match loc {
                    BodyLocation::Head => (6, 3),
                    BodyLocation::CenterTorso => (12, 6),
                    BodyLocation::LeftTorso | BodyLocation::RightTorso => (9, 5),
                    BodyLocation::LeftArm | BodyLocation::RightArm => (6, 3),
                    BodyLocation::LeftLeg | BodyLocation::RightLeg => (8, 4),
                };
                let max = if loc == BodyLocation::Head {
                    // Cockpit structure does not grow with tonnage
                    LocationMax::new(scale(armor).min(9), structure)
                } else {
                    LocationMax::new(scale(armor), scale(structure))
                };
                (loc, max)
            })
            .collect();

        Self {
            name: name.into(),
            weight_class,
            base_movement: weight_class.base_movement(),
            weapon: None,
            locations,
        }
    }

    pub fn weapon(&self) -> WeaponKind {
        self.weapon
            .unwrap_or_else(|| self.weight_class.default_weapon())
    }

    /// Every location present with non-zero structure, and some movement
    pub fn validate(&self) -> Result<()> {
        if self.base_movement == 0 {
            return Err(SetupError::ZeroMovement(self.name.clone()));
        }
        for location in BodyLocation::all() {
            let max = self
                .locations
                .get(&location)
                .ok_or_else(|| SetupError::MissingLocation {
                    chassis: self.name.clone(),
                    location,
                })?;
            if max.structure == 0 {
                return Err(SetupError::ZeroStructure {
                    chassis: self.name.clone(),
                    location,
                });
            }
        }
        Ok(())
    }

    /// Fresh location table at full protection
    pub fn location_table(&self) -> Result<LocationTable<LocationState>> {
        self.validate()?;
        Ok(LocationTable::from_fn(|loc| {
            let max = self.locations[&loc];
            LocationState::new(max.armor, max.structure)
        }))
    }
}

/// One roster entry: a chassis and an optional pilot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub chassis: ChassisTemplate,
    #[serde(default)]
    pub pilot: Option<Pilot>,
}

impl UnitTemplate {
    pub fn new(chassis: ChassisTemplate) -> Self {
        Self {
            chassis,
            pilot: None,
        }
    }

    pub fn with_pilot(mut self, pilot: Pilot) -> Self {
        self.pilot = Some(pilot);
        self
    }

    /// Build a fresh combat unit for one side; position is set at deployment
    pub fn instantiate(&self, id: UnitId, side: Side) -> Result<CombatUnit> {
        self.validate()?;
        let controller = match side {
            Side::Attacker => Controller::Player,
            Side::Defender => Controller::Ai,
        };
        let mut unit = CombatUnit::new(
            id,
            self.chassis.name.clone(),
            side,
            self.chassis.weight_class,
            self.chassis.location_table()?,
            self.chassis.base_movement,
        )
        .with_controller(controller)
        .with_weapon(self.chassis.weapon());
        if let Some(pilot) = &self.pilot {
            unit = unit.with_pilot(pilot.clone());
        }
        Ok(unit)
    }

    pub fn validate(&self) -> Result<()> {
        self.chassis.validate()?;
        if let Some(pilot) = &self.pilot {
            for (skill, value) in [("gunnery", pilot.gunnery), ("piloting", pilot.piloting)] {
                if value > MAX_SKILL {
                    return Err(SetupError::SkillOutOfRange {
                        pilot: pilot.name.clone(),
                        skill,
                        value,
                        max: MAX_SKILL,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Ordered list of player unit templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub units: Vec<UnitTemplate>,
}

impl Roster {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let roster: Roster = toml::from_str(contents)?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.units.is_empty() {
            return Err(SetupError::EmptyRoster);
        }
        self.units.iter().try_for_each(|u| u.validate())
    }

    /// One piloted unit of each weight class
    pub fn standard_lance() -> Self {
        let names = ["Wasp", "Centurion", "Warhammer", "Atlas"];
        let units = WeightClass::all()
            .into_iter()
            .zip(names)
            .enumerate()
            .map(|(i, (class, name))| {
                UnitTemplate::new(ChassisTemplate::standard(name, class))
                    .with_pilot(Pilot::new(format!("MechWarrior {}", i + 1), 4, 5))
            })
            .collect();
        Self { units }
    }
}

/// How many hostiles a mission fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostileCount {
    Exact(u32),
    Range { min: u32, max: u32 },
}

impl HostileCount {
    pub fn roll(&self, rng: &mut dyn RandomSource) -> u32 {
        match *self {
            HostileCount::Exact(n) => n,
            HostileCount::Range { min, max } => rng.roll_range(min as i32, max as i32) as u32,
        }
    }
}

/// Opposing force parameters supplied by the contract system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionParams {
    pub hostiles: HostileCount,
    /// Each hostile location rolls within +/- this percent of stock
    #[serde(default = "default_health_variance")]
    pub health_variance_pct: u32,
    #[serde(default)]
    pub hostile_pilot: Option<Pilot>,
}

fn default_health_variance() -> u32 {
    DEFAULT_HEALTH_VARIANCE_PCT
}

impl MissionParams {
    pub fn new(hostiles: HostileCount) -> Self {
        Self {
            hostiles,
            health_variance_pct: DEFAULT_HEALTH_VARIANCE_PCT,
            hostile_pilot: None,
        }
    }
}

/// Produces the opposing force for a battle
pub trait UnitFactory {
    fn opposing_force(
        &mut self,
        mission: &MissionParams,
        rng: &mut dyn RandomSource,
    ) -> Vec<UnitTemplate>;
}

/// Rolls count, weight class, and per-location health
#[derive(Debug, Clone, Default)]
pub struct ProceduralFactory;

impl UnitFactory for ProceduralFactory {
    fn opposing_force(
        &mut self,
        mission: &MissionParams,
        rng: &mut dyn RandomSource,
    ) -> Vec<UnitTemplate> {
        let count = mission.hostiles.roll(rng);
        let variance = mission.health_variance_pct.min(100) as i32;
        let classes = WeightClass::all();

        (0..count)
            .map(|i| {
                let class = classes[rng.roll_range(0, classes.len() as i32 - 1) as usize];
                let mut chassis = ChassisTemplate::standard(format!("Hostile {}", i + 1), class);

                for max in chassis.locations.values_mut() {
                    let pct = (100 + rng.roll_range(-variance, variance)) as u32;
                    max.armor = (max.armor * pct / 100).max(1);
                    max.structure = (max.structure * pct / 100).max(1);
                }

                let template = UnitTemplate::new(chassis);
                match &mission.hostile_pilot {
                    Some(pilot) => template.with_pilot(pilot.clone()),
                    None => template,
                }
            })
            .collect()
    }
}

/// Hands out a fixed list of templates, for scripted scenarios
#[derive(Debug, Clone, Default)]
pub struct FixedFactory {
    pub templates: Vec<UnitTemplate>,
}

impl UnitFactory for FixedFactory {
    fn opposing_force(
        &mut self,
        _mission: &MissionParams,
        _rng: &mut dyn RandomSource,
    ) -> Vec<UnitTemplate> {
        self.templates.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::{ScriptedRolls, SeededRng};

    #[test]
    fn test_standard_chassis_is_valid() {
        for class in WeightClass::all() {
            let chassis = ChassisTemplate::standard("Stock", class);
            assert!(chassis.validate().is_ok());
            assert_eq!(chassis.locations.len(), BodyLocation::COUNT);
        }
    }

    #[test]
    fn test_heavier_chassis_tougher() {
        let light = ChassisTemplate::standard("L", WeightClass::Light);
        let assault = ChassisTemplate::standard("A", WeightClass::Assault);
        let ct = BodyLocation::CenterTorso;
        assert!(assault.locations[&ct].armor > light.locations[&ct].armor);
        assert!(assault.base_movement < light.base_movement);
        assert_eq!(assault.locations[&BodyLocation::Head].structure, 3);
    }

    #[test]
    fn test_missing_location_rejected() {
        let mut chassis = ChassisTemplate::standard("Broken", WeightClass::Medium);
        chassis.locations.remove(&BodyLocation::LeftArm);
        assert!(matches!(
            chassis.validate(),
            Err(SetupError::MissingLocation { location: BodyLocation::LeftArm, .. })
        ));
    }

    #[test]
    fn test_zero_structure_rejected() {
        let mut chassis = ChassisTemplate::standard("Hollow", WeightClass::Light);
        chassis
            .locations
            .insert(BodyLocation::Head, LocationMax::new(5, 0));
        assert!(matches!(
            chassis.location_table(),
            Err(SetupError::ZeroStructure { location: BodyLocation::Head, .. })
        ));
    }

    #[test]
    fn test_zero_movement_rejected() {
        let mut chassis = ChassisTemplate::standard("Statue", WeightClass::Heavy);
        chassis.base_movement = 0;
        assert!(matches!(chassis.validate(), Err(SetupError::ZeroMovement(_))));
    }

    #[test]
    fn test_pilot_skill_bounds() {
        let template = UnitTemplate::new(ChassisTemplate::standard("X", WeightClass::Light))
            .with_pilot(Pilot::new("Rookie", 9, 5));
        assert!(matches!(
            template.validate(),
            Err(SetupError::SkillOutOfRange { skill: "gunnery", .. })
        ));
    }

    #[test]
    fn test_instantiate_sets_side_controller_and_stats() {
        let template = UnitTemplate::new(ChassisTemplate::standard("Hunch", WeightClass::Medium))
            .with_pilot(Pilot::new("Vex", 3, 4));
        let unit = template.instantiate(UnitId(7), Side::Defender).unwrap();
        assert_eq!(unit.id, UnitId(7));
        assert_eq!(unit.controller, Controller::Ai);
        assert_eq!(unit.max_movement_points, 5);
        assert_eq!(unit.weapon, WeaponKind::Missile);
        assert_eq!(unit.gunnery(), 3);
        assert_eq!(unit.health(), unit.max_health());

        let player = template.instantiate(UnitId(1), Side::Attacker).unwrap();
        assert_eq!(player.controller, Controller::Player);
    }

    #[test]
    fn test_empty_roster_rejected() {
        assert!(matches!(Roster::default().validate(), Err(SetupError::EmptyRoster)));
        assert!(Roster::standard_lance().validate().is_ok());
    }

    #[test]
    fn test_hostile_count_range() {
        let count = HostileCount::Range { min: 2, max: 4 };
        let mut rng = SeededRng::new(5);
        for _ in 0..50 {
            assert!((2..=4).contains(&count.roll(&mut rng)));
        }
        assert_eq!(HostileCount::Exact(3).roll(&mut rng), 3);
    }

    #[test]
    fn test_procedural_force_size_and_validity() {
        let mission = MissionParams::new(HostileCount::Exact(5));
        let force = ProceduralFactory.opposing_force(&mission, &mut SeededRng::new(8));
        assert_eq!(force.len(), 5);
        assert!(force.iter().all(|t| t.validate().is_ok()));
    }

    #[test]
    fn test_procedural_health_within_variance() {
        let mission = MissionParams::new(HostileCount::Exact(1));
        // Low draws: first pick is Light, every location rolls -20%
        let force = ProceduralFactory.opposing_force(&mission, &mut ScriptedRolls::constant(0.0));
        let chassis = &force[0].chassis;
        assert_eq!(chassis.weight_class, WeightClass::Light);
        assert_eq!(chassis.locations[&BodyLocation::CenterTorso], LocationMax::new(9, 4));
    }

    #[test]
    fn test_mission_from_toml() {
        let mission: MissionParams = toml::from_str(
            r#"
            hostiles = { min = 2, max = 3 }
            "#,
        )
        .unwrap();
        assert_eq!(mission.hostiles, HostileCount::Range { min: 2, max: 3 });
        assert_eq!(mission.health_variance_pct, DEFAULT_HEALTH_VARIANCE_PCT);

        let exact: MissionParams = toml::from_str("hostiles = 4").unwrap();
        assert_eq!(exact.hostiles, HostileCount::Exact(4));
    }

    #[test]
    fn test_load_sample_roster() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/rosters/lance.toml");
        let roster = Roster::load(path).expect("sample roster should load");
        assert_eq!(roster.units.len(), 4);
        assert!(roster.units.iter().all(|u| u.pilot.is_some()));
    }
}
