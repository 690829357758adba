//! Attack resolution: to-hit chance, damage roll, heat, and damage application
//!
//! Modifiers combine additively, then clamp.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    ATTACKER_MOVED_PENALTY, BASE_TO_HIT, GUNNERY_PIVOT, GUNNERY_STEP, MAX_TO_HIT, MIN_TO_HIT,
    RANGE_PENALTY_PER_HEX, TARGET_MOVED_PENALTY,
};
use crate::battle::units::CombatUnit;
use crate::combat::body_zone::BodyLocation;
use crate::combat::damage::DamageReport;
use crate::combat::weapons::WeaponKind;
use crate::core::rng::RandomSource;
use crate::core::types::UnitId;

/// All fire lands here; there is no hit-location table
pub const DEFAULT_HIT_LOCATION: BodyLocation = BodyLocation::CenterTorso;

/// Result of one weapon attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub attacker: UnitId,
    pub target: UnitId,
    pub weapon: WeaponKind,
    pub hit: bool,
    pub probability: f64,
    pub roll: f64,
    /// Rolled damage, zero on a miss
    pub damage: u32,
    pub heat_generated: u32,
    pub report: Option<DamageReport>,
}

/// Chance to hit, clamped to [MIN_TO_HIT, MAX_TO_HIT]
pub fn hit_probability(attacker: &CombatUnit, target: &CombatUnit) -> f64 {
    let mut chance = BASE_TO_HIT;

    // Lower gunnery is better
    chance += (GUNNERY_PIVOT - attacker.gunnery() as i32) as f64 * GUNNERY_STEP;
    chance -= attacker.position().distance(&target.position()) as f64 * RANGE_PENALTY_PER_HEX;

    if attacker.has_moved {
        chance -= ATTACKER_MOVED_PENALTY;
    }
    if target.has_moved {
        chance -= TARGET_MOVED_PENALTY;
    }

    chance.clamp(MIN_TO_HIT, MAX_TO_HIT)
}

/// Fire `weapon` from `attacker` at `target`.
///
/// Draws the to-hit roll, then the damage roll on a hit. Heat is applied
/// to the attacker either way and the attacker's action is spent. Command
/// legality is checked by the caller.
pub fn resolve_attack(
    attacker: &mut CombatUnit,
    target: &mut CombatUnit,
    weapon: WeaponKind,
    rng: &mut dyn RandomSource,
) -> AttackOutcome {
    let probability = hit_probability(attacker, target);
    let roll = rng.roll();
    let hit = roll <= probability;

    let (damage, report) = if hit {
        let (lo, hi) = weapon.damage_range();
        let damage = rng.roll_range(lo as i32, hi as i32).max(0) as u32;
        let report = target.apply_damage(DEFAULT_HIT_LOCATION, damage);
        (damage, Some(report))
    } else {
        (0, None)
    };

    let heat_generated = weapon.heat();
    attacker.add_heat(heat_generated);
    attacker.has_acted = true;

    tracing::debug!(
        "{} fires {} at {}: p={:.2} roll={:.3} hit={} damage={}",
        attacker.id,
        weapon,
        target.id,
        probability,
        roll,
        hit,
        damage
    );

    AttackOutcome {
        attacker: attacker.id,
        target: target.id,
        weapon,
        hit,
        probability,
        roll,
        damage,
        heat_generated,
        report,
    }
}
