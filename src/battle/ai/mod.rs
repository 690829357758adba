//! Minimal battle AI for hostile units
//!
//! Decisions are pure functions of the visible battle state. Pacing for a
//! presentation layer belongs outside the simulation.

pub mod targeting;

pub use targeting::{select_destination, select_target};

use std::collections::BTreeSet;

use crate::battle::hex::HexCoord;
use crate::battle::units::CombatUnit;
use crate::core::types::UnitId;

/// What an AI unit intends to do this turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiPlan {
    pub target: Option<UnitId>,
    /// `None` when staying put is already the best hex
    pub destination: Option<HexCoord>,
}

/// Nearest enemy, then the reachable hex closest to it
pub fn plan_turn(
    unit: &CombatUnit,
    enemies: &[&CombatUnit],
    reachable: &BTreeSet<HexCoord>,
) -> AiPlan {
    let Some(target) = select_target(unit, enemies) else {
        return AiPlan::default();
    };
    let destination = enemies
        .iter()
        .find(|e| e.id == target)
        .and_then(|e| select_destination(e.position(), reachable))
        .filter(|hex| *hex != unit.position());

    AiPlan {
        target: Some(target),
        destination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::{Side, WeightClass};
    use crate::combat::body_zone::LocationTable;
    use crate::combat::damage::LocationState;

    fn unit(id: u32, side: Side, pos: HexCoord) -> CombatUnit {
        CombatUnit::new(
            UnitId(id),
            format!("Unit {id}"),
            side,
            WeightClass::Medium,
            LocationTable::from_fn(|_| LocationState::new(6, 3)),
            5,
        )
        .at(pos)
    }

    #[test]
    fn test_plan_moves_toward_target() {
        let me = unit(1, Side::Defender, HexCoord::new(6, 2));
        let enemy = unit(2, Side::Attacker, HexCoord::new(1, 2));
        let reachable: BTreeSet<HexCoord> = [HexCoord::new(6, 2), HexCoord::new(5, 2)].into();
        let plan = plan_turn(&me, &[&enemy], &reachable);
        assert_eq!(plan.target, Some(UnitId(2)));
        assert_eq!(plan.destination, Some(HexCoord::new(5, 2)));
    }

    #[test]
    fn test_plan_stays_when_current_hex_is_best() {
        let me = unit(1, Side::Defender, HexCoord::new(3, 3));
        let enemy = unit(2, Side::Attacker, HexCoord::new(3, 4));
        let reachable: BTreeSet<HexCoord> = [HexCoord::new(3, 3)].into();
        let plan = plan_turn(&me, &[&enemy], &reachable);
        assert_eq!(plan.target, Some(UnitId(2)));
        assert_eq!(plan.destination, None);
    }

    #[test]
    fn test_no_enemies_no_plan() {
        let me = unit(1, Side::Defender, HexCoord::new(3, 3));
        assert_eq!(plan_turn(&me, &[], &BTreeSet::new()), AiPlan::default());
    }
}
