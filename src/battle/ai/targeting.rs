//! Nearest-target heuristics
//!
//! Both choices scan ordered inputs and keep the first minimum, so equal
//! inputs always give equal answers.

use std::collections::BTreeSet;

use crate::battle::hex::HexCoord;
use crate::battle::units::CombatUnit;
use crate::core::types::UnitId;

/// Closest living enemy; the earliest candidate wins ties
pub fn select_target(unit: &CombatUnit, candidates: &[&CombatUnit]) -> Option<UnitId> {
    let origin = unit.position();
    candidates
        .iter()
        .filter(|c| c.side != unit.side && !c.is_destroyed())
        .min_by_key(|c| origin.distance(&c.position()))
        .map(|c| c.id)
}

/// Reachable hex closest to `target`; row-major order wins ties
///
/// `reachable` is the moving unit's own reachable set, so it already
/// includes the unit's current hex and says all that is needed about it.
pub fn select_destination(target: HexCoord, reachable: &BTreeSet<HexCoord>) -> Option<HexCoord> {
    reachable
        .iter()
        .copied()
        .min_by_key(|hex| hex.distance(&target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::{Side, WeightClass};
    use crate::combat::body_zone::{BodyLocation, LocationTable};
    use crate::combat::damage::LocationState;

    fn unit(id: u32, side: Side, pos: HexCoord) -> CombatUnit {
        CombatUnit::new(
            UnitId(id),
            format!("Unit {id}"),
            side,
            WeightClass::Light,
            LocationTable::from_fn(|_| LocationState::new(4, 2)),
            6,
        )
        .at(pos)
    }

    #[test]
    fn test_picks_nearest_enemy() {
        let me = unit(1, Side::Defender, HexCoord::new(8, 4));
        let far = unit(2, Side::Attacker, HexCoord::new(0, 4));
        let near = unit(3, Side::Attacker, HexCoord::new(5, 4));
        let ally = unit(4, Side::Defender, HexCoord::new(8, 5));
        assert_eq!(select_target(&me, &[&far, &near, &ally]), Some(UnitId(3)));
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let me = unit(1, Side::Attacker, HexCoord::new(4, 4));
        let a = unit(2, Side::Defender, HexCoord::new(4, 2));
        let b = unit(3, Side::Defender, HexCoord::new(4, 6));
        assert_eq!(select_target(&me, &[&a, &b]), Some(UnitId(2)));
        assert_eq!(select_target(&me, &[&b, &a]), Some(UnitId(3)));
    }

    #[test]
    fn test_skips_destroyed_and_handles_none() {
        let me = unit(1, Side::Attacker, HexCoord::new(0, 0));
        let mut wreck = unit(2, Side::Defender, HexCoord::new(1, 0));
        wreck.apply_damage(BodyLocation::Head, 50);
        assert_eq!(select_target(&me, &[&wreck]), None);
        assert_eq!(select_target(&me, &[]), None);
    }

    #[test]
    fn test_destination_closes_distance() {
        let reachable: BTreeSet<HexCoord> =
            [HexCoord::new(2, 2), HexCoord::new(3, 2), HexCoord::new(4, 2)].into();
        assert_eq!(
            select_destination(HexCoord::new(9, 2), &reachable),
            Some(HexCoord::new(4, 2))
        );
        assert_eq!(select_destination(HexCoord::new(9, 2), &BTreeSet::new()), None);
    }

    #[test]
    fn test_destination_ties_row_major() {
        // Both are two hexes from the target; (5, 3) sorts first
        let reachable: BTreeSet<HexCoord> = [HexCoord::new(5, 3), HexCoord::new(5, 7)].into();
        assert_eq!(
            select_destination(HexCoord::new(5, 5), &reachable),
            Some(HexCoord::new(5, 3))
        );
    }
}
