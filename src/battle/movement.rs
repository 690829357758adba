//! Movement planning: cost-aware reachability over the hex graph
//!
//! Dijkstra from the unit's hex, bounded by its movement points. Entering a
//! hex costs that hex's terrain cost. Occupied hexes are neither entered nor
//! passed through.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::battle::battle_map::BattleMap;
use crate::battle::hex::HexCoord;
use crate::battle::units::CombatUnit;

/// Node in the open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    coord: HexCoord,
    cost: u32,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; coordinate breaks ties so expansion order is fixed
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Minimum path costs from one origin, with predecessors for path rebuilds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachMap {
    pub origin: HexCoord,
    costs: BTreeMap<HexCoord, u32>,
    previous: BTreeMap<HexCoord, HexCoord>,
}

impl ReachMap {
    fn empty(origin: HexCoord) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn contains(&self, hex: HexCoord) -> bool {
        self.costs.contains_key(&hex)
    }

    pub fn cost_to(&self, hex: HexCoord) -> Option<u32> {
        self.costs.get(&hex).copied()
    }

    pub fn hexes(&self) -> BTreeSet<HexCoord> {
        self.costs.keys().copied().collect()
    }

    /// Steps from the origin (exclusive) to `hex` (inclusive)
    pub fn path_to(&self, hex: HexCoord) -> Option<Vec<HexCoord>> {
        if !self.contains(hex) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = hex;
        while current != self.origin {
            path.push(current);
            current = *self.previous.get(&current)?;
        }
        path.reverse();
        Some(path)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Every hex the unit could end its move on, with the cheapest cost there
///
/// Empty when the unit cannot move this turn.
pub fn plan_movement(map: &BattleMap, unit: &CombatUnit) -> ReachMap {
    let origin = unit.position();
    let mut reach = ReachMap::empty(origin);
    if !unit.can_move() {
        return reach;
    }

    let budget = unit.movement_points;
    let mut open_set = BinaryHeap::new();
    reach.costs.insert(origin, 0);
    open_set.push(PathNode {
        coord: origin,
        cost: 0,
    });

    while let Some(current) = open_set.pop() {
        // Skip stale entries
        if reach.costs.get(&current.coord).is_some_and(|&c| c < current.cost) {
            continue;
        }

        for neighbor in map.neighbors(current.coord) {
            if map.is_occupied(neighbor) && neighbor != origin {
                continue;
            }

            let cost = current.cost + map.movement_cost(neighbor);
            if cost > budget {
                continue;
            }

            let improved = reach.costs.get(&neighbor).map_or(true, |&known| cost < known);
            if improved {
                reach.costs.insert(neighbor, cost);
                reach.previous.insert(neighbor, current.coord);
                open_set.push(PathNode {
                    coord: neighbor,
                    cost,
                });
            }
        }
    }

    reach
}

/// Legal destinations for a unit, including its own hex
pub fn reachable_hexes(map: &BattleMap, unit: &CombatUnit) -> BTreeSet<HexCoord> {
    plan_movement(map, unit).hexes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::terrain::TerrainKind;
    use crate::battle::units::{Side, StatusTag, WeightClass};
    use crate::combat::body_zone::LocationTable;
    use crate::combat::damage::LocationState;
    use crate::core::types::UnitId;

    fn mover(pos: HexCoord, mp: u32) -> CombatUnit {
        CombatUnit::new(
            UnitId(1),
            "Mover",
            Side::Attacker,
            WeightClass::Light,
            LocationTable::from_fn(|_| LocationState::new(5, 5)),
            mp,
        )
        .at(pos)
    }

    fn setup(pos: HexCoord, mp: u32) -> (BattleMap, CombatUnit) {
        let mut map = BattleMap::new(12, 12);
        let unit = mover(pos, mp);
        map.place_unit(pos, unit.id).unwrap();
        (map, unit)
    }

    #[test]
    fn test_open_ground_matches_distance() {
        let center = HexCoord::new(6, 6);
        let (map, unit) = setup(center, 2);
        let reach = reachable_hexes(&map, &unit);
        assert_eq!(reach, map.hexes_in_range(center, 2));
        assert!(reach.contains(&center));
    }

    #[test]
    fn test_costly_terrain_blocks_reach() {
        let center = HexCoord::new(6, 6);
        let (mut map, unit) = setup(center, 2);
        for n in center.neighbors() {
            map.set_terrain(n, TerrainKind::Water);
        }
        let reach = reachable_hexes(&map, &unit);
        // Every neighbor costs 3, above the budget
        assert_eq!(reach.len(), 1);
        assert!(reach.contains(&center));
    }

    #[test]
    fn test_forest_costs_two() {
        let center = HexCoord::new(6, 6);
        let (mut map, unit) = setup(center, 3);
        let forest = center.step(crate::battle::hex::HexDirection::North);
        map.set_terrain(forest, TerrainKind::Forest);
        let plan = plan_movement(&map, &unit);
        assert_eq!(plan.cost_to(forest), Some(2));
        assert_eq!(plan.cost_to(center), Some(0));
    }

    #[test]
    fn test_occupied_hexes_excluded() {
        let center = HexCoord::new(6, 6);
        let (mut map, unit) = setup(center, 3);
        let blocker = HexCoord::new(7, 6);
        map.place_unit(blocker, UnitId(2)).unwrap();
        let reach = reachable_hexes(&map, &unit);
        assert!(!reach.contains(&blocker));
        assert!(reach.contains(&center));
    }

    #[test]
    fn test_moved_or_shutdown_unit_has_no_reach() {
        let (map, mut unit) = setup(HexCoord::new(3, 3), 4);
        unit.has_moved = true;
        assert!(reachable_hexes(&map, &unit).is_empty());

        unit.has_moved = false;
        unit.status.insert(StatusTag::Shutdown);
        assert!(reachable_hexes(&map, &unit).is_empty());
    }

    #[test]
    fn test_path_reconstruction() {
        let start = HexCoord::new(2, 2);
        let (map, unit) = setup(start, 4);
        let plan = plan_movement(&map, &unit);
        let goal = HexCoord::new(5, 2);
        let path = plan.path_to(goal).unwrap();
        assert_eq!(path.len() as u32, start.distance(&goal));
        assert_eq!(path.last(), Some(&goal));
        // Each step is adjacent to the one before it
        let mut prev = start;
        for step in &path {
            assert_eq!(prev.distance(step), 1);
            prev = *step;
        }
        assert_eq!(plan.path_to(start), Some(Vec::new()));
        assert_eq!(plan.path_to(HexCoord::new(11, 11)), None);
    }

    #[test]
    fn test_map_edge_clips_reach() {
        let (map, unit) = setup(HexCoord::new(0, 0), 2);
        let reach = reachable_hexes(&map, &unit);
        assert!(reach.iter().all(|h| map.in_bounds(*h)));
        assert!(reach.len() < 19);
    }
}
