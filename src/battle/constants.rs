//! Battle system constants - all tunable values in one place
//!
//! Probabilities are expressed as fractions of 1.0 and combine additively.

// Battle map
pub const DEFAULT_GRID_WIDTH: u32 = 16;
pub const DEFAULT_GRID_HEIGHT: u32 = 12;
pub const DEFAULT_DEPLOYMENT_DEPTH: u32 = 3;
pub const MAX_ELEVATION: u8 = 4;
pub const DEFAULT_MOVEMENT_COST: u32 = 1;

// Heat
pub const MAX_HEAT: u32 = 50;
pub const DEFAULT_SHUTDOWN_THRESHOLD: u32 = 30;
pub const DEFAULT_HEAT_DISSIPATION: u32 = 10;
pub const DEFAULT_SHUTDOWN_CHANCE: f64 = 0.5;

// To-hit (additive)
pub const BASE_TO_HIT: f64 = 0.70;
pub const GUNNERY_PIVOT: i32 = 5;
pub const GUNNERY_STEP: f64 = 0.05;
pub const RANGE_PENALTY_PER_HEX: f64 = 0.05;
pub const ATTACKER_MOVED_PENALTY: f64 = 0.15;
pub const TARGET_MOVED_PENALTY: f64 = 0.10;
pub const MIN_TO_HIT: f64 = 0.10;
pub const MAX_TO_HIT: f64 = 0.95;

// Initiative
pub const INITIATIVE_BASE: i32 = 10;
pub const PILOTING_PIVOT: i32 = 6;
pub const INITIATIVE_JITTER: i32 = 2;

// Pilot skills (lower is better)
pub const MAX_SKILL: u8 = 8;
/// Gunnery used for unpiloted units; contributes nothing to the to-hit roll
pub const UNPILOTED_GUNNERY: u8 = 5;

// Movement
pub const MIN_MOVEMENT_POINTS: u32 = 1;

// Opposing force generation
pub const DEFAULT_HEALTH_VARIANCE_PCT: u32 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hit_bounds_ordered() {
        assert!(MIN_TO_HIT < BASE_TO_HIT && BASE_TO_HIT < MAX_TO_HIT);
    }

    #[test]
    fn test_shutdown_threshold_below_cap() {
        assert!(DEFAULT_SHUTDOWN_THRESHOLD < MAX_HEAT);
    }

    #[test]
    fn test_unpiloted_gunnery_is_neutral() {
        assert_eq!(UNPILOTED_GUNNERY as i32, GUNNERY_PIVOT);
    }

    #[test]
    fn test_deployment_fits_default_grid() {
        assert!(DEFAULT_DEPLOYMENT_DEPTH * 2 <= DEFAULT_GRID_WIDTH);
    }
}
