//! Battle system - hex-grid tactical combat between armored units
//!
//! Turn-based and deterministic: every random draw comes from an injected
//! source, so a seed replays a battle exactly.
//!
//! Layering, leaves first:
//! - Hex math, terrain, and the occupancy map
//! - Unit records and their location damage model
//! - Movement planning and attack resolution
//! - The turn scheduler, which alone sequences time

pub mod ai;
pub mod battle_map;
pub mod battlefield;
pub mod constants;
pub mod events;
pub mod execution;
pub mod hex;
pub mod movement;
pub mod resolution;
pub mod roster;
pub mod terrain;
pub mod units;

// Re-exports for convenient access
pub use ai::{plan_turn, select_destination, select_target, AiPlan};
pub use battle_map::BattleMap;
pub use battlefield::Battlefield;
pub use constants::*;
pub use events::{BattleEvent, BattleEventLog, EventSink, TracingSink};
pub use execution::{
    initiative_order, initiative_score, BattleOutcome, BattlePhase, BattleReport, TurnScheduler,
    UnitSummary,
};
pub use hex::{CubeCoord, HexCoord, HexDirection};
pub use movement::{plan_movement, reachable_hexes, ReachMap};
pub use resolution::{hit_probability, resolve_attack, AttackOutcome, DEFAULT_HIT_LOCATION};
pub use roster::{
    ChassisTemplate, FixedFactory, HostileCount, LocationMax, MissionParams, ProceduralFactory,
    Roster, UnitFactory, UnitTemplate,
};
pub use terrain::{TerrainCell, TerrainKind, TerrainProfile};
pub use units::{CombatUnit, Controller, HeatCheck, Pilot, Side, StatusTag, WeightClass};
