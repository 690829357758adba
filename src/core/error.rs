use thiserror::Error;

use crate::battle::hex::HexCoord;
use crate::combat::body_zone::BodyLocation;
use crate::core::types::UnitId;

/// Occupancy and bounds faults raised by the battle map
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Hex {0} is outside the battle map")]
    OutOfBounds(HexCoord),

    #[error("Hex {hex} is already held by unit {occupant}")]
    Occupied { hex: HexCoord, occupant: UnitId },

    #[error("Hex {0} holds no unit")]
    Empty(HexCoord),

    #[error("Unit not found: {0}")]
    UnknownUnit(UnitId),
}

/// A rejected battle command. Nothing was mutated; the caller may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Battle is not in progress")]
    BattleNotActive,

    #[error("No unit turn is open")]
    NoActiveTurn,

    #[error("It is not unit {requested}'s turn (active: {active})")]
    NotYourTurn { requested: UnitId, active: UnitId },

    #[error("Unit {0} is shut down")]
    UnitShutdown(UnitId),

    #[error("Unit {0} has already moved this turn")]
    AlreadyMoved(UnitId),

    #[error("Unit {0} has already acted this turn")]
    AlreadyActed(UnitId),

    #[error("Hex {to} is not reachable for unit {unit}")]
    Unreachable { unit: UnitId, to: HexCoord },

    #[error("Invalid target {target}: {reason}")]
    InvalidTarget { target: UnitId, reason: String },

    #[error("Map error: {0}")]
    Grid(#[from] GridError),
}

/// Configuration faults, rejected before the first turn begins
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Chassis '{chassis}' is missing location {location}")]
    MissingLocation {
        chassis: String,
        location: BodyLocation,
    },

    #[error("Chassis '{chassis}' has zero structure at {location}")]
    ZeroStructure {
        chassis: String,
        location: BodyLocation,
    },

    #[error("Chassis '{0}' has zero base movement")]
    ZeroMovement(String),

    #[error("Pilot '{pilot}' has {skill} skill {value}, expected 0..={max}")]
    SkillOutOfRange {
        pilot: String,
        skill: &'static str,
        value: u8,
        max: u8,
    },

    #[error("Roster is empty")]
    EmptyRoster,

    #[error("Mission produced no opposing units")]
    NoOpposition,

    #[error("No free hex left in the {0} deployment zone")]
    DeploymentFull(&'static str),

    #[error("Map error during deployment: {0}")]
    Grid(#[from] GridError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Broken internal invariant: a logic fault, never user error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invariant violated on unit {unit}: {detail}")]
pub struct InvariantViolation {
    pub unit: UnitId,
    pub detail: String,
}

pub type Result<T> = std::result::Result<T, SetupError>;
