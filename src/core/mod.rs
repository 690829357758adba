pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::{BattleConfig, GridConfig, HeatConfig};
pub use rng::{RandomSource, ScriptedRolls, SeededRng};
