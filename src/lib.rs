//! Hexmech - deterministic hex-grid tactical combat core

pub mod battle;
pub mod combat;
pub mod core;
