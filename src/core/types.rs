//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for combat units within one battle
///
/// Ids are handed out sequentially at deployment so replays stay identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Battle round counter (first round is 1)
pub type Round = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_equality() {
        assert_eq!(UnitId(1), UnitId::new(1));
        assert_ne!(UnitId(1), UnitId(2));
    }

    #[test]
    fn test_unit_id_ordering() {
        assert!(UnitId(1) < UnitId(2));
    }

    #[test]
    fn test_unit_id_display() {
        assert_eq!(UnitId(7).to_string(), "#7");
    }
}
