//! Weapon kinds: a damage band and a fixed heat cost per shot
//!
//! There is no per-mount or ammunition tracking; a unit fires one kind.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Laser,
    Autocannon,
    Missile,
    #[default]
    Basic,
}

impl WeaponKind {
    /// Inclusive damage band rolled on a hit
    pub fn damage_range(&self) -> (u32, u32) {
        match self {
            WeaponKind::Laser => (8, 12),
            WeaponKind::Autocannon => (15, 20),
            WeaponKind::Missile => (12, 18),
            WeaponKind::Basic => (6, 10),
        }
    }

    /// Heat added to the shooter, hit or miss
    pub fn heat(&self) -> u32 {
        match self {
            WeaponKind::Laser => 6,
            WeaponKind::Autocannon => 2,
            WeaponKind::Missile => 4,
            WeaponKind::Basic => 3,
        }
    }

    pub fn all() -> [WeaponKind; 4] {
        [
            WeaponKind::Laser,
            WeaponKind::Autocannon,
            WeaponKind::Missile,
            WeaponKind::Basic,
        ]
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeaponKind::Laser => "laser",
            WeaponKind::Autocannon => "autocannon",
            WeaponKind::Missile => "missile",
            WeaponKind::Basic => "basic",
        };
        f.write_str(name)
    }
}
