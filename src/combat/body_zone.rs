//! Body locations for armor and structure tracking (8 locations)
//!
//! Per-location data lives in a `LocationTable`, a fixed array indexed by
//! the enum, so every location is always present.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Hit locations on an armored unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyLocation {
    /// Vital
    Head,
    /// Vital, and where all incoming fire lands today
    CenterTorso,
    LeftTorso,
    RightTorso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyLocation {
    pub const COUNT: usize = 8;

    /// Returns all body locations in table order
    pub fn all() -> [BodyLocation; 8] {
        [
            BodyLocation::Head,
            BodyLocation::CenterTorso,
            BodyLocation::LeftTorso,
            BodyLocation::RightTorso,
            BodyLocation::LeftArm,
            BodyLocation::RightArm,
            BodyLocation::LeftLeg,
            BodyLocation::RightLeg,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Losing all structure here destroys the unit
    pub fn is_vital(&self) -> bool {
        matches!(self, BodyLocation::Head | BodyLocation::CenterTorso)
    }

    pub fn is_leg(&self) -> bool {
        matches!(self, BodyLocation::LeftLeg | BodyLocation::RightLeg)
    }

    pub fn is_arm(&self) -> bool {
        matches!(self, BodyLocation::LeftArm | BodyLocation::RightArm)
    }

    /// Short tabletop code, e.g. "CT"
    pub fn code(&self) -> &'static str {
        match self {
            BodyLocation::Head => "HD",
            BodyLocation::CenterTorso => "CT",
            BodyLocation::LeftTorso => "LT",
            BodyLocation::RightTorso => "RT",
            BodyLocation::LeftArm => "LA",
            BodyLocation::RightArm => "RA",
            BodyLocation::LeftLeg => "LL",
            BodyLocation::RightLeg => "RL",
        }
    }
}

impl fmt::Display for BodyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One value per body location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTable<T>([T; BodyLocation::COUNT]);

impl<T> LocationTable<T> {
    pub fn from_fn(mut f: impl FnMut(BodyLocation) -> T) -> Self {
        Self(BodyLocation::all().map(|loc| f(loc)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyLocation, &T)> {
        BodyLocation::all().into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

impl<T: Default> Default for LocationTable<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<BodyLocation> for LocationTable<T> {
    type Output = T;
    fn index(&self, location: BodyLocation) -> &T {
        &self.0[location.index()]
    }
}

impl<T> IndexMut<BodyLocation> for LocationTable<T> {
    fn index_mut(&mut self, location: BodyLocation) -> &mut T {
        &mut self.0[location.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_count() {
        assert_eq!(BodyLocation::all().len(), BodyLocation::COUNT);
    }

    #[test]
    fn test_index_matches_table_order() {
        for (i, loc) in BodyLocation::all().iter().enumerate() {
            assert_eq!(loc.index(), i);
        }
    }

    #[test]
    fn test_vital_locations() {
        let vital: Vec<_> = BodyLocation::all()
            .into_iter()
            .filter(|l| l.is_vital())
            .collect();
        assert_eq!(vital, vec![BodyLocation::Head, BodyLocation::CenterTorso]);
    }

    #[test]
    fn test_location_categories() {
        assert!(BodyLocation::LeftLeg.is_leg());
        assert!(!BodyLocation::LeftArm.is_leg());
        assert!(BodyLocation::RightArm.is_arm());
        assert!(!BodyLocation::CenterTorso.is_arm());
    }

    #[test]
    fn test_table_index_roundtrip() {
        let mut table: LocationTable<u32> = LocationTable::default();
        table[BodyLocation::RightLeg] = 9;
        assert_eq!(table[BodyLocation::RightLeg], 9);
        assert_eq!(table[BodyLocation::LeftLeg], 0);
        assert_eq!(table.values().sum::<u32>(), 9);
    }

    #[test]
    fn test_table_from_fn_sees_each_location() {
        let table = LocationTable::from_fn(|loc| loc.code());
        let codes: Vec<_> = table.iter().map(|(_, c)| *c).collect();
        assert_eq!(codes, vec!["HD", "CT", "LT", "RT", "LA", "RA", "LL", "RL"]);
    }
}
