//! Hex coordinate system for battle maps (offset "odd-q" coordinates)
//!
//! Positions are stored as (column, row) over a rectangular grid with odd
//! columns shifted down half a hex. Distance and neighbor math go through
//! cube coordinates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Offset hex coordinate on the battle map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

/// Cube coordinate, x + y + z == 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CubeCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert_eq!(x + y + z, 0, "cube coordinates must sum to zero");
        Self { x, y, z }
    }

    /// Chebyshev distance in cube space
    pub fn distance(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        dx.max(dy).max(dz) as u32
    }
}

impl std::ops::Add for CubeCoord {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl HexCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn to_cube(&self) -> CubeCoord {
        let x = self.col;
        let z = self.row - (self.col - (self.col & 1)) / 2;
        CubeCoord::new(x, -x - z, z)
    }

    pub fn from_cube(cube: CubeCoord) -> Self {
        let col = cube.x;
        let row = cube.z + (cube.x - (cube.x & 1)) / 2;
        Self { col, row }
    }

    /// Number of single-hex steps on a shortest path, ignoring terrain
    pub fn distance(&self, other: &Self) -> u32 {
        self.to_cube().distance(&other.to_cube())
    }

    /// All 6 neighboring coordinates, unbounded
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::all().map(|dir| self.step(dir))
    }

    /// The adjacent hex in a direction
    pub fn step(&self, direction: HexDirection) -> HexCoord {
        HexCoord::from_cube(self.to_cube() + direction.cube_offset())
    }

    /// All coordinates within range (inclusive), unbounded
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let center = self.to_cube();
        let range = range as i32;
        let mut results = Vec::new();
        for dx in -range..=range {
            for dy in (-range).max(-dx - range)..=range.min(-dx + range) {
                let dz = -dx - dy;
                results.push(HexCoord::from_cube(
                    center + CubeCoord::new(dx, dy, dz),
                ));
            }
        }
        results
    }

    /// Is this coordinate inside a width x height grid?
    pub fn in_bounds(&self, width: u32, height: u32) -> bool {
        self.col >= 0 && self.row >= 0 && (self.col as u32) < width && (self.row as u32) < height
    }
}

// Row-major ordering keeps set iteration stable across runs
impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Facing for flat-topped hexes. Cosmetic to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl HexDirection {
    /// Cube offset of one step in this direction
    pub fn cube_offset(&self) -> CubeCoord {
        match self {
            HexDirection::North => CubeCoord::new(0, 1, -1),
            HexDirection::NorthEast => CubeCoord::new(1, 0, -1),
            HexDirection::SouthEast => CubeCoord::new(1, -1, 0),
            HexDirection::South => CubeCoord::new(0, -1, 1),
            HexDirection::SouthWest => CubeCoord::new(-1, 0, 1),
            HexDirection::NorthWest => CubeCoord::new(-1, 1, 0),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::North => HexDirection::South,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::SouthEast => HexDirection::NorthWest,
            HexDirection::South => HexDirection::North,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::NorthWest => HexDirection::SouthEast,
        }
    }

    /// All directions, clockwise from north
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::North,
            HexDirection::NorthEast,
            HexDirection::SouthEast,
            HexDirection::South,
            HexDirection::SouthWest,
            HexDirection::NorthWest,
        ]
    }

    /// Direction that best points from one hex toward another.
    ///
    /// Returns `None` when both are the same hex.
    pub fn toward(from: HexCoord, to: HexCoord) -> Option<HexDirection> {
        if from == to {
            return None;
        }
        let a = from.to_cube();
        let b = to.to_cube();
        let (dx, dy, dz) = (b.x - a.x, b.y - a.y, b.z - a.z);

        let mut best = HexDirection::North;
        let mut best_score = i32::MIN;
        for dir in HexDirection::all() {
            let o = dir.cube_offset();
            let score = dx * o.x + dy * o.y + dz * o.z;
            if score > best_score {
                best = dir;
                best_score = score;
            }
        }
        Some(best)
    }
}
