//! Hex coordinate system using "even-q" offset coordinates (row, col).
//!
//! The board is stored in a square backing grid, so cells are addressed by
//! offset coordinates. Even columns sit half a cell lower than odd columns.
//! All distance and adjacency math happens in cube coordinates:
//!
//! - `x = col`
//! - `z = row - (col + (col & 1)) / 2`
//! - `y = -x - z`
//!
//! Because the rows of neighboring columns are staggered, the offset deltas
//! to the six neighbors depend on the parity of the column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction from a hex to one of its six neighbors (flat-top layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl HexDirection {
    /// All directions in clockwise order starting from North
    pub const ALL: [HexDirection; 6] = [
        HexDirection::North,
        HexDirection::NorthEast,
        HexDirection::SouthEast,
        HexDirection::South,
        HexDirection::SouthWest,
        HexDirection::NorthWest,
    ];

    /// Cube-space unit vector for this direction
    pub const fn cube_delta(self) -> CubeCoord {
        match self {
            HexDirection::North => CubeCoord::new(0, 1, -1),
            HexDirection::NorthEast => CubeCoord::new(1, 0, -1),
            HexDirection::SouthEast => CubeCoord::new(1, -1, 0),
            HexDirection::South => CubeCoord::new(0, -1, 1),
            HexDirection::SouthWest => CubeCoord::new(-1, 0, 1),
            HexDirection::NorthWest => CubeCoord::new(-1, 1, 0),
        }
    }

    /// Short label used when offering directions to a player
    pub fn label(self) -> &'static str {
        match self {
            HexDirection::North => "North",
            HexDirection::NorthEast => "North-East",
            HexDirection::SouthEast => "South-East",
            HexDirection::South => "South",
            HexDirection::SouthWest => "South-West",
            HexDirection::NorthWest => "North-West",
        }
    }

    fn index(self) -> usize {
        match self {
            HexDirection::North => 0,
            HexDirection::NorthEast => 1,
            HexDirection::SouthEast => 2,
            HexDirection::South => 3,
            HexDirection::SouthWest => 4,
            HexDirection::NorthWest => 5,
        }
    }
}

/// Offset (row, col) deltas per direction, indexed by column parity.
///
/// Order matches [`HexDirection::ALL`].
const NEIGHBOR_DELTAS: [[(i32, i32); 6]; 2] = [
    // even column
    [(-1, 0), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1)],
    // odd column
    [(-1, 0), (-1, 1), (0, 1), (1, 0), (0, -1), (-1, -1)],
];

/// Cube coordinate. Every value produced from a [`HexCoord`] satisfies
/// `x + y + z == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CubeCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise sum
    pub const fn add(self, other: CubeCoord) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Hex distance between two cube coordinates
    pub fn distance(self, other: CubeCoord) -> u32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        ((dx + dy + dz) / 2) as u32
    }

    /// Back to offset coordinates
    pub fn to_offset(self) -> HexCoord {
        let col = self.x;
        let row = self.z + (self.x + (self.x & 1)) / 2;
        HexCoord::new(row, col)
    }
}

/// Offset coordinate of a cell in the square backing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub row: i32,
    pub col: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Convert to cube coordinates
    pub const fn to_cube(&self) -> CubeCoord {
        let x = self.col;
        let z = self.row - (self.col + (self.col & 1)) / 2;
        CubeCoord::new(x, -x - z, z)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        self.to_cube().distance(other.to_cube())
    }

    /// The six neighboring hexes in clockwise order starting from North
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: HexDirection) -> HexCoord {
        let parity = (self.col & 1) as usize;
        let (drow, dcol) = NEIGHBOR_DELTAS[parity][direction.index()];
        HexCoord::new(self.row + drow, self.col + dcol)
    }

    /// Direction from `self` to an adjacent hex, if `other` is adjacent
    pub fn direction_to(&self, other: &HexCoord) -> Option<HexDirection> {
        HexDirection::ALL
            .into_iter()
            .find(|dir| self.neighbor(*dir) == *other)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
