//! D8 flow-direction encoding.
//!
//! Each cell of a flow-direction raster holds a single power of two naming
//! the neighbour that receives its water, using the ArcGIS convention:
//!
//! ```text
//!   32  64  128
//!   16   x    1
//!    8   4    2
//! ```
//!
//! Any other value (0, negative, combinations) marks a cell with no outflow.
//! Offsets are in pixel space, where rows grow southwards.

use serde::{Deserialize, Serialize};

/// One of the eight D8 outflow directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
    NorthEast,
}

/// Code and (column, row) offset per direction, indexed by `FlowDirection as usize`.
const TABLE: [(i32, i64, i64); 8] = [
    (1, 1, 0),
    (2, 1, 1),
    (4, 0, 1),
    (8, -1, 1),
    (16, -1, 0),
    (32, -1, -1),
    (64, 0, -1),
    (128, 1, -1),
];

/// Neighbour offsets paired with the code that neighbour must hold to drain
/// into the centre cell. Order: E, SE, S, SW, W, NW, N, NE.
pub const INFLOW_NEIGHBOURS: [(i64, i64, i32); 8] = [
    (1, 0, 16),
    (1, 1, 32),
    (0, 1, 64),
    (-1, 1, 128),
    (-1, 0, 1),
    (-1, -1, 2),
    (0, -1, 4),
    (1, -1, 8),
];

impl FlowDirection {
    pub const ALL: [FlowDirection; 8] = [
        FlowDirection::East,
        FlowDirection::SouthEast,
        FlowDirection::South,
        FlowDirection::SouthWest,
        FlowDirection::West,
        FlowDirection::NorthWest,
        FlowDirection::North,
        FlowDirection::NorthEast,
    ];

    /// Decode a raster value. Returns `None` for sinks and unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::East),
            2 => Some(Self::SouthEast),
            4 => Some(Self::South),
            8 => Some(Self::SouthWest),
            16 => Some(Self::West),
            32 => Some(Self::NorthWest),
            64 => Some(Self::North),
            128 => Some(Self::NorthEast),
            _ => None,
        }
    }

    /// The raster code for this direction.
    pub fn code(self) -> i32 {
        TABLE[self as usize].0
    }

    /// (column, row) offset to the receiving neighbour.
    pub fn offset(self) -> (i64, i64) {
        let (_, dcol, drow) = TABLE[self as usize];
        (dcol, drow)
    }

    /// Map-space displacement of one step for the given cell size.
    pub fn map_step(self, cell_width: f64, cell_height: f64) -> (f64, f64) {
        let (dcol, drow) = self.offset();
        (dcol as f64 * cell_width, -(drow as f64) * cell_height)
    }

    /// The direction pointing back the way this one came.
    pub fn opposite(self) -> Self {
        Self::ALL[(self as usize + 4) % 8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for dir in FlowDirection::ALL {
            assert_eq!(FlowDirection::from_code(dir.code()), Some(dir));
        }
        assert_eq!(FlowDirection::from_code(0), None);
        assert_eq!(FlowDirection::from_code(3), None);
        assert_eq!(FlowDirection::from_code(-1), None);
        assert_eq!(FlowDirection::from_code(255), None);
    }

    #[test]
    fn test_opposite_negates_offset() {
        for dir in FlowDirection::ALL {
            let (c, r) = dir.offset();
            assert_eq!(dir.opposite().offset(), (-c, -r));
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_inflow_table_matches_opposites() {
        for (dcol, drow, code) in INFLOW_NEIGHBOURS {
            let dir = FlowDirection::from_code(code).unwrap();
            // The neighbour at (dcol, drow) must flow back to the centre
            assert_eq!(dir.offset(), (-dcol, -drow));
        }
    }

    #[test]
    fn test_map_step_is_north_up() {
        assert_eq!(FlowDirection::East.map_step(2.0, 3.0), (2.0, 0.0));
        assert_eq!(FlowDirection::South.map_step(2.0, 3.0), (0.0, -3.0));
        assert_eq!(FlowDirection::NorthEast.map_step(2.0, 3.0), (2.0, 3.0));
        assert_eq!(FlowDirection::SouthWest.map_step(2.0, 3.0), (-2.0, -3.0));
    }
}
