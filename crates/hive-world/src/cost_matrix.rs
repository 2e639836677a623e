//! Per-room movement cost matrices and path goals.

use hive_types::{Position, ROOM_SIZE};
use serde::{Deserialize, Serialize};

/// Cost marking a tile as impassable.
pub const IMPASSABLE: u8 = 0xff;

/// Cost of a plain tile when the matrix leaves it at zero.
pub const PLAIN_COST: u8 = 2;

/// Cost of a road tile.
pub const ROAD_COST: u8 = 1;

/// A 50x50 grid of tile costs. Zero means "use the terrain default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostMatrix {
    bits: Vec<u8>,
}

impl Default for CostMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl CostMatrix {
    /// A matrix with every tile at zero.
    pub fn new() -> Self {
        let size = usize::from(ROOM_SIZE);
        Self {
            bits: vec![0; size.saturating_mul(size)],
        }
    }

    fn index(x: u8, y: u8) -> Option<usize> {
        if x >= ROOM_SIZE || y >= ROOM_SIZE {
            return None;
        }
        usize::from(y)
            .checked_mul(usize::from(ROOM_SIZE))?
            .checked_add(usize::from(x))
    }

    /// Cost of a tile; zero for out-of-room coordinates.
    pub fn get(&self, x: u8, y: u8) -> u8 {
        Self::index(x, y)
            .and_then(|i| self.bits.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Set the cost of a tile. Out-of-room coordinates are ignored.
    pub fn set(&mut self, x: u8, y: u8, cost: u8) {
        if let Some(slot) = Self::index(x, y).and_then(|i| self.bits.get_mut(i)) {
            *slot = cost;
        }
    }

    /// Cost of the tile under `pos`, ignoring its room.
    pub fn at(&self, pos: &Position) -> u8 {
        self.get(pos.x, pos.y)
    }
}

/// A path-search goal: any tile within `range` of `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathGoal {
    /// Goal tile.
    pub pos: Position,
    /// Acceptable distance from the goal tile.
    pub range: u32,
}

impl PathGoal {
    /// A goal at `pos` within `range`.
    pub const fn new(pos: Position, range: u32) -> Self {
        Self { pos, range }
    }
}
