//! Tile positions on the world grid.
//!
//! A [`Position`] is a tile inside a 50x50 room. Distances between positions
//! in different rooms are computed on the global tile grid, where room
//! `(rx, ry)` covers tiles `rx * 50 ..= rx * 50 + 49`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::ids::RoomName;

/// Width and height of a room in tiles.
pub const ROOM_SIZE: u8 = 50;

/// Tile coordinate of the room centre on each axis.
pub const ROOM_CENTER: u8 = 25;

/// A tile inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal tile coordinate, `0..50`.
    pub x: u8,
    /// Vertical tile coordinate, `0..50`.
    pub y: u8,
    /// Room containing the tile.
    pub room: RoomName,
}

impl Position {
    /// Create a position, rejecting coordinates outside the room grid.
    pub const fn new(x: u8, y: u8, room: RoomName) -> Result<Self, TypesError> {
        if x >= ROOM_SIZE || y >= ROOM_SIZE {
            return Err(TypesError::OutOfRoom { x, y });
        }
        Ok(Self { x, y, room })
    }

    /// The centre tile of a room.
    pub const fn center_of(room: RoomName) -> Self {
        Self {
            x: ROOM_CENTER,
            y: ROOM_CENTER,
            room,
        }
    }

    /// Coordinates on the global tile grid.
    pub fn global(&self) -> (i32, i32) {
        let size = i32::from(ROOM_SIZE);
        (
            self.room
                .x
                .saturating_mul(size)
                .saturating_add(i32::from(self.x)),
            self.room
                .y
                .saturating_mul(size)
                .saturating_add(i32::from(self.y)),
        )
    }

    /// Build a position from global tile coordinates.
    pub fn from_global(gx: i32, gy: i32) -> Self {
        let size = i32::from(ROOM_SIZE);
        let local = |v: i32| u8::try_from(v.rem_euclid(size)).unwrap_or(0);
        Self {
            x: local(gx),
            y: local(gy),
            room: RoomName::from_coords(gx.div_euclid(size), gy.div_euclid(size)),
        }
    }

    /// Chebyshev distance in tiles, across room borders.
    pub fn range_to(&self, other: &Self) -> u32 {
        let (ax, ay) = self.global();
        let (bx, by) = other.global();
        ax.abs_diff(bx).max(ay.abs_diff(by))
    }

    /// Manhattan distance in tiles, across room borders.
    pub fn manhattan_to(&self, other: &Self) -> u32 {
        let (ax, ay) = self.global();
        let (bx, by) = other.global();
        ax.abs_diff(bx).saturating_add(ay.abs_diff(by))
    }

    /// Whether `other` lies within `range` tiles.
    pub fn in_range_to(&self, other: &Self, range: u32) -> bool {
        self.range_to(other) <= range
    }

    /// The tile shifted by `(dx, dy)`, possibly in a neighbouring room.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        let (gx, gy) = self.global();
        Self::from_global(gx.saturating_add(dx), gy.saturating_add(dy))
    }

    /// The eight surrounding tiles.
    pub fn neighbours(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    out.push(self.offset(dx, dy));
                }
            }
        }
        out
    }

    /// Whether the tile is on the room border (an exit row or column).
    pub const fn is_edge(&self) -> bool {
        let last = ROOM_SIZE.saturating_sub(1);
        self.x == 0 || self.y == 0 || self.x == last || self.y == last
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {},{}]", self.room, self.x, self.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomName {
        name.parse().unwrap()
    }

    #[test]
    fn rejects_out_of_room_coordinates() {
        assert!(Position::new(50, 0, room("W1N1")).is_err());
        assert!(Position::new(0, 49, room("W1N1")).is_ok());
    }

    #[test]
    fn global_round_trips_through_negative_rooms() {
        let pos = Position::new(3, 47, room("W2N5")).unwrap();
        let (gx, gy) = pos.global();
        assert_eq!(Position::from_global(gx, gy), pos);
    }

    #[test]
    fn range_spans_room_borders() {
        let a = Position::new(49, 10, room("W1N1")).unwrap();
        let b = Position::new(0, 10, room("W0N1")).unwrap();
        assert_eq!(a.range_to(&b), 1);
        assert_eq!(a.manhattan_to(&b), 1);
    }

    #[test]
    fn range_is_chebyshev_and_manhattan_sums() {
        let r = room("E1S1");
        let a = Position::new(10, 10, r).unwrap();
        let b = Position::new(13, 14, r).unwrap();
        assert_eq!(a.range_to(&b), 4);
        assert_eq!(a.manhattan_to(&b), 7);
        assert!(a.in_range_to(&b, 4));
        assert!(!a.in_range_to(&b, 3));
    }

    #[test]
    fn offset_wraps_into_neighbouring_room() {
        let pos = Position::new(0, 0, room("E1S1")).unwrap();
        let moved = pos.offset(-1, -1);
        assert_eq!(moved, Position::new(49, 49, room("E0S0")).unwrap());
    }

    #[test]
    fn eight_neighbours() {
        let pos = Position::center_of(room("W1N1"));
        assert_eq!(pos.neighbours().len(), 8);
        assert!(pos.neighbours().iter().all(|n| n.range_to(&pos) == 1));
    }
}
