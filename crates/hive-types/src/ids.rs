//! Type-safe identifier wrappers.
//!
//! Host objects (structures, sources, sites) and workers are identified by
//! opaque strings handed out by the host. Each gets its own newtype so a
//! source id can never be passed where a worker name is expected.
//! [`RoomName`] is structured: it parses the `W8N7` style naming into a
//! signed room grid coordinate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypesError;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Identifier of a host object: structure, source, mineral, site,
    /// tombstone or hostile.
    ObjectId
}

define_id! {
    /// Unique name of one of our workers. Worker names double as ids.
    WorkerId
}

impl WorkerId {
    /// Fresh worker name: `prefix` followed by a UUID v7 (time-ordered).
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix} {}", Uuid::now_v7().simple()))
    }
}

/// Identifier of a job request, unique within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Room names
// ---------------------------------------------------------------------------

/// A room on the world grid, e.g. `W8N7` or `E0S0`.
///
/// Internally stored as signed grid coordinates: `E<n>` maps to `x = n`,
/// `W<n>` to `x = -n - 1`, `S<n>` to `y = n`, and `N<n>` to `y = -n - 1`,
/// so `W0N0` and `E0S0` are diagonal neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName {
    /// Horizontal grid coordinate (east positive).
    pub x: i32,
    /// Vertical grid coordinate (south positive).
    pub y: i32,
}

impl RoomName {
    /// Build a room name from grid coordinates.
    pub const fn from_coords(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Linear distance between two rooms in room units (Chebyshev).
    pub const fn linear_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// The up to four rooms sharing an edge with this one.
    pub fn neighbours(self) -> Vec<Self> {
        [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(|(dx, dy): (i32, i32)| {
                Some(Self::from_coords(
                    self.x.checked_add(dx)?,
                    self.y.checked_add(dy)?,
                ))
            })
            .collect()
    }
}

/// Split a signed grid coordinate into its direction letter and index.
const fn axis_label(value: i32, negative: char, positive: char) -> (char, u32) {
    if value < 0 {
        // -1 -> 0, -2 -> 1 ...
        (negative, value.unsigned_abs().saturating_sub(1))
    } else {
        (positive, value.unsigned_abs())
    }
}

/// Parse one `<letter><digits>` axis of a room name.
fn parse_axis(
    letter: char,
    digits: &str,
    negative: char,
    positive: char,
    raw: &str,
) -> Result<i32, TypesError> {
    let invalid = || TypesError::InvalidRoomName {
        name: raw.to_owned(),
    };
    let unsigned: u32 = digits.parse().map_err(|_err| invalid())?;
    let index = i32::try_from(unsigned).map_err(|_err| invalid())?;
    if letter == positive {
        Ok(index)
    } else if letter == negative {
        index
            .checked_neg()
            .and_then(|v| v.checked_sub(1))
            .ok_or_else(invalid)
    } else {
        Err(invalid())
    }
}

impl FromStr for RoomName {
    type Err = TypesError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidRoomName {
            name: raw.to_owned(),
        };
        let mut chars = raw.chars();
        let h = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();
        let split = rest
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let (h_digits, tail) = rest.split_at(split);
        let mut tail_chars = tail.chars();
        let v = tail_chars.next().ok_or_else(invalid)?;
        let v_digits = tail_chars.as_str();
        if h_digits.is_empty() || v_digits.is_empty() {
            return Err(invalid());
        }

        let x = parse_axis(h, h_digits, 'W', 'E', raw)?;
        let y = parse_axis(v, v_digits, 'N', 'S', raw)?;
        Ok(Self { x, y })
    }
}

impl TryFrom<String> for RoomName {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomName> for String {
    fn from(room: RoomName) -> Self {
        room.to_string()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, hx) = axis_label(self.x, 'W', 'E');
        let (v, vy) = axis_label(self.y, 'N', 'S');
        write!(f, "{h}{hx}{v}{vy}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn room_names_parse_both_hemispheres() {
        let w = RoomName::from_str("W8N7").unwrap();
        assert_eq!(w, RoomName::from_coords(-9, -8));
        let e = RoomName::from_str("E0S0").unwrap();
        assert_eq!(e, RoomName::from_coords(0, 0));
    }

    #[test]
    fn room_names_display_back_to_host_format() {
        for raw in ["W8N7", "E0S0", "W0N0", "E12S3"] {
            assert_eq!(RoomName::from_str(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn malformed_room_names_are_rejected() {
        for raw in ["", "W8", "X1N1", "WN7", "W8N", "W8Q7", "W-1N1"] {
            assert!(RoomName::from_str(raw).is_err(), "{raw} should fail");
        }
    }

    #[test]
    fn neighbours_cross_the_meridian() {
        let room = RoomName::from_str("W0N0").unwrap();
        let names: Vec<String> = room.neighbours().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["W0N1", "E0N0", "W0S0", "W1N0"]);
    }

    #[test]
    fn room_name_serializes_as_string() {
        let room = RoomName::from_str("W3N5").unwrap();
        let json = serde_json::to_string(&room).unwrap();
        assert_eq!(json, "\"W3N5\"");
        let back: RoomName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, room);
    }

    #[test]
    fn generated_worker_names_are_distinct_and_prefixed() {
        let first = WorkerId::generate("harvester");
        let second = WorkerId::generate("harvester");
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("harvester "));
        assert_eq!(first.as_str().len(), "harvester ".len() + 32);
    }
}
