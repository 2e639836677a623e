//! Error types for parsing and validating shared types.

/// Errors raised while constructing shared types from raw host data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// A room name did not match the `W8N7` style format.
    #[error("invalid room name: {name:?}")]
    InvalidRoomName {
        /// The rejected input.
        name: String,
    },

    /// A tile coordinate fell outside the 50x50 room grid.
    #[error("coordinate ({x}, {y}) is outside the room grid")]
    OutOfRoom {
        /// Horizontal tile coordinate.
        x: u8,
        /// Vertical tile coordinate.
        y: u8,
    },
}
