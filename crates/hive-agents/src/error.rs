//! Error types for the `hive-agents` crate.
//!
//! Task machines return typed errors for invariant violations only.
//! Ordinary action failures (out of range, empty source, full target) are
//! logged and retried next tick, never raised.

use hive_types::{Position, RoomName};
use hive_world::WorldError;

/// Errors raised by a task machine during its tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// A harvest machine was built for a source that is not there.
    #[error("no source or mineral at {pos} for colony {colony}")]
    NoSourceForHarvester {
        /// Colony owning the machine.
        colony: RoomName,
        /// Where the source was expected.
        pos: Position,
    },

    /// The machine reached a state its preconditions rule out.
    #[error("invalid state in {machine}: {reason}")]
    InvalidState {
        /// Machine name.
        machine: String,
        /// What was inconsistent.
        reason: String,
    },

    /// A remote source can no longer be harvested (the room got claimed).
    #[error("cannot harvest remote source at {target}")]
    CannotHarvest {
        /// The remote source tile.
        target: Position,
    },

    /// No storage anywhere can receive remote harvests.
    #[error("no storage to deliver remote harvest from {target}")]
    NoStorage {
        /// The remote source tile.
        target: Position,
    },

    /// A host interaction failed outside the action status codes.
    #[error(transparent)]
    World(#[from] WorldError),
}
