//! Error types for the `hive-world` crate.

use hive_types::{ObjectId, RoomName, WorkerId};

/// Errors raised by host interactions that are not plain action codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The worker does not exist (died or never fabricated).
    #[error("unknown worker: {worker}")]
    UnknownWorker {
        /// The missing worker.
        worker: WorkerId,
    },

    /// The object does not exist or is not visible.
    #[error("unknown object: {id}")]
    UnknownObject {
        /// The missing object.
        id: ObjectId,
    },

    /// The room is not part of the world.
    #[error("unknown room: {room}")]
    UnknownRoom {
        /// The missing room.
        room: RoomName,
    },
}
