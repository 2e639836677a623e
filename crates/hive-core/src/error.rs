//! Error types for the `hive-core` crate.
//!
//! A [`ColonyError`] aborts the tick of one colony only; the orchestrator
//! logs it and carries on with the other colonies. A [`TickError`] aborts
//! the whole tick.

use hive_agents::TaskError;
use hive_bank::BankError;
use hive_types::RoomName;

use crate::memory::MemoryError;

/// Errors raised while ticking one colony.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColonyError {
    /// The colony room has no controller.
    #[error("colony {room} has no controller")]
    MissingController {
        /// The colony room.
        room: RoomName,
    },

    /// The colony's banker rejected a sample or had none.
    #[error(transparent)]
    Bank(#[from] BankError),

    /// A task machine hit an invariant violation.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Errors that abort a whole tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The persisted document could not be loaded, cached into or saved.
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
