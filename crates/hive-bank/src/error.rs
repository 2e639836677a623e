//! Error types for the `hive-bank` crate.

use hive_types::RoomName;

/// Errors raised by a [`Banker`](crate::Banker).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// A signal was read before any sample was recorded.
    #[error("bank of {colony} has no samples yet")]
    EmptyHistory {
        /// Colony whose bank was queried.
        colony: RoomName,
    },

    /// A sample reported zero capacity, which makes the usage ratio undefined.
    #[error("bank of {colony} received a sample with zero capacity")]
    ZeroCapacity {
        /// Colony whose bank was fed.
        colony: RoomName,
    },

    /// A colony has no bank registered.
    #[error("no bank registered for {colony}")]
    UnknownColony {
        /// The colony looked up.
        colony: RoomName,
    },
}
