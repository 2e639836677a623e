//! Error types for the harness binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the tick loop.

use hive_types::TypesError;

/// Top-level error for the harness binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hive_core::ConfigError,
    },

    /// A tick could not complete.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: hive_core::TickError,
    },

    /// The starter world could not be laid out.
    #[error("starter world error: {source}")]
    Starter {
        /// The underlying coordinate or name error.
        #[from]
        source: TypesError,
    },
}
