//! Demand planning, colony control and the tick orchestrator for Hive.
//!
//! This crate ties the lower crates together. Every tick the [`Hive`]
//! orchestrator samples each colony's banker, lets the [`strategist`]
//! decide the colony's desired population, runs the task machines that
//! file job requests, then resolves the job queue into new workers.
//!
//! # Modules
//!
//! - [`config`] -- [`HiveConfig`], loaded from YAML with every field defaulted.
//! - [`memory`] -- The persisted [`Memory`] document and its [`KeyValueStore`].
//! - [`cache`] -- Tick-bounded memoization of world queries.
//! - [`strategist`] -- The gate-based demand planner.
//! - [`planner`] -- Construction site placement.
//! - [`colony`] -- [`ColonyController`], per-colony glue.
//! - [`global`] -- [`GlobalController`]: bootstrap, intel, remote harvesting.
//! - [`tick`] -- [`Hive`] and [`TickSummary`].
//! - [`error`] -- [`ColonyError`] and [`TickError`].

pub mod cache;
pub mod colony;
pub mod config;
pub mod error;
pub mod global;
pub mod memory;
pub mod planner;
pub mod strategist;
pub mod tick;

// Re-export primary types at crate root.
pub use cache::{cached, invalidate};
pub use colony::{ColonyController, ColonyReport};
pub use config::{
    ColonyConfig, ConfigError, EngineConfig, ExpansionConfig, HiveConfig, LoggingConfig,
    StrategyConfig,
};
pub use error::{ColonyError, TickError};
pub use global::{GlobalController, GlobalReport, PowerSighting};
pub use memory::{CachedEntry, InMemoryStore, KeyValueStore, MEMORY_KEY, Memory, MemoryError};
pub use planner::{SitePlanner, extension_allowance, tower_allowance};
pub use strategist::{ColonyObservation, DesiredState, GATES, Gate, next_strategy};
pub use tick::{Hive, OWNED_ROOMS_KEY, TickSummary};
