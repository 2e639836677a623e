//! Job queue, spawn routing and loadout sizing for Hive.
//!
//! Task machines ask for workers by filing requests; this crate turns the
//! requests of one tick into at most one fabrication per spawn.
//!
//! # Modules
//!
//! - [`queue`] -- [`JobQueue`] and [`JobQueue::resolve`], the fabricator.
//! - [`routing`] -- Free spawns and nearest-spawn routing.
//! - [`loadout`] -- Body sizing from a funded amount.
//! - [`error`] -- [`LoadoutError`] and [`PopulationError`].

pub mod error;
pub mod loadout;
pub mod queue;
pub mod routing;

// Re-export primary types at crate root.
pub use error::{LoadoutError, PopulationError};
pub use loadout::{
    LoadoutTemplate, MAX_PARTS, base_cost, compute_loadout, loadout_for, template_for,
};
pub use queue::{Fabricated, JobQueue, JobRequest, ResolveReport};
pub use routing::{find_closest_spawn, free_spawns};
