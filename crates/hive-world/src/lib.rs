//! Host world interface for the Hive colony controller.
//!
//! The controller never talks to the game directly. It reads snapshots and
//! issues commands through the [`World`] trait, so the same logic runs
//! against the live host and against the in-memory [`SimWorld`].
//!
//! # Modules
//!
//! - [`world`] -- The [`World`] trait.
//! - [`action`] -- Worker and tower commands.
//! - [`cost_matrix`] -- Per-room movement costs and path goals.
//! - [`query`] -- Closest-by-range/path helpers and traffic cost matrices.
//! - [`sim`] -- [`SimWorld`], a deterministic host for tests and the harness.
//! - [`error`] -- Error types for host interactions.

pub mod action;
pub mod cost_matrix;
pub mod error;
pub mod query;
pub mod sim;
pub mod world;

// Re-export primary types at crate root.
pub use action::{ADJACENT, TowerAction, WORK_RANGE, WorkerAction};
pub use cost_matrix::{CostMatrix, IMPASSABLE, PLAIN_COST, PathGoal, ROAD_COST};
pub use error::WorldError;
pub use query::{
    closest_by_path, closest_by_range, in_range, path_length, spiral, traffic_cost_matrix,
};
pub use sim::{PLAYER, SimWorld};
pub use world::{RoomCosts, World};
