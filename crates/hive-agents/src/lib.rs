//! Task machines of the Hive colony controller.
//!
//! A task machine owns a group of workers found by their role tag, files
//! job requests when the group is short and issues one action per worker
//! per tick. Machines keep no hidden state between ticks: what they need is
//! re-read from the world, from worker memory or from the colony's
//! persisted labels.
//!
//! # Modules
//!
//! - [`machine`] -- The [`StateMachine`] contract: compute, persist label, apply.
//! - [`context`] -- [`TaskContext`], the handles a machine works with.
//! - [`crew`] -- Worker discovery, objectives, claims and approach helpers.
//! - [`lookup`] -- Room lookups: spawns, storage, containers, damaged structures.
//! - [`harvest`] -- Static harvesting with a container per deposit.
//! - [`logistic`] -- Energy and mineral hauling.
//! - [`builder`] -- Construction site building.
//! - [`repair`] -- Structure repair.
//! - [`charge`] -- Controller upgrading.
//! - [`defend`] -- Melee defenders.
//! - [`tower`] -- Tower attack and repair.
//! - [`remote`] -- Remote source harvesting.
//! - [`claim`] -- Claiming a new room.
//! - [`bootstrap`] -- First spawn of a claimed room.
//! - [`mapper`] -- Room intel and visit planning.
//! - [`config`] -- [`AgentConfig`] tunables.
//! - [`error`] -- [`TaskError`].

pub mod bootstrap;
pub mod builder;
pub mod charge;
pub mod claim;
pub mod config;
pub mod context;
pub mod crew;
pub mod defend;
pub mod error;
pub mod harvest;
pub mod logistic;
pub mod lookup;
pub mod machine;
pub mod mapper;
pub mod remote;
pub mod repair;
pub mod tower;

// Re-export primary types at crate root.
pub use bootstrap::{BootstrapRoom, BootstrapState};
pub use builder::{Builders, preferred_sites};
pub use charge::{ChargeController, ChargeState};
pub use claim::ClaimRoom;
pub use config::AgentConfig;
pub use context::TaskContext;
pub use crew::{compute_affected_workers, tagged_workers, workers_with_role};
pub use defend::Defenders;
pub use error::TaskError;
pub use harvest::{Deposit, HarvestSource, HarvestState};
pub use logistic::{EnergyLogistics, MineralLogistics, energy_consumers};
pub use machine::StateMachine;
pub use mapper::{MAPPER_ARRIVAL_RANGE, compute_visit_plan, scan};
pub use remote::{RemoteHarvest, stable_hash};
pub use repair::{Repairers, repair_targets};
pub use tower::TowerDefense;
