//! Shared type definitions for the Hive colony controller.
//!
//! This crate is the single source of truth for the vocabulary every other
//! Hive crate speaks: identifiers, tile positions, job types, body parts,
//! worker tags, and the snapshots the host hands out each tick.
//!
//! # Modules
//!
//! - [`ids`] -- Newtype identifiers and structured room names
//! - [`position`] -- Tile positions and cross-room distances
//! - [`enums`] -- Job types, roles, body parts, structures, action codes
//! - [`structs`] -- Stores, worker memory, and per-tick snapshots
//! - [`memory`] -- Persisted task machine labels and room intel
//! - [`error`] -- Parsing errors

pub mod enums;
pub mod error;
pub mod ids;
pub mod memory;
pub mod position;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionStatus, BodyPart, JobType, Objective, Resource, Role, StructureKind, body_cost,
};
pub use error::TypesError;
pub use ids::{ObjectId, RequestId, RoomName, WorkerId};
pub use memory::{ColonyMemory, INTEL_REVISIT_TICKS, IntelLog, IntelState, MAX_INTEL_ENTRIES};
pub use position::{Position, ROOM_CENTER, ROOM_SIZE};
pub use structs::{
    ControllerSnapshot, HostileSnapshot, MineralSnapshot, RoomEnergy, SiteSnapshot,
    SourceSnapshot, Store, StructureSnapshot, TombstoneSnapshot, WorkerMemory, WorkerMeta,
    WorkerSnapshot, WorkerTag,
};
