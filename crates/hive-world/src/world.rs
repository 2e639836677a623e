//! The host world interface.
//!
//! Everything the controller knows about the game comes through [`World`].
//! Reads return owned snapshots of the current tick. Writes return the
//! host's [`ActionStatus`] so callers can react to `NotInRange` and friends.

use hive_types::{
    ActionStatus, BodyPart, ControllerSnapshot, HostileSnapshot, MineralSnapshot, ObjectId,
    Position, RoomEnergy, RoomName, SiteSnapshot, SourceSnapshot, StructureKind,
    StructureSnapshot, TombstoneSnapshot, WorkerId, WorkerMemory, WorkerSnapshot,
};

use crate::action::{TowerAction, WorkerAction};
use crate::cost_matrix::{CostMatrix, PathGoal};
use crate::error::WorldError;

/// Per-room cost callback for path searches. Returning `None` excludes the
/// room from the search.
pub type RoomCosts<'a> = dyn Fn(RoomName) -> Option<CostMatrix> + 'a;

/// The simulated host, as seen by the controller.
pub trait World {
    /// Current game tick.
    fn time(&self) -> u64;

    /// Global control level: how many rooms we may control.
    fn gcl_level(&self) -> u8;

    /// Rooms currently visible to us.
    fn rooms(&self) -> Vec<RoomName>;

    /// Rooms reachable through the exits of `room`.
    fn exits(&self, room: RoomName) -> Vec<RoomName>;

    /// Controller of a visible room.
    fn controller(&self, room: RoomName) -> Option<ControllerSnapshot>;

    /// Fabrication energy of a visible room.
    fn room_energy(&self, room: RoomName) -> Option<RoomEnergy>;

    /// Energy sources of a visible room.
    fn sources(&self, room: RoomName) -> Vec<SourceSnapshot>;

    /// Mineral deposits of a visible room.
    fn minerals(&self, room: RoomName) -> Vec<MineralSnapshot>;

    /// Structures of a visible room, ours and others.
    fn structures(&self, room: RoomName) -> Vec<StructureSnapshot>;

    /// Construction sites of a visible room.
    fn sites(&self, room: RoomName) -> Vec<SiteSnapshot>;

    /// Hostile workers in a visible room.
    fn hostiles(&self, room: RoomName) -> Vec<HostileSnapshot>;

    /// Tombstones in a visible room.
    fn tombstones(&self, room: RoomName) -> Vec<TombstoneSnapshot>;

    /// All our workers, in every room.
    fn workers(&self) -> Vec<WorkerSnapshot>;

    /// Whether the terrain at `pos` is a natural wall.
    fn is_wall(&self, pos: &Position) -> bool;

    /// Search a path from `origin` to the closest tile satisfying any goal.
    ///
    /// The returned path excludes `origin` and ends on the reached tile.
    /// An empty path means `origin` already satisfies a goal.
    fn search_path(
        &self,
        origin: Position,
        goals: &[PathGoal],
        room_costs: &RoomCosts<'_>,
    ) -> Option<Vec<Position>>;

    /// Start fabricating a worker at a spawn.
    fn fabricate(&mut self, spawn: &ObjectId, body: &[BodyPart], name: &WorkerId)
    -> ActionStatus;

    /// Make a worker attempt an action.
    fn act(&mut self, worker: &WorkerId, action: &WorkerAction) -> ActionStatus;

    /// Make a tower attempt an action.
    fn tower_act(&mut self, tower: &ObjectId, action: &TowerAction) -> ActionStatus;

    /// Place a construction site.
    fn create_site(&mut self, pos: Position, kind: StructureKind) -> ActionStatus;

    /// Overwrite a worker's controller-owned memory.
    fn set_worker_memory(
        &mut self,
        worker: &WorkerId,
        memory: WorkerMemory,
    ) -> Result<(), WorldError>;

    /// One worker by id.
    fn worker(&self, id: &WorkerId) -> Option<WorkerSnapshot> {
        self.workers().into_iter().find(|w| &w.id == id)
    }

    /// Our workers currently standing in `room`.
    fn workers_in(&self, room: RoomName) -> Vec<WorkerSnapshot> {
        self.workers()
            .into_iter()
            .filter(|w| w.pos.room == room)
            .collect()
    }
}
