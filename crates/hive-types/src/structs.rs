//! Core data structs: worker tags and memory, stores, and the per-tick
//! snapshots the host hands out for every visible object.
//!
//! Snapshots are plain owned values. They are re-read from the host every
//! tick and never cached across ticks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::{BodyPart, Objective, Resource, Role, StructureKind};
use crate::ids::{ObjectId, RoomName, WorkerId};
use crate::position::Position;

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Resource contents of a worker or structure, sharing one capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Amount held per resource.
    pub contents: BTreeMap<Resource, u32>,
    /// Total capacity across all resources.
    pub capacity: u32,
}

impl Store {
    /// An empty store of the given capacity.
    pub const fn with_capacity(capacity: u32) -> Self {
        Self {
            contents: BTreeMap::new(),
            capacity,
        }
    }

    /// Amount of one resource.
    pub fn get(&self, resource: Resource) -> u32 {
        self.contents.get(&resource).copied().unwrap_or(0)
    }

    /// Energy held.
    pub fn energy(&self) -> u32 {
        self.get(Resource::Energy)
    }

    /// Total amount held across resources.
    pub fn used(&self) -> u32 {
        self.contents
            .values()
            .fold(0_u32, |acc, v| acc.saturating_add(*v))
    }

    /// Remaining free capacity.
    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.used())
    }

    /// Whether the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// Whether no capacity remains.
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Non-energy resources held, in resource order.
    pub fn minerals(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        self.contents
            .iter()
            .filter(|(r, v)| **r != Resource::Energy && **v > 0)
            .map(|(r, v)| (*r, *v))
    }

    /// Add up to `amount`, limited by free capacity. Returns what was added.
    pub fn add(&mut self, resource: Resource, amount: u32) -> u32 {
        let added = amount.min(self.free());
        if added > 0 {
            let slot = self.contents.entry(resource).or_insert(0);
            *slot = slot.saturating_add(added);
        }
        added
    }

    /// Remove up to `amount`. Returns what was removed.
    pub fn remove(&mut self, resource: Resource, amount: u32) -> u32 {
        let Some(slot) = self.contents.get_mut(&resource) else {
            return 0;
        };
        let removed = amount.min(*slot);
        *slot = slot.saturating_sub(removed);
        if *slot == 0 {
            self.contents.remove(&resource);
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Worker tags and memory
// ---------------------------------------------------------------------------

/// Structured role tag. Task machines find their workers by comparing tags
/// by value, so workers re-attach to their machine after a restart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerTag {
    /// Colony the worker serves.
    pub colony: RoomName,
    /// Task machine the worker belongs to.
    pub role: Role,
    /// Disambiguator inside the colony, e.g. the harvested source id.
    pub target: Option<String>,
}

impl WorkerTag {
    /// A colony-wide tag without a target.
    pub const fn new(colony: RoomName, role: Role) -> Self {
        Self {
            colony,
            role,
            target: None,
        }
    }

    /// Scope the tag to a specific target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

impl fmt::Display for WorkerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}:{:?}:{target}", self.colony, self.role),
            None => write!(f, "{}:{:?}", self.colony, self.role),
        }
    }
}

/// Per-worker scratch space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMeta {
    /// Bound delivery (or work) target.
    pub destination: Option<ObjectId>,
    /// Bound pickup source.
    pub source: Option<ObjectId>,
    /// Room the worker is heading for.
    pub target_room: Option<RoomName>,
    /// Rooms already visited, for explorers.
    pub visited: Vec<RoomName>,
}

/// Everything the controller stores on a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMemory {
    /// Role tag.
    pub tag: WorkerTag,
    /// Current gather/deliver objective.
    pub objective: Objective,
    /// Scratch space.
    pub meta: WorkerMeta,
}

impl WorkerMemory {
    /// Fresh memory for a worker carrying `tag`.
    pub fn new(tag: WorkerTag) -> Self {
        Self {
            tag,
            objective: Objective::default(),
            meta: WorkerMeta::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One of our workers as seen this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    /// Unique worker name.
    pub id: WorkerId,
    /// Current tile.
    pub pos: Position,
    /// Fixed body.
    pub body: Vec<BodyPart>,
    /// Cargo.
    pub store: Store,
    /// Remaining lifetime in ticks.
    pub ticks_to_live: u32,
    /// Whether the worker is still being fabricated.
    pub spawning: bool,
    /// Controller-owned memory, absent until stamped.
    pub memory: Option<WorkerMemory>,
}

impl WorkerSnapshot {
    /// The worker's tag, if stamped.
    pub fn tag(&self) -> Option<&WorkerTag> {
        self.memory.as_ref().map(|m| &m.tag)
    }

    /// Whether the worker carries exactly this tag.
    pub fn has_tag(&self, tag: &WorkerTag) -> bool {
        self.tag() == Some(tag)
    }

    /// Number of parts of one kind.
    pub fn count_parts(&self, part: BodyPart) -> usize {
        self.body.iter().filter(|p| **p == part).count()
    }

    /// Current objective, defaulting to gather for unstamped workers.
    pub fn objective(&self) -> Objective {
        self.memory.as_ref().map_or_else(Objective::default, |m| m.objective)
    }

    /// Bound destination, if any.
    pub fn destination(&self) -> Option<&ObjectId> {
        self.memory.as_ref().and_then(|m| m.meta.destination.as_ref())
    }
}

/// A structure as seen this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Structure kind.
    pub kind: StructureKind,
    /// Tile.
    pub pos: Position,
    /// Current hit points.
    pub hits: u32,
    /// Maximum hit points.
    pub hits_max: u32,
    /// Store, for structures that hold resources.
    pub store: Option<Store>,
    /// Whether we own the structure.
    pub my: bool,
    /// Spawns only: whether a worker is being fabricated.
    pub spawning: bool,
    /// Ticks until the structure decays away, for structures that do.
    pub ticks_to_decay: Option<u32>,
}

impl StructureSnapshot {
    /// Whether hit points are below `percent` of the maximum.
    pub fn hits_below(&self, percent: u32) -> bool {
        let lhs = u64::from(self.hits).saturating_mul(100);
        let rhs = u64::from(self.hits_max).saturating_mul(u64::from(percent));
        lhs < rhs
    }

    /// Whether the structure is damaged at all.
    pub const fn is_damaged(&self) -> bool {
        self.hits < self.hits_max
    }

    /// Energy held, zero for storeless structures.
    pub fn energy(&self) -> u32 {
        self.store.as_ref().map_or(0, Store::energy)
    }

    /// Free capacity, zero for storeless structures.
    pub fn free_capacity(&self) -> u32 {
        self.store.as_ref().map_or(0, Store::free)
    }
}

/// An energy source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Tile.
    pub pos: Position,
    /// Energy left until regeneration.
    pub energy: u32,
    /// Energy restored at each regeneration.
    pub energy_capacity: u32,
}

/// A mineral deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineralSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Tile.
    pub pos: Position,
    /// Mineral type.
    pub resource: Resource,
    /// Amount left.
    pub amount: u32,
}

/// A construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Kind of structure being built.
    pub kind: StructureKind,
    /// Tile.
    pub pos: Position,
    /// Progress so far.
    pub progress: u32,
    /// Progress needed to finish.
    pub progress_total: u32,
}

/// A hostile worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostileSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Tile.
    pub pos: Position,
    /// Owning player.
    pub owner: String,
    /// Body.
    pub body: Vec<BodyPart>,
}

/// A room controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Tile.
    pub pos: Position,
    /// Controller level, 0 when unowned.
    pub level: u8,
    /// Whether we own it.
    pub my: bool,
    /// Owning player, if any.
    pub owner: Option<String>,
}

/// Remains of a dead worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TombstoneSnapshot {
    /// Host id.
    pub id: ObjectId,
    /// Tile.
    pub pos: Position,
    /// Resources left behind.
    pub store: Store,
}

/// Spawn energy of a room: what spawns and extensions hold right now and
/// what they can hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEnergy {
    /// Energy available for fabrication.
    pub available: u32,
    /// Maximum fabrication energy.
    pub capacity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn store_add_respects_capacity() {
        let mut store = Store::with_capacity(100);
        assert_eq!(store.add(Resource::Energy, 70), 70);
        assert_eq!(store.add(Resource::Hydrogen, 70), 30);
        assert!(store.is_full());
        assert_eq!(store.minerals().collect::<Vec<_>>(), vec![(Resource::Hydrogen, 30)]);
    }

    #[test]
    fn store_remove_clears_empty_slots() {
        let mut store = Store::with_capacity(100);
        store.add(Resource::Energy, 40);
        assert_eq!(store.remove(Resource::Energy, 50), 40);
        assert!(store.is_empty());
        assert!(store.contents.is_empty());
        assert_eq!(store.remove(Resource::Oxygen, 5), 0);
    }

    #[test]
    fn tags_compare_by_value() {
        let room: RoomName = "W1N1".parse().unwrap();
        let a = WorkerTag::new(room, Role::Harvester).with_target("src1");
        let b = WorkerTag::new(room, Role::Harvester).with_target("src1");
        let c = WorkerTag::new(room, Role::Harvester).with_target("src2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "W1N1:Harvester:src1");
    }

    #[test]
    fn hits_below_uses_integer_percentages() {
        let s = StructureSnapshot {
            id: ObjectId::from("road"),
            kind: StructureKind::Road,
            pos: Position::center_of("W1N1".parse().unwrap()),
            hits: 2_499,
            hits_max: 5_000,
            store: None,
            my: true,
            spawning: false,
            ticks_to_decay: None,
        };
        assert!(s.hits_below(50));
        assert!(!s.hits_below(49));
        assert!(s.is_damaged());
    }
}
