//! A deterministic in-memory host.
//!
//! [`SimWorld`] implements [`World`] with a small subset of the game rules:
//! fabrication paid from spawn and extension energy, harvesting, hauling,
//! building, repairing, upgrading, melee combat, claiming, towers, worker
//! lifetimes, and source regeneration. Rooms sit on the global tile grid so
//! workers walk across borders. Tests and the engine harness drive it with
//! [`SimWorld::advance`].
//!
//! Actions resolve immediately when issued rather than at the end of the
//! tick.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hive_types::{
    ActionStatus, BodyPart, ControllerSnapshot, HostileSnapshot, MineralSnapshot, ObjectId,
    Position, Resource, RoomEnergy, RoomName, SiteSnapshot, SourceSnapshot, Store,
    StructureKind, StructureSnapshot, TombstoneSnapshot, WorkerId, WorkerMemory, WorkerSnapshot,
    body_cost,
};
use tracing::debug;

use crate::action::{ADJACENT, TowerAction, WORK_RANGE, WorkerAction};
use crate::cost_matrix::{CostMatrix, IMPASSABLE, PLAIN_COST, PathGoal};
use crate::error::WorldError;
use crate::query::traffic_cost_matrix;
use crate::world::{RoomCosts, World};

/// Owner name of everything the controller owns.
pub const PLAYER: &str = "hive";

/// Ticks between source regenerations.
pub const SOURCE_REGEN_TICKS: u64 = 300;

/// Lifetime of a regular worker.
pub const WORKER_LIFETIME: u32 = 1_500;

/// Lifetime of a worker carrying claim parts.
pub const CLAIM_WORKER_LIFETIME: u32 = 600;

/// Fabrication time per body part.
pub const SPAWN_TICKS_PER_PART: u32 = 3;

/// Body part limit per worker.
pub const MAX_BODY_PARTS: usize = 50;

/// Energy a spawn regenerates on its own up to.
pub const SPAWN_ENERGY_CAPACITY: u32 = 300;

/// Node expansions before a path search gives up.
pub const MAX_SEARCH_OPS: usize = 20_000;

const HARVEST_PER_WORK: u32 = 2;
const MINERAL_PER_WORK: u32 = 1;
const BUILD_PER_WORK: u32 = 5;
const REPAIR_HITS_PER_ENERGY: u32 = 100;
const ATTACK_PER_PART: u32 = 30;
const CARRY_PER_PART: u32 = 50;
const TOWER_ENERGY_PER_ACTION: u32 = 10;
const TOWER_ATTACK_DAMAGE: u32 = 300;
const TOWER_REPAIR_HITS: u32 = 800;
const HOSTILE_HITS_PER_PART: u32 = 100;
const CONTROLLER_PROGRESS_PER_LEVEL: u32 = 1_000;
const MAX_CONTROLLER_LEVEL: u8 = 8;
const POWER_BANK_DECAY: u32 = 5_000;

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct SimRoom {
    always_visible: bool,
    walls: BTreeSet<(u8, u8)>,
    controller: Option<ControllerSnapshot>,
    controller_progress: u32,
    sources: Vec<SourceSnapshot>,
    minerals: Vec<MineralSnapshot>,
    structures: Vec<StructureSnapshot>,
    sites: Vec<SiteSnapshot>,
    hostiles: Vec<SimHostile>,
    tombstones: Vec<TombstoneSnapshot>,
}

impl SimRoom {
    fn is_foreign(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|c| c.owner.is_some() && !c.my)
    }

    fn is_occupied(&self, pos: &Position) -> bool {
        self.structures
            .iter()
            .any(|s| s.pos == *pos && s.kind != StructureKind::Road)
            || self.sites.iter().any(|s| s.pos == *pos)
            || self.sources.iter().any(|s| s.pos == *pos)
            || self.controller.as_ref().is_some_and(|c| c.pos == *pos)
    }
}

#[derive(Debug, Clone)]
struct SimHostile {
    snapshot: HostileSnapshot,
    hits: u32,
}

#[derive(Debug, Clone)]
struct SimWorker {
    snapshot: WorkerSnapshot,
    spawn_remaining: u32,
    spawned_by: Option<ObjectId>,
}

/// Hit points and store of a freshly built structure.
const fn structure_defaults(kind: StructureKind) -> (u32, Option<u32>) {
    match kind {
        StructureKind::Spawn => (5_000, Some(SPAWN_ENERGY_CAPACITY)),
        StructureKind::Extension => (1_000, Some(50)),
        StructureKind::Road => (5_000, None),
        StructureKind::Container => (250_000, Some(2_000)),
        StructureKind::Storage => (10_000, Some(1_000_000)),
        StructureKind::Tower => (3_000, Some(1_000)),
        StructureKind::Terminal => (3_000, Some(300_000)),
        StructureKind::Extractor => (500, None),
        StructureKind::Wall | StructureKind::Rampart => (1, None),
        StructureKind::Controller => (0, None),
        StructureKind::PowerBank => (2_000_000, None),
    }
}

fn parts(worker: &WorkerSnapshot, part: BodyPart) -> u32 {
    u32::try_from(worker.count_parts(part)).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// SimWorld
// ---------------------------------------------------------------------------

/// Deterministic in-memory host.
#[derive(Debug, Clone)]
pub struct SimWorld {
    time: u64,
    gcl_level: u8,
    next_id: u64,
    rooms: BTreeMap<RoomName, SimRoom>,
    workers: BTreeMap<WorkerId, SimWorker>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// An empty world at tick 0 with global control level 1.
    pub const fn new() -> Self {
        Self {
            time: 0,
            gcl_level: 1,
            next_id: 0,
            rooms: BTreeMap::new(),
            workers: BTreeMap::new(),
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> ObjectId {
        self.next_id = self.next_id.saturating_add(1);
        ObjectId(format!("{prefix}-{}", self.next_id))
    }

    fn room_entry(&mut self, room: RoomName) -> &mut SimRoom {
        self.rooms.entry(room).or_insert_with(|| SimRoom {
            always_visible: true,
            ..SimRoom::default()
        })
    }

    // --- Scenario building -------------------------------------------------

    /// Add an always-visible room.
    pub fn add_room(&mut self, room: RoomName) -> &mut Self {
        self.room_entry(room);
        self
    }

    /// Add a room that is only visible while we have presence in it.
    pub fn add_hidden_room(&mut self, room: RoomName) -> &mut Self {
        self.room_entry(room).always_visible = false;
        self
    }

    /// Turn a tile into natural wall.
    pub fn add_wall(&mut self, pos: Position) {
        self.room_entry(pos.room).walls.insert((pos.x, pos.y));
    }

    /// Set the global control level.
    pub const fn set_gcl(&mut self, level: u8) {
        self.gcl_level = level;
    }

    /// Jump to a tick.
    pub const fn set_time(&mut self, time: u64) {
        self.time = time;
    }

    /// Place a controller. `owner` of [`PLAYER`] makes it ours.
    pub fn add_controller(&mut self, pos: Position, level: u8, owner: Option<&str>) -> ObjectId {
        let id = self.fresh_id("controller");
        self.room_entry(pos.room).controller = Some(ControllerSnapshot {
            id: id.clone(),
            pos,
            level,
            my: owner == Some(PLAYER),
            owner: owner.map(str::to_owned),
        });
        id
    }

    /// Place a full energy source.
    pub fn add_source(&mut self, pos: Position, capacity: u32) -> ObjectId {
        let id = self.fresh_id("source");
        self.room_entry(pos.room).sources.push(SourceSnapshot {
            id: id.clone(),
            pos,
            energy: capacity,
            energy_capacity: capacity,
        });
        id
    }

    /// Place a mineral deposit.
    pub fn add_mineral(&mut self, pos: Position, resource: Resource, amount: u32) -> ObjectId {
        let id = self.fresh_id("mineral");
        self.room_entry(pos.room).minerals.push(MineralSnapshot {
            id: id.clone(),
            pos,
            resource,
            amount,
        });
        id
    }

    /// Place one of our structures. Spawns and extensions start full.
    pub fn add_structure(&mut self, kind: StructureKind, pos: Position) -> ObjectId {
        self.insert_structure(kind, pos, true)
    }

    /// Place a structure owned by someone else.
    pub fn add_foreign_structure(&mut self, kind: StructureKind, pos: Position) -> ObjectId {
        self.insert_structure(kind, pos, false)
    }

    fn insert_structure(&mut self, kind: StructureKind, pos: Position, my: bool) -> ObjectId {
        let id = self.fresh_id(kind_prefix(kind));
        let structure = build_structure(id.clone(), kind, pos, my);
        self.room_entry(pos.room).structures.push(structure);
        id
    }

    /// Set the exact amount of a resource held by a structure.
    pub fn set_stored(&mut self, id: &ObjectId, resource: Resource, amount: u32) -> bool {
        let Some(store) = self.structure_mut(id).and_then(|s| s.store.as_mut()) else {
            return false;
        };
        let held = store.get(resource);
        store.remove(resource, held);
        store.add(resource, amount) == amount
    }

    /// Set the hit points of a structure.
    pub fn set_hits(&mut self, id: &ObjectId, hits: u32) -> bool {
        self.structure_mut(id).is_some_and(|s| {
            s.hits = hits.min(s.hits_max);
            true
        })
    }

    /// Place a construction site.
    pub fn add_site(&mut self, kind: StructureKind, pos: Position) -> ObjectId {
        let id = self.fresh_id("site");
        self.room_entry(pos.room).sites.push(SiteSnapshot {
            id: id.clone(),
            kind,
            pos,
            progress: 0,
            progress_total: kind.build_cost(),
        });
        id
    }

    /// Place a ready (not spawning) worker.
    pub fn add_worker(
        &mut self,
        name: &str,
        pos: Position,
        body: Vec<BodyPart>,
        memory: Option<WorkerMemory>,
    ) -> WorkerId {
        self.room_entry(pos.room);
        let id = WorkerId::from(name);
        let snapshot = new_worker_snapshot(id.clone(), pos, body, memory, false);
        self.workers.insert(
            id.clone(),
            SimWorker {
                snapshot,
                spawn_remaining: 0,
                spawned_by: None,
            },
        );
        id
    }

    /// Set the exact amount of a resource carried by a worker.
    pub fn set_carried(&mut self, id: &WorkerId, resource: Resource, amount: u32) -> bool {
        let Some(worker) = self.workers.get_mut(id) else {
            return false;
        };
        let store = &mut worker.snapshot.store;
        let held = store.get(resource);
        store.remove(resource, held);
        store.add(resource, amount) == amount
    }

    /// Set a worker's remaining lifetime.
    pub fn set_ticks_to_live(&mut self, id: &WorkerId, ticks: u32) -> bool {
        self.workers.get_mut(id).is_some_and(|w| {
            w.snapshot.ticks_to_live = ticks;
            true
        })
    }

    /// Place a hostile worker.
    pub fn add_hostile(&mut self, pos: Position, owner: &str, body: Vec<BodyPart>) -> ObjectId {
        let id = self.fresh_id("hostile");
        let hits = u32::try_from(body.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(HOSTILE_HITS_PER_PART);
        self.room_entry(pos.room).hostiles.push(SimHostile {
            snapshot: HostileSnapshot {
                id: id.clone(),
                pos,
                owner: owner.to_owned(),
                body,
            },
            hits,
        });
        id
    }

    /// Remove every hostile from a room.
    pub fn clear_hostiles(&mut self, room: RoomName) {
        if let Some(r) = self.rooms.get_mut(&room) {
            r.hostiles.clear();
        }
    }

    /// Place a tombstone.
    pub fn add_tombstone(&mut self, pos: Position, store: Store) -> ObjectId {
        let id = self.fresh_id("tombstone");
        self.room_entry(pos.room).tombstones.push(TombstoneSnapshot {
            id: id.clone(),
            pos,
            store,
        });
        id
    }

    // --- Simulation --------------------------------------------------------

    /// Step simulated time by one tick.
    ///
    /// Fabrication progresses, lifetimes run down (dead workers leave a
    /// tombstone when carrying cargo), spawns trickle energy back up to
    /// their base capacity, sources refill every [`SOURCE_REGEN_TICKS`],
    /// and power banks decay.
    pub fn advance(&mut self) {
        self.time = self.time.saturating_add(1);

        let mut finished_spawns = Vec::new();
        let mut dead = Vec::new();
        for (id, worker) in &mut self.workers {
            if worker.snapshot.spawning {
                worker.spawn_remaining = worker.spawn_remaining.saturating_sub(1);
                if worker.spawn_remaining == 0 {
                    worker.snapshot.spawning = false;
                    if let Some(spawn) = worker.spawned_by.take() {
                        finished_spawns.push(spawn);
                    }
                }
            } else {
                worker.snapshot.ticks_to_live = worker.snapshot.ticks_to_live.saturating_sub(1);
                if worker.snapshot.ticks_to_live == 0 {
                    dead.push(id.clone());
                }
            }
        }
        for spawn in finished_spawns {
            if let Some(s) = self.structure_mut(&spawn) {
                s.spawning = false;
            }
        }
        for id in dead {
            debug!(worker = %id, "worker expired");
            self.remove_worker(&id);
        }

        let regen = self
            .time
            .checked_rem(SOURCE_REGEN_TICKS)
            .is_some_and(|r| r == 0);
        for room in self.rooms.values_mut() {
            if regen {
                for source in &mut room.sources {
                    source.energy = source.energy_capacity;
                }
            }
            let available = room_energy_of(room).available;
            if available < SPAWN_ENERGY_CAPACITY {
                for spawn in room
                    .structures
                    .iter_mut()
                    .filter(|s| s.kind == StructureKind::Spawn && s.my)
                {
                    if let Some(store) = spawn.store.as_mut() {
                        store.add(Resource::Energy, 1);
                    }
                }
            }
            room.tombstones.retain(|t| !t.store.is_empty());
            for structure in &mut room.structures {
                if let Some(ticks) = structure.ticks_to_decay.as_mut() {
                    *ticks = ticks.saturating_sub(1);
                }
            }
            room.structures.retain(|s| s.ticks_to_decay != Some(0));
        }
    }

    /// Progress toward the next level of the controller in `room`.
    pub fn controller_progress(&self, room: RoomName) -> u32 {
        self.rooms.get(&room).map_or(0, |r| r.controller_progress)
    }

    // --- Lookups -----------------------------------------------------------

    fn is_visible(&self, room: RoomName) -> bool {
        let Some(r) = self.rooms.get(&room) else {
            return false;
        };
        r.always_visible
            || r.structures.iter().any(|s| s.my)
            || r.controller.as_ref().is_some_and(|c| c.my)
            || self.workers.values().any(|w| w.snapshot.pos.room == room)
    }

    fn visible_room(&self, room: RoomName) -> Option<&SimRoom> {
        if self.is_visible(room) {
            self.rooms.get(&room)
        } else {
            None
        }
    }

    fn structure(&self, id: &ObjectId) -> Option<&StructureSnapshot> {
        self.rooms
            .values()
            .flat_map(|r| r.structures.iter())
            .find(|s| &s.id == id)
    }

    fn structure_mut(&mut self, id: &ObjectId) -> Option<&mut StructureSnapshot> {
        self.rooms
            .values_mut()
            .flat_map(|r| r.structures.iter_mut())
            .find(|s| &s.id == id)
    }

    fn worker_store_mut(&mut self, id: &WorkerId) -> Option<&mut Store> {
        self.workers.get_mut(id).map(|w| &mut w.snapshot.store)
    }

    fn remove_worker(&mut self, id: &WorkerId) {
        let Some(worker) = self.workers.remove(id) else {
            return;
        };
        if let Some(spawn) = worker.spawned_by
            && let Some(s) = self.structure_mut(&spawn)
        {
            s.spawning = false;
        }
        let snapshot = worker.snapshot;
        if !snapshot.store.is_empty() {
            let tomb = self.fresh_id("tombstone");
            self.room_entry(snapshot.pos.room)
                .tombstones
                .push(TombstoneSnapshot {
                    id: tomb,
                    pos: snapshot.pos,
                    store: snapshot.store,
                });
        }
    }

    fn step_cost(
        &self,
        pos: &Position,
        room_costs: &RoomCosts<'_>,
        matrices: &mut BTreeMap<RoomName, Option<CostMatrix>>,
    ) -> Option<u32> {
        let room = self.rooms.get(&pos.room)?;
        if room.walls.contains(&(pos.x, pos.y)) {
            return None;
        }
        let matrix = matrices
            .entry(pos.room)
            .or_insert_with(|| room_costs(pos.room))
            .as_ref()?;
        match matrix.at(pos) {
            IMPASSABLE => None,
            0 => Some(u32::from(PLAIN_COST)),
            cost => Some(u32::from(cost)),
        }
    }

    // --- Actions -----------------------------------------------------------

    fn act_move(&mut self, worker: &WorkerSnapshot, target: Position, range: u32) -> ActionStatus {
        if parts(worker, BodyPart::Move) == 0 {
            return ActionStatus::NoBodyPart;
        }
        if worker.pos.in_range_to(&target, range) {
            return ActionStatus::Ok;
        }
        let step = {
            let this: &Self = self;
            let costs = |room: RoomName| Some(traffic_cost_matrix(this, room, false));
            this.search_path(worker.pos, &[PathGoal::new(target, range)], &costs)
                .and_then(|path| path.first().copied())
        };
        let Some(step) = step else {
            return ActionStatus::NoPath;
        };
        if let Some(w) = self.workers.get_mut(&worker.id) {
            w.snapshot.pos = step;
        }
        ActionStatus::Ok
    }

    fn act_harvest(&mut self, worker: &WorkerSnapshot, target: &ObjectId) -> ActionStatus {
        let work = parts(worker, BodyPart::Work);
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let mut harvested = None;
        for room in self.rooms.values_mut() {
            let foreign = room.is_foreign();
            if let Some(source) = room.sources.iter_mut().find(|s| &s.id == target) {
                if !worker.pos.in_range_to(&source.pos, ADJACENT) {
                    return ActionStatus::NotInRange;
                }
                if foreign {
                    return ActionStatus::NotOwner;
                }
                if source.energy == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                let amount = work.saturating_mul(HARVEST_PER_WORK).min(source.energy);
                source.energy = source.energy.saturating_sub(amount);
                harvested = Some((Resource::Energy, amount));
                break;
            }
            if let Some(mineral) = room.minerals.iter_mut().find(|m| &m.id == target) {
                if !worker.pos.in_range_to(&mineral.pos, ADJACENT) {
                    return ActionStatus::NotInRange;
                }
                let extractor = room
                    .structures
                    .iter()
                    .any(|s| s.kind == StructureKind::Extractor && s.pos == mineral.pos);
                if !extractor {
                    return ActionStatus::InvalidTarget;
                }
                if mineral.amount == 0 {
                    return ActionStatus::NotEnoughResources;
                }
                let amount = work.saturating_mul(MINERAL_PER_WORK).min(mineral.amount);
                mineral.amount = mineral.amount.saturating_sub(amount);
                harvested = Some((mineral.resource, amount));
                break;
            }
        }
        let Some((resource, amount)) = harvested else {
            return ActionStatus::InvalidTarget;
        };

        let kept = self
            .worker_store_mut(&worker.id)
            .map_or(0, |store| store.add(resource, amount));
        let overflow = amount.saturating_sub(kept);
        if overflow > 0
            && let Some(container) = self.rooms.get_mut(&worker.pos.room).and_then(|r| {
                r.structures
                    .iter_mut()
                    .find(|s| s.kind == StructureKind::Container && s.pos == worker.pos)
            })
            && let Some(store) = container.store.as_mut()
        {
            store.add(resource, overflow);
        }
        ActionStatus::Ok
    }

    fn act_transfer(
        &mut self,
        worker: &WorkerSnapshot,
        target: &ObjectId,
        resource: Resource,
    ) -> ActionStatus {
        let held = worker.store.get(resource);
        if held == 0 {
            return ActionStatus::NotEnoughResources;
        }
        let moved = {
            let Some(structure) = self.structure_mut(target) else {
                return ActionStatus::InvalidTarget;
            };
            if !worker.pos.in_range_to(&structure.pos, ADJACENT) {
                return ActionStatus::NotInRange;
            }
            let energy_only = matches!(
                structure.kind,
                StructureKind::Spawn | StructureKind::Extension | StructureKind::Tower
            );
            if energy_only && resource != Resource::Energy {
                return ActionStatus::InvalidArgs;
            }
            let Some(store) = structure.store.as_mut() else {
                return ActionStatus::InvalidTarget;
            };
            store.add(resource, held)
        };
        if moved == 0 {
            return ActionStatus::Full;
        }
        if let Some(store) = self.worker_store_mut(&worker.id) {
            store.remove(resource, moved);
        }
        ActionStatus::Ok
    }

    fn act_withdraw(
        &mut self,
        worker: &WorkerSnapshot,
        target: &ObjectId,
        resource: Resource,
    ) -> ActionStatus {
        let free = worker.store.free();
        if free == 0 {
            return ActionStatus::Full;
        }
        let taken = {
            let room = self.rooms.values_mut().find(|r| {
                r.structures.iter().any(|s| &s.id == target)
                    || r.tombstones.iter().any(|t| &t.id == target)
            });
            let Some(room) = room else {
                return ActionStatus::InvalidTarget;
            };
            let holder = if let Some(s) = room.structures.iter_mut().find(|s| &s.id == target) {
                let pos = s.pos;
                s.store.as_mut().map(|store| (pos, store))
            } else {
                room.tombstones
                    .iter_mut()
                    .find(|t| &t.id == target)
                    .map(|t| (t.pos, &mut t.store))
            };
            let Some((pos, store)) = holder else {
                return ActionStatus::InvalidTarget;
            };
            if !worker.pos.in_range_to(&pos, ADJACENT) {
                return ActionStatus::NotInRange;
            }
            store.remove(resource, free)
        };
        if taken == 0 {
            return ActionStatus::NotEnoughResources;
        }
        if let Some(store) = self.worker_store_mut(&worker.id) {
            store.add(resource, taken);
        }
        ActionStatus::Ok
    }

    fn act_build(&mut self, worker: &WorkerSnapshot, site_id: &ObjectId) -> ActionStatus {
        let work = parts(worker, BodyPart::Work);
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let energy = worker.store.energy();
        let Some(room) = self
            .rooms
            .values_mut()
            .find(|r| r.sites.iter().any(|s| &s.id == site_id))
        else {
            return ActionStatus::InvalidTarget;
        };
        let Some(site) = room.sites.iter_mut().find(|s| &s.id == site_id) else {
            return ActionStatus::InvalidTarget;
        };
        if !worker.pos.in_range_to(&site.pos, WORK_RANGE) {
            return ActionStatus::NotInRange;
        }
        if energy == 0 {
            return ActionStatus::NotEnoughResources;
        }
        let remaining = site.progress_total.saturating_sub(site.progress);
        let spent = work
            .saturating_mul(BUILD_PER_WORK)
            .min(energy)
            .min(remaining);
        site.progress = site.progress.saturating_add(spent);
        if site.progress >= site.progress_total {
            let done = site.clone();
            room.sites.retain(|s| s.id != done.id);
            room.structures
                .push(build_structure(done.id, done.kind, done.pos, true));
            debug!(kind = ?done.kind, pos = %done.pos, "construction finished");
        }
        if let Some(store) = self.worker_store_mut(&worker.id) {
            store.remove(Resource::Energy, spent);
        }
        ActionStatus::Ok
    }

    fn act_repair(&mut self, worker: &WorkerSnapshot, target: &ObjectId) -> ActionStatus {
        let work = parts(worker, BodyPart::Work);
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let energy = worker.store.energy();
        let spent = {
            let Some(structure) = self.structure_mut(target) else {
                return ActionStatus::InvalidTarget;
            };
            if !worker.pos.in_range_to(&structure.pos, WORK_RANGE) {
                return ActionStatus::NotInRange;
            }
            if energy == 0 {
                return ActionStatus::NotEnoughResources;
            }
            let missing = structure.hits_max.saturating_sub(structure.hits);
            let needed = missing.div_ceil(REPAIR_HITS_PER_ENERGY);
            let spent = work.min(energy).min(needed);
            structure.hits = structure
                .hits
                .saturating_add(spent.saturating_mul(REPAIR_HITS_PER_ENERGY))
                .min(structure.hits_max);
            spent
        };
        if let Some(store) = self.worker_store_mut(&worker.id) {
            store.remove(Resource::Energy, spent);
        }
        ActionStatus::Ok
    }

    fn act_upgrade(&mut self, worker: &WorkerSnapshot, controller: &ObjectId) -> ActionStatus {
        let work = parts(worker, BodyPart::Work);
        if work == 0 {
            return ActionStatus::NoBodyPart;
        }
        let energy = worker.store.energy();
        let spent = {
            let Some(room) = self
                .rooms
                .values_mut()
                .find(|r| r.controller.as_ref().is_some_and(|c| &c.id == controller))
            else {
                return ActionStatus::InvalidTarget;
            };
            let Some(ctrl) = room.controller.as_mut() else {
                return ActionStatus::InvalidTarget;
            };
            if !worker.pos.in_range_to(&ctrl.pos, WORK_RANGE) {
                return ActionStatus::NotInRange;
            }
            if !ctrl.my {
                return ActionStatus::NotOwner;
            }
            if energy == 0 {
                return ActionStatus::NotEnoughResources;
            }
            let spent = work.min(energy);
            room.controller_progress = room.controller_progress.saturating_add(spent);
            let needed = CONTROLLER_PROGRESS_PER_LEVEL.saturating_mul(u32::from(ctrl.level));
            if ctrl.level < MAX_CONTROLLER_LEVEL && room.controller_progress >= needed {
                ctrl.level = ctrl.level.saturating_add(1);
                room.controller_progress = 0;
            }
            spent
        };
        if let Some(store) = self.worker_store_mut(&worker.id) {
            store.remove(Resource::Energy, spent);
        }
        ActionStatus::Ok
    }

    fn act_attack(&mut self, worker: &WorkerSnapshot, target: &ObjectId) -> ActionStatus {
        let attack = parts(worker, BodyPart::Attack);
        if attack == 0 {
            return ActionStatus::NoBodyPart;
        }
        let Some(room) = self
            .rooms
            .values_mut()
            .find(|r| r.hostiles.iter().any(|h| &h.snapshot.id == target))
        else {
            return ActionStatus::InvalidTarget;
        };
        let Some(hostile) = room.hostiles.iter_mut().find(|h| &h.snapshot.id == target) else {
            return ActionStatus::InvalidTarget;
        };
        if !worker.pos.in_range_to(&hostile.snapshot.pos, ADJACENT) {
            return ActionStatus::NotInRange;
        }
        hostile.hits = hostile
            .hits
            .saturating_sub(attack.saturating_mul(ATTACK_PER_PART));
        room.hostiles.retain(|h| h.hits > 0);
        ActionStatus::Ok
    }

    fn act_claim(&mut self, worker: &WorkerSnapshot, controller: &ObjectId) -> ActionStatus {
        if parts(worker, BodyPart::Claim) == 0 {
            return ActionStatus::NoBodyPart;
        }
        let owned = self
            .rooms
            .values()
            .filter(|r| r.controller.as_ref().is_some_and(|c| c.my))
            .count();
        let allowed = usize::from(self.gcl_level);
        let Some(ctrl) = self
            .rooms
            .values_mut()
            .filter_map(|r| r.controller.as_mut())
            .find(|c| &c.id == controller)
        else {
            return ActionStatus::InvalidTarget;
        };
        if !worker.pos.in_range_to(&ctrl.pos, ADJACENT) {
            return ActionStatus::NotInRange;
        }
        if ctrl.my {
            return ActionStatus::InvalidTarget;
        }
        if ctrl.owner.is_some() {
            return ActionStatus::NotOwner;
        }
        if owned >= allowed {
            return ActionStatus::InvalidArgs;
        }
        ctrl.my = true;
        ctrl.owner = Some(PLAYER.to_owned());
        ctrl.level = 1;
        ActionStatus::Ok
    }
}

const fn kind_prefix(kind: StructureKind) -> &'static str {
    match kind {
        StructureKind::Spawn => "spawn",
        StructureKind::Extension => "extension",
        StructureKind::Road => "road",
        StructureKind::Container => "container",
        StructureKind::Storage => "storage",
        StructureKind::Tower => "tower",
        StructureKind::Extractor => "extractor",
        StructureKind::Terminal => "terminal",
        StructureKind::Wall => "wall",
        StructureKind::Rampart => "rampart",
        StructureKind::Controller => "controller",
        StructureKind::PowerBank => "power-bank",
    }
}

fn build_structure(
    id: ObjectId,
    kind: StructureKind,
    pos: Position,
    my: bool,
) -> StructureSnapshot {
    let (hits_max, capacity) = structure_defaults(kind);
    let store = capacity.map(|cap| {
        let mut store = Store::with_capacity(cap);
        if matches!(kind, StructureKind::Spawn | StructureKind::Extension) {
            store.add(Resource::Energy, cap);
        }
        store
    });
    StructureSnapshot {
        id,
        kind,
        pos,
        hits: hits_max,
        hits_max,
        store,
        my,
        spawning: false,
        ticks_to_decay: (kind == StructureKind::PowerBank).then_some(POWER_BANK_DECAY),
    }
}

fn new_worker_snapshot(
    id: WorkerId,
    pos: Position,
    body: Vec<BodyPart>,
    memory: Option<WorkerMemory>,
    spawning: bool,
) -> WorkerSnapshot {
    let carry = u32::try_from(body.iter().filter(|p| **p == BodyPart::Carry).count())
        .unwrap_or(u32::MAX);
    let lifetime = if body.contains(&BodyPart::Claim) {
        CLAIM_WORKER_LIFETIME
    } else {
        WORKER_LIFETIME
    };
    WorkerSnapshot {
        id,
        pos,
        body,
        store: Store::with_capacity(carry.saturating_mul(CARRY_PER_PART)),
        ticks_to_live: lifetime,
        spawning,
        memory,
    }
}

fn room_energy_of(room: &SimRoom) -> RoomEnergy {
    room.structures
        .iter()
        .filter(|s| s.my && matches!(s.kind, StructureKind::Spawn | StructureKind::Extension))
        .filter_map(|s| s.store.as_ref())
        .fold(RoomEnergy::default(), |acc, store| RoomEnergy {
            available: acc.available.saturating_add(store.energy()),
            capacity: acc.capacity.saturating_add(store.capacity),
        })
}

// ---------------------------------------------------------------------------
// World implementation
// ---------------------------------------------------------------------------

impl World for SimWorld {
    fn time(&self) -> u64 {
        self.time
    }

    fn gcl_level(&self) -> u8 {
        self.gcl_level
    }

    fn rooms(&self) -> Vec<RoomName> {
        self.rooms
            .keys()
            .copied()
            .filter(|r| self.is_visible(*r))
            .collect()
    }

    fn exits(&self, room: RoomName) -> Vec<RoomName> {
        room.neighbours()
            .into_iter()
            .filter(|r| self.rooms.contains_key(r))
            .collect()
    }

    fn controller(&self, room: RoomName) -> Option<ControllerSnapshot> {
        self.visible_room(room)?.controller.clone()
    }

    fn room_energy(&self, room: RoomName) -> Option<RoomEnergy> {
        self.visible_room(room).map(room_energy_of)
    }

    fn sources(&self, room: RoomName) -> Vec<SourceSnapshot> {
        self.visible_room(room)
            .map(|r| r.sources.clone())
            .unwrap_or_default()
    }

    fn minerals(&self, room: RoomName) -> Vec<MineralSnapshot> {
        self.visible_room(room)
            .map(|r| r.minerals.clone())
            .unwrap_or_default()
    }

    fn structures(&self, room: RoomName) -> Vec<StructureSnapshot> {
        self.visible_room(room)
            .map(|r| r.structures.clone())
            .unwrap_or_default()
    }

    fn sites(&self, room: RoomName) -> Vec<SiteSnapshot> {
        self.visible_room(room)
            .map(|r| r.sites.clone())
            .unwrap_or_default()
    }

    fn hostiles(&self, room: RoomName) -> Vec<HostileSnapshot> {
        self.visible_room(room)
            .map(|r| r.hostiles.iter().map(|h| h.snapshot.clone()).collect())
            .unwrap_or_default()
    }

    fn tombstones(&self, room: RoomName) -> Vec<TombstoneSnapshot> {
        self.visible_room(room)
            .map(|r| r.tombstones.clone())
            .unwrap_or_default()
    }

    fn workers(&self) -> Vec<WorkerSnapshot> {
        self.workers.values().map(|w| w.snapshot.clone()).collect()
    }

    fn is_wall(&self, pos: &Position) -> bool {
        self.rooms
            .get(&pos.room)
            .is_none_or(|r| r.walls.contains(&(pos.x, pos.y)))
    }

    fn search_path(
        &self,
        origin: Position,
        goals: &[PathGoal],
        room_costs: &RoomCosts<'_>,
    ) -> Option<Vec<Position>> {
        if goals.is_empty() {
            return None;
        }
        let reached = |p: &Position| goals.iter().any(|g| p.in_range_to(&g.pos, g.range));
        if reached(&origin) {
            return Some(Vec::new());
        }

        let start = origin.global();
        let mut matrices: BTreeMap<RoomName, Option<CostMatrix>> = BTreeMap::new();
        // Best known distance per global tile.
        let mut dist: BTreeMap<(i32, i32), u32> = BTreeMap::new();
        // Predecessor map for path reconstruction.
        let mut prev: BTreeMap<(i32, i32), (i32, i32)> = BTreeMap::new();
        // Ordered set as a priority queue.
        let mut queue: BTreeSet<(u32, i32, i32)> = BTreeSet::new();
        dist.insert(start, 0);
        queue.insert((0, start.0, start.1));

        let mut ops = 0_usize;
        let mut found = None;
        while let Some((current_dist, gx, gy)) = queue.pop_first() {
            ops = ops.saturating_add(1);
            if ops > MAX_SEARCH_OPS {
                break;
            }
            let here = Position::from_global(gx, gy);
            if reached(&here) {
                found = Some((gx, gy));
                break;
            }
            for next in here.neighbours() {
                let Some(cost) = self.step_cost(&next, room_costs, &mut matrices) else {
                    continue;
                };
                let Some(new_dist) = current_dist.checked_add(cost) else {
                    continue;
                };
                let key = next.global();
                let is_shorter = dist.get(&key).is_none_or(|&existing| new_dist < existing);
                if is_shorter {
                    if let Some(&old) = dist.get(&key) {
                        queue.remove(&(old, key.0, key.1));
                    }
                    dist.insert(key, new_dist);
                    prev.insert(key, (gx, gy));
                    queue.insert((new_dist, key.0, key.1));
                }
            }
        }

        let mut current = found?;
        let mut path = VecDeque::new();
        while current != start {
            path.push_front(Position::from_global(current.0, current.1));
            current = *prev.get(&current)?;
        }
        Some(path.into())
    }

    fn fabricate(&mut self, spawn: &ObjectId, body: &[BodyPart], name: &WorkerId) -> ActionStatus {
        if body.is_empty() || body.len() > MAX_BODY_PARTS {
            return ActionStatus::InvalidArgs;
        }
        if self.workers.contains_key(name) {
            return ActionStatus::NameExists;
        }
        let Some(point) = self.structure(spawn).cloned() else {
            return ActionStatus::InvalidTarget;
        };
        if point.kind != StructureKind::Spawn {
            return ActionStatus::InvalidTarget;
        }
        if !point.my {
            return ActionStatus::NotOwner;
        }
        if point.spawning {
            return ActionStatus::Busy;
        }
        let cost = body_cost(body);
        let Some(room) = self.rooms.get_mut(&point.pos.room) else {
            return ActionStatus::InvalidTarget;
        };
        if room_energy_of(room).available < cost {
            return ActionStatus::NotEnoughResources;
        }

        let mut due = cost;
        for kind in [StructureKind::Spawn, StructureKind::Extension] {
            for s in room.structures.iter_mut().filter(|s| s.kind == kind && s.my) {
                if let Some(store) = s.store.as_mut() {
                    let paid = store.remove(Resource::Energy, due);
                    due = due.saturating_sub(paid);
                }
            }
        }
        if let Some(s) = room.structures.iter_mut().find(|s| &s.id == spawn) {
            s.spawning = true;
        }

        let snapshot = new_worker_snapshot(name.clone(), point.pos, body.to_vec(), None, true);
        let len = u32::try_from(body.len()).unwrap_or(u32::MAX);
        self.workers.insert(
            name.clone(),
            SimWorker {
                snapshot,
                spawn_remaining: len.saturating_mul(SPAWN_TICKS_PER_PART),
                spawned_by: Some(spawn.clone()),
            },
        );
        debug!(worker = %name, spawn = %spawn, cost, "fabrication started");
        ActionStatus::Ok
    }

    fn act(&mut self, worker: &WorkerId, action: &WorkerAction) -> ActionStatus {
        let Some(snapshot) = self.workers.get(worker).map(|w| w.snapshot.clone()) else {
            return ActionStatus::InvalidTarget;
        };
        if snapshot.spawning {
            return ActionStatus::Busy;
        }
        match action {
            WorkerAction::MoveTo { target, range } => self.act_move(&snapshot, *target, *range),
            WorkerAction::Harvest { target } => self.act_harvest(&snapshot, target),
            WorkerAction::Transfer { target, resource } => {
                self.act_transfer(&snapshot, target, *resource)
            }
            WorkerAction::Withdraw { target, resource } => {
                self.act_withdraw(&snapshot, target, *resource)
            }
            WorkerAction::Build { site } => self.act_build(&snapshot, site),
            WorkerAction::Repair { target } => self.act_repair(&snapshot, target),
            WorkerAction::UpgradeController { controller } => {
                self.act_upgrade(&snapshot, controller)
            }
            WorkerAction::Attack { target } => self.act_attack(&snapshot, target),
            WorkerAction::ClaimController { controller } => self.act_claim(&snapshot, controller),
            WorkerAction::Suicide => {
                self.remove_worker(worker);
                ActionStatus::Ok
            }
        }
    }

    fn tower_act(&mut self, tower: &ObjectId, action: &TowerAction) -> ActionStatus {
        let Some(t) = self.structure(tower).cloned() else {
            return ActionStatus::InvalidTarget;
        };
        if t.kind != StructureKind::Tower || !t.my {
            return ActionStatus::InvalidTarget;
        }
        if t.energy() < TOWER_ENERGY_PER_ACTION {
            return ActionStatus::NotEnoughResources;
        }
        let Some(room) = self.rooms.get_mut(&t.pos.room) else {
            return ActionStatus::InvalidTarget;
        };
        match action {
            TowerAction::Attack { target } => {
                let Some(hostile) = room.hostiles.iter_mut().find(|h| &h.snapshot.id == target)
                else {
                    return ActionStatus::InvalidTarget;
                };
                hostile.hits = hostile.hits.saturating_sub(TOWER_ATTACK_DAMAGE);
                room.hostiles.retain(|h| h.hits > 0);
            }
            TowerAction::Repair { target } => {
                let Some(s) = room.structures.iter_mut().find(|s| &s.id == target) else {
                    return ActionStatus::InvalidTarget;
                };
                s.hits = s.hits.saturating_add(TOWER_REPAIR_HITS).min(s.hits_max);
            }
        }
        if let Some(store) = self.structure_mut(tower).and_then(|s| s.store.as_mut()) {
            store.remove(Resource::Energy, TOWER_ENERGY_PER_ACTION);
        }
        ActionStatus::Ok
    }

    fn create_site(&mut self, pos: Position, kind: StructureKind) -> ActionStatus {
        let Some(room) = self.rooms.get(&pos.room) else {
            return ActionStatus::InvalidTarget;
        };
        if room.walls.contains(&(pos.x, pos.y)) {
            return ActionStatus::InvalidTarget;
        }
        let road_here = room
            .structures
            .iter()
            .any(|s| s.pos == pos && s.kind == StructureKind::Road);
        if room.is_occupied(&pos) || (kind == StructureKind::Road && road_here) {
            return ActionStatus::InvalidTarget;
        }
        self.add_site(kind, pos);
        ActionStatus::Ok
    }

    fn set_worker_memory(
        &mut self,
        worker: &WorkerId,
        memory: WorkerMemory,
    ) -> Result<(), WorldError> {
        let w = self
            .workers
            .get_mut(worker)
            .ok_or_else(|| WorldError::UnknownWorker {
                worker: worker.clone(),
            })?;
        w.snapshot.memory = Some(memory);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn room() -> RoomName {
        "W1N1".parse().unwrap()
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y, room()).unwrap()
    }

    fn make_colony() -> (SimWorld, ObjectId, ObjectId) {
        let mut world = SimWorld::new();
        world.add_room(room());
        world.add_controller(pos(40, 40), 1, Some(PLAYER));
        let spawn = world.add_structure(StructureKind::Spawn, pos(25, 25));
        let source = world.add_source(pos(10, 10), 3_000);
        (world, spawn, source)
    }

    #[test]
    fn fabrication_pays_energy_and_blocks_spawn() {
        let (mut world, spawn, _) = make_colony();
        let name = WorkerId::from("h1");
        let body = [BodyPart::Work, BodyPart::Carry, BodyPart::Move];
        assert_eq!(world.fabricate(&spawn, &body, &name), ActionStatus::Ok);
        assert_eq!(world.room_energy(room()).unwrap().available, 100);
        assert_eq!(
            world.fabricate(&spawn, &body, &WorkerId::from("h2")),
            ActionStatus::Busy
        );
        let worker = world.worker(&name).unwrap();
        assert!(worker.spawning);
        assert_eq!(worker.store.capacity, 50);

        for _ in 0..9 {
            world.advance();
        }
        assert!(!world.worker(&name).unwrap().spawning);
        assert!(!world.structure(&spawn).unwrap().spawning);
    }

    #[test]
    fn fabrication_rejects_expensive_bodies() {
        let (mut world, spawn, _) = make_colony();
        let body = [BodyPart::Claim];
        assert_eq!(
            world.fabricate(&spawn, &body, &WorkerId::from("c")),
            ActionStatus::NotEnoughResources
        );
    }

    #[test]
    fn harvest_requires_adjacency_then_fills_cargo() {
        let (mut world, _, source) = make_colony();
        let id = world.add_worker(
            "h",
            pos(12, 12),
            vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move],
            None,
        );
        let harvest = WorkerAction::Harvest {
            target: source.clone(),
        };
        assert_eq!(world.act(&id, &harvest), ActionStatus::NotInRange);
        let step = WorkerAction::MoveTo {
            target: pos(10, 10),
            range: 1,
        };
        assert_eq!(world.act(&id, &step), ActionStatus::Ok);
        assert_eq!(world.worker(&id).unwrap().pos, pos(11, 11));
        assert_eq!(world.act(&id, &harvest), ActionStatus::Ok);
        assert_eq!(world.worker(&id).unwrap().store.energy(), 2);
        assert_eq!(world.sources(room()).first().unwrap().energy, 2_998);
    }

    #[test]
    fn harvest_overflow_drops_into_container() {
        let (mut world, _, source) = make_colony();
        let container = world.add_structure(StructureKind::Container, pos(11, 11));
        let id = world.add_worker(
            "h",
            pos(11, 11),
            vec![BodyPart::Work, BodyPart::Work, BodyPart::Move],
            None,
        );
        let harvest = WorkerAction::Harvest { target: source };
        assert_eq!(world.act(&id, &harvest), ActionStatus::Ok);
        assert_eq!(world.structure(&container).unwrap().energy(), 4);
    }

    #[test]
    fn harvest_in_foreign_room_is_not_owner() {
        let mut world = SimWorld::new();
        let remote: RoomName = "W2N1".parse().unwrap();
        world.add_room(remote);
        world.add_controller(Position::new(40, 40, remote).unwrap(), 3, Some("rival"));
        let source = world.add_source(Position::new(10, 10, remote).unwrap(), 3_000);
        let id = world.add_worker(
            "r",
            Position::new(11, 10, remote).unwrap(),
            vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move],
            None,
        );
        assert_eq!(
            world.act(&id, &WorkerAction::Harvest { target: source }),
            ActionStatus::NotOwner
        );
    }

    #[test]
    fn build_completes_site_into_structure() {
        let (mut world, _, _) = make_colony();
        let site = world.add_site(StructureKind::Road, pos(20, 20));
        let id = world.add_worker(
            "b",
            pos(21, 21),
            vec![BodyPart::Work, BodyPart::Carry, BodyPart::Carry, BodyPart::Move],
            None,
        );
        let build = WorkerAction::Build { site };
        for _ in 0..60 {
            world.set_carried(&id, Resource::Energy, 100);
            assert_eq!(world.act(&id, &build), ActionStatus::Ok);
        }
        assert!(world.sites(room()).is_empty());
        assert!(
            world
                .structures(room())
                .iter()
                .any(|s| s.kind == StructureKind::Road && s.pos == pos(20, 20))
        );
    }

    #[test]
    fn workers_expire_into_tombstones() {
        let (mut world, _, _) = make_colony();
        let id = world.add_worker("old", pos(30, 30), vec![BodyPart::Carry, BodyPart::Move], None);
        world.set_carried(&id, Resource::Energy, 20);
        world.set_ticks_to_live(&id, 1);
        world.advance();
        assert!(world.worker(&id).is_none());
        assert_eq!(world.tombstones(room()).len(), 1);
    }

    #[test]
    fn sources_regenerate_on_schedule() {
        let (mut world, _, source) = make_colony();
        let id = world.add_worker("h", pos(11, 11), vec![BodyPart::Work, BodyPart::Move], None);
        let _ = world.act(&id, &WorkerAction::Harvest { target: source });
        world.set_time(SOURCE_REGEN_TICKS - 1);
        world.advance();
        assert_eq!(world.sources(room()).first().unwrap().energy, 3_000);
    }

    #[test]
    fn hidden_rooms_are_visible_only_with_presence() {
        let mut world = SimWorld::new();
        let hidden: RoomName = "W2N1".parse().unwrap();
        world.add_hidden_room(hidden);
        world.add_source(Position::new(5, 5, hidden).unwrap(), 1_500);
        assert!(world.sources(hidden).is_empty());
        world.add_worker(
            "scout",
            Position::center_of(hidden),
            vec![BodyPart::Move],
            None,
        );
        assert_eq!(world.sources(hidden).len(), 1);
    }

    #[test]
    fn path_search_crosses_room_borders() {
        let mut world = SimWorld::new();
        world.add_room(room());
        let east: RoomName = "W0N1".parse().unwrap();
        world.add_room(east);
        let goal = Position::new(2, 10, east).unwrap();
        let costs = |_: RoomName| Some(CostMatrix::new());
        let path = world
            .search_path(pos(47, 10), &[PathGoal::new(goal, 0)], &costs)
            .unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn path_search_respects_excluded_rooms() {
        let mut world = SimWorld::new();
        world.add_room(room());
        let east: RoomName = "W0N1".parse().unwrap();
        world.add_room(east);
        let goal = Position::new(2, 10, east).unwrap();
        let home = room();
        let costs = move |r: RoomName| (r == home).then(CostMatrix::new);
        assert!(
            world
                .search_path(pos(47, 10), &[PathGoal::new(goal, 0)], &costs)
                .is_none()
        );
    }

    #[test]
    fn tower_spends_energy_per_shot() {
        let (mut world, _, _) = make_colony();
        let tower = world.add_structure(StructureKind::Tower, pos(24, 20));
        world.set_stored(&tower, Resource::Energy, 500);
        let hostile = world.add_hostile(pos(30, 30), "rival", vec![BodyPart::Attack; 3]);
        let shot = TowerAction::Attack { target: hostile };
        assert_eq!(world.tower_act(&tower, &shot), ActionStatus::Ok);
        assert!(world.hostiles(room()).is_empty());
        assert_eq!(world.structure(&tower).unwrap().energy(), 490);
    }

    #[test]
    fn create_site_rejects_occupied_tiles() {
        let (mut world, _, _) = make_colony();
        assert_eq!(
            world.create_site(pos(25, 25), StructureKind::Tower),
            ActionStatus::InvalidTarget
        );
        assert_eq!(
            world.create_site(pos(26, 25), StructureKind::Tower),
            ActionStatus::Ok
        );
        assert_eq!(world.sites(room()).len(), 1);
    }

    #[test]
    fn claiming_respects_global_control_level() {
        let (mut world, _, _) = make_colony();
        let target: RoomName = "W2N1".parse().unwrap();
        let ctrl = world.add_controller(Position::new(20, 20, target).unwrap(), 0, None);
        let id = world.add_worker(
            "claimer",
            Position::new(21, 20, target).unwrap(),
            vec![BodyPart::Claim, BodyPart::Move],
            None,
        );
        let claim = WorkerAction::ClaimController { controller: ctrl };
        assert_eq!(world.act(&id, &claim), ActionStatus::InvalidArgs);
        world.set_gcl(2);
        assert_eq!(world.act(&id, &claim), ActionStatus::Ok);
        assert!(world.controller(target).unwrap().my);
    }
}
