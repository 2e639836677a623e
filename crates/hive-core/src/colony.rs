//! Per-colony glue: observe, plan, run the machines, place sites.

use std::collections::BTreeSet;

use hive_agents::lookup::{
    controller_container, mineral_tombstones, my_spawns, source_containers, storage,
    structures_of,
};
use hive_agents::{
    Builders, ChargeController, ClaimRoom, Defenders, Deposit, EnergyLogistics,
    HarvestSource, MineralLogistics, Repairers, StateMachine, TaskContext, TaskError,
    TowerDefense, workers_with_role,
};
use hive_bank::BankRegistry;
use hive_population::JobQueue;
use hive_types::{ColonyMemory, ObjectId, Position, ROOM_SIZE, Role, RoomName, StructureKind};
use hive_world::{World, closest_by_range};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ColonyConfig, HiveConfig};
use crate::error::ColonyError;
use crate::planner::SitePlanner;
use crate::strategist::{ColonyObservation, DesiredState, next_strategy};

/// Outcome of one colony tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColonyReport {
    /// The colony room.
    pub room: RoomName,
    /// What the planner asked for.
    pub desired: DesiredState,
    /// Harvest machines owned by the colony.
    pub harvest_machines: usize,
    /// Towers that acted.
    pub towers_acted: usize,
}

/// Whether `now` falls on a cadence of `every` ticks.
const fn due(now: u64, every: u64) -> bool {
    match now.checked_rem(every) {
        Some(rest) => rest == 0,
        None => false,
    }
}

/// Controller of one colony.
///
/// Owns the colony's task machines, remembers when the current attack
/// started and which logistic target the last rebalance chose.
#[derive(Debug, Clone)]
pub struct ColonyController {
    room: RoomName,
    harvests: Vec<HarvestSource>,
    charger: ChargeController,
    logistics: EnergyLogistics,
    minerals: MineralLogistics,
    builders: Builders,
    repairers: Repairers,
    defenders: Defenders,
    towers: TowerDefense,
    planner: SitePlanner,
    claim: Option<ClaimRoom>,
    attack_start: Option<u64>,
    logistic_target: Option<usize>,
}

impl ColonyController {
    /// Controller for `room`.
    pub const fn new(room: RoomName) -> Self {
        Self {
            room,
            harvests: Vec::new(),
            charger: ChargeController::new(room),
            logistics: EnergyLogistics::new(room),
            minerals: MineralLogistics::new(room),
            builders: Builders::new(room),
            repairers: Repairers::new(room),
            defenders: Defenders::new(room),
            towers: TowerDefense::new(room),
            planner: SitePlanner::new(room),
            claim: None,
            attack_start: None,
            logistic_target: None,
        }
    }

    /// The colony room.
    pub const fn room(&self) -> RoomName {
        self.room
    }

    /// Harvest machines allocated so far.
    pub fn harvests(&self) -> &[HarvestSource] {
        &self.harvests
    }

    /// Tick the current attack started, if one is going on.
    pub const fn attack_start(&self) -> Option<u64> {
        self.attack_start
    }

    /// Run one tick. Returns `None` when the room has no spawn yet.
    pub fn tick<W>(
        &mut self,
        world: &mut W,
        queue: &mut JobQueue,
        banks: &mut BankRegistry,
        memory: &mut ColonyMemory,
        config: &HiveConfig,
    ) -> Result<Option<ColonyReport>, ColonyError>
    where
        W: World + ?Sized,
    {
        if my_spawns(&*world, self.room).is_empty() {
            debug!(room = %self.room, "no spawn, colony skipped");
            return Ok(None);
        }
        let level = world
            .controller(self.room)
            .ok_or(ColonyError::MissingController { room: self.room })?
            .level;

        let (available, capacity) = world
            .room_energy(self.room)
            .map_or((0, 0), |e| (e.available, e.capacity));
        banks
            .bank_mut(self.room)
            .record_sample(available, capacity)?;

        let observation = self.observe(&*world, &config.colony)?;
        let desired = next_strategy(&observation, &config.strategy);
        if let Some(target) = desired.logistic_target {
            self.logistic_target = Some(target);
        }
        debug!(room = %self.room, gate = desired.gate, ?desired, "strategy");

        self.allocate_harvests(&*world, &desired)?;

        let mut ctx = TaskContext::new(world, queue, memory, &config.agents);
        self.run_machines(&mut ctx, &desired, &config.colony)?;
        let towers_acted = self.towers.activate(&mut *ctx.world, ctx.config);
        for harvest in &mut self.harvests {
            harvest.run(&mut ctx)?;
        }

        self.place_sites(&mut *ctx.world, &desired, &config.colony, level);

        if desired.claim_expansion
            && let Some(target) = config.expansion.claim_target
            && self.is_closest_to(&*ctx.world, target)
        {
            let claim = self.claim.get_or_insert_with(|| {
                let pos = ctx
                    .world
                    .controller(target)
                    .map_or_else(|| Position::center_of(target), |c| c.pos);
                info!(colony = %self.room, %target, "expansion claim started");
                ClaimRoom::new(self.room, pos)
            });
            claim.run(&mut ctx)?;
        }

        Ok(Some(ColonyReport {
            room: self.room,
            desired,
            harvest_machines: self.harvests.len(),
            towers_acted,
        }))
    }

    /// Collect what the planner needs. Tracks the attack start as a side
    /// effect.
    pub fn observe<W>(
        &mut self,
        world: &W,
        config: &ColonyConfig,
    ) -> Result<ColonyObservation, ColonyError>
    where
        W: World + ?Sized,
    {
        let now = world.time();
        let controller = world
            .controller(self.room)
            .ok_or(ColonyError::MissingController { room: self.room })?;

        let attacked = self.is_attacked(world, config.attack_margin);
        self.attack_start = if attacked {
            Some(self.attack_start.unwrap_or(now))
        } else {
            None
        };

        let sources = world.sources(self.room);
        let harvested: BTreeSet<&ObjectId> = self
            .harvests
            .iter()
            .filter(|h| h.deposit() == Deposit::Source)
            .map(HarvestSource::target)
            .collect();
        let source_ids: BTreeSet<String> =
            sources.iter().map(|s| s.id.as_str().to_owned()).collect();
        let harvesters_present = workers_with_role(world, Role::Harvester)
            .iter()
            .filter_map(|w| w.memory.as_ref())
            .filter(|m| m.tag.colony == self.room)
            .filter(|m| m.tag.target.as_ref().is_some_and(|t| source_ids.contains(t)))
            .count();
        let advanced_sites_pending = world.sites(self.room).iter().any(|s| {
            matches!(
                s.kind,
                StructureKind::Storage | StructureKind::Tower | StructureKind::Extractor
            )
        });
        let energy_in_transit = source_containers(world, self.room)
            .iter()
            .fold(0_u32, |sum, c| sum.saturating_add(c.energy()));
        let controlled_rooms = world
            .rooms()
            .into_iter()
            .filter(|room| world.controller(*room).is_some_and(|c| c.my))
            .count();

        Ok(ColonyObservation {
            tick: now,
            attacked,
            attack_duration: self.attack_start.map(|start| now.saturating_sub(start)),
            has_tower: !structures_of(world, self.room, StructureKind::Tower).is_empty(),
            storage_has_energy: storage(world, self.room).is_some_and(|s| s.energy() > 0),
            first_source_harvested: self.harvests.iter().any(|h| {
                h.deposit() == Deposit::Source && h.container(world).is_some()
            }),
            logistics_present: self.logistics.workers(world).len(),
            harvesters_present,
            controller_container: controller_container(world, self.room).is_some(),
            sources: sources.len(),
            free_sources: sources
                .iter()
                .filter(|s| !harvested.contains(&s.id))
                .count(),
            harvested_sources: harvested.len(),
            controlled_rooms,
            gcl_level: world.gcl_level(),
            controller_level: controller.level,
            advanced_sites_pending,
            energy_in_transit,
            last_logistic_target: self.logistic_target,
        })
    }

    /// Whether a hostile stands inside the colony, away from the exits.
    fn is_attacked<W>(&self, world: &W, margin: u8) -> bool
    where
        W: World + ?Sized,
    {
        let far = ROOM_SIZE.saturating_sub(1).saturating_sub(margin);
        world
            .hostiles(self.room)
            .iter()
            .any(|h| h.pos.x > margin && h.pos.x < far && h.pos.y > margin && h.pos.y < far)
    }

    /// Add source machines up to the wanted harvester count, and mineral
    /// machines once the extractor is wanted.
    fn allocate_harvests<W>(&mut self, world: &W, desired: &DesiredState) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let anchor = my_spawns(world, self.room)
            .first()
            .map_or_else(|| Position::center_of(self.room), |s| s.pos);
        loop {
            let allocated = self
                .harvests
                .iter()
                .filter(|h| h.deposit() == Deposit::Source)
                .count();
            if allocated >= desired.harvesters {
                break;
            }
            let free: Vec<_> = world
                .sources(self.room)
                .into_iter()
                .filter(|s| !self.harvests.iter().any(|h| h.target() == &s.id))
                .collect();
            let Some(source) = closest_by_range(&anchor, &free, |s| s.pos) else {
                return Err(TaskError::NoSourceForHarvester {
                    colony: self.room,
                    pos: anchor,
                });
            };
            info!(colony = %self.room, source = %source.id, "harvest machine added");
            self.harvests
                .push(HarvestSource::for_source(self.room, source));
        }

        if desired.ensure_extractor {
            for mineral in world.minerals(self.room) {
                if !self.harvests.iter().any(|h| h.target() == &mineral.id) {
                    info!(colony = %self.room, mineral = %mineral.id, "mineral machine added");
                    self.harvests
                        .push(HarvestSource::for_mineral(self.room, &mineral));
                }
            }
        }
        Ok(())
    }

    fn run_machines<W>(
        &mut self,
        ctx: &mut TaskContext<'_, W>,
        desired: &DesiredState,
        config: &ColonyConfig,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        self.repairers.run(ctx, desired.repairers)?;
        self.builders.run(ctx, desired.builders)?;
        self.charger.set_wanted(desired.chargers);
        self.charger.run(ctx)?;
        self.logistics.run(ctx, desired.logistics)?;

        let tombstone_haul = storage(&*ctx.world, self.room).is_some()
            && !mineral_tombstones(&*ctx.world, self.room).is_empty();
        let mineral_haulers = if tombstone_haul {
            config.tombstone_logistics
        } else {
            0
        };
        self.minerals
            .run(ctx, mineral_haulers.max(desired.mineral_logistics))?;

        self.defenders.run(ctx, desired.defenders)?;
        Ok(())
    }

    fn place_sites<W>(
        &self,
        world: &mut W,
        desired: &DesiredState,
        config: &ColonyConfig,
        level: u8,
    ) where
        W: World + ?Sized,
    {
        let now = world.time();
        if desired.ensure_controller_container {
            self.planner.controller_container(world);
        }
        if desired.ensure_extractor {
            self.planner.extractors(world);
        }
        if desired.ensure_roads && due(now, config.roads_every) {
            self.planner.roads(world);
        }
        if desired.ensure_tower && due(now, config.tower_every) {
            self.planner.tower(world);
        }
        if due(now, config.extensions_every) {
            let placed = self.planner.extensions(world);
            debug!(room = %self.room, level, placed, "extensions checked");
        }
        if desired.ensure_storage && due(now, config.storage_every) {
            self.planner.storage(world);
        }
        if desired.ensure_terminal && due(now, config.terminal_every) {
            self.planner.terminal(world);
        }
    }

    /// Whether this colony is the controlled room nearest to `target`.
    fn is_closest_to<W>(&self, world: &W, target: RoomName) -> bool
    where
        W: World + ?Sized,
    {
        world
            .rooms()
            .into_iter()
            .filter(|room| *room != target)
            .filter(|room| !my_spawns(world, *room).is_empty())
            .min_by_key(|room| room.linear_distance(target))
            == Some(self.room)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_bank::BankConfig;
    use hive_types::{BodyPart, JobType, Resource, Store};
    use hive_world::{PLAYER, SimWorld};

    use super::*;

    fn room() -> RoomName {
        "W1N1".parse().unwrap()
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y, room()).unwrap()
    }

    fn make_colony() -> SimWorld {
        let mut world = SimWorld::new();
        world.add_room(room());
        world.add_controller(pos(40, 40), 2, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25));
        world.add_source(pos(10, 10), 3_000);
        world.add_source(pos(5, 45), 3_000);
        world
    }

    struct Harness {
        queue: JobQueue,
        banks: BankRegistry,
        memory: ColonyMemory,
        config: HiveConfig,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                queue: JobQueue::new(),
                banks: BankRegistry::new(BankConfig::default()),
                memory: ColonyMemory::default(),
                config: HiveConfig::default(),
            }
        }

        fn tick(
            &mut self,
            colony: &mut ColonyController,
            world: &mut SimWorld,
        ) -> Result<Option<ColonyReport>, ColonyError> {
            self.queue.init();
            colony.tick(
                world,
                &mut self.queue,
                &mut self.banks,
                &mut self.memory,
                &self.config,
            )
        }
    }

    #[test]
    fn room_without_spawn_is_skipped() {
        let mut world = SimWorld::new();
        world.add_room(room());
        world.add_controller(pos(40, 40), 1, Some(PLAYER));
        let mut colony = ColonyController::new(room());
        let report = Harness::new().tick(&mut colony, &mut world).unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn missing_controller_fails_fast() {
        let mut world = SimWorld::new();
        world.add_room(room());
        world.add_structure(StructureKind::Spawn, pos(25, 25));
        let mut colony = ColonyController::new(room());
        let result = Harness::new().tick(&mut colony, &mut world);
        assert_eq!(result, Err(ColonyError::MissingController { room: room() }));
    }

    #[test]
    fn fresh_colony_allocates_closest_source_and_requests_a_harvester() {
        let mut world = make_colony();
        let mut colony = ColonyController::new(room());
        let mut harness = Harness::new();
        let report = harness.tick(&mut colony, &mut world).unwrap().unwrap();
        assert_eq!(report.desired.harvesters, 1);
        assert_eq!(report.harvest_machines, 1);
        assert_eq!(colony.harvests().first().unwrap().pos(), pos(10, 10));
        let jobs: Vec<JobType> = harness.queue.pending().iter().map(|r| r.job_type).collect();
        assert_eq!(jobs, vec![JobType::Harvester]);
        assert_eq!(harness.banks.bank(room()).unwrap().len(), 1);
    }

    #[test]
    fn no_source_is_an_invariant_violation() {
        let mut world = SimWorld::new();
        world.add_room(room());
        world.add_controller(pos(40, 40), 1, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25));
        let mut colony = ColonyController::new(room());
        let result = Harness::new().tick(&mut colony, &mut world);
        assert!(matches!(
            result,
            Err(ColonyError::Task(TaskError::NoSourceForHarvester { .. }))
        ));
    }

    #[test]
    fn attack_start_is_tracked_inside_the_margin() {
        let mut world = make_colony();
        let mut colony = ColonyController::new(room());
        let config = ColonyConfig::default();

        world.add_hostile(pos(1, 20), "raider", vec![BodyPart::Attack]);
        let obs = colony.observe(&world, &config).unwrap();
        assert!(!obs.attacked);
        assert_eq!(colony.attack_start(), None);

        world.add_hostile(pos(20, 20), "raider", vec![BodyPart::Attack]);
        world.set_time(100);
        let obs = colony.observe(&world, &config).unwrap();
        assert!(obs.attacked);
        assert_eq!(obs.attack_duration, Some(0));

        world.set_time(115);
        let obs = colony.observe(&world, &config).unwrap();
        assert_eq!(obs.attack_duration, Some(15));

        world.clear_hostiles(room());
        let obs = colony.observe(&world, &config).unwrap();
        assert!(!obs.attacked);
        assert_eq!(colony.attack_start(), None);
    }

    #[test]
    fn observation_counts_transit_and_storage() {
        let mut world = make_colony();
        let container = world.add_structure(StructureKind::Container, pos(11, 11));
        world.set_stored(&container, Resource::Energy, 450);
        let near_controller = world.add_structure(StructureKind::Container, pos(39, 40));
        world.set_stored(&near_controller, Resource::Energy, 900);
        let store = world.add_structure(StructureKind::Storage, pos(27, 27));
        world.set_stored(&store, Resource::Energy, 10);
        world.add_site(StructureKind::Tower, pos(30, 30));

        let mut colony = ColonyController::new(room());
        let obs = colony.observe(&world, &ColonyConfig::default()).unwrap();
        assert_eq!(obs.energy_in_transit, 450);
        assert!(obs.storage_has_energy);
        assert!(obs.controller_container);
        assert!(obs.advanced_sites_pending);
        assert_eq!(obs.sources, 2);
        assert_eq!(obs.free_sources, 2);
        assert_eq!(obs.controlled_rooms, 1);
    }

    #[test]
    fn mineral_tombstones_call_for_mineral_haulers() {
        let mut world = make_colony();
        world.add_structure(StructureKind::Storage, pos(27, 27));
        let mut store = Store::with_capacity(100);
        store.add(Resource::Keanium, 40);
        world.add_tombstone(pos(20, 20), store);
        let mut colony = ColonyController::new(room());
        let mut harness = Harness::new();
        harness.tick(&mut colony, &mut world).unwrap();
        assert!(
            harness
                .queue
                .pending()
                .iter()
                .any(|r| r.stamp.tag.role == Role::MineralLogistic)
        );
    }

    #[test]
    fn cadence_helper() {
        assert!(due(0, 20));
        assert!(due(40, 20));
        assert!(!due(41, 20));
        assert!(!due(5, 0));
    }
}
