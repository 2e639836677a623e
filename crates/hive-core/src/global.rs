//! Work that belongs to no single colony.
//!
//! Bootstrapping claimed rooms without a spawn, room intel, power bank
//! sightings and remote harvesting all run here once per tick, after every
//! colony ticked.

use std::collections::{BTreeMap, BTreeSet};

use hive_agents::lookup::my_spawns;
use hive_agents::{
    BootstrapRoom, BootstrapState, RemoteHarvest, StateMachine, TaskContext, TaskError, scan,
};
use hive_population::JobQueue;
use hive_types::{Position, RoomName};
use hive_world::World;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::HiveConfig;
use crate::memory::Memory;

/// A room holding a power bank worth harvesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PowerSighting {
    /// The room.
    pub room: RoomName,
    /// Ticks the bank has left.
    pub remaining: u64,
}

/// Outcome of one global tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalReport {
    /// Rooms with an active bootstrap machine.
    pub bootstrapping: Vec<RoomName>,
    /// Rooms the mappers are planned to visit.
    pub visit_plan: Vec<RoomName>,
    /// Active remote harvest machines.
    pub remote_machines: usize,
    /// Rooms with harvestable power.
    pub power: Vec<PowerSighting>,
    /// Machine failures that did not stop the global tick.
    pub failures: Vec<TaskError>,
}

/// Global controller.
#[derive(Debug, Clone, Default)]
pub struct GlobalController {
    bootstraps: BTreeMap<RoomName, BootstrapRoom>,
    remotes: Vec<RemoteHarvest>,
    abandoned: BTreeSet<Position>,
}

impl GlobalController {
    /// A controller with no machine yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote sources given up on.
    pub const fn abandoned(&self) -> &BTreeSet<Position> {
        &self.abandoned
    }

    /// Run one tick.
    ///
    /// Only intel failures abort the tick. Bootstrap and remote harvest
    /// failures are reported in [`GlobalReport::failures`].
    pub fn tick<W>(
        &mut self,
        world: &mut W,
        queue: &mut JobQueue,
        memory: &mut Memory,
        config: &HiveConfig,
    ) -> Result<GlobalReport, TaskError>
    where
        W: World + ?Sized,
    {
        let mut report = GlobalReport::default();
        let now = world.time();

        if now
            .checked_rem(config.colony.bootstrap_check_ticks)
            .is_some_and(|r| r == 0)
        {
            self.find_rooms_to_bootstrap(&*world);
        }
        self.run_bootstraps(world, queue, memory, config, &mut report);

        report.visit_plan = scan(world, queue, &mut memory.intel, &config.agents)?;
        for (room, state) in memory.intel.last_states() {
            let remaining = state.remaining_power(now);
            if remaining > 0 {
                info!(%room, remaining, "harvestable power spotted");
                report.power.push(PowerSighting { room, remaining });
            }
        }

        self.run_remotes(world, queue, memory, config, &mut report);
        Ok(report)
    }

    /// Start a bootstrap machine for every room we control that has no
    /// spawn.
    fn find_rooms_to_bootstrap<W>(&mut self, world: &W)
    where
        W: World + ?Sized,
    {
        for room in world.rooms() {
            let ours = world.controller(room).is_some_and(|c| c.my);
            if ours && my_spawns(world, room).is_empty() && !self.bootstraps.contains_key(&room) {
                info!(%room, "bootstrap started");
                self.bootstraps.insert(room, BootstrapRoom::new(room));
            }
        }
    }

    fn run_bootstraps<W>(
        &mut self,
        world: &mut W,
        queue: &mut JobQueue,
        memory: &mut Memory,
        config: &HiveConfig,
        report: &mut GlobalReport,
    ) where
        W: World + ?Sized,
    {
        self.bootstraps.retain(|room, _| {
            let ours = world.controller(*room).is_some_and(|c| c.my);
            if !ours {
                warn!(%room, "bootstrap dropped, room no longer ours");
            }
            ours
        });

        let mut finished = Vec::new();
        for (room, machine) in &mut self.bootstraps {
            let colony = memory.colony_mut(*room);
            let mut ctx = TaskContext::new(&mut *world, &mut *queue, colony, &config.agents);
            match machine.run(&mut ctx) {
                Ok(BootstrapState::Done) => finished.push(*room),
                Ok(state) => debug!(%room, ?state, "bootstrap running"),
                Err(err) => {
                    warn!(%room, error = %err, "bootstrap failed");
                    report.failures.push(err);
                }
            }
        }
        for room in finished {
            if let Some(machine) = self.bootstraps.remove(&room) {
                memory.colony_mut(room).clear_label(&machine.name());
                info!(%room, "bootstrap finished");
            }
        }
        report.bootstrapping = self.bootstraps.keys().copied().collect();
    }

    fn run_remotes<W>(
        &mut self,
        world: &mut W,
        queue: &mut JobQueue,
        memory: &mut Memory,
        config: &HiveConfig,
        report: &mut GlobalReport,
    ) where
        W: World + ?Sized,
    {
        for target in &config.expansion.remote_sources {
            if self.abandoned.contains(target) || self.remotes.iter().any(|r| r.target() == *target)
            {
                continue;
            }
            match RemoteHarvest::new(&*world, *target) {
                Ok(machine) => {
                    info!(%target, "remote harvest started");
                    self.remotes.push(machine);
                }
                Err(TaskError::NoStorage { .. }) => {
                    debug!(%target, "no storage for remote harvest yet");
                }
                Err(err) => report.failures.push(err),
            }
        }

        let mut kept = Vec::with_capacity(self.remotes.len());
        for mut machine in std::mem::take(&mut self.remotes) {
            let colony = memory.colony_mut(machine.tag().colony);
            let mut ctx = TaskContext::new(&mut *world, &mut *queue, colony, &config.agents);
            match machine.run(&mut ctx) {
                Ok(()) => kept.push(machine),
                Err(TaskError::CannotHarvest { target }) => {
                    warn!(%target, "remote source abandoned");
                    self.abandoned.insert(target);
                }
                Err(err) => {
                    warn!(machine = %machine.name(), error = %err, "remote harvest failed");
                    report.failures.push(err);
                    kept.push(machine);
                }
            }
        }
        self.remotes = kept;
        report.remote_machines = self.remotes.len();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{BodyPart, IntelState, JobType, StructureKind, WorkerMemory};
    use hive_world::{PLAYER, SimWorld};

    use super::*;

    fn room(name: &str) -> RoomName {
        name.parse().unwrap()
    }

    fn pos(x: u8, y: u8, name: &str) -> Position {
        Position::new(x, y, room(name)).unwrap()
    }

    fn run(
        global: &mut GlobalController,
        world: &mut SimWorld,
        memory: &mut Memory,
        config: &HiveConfig,
    ) -> (GlobalReport, JobQueue) {
        let mut queue = JobQueue::new();
        let report = global.tick(world, &mut queue, memory, config).unwrap();
        (report, queue)
    }

    #[test]
    fn claimed_room_without_spawn_is_bootstrapped() {
        let mut world = SimWorld::new();
        world.add_room(room("W1N1"));
        world.add_room(room("W2N1"));
        world.add_controller(pos(40, 40, "W1N1"), 3, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25, "W1N1"));
        world.add_controller(pos(10, 10, "W2N1"), 1, Some(PLAYER));
        world.add_source(pos(30, 30, "W2N1"), 1_500);

        let mut global = GlobalController::new();
        let mut memory = Memory::default();
        let config = HiveConfig::default();
        let (report, queue) = run(&mut global, &mut world, &mut memory, &config);

        assert_eq!(report.bootstrapping, vec![room("W2N1")]);
        assert_eq!(
            memory
                .terraformed_rooms
                .get(&room("W2N1"))
                .unwrap()
                .label("bootstrap.W2N1"),
            Some("place_spawn")
        );
        assert!(
            !queue
                .pending()
                .iter()
                .any(|r| r.job_type == JobType::Bootstrap)
        );
        assert!(world.sites(room("W2N1")).iter().any(|s| s.kind == StructureKind::Spawn));
    }

    #[test]
    fn finished_bootstrap_is_dropped() {
        let mut world = SimWorld::new();
        world.add_room(room("W1N1"));
        world.add_controller(pos(40, 40, "W1N1"), 3, Some(PLAYER));
        let mut global = GlobalController::new();
        let mut memory = Memory::default();
        let config = HiveConfig::default();
        run(&mut global, &mut world, &mut memory, &config);
        assert_eq!(global.bootstraps.len(), 1);

        world.add_structure(StructureKind::Spawn, pos(20, 20, "W1N1"));
        let (report, _) = run(&mut global, &mut world, &mut memory, &config);
        assert!(report.bootstrapping.is_empty());
        assert_eq!(
            memory
                .terraformed_rooms
                .get(&room("W1N1"))
                .unwrap()
                .label("bootstrap.W1N1"),
            None
        );
    }

    #[test]
    fn power_sightings_are_reported() {
        let mut world = SimWorld::new();
        world.add_room(room("W1N1"));
        world.add_controller(pos(40, 40, "W1N1"), 3, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25, "W1N1"));
        let mut memory = Memory::default();
        memory.intel.push_state(
            room("W3N3"),
            IntelState {
                timestamp: 0,
                is_hostile: false,
                power_ttl: 400,
                is_reachable: true,
            },
        );
        world.set_time(100);
        let mut global = GlobalController::new();
        let (report, _) = run(&mut global, &mut world, &mut memory, &HiveConfig::default());
        assert_eq!(
            report.power,
            vec![PowerSighting {
                room: room("W3N3"),
                remaining: 300,
            }]
        );
    }

    #[test]
    fn refused_remote_source_is_abandoned() {
        let mut world = SimWorld::new();
        world.add_room(room("W1N1"));
        world.add_room(room("W2N1"));
        world.add_controller(pos(40, 40, "W1N1"), 4, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25, "W1N1"));
        world.add_structure(StructureKind::Storage, pos(5, 25, "W1N1"));
        world.add_source(pos(40, 25, "W2N1"), 1_500);
        world.add_controller(pos(10, 10, "W2N1"), 3, Some("someone"));

        let mut config = HiveConfig::default();
        config.expansion.remote_sources = vec![pos(40, 25, "W2N1")];
        let mut global = GlobalController::new();
        let mut memory = Memory::default();

        let (report, queue) = run(&mut global, &mut world, &mut memory, &config);
        assert_eq!(report.remote_machines, 1);
        assert!(
            queue
                .pending()
                .iter()
                .any(|r| r.job_type == JobType::RemoteHarvester)
        );

        let machine = RemoteHarvest::new(&world, pos(40, 25, "W2N1")).unwrap();
        world.add_worker(
            "remote a",
            pos(41, 25, "W2N1"),
            vec![BodyPart::Move, BodyPart::Carry, BodyPart::Work],
            Some(WorkerMemory::new(machine.tag())),
        );
        let (report, _) = run(&mut global, &mut world, &mut memory, &config);
        assert_eq!(report.remote_machines, 0);
        assert!(global.abandoned().contains(&pos(40, 25, "W2N1")));

        let (report, _) = run(&mut global, &mut world, &mut memory, &config);
        assert_eq!(report.remote_machines, 0);
    }
}
