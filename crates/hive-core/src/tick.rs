//! The tick orchestrator.
//!
//! [`Hive`] owns everything that lives across ticks: the bankers, the job
//! queue, one [`ColonyController`] per controlled room, the global
//! controller and the persisted document. [`Hive::run_tick`] drives one
//! pass:
//!
//! 1. Reset the job queue.
//! 2. Refresh the colony list (cached, see [`OWNED_ROOMS_KEY`]).
//! 3. Tick every colony inside its own error boundary.
//! 4. Tick the global controller inside its own error boundary.
//! 5. Resolve the job queue and stamp the new workers.
//! 6. Save the document.

use std::collections::BTreeMap;

use hive_bank::BankRegistry;
use hive_population::{Fabricated, JobQueue};
use hive_types::RoomName;
use hive_world::World;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::{cached, invalidate};
use crate::colony::ColonyController;
use crate::config::HiveConfig;
use crate::error::TickError;
use crate::global::{GlobalController, PowerSighting};
use crate::memory::{KeyValueStore, MEMORY_KEY, Memory};
use crate::strategist::DesiredState;

/// Cache key of the controlled room list.
pub const OWNED_ROOMS_KEY: &str = "owned_rooms";

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick.
    pub tick: u64,
    /// Colonies ticked, failed ones included.
    pub colonies: usize,
    /// Job requests filed.
    pub requests: usize,
    /// Fabrications started.
    pub fabricated: Vec<Fabricated>,
    /// Desired state per colony that completed its tick.
    pub desired: BTreeMap<RoomName, DesiredState>,
    /// Rooms with harvestable power.
    pub power: Vec<PowerSighting>,
    /// Failures caught by an error boundary.
    pub errors: Vec<String>,
}

/// The colony controller as a whole.
#[derive(Debug)]
pub struct Hive<S>
where
    S: KeyValueStore,
{
    config: HiveConfig,
    banks: BankRegistry,
    queue: JobQueue,
    colonies: BTreeMap<RoomName, ColonyController>,
    global: GlobalController,
    memory: Memory,
    store: S,
}

impl<S> Hive<S>
where
    S: KeyValueStore,
{
    /// Build the controller, loading the persisted document from `store`.
    pub fn new(config: HiveConfig, store: S) -> Result<Self, TickError> {
        let memory = Memory::load(&store, MEMORY_KEY)?;
        info!(
            colonies = memory.terraformed_rooms.len(),
            intel_rooms = memory.intel.last_states().count(),
            "memory loaded"
        );
        Ok(Self {
            banks: BankRegistry::new(config.bank.clone()),
            config,
            queue: JobQueue::new(),
            colonies: BTreeMap::new(),
            global: GlobalController::new(),
            memory,
            store,
        })
    }

    /// Configuration in use.
    pub const fn config(&self) -> &HiveConfig {
        &self.config
    }

    /// The persisted document as of the last tick.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Bankers of every colony.
    pub const fn banks(&self) -> &BankRegistry {
        &self.banks
    }

    /// Controller of one colony.
    pub fn colony(&self, room: RoomName) -> Option<&ColonyController> {
        self.colonies.get(&room)
    }

    /// Run one tick against `world`.
    ///
    /// A failing colony or global controller is logged and reported in
    /// [`TickSummary::errors`]; the rest of the tick still runs. Only a
    /// failure to cache into or save the document aborts the tick.
    pub fn run_tick<W>(&mut self, world: &mut W) -> Result<TickSummary, TickError>
    where
        W: World + ?Sized,
    {
        let now = world.time();
        let mut summary = TickSummary {
            tick: now,
            ..TickSummary::default()
        };
        self.queue.init();
        self.refresh_colonies(&*world)?;
        summary.colonies = self.colonies.len();

        for (room, colony) in &mut self.colonies {
            let memory = self.memory.colony_mut(*room);
            match colony.tick(
                &mut *world,
                &mut self.queue,
                &mut self.banks,
                memory,
                &self.config,
            ) {
                Ok(Some(report)) => {
                    summary.desired.insert(*room, report.desired);
                }
                Ok(None) => {}
                Err(err) => {
                    error!(colony = %room, error = %err, "colony tick failed");
                    summary.errors.push(format!("{room}: {err}"));
                }
            }
        }

        match self
            .global
            .tick(&mut *world, &mut self.queue, &mut self.memory, &self.config)
        {
            Ok(report) => {
                for failure in report.failures {
                    summary.errors.push(format!("global: {failure}"));
                }
                summary.power = report.power;
            }
            Err(err) => {
                error!(error = %err, "global tick failed");
                summary.errors.push(format!("global: {err}"));
            }
        }

        summary.requests = self.queue.pending().len();
        let report = self.queue.resolve(world, &self.banks);
        for fabricated in report.fabricated() {
            if let Err(err) = world.set_worker_memory(&fabricated.worker, fabricated.stamp.clone())
            {
                warn!(worker = %fabricated.worker, error = %err, "worker stamp failed");
            }
        }
        summary.fabricated = report.fabricated().cloned().collect();

        self.memory.save(&mut self.store, MEMORY_KEY)?;
        info!(
            tick = now,
            colonies = summary.colonies,
            requests = summary.requests,
            fabricated = summary.fabricated.len(),
            errors = summary.errors.len(),
            "tick done"
        );
        Ok(summary)
    }

    /// Bring the colony controllers in line with the controlled rooms.
    fn refresh_colonies<W>(&mut self, world: &W) -> Result<(), TickError>
    where
        W: World + ?Sized,
    {
        let claim_landed = self.config.expansion.claim_target.is_some_and(|target| {
            !self.colonies.contains_key(&target) && world.controller(target).is_some_and(|c| c.my)
        });
        if self.colonies.is_empty() || claim_landed {
            invalidate(&mut self.memory, OWNED_ROOMS_KEY);
        }
        let rooms: Vec<RoomName> = cached(
            &mut self.memory,
            OWNED_ROOMS_KEY,
            self.config.colony.colony_refresh_ticks,
            world.time(),
            || {
                world
                    .rooms()
                    .into_iter()
                    .filter(|room| world.controller(*room).is_some_and(|c| c.my))
                    .collect()
            },
        )?;

        self.colonies.retain(|room, _| {
            let kept = rooms.contains(room);
            if !kept {
                info!(colony = %room, "colony lost");
            }
            kept
        });
        for room in &rooms {
            self.colonies.entry(*room).or_insert_with(|| {
                info!(colony = %room, "colony added");
                ColonyController::new(*room)
            });
        }
        self.banks.retain(|room| rooms.contains(&room));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{JobType, Position, StructureKind};
    use hive_world::{PLAYER, SimWorld};

    use super::*;
    use crate::memory::InMemoryStore;

    fn room(name: &str) -> RoomName {
        name.parse().unwrap()
    }

    fn pos(x: u8, y: u8, name: &str) -> Position {
        Position::new(x, y, room(name)).unwrap()
    }

    fn add_colony(world: &mut SimWorld, name: &str) {
        world.add_room(room(name));
        world.add_controller(pos(40, 40, name), 2, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25, name));
        world.add_source(pos(10, 10, name), 3_000);
    }

    #[test]
    fn first_tick_fabricates_and_stamps_a_harvester() {
        let mut world = SimWorld::new();
        add_colony(&mut world, "W1N1");
        let mut hive = Hive::new(HiveConfig::default(), InMemoryStore::new()).unwrap();
        let summary = hive.run_tick(&mut world).unwrap();

        assert_eq!(summary.colonies, 1);
        assert!(summary.errors.is_empty());
        let made = summary.fabricated.first().unwrap();
        assert_eq!(made.job_type, JobType::Harvester);
        let worker = world.worker(&made.worker).unwrap();
        assert_eq!(worker.memory.unwrap().tag, made.stamp.tag);
        assert!(hive.colony(room("W1N1")).is_some());
        assert_eq!(hive.banks().bank(room("W1N1")).unwrap().len(), 1);
    }

    #[test]
    fn failing_colony_does_not_stop_the_others() {
        let mut world = SimWorld::new();
        add_colony(&mut world, "W1N1");
        world.add_room(room("W2N1"));
        world.add_controller(pos(40, 40, "W2N1"), 2, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25, "W2N1"));

        let mut hive = Hive::new(HiveConfig::default(), InMemoryStore::new()).unwrap();
        let summary = hive.run_tick(&mut world).unwrap();
        assert_eq!(summary.colonies, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors.first().unwrap().starts_with("W2N1"));
        assert!(summary.desired.contains_key(&room("W1N1")));
        assert!(!summary.fabricated.is_empty());
    }

    #[test]
    fn memory_is_saved_and_reloaded() {
        let mut world = SimWorld::new();
        add_colony(&mut world, "W1N1");
        let mut hive = Hive::new(HiveConfig::default(), InMemoryStore::new()).unwrap();
        hive.run_tick(&mut world).unwrap();
        assert!(hive.memory().cached.contains_key(OWNED_ROOMS_KEY));
        assert!(hive.memory().intel.last(room("W1N1")).is_some());

        let store = hive.store().clone();
        let reloaded = Hive::new(HiveConfig::default(), store).unwrap();
        assert_eq!(reloaded.memory(), hive.memory());
    }

    #[test]
    fn colony_list_is_cached_between_refreshes() {
        let mut world = SimWorld::new();
        add_colony(&mut world, "W1N1");
        let mut hive = Hive::new(HiveConfig::default(), InMemoryStore::new()).unwrap();
        hive.run_tick(&mut world).unwrap();

        add_colony(&mut world, "W3N1");
        world.set_time(50);
        assert_eq!(hive.run_tick(&mut world).unwrap().colonies, 1);
        world.set_time(101);
        assert_eq!(hive.run_tick(&mut world).unwrap().colonies, 2);
    }

    #[test]
    fn claimed_room_joins_without_waiting_for_the_refresh() {
        let mut world = SimWorld::new();
        add_colony(&mut world, "W1N1");
        world.add_room(room("W2N1"));
        world.add_controller(pos(25, 10, "W2N1"), 0, None);
        let mut config = HiveConfig::default();
        config.expansion.claim_target = Some(room("W2N1"));
        let mut hive = Hive::new(config, InMemoryStore::new()).unwrap();
        assert_eq!(hive.run_tick(&mut world).unwrap().colonies, 1);

        // The claim lands between two refreshes.
        add_colony(&mut world, "W2N1");
        world.set_time(2);
        let summary = hive.run_tick(&mut world).unwrap();
        assert_eq!(summary.colonies, 2);
        assert!(hive.colony(room("W2N1")).is_some());
    }
}
