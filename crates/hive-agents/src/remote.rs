//! Harvesting a source in another room and hauling it home.
//!
//! The crew size follows the path length between the source and the
//! receiving storage, re-evaluated every
//! [`AgentConfig::remote_recount_ticks`](crate::config::AgentConfig) ticks.
//! Machines are staggered over that cadence by a stable hash of their name
//! so they do not all search paths on the same tick.

use hive_types::{
    ActionStatus, Objective, Position, Resource, Role, StructureSnapshot, WorkerMemory,
    WorkerSnapshot, WorkerTag,
};
use hive_world::{ADJACENT, World, WorkerAction, path_length};
use tracing::{debug, info, warn};

use crate::context::TaskContext;
use crate::crew::{act_or_approach, move_to, refresh_objective, retire, tagged_workers};
use crate::error::TaskError;
use crate::lookup::storage;

/// FNV-1a over the bytes of `text`.
pub fn stable_hash(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Remote harvest machine of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHarvest {
    target: Position,
    storage: StructureSnapshot,
    wanted: usize,
    counted: bool,
}

impl RemoteHarvest {
    /// Machine for the source at `target`, delivering to the storage
    /// closest by room distance.
    pub fn new<W>(world: &W, target: Position) -> Result<Self, TaskError>
    where
        W: World + ?Sized,
    {
        let storage = world
            .rooms()
            .into_iter()
            .filter_map(|room| storage(world, room))
            .min_by_key(|s| s.pos.room.linear_distance(target.room))
            .ok_or(TaskError::NoStorage { target })?;
        Ok(Self {
            target,
            storage,
            wanted: 1,
            counted: false,
        })
    }

    /// Machine name.
    pub fn name(&self) -> String {
        format!(
            "remote.{}-{}-{}",
            self.target.x, self.target.y, self.target.room
        )
    }

    /// Source tile.
    pub const fn target(&self) -> Position {
        self.target
    }

    /// Current crew size.
    pub const fn wanted(&self) -> usize {
        self.wanted
    }

    /// Tag of the crew. Workers belong to the storage's colony.
    pub fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.storage.pos.room, Role::RemoteHarvester).with_target(format!(
            "{}-{}-{}",
            self.target.x, self.target.y, self.target.room
        ))
    }

    fn recount_due(&self, now: u64, cadence: u64) -> bool {
        let stagger = stable_hash(&self.name());
        !self.counted
            || now
                .wrapping_add(stagger)
                .checked_rem(cadence)
                .is_some_and(|r| r == 0)
    }

    /// Crew size for a path of `length` tiles: one worker per
    /// `per_worker` tiles, rounded, at least one.
    pub fn crew_for(length: usize, per_worker: usize) -> usize {
        let half = per_worker.checked_div(2).unwrap_or(0);
        length
            .saturating_add(half)
            .checked_div(per_worker)
            .unwrap_or(1)
            .max(1)
    }

    /// Request and drive the crew.
    ///
    /// Fails with [`TaskError::CannotHarvest`] once the source's room
    /// refuses us; every crew member retires first.
    pub fn run<W>(&mut self, ctx: &mut TaskContext<'_, W>) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let config = ctx.config;
        if self.recount_due(world.time(), config.remote_recount_ticks) {
            if let Some(length) = path_length(&*world, self.storage.pos, self.target, ADJACENT) {
                let wanted = Self::crew_for(length, config.remote_path_per_worker);
                if wanted != self.wanted {
                    info!(machine = %self.name(), length, wanted, "remote crew resized");
                }
                self.wanted = wanted;
            }
            self.counted = true;
        }

        let workers = tagged_workers(&*world, &self.tag());
        if workers.len() < self.wanted && !ctx.queue.is_requested(&self.tag()) {
            ctx.queue
                .request_remote_harvester(self.target, WorkerMemory::new(self.tag()));
        }

        let mut refused = false;
        for mut worker in workers.iter().cloned() {
            if worker.spawning {
                continue;
            }
            if worker.ticks_to_live < config.remote_retire_ttl && worker.store.is_empty() {
                debug!(worker = %worker.id, "remote harvester retiring");
                retire(world, &worker);
                continue;
            }
            match refresh_objective(world, &mut worker)? {
                Objective::Gather => refused |= self.harvest(world, &worker),
                Objective::Deliver => {
                    let action = WorkerAction::Transfer {
                        target: self.storage.id.clone(),
                        resource: Resource::Energy,
                    };
                    act_or_approach(world, &worker, &action, self.storage.pos, ADJACENT);
                }
            }
        }

        if refused {
            warn!(machine = %self.name(), "remote source refused, retiring crew");
            for worker in &workers {
                retire(world, worker);
            }
            return Err(TaskError::CannotHarvest {
                target: self.target,
            });
        }
        Ok(())
    }

    /// Harvest or walk to the source. Returns whether the host refused us.
    fn harvest<W>(&self, world: &mut W, worker: &WorkerSnapshot) -> bool
    where
        W: World + ?Sized,
    {
        if worker.pos.room != self.target.room {
            move_to(world, worker, self.target, ADJACENT);
            return false;
        }
        let Some(source) = world
            .sources(self.target.room)
            .into_iter()
            .find(|s| s.pos == self.target)
        else {
            warn!(machine = %self.name(), "remote source missing");
            return false;
        };
        let action = WorkerAction::Harvest { target: source.id };
        let status = act_or_approach(world, worker, &action, self.target, ADJACENT);
        status == ActionStatus::NotOwner
    }
}
