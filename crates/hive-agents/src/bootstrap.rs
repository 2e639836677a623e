//! Bringing a freshly claimed room up to its first spawn.
//!
//! The room has no fabrication point of its own, so its bootstrappers are
//! requested at its controller and routed to the closest spawn of another
//! colony. They harvest locally, build the spawn, then spend what is left
//! of their lives upgrading the controller. Once they are gone the machine
//! parks in [`BootstrapState::Done`] for good.

use hive_types::{
    ColonyMemory, Objective, Position, Role, RoomName, SiteSnapshot, SourceSnapshot, StructureKind,
    WorkerMemory, WorkerSnapshot, WorkerTag,
};
use hive_world::{ADJACENT, WORK_RANGE, World, WorkerAction, closest_by_range, spiral};
use tracing::{debug, info};

use crate::context::TaskContext;
use crate::crew::{act_or_approach, refresh_objective, set_objective, tagged_workers};
use crate::error::TaskError;
use crate::lookup::my_spawns;
use crate::machine::StateMachine;

/// Bootstrap progress of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// Nothing observed yet.
    Init,
    /// No spawn and no spawn site.
    PlaceSpawn,
    /// A spawn site awaits its builders.
    Build,
    /// The spawn stands; the remaining bootstrappers upgrade.
    Charge,
    /// Finished.
    Done,
}

impl BootstrapState {
    /// Persisted label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PlaceSpawn => "place_spawn",
            Self::Build => "build",
            Self::Charge => "charge",
            Self::Done => "done",
        }
    }
}

/// Bootstrap machine of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRoom {
    room: RoomName,
}

impl BootstrapRoom {
    /// Bootstrap `room`.
    pub const fn new(room: RoomName) -> Self {
        Self { room }
    }

    /// Room being bootstrapped.
    pub const fn room(&self) -> RoomName {
        self.room
    }

    /// Tag of the bootstrappers.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.room, Role::Bootstrapper)
    }

    fn spawn_site<W>(&self, world: &W) -> Option<SiteSnapshot>
    where
        W: World + ?Sized,
    {
        world
            .sites(self.room)
            .into_iter()
            .find(|s| s.kind == StructureKind::Spawn)
    }

    fn place_spawn<W>(&self, world: &mut W, radius: u8) -> bool
    where
        W: World + ?Sized,
    {
        for tile in spiral(Position::center_of(self.room), radius) {
            if world.is_wall(&tile) {
                continue;
            }
            if world.create_site(tile, StructureKind::Spawn).is_ok() {
                info!(room = %self.room, pos = %tile, "spawn site placed");
                return true;
            }
        }
        false
    }

    /// Harvest the richest-enough source closest to `near`, any source with
    /// energy otherwise.
    fn gather<W>(
        &self,
        world: &mut W,
        worker: &mut WorkerSnapshot,
        near: Position,
        min_energy: u32,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let (rich, poor): (Vec<SourceSnapshot>, Vec<SourceSnapshot>) = world
            .sources(self.room)
            .into_iter()
            .filter(|s| s.energy > 0)
            .partition(|s| s.energy > min_energy);
        let source = closest_by_range(&near, &rich, |s| s.pos)
            .or_else(|| closest_by_range(&near, &poor, |s| s.pos));
        match source {
            Some(source) => {
                let action = WorkerAction::Harvest {
                    target: source.id.clone(),
                };
                act_or_approach(world, worker, &action, source.pos, ADJACENT);
            }
            None if worker.store.energy() > 0 => {
                set_objective(world, worker, Objective::Deliver)?;
            }
            None => debug!(worker = %worker.id, "no source to harvest"),
        }
        Ok(())
    }
}

impl StateMachine for BootstrapRoom {
    type State = BootstrapState;

    fn name(&self) -> String {
        format!("bootstrap.{}", self.room)
    }

    fn label(state: BootstrapState) -> &'static str {
        state.label()
    }

    fn compute_state<W>(
        &self,
        world: &W,
        memory: &ColonyMemory,
    ) -> Result<BootstrapState, TaskError>
    where
        W: World + ?Sized,
    {
        if !world.controller(self.room).is_some_and(|c| c.my) {
            return Err(TaskError::InvalidState {
                machine: self.name(),
                reason: "room is not ours".to_owned(),
            });
        }
        if memory.label(&self.name()) == Some(BootstrapState::Done.label()) {
            return Ok(BootstrapState::Done);
        }
        let has_spawn = !my_spawns(world, self.room).is_empty();
        let state = if !has_spawn && self.spawn_site(world).is_none() {
            BootstrapState::PlaceSpawn
        } else if !has_spawn {
            BootstrapState::Build
        } else if !tagged_workers(world, &self.tag()).is_empty() {
            BootstrapState::Charge
        } else {
            BootstrapState::Done
        };
        Ok(state)
    }

    fn apply_state<W>(
        &mut self,
        state: BootstrapState,
        ctx: &mut TaskContext<'_, W>,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let config = ctx.config;
        let Some(controller) = world.controller(self.room) else {
            return Err(TaskError::InvalidState {
                machine: self.name(),
                reason: "room has no controller".to_owned(),
            });
        };
        match state {
            BootstrapState::Init | BootstrapState::Done => {}
            BootstrapState::PlaceSpawn => {
                if !self.place_spawn(world, config.bootstrap_search_radius) {
                    return Err(TaskError::InvalidState {
                        machine: self.name(),
                        reason: "no free tile for a spawn".to_owned(),
                    });
                }
            }
            BootstrapState::Build => {
                let Some(site) = self.spawn_site(&*world) else {
                    return Ok(());
                };
                let workers = tagged_workers(&*world, &self.tag());
                if workers.len() < config.bootstrappers && !ctx.queue.is_requested(&self.tag()) {
                    ctx.queue
                        .request_bootstrapper(controller.pos, WorkerMemory::new(self.tag()));
                }
                for mut worker in workers.into_iter().filter(|w| !w.spawning) {
                    match refresh_objective(world, &mut worker)? {
                        Objective::Gather => self.gather(
                            world,
                            &mut worker,
                            site.pos,
                            config.bootstrap_min_source_energy,
                        )?,
                        Objective::Deliver => {
                            let action = WorkerAction::Build {
                                site: site.id.clone(),
                            };
                            act_or_approach(world, &worker, &action, site.pos, WORK_RANGE);
                        }
                    }
                }
            }
            BootstrapState::Charge => {
                let workers = tagged_workers(&*world, &self.tag());
                for mut worker in workers.into_iter().filter(|w| !w.spawning) {
                    match refresh_objective(world, &mut worker)? {
                        Objective::Gather => self.gather(
                            world,
                            &mut worker,
                            controller.pos,
                            config.bootstrap_min_source_energy,
                        )?,
                        Objective::Deliver => {
                            let action = WorkerAction::UpgradeController {
                                controller: controller.id.clone(),
                            };
                            act_or_approach(world, &worker, &action, controller.pos, WORK_RANGE);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
