//! Controller upgrading.

use hive_types::{
    ColonyMemory, Objective, Resource, Role, RoomName, WorkerMemory, WorkerSnapshot, WorkerTag,
};
use hive_world::{ADJACENT, WORK_RANGE, World, WorkerAction};
use tracing::debug;

use crate::context::TaskContext;
use crate::crew::{
    act_or_approach, refresh_objective, set_objective, tagged_workers,
    withdraw_from_closest_store,
};
use crate::error::TaskError;
use crate::lookup::controller_container;
use crate::machine::StateMachine;

/// Crew states of the charge machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    /// No charger exists.
    Init,
    /// Every charger is still being fabricated.
    Creating,
    /// At least one charger is active.
    Working,
}

/// Chargers of one colony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeController {
    colony: RoomName,
    wanted: usize,
}

impl ChargeController {
    /// Chargers for `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony, wanted: 0 }
    }

    /// Set how many chargers the colony wants this tick.
    pub const fn set_wanted(&mut self, wanted: usize) {
        self.wanted = wanted;
    }

    /// Tag of the chargers.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Charger)
    }

    fn gather<W>(&self, world: &mut W, worker: &mut WorkerSnapshot) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        if let Some(container) = controller_container(&*world, self.colony)
            && container.energy() > 0
        {
            let action = WorkerAction::Withdraw {
                target: container.id,
                resource: Resource::Energy,
            };
            act_or_approach(world, worker, &action, container.pos, ADJACENT);
            return Ok(());
        }
        if !withdraw_from_closest_store(world, worker, self.colony) && worker.store.energy() > 0 {
            set_objective(world, worker, Objective::Deliver)?;
        }
        Ok(())
    }
}

impl StateMachine for ChargeController {
    type State = ChargeState;

    fn name(&self) -> String {
        format!("charge.{}", self.colony)
    }

    fn label(state: ChargeState) -> &'static str {
        match state {
            ChargeState::Init => "init",
            ChargeState::Creating => "creating",
            ChargeState::Working => "working",
        }
    }

    fn compute_state<W>(&self, world: &W, _memory: &ColonyMemory) -> Result<ChargeState, TaskError>
    where
        W: World + ?Sized,
    {
        let workers = tagged_workers(world, &self.tag());
        let state = if workers.is_empty() {
            ChargeState::Init
        } else if workers.iter().all(|w| w.spawning) {
            ChargeState::Creating
        } else {
            ChargeState::Working
        };
        Ok(state)
    }

    fn apply_state<W>(
        &mut self,
        state: ChargeState,
        ctx: &mut TaskContext<'_, W>,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let Some(controller) = world.controller(self.colony) else {
            return Err(TaskError::InvalidState {
                machine: self.name(),
                reason: "colony has no controller".to_owned(),
            });
        };
        let workers = tagged_workers(&*world, &self.tag());
        if workers.len() < self.wanted && !ctx.queue.is_requested(&self.tag()) {
            ctx.queue
                .request_charger(controller.pos, WorkerMemory::new(self.tag()));
        }
        if state != ChargeState::Working {
            return Ok(());
        }
        for mut worker in workers {
            if worker.spawning {
                continue;
            }
            match refresh_objective(world, &mut worker)? {
                Objective::Gather => self.gather(world, &mut worker)?,
                Objective::Deliver => {
                    let action = WorkerAction::UpgradeController {
                        controller: controller.id.clone(),
                    };
                    let status =
                        act_or_approach(world, &worker, &action, controller.pos, WORK_RANGE);
                    debug!(worker = %worker.id, ?status, "charging");
                }
            }
        }
        Ok(())
    }
}
