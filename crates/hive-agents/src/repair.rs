//! Structure maintenance.
//!
//! Repairers fix worn roads and containers first, then anything else that
//! is damaged. A loaded repairer with nothing left to fix retires.

use hive_types::{Objective, Role, RoomName, StructureSnapshot, WorkerMemory, WorkerTag};
use hive_world::{WORK_RANGE, World, WorkerAction, closest_by_range};
use tracing::info;

use crate::context::TaskContext;
use crate::crew::{
    act_or_approach, refresh_objective, retire, set_objective, tagged_workers,
    withdraw_from_closest_store,
};
use crate::error::TaskError;
use crate::lookup::{damaged_structures, worn_infrastructure};

/// Repair targets of a colony: worn infrastructure when any, else every
/// damaged structure.
pub fn repair_targets<W>(
    world: &W,
    colony: RoomName,
    infra_percent: u32,
) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    let worn = worn_infrastructure(world, colony, infra_percent);
    if worn.is_empty() {
        damaged_structures(world, colony)
    } else {
        worn
    }
}

/// Repairers of one colony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repairers {
    colony: RoomName,
}

impl Repairers {
    /// Repairers for `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony }
    }

    /// Tag of the repairers.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Repairer)
    }

    /// Request repairers up to `wanted` while something is damaged, and
    /// drive the existing ones.
    pub fn run<W>(&self, ctx: &mut TaskContext<'_, W>, wanted: usize) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let targets = repair_targets(&*world, self.colony, ctx.config.infra_repair_pct);
        let workers = tagged_workers(&*world, &self.tag());
        if workers.len() < wanted
            && !ctx.queue.is_requested(&self.tag())
            && let Some(first) = targets.first()
        {
            ctx.queue
                .request_repairer(first.pos, WorkerMemory::new(self.tag()));
        }

        for mut worker in workers {
            if worker.spawning {
                continue;
            }
            let objective = refresh_objective(world, &mut worker)?;
            let target = closest_by_range(&worker.pos, &targets, |s| s.pos);
            match (objective, target) {
                (Objective::Gather, _) => {
                    if !withdraw_from_closest_store(world, &worker, self.colony)
                        && worker.store.energy() > 0
                    {
                        set_objective(world, &mut worker, Objective::Deliver)?;
                    }
                }
                (Objective::Deliver, Some(target)) => {
                    let action = WorkerAction::Repair {
                        target: target.id.clone(),
                    };
                    act_or_approach(world, &worker, &action, target.pos, WORK_RANGE);
                }
                (Objective::Deliver, None) => {
                    info!(
                        worker = %worker.id,
                        colony = %self.colony,
                        "nothing to repair, retiring"
                    );
                    retire(world, &worker);
                }
            }
        }
        Ok(())
    }
}
