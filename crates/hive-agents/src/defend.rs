//! Melee defense of a colony.

use hive_types::{Position, Role, RoomName, WorkerMemory, WorkerTag};
use hive_world::{ADJACENT, World, WorkerAction, closest_by_range};

use crate::context::TaskContext;
use crate::crew::{act_or_approach, move_to, tagged_workers};
use crate::error::TaskError;

/// Defenders of one colony: attack the closest hostile, else rally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defenders {
    colony: RoomName,
}

impl Defenders {
    /// Defenders for `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony }
    }

    /// Tag of the defenders.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Defender)
    }

    /// Request defenders up to `wanted` and drive the existing ones.
    pub fn run<W>(&self, ctx: &mut TaskContext<'_, W>, wanted: usize) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let rally = Position::new(ctx.config.rally_x, ctx.config.rally_y, self.colony)
            .unwrap_or_else(|_| Position::center_of(self.colony));
        let workers = tagged_workers(&*world, &self.tag());
        if workers.len() < wanted && !ctx.queue.is_requested(&self.tag()) {
            ctx.queue
                .request_defender(rally, WorkerMemory::new(self.tag()));
        }
        let hostiles = world.hostiles(self.colony);
        for worker in workers {
            if worker.spawning {
                continue;
            }
            match closest_by_range(&worker.pos, &hostiles, |h| h.pos) {
                Some(enemy) => {
                    let action = WorkerAction::Attack {
                        target: enemy.id.clone(),
                    };
                    act_or_approach(world, &worker, &action, enemy.pos, ADJACENT);
                }
                None => {
                    move_to(world, &worker, rally, ADJACENT);
                }
            }
        }
        Ok(())
    }
}
