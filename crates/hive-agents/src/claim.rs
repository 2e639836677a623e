//! Claiming a new room.

use hive_types::{Position, Role, RoomName, WorkerMemory, WorkerTag};
use hive_world::{ADJACENT, World, WorkerAction};
use tracing::info;

use crate::context::TaskContext;
use crate::crew::{act_or_approach, move_to, tagged_workers};
use crate::error::TaskError;

/// One claimer travelling from `colony` to claim the controller of
/// `target`'s room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRoom {
    colony: RoomName,
    target: Position,
}

impl ClaimRoom {
    /// Claim the room of `target`, fabricated by `colony`.
    pub const fn new(colony: RoomName, target: Position) -> Self {
        Self { colony, target }
    }

    /// Room to claim.
    pub const fn target_room(&self) -> RoomName {
        self.target.room
    }

    /// Tag of the claimer.
    pub fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Claimer).with_target(self.target.room.to_string())
    }

    /// Whether the target room is ours.
    pub fn is_claimed<W>(&self, world: &W) -> bool
    where
        W: World + ?Sized,
    {
        world.controller(self.target.room).is_some_and(|c| c.my)
    }

    /// Request the claimer if missing, walk it over, claim.
    pub fn run<W>(&self, ctx: &mut TaskContext<'_, W>) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        if self.is_claimed(&*world) {
            return Ok(());
        }
        let Some(claimer) = tagged_workers(&*world, &self.tag()).into_iter().next() else {
            if !ctx.queue.is_requested(&self.tag()) {
                ctx.queue
                    .request_claimer(self.target, WorkerMemory::new(self.tag()));
            }
            return Ok(());
        };
        if claimer.spawning {
            return Ok(());
        }
        if claimer.pos.room != self.target.room {
            move_to(world, &claimer, self.target, ADJACENT);
            return Ok(());
        }
        let Some(controller) = world.controller(self.target.room) else {
            return Err(TaskError::InvalidState {
                machine: format!("claim.{}", self.target.room),
                reason: "target room has no controller".to_owned(),
            });
        };
        let action = WorkerAction::ClaimController {
            controller: controller.id,
        };
        let status = act_or_approach(world, &claimer, &action, controller.pos, ADJACENT);
        if status.is_ok() {
            info!(room = %self.target.room, worker = %claimer.id, "room claimed");
        }
        Ok(())
    }
}
