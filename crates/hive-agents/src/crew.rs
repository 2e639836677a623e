//! Worker bookkeeping shared by every task machine: discovery by tag,
//! the gather/deliver objective, memory writes, acting with an approach
//! fallback, and destination claim counting.

use std::collections::BTreeMap;

use hive_types::{
    ActionStatus, ObjectId, Objective, Position, Resource, Role, RoomName, WorkerMemory,
    WorkerSnapshot, WorkerTag,
};
use hive_world::{ADJACENT, World, WorkerAction, closest_by_path};
use tracing::{debug, warn};

use crate::error::TaskError;
use crate::lookup::energy_stores;

/// Our workers carrying exactly `tag`, in name order.
pub fn tagged_workers<W>(world: &W, tag: &WorkerTag) -> Vec<WorkerSnapshot>
where
    W: World + ?Sized,
{
    let mut workers: Vec<WorkerSnapshot> = world
        .workers()
        .into_iter()
        .filter(|w| w.has_tag(tag))
        .collect();
    workers.sort_by(|a, b| a.id.cmp(&b.id));
    workers
}

/// Our workers of one role, across every colony, in name order.
pub fn workers_with_role<W>(world: &W, role: Role) -> Vec<WorkerSnapshot>
where
    W: World + ?Sized,
{
    let mut workers: Vec<WorkerSnapshot> = world
        .workers()
        .into_iter()
        .filter(|w| w.tag().is_some_and(|t| t.role == role))
        .collect();
    workers.sort_by(|a, b| a.id.cmp(&b.id));
    workers
}

/// Edit a worker's memory and write it back when it changed.
///
/// The snapshot is updated in place so the caller keeps acting on what the
/// host now stores. Unstamped workers are left alone.
pub fn update_memory<W>(
    world: &mut W,
    worker: &mut WorkerSnapshot,
    edit: impl FnOnce(&mut WorkerMemory),
) -> Result<(), TaskError>
where
    W: World + ?Sized,
{
    let Some(memory) = worker.memory.as_mut() else {
        return Ok(());
    };
    let before = memory.clone();
    edit(memory);
    if *memory != before {
        world.set_worker_memory(&worker.id, memory.clone())?;
    }
    Ok(())
}

/// Flip the gather/deliver objective when cargo is full or empty.
///
/// A switch forgets the bound source and destination.
pub fn refresh_objective<W>(
    world: &mut W,
    worker: &mut WorkerSnapshot,
) -> Result<Objective, TaskError>
where
    W: World + ?Sized,
{
    let current = worker.objective();
    let next = match current {
        Objective::Gather if worker.store.is_full() => Objective::Deliver,
        Objective::Deliver if worker.store.is_empty() => Objective::Gather,
        other => other,
    };
    if next != current {
        set_objective(world, worker, next)?;
    }
    Ok(next)
}

/// Force an objective, forgetting bound targets.
pub fn set_objective<W>(
    world: &mut W,
    worker: &mut WorkerSnapshot,
    objective: Objective,
) -> Result<(), TaskError>
where
    W: World + ?Sized,
{
    update_memory(world, worker, |m| {
        m.objective = objective;
        m.meta.destination = None;
        m.meta.source = None;
    })
}

/// Attempt `action`; when the target is out of range, step toward it.
///
/// Returns the status of the action itself. Failures other than range are
/// logged and left for the next tick.
pub fn act_or_approach<W>(
    world: &mut W,
    worker: &WorkerSnapshot,
    action: &WorkerAction,
    target: Position,
    range: u32,
) -> ActionStatus
where
    W: World + ?Sized,
{
    let status = world.act(&worker.id, action);
    match status {
        ActionStatus::Ok => {}
        ActionStatus::NotInRange => {
            let moved = world.act(&worker.id, &WorkerAction::MoveTo { target, range });
            if !moved.is_ok() {
                debug!(worker = %worker.id, to = %target, status = ?moved, "move failed");
            }
        }
        ActionStatus::NotEnoughResources | ActionStatus::Full | ActionStatus::Busy => {
            debug!(worker = %worker.id, action = action.label(), ?status, "action deferred");
        }
        _ => {
            warn!(worker = %worker.id, action = action.label(), ?status, "action failed");
        }
    }
    status
}

/// Step toward a tile, logging failures.
pub fn move_to<W>(
    world: &mut W,
    worker: &WorkerSnapshot,
    target: Position,
    range: u32,
) -> ActionStatus
where
    W: World + ?Sized,
{
    let status = world.act(&worker.id, &WorkerAction::MoveTo { target, range });
    if !status.is_ok() {
        debug!(worker = %worker.id, to = %target, ?status, "move failed");
    }
    status
}

/// Withdraw energy from the container or storage of `room` closest by
/// path. Returns `false` when nothing there holds energy.
pub fn withdraw_from_closest_store<W>(
    world: &mut W,
    worker: &WorkerSnapshot,
    room: RoomName,
) -> bool
where
    W: World + ?Sized,
{
    let stores = energy_stores(&*world, room);
    let Some(store) = closest_by_path(&*world, &worker.pos, &stores, ADJACENT, |s| s.pos) else {
        return false;
    };
    let action = WorkerAction::Withdraw {
        target: store.id.clone(),
        resource: Resource::Energy,
    };
    act_or_approach(world, worker, &action, store.pos, ADJACENT);
    true
}

/// Number of workers bound to each destination.
pub fn compute_affected_workers(workers: &[WorkerSnapshot]) -> BTreeMap<ObjectId, usize> {
    let mut claims: BTreeMap<ObjectId, usize> = BTreeMap::new();
    for id in workers.iter().filter_map(WorkerSnapshot::destination) {
        let slot = claims.entry(id.clone()).or_insert(0);
        *slot = slot.saturating_add(1);
    }
    claims
}

/// Workers bound to `id`.
pub fn claims_on(claims: &BTreeMap<ObjectId, usize>, id: &ObjectId) -> usize {
    claims.get(id).copied().unwrap_or(0)
}

/// Move one claim from `from` (if any) to `to` (if any).
pub fn transfer_claim(
    claims: &mut BTreeMap<ObjectId, usize>,
    from: Option<&ObjectId>,
    to: Option<&ObjectId>,
) {
    if let Some(id) = from
        && let Some(count) = claims.get_mut(id)
    {
        *count = count.saturating_sub(1);
    }
    if let Some(id) = to {
        let slot = claims.entry(id.clone()).or_insert(0);
        *slot = slot.saturating_add(1);
    }
}

/// Self-destruct a worker.
pub fn retire<W>(world: &mut W, worker: &WorkerSnapshot)
where
    W: World + ?Sized,
{
    let status = world.act(&worker.id, &WorkerAction::Suicide);
    if !status.is_ok() {
        warn!(worker = %worker.id, ?status, "suicide failed");
    }
}
