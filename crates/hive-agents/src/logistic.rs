//! Hauling: energy to consumers, minerals to storage.
//!
//! Energy logistics bind a delivery target in `meta.destination` and keep
//! it while it still accepts energy and no more than
//! [`AgentConfig::max_per_pos`](crate::config::AgentConfig) haulers are
//! bound to it. New bindings pick the closest consumer by path, taking
//! spawns and extensions first, then towers, the controller container and
//! finally storage.

use std::collections::BTreeMap;

use hive_types::{
    ActionStatus, ObjectId, Objective, Position, Resource, Role, RoomName, StructureKind,
    StructureSnapshot, WorkerMemory, WorkerSnapshot, WorkerTag,
};
use hive_world::{ADJACENT, World, WorkerAction, closest_by_path};
use tracing::debug;

use crate::context::TaskContext;
use crate::crew::{
    act_or_approach, claims_on, compute_affected_workers, refresh_objective, set_objective,
    tagged_workers, transfer_claim, update_memory,
};
use crate::error::TaskError;
use crate::lookup::{
    controller_container, mineral_tombstones, my_spawns, source_containers, storage,
    structures_of,
};

// ---------------------------------------------------------------------------
// Energy
// ---------------------------------------------------------------------------

/// Energy consumers of a colony, highest delivery priority first.
pub fn energy_consumers<W>(world: &W, colony: RoomName) -> Vec<Vec<StructureSnapshot>>
where
    W: World + ?Sized,
{
    let accepting = |s: &StructureSnapshot| s.free_capacity() > 0;
    let mut fill: Vec<StructureSnapshot> = my_spawns(world, colony);
    fill.extend(structures_of(world, colony, StructureKind::Extension));
    fill.retain(accepting);
    let mut towers = structures_of(world, colony, StructureKind::Tower);
    towers.retain(accepting);
    let charge: Vec<StructureSnapshot> = controller_container(world, colony)
        .into_iter()
        .filter(accepting)
        .collect();
    let store: Vec<StructureSnapshot> = storage(world, colony)
        .into_iter()
        .filter(accepting)
        .collect();
    vec![fill, towers, charge, store]
}

/// Energy haulers of one colony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyLogistics {
    colony: RoomName,
}

impl EnergyLogistics {
    /// Haulers for `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony }
    }

    /// Tag of the haulers.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Logistic)
    }

    /// Current haulers.
    pub fn workers<W>(&self, world: &W) -> Vec<WorkerSnapshot>
    where
        W: World + ?Sized,
    {
        tagged_workers(world, &self.tag())
    }

    /// Request haulers up to `wanted` and drive the existing ones.
    pub fn run<W>(&self, ctx: &mut TaskContext<'_, W>, wanted: usize) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let mut workers = self.workers(&*ctx.world);
        if workers.len() < wanted && !ctx.queue.is_requested(&self.tag()) {
            let target = my_spawns(&*ctx.world, self.colony)
                .first()
                .map_or_else(|| Position::center_of(self.colony), |s| s.pos);
            ctx.queue
                .request_logistic(target, WorkerMemory::new(self.tag()));
        }

        let mut objectives = Vec::with_capacity(workers.len());
        for worker in &mut workers {
            let objective = if worker.spawning {
                worker.objective()
            } else {
                refresh_objective(ctx.world, worker)?
            };
            objectives.push(objective);
        }

        let groups = energy_consumers(&*ctx.world, self.colony);
        let mut claims = compute_affected_workers(&workers);
        for (mut worker, objective) in workers.into_iter().zip(objectives) {
            if worker.spawning {
                continue;
            }
            match objective {
                Objective::Gather => self.gather(ctx, &mut worker, &groups)?,
                Objective::Deliver => {
                    self.deliver(ctx, &mut worker, &groups, &mut claims)?;
                }
            }
        }
        Ok(())
    }

    fn gather<W>(
        &self,
        ctx: &mut TaskContext<'_, W>,
        worker: &mut WorkerSnapshot,
        groups: &[Vec<StructureSnapshot>],
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let min_pickup = ctx.config.logistic_min_pickup;
        let containers: Vec<(ObjectId, Position)> = source_containers(&*world, self.colony)
            .into_iter()
            .filter(|c| c.energy() > min_pickup)
            .map(|c| (c.id, c.pos))
            .collect();
        let tombstones: Vec<(ObjectId, Position)> = world
            .tombstones(self.colony)
            .into_iter()
            .filter(|t| t.store.energy() > 0)
            .map(|t| (t.id, t.pos))
            .collect();
        let refill_needed = groups.iter().take(2).any(|g| !g.is_empty());
        let reserve: Vec<(ObjectId, Position)> = storage(&*world, self.colony)
            .into_iter()
            .filter(|s| refill_needed && s.energy() > 0)
            .map(|s| (s.id, s.pos))
            .collect();

        let picked = [containers, tombstones, reserve].iter().find_map(|candidates| {
            closest_by_path(&*world, &worker.pos, candidates, ADJACENT, |c| c.1).cloned()
        });
        match picked {
            Some((id, pos)) => {
                let action = WorkerAction::Withdraw {
                    target: id,
                    resource: Resource::Energy,
                };
                act_or_approach(world, worker, &action, pos, ADJACENT);
            }
            None if worker.store.energy() > 0 => {
                set_objective(world, worker, Objective::Deliver)?;
            }
            None => debug!(worker = %worker.id, "nothing to collect"),
        }
        Ok(())
    }

    fn deliver<W>(
        &self,
        ctx: &mut TaskContext<'_, W>,
        worker: &mut WorkerSnapshot,
        groups: &[Vec<StructureSnapshot>],
        claims: &mut BTreeMap<ObjectId, usize>,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let max = ctx.config.max_per_pos;
        let bound = worker.destination().cloned();
        let kept = bound.as_ref().and_then(|id| {
            (claims_on(claims, id) <= max)
                .then(|| groups.iter().flatten().find(|s| &s.id == id))
                .flatten()
        });

        let target = if let Some(target) = kept {
            Some(target.clone())
        } else {
            let picked = groups.iter().find_map(|group| {
                let open: Vec<&StructureSnapshot> = group
                    .iter()
                    .filter(|s| claims_on(claims, &s.id) < max)
                    .collect();
                closest_by_path(&*world, &worker.pos, &open, ADJACENT, |s| s.pos)
                    .map(|s| (*s).clone())
            });
            let new_id = picked.as_ref().map(|s| s.id.clone());
            transfer_claim(claims, bound.as_ref(), new_id.as_ref());
            update_memory(world, worker, |m| m.meta.destination = new_id)?;
            picked
        };

        let Some(target) = target else {
            debug!(worker = %worker.id, colony = %self.colony, "no consumer needs energy");
            return Ok(());
        };
        let action = WorkerAction::Transfer {
            target: target.id,
            resource: Resource::Energy,
        };
        let status = act_or_approach(world, worker, &action, target.pos, ADJACENT);
        if status == ActionStatus::Full {
            transfer_claim(claims, worker.destination(), None);
            update_memory(world, worker, |m| m.meta.destination = None)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Minerals
// ---------------------------------------------------------------------------

/// Mineral haulers of one colony: tombstones and containers to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineralLogistics {
    colony: RoomName,
}

impl MineralLogistics {
    /// Haulers for `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony }
    }

    /// Tag of the haulers.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::MineralLogistic)
    }

    /// Current haulers.
    pub fn workers<W>(&self, world: &W) -> Vec<WorkerSnapshot>
    where
        W: World + ?Sized,
    {
        tagged_workers(world, &self.tag())
    }

    /// Request haulers up to `wanted` and drive the existing ones. Does
    /// nothing without storage.
    pub fn run<W>(&self, ctx: &mut TaskContext<'_, W>, wanted: usize) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let Some(storage) = storage(&*ctx.world, self.colony) else {
            return Ok(());
        };
        let workers = self.workers(&*ctx.world);
        if workers.len() < wanted && !ctx.queue.is_requested(&self.tag()) {
            ctx.queue
                .request_logistic(storage.pos, WorkerMemory::new(self.tag()));
        }
        for mut worker in workers {
            if worker.spawning {
                continue;
            }
            match refresh_objective(ctx.world, &mut worker)? {
                Objective::Gather => self.gather(ctx, &mut worker)?,
                Objective::Deliver => deliver_cargo(ctx.world, &worker, &storage),
            }
        }
        Ok(())
    }

    /// Holders of minerals: tombstones first, then containers. Each entry
    /// is the holder, its tile and the first mineral it holds.
    fn pickups<W>(&self, world: &W) -> Vec<(ObjectId, Position, Resource)>
    where
        W: World + ?Sized,
    {
        let tombs = mineral_tombstones(world, self.colony)
            .into_iter()
            .filter_map(|t| t.store.minerals().next().map(|(r, _)| (t.id, t.pos, r)));
        let containers = structures_of(world, self.colony, StructureKind::Container)
            .into_iter()
            .filter_map(|c| {
                let mineral = c.store.as_ref()?.minerals().next()?.0;
                Some((c.id, c.pos, mineral))
            });
        tombs.chain(containers).collect()
    }

    fn gather<W>(
        &self,
        ctx: &mut TaskContext<'_, W>,
        worker: &mut WorkerSnapshot,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let pickups = self.pickups(&*world);
        let bound = worker
            .memory
            .as_ref()
            .and_then(|m| m.meta.source.as_ref())
            .and_then(|id| pickups.iter().find(|p| &p.0 == id))
            .cloned();
        let picked = bound.or_else(|| {
            closest_by_path(&*world, &worker.pos, &pickups, ADJACENT, |p| p.1).cloned()
        });
        let Some((id, pos, resource)) = picked else {
            if !worker.store.is_empty() {
                set_objective(world, worker, Objective::Deliver)?;
            }
            return Ok(());
        };
        update_memory(world, worker, |m| m.meta.source = Some(id.clone()))?;
        let action = WorkerAction::Withdraw {
            target: id,
            resource,
        };
        act_or_approach(world, worker, &action, pos, ADJACENT);
        Ok(())
    }
}

/// Unload the first held resource into `storage`, minerals before energy.
fn deliver_cargo<W>(world: &mut W, worker: &WorkerSnapshot, storage: &StructureSnapshot)
where
    W: World + ?Sized,
{
    let resource = worker
        .store
        .minerals()
        .next()
        .map_or(Resource::Energy, |(r, _)| r);
    let action = WorkerAction::Transfer {
        target: storage.id.clone(),
        resource,
    };
    act_or_approach(world, worker, &action, storage.pos, ADJACENT);
}
