//! Construction crew.
//!
//! Builders take energy from containers or storage and spend it on sites,
//! non-road sites first.

use hive_types::{Objective, Role, RoomName, SiteSnapshot, StructureKind, WorkerMemory, WorkerTag};
use hive_world::{WORK_RANGE, World, WorkerAction, closest_by_path};
use tracing::debug;

use crate::context::TaskContext;
use crate::crew::{
    act_or_approach, refresh_objective, set_objective, tagged_workers,
    withdraw_from_closest_store,
};
use crate::error::TaskError;
use crate::lookup::energy_stores;

/// Sites worth working on: non-road sites when any exist, else roads.
pub fn preferred_sites<W>(world: &W, colony: RoomName) -> Vec<SiteSnapshot>
where
    W: World + ?Sized,
{
    let sites = world.sites(colony);
    let (roads, others): (Vec<SiteSnapshot>, Vec<SiteSnapshot>) = sites
        .into_iter()
        .partition(|s| s.kind == StructureKind::Road);
    if others.is_empty() { roads } else { others }
}

/// Builders of one colony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builders {
    colony: RoomName,
}

impl Builders {
    /// Builders for `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony }
    }

    /// Tag of the builders.
    pub const fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Builder)
    }

    /// Request builders up to `wanted` while there is work and energy to
    /// do it with, and drive the existing ones.
    pub fn run<W>(&self, ctx: &mut TaskContext<'_, W>, wanted: usize) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        let sites = preferred_sites(&*world, self.colony);
        let Some(first) = sites.first() else {
            debug!(colony = %self.colony, "nothing to build");
            return Ok(());
        };
        if energy_stores(&*world, self.colony).is_empty() {
            debug!(colony = %self.colony, "no energy to build with");
            return Ok(());
        }
        let workers = tagged_workers(&*world, &self.tag());
        if workers.len() < wanted && !ctx.queue.is_requested(&self.tag()) {
            ctx.queue
                .request_builder(first.pos, WorkerMemory::new(self.tag()));
        }

        for mut worker in workers {
            if worker.spawning {
                continue;
            }
            match refresh_objective(world, &mut worker)? {
                Objective::Gather => {
                    if !withdraw_from_closest_store(world, &worker, self.colony)
                        && worker.store.energy() > 0
                    {
                        set_objective(world, &mut worker, Objective::Deliver)?;
                    }
                }
                Objective::Deliver => {
                    let site = closest_by_path(&*world, &worker.pos, &sites, WORK_RANGE, |s| s.pos)
                        .or(sites.first());
                    if let Some(site) = site {
                        let action = WorkerAction::Build {
                            site: site.id.clone(),
                        };
                        act_or_approach(world, &worker, &action, site.pos, WORK_RANGE);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_population::JobQueue;
    use hive_types::{BodyPart, ColonyMemory, JobType, Position, Resource};
    use hive_world::{PLAYER, SimWorld};

    use super::*;
    use crate::config::AgentConfig;

    fn room() -> RoomName {
        "W1N1".parse().unwrap()
    }

    fn pos(x: u8, y: u8) -> Position {
        Position::new(x, y, room()).unwrap()
    }

    fn make_colony() -> SimWorld {
        let mut world = SimWorld::new();
        world.add_room(room());
        world.add_controller(pos(40, 40), 3, Some(PLAYER));
        world.add_structure(StructureKind::Spawn, pos(25, 25));
        world
    }

    fn run(world: &mut SimWorld, wanted: usize) -> JobQueue {
        let mut queue = JobQueue::new();
        let mut memory = ColonyMemory::default();
        let config = AgentConfig::default();
        let mut ctx = TaskContext::new(world, &mut queue, &mut memory, &config);
        Builders::new(room()).run(&mut ctx, wanted).unwrap();
        queue
    }

    #[test]
    fn non_road_sites_come_first() {
        let mut world = make_colony();
        world.add_site(StructureKind::Road, pos(5, 5));
        assert_eq!(preferred_sites(&world, room()).len(), 1);
        world.add_site(StructureKind::Extension, pos(6, 6));
        let sites = preferred_sites(&world, room());
        assert_eq!(sites.len(), 1);
        assert_eq!(sites.first().unwrap().kind, StructureKind::Extension);
    }

    #[test]
    fn no_request_without_sites_or_energy() {
        let mut world = make_colony();
        assert!(run(&mut world, 2).pending().is_empty());
        world.add_site(StructureKind::Extension, pos(6, 6));
        assert!(run(&mut world, 2).pending().is_empty());
        let container = world.add_structure(StructureKind::Container, pos(10, 10));
        world.set_stored(&container, Resource::Energy, 500);
        let queue = run(&mut world, 2);
        assert_eq!(queue.pending().first().unwrap().job_type, JobType::Builder);
    }

    #[test]
    fn loaded_builder_works_the_site() {
        let mut world = make_colony();
        let site = world.add_site(StructureKind::Extension, pos(12, 10));
        let container = world.add_structure(StructureKind::Container, pos(10, 10));
        world.set_stored(&container, Resource::Energy, 500);
        let id = world.add_worker(
            "builder a",
            pos(11, 10),
            vec![BodyPart::Move, BodyPart::Carry, BodyPart::Work],
            Some(WorkerMemory::new(Builders::new(room()).tag())),
        );
        world.set_carried(&id, Resource::Energy, 50);
        run(&mut world, 1);
        let progress = world
            .sites(room())
            .into_iter()
            .find(|s| s.id == site)
            .unwrap()
            .progress;
        assert_eq!(progress, 5);
        assert_eq!(world.worker(&id).unwrap().store.energy(), 45);
    }
}
