//! Static harvesting of one source or mineral deposit.
//!
//! One harvester parks next to the deposit, places a container on its own
//! tile, builds it with what it harvests, then keeps harvesting into it.
//! Logistics empty the container.

use hive_types::{
    ColonyMemory, MineralSnapshot, ObjectId, Position, Resource, Role, RoomName, SiteSnapshot,
    SourceSnapshot, StructureKind, StructureSnapshot, WorkerMemory, WorkerSnapshot, WorkerTag,
};
use hive_world::{ADJACENT, WORK_RANGE, World, WorkerAction};
use tracing::{debug, info, warn};

use crate::context::TaskContext;
use crate::crew::{act_or_approach, move_to, tagged_workers};
use crate::error::TaskError;
use crate::lookup::{has_extractor, structures_of};
use crate::machine::StateMachine;

/// Lifecycle of a harvest spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestState {
    /// No harvester yet: request one.
    Init,
    /// The harvester is being fabricated.
    Creating,
    /// The harvester is on its way to the spot.
    HarvesterCreated,
    /// The harvester is in place but no container exists yet.
    ReadyToStart,
    /// The harvester is building the container under itself.
    Constructing,
    /// The harvester stands on the finished container.
    Working,
}

impl HarvestState {
    /// Persisted label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Creating => "creating",
            Self::HarvesterCreated => "harvester_created",
            Self::ReadyToStart => "ready_to_start",
            Self::Constructing => "constructing",
            Self::Working => "working",
        }
    }
}

/// What is being harvested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deposit {
    /// An energy source.
    Source,
    /// A mineral deposit yielding this resource. Needs an extractor.
    Mineral(Resource),
}

/// Harvest machine of one deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSource {
    colony: RoomName,
    target: ObjectId,
    pos: Position,
    deposit: Deposit,
}

impl HarvestSource {
    /// Machine for an energy source.
    pub fn for_source(colony: RoomName, source: &SourceSnapshot) -> Self {
        Self {
            colony,
            target: source.id.clone(),
            pos: source.pos,
            deposit: Deposit::Source,
        }
    }

    /// Machine for a mineral deposit.
    pub fn for_mineral(colony: RoomName, mineral: &MineralSnapshot) -> Self {
        Self {
            colony,
            target: mineral.id.clone(),
            pos: mineral.pos,
            deposit: Deposit::Mineral(mineral.resource),
        }
    }

    /// Tile of the deposit.
    pub const fn pos(&self) -> Position {
        self.pos
    }

    /// Id of the deposit.
    pub const fn target(&self) -> &ObjectId {
        &self.target
    }

    /// What is harvested.
    pub const fn deposit(&self) -> Deposit {
        self.deposit
    }

    /// Tag of the harvester.
    pub fn tag(&self) -> WorkerTag {
        WorkerTag::new(self.colony, Role::Harvester).with_target(self.target.as_str())
    }

    const fn resource(&self) -> Resource {
        match self.deposit {
            Deposit::Source => Resource::Energy,
            Deposit::Mineral(resource) => resource,
        }
    }

    fn deposit_exists<W>(&self, world: &W) -> bool
    where
        W: World + ?Sized,
    {
        match self.deposit {
            Deposit::Source => world.sources(self.pos.room).iter().any(|s| s.id == self.target),
            Deposit::Mineral(_) => world
                .minerals(self.pos.room)
                .iter()
                .any(|m| m.id == self.target),
        }
    }

    fn harvester<W>(&self, world: &W) -> Option<WorkerSnapshot>
    where
        W: World + ?Sized,
    {
        tagged_workers(world, &self.tag()).into_iter().next()
    }

    /// The container serving this deposit.
    pub fn container<W>(&self, world: &W) -> Option<StructureSnapshot>
    where
        W: World + ?Sized,
    {
        structures_of(world, self.pos.room, StructureKind::Container)
            .into_iter()
            .find(|c| c.pos.in_range_to(&self.pos, ADJACENT))
    }

    fn container_site<W>(&self, world: &W) -> Option<SiteSnapshot>
    where
        W: World + ?Sized,
    {
        world
            .sites(self.pos.room)
            .into_iter()
            .find(|s| s.kind == StructureKind::Container && s.pos.in_range_to(&self.pos, ADJACENT))
    }

    /// Current state, derived from the world alone.
    pub fn observe<W>(&self, world: &W) -> Result<HarvestState, TaskError>
    where
        W: World + ?Sized,
    {
        if !self.deposit_exists(world) {
            return Err(TaskError::NoSourceForHarvester {
                colony: self.colony,
                pos: self.pos,
            });
        }
        let Some(harvester) = self.harvester(world) else {
            return Ok(HarvestState::Init);
        };
        if harvester.spawning {
            return Ok(HarvestState::Creating);
        }
        let state = if let Some(container) = self.container(world) {
            if harvester.pos == container.pos {
                HarvestState::Working
            } else {
                HarvestState::HarvesterCreated
            }
        } else if let Some(site) = self.container_site(world) {
            if harvester.pos == site.pos {
                HarvestState::Constructing
            } else {
                HarvestState::HarvesterCreated
            }
        } else if harvester.pos.in_range_to(&self.pos, ADJACENT) {
            HarvestState::ReadyToStart
        } else {
            HarvestState::HarvesterCreated
        };
        Ok(state)
    }

    fn harvest<W>(&self, world: &mut W, harvester: &WorkerSnapshot)
    where
        W: World + ?Sized,
    {
        let action = WorkerAction::Harvest {
            target: self.target.clone(),
        };
        act_or_approach(world, harvester, &action, self.pos, ADJACENT);
    }
}

impl StateMachine for HarvestSource {
    type State = HarvestState;

    fn name(&self) -> String {
        format!("harvest.{}", self.target)
    }

    fn label(state: HarvestState) -> &'static str {
        state.label()
    }

    fn compute_state<W>(&self, world: &W, _memory: &ColonyMemory) -> Result<HarvestState, TaskError>
    where
        W: World + ?Sized,
    {
        self.observe(world)
    }

    fn apply_state<W>(
        &mut self,
        state: HarvestState,
        ctx: &mut TaskContext<'_, W>,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized,
    {
        let world = &mut *ctx.world;
        match state {
            HarvestState::Init => {
                if matches!(self.deposit, Deposit::Mineral(_))
                    && !has_extractor(&*world, self.pos)
                {
                    debug!(mineral = %self.target, "waiting for extractor");
                    return Ok(());
                }
                if !ctx.queue.is_requested(&self.tag()) {
                    ctx.queue
                        .request_harvester(self.pos, WorkerMemory::new(self.tag()));
                }
            }
            HarvestState::Creating => {}
            HarvestState::HarvesterCreated => {
                let Some(harvester) = self.harvester(&*world) else {
                    return Ok(());
                };
                let spot = self
                    .container(&*world)
                    .map(|c| c.pos)
                    .or_else(|| self.container_site(&*world).map(|s| s.pos));
                match spot {
                    Some(spot) => move_to(world, &harvester, spot, 0),
                    None => move_to(world, &harvester, self.pos, ADJACENT),
                };
            }
            HarvestState::ReadyToStart => {
                let Some(harvester) = self.harvester(&*world) else {
                    return Ok(());
                };
                let status = world.create_site(harvester.pos, StructureKind::Container);
                if status.is_ok() {
                    info!(pos = %harvester.pos, deposit = %self.target, "container site placed");
                } else {
                    warn!(pos = %harvester.pos, ?status, "container site refused");
                }
            }
            HarvestState::Constructing => {
                let (Some(harvester), Some(site)) =
                    (self.harvester(&*world), self.container_site(&*world))
                else {
                    return Ok(());
                };
                if harvester.store.free() > 0 {
                    self.harvest(world, &harvester);
                } else {
                    let action = WorkerAction::Build { site: site.id };
                    act_or_approach(world, &harvester, &action, site.pos, WORK_RANGE);
                }
            }
            HarvestState::Working => {
                let (Some(harvester), Some(container)) =
                    (self.harvester(&*world), self.container(&*world))
                else {
                    return Ok(());
                };
                if harvester.store.free() > 0 {
                    self.harvest(world, &harvester);
                } else {
                    let action = WorkerAction::Transfer {
                        target: container.id,
                        resource: self.resource(),
                    };
                    act_or_approach(world, &harvester, &action, container.pos, ADJACENT);
                }
            }
        }
        Ok(())
    }
}
