//! The per-tick job queue and the fabricator that resolves it.
//!
//! Task machines file [`JobRequest`]s during the tick. After every colony
//! ran, [`JobQueue::resolve`] routes each request to a fabrication point,
//! lets the point's banker pick one job type to fund, sizes the body to
//! the funded amount and starts at most one fabrication per point. Every
//! request is dropped afterwards; machines re-issue what is still needed
//! next tick.

use std::collections::{BTreeMap, BTreeSet};

use hive_bank::BankRegistry;
use hive_types::{
    BodyPart, JobType, ObjectId, Position, RequestId, StructureSnapshot, WorkerId, WorkerMemory,
    WorkerTag,
};
use hive_world::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PopulationError;
use crate::loadout::{base_cost, loadout_for};
use crate::routing::{find_closest_spawn, free_spawns};

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// A request for one worker, valid for the current tick only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Identifier, unique within the tick.
    pub id: RequestId,
    /// Kind of worker wanted.
    pub job_type: JobType,
    /// Where the worker will work. Drives fabrication point routing.
    pub target: Position,
    /// Memory stamped on the worker once fabricated.
    pub stamp: WorkerMemory,
}

/// A fabrication started by [`JobQueue::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fabricated {
    /// Name of the new worker.
    pub worker: WorkerId,
    /// Fabrication point used.
    pub spawn: ObjectId,
    /// Funded job type.
    pub job_type: JobType,
    /// Funded amount.
    pub amount: u32,
    /// Body sized to the amount.
    pub body: Vec<BodyPart>,
    /// Memory to stamp on the worker.
    pub stamp: WorkerMemory,
}

/// Outcome of one resolve pass: every request id maps to the worker made
/// for it, or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Outcome per request.
    pub outcomes: BTreeMap<RequestId, Option<Fabricated>>,
}

impl ResolveReport {
    /// Outcome of one request, `None` when nothing was made for it.
    pub fn get(&self, id: RequestId) -> Option<&Fabricated> {
        self.outcomes.get(&id).and_then(Option::as_ref)
    }

    /// Every fabrication started this tick.
    pub fn fabricated(&self) -> impl Iterator<Item = &Fabricated> {
        self.outcomes.values().flatten()
    }

    /// Number of fabrications started this tick.
    pub fn fabricated_count(&self) -> usize {
        self.fabricated().count()
    }

    /// Number of requests seen.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no request was pending.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// JobQueue
// ---------------------------------------------------------------------------

/// Pending job requests of the current tick.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    pending: Vec<JobRequest>,
    next_id: u32,
}

impl JobQueue {
    /// An empty queue.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Drop everything pending. Called once at the start of every tick.
    pub fn init(&mut self) {
        self.pending.clear();
        self.next_id = 0;
    }

    /// Requests filed so far this tick, oldest first.
    pub fn pending(&self) -> &[JobRequest] {
        &self.pending
    }

    /// Whether a request stamped with `tag` was filed this tick.
    pub fn is_requested(&self, tag: &WorkerTag) -> bool {
        self.pending.iter().any(|r| r.stamp.tag == *tag)
    }

    /// File a request. Nothing happens until [`Self::resolve`].
    pub fn request(
        &mut self,
        job_type: JobType,
        target: Position,
        stamp: WorkerMemory,
    ) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        debug!(request = %id, job = %job_type, target = %target, tag = %stamp.tag, "job requested");
        self.pending.push(JobRequest {
            id,
            job_type,
            target,
            stamp,
        });
        id
    }

    /// Fund and fabricate at most one worker per free fabrication point.
    ///
    /// Requests are routed to their closest free point. Each point serves
    /// requests for its own colony first and remote requests only when no
    /// local one exists. Its colony's banker picks the job type; the oldest
    /// request of that type gets the worker. All pending requests are
    /// consumed.
    pub fn resolve<W>(&mut self, world: &mut W, banks: &BankRegistry) -> ResolveReport
    where
        W: World + ?Sized,
    {
        let pending = std::mem::take(&mut self.pending);
        let mut report = ResolveReport {
            outcomes: pending.iter().map(|r| (r.id, None)).collect(),
        };
        if pending.is_empty() {
            return report;
        }

        let spawns = free_spawns(&*world);
        let mut by_spawn: BTreeMap<ObjectId, Vec<&JobRequest>> = BTreeMap::new();
        for request in &pending {
            match find_closest_spawn(&*world, request.target, &spawns) {
                Some(spawn) => by_spawn.entry(spawn.id.clone()).or_default().push(request),
                None => debug!(request = %request.id, "no free fabrication point"),
            }
        }

        for (spawn_id, requests) in by_spawn {
            let Some(spawn) = spawns.iter().find(|s| s.id == spawn_id) else {
                continue;
            };
            match fabricate_one(world, banks, spawn, &requests) {
                Ok(Some((id, fabricated))) => {
                    report.outcomes.insert(id, Some(fabricated));
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(spawn = %spawn.id, error = %err, "fabrication skipped");
                }
            }
        }
        report
    }
}

/// Generates one `request_<job>` shorthand per job type.
macro_rules! request_shorthands {
    ($($name:ident => $job:ident),* $(,)?) => {
        impl JobQueue {
            $(
                #[doc = concat!("File a [`JobType::", stringify!($job), "`] request.")]
                pub fn $name(&mut self, target: Position, stamp: WorkerMemory) -> RequestId {
                    self.request(JobType::$job, target, stamp)
                }
            )*
        }
    };
}

request_shorthands! {
    request_defender => Defend,
    request_harvester => Harvester,
    request_charger => Charger,
    request_logistic => Logistic,
    request_repairer => Repair,
    request_builder => Builder,
    request_bootstrapper => Bootstrap,
    request_claimer => Claim,
    request_remote_harvester => RemoteHarvester,
    request_tank => Tank,
    request_attacker => Attack,
    request_mapper => Mapper,
}

// ---------------------------------------------------------------------------
// Fabrication
// ---------------------------------------------------------------------------

fn fabricate_one<W>(
    world: &mut W,
    banks: &BankRegistry,
    spawn: &StructureSnapshot,
    requests: &[&JobRequest],
) -> Result<Option<(RequestId, Fabricated)>, PopulationError>
where
    W: World + ?Sized,
{
    let colony = spawn.pos.room;
    let local: Vec<&JobRequest> = requests
        .iter()
        .copied()
        .filter(|r| r.target.room == colony)
        .collect();
    let candidates = if local.is_empty() {
        requests.to_vec()
    } else {
        local
    };

    let bank = banks.bank(colony)?;
    let capacity = bank.current_capacity()?;
    // A body the colony can never hold must not block cheaper requests.
    let (job_types, oversized): (BTreeSet<JobType>, BTreeSet<JobType>) = candidates
        .iter()
        .map(|r| r.job_type)
        .partition(|job| base_cost(*job) <= capacity);
    if !oversized.is_empty() {
        debug!(colony = %colony, capacity, ?oversized, "job bodies exceed colony capacity");
    }
    let Some(financing) = bank.fund_one_of(&job_types)? else {
        return Ok(None);
    };
    if financing.amount == 0 {
        debug!(colony = %colony, job = %financing.job_type, "waiting for energy");
        return Ok(None);
    }
    let Some(request) = candidates
        .iter()
        .find(|r| r.job_type == financing.job_type)
    else {
        return Ok(None);
    };

    let body = loadout_for(financing.job_type, financing.amount)?;
    let worker = WorkerId::generate(financing.job_type.as_str());
    let status = world.fabricate(&spawn.id, &body, &worker);
    if !status.is_ok() {
        warn!(spawn = %spawn.id, worker = %worker, ?status, "fabrication refused");
        return Ok(None);
    }
    info!(
        colony = %colony,
        spawn = %spawn.id,
        worker = %worker,
        job = %financing.job_type,
        amount = financing.amount,
        parts = body.len(),
        "fabrication started"
    );
    Ok(Some((
        request.id,
        Fabricated {
            worker,
            spawn: spawn.id.clone(),
            job_type: financing.job_type,
            amount: financing.amount,
            body,
            stamp: request.stamp.clone(),
        },
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_bank::BankConfig;
    use hive_types::{Role, RoomName, StructureKind};
    use hive_world::{PLAYER, SimWorld};

    use super::*;

    fn room(name: &str) -> RoomName {
        name.parse().unwrap()
    }

    fn pos(x: u8, y: u8, name: &str) -> Position {
        Position::new(x, y, room(name)).unwrap()
    }

    fn stamp(colony: &str, role: Role) -> WorkerMemory {
        WorkerMemory::new(WorkerTag::new(room(colony), role))
    }

    fn make_colony(world: &mut SimWorld, name: &str) -> ObjectId {
        world.add_room(room(name));
        world.add_controller(pos(40, 40, name), 1, Some(PLAYER));
        world.add_source(pos(10, 10, name), 3_000);
        world.add_structure(StructureKind::Spawn, pos(25, 25, name))
    }

    fn make_banks(world: &SimWorld) -> BankRegistry {
        let mut banks = BankRegistry::new(BankConfig::default());
        for colony in world.rooms() {
            if let Some(energy) = world.room_energy(colony)
                && energy.capacity > 0
            {
                banks
                    .bank_mut(colony)
                    .record_sample(energy.available, energy.capacity)
                    .unwrap();
            }
        }
        banks
    }

    #[test]
    fn request_ids_restart_after_init() {
        let mut queue = JobQueue::new();
        let first = queue.request_builder(pos(1, 1, "W1N1"), stamp("W1N1", Role::Builder));
        let second = queue.request_mapper(pos(1, 1, "W1N1"), stamp("W1N1", Role::Mapper));
        assert_eq!(first, RequestId(0));
        assert_eq!(second, RequestId(1));
        assert_eq!(queue.pending().len(), 2);
        queue.init();
        assert!(queue.pending().is_empty());
        let again = queue.request_charger(pos(1, 1, "W1N1"), stamp("W1N1", Role::Charger));
        assert_eq!(again, RequestId(0));
    }

    #[test]
    fn is_requested_matches_the_stamped_tag() {
        let mut queue = JobQueue::new();
        let builders = WorkerTag::new(room("W1N1"), Role::Builder);
        assert!(!queue.is_requested(&builders));
        queue.request_builder(pos(1, 1, "W1N1"), WorkerMemory::new(builders.clone()));
        assert!(queue.is_requested(&builders));
        assert!(!queue.is_requested(&WorkerTag::new(room("W2N1"), Role::Builder)));
        queue.init();
        assert!(!queue.is_requested(&builders));
    }

    #[test]
    fn fresh_colony_spawns_a_harvester_for_300() {
        let mut world = SimWorld::new();
        let spawn = make_colony(&mut world, "W1N1");
        let banks = make_banks(&world);
        let mut queue = JobQueue::new();
        let id = queue.request_harvester(pos(10, 10, "W1N1"), stamp("W1N1", Role::Harvester));

        let report = queue.resolve(&mut world, &banks);
        let made = report.get(id).unwrap();
        assert_eq!(made.job_type, JobType::Harvester);
        assert_eq!(made.amount, 300);
        assert_eq!(made.spawn, spawn);
        assert_eq!(
            made.body,
            vec![BodyPart::Move, BodyPart::Carry, BodyPart::Work, BodyPart::Work]
        );
        assert!(made.worker.as_str().starts_with("harvester "));
        assert!(world.worker(&made.worker).unwrap().spawning);
        assert!(queue.pending().is_empty());
    }

    #[test]
    fn at_most_one_fabrication_per_spawn() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        let banks = make_banks(&world);
        let mut queue = JobQueue::new();
        for _ in 0..3 {
            queue.request_harvester(pos(10, 10, "W1N1"), stamp("W1N1", Role::Harvester));
        }
        queue.request_defender(pos(20, 20, "W1N1"), stamp("W1N1", Role::Defender));

        let report = queue.resolve(&mut world, &banks);
        assert_eq!(report.len(), 4);
        assert_eq!(report.fabricated_count(), 1);
        // Defense outranks harvesting.
        assert_eq!(report.get(RequestId(3)).unwrap().job_type, JobType::Defend);
        assert_eq!(world.workers().len(), 1);
    }

    #[test]
    fn oldest_request_of_the_funded_type_wins() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        let banks = make_banks(&world);
        let mut queue = JobQueue::new();
        let first = queue.request_harvester(pos(10, 10, "W1N1"), stamp("W1N1", Role::Harvester));
        queue.request_harvester(pos(12, 10, "W1N1"), stamp("W1N1", Role::Harvester));

        let report = queue.resolve(&mut world, &banks);
        assert!(report.get(first).is_some());
        assert_eq!(report.fabricated_count(), 1);
    }

    #[test]
    fn busy_spawn_makes_nothing() {
        let mut world = SimWorld::new();
        let spawn = make_colony(&mut world, "W1N1");
        let status = world.fabricate(&spawn, &[BodyPart::Move], &WorkerId::from("busy"));
        assert!(status.is_ok());
        let banks = make_banks(&world);
        let mut queue = JobQueue::new();
        queue.request_harvester(pos(10, 10, "W1N1"), stamp("W1N1", Role::Harvester));
        let report = queue.resolve(&mut world, &banks);
        assert_eq!(report.fabricated_count(), 0);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn waiting_funding_makes_nothing() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        // Support roles need at least 300 spendable.
        let mut banks = BankRegistry::new(BankConfig::default());
        banks.bank_mut(room("W1N1")).record_sample(250, 300).unwrap();
        let mut queue = JobQueue::new();
        queue.request_builder(pos(10, 10, "W1N1"), stamp("W1N1", Role::Builder));
        let report = queue.resolve(&mut world, &banks);
        assert_eq!(report.fabricated_count(), 0);
    }

    #[test]
    fn local_requests_beat_remote_ones() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        let remote: RoomName = room("W2N1");
        world.add_room(remote);
        let banks = make_banks(&world);
        let mut queue = JobQueue::new();
        // A higher-priority request from a room without a spawn.
        queue.request_defender(pos(5, 5, "W2N1"), stamp("W2N1", Role::Defender));
        let local = queue.request_builder(pos(10, 10, "W1N1"), stamp("W1N1", Role::Builder));

        let report = queue.resolve(&mut world, &banks);
        assert_eq!(report.fabricated_count(), 1);
        assert_eq!(report.get(local).unwrap().job_type, JobType::Builder);
    }

    #[test]
    fn remote_requests_are_served_without_local_demand() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        world.add_room(room("W2N1"));
        let banks = make_banks(&world);
        let mut queue = JobQueue::new();
        let id = queue.request_bootstrapper(
            Position::center_of(room("W2N1")),
            stamp("W2N1", Role::Bootstrapper),
        );
        let report = queue.resolve(&mut world, &banks);
        let made = report.get(id).unwrap();
        assert_eq!(made.stamp.tag.colony, room("W2N1"));
        assert_eq!(made.amount, 300);
    }

    #[test]
    fn unaffordable_claimer_does_not_starve_a_mapper() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        world.add_room(room("W2N1"));
        let mut banks = BankRegistry::new(BankConfig::default());
        banks.bank_mut(room("W1N1")).record_sample(550, 550).unwrap();
        let mut queue = JobQueue::new();
        let claim = queue.request_claimer(
            Position::center_of(room("W2N1")),
            stamp("W2N1", Role::Claimer),
        );
        let mapper = queue.request_mapper(
            Position::center_of(room("W2N1")),
            stamp("W2N1", Role::Mapper),
        );

        let report = queue.resolve(&mut world, &banks);
        assert_eq!(report.fabricated_count(), 1);
        assert!(report.get(claim).is_none());
        let made = report.get(mapper).unwrap();
        assert_eq!(made.job_type, JobType::Mapper);
        assert_eq!(made.amount, 100);
        assert_eq!(made.body, vec![BodyPart::Move]);
    }

    #[test]
    fn unknown_bank_is_skipped() {
        let mut world = SimWorld::new();
        make_colony(&mut world, "W1N1");
        let banks = BankRegistry::new(BankConfig::default());
        let mut queue = JobQueue::new();
        queue.request_harvester(pos(10, 10, "W1N1"), stamp("W1N1", Role::Harvester));
        let report = queue.resolve(&mut world, &banks);
        assert_eq!(report.fabricated_count(), 0);
        assert!(world.workers().is_empty());
    }
}
