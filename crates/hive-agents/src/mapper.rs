//! Room intel: what neighbouring rooms look like and when we last saw them.
//!
//! Every visible room is recorded each scan. Rooms around our colonies that
//! were never seen or went stale are planned for a visit, and mappers are
//! sent to them one room each.

use std::collections::{BTreeSet, VecDeque};

use hive_population::JobQueue;
use hive_types::{
    ActionStatus, IntelLog, IntelState, Position, Role, RoomName, StructureKind, WorkerMemory,
    WorkerTag,
};
use hive_world::World;
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::crew::{move_to, tagged_workers, update_memory};
use crate::error::TaskError;

/// Distance from a room's centre at which a mapper counts as arrived.
pub const MAPPER_ARRIVAL_RANGE: u32 = 20;

/// Rooms worth a visit, nearest first.
///
/// Walks exits breadth-first from every room we control, up to `depth`
/// rooms away. Unknown and stale rooms are planned and not walked through;
/// fresh rooms are walked through when they allow travel.
pub fn compute_visit_plan<W>(
    world: &W,
    intel: &IntelLog,
    now: u64,
    depth: usize,
) -> Vec<RoomName>
where
    W: World + ?Sized,
{
    let owned: Vec<RoomName> = world
        .rooms()
        .into_iter()
        .filter(|room| world.controller(*room).is_some_and(|c| c.my))
        .collect();
    let mut seen: BTreeSet<RoomName> = owned.iter().copied().collect();
    let mut frontier: VecDeque<(RoomName, usize)> = owned.into_iter().map(|r| (r, 0)).collect();
    let mut plan = Vec::new();

    while let Some((room, distance)) = frontier.pop_front() {
        if distance >= depth {
            continue;
        }
        for next in world.exits(room) {
            if !seen.insert(next) {
                continue;
            }
            if !intel.was_visited_lately(next, now) {
                plan.push(next);
            } else if intel.allows_travel(next) {
                frontier.push_back((next, distance.saturating_add(1)));
            }
        }
    }
    plan
}

fn observe<W>(world: &W, room: RoomName, now: u64) -> IntelState
where
    W: World + ?Sized,
{
    let power_ttl = world
        .structures(room)
        .into_iter()
        .filter(|s| s.kind == StructureKind::PowerBank)
        .find_map(|s| s.ticks_to_decay)
        .unwrap_or(0);
    IntelState {
        timestamp: now,
        is_hostile: !world.hostiles(room).is_empty(),
        power_ttl,
        is_reachable: true,
    }
}

/// Record intel, plan visits, request and drive mappers.
///
/// Returns the visit plan of this tick.
pub fn scan<W>(
    world: &mut W,
    queue: &mut JobQueue,
    intel: &mut IntelLog,
    config: &AgentConfig,
) -> Result<Vec<RoomName>, TaskError>
where
    W: World + ?Sized,
{
    let now = world.time();
    for room in world.rooms() {
        if intel.push_state(room, observe(&*world, room, now)) {
            debug!(%room, "intel recorded");
        }
    }

    let plan = compute_visit_plan(&*world, intel, now, config.intel_depth);
    let Some(home) = world
        .rooms()
        .into_iter()
        .find(|room| world.controller(*room).is_some_and(|c| c.my))
    else {
        return Ok(plan);
    };
    let tag = WorkerTag::new(home, Role::Mapper);
    let mappers = tagged_workers(&*world, &tag);
    if mappers.len() < plan.len()
        && let Some(first) = plan.first()
    {
        queue.request_mapper(Position::center_of(*first), WorkerMemory::new(tag));
    }

    let mut assigned: BTreeSet<RoomName> = mappers
        .iter()
        .filter_map(|m| m.memory.as_ref().and_then(|mem| mem.meta.target_room))
        .collect();
    for mut mapper in mappers.into_iter().filter(|m| !m.spawning) {
        let mut target = mapper.memory.as_ref().and_then(|m| m.meta.target_room);
        if target == Some(mapper.pos.room) {
            update_memory(world, &mut mapper, |m| m.meta.target_room = None)?;
            target = None;
        }
        if target.is_none() {
            let from = mapper.pos.room;
            target = plan
                .iter()
                .copied()
                .filter(|room| !assigned.contains(room))
                .min_by_key(|room| room.linear_distance(from));
            if let Some(room) = target {
                assigned.insert(room);
                update_memory(world, &mut mapper, |m| m.meta.target_room = Some(room))?;
                debug!(worker = %mapper.id, %room, "mapper assigned");
            }
        }
        let Some(room) = target else {
            continue;
        };
        let status = move_to(
            world,
            &mapper,
            Position::center_of(room),
            MAPPER_ARRIVAL_RANGE,
        );
        if status == ActionStatus::NoPath {
            warn!(worker = %mapper.id, %room, "room unreachable");
            intel.push_state(
                room,
                IntelState {
                    timestamp: now,
                    is_hostile: false,
                    power_ttl: 0,
                    is_reachable: false,
                },
            );
            update_memory(world, &mut mapper, |m| m.meta.target_room = None)?;
        }
    }

    Ok(plan)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{BodyPart, JobType};
    use hive_world::{PLAYER, SimWorld};

    use super::*;

    fn room(name: &str) -> RoomName {
        name.parse().unwrap()
    }

    fn make_world() -> SimWorld {
        let mut world = SimWorld::new();
        world.add_room(room("W1N1"));
        world.add_hidden_room(room("W2N1"));
        world.add_hidden_room(room("W3N1"));
        world.add_controller(
            Position::new(40, 40, room("W1N1")).unwrap(),
            3,
            Some(PLAYER),
        );
        world
    }

    fn seen(timestamp: u64, is_hostile: bool) -> IntelState {
        IntelState {
            timestamp,
            is_hostile,
            power_ttl: 0,
            is_reachable: true,
        }
    }

    #[test]
    fn plan_stops_at_unknown_and_walks_through_fresh_rooms() {
        let world = make_world();
        let mut intel = IntelLog::new();
        assert_eq!(compute_visit_plan(&world, &intel, 10, 2), vec![room("W2N1")]);

        intel.push_state(room("W2N1"), seen(0, false));
        assert_eq!(compute_visit_plan(&world, &intel, 10, 2), vec![room("W3N1")]);
        assert!(compute_visit_plan(&world, &intel, 10, 1).is_empty());
        assert_eq!(compute_visit_plan(&world, &intel, 200, 2), vec![room("W2N1")]);
    }

    #[test]
    fn hostile_rooms_are_not_walked_through() {
        let world = make_world();
        let mut intel = IntelLog::new();
        intel.push_state(room("W2N1"), seen(0, true));
        assert!(compute_visit_plan(&world, &intel, 10, 2).is_empty());
    }

    #[test]
    fn scan_records_visible_rooms_and_requests_a_mapper() {
        let mut world = make_world();
        let mut queue = JobQueue::new();
        let mut intel = IntelLog::new();
        let plan = scan(&mut world, &mut queue, &mut intel, &AgentConfig::default()).unwrap();
        assert_eq!(plan, vec![room("W2N1")]);
        assert!(intel.last(room("W1N1")).is_some());
        assert!(intel.last(room("W2N1")).is_none());
        let request = queue.pending().first().unwrap();
        assert_eq!(request.job_type, JobType::Mapper);
        assert_eq!(request.target, Position::center_of(room("W2N1")));
    }

    #[test]
    fn mapper_is_sent_to_the_planned_room() {
        let mut world = make_world();
        let tag = WorkerTag::new(room("W1N1"), Role::Mapper);
        let id = world.add_worker(
            "mapper a",
            Position::new(2, 25, room("W1N1")).unwrap(),
            vec![BodyPart::Move],
            Some(WorkerMemory::new(tag)),
        );
        let mut queue = JobQueue::new();
        let mut intel = IntelLog::new();
        scan(&mut world, &mut queue, &mut intel, &AgentConfig::default()).unwrap();
        assert!(queue.pending().is_empty());
        let mapper = world.worker(&id).unwrap();
        assert_eq!(
            mapper.memory.unwrap().meta.target_room,
            Some(room("W2N1"))
        );
        assert_eq!((mapper.pos.x, mapper.pos.room), (1, room("W1N1")));
    }

    #[test]
    fn power_banks_are_recorded() {
        let mut world = make_world();
        world.add_room(room("W1N2"));
        world.add_foreign_structure(
            StructureKind::PowerBank,
            Position::new(20, 20, room("W1N2")).unwrap(),
        );
        let mut queue = JobQueue::new();
        let mut intel = IntelLog::new();
        scan(&mut world, &mut queue, &mut intel, &AgentConfig::default()).unwrap();
        assert_eq!(intel.last(room("W1N2")).unwrap().power_ttl, 5_000);
    }
}
