//! Routing job requests to fabrication points.

use hive_types::{Position, RoomName, StructureKind, StructureSnapshot};
use hive_world::{PathGoal, World, closest_by_range, traffic_cost_matrix};

/// Our spawns in visible rooms that can accept a fabrication this tick.
pub fn free_spawns<W>(world: &W) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    world
        .rooms()
        .into_iter()
        .flat_map(|room| world.structures(room))
        .filter(|s| s.kind == StructureKind::Spawn && s.my && !s.spawning)
        .collect()
}

/// The spawn serving a request at `target`.
///
/// One path search runs from the target to every spawn, through visible
/// rooms only, treating workers as obstacles. The spawn closest by
/// Manhattan distance to the first step of that path wins. Without a path
/// the spawn closest by linear range is used.
pub fn find_closest_spawn<'a, W>(
    world: &W,
    target: Position,
    spawns: &'a [StructureSnapshot],
) -> Option<&'a StructureSnapshot>
where
    W: World + ?Sized,
{
    if spawns.is_empty() {
        return None;
    }
    let visible = world.rooms();
    let goals: Vec<PathGoal> = spawns.iter().map(|s| PathGoal::new(s.pos, 1)).collect();
    let costs = |room: RoomName| {
        visible
            .contains(&room)
            .then(|| traffic_cost_matrix(world, room, true))
    };
    match world.search_path(target, &goals, &costs) {
        Some(path) => {
            let anchor = path.first().copied().unwrap_or(target);
            spawns.iter().min_by_key(|s| anchor.manhattan_to(&s.pos))
        }
        None => closest_by_range(&target, spawns, |s| s.pos),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::{BodyPart, ObjectId, WorkerId};
    use hive_world::{PLAYER, SimWorld};

    use super::*;

    fn room(name: &str) -> RoomName {
        name.parse().unwrap()
    }

    fn pos(x: u8, y: u8, name: &str) -> Position {
        Position::new(x, y, room(name)).unwrap()
    }

    fn make_two_colonies() -> (SimWorld, ObjectId, ObjectId) {
        let mut world = SimWorld::new();
        world.add_room(room("W1N1"));
        world.add_room(room("W2N1"));
        world.add_controller(pos(40, 40, "W1N1"), 2, Some(PLAYER));
        world.add_controller(pos(40, 40, "W2N1"), 2, Some(PLAYER));
        let east = world.add_structure(StructureKind::Spawn, pos(25, 25, "W1N1"));
        let west = world.add_structure(StructureKind::Spawn, pos(25, 25, "W2N1"));
        (world, east, west)
    }

    #[test]
    fn busy_spawns_are_not_free() {
        let (mut world, east, west) = make_two_colonies();
        assert_eq!(free_spawns(&world).len(), 2);
        let status = world.fabricate(&east, &[BodyPart::Move], &WorkerId::from("m"));
        assert!(status.is_ok());
        let free = free_spawns(&world);
        assert_eq!(free.len(), 1);
        assert_eq!(free.first().unwrap().id, west);
    }

    #[test]
    fn request_routes_to_the_nearest_spawn() {
        let (world, east, west) = make_two_colonies();
        let spawns = free_spawns(&world);
        let near_east = find_closest_spawn(&world, pos(10, 10, "W1N1"), &spawns).unwrap();
        assert_eq!(near_east.id, east);
        let near_west = find_closest_spawn(&world, pos(45, 10, "W2N1"), &spawns).unwrap();
        assert_eq!(near_west.id, west);
    }

    #[test]
    fn unreachable_target_falls_back_to_range() {
        let (mut world, east, _) = make_two_colonies();
        // Box the target in.
        let target = pos(10, 10, "W1N1");
        for tile in target.neighbours() {
            world.add_wall(tile);
        }
        let spawns = free_spawns(&world);
        let found = find_closest_spawn(&world, target, &spawns).unwrap();
        assert_eq!(found.id, east);
    }

    #[test]
    fn no_spawns_no_route() {
        let world = SimWorld::new();
        assert!(find_closest_spawn(&world, pos(1, 1, "W1N1"), &[]).is_none());
    }
}
