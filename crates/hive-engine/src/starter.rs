//! The starting world of a harness run.
//!
//! Two rooms side by side: `W1N1`, a fresh colony with a level 1
//! controller, one spawn, two sources and a hydrogen deposit, and `W2N1`,
//! an unclaimed neighbour with one source and a neutral controller.

use hive_types::{Position, Resource, RoomName, StructureKind, TypesError};
use hive_world::{PLAYER, SimWorld};
use tracing::info;

/// Name of the home room.
pub const HOME: &str = "W1N1";

/// Name of the unclaimed neighbour.
pub const NEIGHBOUR: &str = "W2N1";

/// Energy a starter source regenerates to.
const SOURCE_CAPACITY: u32 = 3_000;

/// Lay out the starting world.
pub fn create_starting_world() -> Result<SimWorld, TypesError> {
    let home: RoomName = HOME.parse()?;
    let neighbour: RoomName = NEIGHBOUR.parse()?;
    let mut world = SimWorld::new();

    world.add_room(home).add_room(neighbour);

    world.add_controller(Position::new(40, 40, home)?, 1, Some(PLAYER));
    world.add_structure(StructureKind::Spawn, Position::new(25, 25, home)?);
    world.add_source(Position::new(10, 10, home)?, SOURCE_CAPACITY);
    world.add_source(Position::new(38, 12, home)?, SOURCE_CAPACITY);
    world.add_mineral(Position::new(12, 38, home)?, Resource::Hydrogen, 70_000);
    // A short ridge between the spawn and the first source.
    for x in 14..=20 {
        world.add_wall(Position::new(x, 16, home)?);
    }

    world.add_controller(Position::new(25, 10, neighbour)?, 0, None);
    world.add_source(Position::new(30, 30, neighbour)?, SOURCE_CAPACITY);

    info!(home = %home, neighbour = %neighbour, "starting world created");
    Ok(world)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_world::World;

    use super::*;

    #[test]
    fn home_is_a_fresh_colony() {
        let world = create_starting_world().unwrap();
        let home: RoomName = HOME.parse().unwrap();
        let controller = world.controller(home).unwrap();
        assert!(controller.my);
        assert_eq!(controller.level, 1);
        assert_eq!(world.sources(home).len(), 2);
        assert_eq!(world.minerals(home).len(), 1);
        assert!(world.workers().is_empty());
        let energy = world.room_energy(home).unwrap();
        assert_eq!(energy.available, energy.capacity);
    }

    #[test]
    fn neighbour_is_reachable_and_unclaimed() {
        let world = create_starting_world().unwrap();
        let home: RoomName = HOME.parse().unwrap();
        let neighbour: RoomName = NEIGHBOUR.parse().unwrap();
        assert_eq!(world.exits(home), vec![neighbour]);
        assert!(!world.controller(neighbour).unwrap().my);
    }
}
