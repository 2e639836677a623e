//! Structure lookups shared by the machines and the colony controller.

use hive_types::{Position, RoomName, StructureKind, StructureSnapshot, TombstoneSnapshot};
use hive_world::World;

/// A container this close to the controller feeds chargers and is never
/// drained by logistics.
pub const CONTROLLER_CONTAINER_RANGE: u32 = 2;

/// Structures of one kind we may use in `room`.
///
/// Roads and containers are public; everything else must be ours.
pub fn structures_of<W>(
    world: &W,
    room: RoomName,
    kind: StructureKind,
) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    world
        .structures(room)
        .into_iter()
        .filter(|s| s.kind == kind && (s.my || is_public(kind)))
        .collect()
}

const fn is_public(kind: StructureKind) -> bool {
    matches!(kind, StructureKind::Road | StructureKind::Container)
}

/// Our spawns in `room`.
pub fn my_spawns<W>(world: &W, room: RoomName) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    structures_of(world, room, StructureKind::Spawn)
}

/// Our storage in `room`.
pub fn storage<W>(world: &W, room: RoomName) -> Option<StructureSnapshot>
where
    W: World + ?Sized,
{
    structures_of(world, room, StructureKind::Storage)
        .into_iter()
        .next()
}

/// The container next to the controller of `room`.
pub fn controller_container<W>(world: &W, room: RoomName) -> Option<StructureSnapshot>
where
    W: World + ?Sized,
{
    let controller = world.controller(room)?;
    structures_of(world, room, StructureKind::Container)
        .into_iter()
        .find(|c| c.pos.in_range_to(&controller.pos, CONTROLLER_CONTAINER_RANGE))
}

/// Containers of `room` other than the controller container.
pub fn source_containers<W>(world: &W, room: RoomName) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    let controller = world.controller(room).map(|c| c.pos);
    structures_of(world, room, StructureKind::Container)
        .into_iter()
        .filter(|c| {
            controller.is_none_or(|pos| !c.pos.in_range_to(&pos, CONTROLLER_CONTAINER_RANGE))
        })
        .collect()
}

/// Containers and storage of `room` holding any energy.
pub fn energy_stores<W>(world: &W, room: RoomName) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    world
        .structures(room)
        .into_iter()
        .filter(|s| {
            matches!(s.kind, StructureKind::Container | StructureKind::Storage)
                && (s.my || is_public(s.kind))
                && s.energy() > 0
        })
        .collect()
}

/// Roads and containers of `room` below `percent` hit points.
pub fn worn_infrastructure<W>(
    world: &W,
    room: RoomName,
    percent: u32,
) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    world
        .structures(room)
        .into_iter()
        .filter(|s| is_public(s.kind) && s.hits_below(percent))
        .collect()
}

/// Every damaged structure of `room` we maintain.
pub fn damaged_structures<W>(world: &W, room: RoomName) -> Vec<StructureSnapshot>
where
    W: World + ?Sized,
{
    world
        .structures(room)
        .into_iter()
        .filter(|s| {
            (s.my || is_public(s.kind))
                && s.is_damaged()
                && !matches!(s.kind, StructureKind::Controller | StructureKind::PowerBank)
        })
        .collect()
}

/// Tombstones of `room` holding minerals.
pub fn mineral_tombstones<W>(world: &W, room: RoomName) -> Vec<TombstoneSnapshot>
where
    W: World + ?Sized,
{
    world
        .tombstones(room)
        .into_iter()
        .filter(|t| t.store.minerals().next().is_some())
        .collect()
}

/// Whether an extractor sits on `pos`.
pub fn has_extractor<W>(world: &W, pos: Position) -> bool
where
    W: World + ?Sized,
{
    structures_of(world, pos.room, StructureKind::Extractor)
        .iter()
        .any(|s| s.pos == pos)
}
