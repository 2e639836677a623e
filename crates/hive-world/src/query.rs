//! Spatial queries shared by the task machines and the fabricator.

use hive_types::{Position, ROOM_SIZE, RoomName, StructureKind};

use crate::cost_matrix::{CostMatrix, IMPASSABLE, PathGoal, ROAD_COST};
use crate::world::World;

/// The item closest to `from` by linear range. Ties keep the earliest item.
pub fn closest_by_range<'a, T>(
    from: &Position,
    items: &'a [T],
    pos_of: impl Fn(&T) -> Position,
) -> Option<&'a T> {
    items.iter().min_by_key(|item| from.range_to(&pos_of(item)))
}

/// Items within `range` of `from`.
pub fn in_range<'a, T>(
    from: &Position,
    items: &'a [T],
    range: u32,
    pos_of: impl Fn(&T) -> Position,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| from.in_range_to(&pos_of(item), range))
        .collect()
}

/// The item reached first by a single multi-goal path search from `from`.
///
/// Every item becomes a goal at `range`. The winner is the first item whose
/// tile is within `range` of the path end.
pub fn closest_by_path<'a, W, T>(
    world: &W,
    from: &Position,
    items: &'a [T],
    range: u32,
    pos_of: impl Fn(&T) -> Position,
) -> Option<&'a T>
where
    W: World + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    let goals: Vec<PathGoal> = items
        .iter()
        .map(|item| PathGoal::new(pos_of(item), range))
        .collect();
    let costs = |room: RoomName| Some(traffic_cost_matrix(world, room, false));
    let path = world.search_path(*from, &goals, &costs)?;
    let end = path.last().copied().unwrap_or(*from);
    items
        .iter()
        .find(|item| end.in_range_to(&pos_of(item), range))
}

/// Cost matrix favouring roads and blocking solid structures.
///
/// Containers and our own ramparts stay walkable. With `avoid_workers`,
/// tiles occupied by any worker (ours or hostile) are blocked too.
pub fn traffic_cost_matrix<W>(world: &W, room: RoomName, avoid_workers: bool) -> CostMatrix
where
    W: World + ?Sized,
{
    let mut costs = CostMatrix::new();
    for structure in world.structures(room) {
        match structure.kind {
            StructureKind::Road => costs.set(structure.pos.x, structure.pos.y, ROAD_COST),
            StructureKind::Container => {}
            StructureKind::Rampart if structure.my => {}
            _ => costs.set(structure.pos.x, structure.pos.y, IMPASSABLE),
        }
    }
    if avoid_workers {
        for worker in world.workers_in(room) {
            costs.set(worker.pos.x, worker.pos.y, IMPASSABLE);
        }
        for hostile in world.hostiles(room) {
            costs.set(hostile.pos.x, hostile.pos.y, IMPASSABLE);
        }
    }
    costs
}

/// Path length between two tiles with default traffic costs, if reachable.
pub fn path_length<W>(world: &W, from: Position, to: Position, range: u32) -> Option<usize>
where
    W: World + ?Sized,
{
    let costs = |room: RoomName| Some(traffic_cost_matrix(world, room, false));
    world
        .search_path(from, &[PathGoal::new(to, range)], &costs)
        .map(|path| path.len())
}

/// Buildable tiles around `center`, ring by ring out to `max_radius`.
///
/// Rings are walked row by row, so the order is deterministic. Border
/// tiles (exits) and tiles outside the room are skipped.
pub fn spiral(center: Position, max_radius: u8) -> Vec<Position> {
    let last = i32::from(ROOM_SIZE.saturating_sub(1));
    let (cx, cy) = (i32::from(center.x), i32::from(center.y));
    let mut tiles = Vec::new();
    for radius in 0..=i32::from(max_radius) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let (x, y) = (cx.saturating_add(dx), cy.saturating_add(dy));
                if x <= 0 || y <= 0 || x >= last || y >= last {
                    continue;
                }
                if let (Ok(x), Ok(y)) = (u8::try_from(x), u8::try_from(y))
                    && let Ok(pos) = Position::new(x, y, center.room)
                {
                    tiles.push(pos);
                }
            }
        }
    }
    tiles
}
