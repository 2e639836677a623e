//! Construction site placement for the colony's feature flags.
//!
//! Each structure kind is tried on the tiles of a spiral around an anchor
//! (spawn, controller or mineral) until the host accepts a site. Extensions
//! fill a checkerboard around the spawn and other buildings take the
//! opposite squares, so every building keeps a walkable neighbour.

use hive_agents::lookup::{controller_container, my_spawns, structures_of};
use hive_types::{Position, ROOM_SIZE, RoomName, StructureKind, StructureSnapshot};
use hive_world::{PathGoal, World, spiral, traffic_cost_matrix};
use tracing::{debug, info};

/// Range from the controller the controller container may sit at.
const CONTROLLER_CONTAINER_RADIUS: u8 = 2;

/// How far from the spawn buildings are placed.
const SPAWN_RADIUS: u8 = 12;

/// Tiles closer to the room border than this stay free.
const BORDER_MARGIN: u8 = 5;

/// Extensions allowed at each controller level.
pub const fn extension_allowance(level: u8) -> usize {
    match level {
        0 | 1 => 0,
        2 => 5,
        3 => 10,
        4 => 20,
        5 => 30,
        6 => 40,
        7 => 50,
        _ => 60,
    }
}

/// Towers allowed at each controller level.
pub const fn tower_allowance(level: u8) -> usize {
    match level {
        0..=2 => 0,
        3 | 4 => 1,
        5 | 6 => 2,
        7 => 3,
        _ => 6,
    }
}

const fn on_checkerboard(pos: &Position) -> bool {
    (pos.x ^ pos.y) & 1 == 0
}

const fn inside_margin(pos: &Position) -> bool {
    pos.x > BORDER_MARGIN
        && pos.y > BORDER_MARGIN
        && pos.x < ROOM_SIZE.saturating_sub(BORDER_MARGIN)
        && pos.y < ROOM_SIZE.saturating_sub(BORDER_MARGIN)
}

/// Site placement for one colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitePlanner {
    room: RoomName,
}

impl SitePlanner {
    /// Planner for `room`.
    pub const fn new(room: RoomName) -> Self {
        Self { room }
    }

    /// Structures and sites of `kind` in the room.
    fn planned<W>(&self, world: &W, kind: StructureKind) -> usize
    where
        W: World + ?Sized,
    {
        let built = structures_of(world, self.room, kind).len();
        let sites = world
            .sites(self.room)
            .iter()
            .filter(|s| s.kind == kind)
            .count();
        built.saturating_add(sites)
    }

    fn spawn<W>(&self, world: &W) -> Option<StructureSnapshot>
    where
        W: World + ?Sized,
    {
        my_spawns(world, self.room).into_iter().next()
    }

    /// Whether a tile is next to a source, mineral or the controller.
    fn blocks_access<W>(&self, world: &W, pos: &Position) -> bool
    where
        W: World + ?Sized,
    {
        world
            .sources(self.room)
            .iter()
            .map(|s| s.pos)
            .chain(world.minerals(self.room).iter().map(|m| m.pos))
            .chain(world.controller(self.room).map(|c| c.pos))
            .any(|anchor| anchor.in_range_to(pos, 1))
    }

    /// Place one `kind` site on the first accepted tile around `center`.
    fn place<W, F>(
        &self,
        world: &mut W,
        center: Position,
        radius: u8,
        kind: StructureKind,
        accept: F,
    ) -> Option<Position>
    where
        W: World + ?Sized,
        F: Fn(&W, &Position) -> bool,
    {
        let tile = spiral(center, radius).into_iter().find(|tile| {
            !world.is_wall(tile)
                && accept(&*world, tile)
                && world.create_site(*tile, kind).is_ok()
        })?;
        info!(room = %self.room, pos = %tile, ?kind, "site placed");
        Some(tile)
    }

    /// Place a building near the spawn, off the extension checkerboard.
    fn place_near_spawn<W>(&self, world: &mut W, kind: StructureKind) -> Option<Position>
    where
        W: World + ?Sized,
    {
        let spawn = self.spawn(&*world)?;
        self.place(world, spawn.pos, SPAWN_RADIUS, kind, |w, tile| {
            !on_checkerboard(tile)
                && inside_margin(tile)
                && tile.range_to(&spawn.pos) >= 2
                && !self.blocks_access(w, tile)
        })
    }

    /// Place the container next to the controller unless one exists or is
    /// planned.
    pub fn controller_container<W>(&self, world: &mut W) -> Option<Position>
    where
        W: World + ?Sized,
    {
        let controller = world.controller(self.room)?;
        if controller_container(&*world, self.room).is_some() {
            return None;
        }
        let planned = world.sites(self.room).iter().any(|s| {
            s.kind == StructureKind::Container
                && s.pos
                    .in_range_to(&controller.pos, u32::from(CONTROLLER_CONTAINER_RADIUS))
        });
        if planned {
            debug!(room = %self.room, "controller container already planned");
            return None;
        }
        self.place(
            world,
            controller.pos,
            CONTROLLER_CONTAINER_RADIUS,
            StructureKind::Container,
            |_, tile| *tile != controller.pos,
        )
    }

    /// Fill the level's extension allowance. Returns the sites placed.
    pub fn extensions<W>(&self, world: &mut W) -> usize
    where
        W: World + ?Sized,
    {
        let Some(level) = world.controller(self.room).map(|c| c.level) else {
            return 0;
        };
        let Some(spawn) = self.spawn(&*world) else {
            return 0;
        };
        let missing = extension_allowance(level)
            .saturating_sub(self.planned(&*world, StructureKind::Extension));
        let mut placed = 0_usize;
        while placed < missing {
            let tile = self.place(
                world,
                spawn.pos,
                SPAWN_RADIUS,
                StructureKind::Extension,
                |w, tile| {
                    on_checkerboard(tile)
                        && inside_margin(tile)
                        && tile.range_to(&spawn.pos) >= 2
                        && !self.blocks_access(w, tile)
                },
            );
            if tile.is_none() {
                break;
            }
            placed = placed.saturating_add(1);
        }
        placed
    }

    /// Place one tower if the level allows more.
    pub fn tower<W>(&self, world: &mut W) -> Option<Position>
    where
        W: World + ?Sized,
    {
        let level = world.controller(self.room)?.level;
        if self.planned(&*world, StructureKind::Tower) >= tower_allowance(level) {
            return None;
        }
        self.place_near_spawn(world, StructureKind::Tower)
    }

    /// Place the storage unless one exists or is planned.
    pub fn storage<W>(&self, world: &mut W) -> Option<Position>
    where
        W: World + ?Sized,
    {
        if self.planned(&*world, StructureKind::Storage) > 0 {
            return None;
        }
        self.place_near_spawn(world, StructureKind::Storage)
    }

    /// Place the terminal unless one exists or is planned.
    pub fn terminal<W>(&self, world: &mut W) -> Option<Position>
    where
        W: World + ?Sized,
    {
        if self.planned(&*world, StructureKind::Terminal) > 0 {
            return None;
        }
        self.place_near_spawn(world, StructureKind::Terminal)
    }

    /// Place an extractor on every mineral lacking one. Returns the sites
    /// placed.
    pub fn extractors<W>(&self, world: &mut W) -> usize
    where
        W: World + ?Sized,
    {
        let taken: Vec<Position> = structures_of(&*world, self.room, StructureKind::Extractor)
            .into_iter()
            .map(|s| s.pos)
            .chain(
                world
                    .sites(self.room)
                    .into_iter()
                    .filter(|s| s.kind == StructureKind::Extractor)
                    .map(|s| s.pos),
            )
            .collect();
        let mut placed = 0_usize;
        for mineral in world.minerals(self.room) {
            if taken.contains(&mineral.pos) {
                continue;
            }
            if world
                .create_site(mineral.pos, StructureKind::Extractor)
                .is_ok()
            {
                info!(room = %self.room, pos = %mineral.pos, "extractor site placed");
                placed = placed.saturating_add(1);
            }
        }
        placed
    }

    /// Lay road sites along the paths from the spawn to every source and
    /// to the controller. Returns the sites placed.
    pub fn roads<W>(&self, world: &mut W) -> usize
    where
        W: World + ?Sized,
    {
        let Some(spawn) = self.spawn(&*world) else {
            return 0;
        };
        let targets: Vec<Position> = world
            .sources(self.room)
            .iter()
            .map(|s| s.pos)
            .chain(world.controller(self.room).map(|c| c.pos))
            .collect();
        let mut placed = 0_usize;
        for target in targets {
            let path = {
                let view = &*world;
                let costs = |room: RoomName| Some(traffic_cost_matrix(view, room, false));
                view.search_path(spawn.pos, &[PathGoal::new(target, 1)], &costs)
            };
            let Some(path) = path else {
                debug!(room = %self.room, %target, "no road path");
                continue;
            };
            for tile in path.into_iter().filter(|t| t.room == self.room) {
                if world.create_site(tile, StructureKind::Road).is_ok() {
                    placed = placed.saturating_add(1);
                }
            }
        }
        if placed > 0 {
            info!(room = %self.room, placed, "road sites placed");
        }
        placed
    }
}
