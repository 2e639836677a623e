//! Tower defense: shoot hostiles, repair with surplus energy.

use hive_types::{RoomName, StructureKind, StructureSnapshot};
use hive_world::{TowerAction, World, closest_by_range};
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::lookup::{damaged_structures, structures_of, worn_infrastructure};

/// Towers of one colony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TowerDefense {
    colony: RoomName,
}

impl TowerDefense {
    /// Towers of `colony`.
    pub const fn new(colony: RoomName) -> Self {
        Self { colony }
    }

    /// Give every tower one action. Returns how many towers acted.
    ///
    /// A tower shoots the closest hostile. Without hostiles, and only above
    /// the configured energy share, it repairs the closest worn road or
    /// container, else the closest damaged structure.
    pub fn activate<W>(&self, world: &mut W, config: &AgentConfig) -> usize
    where
        W: World + ?Sized,
    {
        let towers = structures_of(&*world, self.colony, StructureKind::Tower);
        if towers.is_empty() {
            return 0;
        }
        let hostiles = world.hostiles(self.colony);
        let worn = worn_infrastructure(&*world, self.colony, config.infra_repair_pct);
        let damaged = damaged_structures(&*world, self.colony);

        let mut acted = 0_usize;
        for tower in &towers {
            let action = if let Some(enemy) = closest_by_range(&tower.pos, &hostiles, |h| h.pos) {
                Some(TowerAction::Attack {
                    target: enemy.id.clone(),
                })
            } else if has_surplus(tower, config.tower_repair_energy_pct) {
                closest_by_range(&tower.pos, &worn, |s| s.pos)
                    .or_else(|| closest_by_range(&tower.pos, &damaged, |s| s.pos))
                    .map(|s| TowerAction::Repair {
                        target: s.id.clone(),
                    })
            } else {
                None
            };
            let Some(action) = action else {
                continue;
            };
            let status = world.tower_act(&tower.id, &action);
            if status.is_ok() {
                acted = acted.saturating_add(1);
                debug!(tower = %tower.id, ?action, "tower acted");
            } else {
                warn!(tower = %tower.id, ?action, ?status, "tower action failed");
            }
        }
        acted
    }
}

/// Whether the tower holds more than `percent` of its capacity.
fn has_surplus(tower: &StructureSnapshot, percent: u32) -> bool {
    let Some(store) = tower.store.as_ref() else {
        return false;
    };
    u64::from(store.energy()).saturating_mul(100)
        > u64::from(store.capacity).saturating_mul(u64::from(percent))
}
