//! Commands issued to workers and towers.

use hive_types::{ObjectId, Position, Resource};
use serde::{Deserialize, Serialize};

/// Interaction range of harvest, transfer, withdraw, attack and claim.
pub const ADJACENT: u32 = 1;

/// Interaction range of build, repair and upgrade.
pub const WORK_RANGE: u32 = 3;

/// One action a worker attempts this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerAction {
    /// Step toward a tile until within `range`.
    MoveTo {
        /// Destination tile.
        target: Position,
        /// Distance at which the move counts as arrived.
        range: u32,
    },
    /// Harvest a source or mineral.
    Harvest {
        /// Source or mineral id.
        target: ObjectId,
    },
    /// Hand a resource to a structure.
    Transfer {
        /// Receiving structure.
        target: ObjectId,
        /// Resource to hand over.
        resource: Resource,
    },
    /// Take a resource from a structure or tombstone.
    Withdraw {
        /// Structure or tombstone.
        target: ObjectId,
        /// Resource to take.
        resource: Resource,
    },
    /// Spend energy on a construction site.
    Build {
        /// Site id.
        site: ObjectId,
    },
    /// Spend energy restoring a structure.
    Repair {
        /// Structure id.
        target: ObjectId,
    },
    /// Spend energy on the controller.
    UpgradeController {
        /// Controller id.
        controller: ObjectId,
    },
    /// Melee attack on a hostile.
    Attack {
        /// Hostile id.
        target: ObjectId,
    },
    /// Claim a neutral controller.
    ClaimController {
        /// Controller id.
        controller: ObjectId,
    },
    /// Self-destruct.
    Suicide,
}

impl WorkerAction {
    /// Short label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move",
            Self::Harvest { .. } => "harvest",
            Self::Transfer { .. } => "transfer",
            Self::Withdraw { .. } => "withdraw",
            Self::Build { .. } => "build",
            Self::Repair { .. } => "repair",
            Self::UpgradeController { .. } => "upgrade",
            Self::Attack { .. } => "attack",
            Self::ClaimController { .. } => "claim",
            Self::Suicide => "suicide",
        }
    }
}

/// One action a tower attempts this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerAction {
    /// Shoot a hostile.
    Attack {
        /// Hostile id.
        target: ObjectId,
    },
    /// Repair a structure.
    Repair {
        /// Structure id.
        target: ObjectId,
    },
}
