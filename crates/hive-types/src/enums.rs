//! Enumeration types shared by every Hive crate.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Job types
// ---------------------------------------------------------------------------

/// A fundable kind of worker. Ordering of [`JobType::priority`] decides which
/// job wins when several compete for the same fabrication point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Melee defenders answering an attack.
    Defend,
    /// Static harvesters parked on a source or mineral.
    Harvester,
    /// Controller upgraders.
    Charger,
    /// Haulers moving resources to consumers.
    Logistic,
    /// Structure maintainers.
    Repair,
    /// Construction workers.
    Builder,
    /// Builders sent to a freshly claimed room.
    Bootstrap,
    /// Controller claimers for expansion.
    Claim,
    /// Harvesters working a source in another room.
    RemoteHarvester,
    /// Damage sponges.
    Tank,
    /// Offensive melee workers.
    Attack,
    /// Scouts gathering intel on neighbouring rooms.
    Mapper,
}

impl JobType {
    /// Every job type, highest priority first.
    pub const ALL: [Self; 12] = [
        Self::Defend,
        Self::Harvester,
        Self::Charger,
        Self::Logistic,
        Self::Repair,
        Self::Builder,
        Self::Bootstrap,
        Self::Claim,
        Self::RemoteHarvester,
        Self::Tank,
        Self::Attack,
        Self::Mapper,
    ];

    /// Funding priority; higher wins.
    pub const fn priority(self) -> i8 {
        match self {
            Self::Defend => 7,
            Self::Harvester => 6,
            Self::Charger => 5,
            Self::Logistic => 4,
            Self::Repair => 3,
            Self::Builder => 2,
            Self::Bootstrap => 1,
            Self::Claim => 0,
            Self::RemoteHarvester => -1,
            Self::Tank => -2,
            Self::Attack => -3,
            Self::Mapper => -4,
        }
    }

    /// Lowercase label used in worker names and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defend => "defend",
            Self::Harvester => "harvester",
            Self::Charger => "charger",
            Self::Logistic => "logistic",
            Self::Repair => "repair",
            Self::Builder => "builder",
            Self::Bootstrap => "bootstrap",
            Self::Claim => "claim",
            Self::RemoteHarvester => "remote_harvester",
            Self::Tank => "tank",
            Self::Attack => "attack",
            Self::Mapper => "mapper",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The task machine a worker belongs to. Stored in the worker tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Works a source or mineral deposit.
    Harvester,
    /// Hauls energy to spawns, extensions, towers and storage.
    Logistic,
    /// Hauls minerals to storage.
    MineralLogistic,
    /// Builds construction sites.
    Builder,
    /// Repairs damaged structures.
    Repairer,
    /// Upgrades the controller.
    Charger,
    /// Defends the colony.
    Defender,
    /// Harvests a source in another room and hauls it home.
    RemoteHarvester,
    /// Claims a new room.
    Claimer,
    /// Builds the first spawn of a new colony.
    Bootstrapper,
    /// Visits rooms to collect intel.
    Mapper,
}

impl Role {
    /// The job type funded to fabricate a worker of this role.
    pub const fn job_type(self) -> JobType {
        match self {
            Self::Harvester => JobType::Harvester,
            Self::Logistic | Self::MineralLogistic => JobType::Logistic,
            Self::Builder => JobType::Builder,
            Self::Repairer => JobType::Repair,
            Self::Charger => JobType::Charger,
            Self::Defender => JobType::Defend,
            Self::RemoteHarvester => JobType::RemoteHarvester,
            Self::Claimer => JobType::Claim,
            Self::Bootstrapper => JobType::Bootstrap,
            Self::Mapper => JobType::Mapper,
        }
    }
}

// ---------------------------------------------------------------------------
// Body parts
// ---------------------------------------------------------------------------

/// One capability unit of a worker body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    /// Absorbs damage.
    Tough,
    /// Movement.
    Move,
    /// Cargo capacity (50 per part).
    Carry,
    /// Harvesting, building, repairing, upgrading.
    Work,
    /// Controller claiming.
    Claim,
    /// Melee attack.
    Attack,
    /// Ranged attack.
    RangedAttack,
    /// Healing.
    Heal,
}

impl BodyPart {
    /// Energy cost of the part.
    pub const fn cost(self) -> u32 {
        match self {
            Self::Tough => 10,
            Self::Move | Self::Carry => 50,
            Self::Attack => 80,
            Self::Work => 100,
            Self::RangedAttack => 150,
            Self::Heal => 250,
            Self::Claim => 600,
        }
    }

    /// Position in a sorted loadout: defence first, then movement, then
    /// utility, then combat.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Tough => 0,
            Self::Move => 1,
            Self::Carry => 2,
            Self::Work => 3,
            Self::Claim => 4,
            Self::Attack => 5,
            Self::RangedAttack => 6,
            Self::Heal => 7,
        }
    }
}

/// Total energy cost of a body.
pub fn body_cost(body: &[BodyPart]) -> u32 {
    body.iter()
        .fold(0_u32, |acc, part| acc.saturating_add(part.cost()))
}

// ---------------------------------------------------------------------------
// Structures and resources
// ---------------------------------------------------------------------------

/// Kinds of structures the controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Fabrication point.
    Spawn,
    /// Extra spawn energy capacity.
    Extension,
    /// Traversal speed-up.
    Road,
    /// Small public store.
    Container,
    /// Large colony store.
    Storage,
    /// Defensive turret.
    Tower,
    /// Mineral extractor.
    Extractor,
    /// Market terminal.
    Terminal,
    /// Constructed wall.
    Wall,
    /// Protective rampart.
    Rampart,
    /// Room controller.
    Controller,
    /// Harvestable power bank.
    PowerBank,
}

impl StructureKind {
    /// Whether workers can walk over the structure.
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Road | Self::Container | Self::Rampart)
    }

    /// Energy needed to finish a construction site of this kind.
    pub const fn build_cost(self) -> u32 {
        match self {
            Self::Road => 300,
            Self::Container | Self::Extension => 3_000,
            Self::Extractor | Self::Tower => 5_000,
            Self::Spawn => 15_000,
            Self::Storage => 30_000,
            Self::Terminal => 100_000,
            Self::Wall | Self::Rampart => 1,
            Self::Controller | Self::PowerBank => 0,
        }
    }
}

/// A carriable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// The universal currency.
    Energy,
    /// Hydrogen mineral.
    Hydrogen,
    /// Oxygen mineral.
    Oxygen,
    /// Utrium mineral.
    Utrium,
    /// Lemergium mineral.
    Lemergium,
    /// Keanium mineral.
    Keanium,
    /// Zynthium mineral.
    Zynthium,
    /// Catalyst mineral.
    Catalyst,
    /// Power.
    Power,
}

// ---------------------------------------------------------------------------
// Action results and worker objectives
// ---------------------------------------------------------------------------

/// Result code returned by the host for an attempted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// The action was scheduled.
    Ok,
    /// The target is out of interaction range.
    NotInRange,
    /// Not enough resources to perform the action.
    NotEnoughResources,
    /// The target cannot accept more.
    Full,
    /// The actor is still being fabricated or already busy.
    Busy,
    /// The target does not exist or is of the wrong kind.
    InvalidTarget,
    /// No path to the target.
    NoPath,
    /// The target belongs to someone else.
    NotOwner,
    /// Arguments were rejected.
    InvalidArgs,
    /// The worker name is already taken.
    NameExists,
    /// The actor lacks the body parts for the action.
    NoBodyPart,
}

impl ActionStatus {
    /// Whether the status means success.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Two-state sub-machine every hauling worker carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Collecting cargo.
    #[default]
    Gather,
    /// Unloading cargo.
    Deliver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_are_strictly_descending_in_all() {
        for pair in JobType::ALL.windows(2) {
            if let [a, b] = pair {
                assert!(a.priority() > b.priority(), "{a} should outrank {b}");
            }
        }
    }

    #[test]
    fn body_cost_sums_parts() {
        assert_eq!(
            body_cost(&[BodyPart::Work, BodyPart::Carry, BodyPart::Move]),
            200
        );
        assert_eq!(body_cost(&[]), 0);
    }

    #[test]
    fn mineral_logistics_are_funded_as_logistics() {
        assert_eq!(Role::MineralLogistic.job_type(), JobType::Logistic);
        assert_eq!(Role::Defender.job_type(), JobType::Defend);
    }

    #[test]
    fn walkable_structures() {
        assert!(StructureKind::Road.is_walkable());
        assert!(StructureKind::Container.is_walkable());
        assert!(!StructureKind::Spawn.is_walkable());
    }
}
