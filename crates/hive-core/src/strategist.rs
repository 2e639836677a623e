//! Population demand planning.
//!
//! [`next_strategy`] turns a [`ColonyObservation`] into a [`DesiredState`]:
//! how many workers of each role the colony should field and which
//! construction features it should pursue. It is evaluated as an ordered
//! list of named [`GATES`]. Each gate applies a partial update and then
//! decides whether the next gate is evaluated; later gates override fields
//! set by earlier ones. The defense gate always lets evaluation proceed.
//!
//! The planner never reads the world. Everything it needs is collected
//! beforehand by the colony controller.

use serde::Serialize;

use crate::config::StrategyConfig;

/// Everything the planner knows about a colony this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColonyObservation {
    /// Current tick.
    pub tick: u64,
    /// Whether hostiles are inside the colony.
    pub attacked: bool,
    /// Ticks since the current attack started.
    pub attack_duration: Option<u64>,
    /// Whether the colony has a tower.
    pub has_tower: bool,
    /// Whether the colony storage holds energy.
    pub storage_has_energy: bool,
    /// Whether at least one energy source is fully set up.
    pub first_source_harvested: bool,
    /// Energy logistics alive in the colony.
    pub logistics_present: usize,
    /// Source harvesters alive in the colony.
    pub harvesters_present: usize,
    /// Whether the controller container exists.
    pub controller_container: bool,
    /// Energy sources in the colony.
    pub sources: usize,
    /// Sources no harvest machine is assigned to.
    pub free_sources: usize,
    /// Sources a harvest machine is assigned to.
    pub harvested_sources: usize,
    /// Rooms we control, all colonies included.
    pub controlled_rooms: usize,
    /// Global control level.
    pub gcl_level: u8,
    /// Colony controller level.
    pub controller_level: u8,
    /// Whether storage, tower or extractor sites await construction.
    pub advanced_sites_pending: bool,
    /// Energy sitting in source containers.
    pub energy_in_transit: u32,
    /// Logistic target chosen at the last rebalance.
    pub last_logistic_target: Option<usize>,
}

/// What the colony should look like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesiredState {
    /// Source harvesters.
    pub harvesters: usize,
    /// Energy logistics.
    pub logistics: usize,
    /// Mineral logistics.
    pub mineral_logistics: usize,
    /// Builders.
    pub builders: usize,
    /// Repairers.
    pub repairers: usize,
    /// Chargers.
    pub chargers: usize,
    /// Defenders.
    pub defenders: usize,
    /// Place a container next to the controller.
    pub ensure_controller_container: bool,
    /// Place roads between spawn, sources and controller.
    pub ensure_roads: bool,
    /// Place towers up to the level allowance.
    pub ensure_tower: bool,
    /// Place an extractor and harvest minerals.
    pub ensure_extractor: bool,
    /// Place a storage.
    pub ensure_storage: bool,
    /// Place a terminal.
    pub ensure_terminal: bool,
    /// Send a claimer to the expansion target.
    pub claim_expansion: bool,
    /// Logistic target set by a rebalance this tick.
    pub logistic_target: Option<usize>,
    /// Name of the last gate evaluated.
    pub gate: &'static str,
}

/// Whether evaluation continues past a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Evaluate the next gate.
    Proceed,
    /// Stop here.
    Stop,
}

impl Flow {
    const fn when(condition: bool) -> Self {
        if condition { Self::Proceed } else { Self::Stop }
    }
}

/// One named step of the planner.
#[derive(Clone, Copy)]
pub struct Gate {
    /// Gate name, reported in [`DesiredState::gate`].
    pub name: &'static str,
    /// Partial update and continuation decision.
    pub apply: fn(&ColonyObservation, &StrategyConfig, &mut DesiredState) -> Flow,
}

/// Gates in evaluation order.
pub const GATES: &[Gate] = &[
    Gate {
        name: "defense",
        apply: defense,
    },
    Gate {
        name: "baseline",
        apply: baseline,
    },
    Gate {
        name: "first_logistic",
        apply: first_logistic,
    },
    Gate {
        name: "controller_container",
        apply: controller_container,
    },
    Gate {
        name: "all_sources",
        apply: all_sources,
    },
    Gate {
        name: "growth",
        apply: growth,
    },
    Gate {
        name: "level_features",
        apply: level_features,
    },
    Gate {
        name: "adaptive_builders",
        apply: adaptive_builders,
    },
    Gate {
        name: "logistic_rebalance",
        apply: logistic_rebalance,
    },
];

/// Decide the colony's desired state.
///
/// Pure: identical observations give identical states.
pub fn next_strategy(observation: &ColonyObservation, config: &StrategyConfig) -> DesiredState {
    let mut desired = DesiredState::default();
    for gate in GATES {
        desired.gate = gate.name;
        if (gate.apply)(observation, config, &mut desired) == Flow::Stop {
            break;
        }
    }
    desired
}

fn defense(obs: &ColonyObservation, config: &StrategyConfig, desired: &mut DesiredState) -> Flow {
    let sustained = obs
        .attack_duration
        .is_some_and(|ticks| ticks > config.attack_grace_ticks);
    if obs.attacked && (!obs.has_tower || sustained) {
        desired.defenders = config.defenders;
    }
    Flow::Proceed
}

const fn baseline(
    obs: &ColonyObservation,
    config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    desired.harvesters = 1;
    if obs.storage_has_energy {
        desired.logistics = config.recovery_logistics;
    }
    Flow::when(obs.first_source_harvested)
}

const fn first_logistic(
    obs: &ColonyObservation,
    _config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    desired.logistics = 1;
    Flow::when(obs.logistics_present >= 1 && obs.harvesters_present >= 1)
}

const fn controller_container(
    obs: &ColonyObservation,
    _config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    desired.builders = 3;
    desired.chargers = 1;
    desired.ensure_controller_container = true;
    Flow::when(obs.controller_container)
}

const fn all_sources(
    obs: &ColonyObservation,
    _config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    desired.builders = 2;
    desired.harvesters = obs.sources;
    desired.logistics = 2;
    Flow::when(obs.free_sources == 0)
}

fn growth(obs: &ColonyObservation, config: &StrategyConfig, desired: &mut DesiredState) -> Flow {
    desired.chargers = 3;
    desired.repairers = if obs.has_tower {
        0
    } else {
        config.repairers_without_tower
    };
    desired.ensure_roads = true;
    desired.ensure_tower = true;
    desired.claim_expansion = obs.controlled_rooms < usize::from(obs.gcl_level);
    Flow::Proceed
}

const fn level_features(
    obs: &ColonyObservation,
    _config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    if obs.controller_level >= 6 {
        desired.ensure_extractor = true;
        desired.mineral_logistics = 1;
    }
    if obs.controller_level >= 4 {
        desired.ensure_storage = true;
        desired.ensure_terminal = true;
    }
    Flow::Proceed
}

const fn adaptive_builders(
    obs: &ColonyObservation,
    config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    if obs.advanced_sites_pending {
        desired.builders = config.advanced_builders;
    }
    Flow::Proceed
}

fn logistic_rebalance(
    obs: &ColonyObservation,
    config: &StrategyConfig,
    desired: &mut DesiredState,
) -> Flow {
    let due = obs
        .tick
        .checked_rem(config.logistic_cadence)
        .is_some_and(|r| r == 0);
    if due {
        let limit = u64::from(config.transit_per_source)
            .saturating_mul(u64::try_from(obs.harvested_sources).unwrap_or(u64::MAX));
        let target = if u64::from(obs.energy_in_transit) > limit {
            config
                .logistic_ceiling
                .min(obs.logistics_present.saturating_add(1))
        } else {
            config
                .logistic_floor
                .max(obs.logistics_present.saturating_sub(1))
        };
        desired.logistics = target;
        desired.logistic_target = Some(target);
    } else if let Some(target) = obs.last_logistic_target {
        desired.logistics = target;
    }
    Flow::Proceed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StrategyConfig {
        StrategyConfig::default()
    }

    /// A colony past every gate, off the rebalance cadence.
    fn mature() -> ColonyObservation {
        ColonyObservation {
            tick: 7,
            first_source_harvested: true,
            logistics_present: 2,
            harvesters_present: 2,
            controller_container: true,
            sources: 2,
            free_sources: 0,
            harvested_sources: 2,
            controlled_rooms: 1,
            gcl_level: 1,
            controller_level: 3,
            ..ColonyObservation::default()
        }
    }

    #[test]
    fn fresh_colony_wants_one_harvester() {
        let desired = next_strategy(&ColonyObservation::default(), &config());
        assert_eq!(desired.harvesters, 1);
        assert_eq!(desired.logistics, 0);
        assert_eq!(desired.chargers, 0);
        assert_eq!(desired.gate, "baseline");
    }

    #[test]
    fn stored_energy_recovers_logistics() {
        let obs = ColonyObservation {
            storage_has_energy: true,
            ..ColonyObservation::default()
        };
        assert_eq!(next_strategy(&obs, &config()).logistics, 3);
    }

    #[test]
    fn first_logistic_waits_for_crew() {
        let obs = ColonyObservation {
            first_source_harvested: true,
            harvesters_present: 1,
            ..ColonyObservation::default()
        };
        let desired = next_strategy(&obs, &config());
        assert_eq!(desired.logistics, 1);
        assert_eq!(desired.builders, 0);
        assert_eq!(desired.gate, "first_logistic");
    }

    #[test]
    fn controller_container_gate_stops_without_container() {
        let obs = ColonyObservation {
            controller_container: false,
            ..mature()
        };
        let desired = next_strategy(&obs, &config());
        assert_eq!(desired.builders, 3);
        assert_eq!(desired.chargers, 1);
        assert!(desired.ensure_controller_container);
        assert_eq!(desired.harvesters, 1);
        assert_eq!(desired.gate, "controller_container");
    }

    #[test]
    fn all_sources_gate_waits_for_free_sources() {
        let obs = ColonyObservation {
            sources: 3,
            free_sources: 1,
            ..mature()
        };
        let desired = next_strategy(&obs, &config());
        assert_eq!(desired.harvesters, 3);
        assert_eq!(desired.builders, 2);
        assert_eq!(desired.logistics, 2);
        assert_eq!(desired.chargers, 1);
        assert_eq!(desired.gate, "all_sources");
    }

    #[test]
    fn growth_bumps_chargers_and_repairers() {
        let desired = next_strategy(&mature(), &config());
        assert_eq!(desired.chargers, 3);
        assert_eq!(desired.repairers, 3);
        assert!(desired.ensure_roads && desired.ensure_tower);
        assert!(!desired.claim_expansion);
        assert!(!desired.ensure_storage);
        assert_eq!(desired.gate, "logistic_rebalance");

        let obs = ColonyObservation {
            has_tower: true,
            gcl_level: 2,
            ..mature()
        };
        let desired = next_strategy(&obs, &config());
        assert_eq!(desired.repairers, 0);
        assert!(desired.claim_expansion);
    }

    #[test]
    fn level_features_unlock_by_controller_level() {
        let obs = ColonyObservation {
            controller_level: 4,
            ..mature()
        };
        let desired = next_strategy(&obs, &config());
        assert!(desired.ensure_storage && desired.ensure_terminal);
        assert!(!desired.ensure_extractor);

        let obs = ColonyObservation {
            controller_level: 6,
            ..mature()
        };
        let desired = next_strategy(&obs, &config());
        assert!(desired.ensure_extractor);
        assert_eq!(desired.mineral_logistics, 1);
    }

    #[test]
    fn pending_advanced_sites_add_builders() {
        let obs = ColonyObservation {
            advanced_sites_pending: true,
            ..mature()
        };
        assert_eq!(next_strategy(&obs, &config()).builders, 4);
    }

    #[test]
    fn defense_is_independent_of_progress() {
        let obs = ColonyObservation {
            attacked: true,
            attack_duration: Some(0),
            ..ColonyObservation::default()
        };
        assert_eq!(next_strategy(&obs, &config()).defenders, 5);

        let towered = ColonyObservation {
            has_tower: true,
            ..obs.clone()
        };
        assert_eq!(next_strategy(&towered, &config()).defenders, 0);

        let sustained = ColonyObservation {
            attack_duration: Some(11),
            ..towered
        };
        assert_eq!(next_strategy(&sustained, &config()).defenders, 5);
    }

    #[test]
    fn rebalance_follows_energy_in_transit() {
        let busy = ColonyObservation {
            tick: 40,
            energy_in_transit: 601,
            ..mature()
        };
        let desired = next_strategy(&busy, &config());
        assert_eq!(desired.logistics, 3);
        assert_eq!(desired.logistic_target, Some(3));

        let idle = ColonyObservation {
            tick: 40,
            energy_in_transit: 600,
            ..mature()
        };
        assert_eq!(next_strategy(&idle, &config()).logistics, 1);
    }

    #[test]
    fn rebalance_stays_within_bounds() {
        let crowded = ColonyObservation {
            tick: 20,
            energy_in_transit: 10_000,
            logistics_present: 8,
            ..mature()
        };
        assert_eq!(next_strategy(&crowded, &config()).logistics, 8);

        let empty = ColonyObservation {
            tick: 20,
            logistics_present: 0,
            ..mature()
        };
        assert_eq!(next_strategy(&empty, &config()).logistics, 1);
    }

    #[test]
    fn target_is_kept_between_rebalances() {
        let obs = ColonyObservation {
            tick: 41,
            last_logistic_target: Some(5),
            ..mature()
        };
        let desired = next_strategy(&obs, &config());
        assert_eq!(desired.logistics, 5);
        assert_eq!(desired.logistic_target, None);

        let fresh = ColonyObservation {
            tick: 41,
            ..mature()
        };
        assert_eq!(next_strategy(&fresh, &config()).logistics, 2);
    }

    #[test]
    fn identical_observations_give_identical_states() {
        let obs = ColonyObservation {
            tick: 60,
            attacked: true,
            energy_in_transit: 900,
            ..mature()
        };
        assert_eq!(next_strategy(&obs, &config()), next_strategy(&obs, &config()));
    }

    #[test]
    fn gate_names_are_unique_and_ordered() {
        let names: Vec<&str> = GATES.iter().map(|g| g.name).collect();
        assert_eq!(names.first(), Some(&"defense"));
        assert_eq!(names.last(), Some(&"logistic_rebalance"));
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
