//! Tunables of the task machines and tower defense.
//!
//! Loaded as the `agents` section of the controller configuration; every
//! field has a default so a partial section is enough.

use serde::{Deserialize, Serialize};

/// Task machine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum workers bound to one delivery target (default: 4).
    pub max_per_pos: usize,

    /// Defender rally tile inside the colony, x coordinate (default: 15).
    pub rally_x: u8,

    /// Defender rally tile inside the colony, y coordinate (default: 15).
    pub rally_y: u8,

    /// Tower energy percentage above which towers repair (default: 80).
    pub tower_repair_energy_pct: u32,

    /// Roads and containers below this hit percentage are repaired first
    /// (default: 50).
    pub infra_repair_pct: u32,

    /// Source containers need more than this much energy before logistics
    /// collect from them (default: 200).
    pub logistic_min_pickup: u32,

    /// Re-evaluation cadence of remote harvester counts in ticks
    /// (default: 100).
    pub remote_recount_ticks: u64,

    /// Path tiles per remote harvester (default: 20).
    pub remote_path_per_worker: usize,

    /// Remote harvesters with fewer ticks to live and no cargo retire
    /// (default: 200).
    pub remote_retire_ttl: u32,

    /// Bootstrappers sent to a fresh colony (default: 3).
    pub bootstrappers: usize,

    /// Bootstrappers harvest from sources holding more than this
    /// (default: 500).
    pub bootstrap_min_source_energy: u32,

    /// Spiral radius searched for the first spawn of a fresh colony
    /// (default: 20).
    pub bootstrap_search_radius: u8,

    /// How many rooms past fresh intel mappers plan to look (default: 2).
    pub intel_depth: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_per_pos: 4,
            rally_x: 15,
            rally_y: 15,
            tower_repair_energy_pct: 80,
            infra_repair_pct: 50,
            logistic_min_pickup: 200,
            remote_recount_ticks: 100,
            remote_path_per_worker: 20,
            remote_retire_ttl: 200,
            bootstrappers: 3,
            bootstrap_min_source_energy: 500,
            bootstrap_search_radius: 20,
            intel_depth: 2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"max_per_pos": 2}"#).unwrap();
        assert_eq!(config.max_per_pos, 2);
        assert_eq!(config.bootstrappers, 3);
        assert_eq!(config.remote_path_per_worker, 20);
    }
}
