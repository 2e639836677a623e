//! Configuration loading and typed config structures for Hive.
//!
//! The canonical configuration lives in `hive-config.yaml` at the project
//! root. Every section and field has a default, so an empty file (or no
//! file at all) yields a working controller.

use std::path::Path;

use hive_agents::AgentConfig;
use hive_bank::BankConfig;
use hive_types::{Position, RoomName};
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level controller configuration.
///
/// Mirrors the structure of `hive-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveConfig {
    /// Budget arbitration thresholds.
    #[serde(default)]
    pub bank: BankConfig,

    /// Task machine tunables.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Demand planner parameters.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Colony controller cadences.
    #[serde(default)]
    pub colony: ColonyConfig,

    /// Claim and remote harvest targets.
    #[serde(default)]
    pub expansion: ExpansionConfig,

    /// Harness settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HiveConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. An empty string yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Demand planner parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Defenders wanted while under a sustained attack.
    #[serde(default = "default_defenders")]
    pub defenders: usize,

    /// Ticks of attack a tower is trusted with before defenders are added.
    #[serde(default = "default_attack_grace_ticks")]
    pub attack_grace_ticks: u64,

    /// Logistics wanted while a storage holds energy, whatever the stage.
    #[serde(default = "default_recovery_logistics")]
    pub recovery_logistics: usize,

    /// Repairers wanted in a grown colony without a tower.
    #[serde(default = "default_repairers_without_tower")]
    pub repairers_without_tower: usize,

    /// Builders wanted while storage, tower or extractor sites are pending.
    #[serde(default = "default_advanced_builders")]
    pub advanced_builders: usize,

    /// Ticks between two logistic re-evaluations.
    #[serde(default = "default_logistic_cadence")]
    pub logistic_cadence: u64,

    /// Fewest logistics kept by re-evaluation.
    #[serde(default = "default_logistic_floor")]
    pub logistic_floor: usize,

    /// Most logistics reached by re-evaluation.
    #[serde(default = "default_logistic_ceiling")]
    pub logistic_ceiling: usize,

    /// Energy in transit per harvested source above which one more
    /// logistic is wanted.
    #[serde(default = "default_transit_per_source")]
    pub transit_per_source: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            defenders: default_defenders(),
            attack_grace_ticks: default_attack_grace_ticks(),
            recovery_logistics: default_recovery_logistics(),
            repairers_without_tower: default_repairers_without_tower(),
            advanced_builders: default_advanced_builders(),
            logistic_cadence: default_logistic_cadence(),
            logistic_floor: default_logistic_floor(),
            logistic_ceiling: default_logistic_ceiling(),
            transit_per_source: default_transit_per_source(),
        }
    }
}

/// Colony controller and orchestrator cadences, in ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyConfig {
    /// Lifetime of the cached list of controlled rooms.
    #[serde(default = "default_colony_refresh_ticks")]
    pub colony_refresh_ticks: u64,

    /// Road placement cadence.
    #[serde(default = "default_roads_every")]
    pub roads_every: u64,

    /// Tower placement cadence.
    #[serde(default = "default_tower_every")]
    pub tower_every: u64,

    /// Extension placement cadence.
    #[serde(default = "default_extensions_every")]
    pub extensions_every: u64,

    /// Storage placement cadence.
    #[serde(default = "default_storage_every")]
    pub storage_every: u64,

    /// Terminal placement cadence.
    #[serde(default = "default_terminal_every")]
    pub terminal_every: u64,

    /// Cadence of the search for rooms needing a bootstrap.
    #[serde(default = "default_bootstrap_check_ticks")]
    pub bootstrap_check_ticks: u64,

    /// Hostiles strictly inside this margin of the room edge count as an
    /// attack; hostiles on the outer band are passing through.
    #[serde(default = "default_attack_margin")]
    pub attack_margin: u8,

    /// Mineral logistics wanted while tombstones hold minerals.
    #[serde(default = "default_tombstone_logistics")]
    pub tombstone_logistics: usize,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            colony_refresh_ticks: default_colony_refresh_ticks(),
            roads_every: default_roads_every(),
            tower_every: default_tower_every(),
            extensions_every: default_extensions_every(),
            storage_every: default_storage_every(),
            terminal_every: default_terminal_every(),
            bootstrap_check_ticks: default_bootstrap_check_ticks(),
            attack_margin: default_attack_margin(),
            tombstone_logistics: default_tombstone_logistics(),
        }
    }
}

/// Where the colony grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Room to claim once the global control level allows it.
    #[serde(default)]
    pub claim_target: Option<RoomName>,

    /// Sources harvested from other rooms.
    #[serde(default)]
    pub remote_sources: Vec<Position>,
}

/// Harness settings of the `hive-engine` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ticks to simulate.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Log a summary every this many ticks.
    #[serde(default = "default_summary_every")]
    pub summary_every: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            summary_every: default_summary_every(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_defenders() -> usize {
    5
}

const fn default_attack_grace_ticks() -> u64 {
    10
}

const fn default_recovery_logistics() -> usize {
    3
}

const fn default_repairers_without_tower() -> usize {
    3
}

const fn default_advanced_builders() -> usize {
    4
}

const fn default_logistic_cadence() -> u64 {
    20
}

const fn default_logistic_floor() -> usize {
    1
}

const fn default_logistic_ceiling() -> usize {
    8
}

const fn default_transit_per_source() -> u32 {
    300
}

const fn default_colony_refresh_ticks() -> u64 {
    100
}

const fn default_roads_every() -> u64 {
    20
}

const fn default_tower_every() -> u64 {
    70
}

const fn default_extensions_every() -> u64 {
    100
}

const fn default_storage_every() -> u64 {
    25
}

const fn default_terminal_every() -> u64 {
    150
}

const fn default_bootstrap_check_ticks() -> u64 {
    100
}

const fn default_attack_margin() -> u8 {
    2
}

const fn default_tombstone_logistics() -> usize {
    4
}

const fn default_ticks() -> u64 {
    1_500
}

const fn default_summary_every() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HiveConfig::default();
        assert_eq!(config.strategy.defenders, 5);
        assert_eq!(config.strategy.logistic_ceiling, 8);
        assert_eq!(config.colony.roads_every, 20);
        assert_eq!(config.bank.harvester_threshold, 800);
        assert_eq!(config.agents.max_per_pos, 4);
        assert!(config.expansion.claim_target.is_none());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
bank:
  harvester_threshold: 700
agents:
  max_per_pos: 3
strategy:
  defenders: 4
  logistic_cadence: 10
colony:
  tower_every: 35
expansion:
  claim_target: "W2N1"
  remote_sources:
    - { x: 40, y: 25, room: "W2N2" }
engine:
  ticks: 200
logging:
  level: "debug"
  json: true
"#;
        let config = HiveConfig::parse(yaml).unwrap();
        assert_eq!(config.bank.harvester_threshold, 700);
        assert_eq!(config.bank.charger_threshold, 1_200);
        assert_eq!(config.agents.max_per_pos, 3);
        assert_eq!(config.strategy.defenders, 4);
        assert_eq!(config.strategy.logistic_cadence, 10);
        assert_eq!(config.strategy.logistic_ceiling, 8);
        assert_eq!(config.colony.tower_every, 35);
        assert_eq!(config.expansion.claim_target, Some("W2N1".parse().unwrap()));
        let remote = config.expansion.remote_sources.first().unwrap();
        assert_eq!((remote.x, remote.y), (40, 25));
        assert_eq!(config.engine.ticks, 200);
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_and_empty_yaml() {
        let config = HiveConfig::parse("strategy:\n  defenders: 2\n").unwrap();
        assert_eq!(config.strategy.defenders, 2);
        assert_eq!(config.strategy.attack_grace_ticks, 10);
        assert_eq!(config.colony, ColonyConfig::default());

        assert_eq!(HiveConfig::parse("").unwrap(), HiveConfig::default());
    }

    #[test]
    fn bad_room_name_is_rejected() {
        let result = HiveConfig::parse("expansion:\n  claim_target: \"nowhere\"\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("hive-config.yaml");
        if path.exists() {
            let config = HiveConfig::from_file(&path);
            assert!(config.is_ok(), "failed to load project config: {config:?}");
        }
    }
}
