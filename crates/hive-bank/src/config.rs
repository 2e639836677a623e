//! Tunables of the budget arbitrator.
//!
//! Every field has a serde default, so a partial YAML section only overrides
//! what it names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Thresholds used by the banker's signals and funding rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Samples kept in the rolling history.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Samples needed before the income rate is reported as non-zero.
    #[serde(default = "default_min_income_samples")]
    pub min_income_samples: usize,

    /// Usage ratio below which the colony is critically short.
    #[serde(default = "default_critical_ratio")]
    pub critical_ratio: Decimal,

    /// Amount withheld for defense when the colony can sustain it.
    #[serde(default = "default_defense_reserve")]
    pub defense_reserve: u32,

    /// Capacity and availability below which no reserve is kept.
    #[serde(default = "default_defense_floor")]
    pub defense_floor: u32,

    /// Income per tick below which a scarce colony keeps no reserve.
    #[serde(default = "default_defense_min_income")]
    pub defense_min_income: Decimal,

    /// Target spend for a harvester.
    #[serde(default = "default_harvester_threshold")]
    pub harvester_threshold: u32,

    /// Target spend for a charger.
    #[serde(default = "default_charger_threshold")]
    pub charger_threshold: u32,

    /// Longest wait, in ticks, for a threshold before spending what is there.
    #[serde(default = "default_max_wait_ticks")]
    pub max_wait_ticks: u32,

    /// Smallest spend for support roles.
    #[serde(default = "default_support_min")]
    pub support_min: u32,

    /// Largest spend for support roles.
    #[serde(default = "default_support_max")]
    pub support_max: u32,

    /// Fixed spend for a mapper.
    #[serde(default = "default_mapper_cost")]
    pub mapper_cost: u32,

    /// Fixed spend for a remote harvester.
    #[serde(default = "default_remote_harvester_cost")]
    pub remote_harvester_cost: u32,

    /// Fixed spend for a claimer: the cheapest body that can claim.
    #[serde(default = "default_claim_cost")]
    pub claim_cost: u32,
}

const fn default_history_size() -> usize {
    50
}

const fn default_min_income_samples() -> usize {
    3
}

const fn default_critical_ratio() -> Decimal {
    Decimal::from_parts(10, 0, 0, false, 2)
}

const fn default_defense_reserve() -> u32 {
    300
}

const fn default_defense_floor() -> u32 {
    600
}

const fn default_defense_min_income() -> Decimal {
    Decimal::TWO
}

const fn default_harvester_threshold() -> u32 {
    800
}

const fn default_charger_threshold() -> u32 {
    1_200
}

const fn default_max_wait_ticks() -> u32 {
    10
}

const fn default_support_min() -> u32 {
    300
}

const fn default_support_max() -> u32 {
    800
}

const fn default_mapper_cost() -> u32 {
    100
}

const fn default_remote_harvester_cost() -> u32 {
    300
}

const fn default_claim_cost() -> u32 {
    650
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            min_income_samples: default_min_income_samples(),
            critical_ratio: default_critical_ratio(),
            defense_reserve: default_defense_reserve(),
            defense_floor: default_defense_floor(),
            defense_min_income: default_defense_min_income(),
            harvester_threshold: default_harvester_threshold(),
            charger_threshold: default_charger_threshold(),
            max_wait_ticks: default_max_wait_ticks(),
            support_min: default_support_min(),
            support_max: default_support_max(),
            mapper_cost: default_mapper_cost(),
            remote_harvester_cost: default_remote_harvester_cost(),
            claim_cost: default_claim_cost(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = BankConfig::default();
        assert_eq!(config.history_size, 50);
        assert_eq!(config.critical_ratio, dec!(0.10));
        assert_eq!(config.harvester_threshold, 800);
        assert_eq!(config.charger_threshold, 1_200);
        assert_eq!(config.claim_cost, 650);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: BankConfig = serde_json::from_str(r#"{"harvester_threshold": 600}"#).unwrap();
        assert_eq!(config.harvester_threshold, 600);
        assert_eq!(config.defense_reserve, 300);
    }
}
