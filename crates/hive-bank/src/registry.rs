//! One banker per colony, owned by the orchestrator.

use std::collections::BTreeMap;

use hive_types::RoomName;

use crate::banker::Banker;
use crate::config::BankConfig;
use crate::error::BankError;

/// Bankers keyed by colony.
#[derive(Debug, Clone, Default)]
pub struct BankRegistry {
    config: BankConfig,
    banks: BTreeMap<RoomName, Banker>,
}

impl BankRegistry {
    /// An empty registry creating bankers with `config`.
    pub const fn new(config: BankConfig) -> Self {
        Self {
            config,
            banks: BTreeMap::new(),
        }
    }

    /// The banker of `colony`, created on first use.
    pub fn bank_mut(&mut self, colony: RoomName) -> &mut Banker {
        let config = &self.config;
        self.banks
            .entry(colony)
            .or_insert_with(|| Banker::new(colony, config.clone()))
    }

    /// The banker of `colony`, if one exists.
    pub fn bank(&self, colony: RoomName) -> Result<&Banker, BankError> {
        self.banks
            .get(&colony)
            .ok_or(BankError::UnknownColony { colony })
    }

    /// Colonies with a banker.
    pub fn colonies(&self) -> impl Iterator<Item = RoomName> + '_ {
        self.banks.keys().copied()
    }

    /// Drop bankers of colonies no longer controlled.
    pub fn retain(&mut self, keep: impl Fn(RoomName) -> bool) {
        self.banks.retain(|colony, _| keep(*colony));
    }
}
