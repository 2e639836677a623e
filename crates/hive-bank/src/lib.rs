//! Per-colony financial history and budget arbitration for Hive.
//!
//! Every fabrication is paid from a colony's spawn energy. This crate
//! decides how much of it a new worker may cost.
//!
//! # Architecture
//!
//! - [`banker`] -- The [`Banker`]: bounded rolling history and derived signals.
//! - [`funding`] -- [`Banker::fund_one_of`]: priority pick and per-type amount.
//! - [`registry`] -- [`BankRegistry`]: one banker per colony.
//! - [`config`] -- [`BankConfig`]: thresholds, with serde defaults.
//! - [`error`] -- [`BankError`].
//!
//! # Funding rules
//!
//! | Job | Amount |
//! |-----|--------|
//! | Defend | everything available |
//! | Harvester / Charger | the threshold, or all available when the threshold is out of reach |
//! | Tank / Attack | available minus reserve, only when full |
//! | Mapper / `RemoteHarvester` | a fixed price after the reserve |
//! | others | available minus reserve, clamped to 300..=800 |
//!
//! # Usage
//!
//! ```
//! use std::collections::BTreeSet;
//! use hive_bank::{BankConfig, Banker};
//! use hive_types::JobType;
//!
//! let colony = "W1N1".parse().unwrap();
//! let mut banker = Banker::new(colony, BankConfig::default());
//! banker.record_sample(300, 300).ok();
//!
//! let candidates: BTreeSet<JobType> = [JobType::Harvester].into_iter().collect();
//! let financing = banker.fund_one_of(&candidates).ok().flatten();
//! assert_eq!(financing.map(|f| f.amount), Some(300));
//! ```

pub mod banker;
pub mod config;
pub mod error;
pub mod funding;
pub mod registry;

// Re-export primary types at crate root.
pub use banker::{Banker, FinancialSample};
pub use config::BankConfig;
pub use error::BankError;
pub use funding::{Financing, most_important};
pub use registry::BankRegistry;
