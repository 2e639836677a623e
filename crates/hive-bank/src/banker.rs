//! The per-colony banker: a bounded rolling history of spawn energy.
//!
//! The [`Banker`] receives one [`FinancialSample`] per tick and derives the
//! signals every funding decision reads: current availability, the usage
//! ratio, the income rate, scarcity, and the defense reserve.
//!
//! # Design
//!
//! - **Bounded**: the oldest sample is evicted once the history is full.
//! - **Precision**: ratios and rates use [`Decimal`], never floats.
//! - **Pure reads**: every signal is a function of the history alone.

use std::collections::VecDeque;

use hive_types::RoomName;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BankConfig;
use crate::error::BankError;

/// One tick's view of a colony's fabrication energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSample {
    /// Energy currently in spawns and extensions.
    pub available: u32,
    /// Maximum energy spawns and extensions can hold.
    pub capacity: u32,
    /// `available / capacity`, clamped to `[0, 1]`.
    pub usage_ratio: Decimal,
}

impl FinancialSample {
    /// Build a sample, rejecting zero capacity.
    pub fn new(colony: RoomName, available: u32, capacity: u32) -> Result<Self, BankError> {
        let ratio = Decimal::from(available)
            .checked_div(Decimal::from(capacity))
            .ok_or(BankError::ZeroCapacity { colony })?;
        Ok(Self {
            available,
            capacity,
            usage_ratio: ratio.clamp(Decimal::ZERO, Decimal::ONE),
        })
    }
}

/// Rolling financial history of one colony.
#[derive(Debug, Clone)]
pub struct Banker {
    colony: RoomName,
    pub(crate) config: BankConfig,
    history: VecDeque<FinancialSample>,
}

impl Banker {
    /// An empty banker for `colony`.
    pub fn new(colony: RoomName, config: BankConfig) -> Self {
        let capacity = config.history_size;
        Self {
            colony,
            config,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Colony this banker serves.
    pub const fn colony(&self) -> RoomName {
        self.colony
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no sample was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Samples held, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &FinancialSample> {
        self.history.iter()
    }

    /// Append this tick's sample, evicting the oldest beyond the limit.
    pub fn record_sample(&mut self, available: u32, capacity: u32) -> Result<(), BankError> {
        let sample = FinancialSample::new(self.colony, available, capacity)?;
        self.history.push_back(sample);
        while self.history.len() > self.config.history_size {
            self.history.pop_front();
        }
        Ok(())
    }

    fn latest(&self) -> Result<&FinancialSample, BankError> {
        self.history.back().ok_or(BankError::EmptyHistory {
            colony: self.colony,
        })
    }

    /// Energy available in the latest sample.
    pub fn current_available(&self) -> Result<u32, BankError> {
        self.latest().map(|s| s.available)
    }

    /// Capacity in the latest sample.
    pub fn current_capacity(&self) -> Result<u32, BankError> {
        self.latest().map(|s| s.capacity)
    }

    /// Usage ratio in the latest sample.
    pub fn current_ratio(&self) -> Result<Decimal, BankError> {
        self.latest().map(|s| s.usage_ratio)
    }

    /// Average energy gained per tick over the history window.
    ///
    /// Sums the positive deltas of `available` between consecutive samples
    /// and divides by the window size. Spending never counts as negative
    /// income. Zero until enough samples exist.
    pub fn income_rate_per_tick(&self) -> Decimal {
        if self.history.len() < self.config.min_income_samples {
            return Decimal::ZERO;
        }
        let gained: u64 = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|(prev, next)| u64::from(next.available.saturating_sub(prev.available)))
            .fold(0_u64, u64::saturating_add);
        let window = u64::try_from(self.config.history_size).unwrap_or(u64::MAX);
        Decimal::from(gained)
            .checked_div(Decimal::from(window))
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether the colony is below full capacity and can usefully spend.
    pub fn is_scarce(&self) -> Result<bool, BankError> {
        Ok(self.current_ratio()? < Decimal::ONE)
    }

    /// Whether the colony is nearly out of energy.
    pub fn is_critical(&self) -> Result<bool, BankError> {
        Ok(self.current_ratio()? < self.config.critical_ratio)
    }

    /// Energy withheld from non-defense spending.
    ///
    /// Zero when capacity or availability is below the floor, or when the
    /// colony is scarce with low income. Otherwise the configured reserve.
    pub fn reserved_defense_budget(&self) -> Result<u32, BankError> {
        let floor = self.config.defense_floor;
        let low_income = self.income_rate_per_tick() < self.config.defense_min_income;
        if self.current_capacity()? < floor
            || (self.is_scarce()? && low_income)
            || self.current_available()? < floor
        {
            return Ok(0);
        }
        Ok(self.config.defense_reserve)
    }

    /// Log the current signals at debug level.
    pub fn dump(&self) {
        let Ok(latest) = self.latest() else {
            debug!(colony = %self.colony, "bank empty");
            return;
        };
        debug!(
            colony = %self.colony,
            available = latest.available,
            capacity = latest.capacity,
            ratio = %latest.usage_ratio,
            income = %self.income_rate_per_tick(),
            samples = self.history.len(),
            "bank state"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn colony() -> RoomName {
        "W1N1".parse().unwrap()
    }

    fn make_banker() -> Banker {
        Banker::new(colony(), BankConfig::default())
    }

    #[test]
    fn empty_history_is_an_error() {
        let banker = make_banker();
        assert_eq!(
            banker.current_available(),
            Err(BankError::EmptyHistory { colony: colony() })
        );
        assert!(banker.is_scarce().is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut banker = make_banker();
        assert_eq!(
            banker.record_sample(10, 0),
            Err(BankError::ZeroCapacity { colony: colony() })
        );
        assert!(banker.is_empty());
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut banker = make_banker();
        for i in 0..60_u32 {
            banker.record_sample(i, 1_000).unwrap();
        }
        assert_eq!(banker.len(), 50);
        assert_eq!(banker.samples().next().unwrap().available, 10);
        assert_eq!(banker.current_available().unwrap(), 59);
    }

    #[test]
    fn usage_ratio_is_clamped() {
        let mut banker = make_banker();
        banker.record_sample(1_500, 1_000).unwrap();
        assert_eq!(banker.current_ratio().unwrap(), Decimal::ONE);
        banker.record_sample(250, 1_000).unwrap();
        assert_eq!(banker.current_ratio().unwrap(), dec!(0.25));
    }

    #[test]
    fn income_ignores_spending_and_needs_three_samples() {
        let mut banker = make_banker();
        banker.record_sample(100, 1_000).unwrap();
        banker.record_sample(200, 1_000).unwrap();
        assert_eq!(banker.income_rate_per_tick(), Decimal::ZERO);
        banker.record_sample(50, 1_000).unwrap();
        banker.record_sample(150, 1_000).unwrap();
        // (100 + 100) / 50
        assert_eq!(banker.income_rate_per_tick(), dec!(4));
    }

    #[test]
    fn scarcity_signals() {
        let mut banker = make_banker();
        banker.record_sample(50, 1_000).unwrap();
        assert!(banker.is_scarce().unwrap());
        assert!(banker.is_critical().unwrap());
        banker.record_sample(1_000, 1_000).unwrap();
        assert!(!banker.is_scarce().unwrap());
        assert!(!banker.is_critical().unwrap());
    }

    #[test]
    fn defense_reserve_zero_for_small_capacity() {
        let mut banker = make_banker();
        for _ in 0..5 {
            banker.record_sample(500, 500).unwrap();
        }
        assert_eq!(banker.reserved_defense_budget().unwrap(), 0);
    }

    #[test]
    fn defense_reserve_zero_when_scarce_and_slow() {
        let mut banker = make_banker();
        // (25 + 25) / 50 per tick.
        banker.record_sample(650, 1_000).unwrap();
        banker.record_sample(675, 1_000).unwrap();
        banker.record_sample(700, 1_000).unwrap();
        assert_eq!(banker.income_rate_per_tick(), dec!(1));
        assert_eq!(banker.reserved_defense_budget().unwrap(), 0);
    }

    #[test]
    fn defense_reserve_kept_when_full() {
        let mut banker = make_banker();
        banker.record_sample(1_000, 1_000).unwrap();
        assert_eq!(banker.reserved_defense_budget().unwrap(), 300);
    }

    #[test]
    fn defense_reserve_zero_when_available_low() {
        let mut banker = make_banker();
        for v in [100, 300, 500] {
            banker.record_sample(v, 1_000).unwrap();
        }
        // Income is 8 per tick but only 500 is on hand.
        assert_eq!(banker.reserved_defense_budget().unwrap(), 0);
    }
}
