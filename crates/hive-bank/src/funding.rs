//! Budget arbitration: which single job type gets funded, and with how much.
//!
//! Funding is a pure function of the banker's history and the candidate
//! set. The highest-priority candidate always wins; its amount follows a
//! per-type rule. An amount of zero means "wait", not "refuse".

use std::collections::BTreeSet;

use hive_types::JobType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::banker::Banker;
use crate::error::BankError;

/// A funding decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financing {
    /// The funded job type.
    pub job_type: JobType,
    /// Energy the fabricator may spend. Zero means wait.
    pub amount: u32,
}

/// The highest-priority job type of a candidate set.
pub fn most_important(candidates: &BTreeSet<JobType>) -> Option<JobType> {
    candidates.iter().copied().max_by_key(|job| job.priority())
}

impl Banker {
    /// Fund the highest-priority candidate.
    ///
    /// Returns `None` for an empty candidate set. Fails only when no sample
    /// was recorded yet.
    pub fn fund_one_of(
        &self,
        candidates: &BTreeSet<JobType>,
    ) -> Result<Option<Financing>, BankError> {
        let Some(job_type) = most_important(candidates) else {
            return Ok(None);
        };
        let amount = self.amount_for(job_type)?;
        info!(
            colony = %self.colony(),
            job = %job_type,
            amount,
            candidates = candidates.len(),
            "funding decision"
        );
        Ok(Some(Financing { job_type, amount }))
    }

    fn amount_for(&self, job_type: JobType) -> Result<u32, BankError> {
        let available = self.current_available()?;
        let spendable = available.saturating_sub(self.reserved_defense_budget()?);
        let config = &self.config;

        let amount = match job_type {
            JobType::Defend => available,
            JobType::Harvester => self.threshold_amount(config.harvester_threshold)?,
            JobType::Charger => self.threshold_amount(config.charger_threshold)?,
            JobType::Tank | JobType::Attack => {
                if self.current_ratio()? == Decimal::ONE {
                    spendable
                } else {
                    0
                }
            }
            JobType::Mapper => fixed_amount(spendable, config.mapper_cost),
            JobType::RemoteHarvester => fixed_amount(spendable, config.remote_harvester_cost),
            JobType::Claim => fixed_amount(spendable, config.claim_cost),
            JobType::Logistic | JobType::Repair | JobType::Builder | JobType::Bootstrap => {
                if spendable >= config.support_min {
                    spendable.clamp(config.support_min, config.support_max)
                } else {
                    0
                }
            }
        };
        Ok(amount)
    }

    /// Spend `threshold` once reachable; spend what is there when the
    /// threshold is unreachable or too far away; otherwise wait.
    fn threshold_amount(&self, threshold: u32) -> Result<u32, BankError> {
        let available = self.current_available()?;
        if available >= threshold {
            return Ok(threshold);
        }
        if self.current_capacity()? < threshold {
            return Ok(available);
        }
        let income = self.income_rate_per_tick();
        let missing = Decimal::from(threshold.saturating_sub(available));
        let Some(ticks) = missing.checked_div(income) else {
            // No income: waiting would never pay off.
            return Ok(available);
        };
        if ticks > Decimal::from(self.config.max_wait_ticks) {
            Ok(available)
        } else {
            Ok(0)
        }
    }
}

const fn fixed_amount(spendable: u32, cost: u32) -> u32 {
    if spendable >= cost { cost } else { 0 }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hive_types::RoomName;

    use super::*;
    use crate::config::BankConfig;

    fn make_banker(samples: &[(u32, u32)]) -> Banker {
        let colony: RoomName = "W1N1".parse().unwrap();
        let mut banker = Banker::new(colony, BankConfig::default());
        for (available, capacity) in samples {
            banker.record_sample(*available, *capacity).unwrap();
        }
        banker
    }

    fn set(jobs: &[JobType]) -> BTreeSet<JobType> {
        jobs.iter().copied().collect()
    }

    fn fund(banker: &Banker, jobs: &[JobType]) -> Financing {
        banker.fund_one_of(&set(jobs)).unwrap().unwrap()
    }

    #[test]
    fn empty_candidates_fund_nothing() {
        let banker = make_banker(&[(300, 300)]);
        assert_eq!(banker.fund_one_of(&BTreeSet::new()).unwrap(), None);
    }

    #[test]
    fn empty_history_is_an_error() {
        let banker = make_banker(&[]);
        assert!(banker.fund_one_of(&set(&[JobType::Builder])).is_err());
    }

    #[test]
    fn highest_priority_wins_regardless_of_order() {
        let banker = make_banker(&[(1_000, 1_000)]);
        let a = fund(&banker, &[JobType::Repair, JobType::Harvester, JobType::Defend]);
        let b = fund(&banker, &[JobType::Defend, JobType::Repair, JobType::Harvester]);
        assert_eq!(a.job_type, JobType::Defend);
        assert_eq!(a, b);
    }

    #[test]
    fn funding_is_deterministic() {
        let banker = make_banker(&[(400, 1_000), (500, 1_000), (600, 1_000)]);
        let jobs = [JobType::Charger, JobType::Builder];
        let first = banker.fund_one_of(&set(&jobs)).unwrap();
        for _ in 0..10 {
            assert_eq!(banker.fund_one_of(&set(&jobs)).unwrap(), first);
        }
    }

    #[test]
    fn defend_spends_everything() {
        let banker = make_banker(&[(1_000, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Defend]).amount, 1_000);
    }

    #[test]
    fn harvester_without_income_spends_available() {
        let banker = make_banker(&[(750, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Harvester]).amount, 750);
    }

    #[test]
    fn harvester_is_capped_at_threshold() {
        let banker = make_banker(&[(800, 1_000), (850, 1_000), (900, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Harvester]).amount, 800);
    }

    #[test]
    fn harvester_on_small_colony_spends_available() {
        let banker = make_banker(&[(300, 300)]);
        assert_eq!(fund(&banker, &[JobType::Harvester]).amount, 300);
    }

    #[test]
    fn harvester_waits_when_threshold_is_close() {
        // Income (400 + 400) / 50 = 16 per tick; 50 missing takes ~3 ticks.
        let banker = make_banker(&[(0, 1_000), (400, 1_000), (350, 1_000), (750, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Harvester]).amount, 0);
    }

    #[test]
    fn harvester_spends_when_threshold_is_far() {
        // Income 100 / 50 = 2 per tick; 500 missing takes 250 ticks.
        let banker = make_banker(&[(200, 1_000), (250, 1_000), (300, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Harvester]).amount, 300);
    }

    #[test]
    fn charger_uses_higher_threshold() {
        let banker = make_banker(&[(1_300, 1_300)]);
        assert_eq!(fund(&banker, &[JobType::Charger]).amount, 1_200);
        let small = make_banker(&[(1_000, 1_000)]);
        assert_eq!(fund(&small, &[JobType::Charger]).amount, 1_000);
    }

    #[test]
    fn support_roles_clamp_after_reserve() {
        // Full colony: reserve 300 applies.
        let banker = make_banker(&[(1_000, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Builder]).amount, 700);
        let rich = make_banker(&[(2_000, 2_000)]);
        assert_eq!(fund(&rich, &[JobType::Logistic]).amount, 800);
        let poor = make_banker(&[(250, 300)]);
        assert_eq!(fund(&poor, &[JobType::Repair]).amount, 0);
    }

    #[test]
    fn mapper_and_remote_harvester_have_fixed_prices() {
        let banker = make_banker(&[(1_000, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Mapper]).amount, 100);
        assert_eq!(fund(&banker, &[JobType::RemoteHarvester]).amount, 300);
        let poor = make_banker(&[(90, 300)]);
        assert_eq!(fund(&poor, &[JobType::Mapper]).amount, 0);
    }

    #[test]
    fn claim_waits_for_a_full_claimer_body() {
        let banker = make_banker(&[(1_000, 1_000)]);
        assert_eq!(fund(&banker, &[JobType::Claim]).amount, 650);
        // Enough for support roles, not for a claim part plus a move.
        let short = make_banker(&[(550, 550)]);
        assert_eq!(fund(&short, &[JobType::Claim]).amount, 0);
    }

    #[test]
    fn tank_and_attack_only_when_full() {
        let full = make_banker(&[(1_000, 1_000)]);
        assert_eq!(fund(&full, &[JobType::Attack]).amount, 700);
        let partial = make_banker(&[(900, 1_000)]);
        assert_eq!(fund(&partial, &[JobType::Tank]).amount, 0);
    }
}
