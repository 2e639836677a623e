//! Loadout sizing: turn a funded amount into a worker body.
//!
//! A body starts with one of each required and filler part, then grows
//! round-robin over the filler parts, always adding the filler with the
//! fewest copies that still fits the remaining budget. The result is
//! sorted by part rank so identical inputs always give identical bodies.

use hive_types::{BodyPart, JobType, body_cost};

use crate::error::LoadoutError;

/// Hard cap on body size.
pub const MAX_PARTS: usize = 50;

/// Required and filler parts of one job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadoutTemplate {
    /// Parts every worker of the job gets at least once.
    pub required: &'static [BodyPart],
    /// Parts used to spend the rest of the budget.
    pub filler: &'static [BodyPart],
}

const WORKER: &[BodyPart] = &[BodyPart::Work, BodyPart::Carry, BodyPart::Move];

/// Body template of a job type.
pub const fn template_for(job: JobType) -> LoadoutTemplate {
    match job {
        JobType::Harvester => LoadoutTemplate {
            required: WORKER,
            filler: &[BodyPart::Work],
        },
        JobType::Logistic => LoadoutTemplate {
            required: &[BodyPart::Carry, BodyPart::Move],
            filler: &[BodyPart::Carry, BodyPart::Move],
        },
        JobType::Charger | JobType::Repair | JobType::Builder | JobType::Bootstrap => {
            LoadoutTemplate {
                required: WORKER,
                filler: WORKER,
            }
        }
        JobType::RemoteHarvester => LoadoutTemplate {
            required: WORKER,
            filler: &[BodyPart::Carry, BodyPart::Move],
        },
        JobType::Defend => LoadoutTemplate {
            required: &[BodyPart::Attack, BodyPart::Move],
            filler: &[BodyPart::Tough, BodyPart::Attack, BodyPart::Move],
        },
        JobType::Claim => LoadoutTemplate {
            required: &[BodyPart::Claim, BodyPart::Move],
            filler: &[BodyPart::Move],
        },
        JobType::Tank => LoadoutTemplate {
            required: &[BodyPart::Tough, BodyPart::Move],
            filler: &[BodyPart::Tough, BodyPart::Move],
        },
        JobType::Attack => LoadoutTemplate {
            required: &[BodyPart::Attack, BodyPart::Move],
            filler: &[BodyPart::Attack, BodyPart::Move],
        },
        JobType::Mapper => LoadoutTemplate {
            required: &[BodyPart::Move],
            filler: &[],
        },
    }
}

fn push_unique(list: &mut Vec<BodyPart>, parts: &[BodyPart]) {
    for part in parts {
        if !list.contains(part) {
            list.push(*part);
        }
    }
}

/// Cost of the smallest body [`loadout_for`] can build for `job`.
pub fn base_cost(job: JobType) -> u32 {
    let template = template_for(job);
    let mut body = Vec::new();
    push_unique(&mut body, template.required);
    push_unique(&mut body, template.filler);
    body_cost(&body)
}

/// Size a body to `budget`.
///
/// Never exceeds the budget, always contains every required part, and is
/// deterministic for identical inputs.
pub fn compute_loadout(
    required: &[BodyPart],
    filler: &[BodyPart],
    budget: u32,
) -> Result<Vec<BodyPart>, LoadoutError> {
    let mut body = Vec::new();
    push_unique(&mut body, required);
    push_unique(&mut body, filler);
    if body.is_empty() {
        return Err(LoadoutError::EmptyLoadout);
    }
    let base_cost = body_cost(&body);
    let mut remaining = budget
        .checked_sub(base_cost)
        .ok_or(LoadoutError::BudgetTooSmall { base_cost, budget })?;

    let mut fillers = Vec::new();
    push_unique(&mut fillers, filler);

    while body.len() < MAX_PARTS {
        let next = fillers
            .iter()
            .filter(|part| part.cost() <= remaining)
            .min_by_key(|part| body.iter().filter(|p| p == part).count())
            .copied();
        let Some(part) = next else {
            break;
        };
        body.push(part);
        remaining = remaining.saturating_sub(part.cost());
    }

    body.sort_by_key(|part| part.rank());
    Ok(body)
}

/// Size a body for `job` from its template.
pub fn loadout_for(job: JobType, budget: u32) -> Result<Vec<BodyPart>, LoadoutError> {
    let template = template_for(job);
    compute_loadout(template.required, template.filler, budget)
}
