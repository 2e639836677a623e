//! Error types for the `hive-population` crate.

/// Errors raised while sizing a worker loadout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadoutError {
    /// Neither required nor filler parts were given.
    #[error("a loadout needs at least one part")]
    EmptyLoadout,

    /// The base loadout alone costs more than the budget.
    #[error("base loadout costs {base_cost} but only {budget} is funded")]
    BudgetTooSmall {
        /// Cost of one of each required and filler part.
        base_cost: u32,
        /// Funded amount.
        budget: u32,
    },
}

/// Errors raised while resolving the job queue for one fabrication point.
///
/// [`crate::JobQueue::resolve`] logs these and moves on to the next point;
/// they never abort the tick.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// The colony of the fabrication point has no usable banker.
    #[error("bank error: {0}")]
    Bank(#[from] hive_bank::BankError),

    /// The funded amount could not buy a body.
    #[error("loadout error: {0}")]
    Loadout(#[from] LoadoutError),
}
