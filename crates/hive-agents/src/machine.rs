//! The state machine contract.
//!
//! A machine derives its state from the world every tick instead of
//! remembering it: [`StateMachine::compute_state`] reads only, and
//! [`StateMachine::apply_state`] acts on the result. The latest label is
//! persisted in colony memory so a switch can be logged and observed
//! across restarts.

use std::fmt;

use hive_types::ColonyMemory;
use hive_world::World;
use tracing::info;

use crate::context::TaskContext;
use crate::error::TaskError;

/// A task machine with an explicit, recomputed state.
pub trait StateMachine {
    /// The machine's states.
    type State: Copy + Eq + fmt::Debug;

    /// Unique name, used as the memory key of the label.
    fn name(&self) -> String;

    /// Persisted label of a state.
    fn label(state: Self::State) -> &'static str;

    /// Derive the current state. Must not change the world: calling it twice
    /// without a world change yields the same state.
    fn compute_state<W>(&self, world: &W, memory: &ColonyMemory) -> Result<Self::State, TaskError>
    where
        W: World + ?Sized;

    /// Issue this tick's actions and job requests for `state`.
    fn apply_state<W>(
        &mut self,
        state: Self::State,
        ctx: &mut TaskContext<'_, W>,
    ) -> Result<(), TaskError>
    where
        W: World + ?Sized;

    /// Compute, persist the label, apply. Returns the state applied.
    fn run<W>(&mut self, ctx: &mut TaskContext<'_, W>) -> Result<Self::State, TaskError>
    where
        W: World + ?Sized,
    {
        let state = self.compute_state(&*ctx.world, &*ctx.memory)?;
        let label = Self::label(state);
        let name = self.name();
        if ctx.memory.set_label(&name, label) {
            info!(machine = %name, state = label, "state changed");
        }
        self.apply_state(state, ctx)?;
        Ok(state)
    }
}
