//! Everything a task machine may touch during its tick.

use hive_population::JobQueue;
use hive_types::ColonyMemory;
use hive_world::World;

use crate::config::AgentConfig;

/// Mutable handles a machine works with: the host, the job queue, the
/// persisted memory of its colony, and the tunables.
pub struct TaskContext<'a, W>
where
    W: World + ?Sized,
{
    /// The host world.
    pub world: &'a mut W,
    /// This tick's job queue.
    pub queue: &'a mut JobQueue,
    /// Persisted memory of the colony the machine runs for.
    pub memory: &'a mut ColonyMemory,
    /// Task machine tunables.
    pub config: &'a AgentConfig,
}

impl<'a, W> TaskContext<'a, W>
where
    W: World + ?Sized,
{
    /// Bundle the handles.
    pub const fn new(
        world: &'a mut W,
        queue: &'a mut JobQueue,
        memory: &'a mut ColonyMemory,
        config: &'a AgentConfig,
    ) -> Self {
        Self {
            world,
            queue,
            memory,
            config,
        }
    }
}
