//! Persisted per-room records: task machine labels and room intel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::RoomName;

/// Intel entries kept per room.
pub const MAX_INTEL_ENTRIES: usize = 5;

/// Ticks after which a room's intel is stale and worth a new visit.
pub const INTEL_REVISIT_TICKS: u64 = 100;

/// Persisted state of one controlled (or bootstrapping) room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyMemory {
    /// Latest state label per task machine name.
    #[serde(default)]
    pub state_machines: BTreeMap<String, String>,
}

impl ColonyMemory {
    /// Latest label recorded for `machine`.
    pub fn label(&self, machine: &str) -> Option<&str> {
        self.state_machines.get(machine).map(String::as_str)
    }

    /// Record `label` for `machine`. Returns whether the label changed.
    pub fn set_label(&mut self, machine: &str, label: &str) -> bool {
        if self.label(machine) == Some(label) {
            return false;
        }
        self.state_machines
            .insert(machine.to_owned(), label.to_owned());
        true
    }

    /// Forget a machine.
    pub fn clear_label(&mut self, machine: &str) {
        self.state_machines.remove(machine);
    }
}

/// What a visit to a room revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelState {
    /// Tick of the observation.
    pub timestamp: u64,
    /// Whether hostiles were present.
    pub is_hostile: bool,
    /// Remaining lifetime of a power bank at observation time, 0 if none.
    pub power_ttl: u32,
    /// Whether a mapper could reach the room.
    pub is_reachable: bool,
}

impl IntelState {
    /// Power bank lifetime left at tick `now`.
    pub fn remaining_power(&self, now: u64) -> u64 {
        let elapsed = now.saturating_sub(self.timestamp);
        u64::from(self.power_ttl).saturating_sub(elapsed)
    }
}

/// Bounded intel history of every room ever observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntelLog {
    rooms: BTreeMap<RoomName, Vec<IntelState>>,
}

impl IntelLog {
    /// An empty log.
    pub const fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
        }
    }

    /// Record an observation.
    ///
    /// A new entry is appended when the room has none yet, when the last
    /// entry is older than [`INTEL_REVISIT_TICKS`], or when the room just
    /// turned hostile. The oldest entry is dropped beyond
    /// [`MAX_INTEL_ENTRIES`]. Returns whether an entry was appended.
    pub fn push_state(&mut self, room: RoomName, state: IntelState) -> bool {
        let entries = self.rooms.entry(room).or_default();
        let append = entries.last().is_none_or(|last| {
            state.timestamp.saturating_sub(last.timestamp) > INTEL_REVISIT_TICKS
                || (!last.is_hostile && state.is_hostile)
        });
        if append {
            entries.push(state);
        }
        while entries.len() > MAX_INTEL_ENTRIES {
            entries.remove(0);
        }
        append
    }

    /// Entries of one room, oldest first.
    pub fn history(&self, room: RoomName) -> &[IntelState] {
        self.rooms.get(&room).map_or(&[], Vec::as_slice)
    }

    /// Latest entry of one room.
    pub fn last(&self, room: RoomName) -> Option<&IntelState> {
        self.rooms.get(&room).and_then(|entries| entries.last())
    }

    /// Latest entry of every room.
    pub fn last_states(&self) -> impl Iterator<Item = (RoomName, &IntelState)> {
        self.rooms
            .iter()
            .filter_map(|(room, entries)| entries.last().map(|last| (*room, last)))
    }

    /// Whether the room was observed less than [`INTEL_REVISIT_TICKS`] ago.
    pub fn was_visited_lately(&self, room: RoomName, now: u64) -> bool {
        self.last(room)
            .is_some_and(|last| now.saturating_sub(last.timestamp) < INTEL_REVISIT_TICKS)
    }

    /// Whether workers may travel through the room: unknown rooms are
    /// allowed, known ones must be reachable and peaceful.
    pub fn allows_travel(&self, room: RoomName) -> bool {
        self.last(room)
            .is_none_or(|last| last.is_reachable && !last.is_hostile)
    }
}
