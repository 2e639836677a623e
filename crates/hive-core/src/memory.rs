//! The persisted controller document and where it is kept.
//!
//! Everything the controller must remember across host restarts lives in
//! one [`Memory`] document: task machine labels per colony, room intel and
//! cached query results. It is loaded at start, mutated during the tick and
//! written back as JSON through a [`KeyValueStore`] at the end of it.

use std::collections::BTreeMap;

use hive_types::{ColonyMemory, IntelLog, RoomName};
use serde::{Deserialize, Serialize};

/// Key under which the document is stored.
pub const MEMORY_KEY: &str = "hive";

/// Errors raised while loading or saving the document.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The document could not be encoded or decoded.
    #[error("memory serialization failed: {source}")]
    Serialization {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The backing store refused an operation.
    #[error("memory store failed on {key}: {reason}")]
    Store {
        /// Key being read or written.
        key: String,
        /// Store-provided reason.
        reason: String,
    },
}

/// One cached query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Tick the data was computed at.
    pub timestamp: u64,
    /// The cached payload.
    pub data: serde_json::Value,
}

/// The persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Persisted state of every controlled or bootstrapping room.
    #[serde(default)]
    pub terraformed_rooms: BTreeMap<RoomName, ColonyMemory>,

    /// Bounded observation history per room.
    #[serde(default)]
    pub intel: IntelLog,

    /// Cached query results by key.
    #[serde(default)]
    pub cached: BTreeMap<String, CachedEntry>,
}

impl Memory {
    /// Memory of one room, created on first use.
    pub fn colony_mut(&mut self, room: RoomName) -> &mut ColonyMemory {
        self.terraformed_rooms.entry(room).or_default()
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, MemoryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, MemoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the document under `key`, or a fresh one if nothing is stored.
    pub fn load<S>(store: &S, key: &str) -> Result<Self, MemoryError>
    where
        S: KeyValueStore + ?Sized,
    {
        match store.get(key)? {
            Some(json) => Self::from_json(&json),
            None => Ok(Self::default()),
        }
    }

    /// Write the document under `key`.
    pub fn save<S>(&self, store: &mut S, key: &str) -> Result<(), MemoryError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.set(key, self.to_json()?)
    }
}

/// String storage the document is persisted in.
pub trait KeyValueStore {
    /// Value under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError>;

    /// Store `value` under `key`, replacing what was there.
    fn set(&mut self, key: &str, value: String) -> Result<(), MemoryError>;
}

/// A [`KeyValueStore`] held in process memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStore {
    entries: BTreeMap<String, String>,
}

impl InMemoryStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), MemoryError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}
