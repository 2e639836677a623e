//! Tick-bounded memoization of world queries.
//!
//! Expensive lookups (the list of controlled rooms, for instance) are
//! computed once and kept in the persisted document under a string key
//! together with the tick they were computed at.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::memory::{CachedEntry, Memory, MemoryError};

/// The value cached under `key` if it is at most `ttl` ticks old,
/// otherwise the result of `compute`, which is cached in its place.
///
/// A cached payload that no longer decodes as `T` is recomputed.
pub fn cached<T, F>(
    memory: &mut Memory,
    key: &str,
    ttl: u64,
    now: u64,
    compute: F,
) -> Result<T, MemoryError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if let Some(entry) = memory.cached.get(key)
        && now.saturating_sub(entry.timestamp) <= ttl
        && let Ok(value) = serde_json::from_value::<T>(entry.data.clone())
    {
        return Ok(value);
    }
    let value = compute();
    let data = serde_json::to_value(&value)?;
    debug!(key, now, "cache refreshed");
    memory.cached.insert(
        key.to_owned(),
        CachedEntry {
            timestamp: now,
            data,
        },
    );
    Ok(value)
}

/// Drop the entry under `key`. Returns whether one existed.
pub fn invalidate(memory: &mut Memory, key: &str) -> bool {
    memory.cached.remove(key).is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn value_is_reused_until_stale() {
        let mut memory = Memory::default();
        let calls = Cell::new(0_u32);
        let compute = || {
            calls.set(calls.get().saturating_add(1));
            vec![1_u32, 2, 3]
        };
        let first: Vec<u32> = cached(&mut memory, "rooms", 10, 100, compute).unwrap();
        let second: Vec<u32> = cached(&mut memory, "rooms", 10, 110, compute).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        cached(&mut memory, "rooms", 10, 111, compute).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(memory.cached.get("rooms").unwrap().timestamp, 111);
    }

    #[test]
    fn undecodable_payload_is_recomputed() {
        let mut memory = Memory::default();
        cached(&mut memory, "k", 10, 0, || "text".to_owned()).unwrap();
        let value: u32 = cached(&mut memory, "k", 10, 1, || 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn invalidation_forces_a_recompute() {
        let mut memory = Memory::default();
        cached(&mut memory, "k", 100, 0, || 1_u32).unwrap();
        assert!(invalidate(&mut memory, "k"));
        assert!(!invalidate(&mut memory, "k"));
        let value: u32 = cached(&mut memory, "k", 100, 1, || 2).unwrap();
        assert_eq!(value, 2);
    }
}
