//! Storage backends and the two cache tiers built on them.
//!
//! A [`StorageBackend`] is the host's string key-value storage: synchronous,
//! shared with unrelated code, and allowed to refuse writes when full. The
//! [`DurableStore`] persists across sessions; the [`EphemeralStore`] binds
//! entries to the current session identity on top of the same machinery.

mod durable;
mod ephemeral;
mod inner;

pub use durable::DurableStore;
pub use ephemeral::{EphemeralStore, SESSION_TOKEN_KEY};

use crate::errors::{CacheError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Synchronous string key-value storage.
///
/// Maps onto host storage primitives: `get`/`set`/`remove` plus key
/// enumeration. `set` is the only fallible operation; everything else is
/// best-effort and infallible by contract.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value. Fails with [`CacheError::QuotaExceeded`] when the
    /// backend is out of space; the previous value (if any) is kept.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str);

    /// Every key currently present, ours and foreign alike.
    fn keys(&self) -> Vec<String>;
}

/// How a best-effort cache write ended.
///
/// Writes never raise; a degraded cache keeps serving as if every dropped
/// write were a miss. The outcome lets callers and tests observe the
/// degradation anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The entry was persisted.
    Written,
    /// The entry was not persisted; the cache continues without it.
    Dropped(DropReason),
}

impl WriteOutcome {
    pub fn was_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Why a write was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The backend refused the write even after an emergency sweep.
    QuotaExceeded,
    /// The payload could not be serialized.
    Serialization,
}

/// In-memory backend with an optional byte budget.
///
/// The production shell supplies real host storage; this one backs tests
/// and headless tooling. The capacity limit exists to exercise the quota
/// path: usage is counted as key bytes plus value bytes.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
    capacity_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn used_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if let Some(capacity) = self.capacity_bytes {
            let existing = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let projected = Self::used_bytes(&entries) - existing + key.len() + value.len();
            if projected > capacity {
                return Err(CacheError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let backend = MemoryBackend::new();
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").as_deref(), Some("v"));

        backend.set("k", "v2").unwrap();
        assert_eq!(backend.get("k").as_deref(), Some("v2"));

        backend.remove("k");
        assert_eq!(backend.get("k"), None);
        // Removing again is a no-op, not an error.
        backend.remove("k");
    }

    #[test]
    fn keys_enumerates_everything() {
        let backend = MemoryBackend::new();
        backend.set("a", "1").unwrap();
        backend.set("b", "2").unwrap();
        let mut keys = backend.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn capacity_limit_rejects_oversized_writes() {
        let backend = MemoryBackend::with_capacity_bytes(10);
        backend.set("ab", "cd").unwrap();
        let err = backend.set("long-key", "long-value").unwrap_err();
        assert!(matches!(err, CacheError::QuotaExceeded { .. }));
        // The store is unchanged after the refusal.
        assert_eq!(backend.get("ab").as_deref(), Some("cd"));
        assert_eq!(backend.get("long-key"), None);
    }

    #[test]
    fn overwrite_counts_against_the_old_size() {
        let backend = MemoryBackend::with_capacity_bytes(8);
        backend.set("k", "1234567").unwrap();
        // Replacing frees the old value first, so this fits.
        backend.set("k", "7654321").unwrap();
        assert_eq!(backend.get("k").as_deref(), Some("7654321"));
    }
}
