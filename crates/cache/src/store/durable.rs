//! The persistent cache tier.

use crate::entry::Envelope;
use crate::keys::{CacheKey, KeyCodec, KeyPattern};
use crate::stats::CacheStats;
use crate::store::inner::StoreInner;
use crate::store::{DropReason, StorageBackend, WriteOutcome};
use safar_core::Clock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Cache tier over persistent storage.
///
/// Entries survive reloads and sessions until their TTL runs out or an
/// invalidation removes them. All operations are best-effort: readers see
/// corrupted or expired entries as plain misses, and writers never fail.
#[derive(Clone)]
pub struct DurableStore {
    inner: Arc<StoreInner>,
}

impl DurableStore {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        codec: KeyCodec,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner::new(backend, codec, clock, default_ttl)),
        }
    }

    pub fn codec(&self) -> &KeyCodec {
        self.inner.codec()
    }

    /// Persist `payload` under `key` with the given TTL (store default when
    /// `None`). Failures degrade to a dropped write, never an error.
    pub fn write<T: Serialize>(
        &self,
        key: &CacheKey,
        payload: &T,
        ttl: Option<Duration>,
    ) -> WriteOutcome {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key = %key, %error, "dropping unserializable cache payload");
                return WriteOutcome::Dropped(DropReason::Serialization);
            }
        };
        let envelope = Envelope::new(
            value,
            self.inner.now(),
            ttl.unwrap_or(self.inner.default_ttl()),
        );
        self.inner.write_envelope(key, &envelope)
    }

    /// Read a payload, evicting the entry if it is expired, corrupted, or
    /// not decodable as `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let envelope = self.inner.read_envelope(key)?;
        match serde_json::from_value(envelope.payload) {
            Ok(payload) => Some(payload),
            Err(error) => {
                tracing::debug!(key = %key, %error, "cached payload has the wrong shape; removing");
                self.inner.remove(key);
                None
            }
        }
    }

    /// Read the raw JSON payload without imposing a shape.
    pub fn read_value(&self, key: &CacheKey) -> Option<Value> {
        self.inner.read_envelope(key).map(|envelope| envelope.payload)
    }

    pub fn remove(&self, key: &CacheKey) {
        self.inner.remove(key);
    }

    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired()
    }

    pub fn invalidate_matching(&self, pattern: &KeyPattern) -> usize {
        self.inner.invalidate_matching(pattern)
    }

    pub fn clear_all(&self) -> usize {
        self.inner.clear_all()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Namespace;
    use crate::store::MemoryBackend;
    use safar_core::ManualClock;
    use serde_json::json;

    fn store_with_clock(
        backend: Arc<MemoryBackend>,
        clock: Arc<ManualClock>,
    ) -> DurableStore {
        DurableStore::new(
            backend,
            KeyCodec::default(),
            clock,
            Duration::from_secs(600),
        )
    }

    #[test]
    fn write_then_read_round_trips() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(Arc::new(MemoryBackend::new()), clock);
        let key = store.codec().build(&Namespace::new("leads").unwrap(), "all");

        let outcome = store.write(&key, &vec!["A".to_string(), "B".to_string()], None);
        assert!(outcome.was_written());
        assert_eq!(
            store.read::<Vec<String>>(&key),
            Some(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn read_respects_the_ttl_boundary() {
        let clock = Arc::new(ManualClock::new(0));
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with_clock(backend.clone(), clock.clone());
        let key = store.codec().build(&Namespace::new("leads").unwrap(), "all");

        store.write(&key, &json!(["A", "B"]), Some(Duration::from_millis(1_000)));

        clock.set(999);
        assert_eq!(store.read::<Value>(&key), Some(json!(["A", "B"])));

        clock.set(1_001);
        assert_eq!(store.read::<Value>(&key), None);
        // Expired entry was evicted on access, not just hidden.
        assert!(!backend.keys().iter().any(|k| k == key.as_str()));
    }

    #[test]
    fn corrupted_entries_read_as_absent_and_are_removed() {
        let clock = Arc::new(ManualClock::new(0));
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with_clock(backend.clone(), clock);
        let key = store.codec().build(&Namespace::new("leads").unwrap(), "all");

        backend.set(key.as_str(), "{not json").unwrap();
        assert_eq!(store.read::<Value>(&key), None);
        assert!(backend.keys().is_empty());
    }

    #[test]
    fn wrong_shape_payloads_are_treated_as_corruption() {
        let clock = Arc::new(ManualClock::new(0));
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with_clock(backend.clone(), clock);
        let key = store.codec().build(&Namespace::new("leads").unwrap(), "all");

        store.write(&key, &json!({"an": "object"}), None);
        assert_eq!(store.read::<Vec<String>>(&key), None);
        assert!(backend.keys().is_empty());
    }

    #[test]
    fn quota_failure_drops_the_write_and_sweeps() {
        let clock = Arc::new(ManualClock::new(0));
        // Room for roughly one envelope.
        let backend = Arc::new(MemoryBackend::with_capacity_bytes(160));
        let store = store_with_clock(backend.clone(), clock.clone());
        let ns = Namespace::new("leads").unwrap();

        let first = store.codec().build(&ns, "first");
        assert!(store
            .write(&first, &json!("x"), Some(Duration::from_millis(10)))
            .was_written());

        // Let the first entry expire, then overflow the quota.
        clock.set(1_000);
        let second = store.codec().build(&ns, "second");
        let payload = json!("y".repeat(200));
        let outcome = store.write(&second, &payload, None);
        assert_eq!(outcome, WriteOutcome::Dropped(DropReason::QuotaExceeded));

        // The emergency sweep reclaimed the expired entry; the dropped
        // write stays dropped.
        assert!(!backend.keys().iter().any(|k| k == first.as_str()));
        assert_eq!(store.read::<Value>(&second), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(Arc::new(MemoryBackend::new()), clock);
        let key = store.codec().build(&Namespace::new("leads").unwrap(), "all");
        store.write(&key, &json!(1), None);
        store.remove(&key);
        store.remove(&key);
        assert_eq!(store.read::<Value>(&key), None);
    }

    #[test]
    fn overwrite_replaces_the_whole_entry() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store_with_clock(Arc::new(MemoryBackend::new()), clock);
        let key = store.codec().build(&Namespace::new("leads").unwrap(), "all");
        store.write(&key, &json!([1, 2, 3]), None);
        store.write(&key, &json!([4]), None);
        assert_eq!(store.read::<Value>(&key), Some(json!([4])));
    }
}
