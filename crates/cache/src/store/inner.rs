//! Shared machinery behind the durable and session-scoped stores.

use crate::entry::Envelope;
use crate::keys::{CacheKey, KeyCodec, KeyPattern};
use crate::stats::CacheStats;
use crate::store::{DropReason, StorageBackend, WriteOutcome};
use parking_lot::RwLock;
use safar_core::Clock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// State and operations common to both cache tiers.
///
/// Keeps an in-memory namespace index over the backend (rebuilt from a
/// scan at construction) so invalidation touches only matching keys
/// instead of walking all of storage.
pub(crate) struct StoreInner {
    backend: Arc<dyn StorageBackend>,
    codec: KeyCodec,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    /// namespace -> identifier -> raw storage key
    index: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl StoreInner {
    pub(crate) fn new(
        backend: Arc<dyn StorageBackend>,
        codec: KeyCodec,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
    ) -> Self {
        let store = Self {
            backend,
            codec,
            clock,
            default_ttl,
            index: RwLock::new(HashMap::new()),
        };
        store.rebuild_index();
        store
    }

    pub(crate) fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    pub(crate) fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Raw backend access for out-of-band values (the session token).
    pub(crate) fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    fn rebuild_index(&self) {
        let mut index = self.index.write();
        index.clear();
        for raw_key in self.backend.keys() {
            if let Some((namespace, identifier)) = self.codec.parse(&raw_key) {
                index
                    .entry(namespace.to_string())
                    .or_default()
                    .insert(identifier.to_string(), raw_key.clone());
            }
        }
    }

    fn index_insert(&self, key: &CacheKey) {
        if let Some((namespace, identifier)) = self.codec.parse(key.as_str()) {
            self.index
                .write()
                .entry(namespace.to_string())
                .or_default()
                .insert(identifier.to_string(), key.as_str().to_string());
        }
    }

    fn index_remove(&self, raw_key: &str) {
        if let Some((namespace, identifier)) = self.codec.parse(raw_key) {
            let mut index = self.index.write();
            if let Some(entries) = index.get_mut(namespace) {
                entries.remove(identifier);
                if entries.is_empty() {
                    index.remove(namespace);
                }
            }
        }
    }

    /// Persist an envelope. Quota failures trigger an emergency sweep of
    /// expired entries and the write is dropped, never retried or raised.
    pub(crate) fn write_envelope(&self, key: &CacheKey, envelope: &Envelope) -> WriteOutcome {
        let raw = match serde_json::to_string(envelope) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(key = %key, %error, "dropping unserializable cache write");
                return WriteOutcome::Dropped(DropReason::Serialization);
            }
        };

        match self.backend.set(key.as_str(), &raw) {
            Ok(()) => {
                self.index_insert(key);
                tracing::debug!(key = %key, bytes = raw.len(), ttl_ms = envelope.ttl_ms, "cache write");
                WriteOutcome::Written
            }
            Err(_) => {
                let swept = self.sweep_expired();
                tracing::warn!(
                    key = %key,
                    swept,
                    "storage quota exceeded; write dropped after emergency sweep"
                );
                WriteOutcome::Dropped(DropReason::QuotaExceeded)
            }
        }
    }

    /// Load and validate an envelope. Corrupted and expired entries are
    /// evicted on access and reported as absent.
    pub(crate) fn read_envelope(&self, key: &CacheKey) -> Option<Envelope> {
        let raw = self.backend.get(key.as_str())?;
        match serde_json::from_str::<Envelope>(&raw) {
            Ok(envelope) => {
                if envelope.is_expired(self.now()) {
                    tracing::debug!(key = %key, "cache entry expired on read");
                    self.remove(key);
                    None
                } else {
                    Some(envelope)
                }
            }
            Err(error) => {
                tracing::debug!(key = %key, %error, "removing corrupted cache entry");
                self.remove(key);
                None
            }
        }
    }

    pub(crate) fn remove(&self, key: &CacheKey) {
        self.backend.remove(key.as_str());
        self.index_remove(key.as_str());
    }

    /// Delete every managed entry that is provably expired or unreadable.
    /// Valid entries are never touched.
    pub(crate) fn sweep_expired(&self) -> usize {
        let now = self.now();
        let mut removed = 0;
        for raw_key in self.backend.keys() {
            if !self.codec.is_managed(&raw_key) {
                continue;
            }
            let stale = match self.backend.get(&raw_key) {
                Some(raw) => match serde_json::from_str::<Envelope>(&raw) {
                    Ok(envelope) => envelope.is_expired(now),
                    Err(_) => true,
                },
                None => false,
            };
            if stale {
                self.backend.remove(&raw_key);
                self.index_remove(&raw_key);
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "swept expired cache entries");
        }
        removed
    }

    /// Delete every indexed entry matching `pattern`; returns the count.
    pub(crate) fn invalidate_matching(&self, pattern: &KeyPattern) -> usize {
        let matching: Vec<String> = {
            let index = self.index.read();
            match index.get(pattern.namespace_str()) {
                Some(entries) => entries
                    .iter()
                    .filter(|(identifier, _)| {
                        pattern.matches(pattern.namespace_str(), identifier)
                    })
                    .map(|(_, raw_key)| raw_key.clone())
                    .collect(),
                None => Vec::new(),
            }
        };

        for raw_key in &matching {
            self.backend.remove(raw_key);
            self.index_remove(raw_key);
        }
        matching.len()
    }

    /// Delete every managed entry regardless of validity.
    pub(crate) fn clear_all(&self) -> usize {
        let mut removed = 0;
        for raw_key in self.backend.keys() {
            if self.codec.is_managed(&raw_key) {
                self.backend.remove(&raw_key);
                removed += 1;
            }
        }
        self.index.write().clear();
        removed
    }

    /// Scan-based statistics over every managed entry.
    pub(crate) fn stats(&self) -> CacheStats {
        let now = self.now();
        let mut stats = CacheStats::default();
        for raw_key in self.backend.keys() {
            if !self.codec.is_managed(&raw_key) {
                continue;
            }
            let Some(raw) = self.backend.get(&raw_key) else {
                continue;
            };
            stats.total_entries += 1;
            stats.total_size_bytes += raw.len() as u64;
            match serde_json::from_str::<Envelope>(&raw) {
                Ok(envelope) if !envelope.is_expired(now) => stats.valid_entries += 1,
                // Corrupted entries count as expired: the next sweep takes them.
                _ => stats.expired_entries += 1,
            }
        }
        stats
    }
}
