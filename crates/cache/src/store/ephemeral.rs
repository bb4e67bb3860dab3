//! The session-scoped cache tier.

use crate::entry::Envelope;
use crate::keys::{CacheKey, KeyCodec, KeyPattern};
use crate::stats::CacheStats;
use crate::store::inner::StoreInner;
use crate::store::{DropReason, StorageBackend, WriteOutcome};
use parking_lot::RwLock;
use safar_core::Clock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Raw storage key holding the session token.
///
/// Deliberately outside the managed cache prefix so sweeps and pattern
/// scans never mistake it for an envelope.
pub const SESSION_TOKEN_KEY: &str = "safar_session_token";

/// Cache tier bound to the current session identity.
///
/// Entries carry the session token they were written under and are
/// discarded unread once the token rotates, so data cached for one login
/// never leaks into the next. TTLs default long; the session boundary is
/// the real lifetime.
#[derive(Clone)]
pub struct EphemeralStore {
    inner: Arc<StoreInner>,
    session: Arc<RwLock<Option<String>>>,
}

impl EphemeralStore {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        codec: KeyCodec,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner::new(backend, codec, clock, default_ttl)),
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn codec(&self) -> &KeyCodec {
        self.inner.codec()
    }

    /// The live session token.
    ///
    /// Created lazily on first use and persisted in this store's backend,
    /// so it survives reloads of the same logical session while staying
    /// distinct per session.
    pub fn session_id(&self) -> String {
        if let Some(existing) = self.session.read().clone() {
            return existing;
        }

        let mut guard = self.session.write();
        if let Some(existing) = guard.as_ref() {
            return existing.clone();
        }

        let token = match self.inner.backend().get(SESSION_TOKEN_KEY) {
            Some(persisted) => persisted,
            None => {
                let fresh = Uuid::new_v4().to_string();
                // Best effort: an unpersisted token still scopes this
                // process, it just will not survive a reload.
                if self
                    .inner
                    .backend()
                    .set(SESSION_TOKEN_KEY, &fresh)
                    .is_err()
                {
                    tracing::warn!("could not persist session token");
                }
                fresh
            }
        };
        *guard = Some(token.clone());
        token
    }

    /// Install a fresh session token, invalidating every entry written
    /// under the previous one. Called on login and logout.
    pub fn rotate_session(&self) -> String {
        let fresh = Uuid::new_v4().to_string();
        if self
            .inner
            .backend()
            .set(SESSION_TOKEN_KEY, &fresh)
            .is_err()
        {
            tracing::warn!("could not persist rotated session token");
        }
        *self.session.write() = Some(fresh.clone());
        tracing::debug!("session token rotated");
        fresh
    }

    /// Persist `payload` bound to the live session.
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
        )
        .with_session(self.session_id());
        self.inner.write_envelope(key, &envelope)
    }

    /// Read a payload; entries from another session are deleted unread.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let envelope = self.read_envelope_for_session(key)?;
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
        self.read_envelope_for_session(key)
            .map(|envelope| envelope.payload)
    }

    fn read_envelope_for_session(&self, key: &CacheKey) -> Option<Envelope> {
        let envelope = self.inner.read_envelope(key)?;
        if envelope.session_id.as_deref() != Some(self.session_id().as_str()) {
            tracing::debug!(key = %key, "discarding cache entry from a previous session");
            self.inner.remove(key);
            return None;
        }
        Some(envelope)
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
