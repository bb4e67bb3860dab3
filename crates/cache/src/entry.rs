//! The serialized envelope wrapped around every cached payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A cached payload plus the bookkeeping needed to judge its validity.
///
/// Envelopes are stored as JSON strings in the backing key-value store.
/// Whole-envelope overwrite is the only mutation; there is no partial
/// update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// The cached value itself.
    pub payload: Value,
    /// Write time, milliseconds since the Unix epoch.
    pub written_at: u64,
    /// How long past `written_at` the payload stays valid.
    pub ttl_ms: u64,
    /// Session token the entry is bound to (session-scoped store only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Envelope {
    pub fn new(payload: Value, written_at: u64, ttl: Duration) -> Self {
        Self {
            payload,
            written_at,
            ttl_ms: ttl.as_millis() as u64,
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// An entry is expired strictly after `written_at + ttl_ms`.
    pub fn is_expired(&self, now_millis: u64) -> bool {
        now_millis.saturating_sub(self.written_at) > self.ttl_ms
    }

    /// Milliseconds of validity left, zero once expired.
    pub fn remaining_ttl(&self, now_millis: u64) -> u64 {
        let expires_at = self.written_at.saturating_add(self.ttl_ms);
        expires_at.saturating_sub(now_millis)
    }

    /// Age of the entry in milliseconds.
    pub fn age(&self, now_millis: u64) -> u64 {
        now_millis.saturating_sub(self.written_at)
    }
}

/// Whether a cached value carries anything worth serving.
///
/// Empty arrays and objects (and `null`) are "empty": a hit on one of
/// these is still a hit for thrash-prevention purposes, but warming treats
/// it as worth refreshing.
pub fn value_has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        _ => true,
    }
}
