//! Cache configuration.

use crate::keys::KEY_PREFIX;
use std::time::Duration;

/// Tunables for the cache subsystem.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix stamped on every managed key.
    pub key_prefix: String,
    /// TTL applied to durable writes that do not pass one explicitly.
    pub default_ttl: Duration,
    /// TTL for session-scoped writes; long, since the entry already dies
    /// with the session.
    pub session_ttl: Duration,
    /// Period of the janitor's recurring sweep.
    pub sweep_interval: Duration,
    /// Quiet window required before a foreground signal triggers a sweep.
    pub foreground_debounce: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: KEY_PREFIX.to_string(),
            default_ttl: Duration::from_secs(10 * 60),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            foreground_debounce: Duration::from_millis(800),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_foreground_debounce(mut self, debounce: Duration) -> Self {
        self.foreground_debounce = debounce;
        self
    }
}
