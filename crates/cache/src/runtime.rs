//! Explicit construction and lifecycle of the cache subsystem.
//!
//! Built once at application bootstrap and injected where needed; there
//! are no ambient globals to reach for. `init` and `dispose` bracket the
//! background maintenance.

use crate::aside::CacheAside;
use crate::config::CacheConfig;
use crate::invalidate::Invalidator;
use crate::janitor::Janitor;
use crate::keys::KeyCodec;
use crate::stats::CacheStats;
use crate::store::{DurableStore, EphemeralStore, MemoryBackend, StorageBackend};
use crate::warming::CacheWarmer;
use safar_core::{Clock, LifecycleEvents, LifecycleSource, SystemClock};
use std::sync::Arc;

/// The assembled cache subsystem.
pub struct CacheRuntime {
    config: CacheConfig,
    durable: DurableStore,
    ephemeral: EphemeralStore,
    invalidator: Invalidator,
    janitor: Arc<Janitor>,
}

impl CacheRuntime {
    pub fn builder() -> CacheRuntimeBuilder {
        CacheRuntimeBuilder::new()
    }

    /// Start background maintenance. Calling this again is a no-op.
    pub fn init(&self) {
        self.janitor.start();
    }

    /// Stop background maintenance; returns the number of sweeps that ran.
    pub fn dispose(&self) -> u64 {
        self.janitor.shutdown()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn codec(&self) -> &KeyCodec {
        self.durable.codec()
    }

    pub fn durable(&self) -> &DurableStore {
        &self.durable
    }

    pub fn ephemeral(&self) -> &EphemeralStore {
        &self.ephemeral
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    pub fn janitor(&self) -> &Janitor {
        &self.janitor
    }

    /// Read-through wrapper over the durable tier.
    pub fn aside(&self) -> CacheAside {
        CacheAside::new(self.durable.clone())
    }

    /// Warm executor over the session-scoped tier.
    pub fn warmer(&self) -> CacheWarmer {
        CacheWarmer::new(self.ephemeral.clone())
    }

    /// Combined statistics over both tiers.
    pub fn stats(&self) -> CacheStats {
        self.durable.stats().merged(self.ephemeral.stats())
    }
}

/// Builder wiring backends, clock, and lifecycle into a runtime.
///
/// Everything has a sensible default (in-memory backends, system clock,
/// an owned lifecycle channel) so tests and tools can build one in a
/// line; the application shell overrides with real host storage and its
/// own lifecycle hooks.
pub struct CacheRuntimeBuilder {
    config: CacheConfig,
    durable_backend: Option<Arc<dyn StorageBackend>>,
    ephemeral_backend: Option<Arc<dyn StorageBackend>>,
    clock: Option<Arc<dyn Clock>>,
    lifecycle: Option<Arc<dyn LifecycleSource>>,
}

impl CacheRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            durable_backend: None,
            ephemeral_backend: None,
            clock: None,
            lifecycle: None,
        }
    }

    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_durable_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.durable_backend = Some(backend);
        self
    }

    pub fn with_ephemeral_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.ephemeral_backend = Some(backend);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn LifecycleSource>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn build(self) -> CacheRuntime {
        let config = self.config;
        let codec = KeyCodec::new(config.key_prefix.clone());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let lifecycle = self
            .lifecycle
            .unwrap_or_else(|| Arc::new(LifecycleEvents::new()));
        let durable_backend = self
            .durable_backend
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        let ephemeral_backend = self
            .ephemeral_backend
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));

        let durable = DurableStore::new(
            durable_backend,
            codec.clone(),
            Arc::clone(&clock),
            config.default_ttl,
        );
        let ephemeral = EphemeralStore::new(
            ephemeral_backend,
            codec,
            clock,
            config.session_ttl,
        );
        let invalidator = Invalidator::new(durable.clone(), ephemeral.clone());
        let janitor = Arc::new(Janitor::new(
            durable.clone(),
            ephemeral.clone(),
            lifecycle,
            config.sweep_interval,
            config.foreground_debounce,
        ));

        CacheRuntime {
            config,
            durable,
            ephemeral,
            invalidator,
            janitor,
        }
    }
}

impl Default for CacheRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
