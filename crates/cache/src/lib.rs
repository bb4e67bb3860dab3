//! Two-tier cache for the safar admin dashboards.
//!
//! Everything here sits between the UI's data helpers and the host's
//! string key-value storage:
//!
//! - Namespaced, prefix-marked cache keys ([`keys`])
//! - A durable tier and a session-bound tier with TTL expiry, corruption
//!   recovery, and eviction on access ([`store`])
//! - Structured bulk invalidation ([`invalidate`])
//! - A background janitor purging expired entries on a timer and on
//!   lifecycle signals ([`janitor`])
//! - Read-through caching around arbitrary async fetches ([`aside`])
//! - Proactive warming of the dashboard's hot keys ([`warming`])
//!
//! The subsystem is best-effort by design: storage failures degrade to
//! cache misses, never to user-visible errors. The single exception is
//! [`CacheAside::get_or_fetch`], which propagates upstream fetch failures
//! to its caller.

pub mod aside;
pub mod config;
pub mod entry;
pub mod errors;
pub mod invalidate;
pub mod janitor;
pub mod keys;
pub mod runtime;
pub mod stats;
pub mod store;
pub mod warming;

pub use aside::CacheAside;
pub use config::CacheConfig;
pub use entry::{value_has_content, Envelope};
pub use errors::{CacheError, Result};
pub use invalidate::Invalidator;
pub use janitor::Janitor;
pub use keys::{CacheKey, KeyCodec, KeyPattern, Namespace, KEY_PREFIX};
pub use runtime::{CacheRuntime, CacheRuntimeBuilder};
pub use stats::CacheStats;
pub use store::{
    DropReason, DurableStore, EphemeralStore, MemoryBackend, StorageBackend, WriteOutcome,
    SESSION_TOKEN_KEY,
};
pub use warming::{BoxError, CacheWarmer, WarmEntry, WarmOutcome, WarmPolicy, WarmReport};
