//! Types describing warmable entries and their outcomes.

use crate::keys::CacheKey;
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Opaque upstream failure; warming never looks past "it failed".
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type WarmFetch = Box<dyn Fn() -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// What to cache when a warm fetch fails or comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmPolicy {
    /// Cache an explicitly empty list. Used for list-shaped data where an
    /// empty answer is an answer, and re-fetch thrash is the worse evil.
    CacheEmpty,
    /// Cache nothing, so the next real request retries the fetch. Used for
    /// summary stats and overview series where an empty value would paint
    /// a wrong zero.
    SkipCache,
}

/// One entry in the warm catalog.
pub struct WarmEntry {
    pub(crate) key: CacheKey,
    pub(crate) ttl: Option<Duration>,
    pub(crate) policy: WarmPolicy,
    pub(crate) fetch: WarmFetch,
}

impl WarmEntry {
    /// Build an entry from any async fetch closure.
    pub fn new<F, Fut>(key: CacheKey, policy: WarmPolicy, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        Self {
            key,
            ttl: None,
            policy,
            fetch: Box::new(move || Box::pin(fetch())),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

/// Terminal state of one warm task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmOutcome {
    /// A valid, non-empty value was already cached; the fetch was skipped.
    AlreadyCached,
    /// Fetched and cached a value with content.
    Warmed,
    /// Cached an intentionally empty value (empty success, or a failure
    /// under [`WarmPolicy::CacheEmpty`]).
    WarmedEmpty,
    /// Nothing cached: the fetch failed or came back empty under
    /// [`WarmPolicy::SkipCache`].
    Skipped,
}

/// Per-key outcomes of one warm run.
#[derive(Debug)]
pub struct WarmReport {
    pub outcomes: Vec<(CacheKey, WarmOutcome)>,
}

impl WarmReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcome_for(&self, key: &CacheKey) -> Option<WarmOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, outcome)| *outcome)
    }

    pub fn warmed(&self) -> usize {
        self.count(WarmOutcome::Warmed)
    }

    pub fn warmed_empty(&self) -> usize {
        self.count(WarmOutcome::WarmedEmpty)
    }

    pub fn already_cached(&self) -> usize {
        self.count(WarmOutcome::AlreadyCached)
    }

    pub fn skipped(&self) -> usize {
        self.count(WarmOutcome::Skipped)
    }

    fn count(&self, wanted: WarmOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .count()
    }
}
