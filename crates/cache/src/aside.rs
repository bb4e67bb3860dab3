//! Read-through caching over the durable tier.

use crate::keys::CacheKey;
use crate::store::{DurableStore, WriteOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Wraps an arbitrary async fetch with read-through/write-through caching.
///
/// This is the one place in the subsystem where a failure is surfaced:
/// a fetch error propagates to the caller untouched and nothing is
/// cached, so the next call retries. Swallowing it here would mask
/// upstream errors the caller must react to.
#[derive(Clone)]
pub struct CacheAside {
    store: DurableStore,
}

impl CacheAside {
    pub fn new(store: DurableStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DurableStore {
        &self.store
    }

    /// Return the cached payload for `key`, or fetch, cache, and return it.
    ///
    /// On a hit the fetch is never invoked. The write-back after a fetch is
    /// best-effort; a dropped write only means the next call fetches again.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.store.read::<T>(key) {
            tracing::debug!(key = %key, "cache hit");
            return Ok(cached);
        }

        tracing::debug!(key = %key, "cache miss; fetching");
        let fetched = fetch().await?;
        if let WriteOutcome::Dropped(reason) = self.store.write(key, &fetched, ttl) {
            tracing::warn!(key = %key, ?reason, "fetched value could not be cached");
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyCodec, Namespace};
    use crate::store::MemoryBackend;
    use safar_core::ManualClock;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn aside_with_clock(clock: Arc<ManualClock>) -> CacheAside {
        CacheAside::new(DurableStore::new(
            Arc::new(MemoryBackend::new()),
            KeyCodec::default(),
            clock,
            Duration::from_secs(600),
        ))
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let clock = Arc::new(ManualClock::new(0));
        let aside = aside_with_clock(clock);
        let key = aside
            .store()
            .codec()
            .build(&Namespace::new("leads").unwrap(), "all");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let value: Result<Value, &str> = aside
                .get_or_fetch(&key, None, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!({"x": 1}))
                })
                .await;
            assert_eq!(value.unwrap(), json!({"x": 1}));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiry_triggers_a_refetch() {
        let clock = Arc::new(ManualClock::new(0));
        let aside = aside_with_clock(clock.clone());
        let key = aside
            .store()
            .codec()
            .build(&Namespace::new("leads").unwrap(), "all");
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(json!([1]))
            }
        };

        aside
            .get_or_fetch(&key, Some(Duration::from_millis(100)), fetch(calls.clone()))
            .await
            .unwrap();
        clock.set(101);
        aside
            .get_or_fetch(&key, Some(Duration::from_millis(100)), fetch(calls.clone()))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_errors_propagate_and_cache_nothing() {
        let clock = Arc::new(ManualClock::new(0));
        let aside = aside_with_clock(clock);
        let key = aside
            .store()
            .codec()
            .build(&Namespace::new("leads").unwrap(), "all");
        let calls = Arc::new(AtomicUsize::new(0));

        {
            let calls = Arc::clone(&calls);
            let result: Result<Value, String> = aside
                .get_or_fetch(&key, None, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("upstream unavailable".to_string())
                })
                .await;
            assert_eq!(result.unwrap_err(), "upstream unavailable");
        }

        // Nothing was cached, so the next call retries the fetch.
        {
            let calls = Arc::clone(&calls);
            let result: Result<Value, String> = aside
                .get_or_fetch(&key, None, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!([2]))
                })
                .await;
            assert_eq!(result.unwrap(), json!([2]));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
