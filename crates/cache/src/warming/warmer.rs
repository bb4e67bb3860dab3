//! The warm executor.

use super::types::{WarmEntry, WarmOutcome, WarmPolicy, WarmReport};
use crate::entry::value_has_content;
use crate::store::EphemeralStore;
use futures::future::join_all;
use serde_json::Value;

/// Pre-populates the session-scoped store from a catalog of entries.
#[derive(Clone)]
pub struct CacheWarmer {
    store: EphemeralStore,
}

impl CacheWarmer {
    pub fn new(store: EphemeralStore) -> Self {
        Self { store }
    }

    /// Warm every entry concurrently and report per-key outcomes.
    ///
    /// Entries are isolated: a failing fetch neither cancels nor delays
    /// its siblings, and `warm` itself never fails. Suitable for
    /// fire-and-forget use right after authentication resolves.
    pub async fn warm(&self, entries: Vec<WarmEntry>) -> WarmReport {
        let tasks = entries.into_iter().map(|entry| {
            let store = self.store.clone();
            async move {
                let outcome = warm_entry(&store, &entry).await;
                (entry.key, outcome)
            }
        });

        let outcomes = join_all(tasks).await;
        let report = WarmReport { outcomes };
        tracing::info!(
            total = report.len(),
            warmed = report.warmed(),
            warmed_empty = report.warmed_empty(),
            already_cached = report.already_cached(),
            skipped = report.skipped(),
            "cache warm complete"
        );
        report
    }
}

async fn warm_entry(store: &EphemeralStore, entry: &WarmEntry) -> WarmOutcome {
    if let Some(existing) = store.read_value(&entry.key) {
        if value_has_content(&existing) {
            tracing::debug!(key = %entry.key, "warm skip: already cached");
            return WarmOutcome::AlreadyCached;
        }
    }

    match (entry.fetch)().await {
        Ok(value) => {
            if value_has_content(&value) {
                store.write(&entry.key, &value, entry.ttl);
                tracing::debug!(key = %entry.key, "warmed");
                WarmOutcome::Warmed
            } else {
                match entry.policy {
                    WarmPolicy::CacheEmpty => {
                        store.write(&entry.key, &value, entry.ttl);
                        tracing::debug!(key = %entry.key, "warmed with empty result");
                        WarmOutcome::WarmedEmpty
                    }
                    WarmPolicy::SkipCache => {
                        tracing::debug!(key = %entry.key, "empty result left uncached for retry");
                        WarmOutcome::Skipped
                    }
                }
            }
        }
        Err(error) => {
            tracing::warn!(key = %entry.key, %error, "warm fetch failed");
            match entry.policy {
                WarmPolicy::CacheEmpty => {
                    store.write(&entry.key, &Value::Array(Vec::new()), entry.ttl);
                    WarmOutcome::WarmedEmpty
                }
                WarmPolicy::SkipCache => WarmOutcome::Skipped,
            }
        }
    }
}
