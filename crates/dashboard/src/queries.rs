//! Read-through query helpers backing the dashboard surfaces.
//!
//! Each helper checks the session-scoped cache first, fetches on a miss,
//! and writes back according to that surface's policy. Leaderboard
//! fetches race a timeout; the losing fetch keeps running detached and
//! its late result is discarded.

use crate::fetchers::DashboardFetchers;
use crate::rollup::daily_activity;
use crate::scope::{resolve_scope, DataScope};
use crate::types::{
    CategoryFilter, ConsultantCategory, ConsultantRank, DailyActivity, DashboardStats,
    InquiryRank, OverviewMetric, PackageRank,
};
use chrono::Utc;
use safar_cache::{value_has_content, CacheKey, EphemeralStore, Invalidator, KeyPattern, Namespace};
use safar_core::IdentityProvider;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long a leaderboard fetch may run before the UI settles for empty.
pub const LEADERBOARD_TIMEOUT: Duration = Duration::from_secs(5);

/// Default leaderboard depth.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 5;

/// The dashboard's cached data access layer.
///
/// Owns no data itself; everything flows ephemeral-store-first, then
/// through the injected fetchers. Failures never surface to the UI: the
/// worst case is an empty or zeroed view and another fetch later.
#[derive(Clone)]
pub struct DashboardData {
    store: EphemeralStore,
    invalidator: Invalidator,
    fetchers: Arc<dyn DashboardFetchers>,
    identity: Arc<dyn IdentityProvider>,
    namespace: Namespace,
}

impl DashboardData {
    pub fn new(
        store: EphemeralStore,
        invalidator: Invalidator,
        fetchers: Arc<dyn DashboardFetchers>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            invalidator,
            fetchers,
            identity,
            namespace: dashboard_namespace(),
        }
    }

    fn key(&self, identifier: &str) -> CacheKey {
        self.store.codec().build(&self.namespace, identifier)
    }

    /// Summary counters. A cached non-empty object is served as-is; fetch
    /// failures fall back to zeroed counters and are left uncached so the
    /// next request retries.
    pub async fn dashboard_stats(&self) -> DashboardStats {
        let key = self.key("stats");

        if let Some(cached) = self.store.read_value(&key) {
            if value_has_content(&cached) {
                if let Ok(stats) = serde_json::from_value::<DashboardStats>(cached) {
                    tracing::debug!("dashboard stats served from session cache");
                    return stats;
                }
            }
        }

        let Some(principal) = self.identity.current().await else {
            tracing::debug!("dashboard stats requested before authentication");
            return DashboardStats::default();
        };
        let scope = resolve_scope(&principal, self.fetchers.as_ref()).await;

        match self.fetchers.dashboard_stats(&scope).await {
            Ok(stats) => {
                self.store.write(&key, &stats, None);
                stats
            }
            Err(error) => {
                tracing::warn!(%error, "dashboard stats fetch failed; serving zeroed fallback");
                DashboardStats::default()
            }
        }
    }

    /// Top packages for `filter`. Timeouts and failures cache an empty
    /// list so the view does not refetch in a loop.
    pub async fn top_packages(
        &self,
        filter: CategoryFilter,
        limit: usize,
    ) -> Vec<PackageRank> {
        let key = self.key(&format!("top_packages_{}_{}", filter.key_part(), limit));
        if let Some(cached) = self.store.read::<Vec<PackageRank>>(&key) {
            tracing::debug!(filter = filter.key_part(), "top packages served from session cache");
            return cached;
        }

        let packages = match self.scoped().await {
            Some(scope) => {
                let fetchers = Arc::clone(&self.fetchers);
                self.fetch_with_timeout("top_packages", async move {
                    fetchers.top_packages(&scope, filter, limit).await
                })
                .await
                .unwrap_or_default()
            }
            None => Vec::new(),
        };

        self.store.write(&key, &packages, None);
        packages
    }

    /// Top inquiries for `filter`; same caching policy as packages.
    pub async fn top_inquiries(
        &self,
        filter: CategoryFilter,
        limit: usize,
    ) -> Vec<InquiryRank> {
        let key = self.key(&format!("top_inquiries_{}_{}", filter.key_part(), limit));
        if let Some(cached) = self.store.read::<Vec<InquiryRank>>(&key) {
            tracing::debug!(filter = filter.key_part(), "top inquiries served from session cache");
            return cached;
        }

        let inquiries = match self.scoped().await {
            Some(scope) => {
                let fetchers = Arc::clone(&self.fetchers);
                self.fetch_with_timeout("top_inquiries", async move {
                    fetchers.top_inquiries(&scope, filter, limit).await
                })
                .await
                .unwrap_or_default()
            }
            None => Vec::new(),
        };

        self.store.write(&key, &inquiries, None);
        inquiries
    }

    /// Top consultants for `category`. Unscoped; same caching policy as
    /// the other leaderboards.
    pub async fn top_consultants(
        &self,
        category: ConsultantCategory,
        limit: usize,
    ) -> Vec<ConsultantRank> {
        let key = self.key(&format!("top_consultants_{}_{}", category.key_part(), limit));
        if let Some(cached) = self.store.read::<Vec<ConsultantRank>>(&key) {
            tracing::debug!(
                category = category.key_part(),
                "top consultants served from session cache"
            );
            return cached;
        }

        let fetchers = Arc::clone(&self.fetchers);
        let consultants = self
            .fetch_with_timeout("top_consultants", async move {
                fetchers.top_consultants(category, limit).await
            })
            .await
            .unwrap_or_default();

        self.store.write(&key, &consultants, None);
        consultants
    }

    /// The overview series for `metric`. Successful rollups are cached;
    /// failures return an empty series and cache nothing so a later
    /// request can retry.
    pub async fn sales_overview(&self, metric: OverviewMetric) -> Vec<DailyActivity> {
        let key = self.key(&format!("sales_overview_{}", metric.key_part()));
        if let Some(cached) = self.store.read::<Vec<DailyActivity>>(&key) {
            tracing::debug!(metric = metric.key_part(), "overview served from session cache");
            return cached;
        }

        match self.fetchers.recent_activity(metric).await {
            Ok(records) => {
                let series = daily_activity(&records, metric, Utc::now().date_naive());
                self.store.write(&key, &series, None);
                series
            }
            Err(error) => {
                tracing::warn!(%error, metric = metric.key_part(), "overview fetch failed");
                Vec::new()
            }
        }
    }

    /// Drop every cached dashboard entry in both tiers.
    pub fn clear_cache(&self) -> usize {
        self.invalidator
            .invalidate(&KeyPattern::namespace(self.namespace.clone()))
    }

    async fn scoped(&self) -> Option<DataScope> {
        match self.identity.current().await {
            Some(principal) => Some(resolve_scope(&principal, self.fetchers.as_ref()).await),
            None => {
                tracing::debug!("dashboard query before authentication; serving empty");
                None
            }
        }
    }

    /// Race `fetch` against [`LEADERBOARD_TIMEOUT`]. On timeout the fetch
    /// is left running detached; whichever side loses is discarded.
    async fn fetch_with_timeout<T, F>(&self, label: &'static str, fetch: F) -> Option<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, crate::fetchers::FetchError>> + Send + 'static,
    {
        let handle = tokio::spawn(fetch);
        tokio::select! {
            joined = handle => match joined {
                Ok(Ok(value)) => Some(value),
                Ok(Err(error)) => {
                    tracing::warn!(%error, label, "dashboard fetch failed; using empty result");
                    None
                }
                Err(join_error) => {
                    tracing::warn!(%join_error, label, "dashboard fetch aborted; using empty result");
                    None
                }
            },
            _ = tokio::time::sleep(LEADERBOARD_TIMEOUT) => {
                tracing::warn!(
                    label,
                    timeout_secs = LEADERBOARD_TIMEOUT.as_secs(),
                    "dashboard fetch timed out; using empty result"
                );
                None
            }
        }
    }
}

/// The namespace every dashboard key lives under.
pub fn dashboard_namespace() -> Namespace {
    Namespace::new("dashboard").expect("`dashboard` is a valid namespace literal")
}
