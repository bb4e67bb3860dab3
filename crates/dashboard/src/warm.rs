//! The fixed dashboard warm catalog.
//!
//! Built once identity resolves and handed to the cache warmer so the
//! landing page paints from cache. Catalog entries mirror the read-through
//! helpers key-for-key; a warmed entry and a UI request must always agree
//! on the cache key or warming is wasted.

use crate::fetchers::DashboardFetchers;
use crate::queries::{dashboard_namespace, DEFAULT_LEADERBOARD_LIMIT};
use crate::rollup::daily_activity;
use crate::scope::{resolve_scope, DataScope};
use crate::types::{CategoryFilter, ConsultantCategory, OverviewMetric};
use chrono::Utc;
use safar_cache::{CacheWarmer, KeyCodec, WarmEntry, WarmPolicy, WarmReport};
use safar_core::IdentityProvider;
use std::sync::Arc;

/// Build the full warm catalog for `scope`.
///
/// Summary stats and the overview series use [`WarmPolicy::SkipCache`]
/// (a failed or empty warm must not paint zeros); every leaderboard uses
/// [`WarmPolicy::CacheEmpty`] (an empty board is an answer, and thrash is
/// the worse evil).
pub fn dashboard_warm_entries(
    codec: &KeyCodec,
    scope: DataScope,
    fetchers: Arc<dyn DashboardFetchers>,
) -> Vec<WarmEntry> {
    let ns = dashboard_namespace();
    let limit = DEFAULT_LEADERBOARD_LIMIT;
    let mut entries = Vec::new();

    entries.push(WarmEntry::new(
        codec.build(&ns, "stats"),
        WarmPolicy::SkipCache,
        {
            let fetchers = Arc::clone(&fetchers);
            let scope = scope.clone();
            move || {
                let fetchers = Arc::clone(&fetchers);
                let scope = scope.clone();
                async move {
                    let stats = fetchers.dashboard_stats(&scope).await?;
                    Ok(serde_json::to_value(stats)?)
                }
            }
        },
    ));

    for filter in CategoryFilter::ALL {
        entries.push(WarmEntry::new(
            codec.build(&ns, &format!("top_packages_{}_{}", filter.key_part(), limit)),
            WarmPolicy::CacheEmpty,
            {
                let fetchers = Arc::clone(&fetchers);
                let scope = scope.clone();
                move || {
                    let fetchers = Arc::clone(&fetchers);
                    let scope = scope.clone();
                    async move {
                        let packages = fetchers.top_packages(&scope, filter, limit).await?;
                        Ok(serde_json::to_value(packages)?)
                    }
                }
            },
        ));
    }

    for filter in CategoryFilter::ALL {
        entries.push(WarmEntry::new(
            codec.build(&ns, &format!("top_inquiries_{}_{}", filter.key_part(), limit)),
            WarmPolicy::CacheEmpty,
            {
                let fetchers = Arc::clone(&fetchers);
                let scope = scope.clone();
                move || {
                    let fetchers = Arc::clone(&fetchers);
                    let scope = scope.clone();
                    async move {
                        let inquiries = fetchers.top_inquiries(&scope, filter, limit).await?;
                        Ok(serde_json::to_value(inquiries)?)
                    }
                }
            },
        ));
    }

    for category in ConsultantCategory::ALL {
        entries.push(WarmEntry::new(
            codec.build(
                &ns,
                &format!("top_consultants_{}_{}", category.key_part(), limit),
            ),
            WarmPolicy::CacheEmpty,
            {
                let fetchers = Arc::clone(&fetchers);
                move || {
                    let fetchers = Arc::clone(&fetchers);
                    async move {
                        let consultants = fetchers.top_consultants(category, limit).await?;
                        Ok(serde_json::to_value(consultants)?)
                    }
                }
            },
        ));
    }

    for metric in OverviewMetric::ALL {
        entries.push(WarmEntry::new(
            codec.build(&ns, &format!("sales_overview_{}", metric.key_part())),
            WarmPolicy::SkipCache,
            {
                let fetchers = Arc::clone(&fetchers);
                move || {
                    let fetchers = Arc::clone(&fetchers);
                    async move {
                        let records = fetchers.recent_activity(metric).await?;
                        let series = daily_activity(&records, metric, Utc::now().date_naive());
                        Ok(serde_json::to_value(series)?)
                    }
                }
            },
        ));
    }

    entries
}

/// Warm the dashboard for the current principal, fire-and-forget.
///
/// Skips entirely (returning `None`) when no session is active yet; the
/// next auth state change should call it again.
pub async fn warm_dashboard(
    warmer: &CacheWarmer,
    codec: &KeyCodec,
    identity: &dyn IdentityProvider,
    fetchers: Arc<dyn DashboardFetchers>,
) -> Option<WarmReport> {
    let Some(principal) = identity.current().await else {
        tracing::debug!("skipping dashboard warm: no authenticated session");
        return None;
    };

    let scope = resolve_scope(&principal, fetchers.as_ref()).await;
    tracing::debug!(?scope, "warming dashboard caches");
    let entries = dashboard_warm_entries(codec, scope, fetchers);
    Some(warmer.warm(entries).await)
}
