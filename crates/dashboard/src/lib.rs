//! Dashboard data helpers for the safar admin application.
//!
//! Sits between the UI and the upstream query layer:
//!
//! - **`fetchers`**: the opaque upstream boundary every query goes through.
//! - **`scope`**: which slice of data a principal may see.
//! - **`queries`**: session-cached read-through helpers, one per surface.
//! - **`rollup`**: the daily sales/inquiry overview series.
//! - **`warm`**: the fixed catalog handed to the cache warmer after login.
//!
//! All caching behavior (TTLs, session scoping, sweeps) lives in
//! `safar-cache`; this crate decides keys, policies, and shapes.

pub mod fetchers;
pub mod queries;
pub mod rollup;
pub mod scope;
pub mod types;
pub mod warm;

#[cfg(test)]
pub(crate) mod testing;

pub use fetchers::{DashboardFetchers, FetchError, FetchResult};
pub use queries::{
    dashboard_namespace, DashboardData, DEFAULT_LEADERBOARD_LIMIT, LEADERBOARD_TIMEOUT,
};
pub use rollup::{daily_activity, OVERVIEW_DAYS};
pub use scope::{resolve_scope, DataScope};
pub use types::{
    avatar_url, ActivityRecord, CategoryFilter, ConsultantCategory, ConsultantRank,
    DailyActivity, DashboardStats, InquiryRank, OverviewMetric, PackageRank,
};
pub use warm::{dashboard_warm_entries, warm_dashboard};
