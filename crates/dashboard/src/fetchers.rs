//! The opaque upstream data boundary.
//!
//! The backing query layer implements this trait; the cache subsystem
//! treats every method as a black box and never inspects a failure
//! beyond "it failed".

use crate::scope::DataScope;
use crate::types::{
    ActivityRecord, CategoryFilter, ConsultantCategory, ConsultantRank, DashboardStats,
    InquiryRank, OverviewMetric, PackageRank,
};
use async_trait::async_trait;
use safar_core::{BranchId, UserId};

/// Opaque upstream failure.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

pub type FetchResult<T> = Result<T, FetchError>;

/// Upstream queries feeding the dashboard.
#[async_trait]
pub trait DashboardFetchers: Send + Sync {
    async fn dashboard_stats(&self, scope: &DataScope) -> FetchResult<DashboardStats>;

    async fn top_packages(
        &self,
        scope: &DataScope,
        filter: CategoryFilter,
        limit: usize,
    ) -> FetchResult<Vec<PackageRank>>;

    async fn top_inquiries(
        &self,
        scope: &DataScope,
        filter: CategoryFilter,
        limit: usize,
    ) -> FetchResult<Vec<InquiryRank>>;

    async fn top_consultants(
        &self,
        category: ConsultantCategory,
        limit: usize,
    ) -> FetchResult<Vec<ConsultantRank>>;

    /// Raw booking or lead rows from the recent activity window.
    async fn recent_activity(&self, metric: OverviewMetric) -> FetchResult<Vec<ActivityRecord>>;

    /// The branch a staff account belongs to, if any.
    async fn branch_for_user(&self, user_id: &UserId) -> FetchResult<Option<BranchId>>;
}
