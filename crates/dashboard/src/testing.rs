//! Test doubles shared by the dashboard test modules.

use crate::fetchers::{DashboardFetchers, FetchResult};
use crate::scope::DataScope;
use crate::types::{
    avatar_url, ActivityRecord, CategoryFilter, ConsultantCategory, ConsultantRank,
    DashboardStats, InquiryRank, OverviewMetric, PackageRank,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use safar_core::{BranchId, UserId};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Canned upstream with per-endpoint failure switches, an optional
/// artificial delay, and call counting.
pub(crate) struct StubFetchers {
    stats: DashboardStats,
    packages: Vec<PackageRank>,
    inquiries: Vec<InquiryRank>,
    consultants: Vec<ConsultantRank>,
    activity: Vec<ActivityRecord>,
    branch: Option<BranchId>,
    failing: HashSet<&'static str>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl Default for StubFetchers {
    fn default() -> Self {
        Self {
            stats: DashboardStats {
                total_bookings: 120,
                total_leads: 75,
                recent_bookings: 12,
                recent_leads: 8,
                total_umrah_bookings: 90,
                total_outbound_bookings: 30,
            },
            packages: vec![PackageRank {
                id: "pkg-1".to_string(),
                name: "Gold 12D".to_string(),
                bookings: 40,
                revenue: 480_000.0,
            }],
            inquiries: vec![InquiryRank {
                id: "inq-1".to_string(),
                name: "Gold 12D".to_string(),
                inquiries: 22,
            }],
            consultants: vec![ConsultantRank {
                id: "con-1".to_string(),
                name: "Nur Aisyah".to_string(),
                total_revenue: 250_000.0,
                recent_revenue: 40_000.0,
                total_bookings: 31,
                recent_bookings: 5,
                email: Some("aisyah@example.com".to_string()),
                whatsapp: None,
                consultant_number: Some("SC-014".to_string()),
                branches: vec!["Shah Alam".to_string()],
                profile_image: avatar_url("Nur Aisyah"),
                category_bookings: 18,
            }],
            activity: vec![ActivityRecord {
                created_at: Utc::now(),
                umrah_category: Some("cat-1".to_string()),
                total_price: Some(9_500.0),
                participants: Some(2),
            }],
            branch: None,
            failing: HashSet::new(),
            delay: None,
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl StubFetchers {
    /// Make `endpoint` fail from now on.
    pub(crate) fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing.insert(endpoint);
        self
    }

    /// Delay every response, for timeout races.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_branch(mut self, branch: BranchId) -> Self {
        self.branch = Some(branch);
        self
    }

    pub(crate) fn calls(&self, endpoint: &'static str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    async fn answer<T>(&self, endpoint: &'static str, value: T) -> FetchResult<T> {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(endpoint) {
            return Err(format!("{endpoint}: stub failure").into());
        }
        Ok(value)
    }
}

#[async_trait]
impl DashboardFetchers for StubFetchers {
    async fn dashboard_stats(&self, _scope: &DataScope) -> FetchResult<DashboardStats> {
        self.answer("dashboard_stats", self.stats.clone()).await
    }

    async fn top_packages(
        &self,
        _scope: &DataScope,
        _filter: CategoryFilter,
        _limit: usize,
    ) -> FetchResult<Vec<PackageRank>> {
        self.answer("top_packages", self.packages.clone()).await
    }

    async fn top_inquiries(
        &self,
        _scope: &DataScope,
        _filter: CategoryFilter,
        _limit: usize,
    ) -> FetchResult<Vec<InquiryRank>> {
        self.answer("top_inquiries", self.inquiries.clone()).await
    }

    async fn top_consultants(
        &self,
        _category: ConsultantCategory,
        _limit: usize,
    ) -> FetchResult<Vec<ConsultantRank>> {
        self.answer("top_consultants", self.consultants.clone())
            .await
    }

    async fn recent_activity(&self, _metric: OverviewMetric) -> FetchResult<Vec<ActivityRecord>> {
        self.answer("recent_activity", self.activity.clone()).await
    }

    async fn branch_for_user(&self, _user_id: &UserId) -> FetchResult<Option<BranchId>> {
        self.answer("branch_for_user", self.branch.clone()).await
    }
}
