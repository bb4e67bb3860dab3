//! View-model types for the admin dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary counters on the dashboard landing page.
///
/// `#[serde(default)]` lets a partially cached object decode to zeroed
/// counters instead of poisoning the read path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_bookings: u64,
    pub total_leads: u64,
    pub recent_bookings: u64,
    pub recent_leads: u64,
    pub total_umrah_bookings: u64,
    pub total_outbound_bookings: u64,
}

/// One row of the top-packages leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRank {
    pub id: String,
    pub name: String,
    pub bookings: u64,
    pub revenue: f64,
}

/// One row of the top-inquiries leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryRank {
    pub id: String,
    pub name: String,
    pub inquiries: u64,
}

/// One row of the top-consultants leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantRank {
    pub id: String,
    pub name: String,
    pub total_revenue: f64,
    pub recent_revenue: f64,
    pub total_bookings: u64,
    pub recent_bookings: u64,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub consultant_number: Option<String>,
    pub branches: Vec<String>,
    pub profile_image: String,
    pub category_bookings: u64,
}

/// Derived avatar for consultants without an uploaded photo.
pub fn avatar_url(name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("https://ui-avatars.com/api/?name={encoded}&background=10b981&color=fff&size=40")
}

/// A raw booking or lead row, fed to the daily rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub created_at: DateTime<Utc>,
    /// Set when the record belongs to an umrah package; absent means
    /// outbound travel.
    pub umrah_category: Option<String>,
    pub total_price: Option<f64>,
    pub participants: Option<u32>,
}

/// One day of the sales/inquiry overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date_label: String,
    pub umrah_count: u64,
    pub outbound_count: u64,
    pub total_count: u64,
    pub umrah_percentage: u8,
    pub outbound_percentage: u8,
    pub umrah_revenue: f64,
    pub outbound_revenue: f64,
}

/// Leaderboard slice for packages and inquiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    Overall,
    Umrah,
    Outbound,
}

impl CategoryFilter {
    pub const ALL: [CategoryFilter; 3] = [
        CategoryFilter::Overall,
        CategoryFilter::Umrah,
        CategoryFilter::Outbound,
    ];

    /// Stable fragment used in cache identifiers.
    pub fn key_part(&self) -> &'static str {
        match self {
            CategoryFilter::Overall => "overall",
            CategoryFilter::Umrah => "umrah",
            CategoryFilter::Outbound => "outbound",
        }
    }
}

/// Slice for the consultants leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultantCategory {
    Umrah,
    Outbound,
}

impl ConsultantCategory {
    pub const ALL: [ConsultantCategory; 2] =
        [ConsultantCategory::Umrah, ConsultantCategory::Outbound];

    pub fn key_part(&self) -> &'static str {
        match self {
            ConsultantCategory::Umrah => "umrah",
            ConsultantCategory::Outbound => "outbound",
        }
    }
}

/// Which series the overview chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewMetric {
    Sales,
    Inquiries,
}

impl OverviewMetric {
    pub const ALL: [OverviewMetric; 2] = [OverviewMetric::Sales, OverviewMetric::Inquiries];

    pub fn key_part(&self) -> &'static str {
        match self {
            OverviewMetric::Sales => "sales",
            OverviewMetric::Inquiries => "inquiries",
        }
    }
}
