//! Daily rollup of raw activity rows into the overview series.

use crate::types::{ActivityRecord, DailyActivity, OverviewMetric};
use chrono::{Datelike, Days, NaiveDate};

/// Days covered by the overview, today included.
pub const OVERVIEW_DAYS: u64 = 3;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mac", "Apr", "Mei", "Jun", "Jul", "Ogo", "Sep", "Okt", "Nov", "Dis",
];

/// Bucket `records` into per-day umrah/outbound splits for the last
/// [`OVERVIEW_DAYS`] days, oldest day first.
///
/// Sales weigh each row by its participant count (default 1) and sum
/// revenue; inquiries count rows and carry no revenue. Percentages are
/// rounded shares of the day's total and stay zero on empty days.
pub fn daily_activity(
    records: &[ActivityRecord],
    metric: OverviewMetric,
    today: NaiveDate,
) -> Vec<DailyActivity> {
    let mut series = Vec::with_capacity(OVERVIEW_DAYS as usize);

    for days_back in 0..OVERVIEW_DAYS {
        let target = today
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(today);

        let mut umrah_count = 0u64;
        let mut outbound_count = 0u64;
        let mut umrah_revenue = 0f64;
        let mut outbound_revenue = 0f64;

        for record in records {
            if record.created_at.date_naive() != target {
                continue;
            }
            let is_umrah = record.umrah_category.is_some();
            match metric {
                OverviewMetric::Sales => {
                    let weight = u64::from(record.participants.unwrap_or(1));
                    let revenue = record.total_price.unwrap_or(0.0);
                    if is_umrah {
                        umrah_count += weight;
                        umrah_revenue += revenue;
                    } else {
                        outbound_count += weight;
                        outbound_revenue += revenue;
                    }
                }
                OverviewMetric::Inquiries => {
                    if is_umrah {
                        umrah_count += 1;
                    } else {
                        outbound_count += 1;
                    }
                }
            }
        }

        let total_count = umrah_count + outbound_count;
        let (umrah_percentage, outbound_percentage) = if total_count > 0 {
            (
                percentage(umrah_count, total_count),
                percentage(outbound_count, total_count),
            )
        } else {
            (0, 0)
        };

        series.push(DailyActivity {
            date_label: format_date(target),
            umrah_count,
            outbound_count,
            total_count,
            umrah_percentage,
            outbound_percentage,
            umrah_revenue,
            outbound_revenue,
        });
    }

    // Oldest to newest, the order the chart reads.
    series.reverse();
    series
}

fn percentage(part: u64, total: u64) -> u8 {
    ((part as f64 / total as f64) * 100.0).round() as u8
}

fn format_date(date: NaiveDate) -> String {
    let month = MONTH_LABELS[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}
