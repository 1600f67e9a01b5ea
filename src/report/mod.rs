pub mod json;
pub mod table;

use serde::Serialize;

use crate::source::DensityBucket;
use crate::timeline::cluster::{PositionedMarker, TimeRange};
use crate::timeline::project::{CapacityForecast, Severity, UsagePoint};
use crate::timeline::TimelineSnapshot;

/// Everything the timeline ruler needs for one render.
#[derive(Serialize)]
pub struct TimelineReport {
    pub range: TimeRange,
    pub total_snapshots: usize,
    pub markers: Vec<PositionedMarker>,
}

/// Capacity forecast plus the historical and projected usage series.
#[derive(Serialize)]
pub struct ForecastReport {
    pub forecast: CapacityForecast,
    pub severity: Severity,
    pub history: Vec<UsagePoint>,
    pub projected: Vec<UsagePoint>,
}

/// Result of a closest-to-date jump.
#[derive(Serialize)]
pub struct GotoReport {
    pub target_ms: i64,
    pub distance_ms: i64,
    pub snapshot: TimelineSnapshot,
}

/// Per-month snapshot counts for one year, with the year picker data.
#[derive(Serialize)]
pub struct DensityReport {
    pub years: Vec<i32>,
    pub year: i32,
    pub months: [u32; 12],
}

/// Raw index density buckets (day/month/year keys).
#[derive(Serialize)]
pub struct BucketReport {
    pub job_id: String,
    pub buckets: Vec<DensityBucket>,
}
