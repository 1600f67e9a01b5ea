//! Storage growth projection.
//!
//! Fits a linear trend to cumulative snapshot size and forecasts days until
//! the destination disk fills up. Every function here is total: no data,
//! zero capacity, and flat growth all degrade to zero/None results because
//! this feeds a chart, not a correctness-critical path.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::timeline::TimelineSnapshot;
use crate::source::DiskStats;

/// Default number of projected daily points.
pub const PROJECTION_HORIZON_DAYS: usize = 30;

/// One point of the usage chart, historical or projected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsagePoint {
    /// Local calendar day, "YYYY-MM-DD". Snapshots on the same day merge
    /// into one point.
    pub date_key: String,
    pub timestamp: i64,
    pub cumulative_bytes: u64,
    pub projected: bool,
}

/// Ordinary least-squares fit over (index, cumulative size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityForecast {
    /// Fitted growth per point, clamped to zero. A shrinking trend never
    /// reports negative growth.
    pub daily_growth_bytes: f64,
    /// None when growth is zero or free space is unknown.
    pub days_until_full: Option<i64>,
    pub total_capacity_bytes: u64,
}

/// Alert bands derived from `days_until_full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Nominal,
}

impl Severity {
    pub fn of(days_until_full: Option<i64>) -> Self {
        match days_until_full {
            Some(days) if days < 7 => Severity::Critical,
            Some(days) if days < 30 => Severity::Warning,
            _ => Severity::Nominal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Nominal => "nominal",
        }
    }
}

fn day_key(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "out-of-range".to_string())
}

/// Running sum of snapshot sizes in ascending timestamp order, one point
/// per local calendar day. Sorts its input defensively.
pub fn cumulative_usage(snapshots: &[TimelineSnapshot]) -> Vec<UsagePoint> {
    let mut ordered: Vec<&TimelineSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.timestamp());

    let mut points: Vec<UsagePoint> = Vec::new();
    let mut running: u64 = 0;

    for snapshot in ordered {
        running = running.saturating_add(snapshot.size_bytes());
        let key = day_key(snapshot.timestamp());

        match points.last_mut() {
            Some(last) if last.date_key == key => {
                last.cumulative_bytes = running;
                last.timestamp = snapshot.timestamp();
            }
            _ => points.push(UsagePoint {
                date_key: key,
                timestamp: snapshot.timestamp(),
                cumulative_bytes: running,
                projected: false,
            }),
        }
    }

    points
}

/// Least-squares fit with x = point index, y = cumulative bytes. Index
/// rather than raw timestamp keeps unevenly spaced snapshots from skewing
/// the slope toward periods with large gaps.
pub fn linear_regression(points: &[UsagePoint]) -> RegressionResult {
    match points {
        [] => return RegressionResult { slope: 0.0, intercept: 0.0 },
        [only] => {
            return RegressionResult {
                slope: 0.0,
                intercept: only.cumulative_bytes as f64,
            }
        }
        _ => {}
    }

    let n = points.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;

    for (i, point) in points.iter().enumerate() {
        let x = i as f64;
        let y = point.cumulative_bytes as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return RegressionResult {
            slope: 0.0,
            intercept: sum_y / n,
        };
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    RegressionResult { slope, intercept }
}

/// Forecast days until the destination fills. `disk` is absent when no
/// disk-stats collaborator has reported capacity for the job yet; that
/// reads as "unknown", never as an error.
pub fn forecast(points: &[UsagePoint], disk: Option<DiskStats>) -> CapacityForecast {
    let regression = linear_regression(points);
    let daily_growth_bytes = regression.slope.max(0.0);

    let total_capacity_bytes = disk.map_or(0, |d| d.total_bytes);
    let free = disk.map(|d| d.available_bytes);

    let days_until_full = match free {
        Some(free) if free > 0 && daily_growth_bytes > 0.0 => {
            Some((free as f64 / daily_growth_bytes).floor() as i64)
        }
        _ => None,
    };

    CapacityForecast {
        daily_growth_bytes,
        days_until_full,
        total_capacity_bytes,
    }
}

/// Extrapolate up to `horizon` daily points past the last historical one
/// at the clamped growth rate. Stops before any point would cross total
/// capacity; nothing is ever drawn past the disk's size.
pub fn project(
    points: &[UsagePoint],
    forecast: &CapacityForecast,
    horizon: usize,
) -> Vec<UsagePoint> {
    const MS_PER_DAY: i64 = 86_400_000;

    let Some(last) = points.last() else {
        return Vec::new();
    };

    let mut projected = Vec::new();

    for day in 1..=horizon {
        let value = last.cumulative_bytes as f64 + forecast.daily_growth_bytes * day as f64;

        if forecast.total_capacity_bytes > 0 && value > forecast.total_capacity_bytes as f64 {
            break;
        }

        let timestamp = last.timestamp + day as i64 * MS_PER_DAY;
        projected.push(UsagePoint {
            date_key: day_key(timestamp),
            timestamp,
            cumulative_bytes: value as u64,
            projected: true,
        });
    }

    projected
}
