//! Terminal rendering for timeline, forecast, and density output.
//!
//! The ruler is drawn as a fixed-width ASCII track with one glyph per
//! marker; tables follow the same column layout everywhere so output
//! stays scannable when piped through a pager.

use crate::report::{BucketReport, DensityReport, ForecastReport, GotoReport, TimelineReport};
use crate::timeline::TimelineSnapshot;
use crate::util::{format_bytes, format_timestamp};

const TRACK_WIDTH: usize = 80;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn render_list(snapshots: &[TimelineSnapshot]) -> String {
    if snapshots.is_empty() {
        return String::from("No snapshots match.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<20} {:<14} {:>10} {:>9} {:>8} {:<8}\n",
        "Date", "Job", "Size", "Files", "Changes", "Status"
    ));
    output.push_str(&"-".repeat(74));
    output.push('\n');

    for s in snapshots {
        output.push_str(&format!(
            "{:<20} {:<14} {:>10} {:>9} {:>8} {:<8}\n",
            format_timestamp(s.timestamp()),
            truncate(&s.job_name, 14),
            format_bytes(s.size_bytes()),
            s.snapshot.file_count,
            s.snapshot.changes_count,
            s.snapshot.status.as_str()
        ));
    }

    output.push_str(&format!("\n{} snapshots\n", snapshots.len()));
    output
}

pub fn render_timeline(report: &TimelineReport) -> String {
    if report.markers.is_empty() {
        return String::from("No snapshots to place on the timeline.\n");
    }

    let mut output = String::new();

    // ascii ruler: one glyph per marker, clusters drawn heavier
    let mut track = vec!['-'; TRACK_WIDTH];
    for marker in &report.markers {
        let col = (marker.position / 100.0 * (TRACK_WIDTH - 1) as f64).round() as usize;
        let col = col.min(TRACK_WIDTH - 1);
        track[col] = if marker.is_cluster { '#' } else { 'o' };
    }

    output.push_str(&format!(
        "{}  {}\n",
        format_timestamp(report.range.start),
        format_timestamp(report.range.end)
    ));
    output.push('[');
    output.extend(track);
    output.push_str("]\n\n");

    output.push_str(&format!(
        "{:>8} {:>6} {:<20} {:<20}\n",
        "Position", "Count", "First", "Last"
    ));
    output.push_str(&"-".repeat(58));
    output.push('\n');

    for marker in &report.markers {
        let first = marker.snapshots.first().map(|s| s.timestamp());
        let last = marker.snapshots.last().map(|s| s.timestamp());

        output.push_str(&format!(
            "{:>7.1}% {:>6} {:<20} {:<20}\n",
            marker.position,
            marker.snapshots.len(),
            first.map(format_timestamp).unwrap_or_default(),
            last.map(format_timestamp).unwrap_or_default(),
        ));
    }

    output.push_str(&format!(
        "\n{} snapshots in {} markers\n",
        report.total_snapshots,
        report.markers.len()
    ));
    output
}

pub fn render_forecast(report: &ForecastReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "daily growth:    {}/day\n",
        format_bytes(report.forecast.daily_growth_bytes as u64)
    ));

    if report.forecast.total_capacity_bytes > 0 {
        output.push_str(&format!(
            "capacity:        {}\n",
            format_bytes(report.forecast.total_capacity_bytes)
        ));
    } else {
        output.push_str("capacity:        unknown\n");
    }

    match report.forecast.days_until_full {
        Some(days) => output.push_str(&format!("days until full: {days}\n")),
        None => output.push_str("days until full: n/a\n"),
    }
    output.push_str(&format!("status:          {}\n", report.severity.as_str()));

    if report.history.is_empty() {
        output.push_str("\nNo usage history.\n");
        return output;
    }

    output.push_str(&format!("\n{:<12} {:>12}\n", "Date", "Cumulative"));
    output.push_str(&"-".repeat(40));
    output.push('\n');

    // keep the chart bounded; oldest history is the least interesting part
    let shown_history = report.history.iter().rev().take(12).rev();
    for point in shown_history {
        output.push_str(&format!(
            "{:<12} {:>12}\n",
            point.date_key,
            format_bytes(point.cumulative_bytes)
        ));
    }

    for point in &report.projected {
        output.push_str(&format!(
            "{:<12} {:>12}  (projected)\n",
            point.date_key,
            format_bytes(point.cumulative_bytes)
        ));
    }

    output
}

pub fn render_goto(report: &GotoReport) -> String {
    let s = &report.snapshot;
    let offset_secs = report.distance_ms / 1000;

    format!(
        "Closest backup: {} ({} from target)\n  job: {}\n  size: {}, {} files, status {}\n",
        format_timestamp(s.timestamp()),
        humantime::format_duration(std::time::Duration::from_secs(offset_secs.unsigned_abs())),
        s.job_name,
        format_bytes(s.size_bytes()),
        s.snapshot.file_count,
        s.snapshot.status.as_str()
    )
}

pub fn render_density(report: &DensityReport) -> String {
    let mut output = String::new();

    if !report.years.is_empty() {
        let years: Vec<String> = report.years.iter().map(i32::to_string).collect();
        output.push_str(&format!("years with backups: {}\n\n", years.join(", ")));
    }

    output.push_str(&format!("{}\n", report.year));
    for (month, count) in report.months.iter().enumerate() {
        output.push_str(&format!(
            "  {} {:>4} {}\n",
            MONTH_NAMES[month],
            count,
            "#".repeat((*count as usize).min(40))
        ));
    }

    output
}

pub fn render_buckets(report: &BucketReport) -> String {
    if report.buckets.is_empty() {
        return format!("No snapshots indexed for job {}.\n", report.job_id);
    }

    let mut output = String::new();
    output.push_str(&format!("{:<12} {:>6}\n", "Period", "Count"));
    output.push_str(&"-".repeat(19));
    output.push('\n');

    for bucket in &report.buckets {
        output.push_str(&format!("{:<12} {:>6}\n", bucket.period, bucket.count));
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
