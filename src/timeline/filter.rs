//! Calendar and rolling-window filtering.
//!
//! Two independent filter modes plus the reporting helpers that back the
//! year picker and the calendar heatmap. The calendar mode returns
//! newest-first because it feeds list views; the aggregator's ascending
//! order is deliberately not preserved here.

use chrono::{DateTime, Datelike, Local};

use crate::timeline::TimelineSnapshot;

const MS_PER_DAY: i64 = 86_400_000;

/// Zero-based month selector (0 = January, 11 = December).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Month(u32),
}

/// Rolling "last N days" window anchored to a caller-supplied now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    All,
    Days(u64),
}

fn local_date(timestamp_ms: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|utc| utc.with_timezone(&Local))
}

/// Keep snapshots whose local calendar year (and month, if given) matches.
/// Output is sorted descending by timestamp, newest first.
pub fn filter_by_calendar(
    snapshots: &[TimelineSnapshot],
    year: i32,
    month: MonthFilter,
) -> Vec<TimelineSnapshot> {
    let mut matched: Vec<TimelineSnapshot> = snapshots
        .iter()
        .filter(|s| {
            let Some(date) = local_date(s.timestamp()) else {
                return false;
            };
            if date.year() != year {
                return false;
            }
            match month {
                MonthFilter::All => true,
                MonthFilter::Month(m) => date.month0() == m,
            }
        })
        .cloned()
        .collect();

    matched.sort_by_key(|s| std::cmp::Reverse(s.timestamp()));
    matched
}

/// Keep snapshots newer than `now - window`. `Window::All` passes
/// everything through untouched.
pub fn filter_by_window(
    snapshots: &[TimelineSnapshot],
    window: Window,
    now_ms: i64,
) -> Vec<TimelineSnapshot> {
    let days = match window {
        Window::All => return snapshots.to_vec(),
        Window::Days(days) => days,
    };

    let cutoff = now_ms.saturating_sub(days as i64 * MS_PER_DAY);
    snapshots
        .iter()
        .filter(|s| s.timestamp() >= cutoff)
        .cloned()
        .collect()
}

/// Distinct local calendar years present in the set, newest first.
/// Backs the year picker; does not touch the filtered set.
pub fn available_years(snapshots: &[TimelineSnapshot]) -> Vec<i32> {
    let mut years: Vec<i32> = snapshots
        .iter()
        .filter_map(|s| local_date(s.timestamp()).map(|d| d.year()))
        .collect();

    years.sort_unstable();
    years.dedup();
    years.reverse();
    years
}

/// Snapshot count per month of the given year (index 0 = January).
/// Backs the calendar heatmap.
pub fn month_density(snapshots: &[TimelineSnapshot], year: i32) -> [u32; 12] {
    let mut counts = [0u32; 12];

    for s in snapshots {
        if let Some(date) = local_date(s.timestamp()) {
            if date.year() == year {
                counts[date.month0() as usize] += 1;
            }
        }
    }

    counts
}
