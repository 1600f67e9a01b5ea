use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use snaptrail::source::sqlite::SqliteSource;
use snaptrail::source::{DensityPeriod, DiskStats, SnapshotSource};
use snaptrail::timeline::cluster::{downsample, TimeRange, Timeline, MAX_MARKERS};
use snaptrail::timeline::project;
use snaptrail::timeline::{aggregate, Job, SnapshotStatus};

const MS_PER_DAY: i64 = 86_400_000;

struct Row {
    job_id: &'static str,
    job_name: &'static str,
    timestamp: i64,
    total_size: i64,
    file_count: i64,
    status: &'static str,
}

/// Write a snapshot index the way the backup engine's indexer would, then
/// hand back a read-only source over it.
fn index_with(rows: &[Row]) -> (TempDir, SqliteSource) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("index.db");

    let conn = Connection::open(&db_path).unwrap();
    conn.execute(
        "CREATE TABLE snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id TEXT NOT NULL,
            job_name TEXT,
            timestamp INTEGER NOT NULL,
            path TEXT,
            file_count INTEGER NOT NULL,
            total_size INTEGER NOT NULL,
            changes_count INTEGER NOT NULL DEFAULT 0,
            status TEXT,
            duration_ms INTEGER
        )",
        [],
    )
    .unwrap();

    for row in rows {
        conn.execute(
            "INSERT INTO snapshots (job_id, job_name, timestamp, path, file_count, total_size, changes_count, status, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.job_id,
                row.job_name,
                row.timestamp,
                format!("/backups/{}/{}", row.job_id, row.timestamp),
                row.file_count,
                row.total_size,
                3,
                row.status,
                42_000
            ],
        )
        .unwrap();
    }
    drop(conn);

    let source = SqliteSource::open(&db_path).unwrap();
    (dir, source)
}

fn utc_ms(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

fn load_all_jobs(source: &SqliteSource) -> Vec<Job> {
    source
        .list_jobs()
        .unwrap()
        .into_iter()
        .map(|j| Job {
            snapshots: Some(source.list_snapshots(&j.id).unwrap()),
            id: j.id,
            name: j.name,
        })
        .collect()
}

#[test]
fn rows_are_validated_at_the_boundary() {
    let (_dir, source) = index_with(&[
        Row {
            job_id: "laptop",
            job_name: "Laptop Home",
            timestamp: 1_000,
            total_size: -250,
            file_count: 10,
            status: "corrupted-status",
        },
        Row {
            job_id: "laptop",
            job_name: "Laptop Home",
            timestamp: 2_000,
            total_size: 500,
            file_count: 20,
            status: "partial",
        },
    ]);

    let snapshots = source.list_snapshots("laptop").unwrap();
    assert_eq!(snapshots.len(), 2);

    // newest first straight from the index
    assert_eq!(snapshots[0].timestamp, 2_000);
    assert_eq!(snapshots[0].status, SnapshotStatus::Partial);

    // negative size clamps, unknown status reads as complete
    assert_eq!(snapshots[1].size_bytes, 0);
    assert_eq!(snapshots[1].status, SnapshotStatus::Complete);
}

#[test]
fn range_query_is_inclusive_on_both_ends() {
    let (_dir, source) = index_with(&[
        Row { job_id: "a", job_name: "a", timestamp: 100, total_size: 1, file_count: 1, status: "complete" },
        Row { job_id: "a", job_name: "a", timestamp: 200, total_size: 1, file_count: 1, status: "complete" },
        Row { job_id: "a", job_name: "a", timestamp: 300, total_size: 1, file_count: 1, status: "complete" },
    ]);

    let hits = source.list_snapshots_in_range("a", 100, 200).unwrap();
    let timestamps: Vec<i64> = hits.iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, vec![200, 100]);
}

#[test]
fn aggregate_stats_cover_the_whole_job() {
    let (_dir, source) = index_with(&[
        Row { job_id: "a", job_name: "a", timestamp: 100, total_size: 10, file_count: 5, status: "complete" },
        Row { job_id: "a", job_name: "a", timestamp: 900, total_size: 30, file_count: 7, status: "complete" },
        Row { job_id: "other", job_name: "other", timestamp: 50, total_size: 999, file_count: 1, status: "complete" },
    ]);

    let stats = source.job_aggregate_stats("a").unwrap();
    assert_eq!(stats.total_snapshots, 2);
    assert_eq!(stats.total_size_bytes, 40);
    assert_eq!(stats.total_files, 12);
    assert_eq!(stats.first_snapshot_ms, Some(100));
    assert_eq!(stats.last_snapshot_ms, Some(900));

    // a job with no rows reports zeroes, not an error
    let empty = source.job_aggregate_stats("missing").unwrap();
    assert_eq!(empty.total_snapshots, 0);
    assert_eq!(empty.first_snapshot_ms, None);
    assert_eq!(empty.last_snapshot_ms, None);
}

#[test]
fn density_buckets_use_canonical_keys() {
    let (_dir, source) = index_with(&[
        Row { job_id: "a", job_name: "a", timestamp: utc_ms(2024, 3, 10, 12), total_size: 1, file_count: 1, status: "complete" },
        Row { job_id: "a", job_name: "a", timestamp: utc_ms(2024, 3, 22, 12), total_size: 1, file_count: 1, status: "complete" },
        Row { job_id: "a", job_name: "a", timestamp: utc_ms(2023, 11, 1, 12), total_size: 1, file_count: 1, status: "complete" },
    ]);

    let months = source.snapshot_density("a", DensityPeriod::Month).unwrap();
    let keyed: Vec<(&str, u64)> = months.iter().map(|b| (b.period.as_str(), b.count)).collect();
    assert_eq!(keyed, vec![("2024-03", 2), ("2023-11", 1)]);

    let years = source.snapshot_density("a", DensityPeriod::Year).unwrap();
    assert_eq!(years.len(), 2);
    assert_eq!(years[0].period, "2024");

    let days = source.snapshot_density("a", DensityPeriod::Day).unwrap();
    assert!(days.iter().any(|b| b.period == "2024-03-10"));
}

#[test]
fn two_jobs_interleave_and_cluster_end_to_end() {
    let jan1 = utc_ms(2024, 1, 1, 0);
    let jan1_noon = utc_ms(2024, 1, 1, 12);
    let jan2 = utc_ms(2024, 1, 2, 0);

    let (_dir, source) = index_with(&[
        Row { job_id: "A", job_name: "A", timestamp: jan1, total_size: 100, file_count: 1, status: "complete" },
        Row { job_id: "A", job_name: "A", timestamp: jan2, total_size: 50, file_count: 1, status: "complete" },
        Row { job_id: "B", job_name: "B", timestamp: jan1_noon, total_size: 30, file_count: 1, status: "complete" },
    ]);

    let merged = aggregate::aggregate(&load_all_jobs(&source));
    let order: Vec<(&str, i64)> = merged
        .iter()
        .map(|s| (s.job_id.as_str(), s.timestamp()))
        .collect();
    assert_eq!(order, vec![("A", jan1), ("B", jan1_noon), ("A", jan2)]);

    let range = TimeRange { start: jan1, end: jan2 };
    let timeline = Timeline::new(merged, range);

    let wide = timeline.markers(120.0);
    assert_eq!(wide.len(), 1);
    assert!(wide[0].is_cluster);
    assert_eq!(wide[0].snapshots.len(), 3);
    // positions 0, 50 and 100 average out to the middle
    assert!((wide[0].position - 50.0).abs() < 1e-9);

    let narrow = timeline.markers(0.1);
    assert_eq!(narrow.len(), 3);
    assert!(narrow.iter().all(|m| !m.is_cluster));
}

#[test]
fn downsampled_display_never_loses_underlying_snapshots() {
    let rows: Vec<Row> = (0..300i64)
        .map(|i| Row {
            job_id: "a",
            job_name: "a",
            timestamp: i * MS_PER_DAY,
            total_size: 100,
            file_count: 1,
            status: "complete",
        })
        .collect();
    let (_dir, source) = index_with(&rows);

    let merged = aggregate::aggregate(&load_all_jobs(&source));
    let range = TimeRange::covering(&merged, 301 * MS_PER_DAY);
    let timeline = Timeline::new(merged.clone(), range);

    let markers = timeline.markers(0.01);
    let covered: usize = markers.iter().map(|m| m.snapshots.len()).sum();
    assert_eq!(covered, merged.len());

    let capped = downsample(markers, MAX_MARKERS);
    assert!(capped.len() <= MAX_MARKERS);
    // the cap drops markers from the display list, never snapshots from
    // the timeline itself
    assert_eq!(timeline.snapshots().len(), merged.len());
}

#[test]
fn forecast_from_indexed_history() {
    // 100 bytes per day for four days: cumulative 100..400
    let rows: Vec<Row> = (0..4i64)
        .map(|i| Row {
            job_id: "a",
            job_name: "a",
            timestamp: utc_ms(2024, 6, 1, 12) + i * MS_PER_DAY,
            total_size: 100,
            file_count: 1,
            status: "complete",
        })
        .collect();
    let (_dir, source) = index_with(&rows);

    let merged = aggregate::aggregate(&load_all_jobs(&source));
    let history = project::cumulative_usage(&merged);
    assert_eq!(history.len(), 4);

    let disk = DiskStats {
        total_bytes: 10_000,
        available_bytes: 1_000,
    };
    let forecast = project::forecast(&history, Some(disk));
    assert_eq!(forecast.daily_growth_bytes, 100.0);
    assert_eq!(forecast.days_until_full, Some(10));

    let projected = project::project(&history, &forecast, 30);
    assert!(!projected.is_empty());
    assert!(projected
        .iter()
        .all(|p| p.cumulative_bytes <= disk.total_bytes));
}

#[test]
fn empty_index_degrades_to_empty_results() {
    let (_dir, source) = index_with(&[]);

    assert!(source.list_jobs().unwrap().is_empty());
    assert!(source.list_snapshots("anything").unwrap().is_empty());

    let merged = aggregate::aggregate(&load_all_jobs(&source));
    assert!(merged.is_empty());

    let now = 1_700_000_000_000;
    let range = TimeRange::covering(&merged, now);
    assert_eq!(range.end, now);
    assert_eq!(range.end - range.start, 30 * MS_PER_DAY);

    let timeline = Timeline::new(merged, range);
    assert!(timeline.markers(2.0).is_empty());

    let history = project::cumulative_usage(&[]);
    let forecast = project::forecast(&history, None);
    assert_eq!(forecast.daily_growth_bytes, 0.0);
    assert_eq!(forecast.days_until_full, None);
}
