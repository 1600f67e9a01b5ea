//! Read-only SQLite adapter over the on-disk snapshot index.
//!
//! The index database is written by the backup engine's indexer; this
//! adapter only issues SELECTs that mirror the collaborator contract. The
//! connection is opened read-only so a display query can never touch the
//! index, and rows pass through `RawSnapshot::validate` on the way out.

use rusqlite::{params, Connection, OpenFlags};

use crate::platform;
use crate::source::{
    DensityBucket, DensityPeriod, DiskStats, JobAggregateStats, JobRef, RawSnapshot,
    SnapshotSource,
};
use crate::timeline::Snapshot;

pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    pub fn open(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(SqliteSource { conn })
    }

    fn query_snapshots<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Snapshot>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(sql)?;

        let snapshots = stmt
            .query_map(params, |row| {
                Ok(RawSnapshot {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    size_bytes: row.get(2)?,
                    file_count: row.get(3)?,
                    changes_count: row.get(4)?,
                    status: row.get(5)?,
                    duration_ms: row.get(6)?,
                    path: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(snapshots.into_iter().map(RawSnapshot::validate).collect())
    }
}

const SNAPSHOT_COLUMNS: &str =
    "id, timestamp, total_size, file_count, changes_count, status, duration_ms, path";

impl SnapshotSource for SqliteSource {
    fn list_jobs(&self) -> Result<Vec<JobRef>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT job_id, job_name FROM snapshots ORDER BY job_id",
        )?;

        let jobs = stmt
            .query_map([], |row| {
                Ok(JobRef {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    fn list_snapshots(&self, job_id: &str) -> Result<Vec<Snapshot>, Box<dyn std::error::Error>> {
        self.query_snapshots(
            &format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
                 WHERE job_id = ?1
                 ORDER BY timestamp DESC"
            ),
            params![job_id],
        )
    }

    /// Inclusive on both ends: [start_ms, end_ms].
    fn list_snapshots_in_range(
        &self,
        job_id: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Snapshot>, Box<dyn std::error::Error>> {
        self.query_snapshots(
            &format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
                 WHERE job_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3
                 ORDER BY timestamp DESC"
            ),
            params![job_id, start_ms, end_ms],
        )
    }

    fn job_aggregate_stats(
        &self,
        job_id: &str,
    ) -> Result<JobAggregateStats, Box<dyn std::error::Error>> {
        let stats = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(MAX(total_size, 0)), 0),
                COALESCE(SUM(MAX(file_count, 0)), 0),
                MIN(timestamp),
                MAX(timestamp)
             FROM snapshots
             WHERE job_id = ?1",
            params![job_id],
            |row| {
                let total_snapshots: i64 = row.get(0)?;
                Ok(JobAggregateStats {
                    total_snapshots: total_snapshots.max(0) as u64,
                    total_size_bytes: row.get::<_, i64>(1)?.max(0) as u64,
                    total_files: row.get::<_, i64>(2)?.max(0) as u64,
                    first_snapshot_ms: if total_snapshots > 0 { row.get(3)? } else { None },
                    last_snapshot_ms: if total_snapshots > 0 { row.get(4)? } else { None },
                })
            },
        )?;

        Ok(stats)
    }

    fn snapshot_density(
        &self,
        job_id: &str,
        period: DensityPeriod,
    ) -> Result<Vec<DensityBucket>, Box<dyn std::error::Error>> {
        // the strftime pattern is a bound parameter from a closed enum,
        // never caller-controlled text
        let mut stmt = self.conn.prepare(
            "SELECT strftime(?1, timestamp / 1000, 'unixepoch') AS period, COUNT(*)
             FROM snapshots
             WHERE job_id = ?2
             GROUP BY period
             ORDER BY period DESC",
        )?;

        let buckets = stmt
            .query_map(params![period.key_format(), job_id], |row| {
                Ok(DensityBucket {
                    period: row.get(0)?,
                    count: row.get::<_, i64>(1)?.max(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(buckets)
    }

    fn disk_stats(&self, path: &str) -> Result<DiskStats, Box<dyn std::error::Error>> {
        platform::disk_stats(path)
    }
}
