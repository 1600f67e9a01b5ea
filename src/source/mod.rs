//! Collaborator boundary for snapshot and capacity data.
//!
//! The timeline core never builds or owns the snapshot index; the backup
//! engine writes it elsewhere. This module defines the contract the core
//! consumes and validates loosely-typed collaborator payloads into the
//! strict entities of `crate::timeline` before any algorithm sees them.

pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::timeline::{Snapshot, SnapshotStatus};

/// Capacity figures for the filesystem holding a backup destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskStats {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Whole-history statistics for one job, computed by the index.
#[derive(Debug, Clone, Serialize)]
pub struct JobAggregateStats {
    pub total_snapshots: u64,
    pub total_size_bytes: u64,
    pub total_files: u64,
    pub first_snapshot_ms: Option<i64>,
    pub last_snapshot_ms: Option<i64>,
}

/// Calendar bucket granularity for density queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityPeriod {
    Day,
    Month,
    Year,
}

impl DensityPeriod {
    /// strftime pattern producing the canonical bucket key.
    pub fn key_format(&self) -> &'static str {
        match self {
            DensityPeriod::Day => "%Y-%m-%d",
            DensityPeriod::Month => "%Y-%m",
            DensityPeriod::Year => "%Y",
        }
    }
}

/// Snapshot count per calendar bucket, key per `DensityPeriod::key_format`.
#[derive(Debug, Clone, Serialize)]
pub struct DensityBucket {
    pub period: String,
    pub count: u64,
}

/// A job as the index records it, before its snapshots are loaded.
#[derive(Debug, Clone, Serialize)]
pub struct JobRef {
    pub id: String,
    pub name: String,
}

/// Loosely-typed snapshot record as collaborators report it. Index rows
/// and engine payloads pass through here so the core only ever operates
/// on validated data.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    pub id: i64,
    pub timestamp: i64,
    pub size_bytes: i64,
    pub file_count: i64,
    pub changes_count: i64,
    pub status: Option<String>,
    pub duration_ms: Option<i64>,
    pub path: Option<String>,
}

impl RawSnapshot {
    /// Clamp negative counters to zero and parse the status string
    /// leniently. Malformed rows degrade, they never error.
    pub fn validate(self) -> Snapshot {
        Snapshot {
            id: self.id,
            timestamp: self.timestamp,
            size_bytes: self.size_bytes.max(0) as u64,
            file_count: self.file_count.max(0) as u64,
            changes_count: self.changes_count.max(0) as u64,
            status: self
                .status
                .as_deref()
                .map_or(SnapshotStatus::Complete, SnapshotStatus::parse),
            duration_ms: self.duration_ms.and_then(|d| u64::try_from(d).ok()),
            path: self.path,
        }
    }
}

/// The index/query operations the timeline core consumes. Implementations
/// own the transport (SQLite file, IPC, fixtures in tests); the core only
/// sees validated snapshots.
pub trait SnapshotSource {
    fn list_jobs(&self) -> Result<Vec<JobRef>, Box<dyn std::error::Error>>;

    fn list_snapshots(&self, job_id: &str) -> Result<Vec<Snapshot>, Box<dyn std::error::Error>>;

    fn list_snapshots_in_range(
        &self,
        job_id: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Snapshot>, Box<dyn std::error::Error>>;

    fn job_aggregate_stats(
        &self,
        job_id: &str,
    ) -> Result<JobAggregateStats, Box<dyn std::error::Error>>;

    fn snapshot_density(
        &self,
        job_id: &str,
        period: DensityPeriod,
    ) -> Result<Vec<DensityBucket>, Box<dyn std::error::Error>>;

    fn disk_stats(&self, path: &str) -> Result<DiskStats, Box<dyn std::error::Error>>;
}
