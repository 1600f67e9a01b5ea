pub mod aggregate;
pub mod cluster;
pub mod filter;
pub mod project;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    Complete,
    Partial,
    Failed,
}

impl SnapshotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotStatus::Complete => "complete",
            SnapshotStatus::Partial => "partial",
            SnapshotStatus::Failed => "failed",
        }
    }

    /// Lenient parse for index rows written by older engine versions.
    /// Unrecognized values read as Complete.
    pub fn parse(s: &str) -> Self {
        match s {
            "partial" => SnapshotStatus::Partial,
            "failed" => SnapshotStatus::Failed,
            _ => SnapshotStatus::Complete,
        }
    }
}

/// One backup run as recorded by the backup engine. Read-only here;
/// every derived structure is a fresh allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    /// Epoch milliseconds, unique per job.
    pub timestamp: i64,
    pub size_bytes: u64,
    pub file_count: u64,
    pub changes_count: u64,
    pub status: SnapshotStatus,
    pub duration_ms: Option<u64>,
    pub path: Option<String>,
}

/// A configured backup job and its recorded snapshots. A job that has
/// never run carries `None`, which aggregation treats as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub snapshots: Option<Vec<Snapshot>>,
}

/// A snapshot annotated with the job it belongs to, produced when
/// multiple jobs are flattened into one chronological stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub job_id: String,
    pub job_name: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

impl TimelineSnapshot {
    pub fn timestamp(&self) -> i64 {
        self.snapshot.timestamp
    }

    pub fn size_bytes(&self) -> u64 {
        self.snapshot.size_bytes
    }
}
