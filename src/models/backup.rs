use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One point-in-time copy of a tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Blob file name inside the record folder
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// What produced the snapshot (e.g. "Workspace Edit"), when recorded
    pub source: Option<String>,
}

/// The editor's saved history for one original file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Record folder holding the metadata file and the blobs
    pub folder: PathBuf,
    /// Logical path reference as recorded, usually a percent-encoded `file://` URI
    pub original_path: String,
    /// Snapshots in log order, not necessarily sorted by time
    pub snapshots: Vec<Snapshot>,
}

impl BackupRecord {
    /// Location of a snapshot's blob on disk
    pub fn blob_path(&self, snapshot: &Snapshot) -> PathBuf {
        self.folder.join(&snapshot.id)
    }
}

/// The winning snapshot for one relative path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEntry {
    pub blob_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub original_path: String,
}

/// Relative path (`/`-separated, empty for the target directory itself) to its
/// selected snapshot. Ordered by path so reports and copies are deterministic.
pub type SelectionResult = BTreeMap<String, SelectionEntry>;
