//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use rusqlite::{Connection, params};
use serde_json::json;
use tempfile::TempDir;

/// Milliseconds since the epoch for a UTC date at midnight
pub fn ms(year: i32, month: u32, day: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap().timestamp_millis()
}

/// Builder for test Cursor `User` directory structures
pub struct CursorDirBuilder {
    temp_dir: TempDir,
}

impl CursorDirBuilder {
    /// Create a new builder with an empty `User` directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("History")).expect("Failed to create History dir");
        Self { temp_dir }
    }

    /// Get the path to the `User` directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a backup record folder under `History/`
    pub fn with_record(self, record: BackupRecordBuilder) -> Self {
        record.create_in(&self.temp_dir.path().join("History"));
        self
    }

    /// Add a workspace folder with a `workspace.json` pointing at `folder`
    pub fn with_workspace(self, id: &str, folder: &str) -> Self {
        let dir = self.temp_dir.path().join("workspaceStorage").join(id);
        fs::create_dir_all(&dir).expect("Failed to create workspace dir");
        fs::write(dir.join("workspace.json"), json!({ "folder": folder }).to_string())
            .expect("Failed to write workspace.json");
        self
    }

    /// Create `globalStorage/state.vscdb` with a `cursorDiskKV` table holding `rows`
    pub fn with_state_db(self, rows: &[(&str, &str)]) -> Self {
        let dir = self.temp_dir.path().join("globalStorage");
        fs::create_dir_all(&dir).expect("Failed to create globalStorage dir");
        create_kv_store(&dir.join("state.vscdb"), rows);
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for CursorDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one backup record folder (`entries.json` plus snapshot blobs)
pub struct BackupRecordBuilder {
    folder: String,
    resource: Option<String>,
    entries: Vec<(String, i64, String)>,
    raw_metadata: Option<String>,
}

impl BackupRecordBuilder {
    /// Create a record in `History/<folder>` tracking `resource`
    pub fn new(folder: &str, resource: &str) -> Self {
        Self {
            folder: folder.to_string(),
            resource: Some(resource.to_string()),
            entries: Vec::new(),
            raw_metadata: None,
        }
    }

    /// Add a snapshot blob named `id`, taken at `timestamp_ms`, with `content`
    pub fn snapshot(mut self, id: &str, timestamp_ms: i64, content: &str) -> Self {
        self.entries.push((id.to_string(), timestamp_ms, content.to_string()));
        self
    }

    /// Replace `entries.json` with arbitrary text
    pub fn raw_metadata(mut self, text: &str) -> Self {
        self.raw_metadata = Some(text.to_string());
        self
    }

    /// Create the record folder in the given history directory
    pub fn create_in(&self, history_dir: &Path) -> PathBuf {
        let dir = history_dir.join(&self.folder);
        fs::create_dir_all(&dir).expect("Failed to create record dir");

        for (id, _, content) in &self.entries {
            fs::write(dir.join(id), content).expect("Failed to write snapshot blob");
        }

        let metadata = match &self.raw_metadata {
            Some(text) => text.clone(),
            None => json!({
                "version": 1,
                "resource": self.resource,
                "entries": self
                    .entries
                    .iter()
                    .map(|(id, ts, _)| json!({ "id": id, "timestamp": ts }))
                    .collect::<Vec<_>>(),
            })
            .to_string(),
        };
        fs::write(dir.join("entries.json"), metadata).expect("Failed to write entries.json");
        dir
    }
}

/// Create a `state.vscdb`-style database with a `cursorDiskKV` table
pub fn create_kv_store(path: &Path, rows: &[(&str, &str)]) {
    let conn = Connection::open(path).expect("Failed to create database");
    conn.execute("CREATE TABLE cursorDiskKV (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)", [])
        .expect("Failed to create table");
    conn.execute("CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)", [])
        .expect("Failed to create table");
    for (key, value) in rows {
        conn.execute("INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)", params![key, value])
            .expect("Failed to insert row");
    }
}

/// A `User` directory with one project's history spread across a few days
///
/// - `app.py` has snapshots on Jan 1 and Jan 2 (Jan 2 is newest in range)
/// - `src/lib.py` has a single snapshot on Jan 2
/// - `notes.md` lies outside the project
/// - `late.py` was only saved on Jan 10
pub fn realistic_cursor_dir() -> TempDir {
    CursorDirBuilder::new()
        .with_record(
            BackupRecordBuilder::new("1a2b", "file:///proj/app.py")
                .snapshot("a1.py", ms(2024, 1, 1), "print('v1')\n")
                .snapshot("a2.py", ms(2024, 1, 2), "print('v2')\n"),
        )
        .with_record(
            BackupRecordBuilder::new("3c4d", "file:///proj/src/lib.py")
                .snapshot("b1.py", ms(2024, 1, 2), "def lib(): pass\n"),
        )
        .with_record(
            BackupRecordBuilder::new("5e6f", "file:///other/notes.md")
                .snapshot("c1.md", ms(2024, 1, 2), "# notes\n"),
        )
        .with_record(
            BackupRecordBuilder::new("7a8b", "file:///proj/late.py")
                .snapshot("d1.py", ms(2024, 1, 10), "late\n"),
        )
        .with_workspace("ws-b", "file:///proj")
        .with_workspace("ws-a", "file:///Users/foo/my%20app")
        .build()
}
