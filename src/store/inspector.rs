use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde_json::Value;
use tracing::warn;

/// Key-value table used by the editor for chat and composer state
pub const DEFAULT_TABLE: &str = "cursorDiskKV";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const BINARY_PREVIEW_BYTES: usize = 200;
const SAMPLE_KEYS: usize = 5;

/// Read-only access to an editor `state.vscdb` database
///
/// Holds only the path: every query opens its own read-only connection and closes it
/// before returning, so nothing is held open between calls and the editor can keep
/// writing to the file.
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
}

/// Key count and sample keys of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub key_count: usize,
    pub sample_keys: Vec<String>,
}

impl KvStore {
    /// # Errors
    ///
    /// Returns an error if the database file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("Database not found: {}", path.display());
        }
        Ok(Self { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database: {}", self.path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Names of all tables, sorted
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list tables")?;
        Ok(tables)
    }

    /// The `CREATE TABLE` statement of `table`, if the table exists
    pub fn table_schema(&self, table: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let schema = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .with_context(|| format!("Failed to read schema of table {}", table))?;
        Ok(schema.flatten())
    }

    /// Keys of `table` in key order, at most `limit` of them (`Some(0)` means no limit)
    pub fn list_keys(&self, table: &str, limit: Option<usize>) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let sql = format!("SELECT key FROM {} ORDER BY key LIMIT ?1", quote_identifier(table));
        // SQLite treats a negative limit as "no limit"
        let limit = limit
            .filter(|&n| n > 0)
            .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

        let mut stmt = conn.prepare(&sql).with_context(|| format!("Failed to query table {}", table))?;
        let keys = stmt
            .query_map(params![limit], |row| Ok(key_text(row.get_ref(0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }

    pub fn count_keys(&self, table: &str) -> Result<usize> {
        let conn = self.connect()?;
        let sql = format!("SELECT COUNT(key) FROM {}", quote_identifier(table));
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("Failed to count keys in table {}", table))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Raw bytes stored under `key`; `None` if the key is missing or its value is NULL
    ///
    /// TEXT and BLOB values both come back as bytes.
    pub fn get_value(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.connect()?;
        let sql = format!("SELECT value FROM {} WHERE key = ?1", quote_identifier(table));
        let value = conn
            .query_row(&sql, params![key], |row| Ok(value_bytes(row.get_ref(0)?)))
            .optional()
            .with_context(|| format!("Failed to read key {} from table {}", key, table))?;
        Ok(value.flatten())
    }

    /// Keys matching a SQL `LIKE` pattern (`%` any run, `_` one character), sorted
    pub fn search_keys(&self, pattern: &str, table: &str) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let sql =
            format!("SELECT key FROM {} WHERE key LIKE ?1 ORDER BY key", quote_identifier(table));
        let mut stmt = conn.prepare(&sql).with_context(|| format!("Failed to query table {}", table))?;
        let keys = stmt
            .query_map(params![pattern], |row| Ok(key_text(row.get_ref(0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }

    /// All `(key, value)` pairs whose key starts with `prefix`, in key order
    ///
    /// Runs as a single query so large namespaces do not cost one connection per key.
    pub fn entries_with_prefix(
        &self,
        prefix: &str,
        table: &str,
    ) -> Result<Vec<(String, Option<Vec<u8>>)>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT key, value FROM {} WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key",
            quote_identifier(table)
        );
        let pattern = format!("{}%", escape_like(prefix));

        let mut stmt = conn.prepare(&sql).with_context(|| format!("Failed to query table {}", table))?;
        let rows = stmt
            .query_map(params![pattern], |row| {
                Ok((key_text(row.get_ref(0)?), value_bytes(row.get_ref(1)?)))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // LIKE ignores ASCII case; the prefix itself must match exactly
        Ok(rows.into_iter().filter(|(key, _)| key.starts_with(prefix)).collect())
    }

    /// Key count and first keys of every table
    ///
    /// Tables without a `key` column are logged and left out.
    pub fn summarize(&self) -> Result<Vec<TableSummary>> {
        let mut summaries = Vec::new();
        for table in self.list_tables()? {
            let summary = self.count_keys(&table).and_then(|key_count| {
                let sample_keys = self.list_keys(&table, Some(SAMPLE_KEYS))?;
                Ok(TableSummary { name: table.clone(), key_count, sample_keys })
            });
            match summary {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(table = %table, "Skipping table without keys: {:#}", e),
            }
        }
        Ok(summaries)
    }
}

/// Human-readable rendering of a stored value
///
/// JSON is pretty-printed, other UTF-8 text is returned as is, and binary data is
/// summarized with an escaped preview of its first 200 bytes.
pub fn render_value(bytes: &[u8]) -> String {
    let Ok(text) = std::str::from_utf8(bytes) else {
        let preview = &bytes[..bytes.len().min(BINARY_PREVIEW_BYTES)];
        return format!("Binary data ({} bytes)\n{}", bytes.len(), preview.escape_ascii());
    };

    match serde_json::from_str::<Value>(text) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn key_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null => String::new(),
    }
}

fn value_bytes(value: ValueRef<'_>) -> Option<Vec<u8>> {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
        ValueRef::Integer(i) => Some(i.to_string().into_bytes()),
        ValueRef::Real(f) => Some(f.to_string().into_bytes()),
        ValueRef::Null => None,
    }
}
