use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{BackupRecord, Snapshot};
use crate::parsers::validate_file_size;

/// Name of the metadata file inside every backup record folder
pub const ENTRIES_FILENAME: &str = "entries.json";

#[derive(Debug, Deserialize)]
struct RawEntriesFile {
    #[serde(default, deserialize_with = "super::deserializers::deserialize_non_empty_string")]
    resource: Option<String>,
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    #[serde(deserialize_with = "super::deserializers::deserialize_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    source: Option<String>,
}

/// Parse the `entries.json` of one backup record folder
///
/// Entries that lack an `id` or `timestamp`, or whose `id` is not a plain file name,
/// are dropped; the remaining snapshots keep their log order.
///
/// # Errors
///
/// Returns an error if:
/// - The metadata file cannot be opened or is larger than 10MB
/// - The file is not valid JSON
/// - The `resource` field (the original file reference) is missing or empty
pub fn parse_entries_file(folder: &Path) -> Result<BackupRecord> {
    let path = folder.join(ENTRIES_FILENAME);
    let file = File::open(&path)
        .with_context(|| format!("Failed to open metadata file: {}", path.display()))?;
    validate_file_size(&file, &path)?;

    let raw: RawEntriesFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse metadata file: {}", path.display()))?;

    let Some(original_path) = raw.resource else {
        bail!("Metadata file has no resource reference: {}", path.display());
    };

    let mut snapshots = Vec::with_capacity(raw.entries.len());
    let mut dropped = 0;
    for (index, value) in raw.entries.into_iter().enumerate() {
        match serde_json::from_value::<RawEntry>(value) {
            Ok(entry) if is_plain_file_name(&entry.id) => snapshots.push(Snapshot {
                id: entry.id,
                timestamp: entry.timestamp,
                source: entry.source,
            }),
            Ok(entry) => {
                warn!(folder = %folder.display(), id = %entry.id, "Ignoring entry with unsafe id");
                dropped += 1;
            }
            Err(e) => {
                debug!(folder = %folder.display(), index, error = %e, "Ignoring malformed entry");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        debug!(folder = %folder.display(), dropped, kept = snapshots.len(), "Dropped entries");
    }

    Ok(BackupRecord { folder: folder.to_path_buf(), original_path, snapshots })
}

/// Blob ids must name a file directly inside the record folder
fn is_plain_file_name(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !id.contains(['/', '\\'])
}
