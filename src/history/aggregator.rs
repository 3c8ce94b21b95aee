//! Latest-snapshot selection over backup records.
//!
//! For every record whose original file lies inside the target directory, the
//! aggregator picks the snapshot with the greatest timestamp inside the time window.
//! Records outside the directory, records with no snapshot in the window and records
//! whose winning blob is missing on disk contribute nothing.
//!
//! Selection is a pure read: the same records, target and window always produce the
//! same [`SelectionResult`] as long as the blobs on disk are unchanged.

use std::collections::btree_map::Entry;

use tracing::debug;

use crate::models::{BackupRecord, SelectionEntry, SelectionResult, Snapshot, TimeWindow};
use crate::utils::{CanonicalPath, PathError};

/// Select the latest in-window snapshot of every record under `target_dir`
///
/// `target_dir` is normalized once (URI-decoded, `~`-expanded, trailing separator
/// stripped). Each record's original path is normalized and must equal the target or
/// lie below it on a segment boundary; its relative path becomes the result key, the
/// empty string standing for the target itself.
///
/// If two records resolve to the same relative path, the more recent snapshot wins;
/// on an exact tie the record seen first is kept.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use chrono::{TimeZone, Utc};
/// use cursor_history_restore::history::select_latest;
/// use cursor_history_restore::models::{BackupRecord, Snapshot, TimeWindow};
///
/// let record = BackupRecord {
///     folder: PathBuf::from("/nonexistent/history/1a2b"),
///     original_path: "file:///proj/src/app.py".to_string(),
///     snapshots: vec![Snapshot {
///         id: "x.py".to_string(),
///         timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
///         source: None,
///     }],
/// };
/// let window = TimeWindow::new(
///     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
/// )?;
///
/// // The blob does not exist on disk, so nothing is selected
/// assert!(select_latest([&record], "/proj", &window).is_empty());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn select_latest<'a>(
    records: impl IntoIterator<Item = &'a BackupRecord>,
    target_dir: &str,
    window: &TimeWindow,
) -> SelectionResult {
    let target = CanonicalPath::new(target_dir);
    let mut selection = SelectionResult::new();

    for record in records {
        let Some((relative_path, candidate)) = select_for_record(record, &target, window) else {
            continue;
        };

        match selection.entry(relative_path) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                debug!(
                    relative_path = %slot.key(),
                    kept = %slot.get().blob_path.display(),
                    other = %candidate.blob_path.display(),
                    "Two records map to the same path"
                );
                if candidate.timestamp > slot.get().timestamp {
                    slot.insert(candidate);
                }
            }
        }
    }

    selection
}

/// The snapshot with the greatest timestamp inside `window`
///
/// Scans in log order and only replaces the current best on a strictly greater
/// timestamp, so among equal timestamps the first one logged wins.
pub fn latest_in_window<'a>(snapshots: &'a [Snapshot], window: &TimeWindow) -> Option<&'a Snapshot> {
    let mut latest: Option<&Snapshot> = None;

    for snapshot in snapshots {
        if !window.contains(snapshot.timestamp) {
            continue;
        }
        if latest.is_none_or(|best| snapshot.timestamp > best.timestamp) {
            latest = Some(snapshot);
        }
    }

    latest
}

fn select_for_record(
    record: &BackupRecord,
    target: &CanonicalPath,
    window: &TimeWindow,
) -> Option<(String, SelectionEntry)> {
    let original = CanonicalPath::new(&record.original_path);
    let relative_path = match original.relative_to(target) {
        Ok(relative) => relative.to_string(),
        Err(PathError::NotContained { .. }) => return None,
    };

    let snapshot = latest_in_window(&record.snapshots, window)?;
    let blob_path = record.blob_path(snapshot);
    if !blob_path.is_file() {
        debug!(
            relative_path = %relative_path,
            blob = %blob_path.display(),
            "Selected snapshot has no blob on disk, skipping record"
        );
        return None;
    }

    Some((
        relative_path,
        SelectionEntry {
            blob_path,
            timestamp: snapshot.timestamp,
            original_path: original.to_string(),
        },
    ))
}
