use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::history::aggregator::select_latest;
use crate::models::{BackupRecord, SelectionResult, TimeWindow};
use crate::parsers::{ENTRIES_FILENAME, parse_entries_file};

/// A backup folder whose metadata could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub folder: PathBuf,
    pub reason: String,
}

/// All parseable records of a history directory plus what was left out
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<BackupRecord>,
    /// Subdirectories visited
    pub folders_scanned: usize,
    /// Folders without an `entries.json` (orphaned blobs, partial writes)
    pub without_metadata: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Outcome of [`scan_history`]
#[derive(Debug, Default)]
pub struct HistoryScan {
    pub selection: SelectionResult,
    pub folders_scanned: usize,
    /// Records that were parsed successfully
    pub records_loaded: usize,
    pub without_metadata: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Load every backup record below `history_dir`
///
/// Visits the direct subdirectories in file-name order so repeated scans see records
/// in the same order. A folder with a malformed `entries.json` is logged, recorded in
/// [`LoadedRecords::skipped`] and does not stop the scan.
///
/// # Errors
///
/// Returns an error if `history_dir` does not exist or cannot be read.
pub fn load_backup_records(history_dir: &Path) -> Result<LoadedRecords> {
    if !history_dir.is_dir() {
        bail!("History directory not found: {}", history_dir.display());
    }

    let mut loaded = LoadedRecords::default();
    let walker = WalkDir::new(history_dir).min_depth(1).max_depth(1).sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| {
                    format!("Failed to read history directory: {}", history_dir.display())
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to read history entry, skipping");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        loaded.folders_scanned += 1;

        let folder = entry.path();
        if !folder.join(ENTRIES_FILENAME).is_file() {
            debug!(folder = %folder.display(), "No metadata file, skipping folder");
            loaded.without_metadata += 1;
            continue;
        }

        match parse_entries_file(folder) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                warn!(folder = %folder.display(), "Skipping backup record: {:#}", e);
                loaded.skipped.push(SkippedRecord {
                    folder: folder.to_path_buf(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(loaded)
}

/// Find the latest version of each file under `target_dir` within `window`
///
/// Combines [`load_backup_records`] with [`select_latest`]. The backup store is only
/// read, never modified.
///
/// # Errors
///
/// Returns an error if `history_dir` does not exist or cannot be read. Malformed
/// records, missing blobs and out-of-directory files are never errors.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use chrono::Utc;
/// use cursor_history_restore::history::scan_history;
/// use cursor_history_restore::models::TimeWindow;
///
/// let window = TimeWindow::days_back(Utc::now(), 7)?;
/// let scan = scan_history(Path::new("/Users/alice/.config/Cursor/User/History"), "~/Projects/app", &window)?;
/// println!("{} files, {} records skipped", scan.selection.len(), scan.skipped.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn scan_history(history_dir: &Path, target_dir: &str, window: &TimeWindow) -> Result<HistoryScan> {
    let loaded = load_backup_records(history_dir)?;
    let selection = select_latest(&loaded.records, target_dir, window);

    debug!(
        folders = loaded.folders_scanned,
        records = loaded.records.len(),
        selected = selection.len(),
        "History scan complete"
    );

    Ok(HistoryScan {
        selection,
        folders_scanned: loaded.folders_scanned,
        records_loaded: loaded.records.len(),
        without_metadata: loaded.without_metadata,
        skipped: loaded.skipped,
    })
}
