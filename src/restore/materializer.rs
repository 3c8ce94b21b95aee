use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::{SelectionEntry, SelectionResult};
use crate::utils::CanonicalPath;

/// A snapshot that could not be written to the output tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub relative_path: String,
    pub destination: PathBuf,
    pub error: String,
}

/// Outcome of [`materialize`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Relative paths written, in selection order
    pub restored: Vec<String>,
    pub failures: Vec<CopyFailure>,
}

impl MaterializeReport {
    pub fn restored_count(&self) -> usize {
        self.restored.len()
    }
}

/// Copy every selected snapshot into `output_dir` at its relative path
///
/// Parent directories are created as needed and the blob's modification and access
/// times are carried over where the platform allows. A failing copy is logged and
/// recorded in [`MaterializeReport::failures`]; the remaining copies still run.
/// Files already written stay in place even if later copies fail, and re-running
/// against the same selection overwrites them with identical content.
///
/// The entry for the target directory itself (empty relative path) is written
/// directly into `output_dir` under the original file's name.
///
/// # Errors
///
/// Returns an error only if `output_dir` itself cannot be created.
pub fn materialize(selection: &SelectionResult, output_dir: &Path) -> Result<MaterializeReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut report = MaterializeReport::default();
    for (relative_path, entry) in selection {
        let destination = destination_for(output_dir, relative_path, entry);
        match copy_snapshot(&entry.blob_path, &destination) {
            Ok(()) => report.restored.push(relative_path.clone()),
            Err(e) => {
                warn!(
                    relative_path = %relative_path,
                    destination = %destination.display(),
                    "Failed to restore file: {:#}",
                    e
                );
                report.failures.push(CopyFailure {
                    relative_path: relative_path.clone(),
                    destination,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}

/// Where a selected snapshot lands inside `output_dir`
pub fn destination_for(output_dir: &Path, relative_path: &str, entry: &SelectionEntry) -> PathBuf {
    if !relative_path.is_empty() {
        return relative_path
            .split('/')
            .fold(output_dir.to_path_buf(), |path, segment| path.join(segment));
    }

    let original = CanonicalPath::new(&entry.original_path);
    match original.file_name() {
        Some(name) => output_dir.join(name),
        None => match entry.blob_path.file_name() {
            Some(name) => output_dir.join(name),
            None => output_dir.to_path_buf(),
        },
    }
}

/// Copy one blob to `destination`, creating parent directories first
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the copy fails.
pub fn copy_snapshot(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::copy(source, destination).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), destination.display())
    })?;

    if let Err(e) = preserve_times(source, destination) {
        debug!(destination = %destination.display(), error = %e, "Could not preserve file times");
    }

    Ok(())
}

fn preserve_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let file = OpenOptions::new().write(true).open(destination)?;
    file.set_times(times)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    fn entry(blob_path: PathBuf, original: &str) -> SelectionEntry {
        SelectionEntry {
            blob_path,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            original_path: original.to_string(),
        }
    }

    fn blob(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_materialize_creates_nested_directories() {
        let store = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let output_dir = out.path().join("restoredFolder");

        let mut selection = SelectionResult::new();
        selection.insert(
            "src/deep/app.py".to_string(),
            entry(blob(store.path(), "a1", "print('hi')"), "/proj/src/deep/app.py"),
        );
        selection.insert("README.md".to_string(), entry(blob(store.path(), "b2", "# hi"), "/proj/README.md"));

        let report = materialize(&selection, &output_dir).unwrap();

        assert_eq!(report.restored_count(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(fs::read_to_string(output_dir.join("src/deep/app.py")).unwrap(), "print('hi')");
        assert_eq!(fs::read_to_string(output_dir.join("README.md")).unwrap(), "# hi");
    }

    #[test]
    fn test_materialize_root_entry_goes_into_output_root() {
        let store = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let mut selection = SelectionResult::new();
        selection.insert(String::new(), entry(blob(store.path(), "zz9", "root"), "/proj/notes.txt"));

        let report = materialize(&selection, out.path()).unwrap();
        assert_eq!(report.restored, vec![String::new()]);
        assert_eq!(fs::read_to_string(out.path().join("notes.txt")).unwrap(), "root");
    }

    #[test]
    fn test_materialize_continues_after_failure() {
        let store = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let mut selection = SelectionResult::new();
        selection.insert("a.txt".to_string(), entry(store.path().join("vanished"), "/proj/a.txt"));
        selection.insert("b.txt".to_string(), entry(blob(store.path(), "b", "bee"), "/proj/b.txt"));

        let report = materialize(&selection, out.path()).unwrap();

        assert_eq!(report.restored, vec!["b.txt".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].relative_path, "a.txt");
        assert_eq!(report.failures[0].destination, out.path().join("a.txt"));
        assert!(report.failures[0].error.contains("Failed to copy"));
        assert!(out.path().join("b.txt").exists());
    }

    #[test]
    fn test_materialize_preserves_modification_time() {
        let store = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let source = blob(store.path(), "old", "old content");

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_704_153_600);
        let file = OpenOptions::new().write(true).open(&source).unwrap();
        file.set_times(FileTimes::new().set_modified(past)).unwrap();
        drop(file);

        let mut selection = SelectionResult::new();
        selection.insert("old.txt".to_string(), entry(source, "/proj/old.txt"));
        materialize(&selection, out.path()).unwrap();

        let modified = fs::metadata(out.path().join("old.txt")).unwrap().modified().unwrap();
        assert_eq!(modified, past);
    }

    #[test]
    fn test_materialize_overwrites_existing_files() {
        let store = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(out.path().join("a.txt"), "stale").unwrap();

        let mut selection = SelectionResult::new();
        selection.insert("a.txt".to_string(), entry(blob(store.path(), "a", "fresh"), "/proj/a.txt"));

        materialize(&selection, out.path()).unwrap();
        assert_eq!(fs::read_to_string(out.path().join("a.txt")).unwrap(), "fresh");
    }

    #[test]
    fn test_destination_for_root_falls_back_to_blob_name() {
        let e = entry(PathBuf::from("/history/-1/Ab12.txt"), "/");
        assert_eq!(destination_for(Path::new("/out"), "", &e), PathBuf::from("/out/Ab12.txt"));
    }
}
