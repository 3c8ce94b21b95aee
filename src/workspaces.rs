use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::models::WorkspaceInfo;
use crate::parsers::{WORKSPACE_FILENAME, parse_workspace_file};
use crate::utils::environment::{STATE_DB_FILENAME, workspace_storage_dir};
use crate::utils::normalize_path;

/// List the workspaces recorded under `<user_dir>/workspaceStorage`
///
/// Each workspace folder's `workspace.json` is read and its folder reference decoded.
/// Folders without metadata are ignored; folders with unreadable or malformed metadata
/// are logged as warnings and skipped. Results are sorted by workspace id.
///
/// # Errors
///
/// Returns an error if the workspace storage directory does not exist or cannot be
/// read.
pub fn list_workspaces(user_dir: &Path) -> Result<Vec<WorkspaceInfo>> {
    let storage_dir = workspace_storage_dir(user_dir);
    if !storage_dir.is_dir() {
        bail!("Workspace storage directory not found: {}", storage_dir.display());
    }

    let entries = fs::read_dir(&storage_dir).with_context(|| {
        format!("Failed to read workspace storage directory: {}", storage_dir.display())
    })?;

    Ok(collect_workspaces(entries.map(|entry| entry.map(|e| e.path()))))
}

/// Build the sorted workspace list from the folders of the storage directory
///
/// Entries that could not be read are logged and skipped like folders with bad
/// metadata.
fn collect_workspaces(entries: impl IntoIterator<Item = io::Result<PathBuf>>) -> Vec<WorkspaceInfo> {
    let mut workspaces = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Failed to read workspace storage entry, skipping");
                continue;
            }
        };
        let Some(id) = path.file_name().map(|name| name.to_string_lossy().to_string()) else {
            continue;
        };
        if !path.is_dir() {
            continue;
        }

        let metadata_path = path.join(WORKSPACE_FILENAME);
        if !metadata_path.is_file() {
            continue;
        }

        let reference = match parse_workspace_file(&metadata_path) {
            Ok(reference) => reference,
            Err(e) => {
                warn!(workspace = %path.display(), "Skipping workspace: {:#}", e);
                continue;
            }
        };

        workspaces.push(WorkspaceInfo {
            id,
            canonical_path: normalize_path(&reference),
            store_location: path.join(STATE_DB_FILENAME),
        });
    }

    workspaces.sort_by(|a, b| a.id.cmp(&b.id));
    workspaces
}
