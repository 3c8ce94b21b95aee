use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::parsers::validate_file_size;

/// Name of the metadata file inside every workspace storage folder
pub const WORKSPACE_FILENAME: &str = "workspace.json";

#[derive(Debug, Deserialize)]
struct RawWorkspaceFile {
    #[serde(default, deserialize_with = "super::deserializers::deserialize_non_empty_string")]
    folder: Option<String>,
    /// Set instead of `folder` for multi-root `.code-workspace` files
    #[serde(default, deserialize_with = "super::deserializers::deserialize_non_empty_string")]
    workspace: Option<String>,
}

/// Read the recorded folder reference (still URI-encoded) from `workspace.json`
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or records
/// neither a `folder` nor a `workspace` reference.
pub fn parse_workspace_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open workspace file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let raw: RawWorkspaceFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse workspace file: {}", path.display()))?;

    match raw.folder.or(raw.workspace) {
        Some(reference) => Ok(reference),
        None => bail!("Workspace file records no folder: {}", path.display()),
    }
}
