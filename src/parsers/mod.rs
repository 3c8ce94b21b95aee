//! JSON parsers for the editor's on-disk metadata files
//!
//! # Error Handling Strategy
//!
//! Every parser handles exactly one file and returns `anyhow::Result`. Callers scan
//! many independent files and follow a **graceful degradation** approach:
//!
//! - **File-level failures**: An unreadable or malformed metadata file makes the
//!   parser return an error; the caller logs it as a warning, counts it and moves on
//!   to the next folder. One corrupt record never aborts a scan.
//!
//! - **Entry-level failures**: Inside an otherwise valid `entries.json`, individual
//!   snapshot entries with missing or mistyped fields are dropped and the rest of the
//!   record is kept.
//!
//! - **Size limits**: Metadata files are small; anything above 10MB is rejected
//!   before parsing.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};

pub mod deserializers;
pub mod entries;
pub mod workspace;

pub use entries::{ENTRIES_FILENAME, parse_entries_file};
pub use workspace::{WORKSPACE_FILENAME, parse_workspace_file};

// Maximum size for a metadata file: 10MB
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Validates that a file's size is within acceptable limits (10MB)
///
/// Takes an open file handle so the size check and the subsequent read see the
/// same file.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read or the file is larger
/// than 10MB.
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}
