//! Cursor History Restore - recover project files from Cursor's local history
//!
//! The editor keeps a backup copy of every file it saves under `User/History/`, one
//! folder per tracked file with an `entries.json` log of timestamped snapshots. This
//! library reconciles those logs back into a directory tree:
//!
//! - Parsing backup metadata (`entries.json`) and workspace metadata (`workspace.json`)
//! - Canonicalizing `file://` URIs and OS paths for containment checks
//! - Selecting the newest snapshot per file inside a time window
//! - Copying the selected snapshots into an output directory
//! - Read-only inspection of the editor's `state.vscdb` key-value stores and
//!   extraction of code snippets from stored conversations
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use chrono::Utc;
//! use cursor_history_restore::{materialize, scan_history};
//! use cursor_history_restore::models::TimeWindow;
//!
//! let window = TimeWindow::days_back(Utc::now(), 7)?;
//! let scan = scan_history(Path::new("/home/alice/.config/Cursor/User/History"), "~/Projects/app", &window)?;
//! let report = materialize(&scan.selection, Path::new("restoredFolder"))?;
//! println!("Restored {} files", report.restored_count());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod history;
pub mod models;
pub mod parsers;
pub mod restore;
pub mod store;
pub mod utils;
pub mod workspaces;

// Re-export commonly used types
pub use history::{scan_history, select_latest};
pub use models::{SelectionResult, TimeWindow};
pub use restore::materialize;
pub use store::KvStore;
pub use utils::paths::{
    decode_file_uri, format_path_with_tilde, is_contained, normalize_path, relative_of,
};
pub use workspaces::list_workspaces;
