//! Reconciliation of the editor's per-file backup logs.
//!
//! # Error Handling Strategy
//!
//! - **Missing history directory**: fatal, returned as an error.
//! - **Malformed records**: logged with `tracing::warn!`, collected in
//!   [`HistoryScan::skipped`] and otherwise ignored.
//! - **Out-of-directory files, empty windows, missing blobs**: not errors at all; the
//!   record simply contributes nothing.
//!
//! Callers report the counts so partial results are never silent.

pub mod aggregator;
pub mod scanner;

pub use aggregator::{latest_in_window, select_latest};
pub use scanner::{HistoryScan, LoadedRecords, SkippedRecord, load_backup_records, scan_history};
