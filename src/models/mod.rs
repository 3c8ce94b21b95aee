//! Data models for the editor's backup store and key-value database.
//!
//! - [`BackupRecord`] / [`Snapshot`] - one tracked file and its timestamped copies
//! - [`SelectionEntry`] / [`SelectionResult`] - the winning snapshot per relative path
//! - [`TimeWindow`] - inclusive time range used to filter snapshots
//! - [`WorkspaceInfo`] - a workspace folder and its state database
//! - [`ConversationRecord`] - a semi-structured chat record from the key-value store
//!
//! On-disk JSON shapes are deserialized in the `parsers` module and converted into
//! these types; nothing here touches the filesystem except [`BackupRecord::blob_path`]
//! resolution.

pub mod backup;
pub mod conversation;
pub mod window;
pub mod workspace;

pub use backup::{BackupRecord, SelectionEntry, SelectionResult, Snapshot};
pub use conversation::ConversationRecord;
pub use window::TimeWindow;
pub use workspace::WorkspaceInfo;
