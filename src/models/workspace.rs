use std::path::PathBuf;

use serde::Serialize;

/// A workspace known to the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceInfo {
    /// Name of the workspace storage folder (a hash chosen by the editor)
    pub id: String,
    /// Decoded folder (or multi-root workspace file) the workspace was opened on
    pub canonical_path: String,
    /// The workspace's own key-value store
    pub store_location: PathBuf,
}
