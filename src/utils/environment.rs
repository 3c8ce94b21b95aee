use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable overriding the Cursor `User` directory
pub const CURSOR_USER_DIR_ENV: &str = "CURSOR_USER_DIR";

const HISTORY_DIR_NAME: &str = "History";
const WORKSPACE_STORAGE_DIR_NAME: &str = "workspaceStorage";
const GLOBAL_STORAGE_DIR_NAME: &str = "globalStorage";
pub const STATE_DB_FILENAME: &str = "state.vscdb";

/// Get the Cursor `User` directory for this platform
///
/// - macOS: `~/Library/Application Support/Cursor/User`
/// - Linux: `~/.config/Cursor/User` (honours `XDG_CONFIG_HOME`)
/// - Windows: `%APPDATA%\Cursor\User`
pub fn get_cursor_user_dir() -> Result<PathBuf> {
    let config_dir =
        dirs::config_dir().context("Could not determine the platform configuration directory")?;
    Ok(config_dir.join("Cursor").join("User"))
}

/// Per-file backup logs live under `User/History`
pub fn history_dir(user_dir: &Path) -> PathBuf {
    user_dir.join(HISTORY_DIR_NAME)
}

pub fn workspace_storage_dir(user_dir: &Path) -> PathBuf {
    user_dir.join(WORKSPACE_STORAGE_DIR_NAME)
}

/// The global key-value store shared by all workspaces
pub fn global_state_db(user_dir: &Path) -> PathBuf {
    user_dir.join(GLOBAL_STORAGE_DIR_NAME).join(STATE_DB_FILENAME)
}
