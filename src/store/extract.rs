use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::warn;

use crate::models::conversation::message_text;
use crate::store::conversations::load_conversations;
use crate::store::inspector::KvStore;

/// Default directory for extracted snippets
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_code";

const CODE_MARKERS: [&str; 4] = ["```", "def ", "function ", "class "];

/// Outcome of [`extract_code`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    /// Conversation records considered (after filtering)
    pub conversations: usize,
    /// Files written, in write order
    pub extracted: Vec<PathBuf>,
    /// Records whose payload was not JSON
    pub skipped: usize,
    /// Snippets that could not be written
    pub write_failures: usize,
}

/// True if a message body looks like it carries code
pub fn looks_like_code(text: &str) -> bool {
    CODE_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Write every code-bearing message of the store's conversations to `output_dir`
///
/// With `filter`, only records whose serialized payload contains it
/// (case-insensitive) are considered. Each snippet goes to
/// `conversation_<record>_message_<message>.txt` with a provenance header; files from
/// earlier runs with the same name are overwritten.
///
/// # Errors
///
/// Returns an error if the store cannot be queried or `output_dir` cannot be created.
/// Individual write failures are logged and counted.
pub fn extract_code(
    store: &KvStore,
    table: &str,
    output_dir: &Path,
    filter: Option<&str>,
) -> Result<ExtractReport> {
    extract_code_at(store, table, output_dir, filter, Local::now())
}

pub(crate) fn extract_code_at(
    store: &KvStore,
    table: &str,
    output_dir: &Path,
    filter: Option<&str>,
    extracted_at: DateTime<Local>,
) -> Result<ExtractReport> {
    let loaded = load_conversations(store, table)?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut report = ExtractReport { skipped: loaded.skipped, ..Default::default() };

    for (record_index, record) in loaded.records.iter().enumerate() {
        if let Some(filter) = filter
            && !record.matches_filter(filter)
        {
            continue;
        }
        report.conversations += 1;

        for (message_index, message) in record.messages().iter().enumerate() {
            let Some(text) = message_text(message) else {
                continue;
            };
            if !looks_like_code(text) {
                continue;
            }

            let path = output_dir
                .join(format!("conversation_{}_message_{}.txt", record_index, message_index));
            let content = format!(
                "# Extracted from conversation: {}\n# Message index: {}\n# Timestamp: {}\n\n{}",
                record.key,
                message_index,
                extracted_at.format("%Y-%m-%d %H:%M:%S"),
                text
            );

            match fs::write(&path, content) {
                Ok(()) => report.extracted.push(path),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to write snippet");
                    report.write_failures += 1;
                }
            }
        }
    }

    Ok(report)
}
