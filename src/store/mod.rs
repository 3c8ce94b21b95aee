//! Read-only inspection of the editor's SQLite key-value stores (`state.vscdb`).
//!
//! - [`KvStore`] - table listing, key listing/search and value lookup
//! - [`load_conversations`] - chat records under the `bubbleId:` namespace
//! - [`extract_code`] - writes code-bearing chat messages to individual files

pub mod conversations;
pub mod extract;
pub mod inspector;

pub use conversations::{CONVERSATION_KEY_PREFIX, LoadedConversations, load_conversations};
pub use extract::{DEFAULT_OUTPUT_DIR, ExtractReport, extract_code, looks_like_code};
pub use inspector::{DEFAULT_TABLE, KvStore, TableSummary, render_value};
