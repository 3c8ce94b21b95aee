use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::models::ConversationRecord;
use crate::store::inspector::KvStore;

/// Key namespace holding chat bubbles
pub const CONVERSATION_KEY_PREFIX: &str = "bubbleId:";

/// Conversation records of a store plus the number of unusable values
#[derive(Debug, Default)]
pub struct LoadedConversations {
    pub records: Vec<ConversationRecord>,
    /// Values that were NULL, not UTF-8 or not JSON
    pub skipped: usize,
}

/// Load every conversation record stored under [`CONVERSATION_KEY_PREFIX`]
///
/// Records are returned in key order. Values that cannot be decoded as JSON are
/// skipped and counted.
///
/// # Errors
///
/// Returns an error if the table cannot be queried.
pub fn load_conversations(store: &KvStore, table: &str) -> Result<LoadedConversations> {
    let mut loaded = LoadedConversations::default();

    for (key, value) in store.entries_with_prefix(CONVERSATION_KEY_PREFIX, table)? {
        match value.as_deref().and_then(decode_payload) {
            Some(payload) => loaded.records.push(ConversationRecord::new(key, payload)),
            None => {
                debug!(key = %key, "Skipping conversation value that is not JSON");
                loaded.skipped += 1;
            }
        }
    }

    Ok(loaded)
}

fn decode_payload(bytes: &[u8]) -> Option<Value> {
    let text = std::str::from_utf8(bytes).ok()?;
    serde_json::from_str(text).ok()
}
