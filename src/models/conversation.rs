use serde_json::Value;

const MESSAGES_FIELD: &str = "messages";
const BUBBLE_CONTENT_FIELD: &str = "bubbleContent";

/// A chat record recovered from the key-value store
///
/// The payload format belongs to the editor and changes between releases, so it is
/// kept as a raw JSON value and probed for the shapes we know about.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRecord {
    pub key: String,
    pub payload: Value,
}

impl ConversationRecord {
    pub fn new(key: impl Into<String>, payload: Value) -> Self {
        Self { key: key.into(), payload }
    }

    /// The record's message list
    ///
    /// Tries `{"messages": [...]}` first, then `{"bubbleContent": {"messages": [...]}}`.
    /// Any other shape has no messages.
    pub fn messages(&self) -> &[Value] {
        let direct = self.payload.get(MESSAGES_FIELD);
        let nested = || self.payload.get(BUBBLE_CONTENT_FIELD)?.get(MESSAGES_FIELD);

        match direct.or_else(nested).and_then(Value::as_array) {
            Some(messages) => messages,
            None => &[],
        }
    }

    /// Case-insensitive substring match against the serialized payload
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.payload.to_string().to_lowercase().contains(&filter.to_lowercase())
    }
}

/// Body of a message: `text`, falling back to `content`. Empty bodies count as absent.
pub fn message_text(message: &Value) -> Option<&str> {
    let non_empty = |field: &str| message.get(field)?.as_str().filter(|s| !s.is_empty());
    non_empty("text").or_else(|| non_empty("content"))
}
