use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

/// Default window capacity for [`WindowMemory`].
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// The role a message was authored under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
    Tool,
}

impl Role {
    /// The wire-side role name used when rendering a transcript.
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Ai => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One conversation entry. Immutable after construction; `with_tool_calls`
/// returns a modified copy rather than mutating in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(rename = "message_type")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Map<String, Value>>,
}

impl Message {
    pub fn new(content: impl Into<String>, role: Role) -> Self {
        Self {
            content: content.into(),
            role,
            id: None,
            tool_calls: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(content, Role::System)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(content, Role::Human)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(content, Role::Ai)
    }

    /// Tool messages carry the id of the invocation they answer.
    pub fn tool(content: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Tool,
            id: Some(id.into()),
            tool_calls: None,
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Map<String, Value>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.role.wire_name(), self.content)
    }
}

/// Decode a bulk message payload: a JSON array, a single message object, or a
/// string containing either.
pub fn messages_from_value(value: Value) -> Result<Vec<Message>> {
    let value = match value {
        Value::String(text) => {
            serde_json::from_str(&text).map_err(|err| BridgeError::MemoryDecode(err.to_string()))?
        }
        other => other,
    };
    let entries = match value {
        Value::Array(entries) => entries,
        single => vec![single],
    };
    entries
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry).map_err(|err| BridgeError::MemoryDecode(err.to_string()))
        })
        .collect()
}

/// Render a transcript as one "<role>: <content>" line per message.
pub fn messages_to_string(messages: &[Message]) -> String {
    messages
        .iter()
        .map(Message::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Conversation memory as the prompt pipeline consumes it.
pub trait Memory: Send + Sync {
    /// A snapshot copy of the stored messages, oldest first.
    fn messages(&self) -> Vec<Message>;
    fn add_message(&mut self, message: Message);
    fn clear(&mut self);

    fn add_user_message(&mut self, content: &str) {
        self.add_message(Message::human(content));
    }

    fn add_ai_message(&mut self, content: &str) {
        self.add_message(Message::ai(content));
    }

    fn render(&self) -> String {
        messages_to_string(&self.messages())
    }
}

/// A fixed-capacity FIFO message log.
///
/// Insertion order is chronological order; once the window is full, each
/// insertion evicts the oldest entry first, so the log never exceeds its
/// capacity.
#[derive(Clone, Debug)]
pub struct WindowMemory {
    storage: Vec<Message>,
    window_size: usize,
}

impl Default for WindowMemory {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl WindowMemory {
    pub fn new(window_size: usize) -> Self {
        Self {
            storage: Vec::new(),
            window_size: window_size.max(1),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Replace the contents from a bulk payload, newest entries winning the
    /// window as on normal insertion.
    pub fn load(&mut self, value: Value) -> Result<()> {
        let messages = messages_from_value(value)?;
        self.storage.clear();
        for message in messages {
            self.add_message(message);
        }
        Ok(())
    }
}

impl Memory for WindowMemory {
    fn messages(&self) -> Vec<Message> {
        self.storage.clone()
    }

    fn add_message(&mut self, message: Message) {
        if self.storage.len() >= self.window_size {
            self.storage.remove(0);
        }
        self.storage.push(message);
    }

    fn clear(&mut self) {
        self.storage.clear();
    }
}

impl fmt::Display for WindowMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&messages_to_string(&self.storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn window_keeps_the_last_n_messages_in_insertion_order() {
        let mut memory = WindowMemory::new(3);
        for index in 0..5 {
            memory.add_user_message(&format!("message {index}"));
        }
        let messages = memory.messages();
        assert_eq!(messages.len(), 3);
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn clear_empties_without_changing_capacity() {
        let mut memory = WindowMemory::new(2);
        memory.add_user_message("hello");
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.window_size(), 2);
    }

    #[test]
    fn renders_roles_through_the_wire_mapping() {
        let mut memory = WindowMemory::default();
        memory.add_message(Message::system("be brief"));
        memory.add_user_message("hi");
        memory.add_ai_message("hello");
        memory.add_message(Message::tool("42", "call-1"));
        assert_eq!(
            memory.to_string(),
            "system: be brief\nuser: hi\nassistant: hello\ntool: 42"
        );
    }

    #[test]
    fn decodes_bulk_payloads_from_string_object_and_array() {
        let from_string = messages_from_value(json!(
            r#"[{"content": "hi", "message_type": "human"}]"#
        ))
        .unwrap();
        assert_eq!(from_string.len(), 1);
        assert_eq!(from_string[0].role, Role::Human);

        let from_object =
            messages_from_value(json!({"content": "ok", "message_type": "ai"})).unwrap();
        assert_eq!(from_object[0].role, Role::Ai);

        let from_array = messages_from_value(json!([
            {"content": "a", "message_type": "system"},
            {"content": "b", "message_type": "tool", "id": "call-9"},
        ]))
        .unwrap();
        assert_eq!(from_array.len(), 2);
        assert_eq!(from_array[1].id.as_deref(), Some("call-9"));
    }

    #[test]
    fn malformed_bulk_payloads_fail_with_memory_decode() {
        assert!(matches!(
            messages_from_value(json!("not json")),
            Err(BridgeError::MemoryDecode(_))
        ));
        assert!(matches!(
            messages_from_value(json!({"message_type": "nonsense"})),
            Err(BridgeError::MemoryDecode(_))
        ));
    }

    #[test]
    fn with_tool_calls_returns_a_copy() {
        let original = Message::ai("calling");
        let mut calls = Map::new();
        calls.insert("call-1".into(), json!({"name": "sum"}));
        let updated = original.clone().with_tool_calls(calls);
        assert!(original.tool_calls.is_none());
        assert!(updated.tool_calls.is_some());
    }
}
