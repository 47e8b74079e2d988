//! Conversation item types for Turnkeep
//!
//! This module defines the units of dialogue history kept by the
//! [`ConversationStore`](super::ConversationStore): roles, item kinds, the
//! kind-specific content payload, and the wire shape a window is serialized
//! into before it is sent to the completion endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Characters per approximate size unit.
const CHARS_PER_UNIT: usize = 4;

/// The role of the participant an item belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemRole {
    /// Messages from the user
    User,
    /// Messages and tool calls from the model
    Assistant,
    /// Results from tool executions
    Tool,
}

impl std::fmt::Display for ItemRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRole::User => write!(f, "user"),
            ItemRole::Assistant => write!(f, "assistant"),
            ItemRole::Tool => write!(f, "tool"),
        }
    }
}

/// What an item holds, derived from its [`ItemContent`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
    ToolCall,
    ToolResult,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Text => write!(f, "text"),
            ItemKind::ToolCall => write!(f, "tool_call"),
            ItemKind::ToolResult => write!(f, "tool_result"),
        }
    }
}

/// Kind-specific payload of a conversation item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ItemContent {
    /// Plain text from the user or the assistant
    Text(String),
    /// A tool invocation requested by the model
    ToolCall {
        tool_name: String,
        arguments: Map<String, Value>,
    },
    /// The outcome of a tool invocation
    ToolResult {
        tool_name: String,
        result: Value,
        /// Identifier of the originating tool call, when the provider gave one.
        /// Not validated against earlier items.
        call_id: Option<String>,
    },
}

impl ItemContent {
    /// The kind tag for this payload.
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemContent::Text(_) => ItemKind::Text,
            ItemContent::ToolCall { .. } => ItemKind::ToolCall,
            ItemContent::ToolResult { .. } => ItemKind::ToolResult,
        }
    }

    /// Textual representation used for size approximation.
    ///
    /// Text is returned as-is; structured payloads are rendered as compact
    /// JSON objects so every variant has a stable string form.
    pub fn as_text(&self) -> String {
        match self {
            ItemContent::Text(text) => text.clone(),
            ItemContent::ToolCall {
                tool_name,
                arguments,
            } => serde_json::json!({
                "tool_name": tool_name,
                "arguments": arguments,
            })
            .to_string(),
            ItemContent::ToolResult {
                tool_name,
                result,
                call_id,
            } => serde_json::json!({
                "tool_name": tool_name,
                "result": result,
                "call_id": call_id,
            })
            .to_string(),
        }
    }
}

/// Render a tool result value the way it is shown to the model.
///
/// JSON strings are passed through without quotes; every other value is
/// encoded as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One unit of dialogue history.
///
/// Items are immutable once appended. `id` and `created_at` are informational;
/// insertion order in the store is the only ordering that matters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationItem {
    /// Process-unique identifier for external auditing
    pub id: String,
    /// Who produced this item
    pub role: ItemRole,
    /// Kind-tagged payload
    #[serde(flatten)]
    pub content: ItemContent,
    /// Wall-clock creation time
    pub created_at: DateTime<Utc>,
}

impl ConversationItem {
    /// Create a new item with a fresh id and the current timestamp.
    ///
    /// # Example
    /// ```
    /// use turnkeep::session::{ConversationItem, ItemContent, ItemKind, ItemRole};
    ///
    /// let item = ConversationItem::new(ItemRole::User, ItemContent::Text("hi".into()));
    /// assert_eq!(item.kind(), ItemKind::Text);
    /// assert!(!item.id.is_empty());
    /// ```
    pub fn new(role: ItemRole, content: ItemContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    /// The kind tag of this item's content.
    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    /// Approximate size in model-context units: `max(1, chars / 4)`.
    ///
    /// # Example
    /// ```
    /// use turnkeep::session::{ConversationItem, ItemContent, ItemRole};
    ///
    /// let item = ConversationItem::new(ItemRole::User, ItemContent::Text("hello there".into()));
    /// assert_eq!(item.approx_size(), 2);
    /// ```
    pub fn approx_size(&self) -> usize {
        let chars = self.content.as_text().chars().count();
        (chars / CHARS_PER_UNIT).max(1)
    }
}

/// One entry of the serialized window, in the completion endpoint's input shape.
///
/// Text items become `{role, content}`; tool results become
/// `{role: "tool", content, name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputItem {
    pub role: ItemRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InputItem {
    /// A plain `{role, content}` entry.
    pub fn message(role: ItemRole, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            name: None,
        }
    }

    /// A `{role: "tool", content, name}` entry.
    pub fn tool(name: &str, content: &str) -> Self {
        Self {
            role: ItemRole::Tool,
            content: content.to_string(),
            name: Some(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(role: ItemRole, s: &str) -> ConversationItem {
        ConversationItem::new(role, ItemContent::Text(s.to_string()))
    }

    #[test]
    fn test_role_display() {
        assert_eq!(ItemRole::User.to_string(), "user");
        assert_eq!(ItemRole::Assistant.to_string(), "assistant");
        assert_eq!(ItemRole::Tool.to_string(), "tool");
    }

    #[test]
    fn test_kind_follows_content() {
        assert_eq!(text(ItemRole::User, "hi").kind(), ItemKind::Text);

        let call = ConversationItem::new(
            ItemRole::Assistant,
            ItemContent::ToolCall {
                tool_name: "search".into(),
                arguments: Map::new(),
            },
        );
        assert_eq!(call.kind(), ItemKind::ToolCall);
        assert_eq!(call.kind().to_string(), "tool_call");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = text(ItemRole::User, "a");
        let b = text(ItemRole::User, "a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_approx_size_floor_and_minimum() {
        assert_eq!(text(ItemRole::User, "").approx_size(), 1);
        assert_eq!(text(ItemRole::User, "hi").approx_size(), 1);
        assert_eq!(text(ItemRole::User, "abcd").approx_size(), 1);
        assert_eq!(text(ItemRole::User, "abcdefg").approx_size(), 1);
        assert_eq!(text(ItemRole::User, "abcdefgh").approx_size(), 2);
        assert_eq!(
            text(
                ItemRole::User,
                "a very long text exceeding forty characters here"
            )
            .approx_size(),
            12
        );
    }

    #[test]
    fn test_approx_size_counts_chars_not_bytes() {
        // 4 chars, 12 bytes
        assert_eq!(text(ItemRole::User, "日本語だ").approx_size(), 1);
        assert_eq!(text(ItemRole::User, "日本語だ日本語だ").approx_size(), 2);
    }

    #[test]
    fn test_approx_size_structured_content() {
        let mut args = Map::new();
        args.insert("q".into(), json!("x"));
        let call = ConversationItem::new(
            ItemRole::Assistant,
            ItemContent::ToolCall {
                tool_name: "search".into(),
                arguments: args,
            },
        );
        let rendered = call.content.as_text();
        assert_eq!(rendered, r#"{"arguments":{"q":"x"},"tool_name":"search"}"#);
        assert_eq!(call.approx_size(), rendered.chars().count() / 4);
    }

    #[test]
    fn test_approx_size_tool_result_with_nested_value() {
        let item = ConversationItem::new(
            ItemRole::Tool,
            ItemContent::ToolResult {
                tool_name: "lookup".into(),
                result: json!({"rows": [1, 2, 3], "ok": true}),
                call_id: None,
            },
        );
        assert!(item.approx_size() >= 1);
        assert!(item.content.as_text().contains("\"call_id\":null"));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("42")), "42");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(null)), "null");
        assert_eq!(render_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_input_item_serialization() {
        let msg = InputItem::message(ItemRole::User, "hi");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "content": "hi"})
        );

        let tool = InputItem::tool("search", "42");
        assert_eq!(
            serde_json::to_value(&tool).unwrap(),
            json!({"role": "tool", "content": "42", "name": "search"})
        );
    }

    #[test]
    fn test_item_serialization_for_audit() {
        let item = ConversationItem::new(
            ItemRole::Tool,
            ItemContent::ToolResult {
                tool_name: "search".into(),
                result: json!("42"),
                call_id: Some("c1".into()),
            },
        );
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["kind"], "tool_result");
        assert_eq!(value["content"]["call_id"], "c1");
        assert_eq!(value["id"], item.id.as_str());
    }
}
