//! Provider types for Turnkeep
//!
//! This module defines the completion-provider boundary: the
//! `CompletionProvider` trait, the request payload built from a store's
//! window, and the normalized response shape the turn runner scans.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TurnError};
use crate::session::InputItem;

/// Definition of a tool that the model may call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// The name of the tool (must be unique)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    ///
    /// # Example
    /// ```
    /// use turnkeep::providers::ToolDefinition;
    /// use serde_json::json;
    ///
    /// let tool = ToolDefinition::new(
    ///     "web_search",
    ///     "Search the web for information",
    ///     json!({
    ///         "type": "object",
    ///         "properties": {
    ///             "query": { "type": "string", "description": "Search query" }
    ///         },
    ///         "required": ["query"]
    ///     }),
    /// );
    /// assert_eq!(tool.name, "web_search");
    /// ```
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Tool-selection policy sent with every request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides whether to call tools
    #[default]
    Auto,
    /// The model must not call tools
    None,
    /// The model must call at least one tool
    Required,
}

impl std::fmt::Display for ToolChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolChoice::Auto => write!(f, "auto"),
            ToolChoice::None => write!(f, "none"),
            ToolChoice::Required => write!(f, "required"),
        }
    }
}

impl std::str::FromStr for ToolChoice {
    type Err = TurnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ToolChoice::Auto),
            "none" => Ok(ToolChoice::None),
            "required" => Ok(ToolChoice::Required),
            other => Err(TurnError::Config(format!("unknown tool choice '{}'", other))),
        }
    }
}

/// Outbound payload for one completion call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// System instructions
    pub instructions: String,
    /// Serialized window of the conversation store
    pub input: Vec<InputItem>,
    /// Declared tool schema
    pub tools: Vec<ToolDefinition>,
    /// Tool-selection policy
    pub tool_choice: ToolChoice,
    /// Server-side conversation to attach to, if one was adopted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    /// Response this call continues from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

/// One typed segment of a message's content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    /// Visible text produced by the model
    OutputText { text: String },
    /// Any segment type this crate does not consume (refusals, annotations, ...)
    #[serde(other)]
    Other,
}

/// One item of a provider response's `output` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    /// A message; only assistant messages contribute text to a turn
    Message {
        role: String,
        #[serde(default)]
        content: Vec<ContentSegment>,
    },
    /// A request to run a registered tool
    ToolCall {
        id: String,
        name: String,
        #[serde(default)]
        arguments: Map<String, Value>,
        /// Set when the arguments could not be decoded into a JSON object;
        /// such a call is reported as failed without running the tool
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arguments_error: Option<String>,
    },
    /// Reasoning traces, web search calls and other item types
    #[serde(other)]
    Other,
}

impl OutputItem {
    /// An assistant message with a single text segment.
    pub fn assistant_text(text: &str) -> Self {
        OutputItem::Message {
            role: "assistant".to_string(),
            content: vec![ContentSegment::OutputText {
                text: text.to_string(),
            }],
        }
    }

    /// A tool call item.
    pub fn tool_call(id: &str, name: &str, arguments: Map<String, Value>) -> Self {
        OutputItem::ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
            arguments_error: None,
        }
    }

    /// A tool call whose arguments failed to decode.
    pub fn malformed_tool_call(id: &str, name: &str, error: &str) -> Self {
        OutputItem::ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: Map::new(),
            arguments_error: Some(error.to_string()),
        }
    }

    /// Text of an assistant message, with its segments concatenated.
    ///
    /// Returns `None` for non-assistant messages, non-message items, and
    /// messages without any `output_text` segment.
    ///
    /// # Example
    /// ```
    /// use turnkeep::providers::OutputItem;
    ///
    /// assert_eq!(OutputItem::assistant_text("ok").assistant_text_content().as_deref(), Some("ok"));
    /// ```
    pub fn assistant_text_content(&self) -> Option<String> {
        let OutputItem::Message { role, content } = self else {
            return None;
        };
        if role != "assistant" {
            return None;
        }

        let mut text = String::new();
        let mut found = false;
        for segment in content {
            if let ContentSegment::OutputText { text: part } = segment {
                text.push_str(part);
                found = true;
            }
        }
        found.then_some(text)
    }
}

/// Normalized response from a completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    /// Provider-assigned response id, used to chain continuations
    pub id: String,
    /// Server-side conversation id, when the provider created or used one
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Ordered output items; absent means empty
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

impl CompletionResponse {
    /// A response holding a single assistant text message.
    ///
    /// # Example
    /// ```
    /// use turnkeep::providers::CompletionResponse;
    ///
    /// let response = CompletionResponse::text("resp_1", "Hello!");
    /// assert_eq!(response.output.len(), 1);
    /// assert!(!response.has_tool_calls());
    /// ```
    pub fn text(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            conversation_id: None,
            output: vec![OutputItem::assistant_text(text)],
        }
    }

    /// A response with arbitrary output items.
    pub fn with_output(id: &str, output: Vec<OutputItem>) -> Self {
        Self {
            id: id.to_string(),
            conversation_id: None,
            output,
        }
    }

    /// Attach a conversation id.
    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = Some(conversation_id.to_string());
        self
    }

    /// Check if any output item is a tool call.
    pub fn has_tool_calls(&self) -> bool {
        self.output
            .iter()
            .any(|item| matches!(item, OutputItem::ToolCall { .. }))
    }
}

/// Trait for completion providers.
///
/// Implementations translate a [`CompletionRequest`] into their API's wire
/// format and normalize the reply into a [`CompletionResponse`]. Transport
/// and HTTP failures are returned as errors; the turn runner does not retry.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue one completion call.
    async fn create(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai").
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_choice_parse_and_display() {
        assert_eq!("auto".parse::<ToolChoice>().unwrap(), ToolChoice::Auto);
        assert_eq!(" Required ".parse::<ToolChoice>().unwrap(), ToolChoice::Required);
        assert_eq!("none".parse::<ToolChoice>().unwrap(), ToolChoice::None);
        assert!("sometimes".parse::<ToolChoice>().is_err());
        assert_eq!(ToolChoice::Required.to_string(), "required");
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
    }

    #[test]
    fn test_request_serialization_skips_absent_chaining() {
        let request = CompletionRequest {
            model: "gpt-5-mini".to_string(),
            instructions: "Be brief.".to_string(),
            input: vec![],
            tools: vec![],
            tool_choice: ToolChoice::Auto,
            conversation: None,
            previous_response_id: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tool_choice"], "auto");
        assert!(value.get("conversation").is_none());
        assert!(value.get("previous_response_id").is_none());
    }

    #[test]
    fn test_response_missing_output_is_empty() {
        let response: CompletionResponse = serde_json::from_value(json!({"id": "resp_1"})).unwrap();
        assert!(response.output.is_empty());
        assert!(response.conversation_id.is_none());
    }

    #[test]
    fn test_output_item_deserialize_unknown_types() {
        let items: Vec<OutputItem> = serde_json::from_value(json!([
            {"type": "reasoning", "summary": []},
            {"type": "message", "role": "assistant", "content": [
                {"type": "refusal", "refusal": "no"},
                {"type": "output_text", "text": "hi"}
            ]},
            {"type": "tool_call", "id": "c1", "name": "search", "arguments": {"q": "x"}}
        ]))
        .unwrap();

        assert_eq!(items[0], OutputItem::Other);
        assert_eq!(items[1].assistant_text_content().as_deref(), Some("hi"));
        match &items[2] {
            OutputItem::ToolCall { id, name, arguments, .. } => {
                assert_eq!(id, "c1");
                assert_eq!(name, "search");
                assert_eq!(arguments["q"], "x");
            }
            other => panic!("expected tool call, got {:?}", other),
        }
    }

    #[test]
    fn test_assistant_text_content_concatenates_segments() {
        let item = OutputItem::Message {
            role: "assistant".to_string(),
            content: vec![
                ContentSegment::OutputText {
                    text: "Hello, ".to_string(),
                },
                ContentSegment::Other,
                ContentSegment::OutputText {
                    text: "world".to_string(),
                },
            ],
        };
        assert_eq!(item.assistant_text_content().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_assistant_text_content_ignores_other_roles_and_empty() {
        let user = OutputItem::Message {
            role: "user".to_string(),
            content: vec![ContentSegment::OutputText {
                text: "echo".to_string(),
            }],
        };
        assert!(user.assistant_text_content().is_none());

        let empty = OutputItem::Message {
            role: "assistant".to_string(),
            content: vec![],
        };
        assert!(empty.assistant_text_content().is_none());

        let call = OutputItem::tool_call("c1", "search", Map::new());
        assert!(call.assistant_text_content().is_none());
    }

    #[test]
    fn test_response_builders() {
        let response = CompletionResponse::with_output(
            "resp_2",
            vec![OutputItem::tool_call("c1", "echo", Map::new())],
        )
        .with_conversation("conv_9");

        assert!(response.has_tool_calls());
        assert_eq!(response.conversation_id.as_deref(), Some("conv_9"));
    }
}
