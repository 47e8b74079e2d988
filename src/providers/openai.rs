//! OpenAI Responses API Provider
//!
//! This module implements the `CompletionProvider` trait for OpenAI's
//! Responses API (`POST /v1/responses`), handling request conversion,
//! conversation/response chaining, and output normalization.
//!
//! # Example
//!
//! ```rust,ignore
//! use turnkeep::providers::{CompletionProvider, OpenAIResponsesProvider};
//!
//! async fn example(request: turnkeep::providers::CompletionRequest) {
//!     let provider = OpenAIResponsesProvider::new("your-api-key");
//!     let response = provider.create(request).await.unwrap();
//!     println!("response id: {}", response.id);
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Result, TurnError};
use crate::session::InputItem;

use super::{
    parse_provider_error, CompletionProvider, CompletionRequest, CompletionResponse,
    ContentSegment, OutputItem, ToolChoice, ToolDefinition,
};

/// The OpenAI API endpoint URL.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// Responses API Request Types
// ============================================================================

/// Responses API request body.
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a [InputItem],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ResponsesTool<'a>>,
    tool_choice: ToolChoice,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
}

/// Function tool declaration in the Responses API's flat shape.
#[derive(Debug, Serialize)]
struct ResponsesTool<'a> {
    /// Always "function"
    r#type: &'static str,
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

// ============================================================================
// Responses API Response Types
// ============================================================================

/// Responses API response body.
///
/// Output items are kept as raw JSON and normalized by [`convert_output_item`]
/// so unknown item types never fail the whole response.
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    conversation: Option<ConversationField>,
    #[serde(default)]
    output: Option<Vec<Value>>,
}

/// The `conversation` field is either a bare id or `{ "id": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConversationField {
    Id(String),
    Object { id: String },
}

impl ConversationField {
    fn into_id(self) -> String {
        match self {
            ConversationField::Id(id) => id,
            ConversationField::Object { id } => id,
        }
    }
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

/// OpenAI API error details.
#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
    #[serde(default)]
    r#type: Option<String>,
}

// ============================================================================
// OpenAI Responses Provider
// ============================================================================

/// OpenAI Responses API provider.
pub struct OpenAIResponsesProvider {
    /// API key for authentication
    api_key: String,
    /// API base URL
    api_base: String,
    /// HTTP client for making requests
    client: Client,
}

impl OpenAIResponsesProvider {
    /// Create a new provider with the given API key and the default endpoint.
    ///
    /// # Example
    /// ```
    /// use turnkeep::providers::{CompletionProvider, OpenAIResponsesProvider};
    ///
    /// let provider = OpenAIResponsesProvider::new("sk-xxx");
    /// assert_eq!(provider.name(), "openai");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, OPENAI_API_URL)
    }

    /// Create a new provider against an OpenAI-compatible base URL.
    ///
    /// A trailing slash on `api_base` is removed.
    pub fn with_base_url(api_key: &str, api_base: &str) -> Self {
        Self::with_client(api_key, api_base, Client::new())
    }

    /// Create a new provider with a custom HTTP client (timeouts, proxies).
    pub fn with_client(api_key: &str, api_base: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        }
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

fn convert_tools(tools: &[ToolDefinition]) -> Vec<ResponsesTool<'_>> {
    tools
        .iter()
        .map(|t| ResponsesTool {
            r#type: "function",
            name: &t.name,
            description: &t.description,
            parameters: &t.parameters,
        })
        .collect()
}

fn build_request(request: &CompletionRequest) -> ResponsesRequest<'_> {
    ResponsesRequest {
        model: &request.model,
        instructions: &request.instructions,
        input: &request.input,
        tools: convert_tools(&request.tools),
        tool_choice: request.tool_choice,
        conversation: request.conversation.as_deref(),
        previous_response_id: request.previous_response_id.as_deref(),
    }
}

/// Parse tool arguments, which arrive either as a JSON object or as a
/// JSON-encoded string. Empty or missing arguments mean no arguments.
fn parse_arguments(raw: Option<&Value>) -> std::result::Result<Map<String, Value>, String> {
    match raw {
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Map::new()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!("Arguments are not an object: {}", other)),
            Err(e) => Err(format!("Invalid arguments JSON: {}", e)),
        },
        Some(Value::Null) | None => Ok(Map::new()),
        Some(other) => Err(format!("Arguments are not an object: {}", other)),
    }
}

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

/// Normalize one raw output item.
fn convert_output_item(item: &Value) -> OutputItem {
    match str_field(item, "type") {
        Some("message") => {
            let content = item
                .get("content")
                .and_then(Value::as_array)
                .map(|segments| {
                    segments
                        .iter()
                        .map(|segment| match str_field(segment, "type") {
                            Some("output_text") => ContentSegment::OutputText {
                                text: str_field(segment, "text").unwrap_or_default().to_string(),
                            },
                            _ => ContentSegment::Other,
                        })
                        .collect()
                })
                .unwrap_or_default();
            OutputItem::Message {
                role: str_field(item, "role").unwrap_or_default().to_string(),
                content,
            }
        }
        Some("function_call") | Some("tool_call") => {
            let id = str_field(item, "call_id")
                .or_else(|| str_field(item, "id"))
                .unwrap_or_default();
            let name = str_field(item, "name").unwrap_or_default();
            match parse_arguments(item.get("arguments")) {
                Ok(arguments) => OutputItem::tool_call(id, name, arguments),
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "Undecodable tool arguments");
                    OutputItem::malformed_tool_call(id, name, &e)
                }
            }
        }
        _ => OutputItem::Other,
    }
}

fn convert_response(response: ResponsesResponse) -> CompletionResponse {
    CompletionResponse {
        id: response.id,
        conversation_id: response.conversation.map(ConversationField::into_id),
        output: response
            .output
            .unwrap_or_default()
            .iter()
            .map(convert_output_item)
            .collect(),
    }
}

// ============================================================================
// CompletionProvider Implementation
// ============================================================================

#[async_trait]
impl CompletionProvider for OpenAIResponsesProvider {
    async fn create(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = build_request(&request);

        debug!(
            model = %request.model,
            input_items = request.input.len(),
            chained = request.previous_response_id.is_some(),
            "OpenAI responses request"
        );

        let response = self
            .client
            .post(format!("{}/responses", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TurnError::Provider(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            let detail = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(parsed) => match parsed.error.r#type {
                    Some(kind) => format!("{} - {}", kind, parsed.error.message),
                    None => parsed.error.message,
                },
                Err(_) => error_text,
            };

            return Err(parse_provider_error(status.as_u16(), &detail).into());
        }

        let raw: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| TurnError::Provider(format!("Failed to parse OpenAI response: {}", e)))?;

        let converted = convert_response(raw);
        info!(
            response_id = %converted.id,
            output_items = converted.output.len(),
            "OpenAI response received"
        );
        Ok(converted)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Tests
// ============================================================================
