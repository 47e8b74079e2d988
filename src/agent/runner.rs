//! Turn runner implementation
//!
//! One turn: record the user's input, request a completion from the store's
//! window, execute each tool call in the response (each followed by one
//! chained continuation), and record the accumulated assistant text.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info_span, warn, Instrument};

use crate::config::AgentConfig;
use crate::error::Result;
use crate::log_component;
use crate::providers::{CompletionProvider, CompletionRequest, CompletionResponse, OutputItem, ToolChoice};
use crate::session::ConversationStore;
use crate::tools::ToolRegistry;

/// Fixed per-request settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSettings {
    /// Model identifier
    pub model: String,
    /// System instructions
    pub instructions: String,
    /// Tool-selection policy
    pub tool_choice: ToolChoice,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

impl TurnSettings {
    /// Take the request settings from the agent section of the config.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            instructions: config.instructions.clone(),
            tool_choice: config.tool_choice,
        }
    }
}

/// Drives single turns against a completion provider and a tool registry.
///
/// The runner holds no conversation state of its own; every turn reads and
/// appends to the [`ConversationStore`] it is given. Taking the store by
/// `&mut` keeps turns on one store serialized.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use turnkeep::agent::{TurnRunner, TurnSettings};
/// use turnkeep::providers::OpenAIResponsesProvider;
/// use turnkeep::session::ConversationStore;
/// use turnkeep::tools::{EchoTool, ToolRegistry};
///
/// let mut tools = ToolRegistry::new();
/// tools.register(Box::new(EchoTool));
/// let runner = TurnRunner::new(
///     Arc::new(OpenAIResponsesProvider::new("sk-...")),
///     tools,
///     TurnSettings::default(),
/// );
///
/// let mut store = ConversationStore::default();
/// let reply = runner.run_turn(&mut store, Some("Echo 'hi' please")).await?;
/// ```
pub struct TurnRunner {
    provider: Arc<dyn CompletionProvider>,
    tools: ToolRegistry,
    settings: TurnSettings,
}

impl TurnRunner {
    /// Create a runner over a provider, a tool registry and request settings.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        tools: ToolRegistry,
        settings: TurnSettings,
    ) -> Self {
        Self {
            provider,
            tools,
            settings,
        }
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one turn and return the final assistant text, trimmed.
    ///
    /// Tool failures never fail the turn; they become the tool's result text.
    /// Provider failures are returned as errors, with whatever was already
    /// appended to the store left in place.
    ///
    /// Only tool calls in the initial response are executed. Tool calls that
    /// a continuation asks for are logged and dropped.
    pub async fn run_turn(
        &self,
        store: &mut ConversationStore,
        user_text: Option<&str>,
    ) -> Result<String> {
        let span = info_span!("turn", provider = self.provider.name(), model = %self.settings.model);
        self.run_turn_inner(store, user_text).instrument(span).await
    }

    async fn run_turn_inner(
        &self,
        store: &mut ConversationStore,
        user_text: Option<&str>,
    ) -> Result<String> {
        if let Some(text) = user_text.filter(|t| !t.is_empty()) {
            store.add_user(text);
        }

        let request = self.build_request(store, None);
        log_component!(
            debug,
            "agent",
            "Requesting completion",
            input_items = request.input.len(),
            window_items = store.window().len(),
            history_items = store.len()
        );
        let response = self.provider.create(request).await?;
        adopt_conversation(store, &response);

        let mut chunks: Vec<String> = Vec::new();

        for item in &response.output {
            match item {
                OutputItem::Message { .. } => {
                    if let Some(text) = item.assistant_text_content() {
                        chunks.push(text);
                    }
                }
                OutputItem::ToolCall {
                    id,
                    name,
                    arguments,
                    arguments_error,
                } => {
                    self.execute_tool_call(store, id, name, arguments, arguments_error.as_deref())
                        .await;

                    let continuation = self
                        .provider
                        .create(self.build_request(store, Some(&response.id)))
                        .await?;
                    adopt_conversation(store, &continuation);

                    for follow_up in &continuation.output {
                        match follow_up {
                            OutputItem::ToolCall { name, .. } => {
                                warn!(
                                    tool = %name,
                                    "Continuation requested another tool call; not executing"
                                );
                            }
                            other => {
                                if let Some(text) = other.assistant_text_content() {
                                    chunks.push(text);
                                }
                            }
                        }
                    }
                }
                OutputItem::Other => {}
            }
        }

        let final_text = chunks.join("\n").trim().to_string();
        if !final_text.is_empty() {
            store.add_assistant(&final_text);
        }

        log_component!(
            info,
            "agent",
            "Turn complete",
            reply_chars = final_text.chars().count(),
            history_items = store.len()
        );
        Ok(final_text)
    }

    /// Record a tool call, run it, and record its outcome.
    ///
    /// A call whose arguments failed to decode is recorded as failed and the
    /// tool is not run.
    async fn execute_tool_call(
        &self,
        store: &mut ConversationStore,
        call_id: &str,
        name: &str,
        arguments: &Map<String, Value>,
        arguments_error: Option<&str>,
    ) {
        debug!(tool = %name, call_id = %call_id, "Executing tool call");
        store.add_tool_call(name, arguments.clone());

        let outcome = match arguments_error {
            Some(reason) => Err(reason.to_string()),
            None => self
                .tools
                .invoke(name, arguments.clone())
                .await
                .map_err(|e| e.to_string()),
        };
        let result = outcome.unwrap_or_else(|reason| {
            warn!(tool = %name, error = %reason, "Tool call failed; reporting failure to model");
            Value::String(format!("Tool '{}' failed: {}", name, reason))
        });

        let call_ref = Some(call_id).filter(|id| !id.is_empty());
        store.add_tool_result(name, result, call_ref);
    }

    /// Build a request from the store's current window.
    ///
    /// Continuations chain with `previous_response_id` and leave out the
    /// conversation id; initial requests attach the adopted conversation.
    fn build_request(
        &self,
        store: &ConversationStore,
        previous_response_id: Option<&str>,
    ) -> CompletionRequest {
        let conversation = match previous_response_id {
            Some(_) => None,
            None => store.conversation_id().map(str::to_string),
        };

        CompletionRequest {
            model: self.settings.model.clone(),
            instructions: self.settings.instructions.clone(),
            input: store.to_model_input(),
            tools: self.tools.definitions(),
            tool_choice: self.settings.tool_choice,
            conversation,
            previous_response_id: previous_response_id.map(str::to_string),
        }
    }
}

fn adopt_conversation(store: &mut ConversationStore, response: &CompletionResponse) {
    if let Some(id) = response.conversation_id.as_deref() {
        store.adopt_conversation_id(id);
    }
}
