//! Turnkeep - a minimal conversational agent loop
//!
//! Keeps an append-only conversation history, sends a budgeted window of it to
//! an OpenAI Responses-style completion endpoint, and executes the tool calls
//! the model asks for.

pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod tools;
pub mod utils;

pub use agent::{TurnRunner, TurnSettings};
pub use config::Config;
pub use error::{ProviderError, Result, ToolError, TurnError};
pub use providers::{
    CompletionProvider, CompletionRequest, CompletionResponse, OpenAIResponsesProvider,
    OutputItem, ToolChoice, ToolDefinition,
};
pub use session::{ConversationItem, ConversationStore, InputItem, ItemContent, ItemKind, ItemRole};
pub use tools::{Tool, ToolRegistry};
