//! Tool types for Turnkeep
//!
//! This module defines the `Tool` trait that every registered tool implements.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ToolError;

/// Outcome of a single tool invocation.
pub type ToolResult = std::result::Result<Value, ToolError>;

/// Trait that all tools must implement.
///
/// Tools receive the model-supplied arguments as a JSON object and return
/// any JSON value. Failures are reported as [`ToolError`]; the turn runner
/// turns them into text for the model instead of aborting the turn.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::{Map, Value};
/// use turnkeep::tools::{Tool, ToolResult};
///
/// struct MyTool;
///
/// #[async_trait]
/// impl Tool for MyTool {
///     fn name(&self) -> &str { "my_tool" }
///     fn description(&self) -> &str { "Does something useful" }
///     fn parameters(&self) -> Value {
///         serde_json::json!({
///             "type": "object",
///             "properties": {},
///             "required": []
///         })
///     }
///     async fn execute(&self, _args: Map<String, Value>) -> ToolResult {
///         Ok(Value::String("Done!".into()))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    ///
    /// This name is used to resolve the tool when the model requests it.
    /// It should be unique within a registry.
    fn name(&self) -> &str;

    /// Get the tool description sent to the model.
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's parameters.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Map<String, Value>) -> ToolResult;
}
