//! Tools module - Tool registry for model function calling
//!
//! The turn runner resolves model-requested tool calls against a
//! [`ToolRegistry`]. The concrete tool set is up to the embedder; two small
//! built-ins are provided for demos and tests.
//!
//! # Built-in Tools
//!
//! - `EchoTool`: echoes back a message
//! - `ClockTool`: reports the current UTC time

mod registry;
mod types;

pub use registry::ToolRegistry;
pub use types::{Tool, ToolResult};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::ToolError;

/// A simple echo tool for testing purposes.
///
/// # Example
///
/// ```rust
/// use turnkeep::tools::{Tool, EchoTool};
/// use serde_json::{json, Map};
///
/// # tokio_test::block_on(async {
/// let mut args = Map::new();
/// args.insert("message".into(), json!("Hello"));
/// assert_eq!(EchoTool.execute(args).await.unwrap(), json!("Hello"));
/// # });
/// ```
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes back the provided message"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to echo"
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, args: Map<String, Value>) -> ToolResult {
        match args.get("message") {
            Some(Value::String(message)) => Ok(Value::String(message.clone())),
            Some(_) => Err(ToolError::InvalidArguments(
                "'message' must be a string".to_string(),
            )),
            None => Err(ToolError::InvalidArguments(
                "missing 'message'".to_string(),
            )),
        }
    }
}

/// Reports the current time in UTC.
pub struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Returns the current date and time in UTC (RFC 3339)"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _args: Map<String, Value>) -> ToolResult {
        Ok(serde_json::json!({ "utc": Utc::now().to_rfc3339() }))
    }
}
