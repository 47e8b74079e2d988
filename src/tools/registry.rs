//! Tool registry for Turnkeep
//!
//! This module provides the `ToolRegistry` struct, a name-to-tool mapping
//! used by the turn runner to resolve and invoke model-requested tools.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::error::ToolError;
use crate::providers::ToolDefinition;

use super::{Tool, ToolResult};

/// A registry that holds and invokes tools by name.
///
/// # Example
///
/// ```rust
/// use turnkeep::tools::{ToolRegistry, EchoTool};
/// use serde_json::{json, Map};
///
/// # tokio_test::block_on(async {
/// let mut registry = ToolRegistry::new();
/// registry.register(Box::new(EchoTool));
///
/// let mut args = Map::new();
/// args.insert("message".into(), json!("hello"));
/// let result = registry.invoke("echo", args).await;
/// assert_eq!(result.unwrap(), json!("hello"));
///
/// assert!(registry.invoke("missing", Map::new()).await.is_err());
/// # });
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        info!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Resolve a tool by name and run it with the given arguments.
    ///
    /// An unknown name is reported as [`ToolError::UnknownTool`].
    pub async fn invoke(&self, name: &str, args: Map<String, Value>) -> ToolResult {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let start = Instant::now();

        match tool.execute(args).await {
            Ok(output) => {
                info!(
                    tool = name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool executed successfully"
                );
                Ok(output)
            }
            Err(e) => {
                error!(
                    tool = name,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool execution failed"
                );
                Err(e)
            }
        }
    }

    /// Tool definitions for the request payload, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.parameters()))
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Names of all registered tools, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a tool exists in the registry.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
