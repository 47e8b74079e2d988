//! Configuration type definitions for Turnkeep
//!
//! All types implement serde traits for JSON serialization and have sensible defaults.

use serde::{Deserialize, Serialize};

use crate::providers::ToolChoice;
use crate::session::DEFAULT_TOKEN_BUDGET;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Default system instructions.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful assistant. When tools are useful, call them.";

/// Main configuration struct for Turnkeep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Turn configuration (model, instructions, tool policy, window budget)
    pub agent: AgentConfig,
    /// Completion provider credentials and endpoint
    pub provider: ProviderConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Fixed per-request settings and the history window budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// System instructions sent with every request
    pub instructions: String,
    /// Tool-selection policy
    pub tool_choice: ToolChoice,
    /// Window budget in approximate size units (chars / 4)
    pub token_budget: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            tool_choice: ToolChoice::Auto,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Completion provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key for the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (OpenAI-compatible endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Compact single-line output with targets and fields
    #[default]
    Component,
    /// Structured JSON lines
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Optional file to append logs to instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            level: "info".to_string(),
            file: None,
        }
    }
}
