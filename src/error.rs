//! Error types for Turnkeep
//!
//! This module defines the error types used throughout the crate.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use thiserror::Error;

// ============================================================================
// Provider Error Classification
// ============================================================================

/// Structured completion-provider error classification.
///
/// Maps HTTP failures from the completion endpoint onto a small set of
/// categories so callers can decide what to do without string matching.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// 401/403: key rejected
    #[error("Authentication error: {0}")]
    Auth(String),
    /// 429
    #[error("Rate limit error: {0}")]
    RateLimit(String),
    /// 402
    #[error("Billing error: {0}")]
    Billing(String),
    /// 5xx
    #[error("Server error: {0}")]
    ServerError(String),
    /// 400: the endpoint refused the request body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// 404: unknown model or endpoint
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    /// Any other status
    #[error("Unknown provider error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Returns `true` if the failure is transient.
    ///
    /// Nothing in this crate retries; the flag is exposed for callers that
    /// wrap `run_turn` in their own retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimit(_) | ProviderError::ServerError(_)
        )
    }

    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Auth(_) => Some(401),
            ProviderError::RateLimit(_) => Some(429),
            ProviderError::Billing(_) => Some(402),
            ProviderError::ServerError(_) => Some(500),
            ProviderError::InvalidRequest(_) => Some(400),
            ProviderError::ModelNotFound(_) => Some(404),
            ProviderError::Unknown(_) => None,
        }
    }
}

// ============================================================================
// Tool Errors
// ============================================================================

/// Failure raised while resolving or running a registered tool.
///
/// The turn runner never propagates these; it renders them into the
/// tool result text that is shown to the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// No tool is registered under the requested name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The model supplied arguments the tool cannot use
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed
    #[error("{0}")]
    Execution(String),
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for Turnkeep operations.
#[derive(Error, Debug)]
pub enum TurnError {
    /// Configuration-related errors (invalid config, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider errors that are not tied to an HTTP status (transport, decoding)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Structured provider error with status classification.
    #[error("Provider error: {0}")]
    ProviderTyped(#[from] ProviderError),

    /// Tool resolution or execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for Turnkeep operations.
pub type Result<T> = std::result::Result<T, TurnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TurnError::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let turn_err: TurnError = io_err.into();
        assert!(matches!(turn_err, TurnError::Io(_)));
    }

    #[test]
    fn test_server_side_failures_are_retryable() {
        let retryable: Vec<bool> = [
            ProviderError::RateLimit(String::new()),
            ProviderError::ServerError(String::new()),
            ProviderError::Auth(String::new()),
            ProviderError::InvalidRequest(String::new()),
            ProviderError::Unknown(String::new()),
        ]
        .iter()
        .map(ProviderError::is_retryable)
        .collect();
        assert_eq!(retryable, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_provider_typed_display() {
        let err: TurnError = ProviderError::Auth("invalid key".into()).into();
        assert_eq!(
            err.to_string(),
            "Provider error: Authentication error: invalid key"
        );
    }

    #[test]
    fn test_tool_error_display() {
        assert_eq!(
            ToolError::UnknownTool("search".into()).to_string(),
            "Unknown tool: search"
        );
        assert_eq!(
            ToolError::InvalidArguments("missing q".into()).to_string(),
            "Invalid arguments: missing q"
        );
        assert_eq!(ToolError::Execution("boom".into()).to_string(), "boom");

        let err: TurnError = ToolError::Execution("boom".into()).into();
        assert_eq!(err.to_string(), "Tool error: boom");
    }
}
