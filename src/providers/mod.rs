//! Providers module - Completion endpoint boundary
//!
//! This module defines the `CompletionProvider` trait and the request and
//! response types exchanged with a completion endpoint. The bundled
//! implementation talks to OpenAI's Responses API; tests and embedders can
//! supply their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use turnkeep::providers::{CompletionProvider, OpenAIResponsesProvider};
//!
//! async fn example(request: turnkeep::providers::CompletionRequest) {
//!     let provider = OpenAIResponsesProvider::new("your-api-key");
//!     let response = provider.create(request).await.unwrap();
//!     println!("{} output items", response.output.len());
//! }
//! ```

pub mod openai;
mod types;

use crate::error::ProviderError;

pub use openai::OpenAIResponsesProvider;
pub use types::{
    CompletionProvider, CompletionRequest, CompletionResponse, ContentSegment, OutputItem,
    ToolChoice, ToolDefinition,
};

/// Classify a failed HTTP exchange by status code.
///
/// `body` is the provider's error detail; it is kept verbatim except for
/// unmapped statuses, which also carry the code.
pub fn parse_provider_error(status: u16, body: &str) -> ProviderError {
    let detail = body.to_string();
    match status {
        400 => ProviderError::InvalidRequest(detail),
        401 | 403 => ProviderError::Auth(detail),
        402 => ProviderError::Billing(detail),
        404 => ProviderError::ModelNotFound(detail),
        429 => ProviderError::RateLimit(detail),
        s if (500..600).contains(&s) => ProviderError::ServerError(detail),
        s => ProviderError::Unknown(format!("HTTP {}: {}", s, body)),
    }
}
