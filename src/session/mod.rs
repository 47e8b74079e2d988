//! Session module - Conversation history and windowing
//!
//! This module provides the memory-resident conversation store used by the
//! turn runner:
//! - Append-only history of user text, assistant text, tool calls and tool results
//! - Approximate sizing of items (`chars / 4`, never below one unit)
//! - A budgeted, recency-biased window over the history
//! - Serialization of that window into the completion endpoint's input shape
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use turnkeep::session::{ConversationStore, InputItem};
//!
//! let mut store = ConversationStore::new(100);
//! store.add_tool_call("search", serde_json::Map::new());
//! store.add_tool_result("search", json!("42"), Some("c1"));
//!
//! // Tool calls stay in the history but are never sent.
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.to_model_input(), vec![InputItem::tool("search", "42")]);
//! ```

mod store;
pub mod types;

pub use store::{ConversationStore, DEFAULT_TOKEN_BUDGET};
pub use types::{render_value, ConversationItem, InputItem, ItemContent, ItemKind, ItemRole};
