//! Agent module - Turn orchestration
//!
//! A turn takes the user's input, asks the completion provider for a reply
//! given the store's window, runs any tools the model asked for, and records
//! what happened in the [`ConversationStore`](crate::session::ConversationStore).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌─────────────┐     ┌────────────────────┐
//! │ ConversationStore│<───>│ TurnRunner  │────>│ CompletionProvider │
//! │ (window, input)  │     │             │     │ (Responses API)    │
//! └──────────────────┘     └─────────────┘     └────────────────────┘
//!                                 │
//!                                 ▼
//!                          ┌─────────────┐
//!                          │    Tools    │
//!                          │  Registry   │
//!                          └─────────────┘
//! ```
//!
//! Tool calls are one hop deep: each call in the initial response is executed
//! and followed by a single continuation request chained to that response.

mod runner;

pub use runner::{TurnRunner, TurnSettings};
