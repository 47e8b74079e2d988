//! In-memory conversation store with a budgeted history window.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::types::{render_value, ConversationItem, InputItem, ItemContent, ItemRole};

/// Default window budget, in approximate size units.
pub const DEFAULT_TOKEN_BUDGET: usize = 6000;

/// Append-only conversation history for one session.
///
/// The store owns every item of the conversation in insertion order and
/// exposes a recency-biased window that fits a size budget. It is not
/// synchronized: one in-flight turn per store, enforced by `&mut` access.
///
/// # Example
/// ```
/// use turnkeep::session::ConversationStore;
///
/// let mut store = ConversationStore::new(100);
/// store.add_user("hi");
/// store.add_assistant("hello there");
///
/// assert_eq!(store.window().len(), 2);
/// assert_eq!(store.to_model_input().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ConversationStore {
    items: Vec<ConversationItem>,
    token_budget: usize,
    conversation_id: Option<String>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BUDGET)
    }
}

impl ConversationStore {
    /// Create an empty store with the given window budget.
    ///
    /// The budget is a positive ceiling; zero is treated as one.
    pub fn new(token_budget: usize) -> Self {
        Self {
            items: Vec::new(),
            token_budget: token_budget.max(1),
            conversation_id: None,
        }
    }

    /// Append user text.
    pub fn add_user(&mut self, text: &str) {
        self.push(ItemRole::User, ItemContent::Text(text.to_string()));
    }

    /// Append assistant text.
    pub fn add_assistant(&mut self, text: &str) {
        self.push(ItemRole::Assistant, ItemContent::Text(text.to_string()));
    }

    /// Append a tool call requested by the model.
    pub fn add_tool_call(&mut self, name: &str, arguments: Map<String, Value>) {
        self.push(
            ItemRole::Assistant,
            ItemContent::ToolCall {
                tool_name: name.to_string(),
                arguments,
            },
        );
    }

    /// Append the outcome of a tool call.
    ///
    /// `call_id` should name an earlier tool call but is stored unchecked.
    pub fn add_tool_result(&mut self, name: &str, result: Value, call_id: Option<&str>) {
        self.push(
            ItemRole::Tool,
            ItemContent::ToolResult {
                tool_name: name.to_string(),
                result,
                call_id: call_id.map(str::to_string),
            },
        );
    }

    fn push(&mut self, role: ItemRole, content: ItemContent) {
        let item = ConversationItem::new(role, content);
        debug!(
            id = %item.id,
            role = %item.role,
            kind = %item.kind(),
            size = item.approx_size(),
            "Appending conversation item"
        );
        self.items.push(item);
    }

    /// Approximate size of an item in model-context units.
    pub fn approx_size(item: &ConversationItem) -> usize {
        item.approx_size()
    }

    /// The most recent contiguous run of items that fits the budget.
    ///
    /// Scans from the newest item backward and stops at the first item that
    /// does not fit. If the newest item alone exceeds the budget, the window
    /// is that single item, so a non-empty store never yields an empty window.
    ///
    /// # Example
    /// ```
    /// use turnkeep::session::ConversationStore;
    ///
    /// let mut store = ConversationStore::new(1);
    /// store.add_user("a very long text exceeding forty characters here");
    /// assert_eq!(store.window().len(), 1);
    /// ```
    pub fn window(&self) -> &[ConversationItem] {
        let mut remaining = self.token_budget;
        let mut start = self.items.len();

        for (idx, item) in self.items.iter().enumerate().rev() {
            let size = item.approx_size();
            if size > remaining {
                if start == self.items.len() {
                    start = idx;
                }
                break;
            }
            remaining -= size;
            start = idx;
        }

        &self.items[start..]
    }

    /// Serialize the current window into the completion endpoint's input shape.
    ///
    /// Text items map to `{role, content}`, tool results to
    /// `{role: "tool", content, name}`, and tool calls are left out.
    pub fn to_model_input(&self) -> Vec<InputItem> {
        self.window()
            .iter()
            .filter_map(|item| match &item.content {
                ItemContent::Text(text) => Some(InputItem::message(item.role, text)),
                ItemContent::ToolCall { .. } => None,
                ItemContent::ToolResult {
                    tool_name, result, ..
                } => Some(InputItem::tool(tool_name, &render_value(result))),
            })
            .collect()
    }

    /// Adopt a server-side conversation id if none is set yet.
    ///
    /// Returns `true` when the id was adopted. Later ids never overwrite
    /// the first one, and empty ids are ignored.
    pub fn adopt_conversation_id(&mut self, id: &str) -> bool {
        if self.conversation_id.is_some() || id.is_empty() {
            return false;
        }
        debug!(conversation_id = id, "Adopting conversation id");
        self.conversation_id = Some(id.to_string());
        true
    }

    /// The server-side conversation id, once adopted.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// The window budget.
    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[ConversationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The most recently appended item, if any.
    pub fn last(&self) -> Option<&ConversationItem> {
        self.items.last()
    }

    /// Sum of approximate sizes over the whole history.
    pub fn total_size(&self) -> usize {
        self.items.iter().map(ConversationItem::approx_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ItemKind;
    use serde_json::json;

    fn window_size(store: &ConversationStore) -> usize {
        store.window().iter().map(ConversationItem::approx_size).sum()
    }

    fn is_suffix(store: &ConversationStore) -> bool {
        let all = store.items();
        let window = store.window();
        all[all.len() - window.len()..]
            .iter()
            .zip(window)
            .all(|(a, b)| a.id == b.id)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = ConversationStore::new(10);
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.window().is_empty());
        assert!(store.to_model_input().is_empty());
        assert!(store.conversation_id().is_none());
        assert!(store.last().is_none());
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(ConversationStore::default().token_budget(), DEFAULT_TOKEN_BUDGET);
    }

    #[test]
    fn test_zero_budget_clamped() {
        assert_eq!(ConversationStore::new(0).token_budget(), 1);
    }

    #[test]
    fn test_append_order_preserved() {
        let mut store = ConversationStore::new(10_000);
        store.add_user("one");
        store.add_assistant("two");
        store.add_tool_call("search", Map::new());
        store.add_tool_result("search", json!("three"), Some("c1"));
        store.add_assistant("four");

        let kinds: Vec<ItemKind> = store.window().iter().map(|i| i.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ItemKind::Text,
                ItemKind::Text,
                ItemKind::ToolCall,
                ItemKind::ToolResult,
                ItemKind::Text,
            ]
        );
        assert_eq!(store.window().len(), store.len());
        assert_eq!(store.last().unwrap().content, ItemContent::Text("four".into()));
    }

    #[test]
    fn test_roles_assigned_by_add() {
        let mut store = ConversationStore::new(100);
        store.add_user("u");
        store.add_assistant("a");
        store.add_tool_call("t", Map::new());
        store.add_tool_result("t", json!(1), None);

        let roles: Vec<ItemRole> = store.items().iter().map(|i| i.role).collect();
        assert_eq!(
            roles,
            vec![
                ItemRole::User,
                ItemRole::Assistant,
                ItemRole::Assistant,
                ItemRole::Tool
            ]
        );
    }

    #[test]
    fn test_window_fits_all_with_large_budget() {
        let mut store = ConversationStore::new(100);
        store.add_user("hi");
        store.add_assistant("hello there");

        assert_eq!(store.window().len(), 2);
        assert_eq!(
            store.to_model_input(),
            vec![
                InputItem::message(ItemRole::User, "hi"),
                InputItem::message(ItemRole::Assistant, "hello there"),
            ]
        );
    }

    #[test]
    fn test_window_single_oversized_item() {
        let mut store = ConversationStore::new(1);
        store.add_user("a very long text exceeding forty characters here");

        let window = store.window();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].approx_size(), 12);
    }

    #[test]
    fn test_window_oversized_newest_drops_everything_older() {
        let mut store = ConversationStore::new(5);
        store.add_user("a");
        store.add_user("b");
        store.add_user(&"x".repeat(40));

        let window = store.window();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].content, ItemContent::Text("x".repeat(40)));
    }

    #[test]
    fn test_window_boundary_inclusive() {
        // Each item is exactly 2 units; budget 4 fits exactly two.
        let mut store = ConversationStore::new(4);
        store.add_user("aaaaaaaa");
        store.add_user("bbbbbbbb");
        store.add_user("cccccccc");

        let window = store.window();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, ItemContent::Text("bbbbbbbb".into()));
        assert_eq!(window_size(&store), 4);
    }

    #[test]
    fn test_window_stops_at_first_misfit() {
        // Sizes oldest→newest: 1, 10, 1, 1. Budget 5: the 10 blocks the older 1.
        let mut store = ConversationStore::new(5);
        store.add_user("a");
        store.add_user(&"z".repeat(40));
        store.add_user("b");
        store.add_user("c");

        let window = store.window();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, ItemContent::Text("b".into()));
        assert_eq!(window[1].content, ItemContent::Text("c".into()));
    }

    #[test]
    fn test_window_budget_respected_and_contiguous() {
        let lengths = [3, 17, 40, 2, 9, 64, 5, 12, 1, 30];
        for budget in 1..=40 {
            let mut store = ConversationStore::new(budget);
            for (i, len) in lengths.iter().enumerate() {
                let text = "w".repeat(*len);
                if i % 2 == 0 {
                    store.add_user(&text);
                } else {
                    store.add_assistant(&text);
                }

                let window = store.window();
                assert!(!window.is_empty(), "budget {budget}: empty window");
                assert!(is_suffix(&store), "budget {budget}: not a suffix");
                if window.len() > 1 || window[0].approx_size() <= budget {
                    assert!(
                        window_size(&store) <= budget,
                        "budget {budget}: window over budget"
                    );
                }
            }
        }
    }

    #[test]
    fn test_tool_call_omitted_from_input() {
        let mut store = ConversationStore::new(1000);
        let mut args = Map::new();
        args.insert("q".into(), json!("x"));
        store.add_tool_call("search", args);
        store.add_tool_result("search", json!("42"), Some("c1"));

        assert_eq!(store.window().len(), 2);
        assert_eq!(store.to_model_input(), vec![InputItem::tool("search", "42")]);

        let wire = serde_json::to_value(store.to_model_input()).unwrap();
        assert_eq!(
            wire,
            json!([{"role": "tool", "content": "42", "name": "search"}])
        );
    }

    #[test]
    fn test_tool_result_structured_value_stringified() {
        let mut store = ConversationStore::new(1000);
        store.add_tool_result("stats", json!({"count": 3}), None);

        let input = store.to_model_input();
        assert_eq!(input[0].content, r#"{"count":3}"#);
        assert_eq!(input[0].name.as_deref(), Some("stats"));
    }

    #[test]
    fn test_to_model_input_idempotent() {
        let mut store = ConversationStore::new(50);
        store.add_user("what is six times seven?");
        store.add_tool_call("calc", Map::new());
        store.add_tool_result("calc", json!(42), Some("c9"));
        store.add_assistant("42");

        assert_eq!(store.to_model_input(), store.to_model_input());
    }

    #[test]
    fn test_to_model_input_respects_window() {
        let mut store = ConversationStore::new(3);
        store.add_user("old message that will not fit");
        store.add_assistant("ok");
        store.add_user("yes");

        let input = store.to_model_input();
        assert_eq!(
            input,
            vec![
                InputItem::message(ItemRole::Assistant, "ok"),
                InputItem::message(ItemRole::User, "yes"),
            ]
        );
    }

    #[test]
    fn test_conversation_id_first_write_wins() {
        let mut store = ConversationStore::new(10);
        assert!(!store.adopt_conversation_id(""));
        assert!(store.conversation_id().is_none());

        assert!(store.adopt_conversation_id("conv_1"));
        assert!(!store.adopt_conversation_id("conv_2"));
        assert_eq!(store.conversation_id(), Some("conv_1"));
    }

    #[test]
    fn test_total_size() {
        let mut store = ConversationStore::new(1);
        store.add_user("aaaaaaaa");
        store.add_user("b");
        assert_eq!(store.total_size(), 3);
    }
}
