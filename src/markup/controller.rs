//! User intents on the markup panel

use std::sync::Arc;

use super::node::NodeId;
use super::state::{EventTooltip, MarkupAction, MarkupEvent};
use crate::protocol::ThreadFront;
use crate::store::Store;

#[derive(Clone)]
pub struct MarkupController {
    store: Store,
    thread: Arc<dyn ThreadFront>,
}

impl MarkupController {
    pub fn new(store: Store, thread: Arc<dyn ThreadFront>) -> Self {
        Self { store, thread }
    }

    /// Apply a mutation pushed by the protocol layer
    pub fn apply_event(&self, event: MarkupEvent) {
        self.store.dispatch(MarkupAction::Protocol(event));
    }

    /// Select a node from the tree. Returns false (and dispatches nothing)
    /// when it is already selected.
    pub fn select_node(&self, id: &NodeId) -> bool {
        let already = self
            .store
            .read(|s| s.markup.selected_node_id() == Some(id));
        if already {
            return false;
        }

        self.store.dispatch(MarkupAction::SelectNode {
            id: Some(id.clone()),
            scroll_into_view: false,
        });
        true
    }

    /// Select a node from outside the tree (search, picker) and reveal it
    pub fn reveal_node(&self, id: &NodeId) {
        self.store.dispatch(MarkupAction::SelectNode {
            id: Some(id.clone()),
            scroll_into_view: true,
        });
    }

    /// Expander click: `is_expanded` is the state the row was drawn with
    pub fn toggle_node_expanded(&self, id: &NodeId, is_expanded: bool) {
        self.store.dispatch(MarkupAction::SetNodeExpanded {
            id: id.clone(),
            expanded: !is_expanded,
        });
    }

    pub fn mouse_enter_node(&self, id: &NodeId) {
        self.store.dispatch(MarkupAction::HoverNode(Some(id.clone())));
    }

    pub fn mouse_leave_node(&self, id: &NodeId) {
        let hovered = self
            .store
            .read(|s| s.markup.hovered_node_id() == Some(id));
        if hovered {
            self.store.dispatch(MarkupAction::HoverNode(None));
        }
    }

    /// Fetch listener details behind an event badge. The tooltip is dropped
    /// if the node disappeared while the request was in flight.
    pub async fn show_event_tooltip(&self, id: &NodeId) {
        let listeners = match self.thread.event_listeners(id).await {
            Ok(listeners) => listeners,
            Err(e) => {
                tracing::debug!(node = %id, error = %e, "Failed to load event listeners");
                return;
            }
        };

        let still_present = self.store.read(|s| s.markup.node(id).is_some());
        if !still_present {
            return;
        }

        self.store
            .dispatch(MarkupAction::SetEventTooltip(Some(EventTooltip {
                node_id: id.clone(),
                listeners,
            })));
    }

    pub fn hide_event_tooltip(&self) {
        self.store.dispatch(MarkupAction::SetEventTooltip(None));
    }

    /// The row was scrolled into view; stop asking for it
    pub fn clear_scroll_into_view(&self) {
        self.store.dispatch(MarkupAction::SetScrollIntoView(None));
    }
}
