//! Normalized markup store and its reducer

use std::collections::HashMap;

use super::node::{Attribute, EventListener, NodeId, NodeRecord};

/// Mutations pushed by the protocol layer
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent {
    /// A new document was loaded; everything else is discarded
    Reset { root: NodeRecord },
    /// The full child list of `parent` is now known
    ChildrenLoaded {
        parent: NodeId,
        children: Vec<NodeRecord>,
    },
    NodeRemoved { id: NodeId },
    AttributesChanged {
        id: NodeId,
        attributes: Vec<Attribute>,
    },
    TextChanged { id: NodeId, value: String },
    ListenersChanged { id: NodeId, has_event_listeners: bool },
}

/// Listener details fetched for the event badge
#[derive(Debug, Clone, PartialEq)]
pub struct EventTooltip {
    pub node_id: NodeId,
    pub listeners: Vec<EventListener>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupAction {
    Protocol(MarkupEvent),
    SelectNode {
        id: Option<NodeId>,
        scroll_into_view: bool,
    },
    SetNodeExpanded { id: NodeId, expanded: bool },
    HoverNode(Option<NodeId>),
    SetScrollIntoView(Option<NodeId>),
    SetEventTooltip(Option<EventTooltip>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupState {
    tree: HashMap<NodeId, NodeRecord>,
    root_node: Option<NodeId>,
    selected_node: Option<NodeId>,
    hovered_node: Option<NodeId>,
    scroll_into_view_node: Option<NodeId>,
    event_tooltip: Option<EventTooltip>,
}

impl MarkupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.tree.get(id)
    }

    pub fn root_node_id(&self) -> Option<&NodeId> {
        self.root_node.as_ref()
    }

    pub fn root_node(&self) -> Option<&NodeRecord> {
        self.root_node.as_ref().and_then(|id| self.tree.get(id))
    }

    pub fn selected_node_id(&self) -> Option<&NodeId> {
        self.selected_node.as_ref()
    }

    pub fn hovered_node_id(&self) -> Option<&NodeId> {
        self.hovered_node.as_ref()
    }

    pub fn scroll_into_view_node_id(&self) -> Option<&NodeId> {
        self.scroll_into_view_node.as_ref()
    }

    pub fn event_tooltip(&self) -> Option<&EventTooltip> {
        self.event_tooltip.as_ref()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// True until the root has at least one child to show
    pub fn is_markup_empty(&self) -> bool {
        self.root_node().map_or(true, |root| root.children.is_empty())
    }

    pub fn reduce(&mut self, action: MarkupAction) {
        match action {
            MarkupAction::Protocol(event) => self.apply_event(event),
            MarkupAction::SelectNode {
                id,
                scroll_into_view,
            } => {
                if scroll_into_view {
                    if let Some(id) = &id {
                        self.expand_ancestors(id);
                    }
                    self.scroll_into_view_node = id.clone();
                }
                self.selected_node = id;
            }
            MarkupAction::SetNodeExpanded { id, expanded } => {
                if let Some(node) = self.tree.get_mut(&id) {
                    node.is_expanded = expanded;
                }
            }
            MarkupAction::HoverNode(id) => self.hovered_node = id,
            MarkupAction::SetScrollIntoView(id) => self.scroll_into_view_node = id,
            MarkupAction::SetEventTooltip(tooltip) => self.event_tooltip = tooltip,
        }
    }

    fn apply_event(&mut self, event: MarkupEvent) {
        match event {
            MarkupEvent::Reset { root } => {
                self.tree.clear();
                self.selected_node = None;
                self.hovered_node = None;
                self.scroll_into_view_node = None;
                self.event_tooltip = None;
                self.root_node = Some(root.id.clone());
                self.tree.insert(root.id.clone(), root);
            }
            MarkupEvent::ChildrenLoaded { parent, children } => {
                self.load_children(&parent, children);
            }
            MarkupEvent::NodeRemoved { id } => {
                if let Some(parent_id) = self.tree.get(&id).and_then(|n| n.parent_id.clone()) {
                    if let Some(parent) = self.tree.get_mut(&parent_id) {
                        parent.children.retain(|child| child != &id);
                        parent.has_children = !parent.children.is_empty();
                    }
                }
                self.remove_subtree(&id);
            }
            MarkupEvent::AttributesChanged { id, attributes } => {
                if let Some(node) = self.tree.get_mut(&id) {
                    node.attributes = attributes;
                }
            }
            MarkupEvent::TextChanged { id, value } => {
                if let Some(node) = self.tree.get_mut(&id) {
                    node.value = Some(value);
                }
            }
            MarkupEvent::ListenersChanged {
                id,
                has_event_listeners,
            } => {
                if let Some(node) = self.tree.get_mut(&id) {
                    node.has_event_listeners = has_event_listeners;
                }
            }
        }
    }

    fn load_children(&mut self, parent_id: &NodeId, children: Vec<NodeRecord>) {
        let Some(parent) = self.tree.get(parent_id) else {
            tracing::debug!(parent = %parent_id, "Children loaded for unknown node");
            return;
        };

        let new_ids: Vec<NodeId> = children.iter().map(|c| c.id.clone()).collect();
        let stale: Vec<NodeId> = parent
            .children
            .iter()
            .filter(|id| !new_ids.contains(id))
            .cloned()
            .collect();
        for id in &stale {
            self.remove_subtree(id);
        }

        for mut child in children {
            child.parent_id = Some(parent_id.clone());
            if let Some(existing) = self.tree.get(&child.id) {
                // Keep what we already know below this node
                child.children = existing.children.clone();
                child.is_expanded = existing.is_expanded;
                child.has_children = child.has_children || !child.children.is_empty();
            }
            self.tree.insert(child.id.clone(), child);
        }

        if let Some(parent) = self.tree.get_mut(parent_id) {
            parent.has_children = !new_ids.is_empty();
            parent.children = new_ids;
        }
    }

    fn remove_subtree(&mut self, id: &NodeId) {
        let mut pending = vec![id.clone()];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.tree.remove(&next) {
                pending.extend(node.children);
            }
            if self.selected_node.as_ref() == Some(&next) {
                self.selected_node = None;
            }
            if self.hovered_node.as_ref() == Some(&next) {
                self.hovered_node = None;
            }
            if self.scroll_into_view_node.as_ref() == Some(&next) {
                self.scroll_into_view_node = None;
            }
            if self.event_tooltip.as_ref().map(|t| &t.node_id) == Some(&next) {
                self.event_tooltip = None;
            }
            if self.root_node.as_ref() == Some(&next) {
                self.root_node = None;
            }
        }
    }

    fn expand_ancestors(&mut self, id: &NodeId) {
        let mut current = self.tree.get(id).and_then(|n| n.parent_id.clone());
        while let Some(parent_id) = current {
            match self.tree.get_mut(&parent_id) {
                Some(parent) => {
                    parent.is_expanded = true;
                    current = parent.parent_id.clone();
                }
                None => break,
            }
        }
    }
}
