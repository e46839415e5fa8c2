use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a node in the markup store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// DOM node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Element,
    Text,
    Comment,
    DocumentType,
    Document,
    Other,
}

impl NodeType {
    /// Map a DOM `nodeType` constant
    pub fn from_dom_constant(value: u16) -> Self {
        match value {
            1 => NodeType::Element,
            3 => NodeType::Text,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            10 => NodeType::DocumentType,
            _ => NodeType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A listener attached to a node, shown in the event tooltip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListener {
    pub event_type: String,
    #[serde(default)]
    pub capture: bool,
    /// Handler source location, e.g. `app.js:12:4`
    #[serde(default)]
    pub handler: Option<String>,
}

impl EventListener {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            capture: false,
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }
}

fn default_true() -> bool {
    true
}

/// One node of the markup tree.
///
/// Children are stored as ids; the records live in the store's map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub node_type: NodeType,
    pub display_name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default = "default_true")]
    pub is_displayed: bool,
    #[serde(default)]
    pub is_inline_text_child: bool,
    #[serde(default)]
    pub has_event_listeners: bool,
    #[serde(default)]
    pub pseudo_type: Option<String>,
}

impl NodeRecord {
    fn base(id: NodeId, node_type: NodeType, display_name: String) -> Self {
        Self {
            id,
            node_type,
            display_name,
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
            parent_id: None,
            has_children: false,
            is_expanded: false,
            is_displayed: true,
            is_inline_text_child: false,
            has_event_listeners: false,
            pseudo_type: None,
        }
    }

    pub fn document(id: impl Into<NodeId>) -> Self {
        Self::base(id.into(), NodeType::Document, "#document".to_string())
    }

    pub fn element(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self::base(id.into(), NodeType::Element, name.into())
    }

    pub fn text(id: impl Into<NodeId>, value: impl Into<String>) -> Self {
        let mut node = Self::base(id.into(), NodeType::Text, "#text".to_string());
        node.value = Some(value.into());
        node
    }

    pub fn comment(id: impl Into<NodeId>, value: impl Into<String>) -> Self {
        let mut node = Self::base(id.into(), NodeType::Comment, "#comment".to_string());
        node.value = Some(value.into());
        node
    }

    pub fn doctype(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self::base(id.into(), NodeType::DocumentType, name.into())
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Attach under `parent`; the parent's child list is filled in when the
    /// tree is loaded
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_event_listeners(mut self) -> Self {
        self.has_event_listeners = true;
        self
    }

    pub fn expanded(mut self) -> Self {
        self.is_expanded = true;
        self
    }

    pub fn inline_text(mut self) -> Self {
        self.is_inline_text_child = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_displayed = false;
        self
    }

    pub fn with_pseudo_type(mut self, pseudo: impl Into<String>) -> Self {
        self.pseudo_type = Some(pseudo.into());
        self
    }

    /// Expandable iff it has children and they are not rendered inline
    pub fn can_expand(&self) -> bool {
        self.has_children && !self.is_inline_text_child
    }

    /// Text node whose value contains nothing but whitespace
    pub fn is_whitespace_text(&self) -> bool {
        self.node_type == NodeType::Text
            && self
                .value
                .as_deref()
                .map_or(true, |v| v.chars().all(char::is_whitespace))
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
