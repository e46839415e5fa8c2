//! Nested render model of the markup tree
//!
//! `render_node` mirrors the structure of the tree: one [`RenderedNode`] per
//! visible node, its rendered children nested inside. The terminal widget
//! flattens this into rows with [`RenderedNode::lines`].

use super::node::{Attribute, NodeId, NodeRecord, NodeType};
use super::state::MarkupState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render text nodes that contain only whitespace
    pub show_whitespace_nodes: bool,
}

/// What a row shows for its node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Element {
        name: String,
        attributes: Vec<Attribute>,
        /// Text rendered between the tags on the same line
        inline_text: Option<String>,
    },
    Text(String),
    Comment(String),
    ReadOnly {
        display_name: String,
        is_doctype: bool,
        is_pseudo: bool,
    },
}

impl NodeContent {
    fn from_node(state: &MarkupState, node: &NodeRecord) -> Self {
        match node.node_type {
            NodeType::Element if node.pseudo_type.is_none() => {
                let inline_text = if node.is_inline_text_child {
                    node.children
                        .first()
                        .and_then(|id| state.node(id))
                        .and_then(|child| child.value.clone())
                } else {
                    None
                };
                NodeContent::Element {
                    name: node.display_name.clone(),
                    attributes: node.attributes.clone(),
                    inline_text,
                }
            }
            NodeType::Text => NodeContent::Text(node.value.clone().unwrap_or_default()),
            NodeType::Comment => NodeContent::Comment(node.value.clone().unwrap_or_default()),
            NodeType::Element
            | NodeType::DocumentType
            | NodeType::Document
            | NodeType::Other => NodeContent::ReadOnly {
                display_name: node.display_name.clone(),
                is_doctype: node.node_type == NodeType::DocumentType,
                is_pseudo: node.pseudo_type.is_some(),
            },
        }
    }

    /// Plain-text form of the row, used by the widget and by `dump`
    pub fn to_markup(&self) -> String {
        match self {
            NodeContent::Element {
                name,
                attributes,
                inline_text,
            } => {
                let mut out = format!("<{name}");
                for attr in attributes {
                    out.push_str(&format!(" {}=\"{}\"", attr.name, attr.value));
                }
                out.push('>');
                if let Some(text) = inline_text {
                    out.push_str(text.trim());
                    out.push_str(&format!("</{name}>"));
                }
                out
            }
            NodeContent::Text(value) => value.trim().to_string(),
            NodeContent::Comment(value) => format!("<!--{value}-->"),
            NodeContent::ReadOnly {
                display_name,
                is_doctype,
                is_pseudo,
            } => {
                if *is_doctype {
                    format!("<!DOCTYPE {display_name}>")
                } else if *is_pseudo {
                    format!("::{}", display_name.trim_start_matches(':'))
                } else {
                    display_name.clone()
                }
            }
        }
    }
}

/// A rendered node and its rendered children
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    pub id: NodeId,
    pub depth: usize,
    pub content: NodeContent,
    pub is_selected: bool,
    pub is_hovered: bool,
    pub is_scroll_target: bool,
    pub is_expanded: bool,
    /// Collapsed styling: not expanded, or children shown inline
    pub is_collapsed: bool,
    pub is_displayed: bool,
    pub show_expander: bool,
    pub has_event_badge: bool,
    pub children: Vec<RenderedNode>,
    /// Closing tag line for expandable nodes
    pub closing_tag: Option<String>,
}

/// Which part of a node a flattened line shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Open,
    Close,
}

/// One flattened row of the markup panel
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupLine<'a> {
    pub node: &'a RenderedNode,
    pub kind: LineKind,
}

impl MarkupLine<'_> {
    pub fn text(&self) -> String {
        match self.kind {
            LineKind::Open => self.node.content.to_markup(),
            LineKind::Close => self.node.closing_tag.clone().unwrap_or_default(),
        }
    }
}

impl RenderedNode {
    /// Flatten into rows: the node, its children, then its closing tag
    pub fn lines(&self) -> Vec<MarkupLine<'_>> {
        let mut out = Vec::new();
        self.push_lines(&mut out);
        out
    }

    fn push_lines<'a>(&'a self, out: &mut Vec<MarkupLine<'a>>) {
        out.push(MarkupLine {
            node: self,
            kind: LineKind::Open,
        });
        for child in &self.children {
            child.push_lines(out);
        }
        if self.closing_tag.is_some() {
            out.push(MarkupLine {
                node: self,
                kind: LineKind::Close,
            });
        }
    }
}

/// Render one node and, if it is expanded, its children.
///
/// Returns `None` for unknown ids and for whitespace-only text nodes unless
/// `show_whitespace_nodes` is set.
pub fn render_node(
    state: &MarkupState,
    id: &NodeId,
    options: RenderOptions,
    depth: usize,
) -> Option<RenderedNode> {
    let node = state.node(id)?;

    if node.is_whitespace_text() && !options.show_whitespace_nodes {
        return None;
    }

    let can_expand = node.can_expand();
    let show_expander = can_expand && node.parent_id.as_ref() != state.root_node_id();

    let children = if can_expand && node.is_expanded {
        node.children
            .iter()
            .filter_map(|child| render_node(state, child, options, depth + 1))
            .collect()
    } else {
        Vec::new()
    };

    let closing_tag = can_expand.then(|| format!("</{}>", node.display_name));

    Some(RenderedNode {
        id: node.id.clone(),
        depth,
        content: NodeContent::from_node(state, node),
        is_selected: state.selected_node_id() == Some(&node.id),
        is_hovered: state.hovered_node_id() == Some(&node.id),
        is_scroll_target: state.scroll_into_view_node_id() == Some(&node.id),
        is_expanded: node.is_expanded,
        is_collapsed: !node.is_expanded || node.is_inline_text_child,
        is_displayed: node.is_displayed,
        show_expander,
        has_event_badge: node.has_event_listeners,
        children,
        closing_tag,
    })
}

/// Render the children of the document root, the top level of the panel
pub fn render_tree(state: &MarkupState, options: RenderOptions) -> Vec<RenderedNode> {
    let Some(root) = state.root_node() else {
        return Vec::new();
    };
    root.children
        .iter()
        .filter_map(|id| render_node(state, id, options, 0))
        .collect()
}
