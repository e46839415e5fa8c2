//! DOM inspector: node store, render model and controller

pub mod controller;
pub mod node;
pub mod render;
pub mod state;

pub use controller::MarkupController;
pub use node::{Attribute, EventListener, NodeId, NodeRecord, NodeType};
pub use render::{
    render_node, render_tree, LineKind, MarkupLine, NodeContent, RenderOptions, RenderedNode,
};
pub use state::{EventTooltip, MarkupAction, MarkupEvent, MarkupState};
