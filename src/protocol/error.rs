use thiserror::Error;

use crate::markup::NodeId;

/// Failures reported by the protocol collaborators (graphics, thread)
#[derive(Debug, Clone, Error)]
pub enum ProtocolError {
    #[error("No screenshot available at {0}ms")]
    ScreenshotUnavailable(f64),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Protocol request failed: {0}")]
    Request(String),

    #[error("Protocol connection closed")]
    Closed,
}
