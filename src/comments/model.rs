use serde::{Deserialize, Serialize};

use crate::protocol::{ExecutionPoint, RecordingId};

/// Identifier assigned by the persistence service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Position on the viewer canvas, in screenshot pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A comment as shown in the UI. `id` is `None` until it is persisted; an
/// empty `content` marks the draft for a new root comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<CommentId>,
    pub content: String,
    pub recording_id: RecordingId,
    pub time: f64,
    pub point: ExecutionPoint,
    pub has_frames: bool,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub position: Position,
}

impl Comment {
    pub fn is_new(&self) -> bool {
        self.content.is_empty()
    }
}

/// Draft created when the user clicks on the canvas; holds where it goes
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComment {
    pub comment: Comment,
    pub position: Position,
}

impl PendingComment {
    pub fn new(comment: Comment) -> Self {
        let position = comment.position;
        Self { comment, position }
    }
}

/// Payload sent to the persistence service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    pub content: String,
    pub recording_id: RecordingId,
    pub time: f64,
    pub point: ExecutionPoint,
    pub has_frames: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub position: Position,
}
