//! Comment composition and submission

use std::sync::Arc;

use super::model::{Comment, CommentId, NewComment, PendingComment, Position};
use super::persistence::{CommentError, CommentStore};
use super::state::CommentsAction;
use crate::protocol::ThreadFront;
use crate::store::{Canvas, Store};

/// Text buffer for one comment plus the save flow behind it
#[derive(Clone)]
pub struct CommentEditor {
    store: Store,
    thread: Arc<dyn ThreadFront>,
    comments: Arc<dyn CommentStore>,
    buffer: String,
}

impl CommentEditor {
    pub fn new(store: Store, thread: Arc<dyn ThreadFront>, comments: Arc<dyn CommentStore>) -> Self {
        Self {
            store,
            thread,
            comments,
            buffer: String::new(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Open a draft for a new root comment at the paused point, placed in the
    /// middle of the canvas. Returns false without a loaded recording.
    pub fn begin_comment(&mut self) -> bool {
        let (recording_id, time, canvas) = self.store.read(|s| {
            (
                s.app.recording_id.clone(),
                s.timeline.current_time,
                s.app.canvas,
            )
        });
        let Some(recording_id) = recording_id else {
            return false;
        };

        let draft = Comment {
            id: None,
            content: String::new(),
            recording_id,
            time,
            point: self.thread.current_point(),
            has_frames: self.thread.current_point_has_frames(),
            parent_id: None,
            position: canvas_center(canvas),
        };

        self.buffer.clear();
        self.store
            .dispatch(CommentsAction::SetPendingComment(Some(PendingComment::new(draft))));
        true
    }

    pub fn cancel(&mut self) {
        self.buffer.clear();
        self.store.dispatch(CommentsAction::clear_pending_comment());
    }

    /// Submit the buffer against `target`.
    ///
    /// A target with empty content is the draft of a new comment; anything
    /// else is replied to. Blank input is dropped and returns `Ok(None)`.
    pub async fn save(&mut self, target: &Comment) -> Result<Option<CommentId>, CommentError> {
        let content = self.buffer.trim().to_string();
        if content.is_empty() {
            return Ok(None);
        }

        let comment = if target.is_new() {
            self.new_comment(target, content)
        } else {
            self.reply(target, content)
        };

        let id = self.comments.add_comment(comment).await?;
        tracing::info!(comment_id = id.as_str(), "Comment saved");

        self.store.dispatch(CommentsAction::clear_pending_comment());
        self.buffer.clear();
        Ok(Some(id))
    }

    fn new_comment(&self, target: &Comment, content: String) -> NewComment {
        let position = self
            .store
            .read(|s| s.comments.pending_comment.as_ref().map(|p| p.position))
            .unwrap_or(target.position);

        NewComment {
            content,
            recording_id: target.recording_id.clone(),
            time: target.time,
            point: target.point.clone(),
            has_frames: target.has_frames,
            parent_id: target.parent_id.clone(),
            position,
        }
    }

    fn reply(&self, target: &Comment, content: String) -> NewComment {
        let (recording_id, time, canvas) = self.store.read(|s| {
            (
                s.app.recording_id.clone(),
                s.timeline.current_time,
                s.app.canvas,
            )
        });

        NewComment {
            content,
            recording_id: recording_id.unwrap_or_else(|| target.recording_id.clone()),
            time,
            point: self.thread.current_point(),
            has_frames: self.thread.current_point_has_frames(),
            parent_id: target.id.clone(),
            position: canvas_center(canvas),
        }
    }
}

fn canvas_center(canvas: Option<Canvas>) -> Position {
    canvas
        .map(|c| Position {
            x: c.width * 0.5,
            y: c.height * 0.5,
        })
        .unwrap_or_default()
}
