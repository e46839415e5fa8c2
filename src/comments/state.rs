use super::model::{CommentId, PendingComment};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentsState {
    /// The canvas cursor is in "place a comment" mode
    pub comment_pointer: bool,
    pub hovered_comment: Option<CommentId>,
    pub pending_comment: Option<PendingComment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentsAction {
    SetPendingComment(Option<PendingComment>),
    SetCommentPointer(bool),
    SetHoveredComment(Option<CommentId>),
}

impl CommentsAction {
    pub fn clear_pending_comment() -> Self {
        CommentsAction::SetPendingComment(None)
    }
}

impl CommentsState {
    pub fn reduce(&mut self, action: CommentsAction) {
        match action {
            CommentsAction::SetPendingComment(comment) => self.pending_comment = comment,
            CommentsAction::SetCommentPointer(value) => self.comment_pointer = value,
            CommentsAction::SetHoveredComment(comment) => self.hovered_comment = comment,
        }
    }
}
