//! Recording comments

pub mod editor;
pub mod model;
pub mod persistence;
pub mod state;

pub use editor::CommentEditor;
pub use model::{Comment, CommentId, NewComment, PendingComment, Position};
pub use persistence::{CommentError, CommentStore, GraphqlCommentStore, MemoryCommentStore};
pub use state::{CommentsAction, CommentsState};
