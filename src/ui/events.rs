use crate::auth::TokenState;
use crate::comments::CommentId;

/// Results of background work, delivered to the App loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A comment save finished; `None` means the input was blank
    CommentSaved(Result<Option<CommentId>, String>),

    /// The auth token changed (fetched, refreshed or failed)
    TokenChanged(TokenState),

    /// Show a message in the footer
    Status(String),

    /// Error occurred
    Error(String),

    /// Request to quit the application
    Quit,
}
