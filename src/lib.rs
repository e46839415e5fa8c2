pub mod auth;
pub mod comments;
pub mod config;
pub mod markup;
pub mod protocol;
pub mod recording;
pub mod session;
pub mod store;
pub mod timeline;
pub mod ui;
pub mod util;

pub use auth::{AuthClient, AuthConfig, StaticTokenClient, TokenManager, TokenState};
pub use comments::{CommentEditor, CommentStore, GraphqlCommentStore, MemoryCommentStore};
pub use config::Config;
pub use markup::{render_tree, MarkupController, MarkupState, NodeId, NodeRecord, RenderOptions};
pub use recording::{LocalRecording, RecordingFixture};
pub use session::DevtoolsSession;
pub use store::{Store, UiState};
pub use timeline::{PlaybackConfig, Timeline, ZoomRegion};
pub use ui::App;
