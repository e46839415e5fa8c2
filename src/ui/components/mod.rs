mod comment_box;
mod footer;
mod help_overlay;
mod loading;
mod markup_view;
pub mod theme;
mod timeline_bar;

pub use comment_box::{CommentBox, COMMENT_BOX_HEIGHT};
pub use footer::{Footer, FooterContext};
pub use help_overlay::{keybinding_entries, HelpOverlay, KeybindingEntry};
pub use loading::{loading_message, LoadingProgress, LoadingSkeleton, BUMP_INTERVAL, FINISH_DELAY};
pub use markup_view::{select_relative, visible_node_ids, MarkupHit, MarkupView, MarkupViewState};
pub use timeline_bar::{format_time, time_at_column, track_area, TimelineBar};
