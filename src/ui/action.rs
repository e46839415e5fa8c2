//! Actions that can be triggered by keybindings
//!
//! Each action is a single user intent. The App maps it to a controller
//! call; the controller turns it into store dispatches.

use serde::{Deserialize, Serialize};

/// All mappable UI actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // ========== Global ==========
    Quit,
    ShowHelp,
    Cancel,

    // ========== Inspector ==========
    SelectNext,
    SelectPrev,
    SelectPageDown,
    SelectPageUp,
    Expand,
    Collapse,
    /// Fetch listener details for the selected node's event badge
    ShowEventListeners,
    ToggleWhitespace,

    // ========== Timeline ==========
    TogglePlayback,
    NextPaint,
    PrevPaint,
    ReplayPlayback,
    ZoomIn,
    ResetZoom,

    // ========== Comments ==========
    StartComment,
    SubmitComment,
    Backspace,
}

impl Action {
    /// Get a human-readable description of the action
    pub fn description(&self) -> &'static str {
        match self {
            Action::Quit => "Quit",
            Action::ShowHelp => "Show help",
            Action::Cancel => "Cancel",

            Action::SelectNext => "Select next node",
            Action::SelectPrev => "Select previous node",
            Action::SelectPageDown => "Page down",
            Action::SelectPageUp => "Page up",
            Action::Expand => "Expand node",
            Action::Collapse => "Collapse node",
            Action::ShowEventListeners => "Show event listeners",
            Action::ToggleWhitespace => "Toggle whitespace nodes",

            Action::TogglePlayback => "Play/pause",
            Action::NextPaint => "Next paint",
            Action::PrevPaint => "Previous paint",
            Action::ReplayPlayback => "Replay",
            Action::ZoomIn => "Zoom in around playhead",
            Action::ResetZoom => "Reset zoom",

            Action::StartComment => "Comment at current time",
            Action::SubmitComment => "Save comment",
            Action::Backspace => "Backspace",
        }
    }

    /// Parse an action name as written in the `[keys]` config section
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "quit" | "q" => Action::Quit,
            "show_help" | "help" => Action::ShowHelp,
            "cancel" => Action::Cancel,
            "select_next" => Action::SelectNext,
            "select_prev" => Action::SelectPrev,
            "select_page_down" => Action::SelectPageDown,
            "select_page_up" => Action::SelectPageUp,
            "expand" => Action::Expand,
            "collapse" => Action::Collapse,
            "show_event_listeners" => Action::ShowEventListeners,
            "toggle_whitespace" => Action::ToggleWhitespace,
            "toggle_playback" => Action::TogglePlayback,
            "next_paint" => Action::NextPaint,
            "prev_paint" => Action::PrevPaint,
            "replay_playback" | "replay" => Action::ReplayPlayback,
            "zoom_in" => Action::ZoomIn,
            "reset_zoom" => Action::ResetZoom,
            "start_comment" => Action::StartComment,
            "submit_comment" => Action::SubmitComment,
            "backspace" => Action::Backspace,
            _ => return None,
        };
        Some(action)
    }
}
