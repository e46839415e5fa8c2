//! Default keybindings, used when the config file does not override them

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};

use super::keys::{KeyCombo, KeyContext, KeybindingConfig};
use crate::ui::action::Action;

fn bind(map: &mut HashMap<KeyCombo, Action>, key: &str, action: Action) {
    if let Ok(combo) = key.parse() {
        map.insert(combo, action);
    }
}

pub fn default_keybindings() -> KeybindingConfig {
    let mut config = KeybindingConfig::new();

    bind(&mut config.global, "C-c", Action::Quit);
    bind(&mut config.global, "<Esc>", Action::Cancel);

    // ========== Inspector ==========
    let inspector = config.context.entry(KeyContext::Inspector).or_default();
    bind(inspector, "q", Action::Quit);
    bind(inspector, "?", Action::ShowHelp);

    bind(inspector, "j", Action::SelectNext);
    bind(inspector, "k", Action::SelectPrev);
    bind(inspector, "<Down>", Action::SelectNext);
    bind(inspector, "<Up>", Action::SelectPrev);
    bind(inspector, "<PageDown>", Action::SelectPageDown);
    bind(inspector, "<PageUp>", Action::SelectPageUp);
    bind(inspector, "l", Action::Expand);
    bind(inspector, "<CR>", Action::Expand);
    bind(inspector, "<Right>", Action::Expand);
    bind(inspector, "h", Action::Collapse);
    bind(inspector, "<Left>", Action::Collapse);
    bind(inspector, "e", Action::ShowEventListeners);
    bind(inspector, "w", Action::ToggleWhitespace);

    bind(inspector, "<Space>", Action::TogglePlayback);
    bind(inspector, ".", Action::NextPaint);
    bind(inspector, ",", Action::PrevPaint);
    bind(inspector, "r", Action::ReplayPlayback);
    bind(inspector, "+", Action::ZoomIn);
    bind(inspector, "0", Action::ResetZoom);

    bind(inspector, "c", Action::StartComment);

    // ========== Comment editor ==========
    let editor = config.context.entry(KeyContext::CommentEditor).or_default();
    bind(editor, "<CR>", Action::SubmitComment);
    bind(editor, "<BS>", Action::Backspace);
    editor.insert(
        KeyCombo::new(KeyCode::Char('h'), KeyModifiers::CONTROL),
        Action::Backspace,
    );

    config
}
