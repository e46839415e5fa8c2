//! Shared UI color constants.

use ratatui::style::Color;

pub const SELECTED_BG: Color = Color::Rgb(40, 60, 80);
pub const HOVERED_BG: Color = Color::Rgb(30, 36, 44);

pub const STATUS_BAR_BG: Color = Color::Rgb(30, 30, 30);
pub const FOOTER_BG: Color = Color::Rgb(25, 25, 25);
pub const KEY_HINT_BG: Color = Color::Rgb(60, 60, 60);

pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);
pub const TEXT_MUTED: Color = Color::Rgb(120, 120, 120);
pub const TEXT_FAINT: Color = Color::Rgb(80, 80, 80);

pub const ACCENT_PRIMARY: Color = Color::Rgb(97, 175, 239);
pub const ACCENT_WARNING: Color = Color::Rgb(229, 192, 123);
pub const ACCENT_ERROR: Color = Color::Rgb(224, 108, 117);

// Markup syntax
pub const TAG_NAME: Color = Color::Rgb(224, 108, 117);
pub const ATTR_NAME: Color = Color::Rgb(209, 154, 102);
pub const ATTR_VALUE: Color = Color::Rgb(152, 195, 121);
pub const COMMENT_TEXT: Color = Color::Rgb(92, 99, 112);
pub const EVENT_BADGE_BG: Color = Color::Rgb(70, 60, 110);

pub const TIMELINE_TRACK: Color = Color::Rgb(60, 60, 60);
pub const TIMELINE_PROGRESS: Color = Color::Rgb(97, 175, 239);
pub const TIMELINE_HOVER: Color = Color::Rgb(150, 150, 150);
