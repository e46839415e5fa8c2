use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::config::{KeyContext, KeybindingConfig};
use crate::ui::action::Action;

use super::theme::{ACCENT_PRIMARY, TEXT_MUTED, TEXT_SECONDARY};

/// One row of the help overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindingEntry {
    pub keys: String,
    pub description: &'static str,
}

/// Bindings active in `context`, grouped by action and sorted by description
pub fn keybinding_entries(config: &KeybindingConfig, context: KeyContext) -> Vec<KeybindingEntry> {
    let overrides = config.context.get(&context);
    let mut bindings: Vec<(String, Action)> = config
        .global
        .iter()
        .filter(|(key, _)| overrides.map_or(true, |o| !o.contains_key(*key)))
        .chain(overrides.into_iter().flatten())
        .map(|(key, action)| (key.to_string(), *action))
        .collect();
    bindings.sort_by(|a, b| a.0.cmp(&b.0));

    let mut entries: Vec<KeybindingEntry> = Vec::new();
    for (key, action) in bindings {
        let description = action.description();
        match entries.iter_mut().find(|e| e.description == description) {
            Some(entry) => {
                entry.keys.push_str(", ");
                entry.keys.push_str(&key);
            }
            None => entries.push(KeybindingEntry {
                keys: key,
                description,
            }),
        }
    }
    entries.sort_by(|a, b| a.description.cmp(b.description));
    entries
}

pub struct HelpOverlay<'a> {
    entries: &'a [KeybindingEntry],
}

impl<'a> HelpOverlay<'a> {
    pub fn new(entries: &'a [KeybindingEntry]) -> Self {
        Self { entries }
    }

    pub fn area(&self, area: Rect) -> Rect {
        let width = 56.min(area.width);
        let height = (self.entries.len() as u16 + 4).min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = self.area(area);
        Clear.render(area, buf);

        let block = Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT_PRIMARY));

        let key_width = self
            .entries
            .iter()
            .map(|e| e.keys.chars().count())
            .max()
            .unwrap_or(0)
            .min(24);

        let mut lines = vec![Line::raw("")];
        lines.extend(self.entries.iter().map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<key_width$}  ", entry.keys),
                    Style::default()
                        .fg(ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(entry.description, Style::default().fg(TEXT_SECONDARY)),
            ])
        }));
        lines.push(Line::styled(
            "  Esc to close",
            Style::default().fg(TEXT_MUTED),
        ));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
