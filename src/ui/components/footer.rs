use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::{ACCENT_ERROR, FOOTER_BG, KEY_HINT_BG, TEXT_MUTED, TEXT_SECONDARY};

/// Which hints to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterContext {
    Inspector,
    CommentEditor,
}

impl FooterContext {
    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            FooterContext::Inspector => &[
                ("space", "play"),
                (",/.", "paint"),
                ("r", "replay"),
                ("c", "comment"),
                ("e", "events"),
                ("?", "help"),
                ("q", "quit"),
            ],
            FooterContext::CommentEditor => &[("enter", "save"), ("esc", "cancel")],
        }
    }
}

pub struct Footer<'a> {
    context: FooterContext,
    status: Option<&'a str>,
    is_error: bool,
}

impl<'a> Footer<'a> {
    pub fn new(context: FooterContext) -> Self {
        Self {
            context,
            status: None,
            is_error: false,
        }
    }

    /// Message shown right-aligned after the hints
    pub fn status(mut self, status: Option<&'a str>, is_error: bool) -> Self {
        self.status = status;
        self.is_error = is_error;
        self
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(FOOTER_BG));

        let mut spans = vec![Span::raw(" ")];
        for (i, (key, action)) in self.context.hints().iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                format!(" {key} "),
                Style::default().fg(TEXT_SECONDARY).bg(KEY_HINT_BG),
            ));
            spans.push(Span::styled(
                format!(" {action}"),
                Style::default().fg(TEXT_MUTED),
            ));
        }
        let hints = Line::from(spans);
        let hints_width = hints.width() as u16;
        buf.set_line(area.x, area.y, &hints, area.width);

        if let Some(status) = self.status {
            let color = if self.is_error { ACCENT_ERROR } else { TEXT_SECONDARY };
            let width = status.chars().count() as u16 + 1;
            let x = (area.x + area.width).saturating_sub(width);
            if x > area.x + hints_width {
                buf.set_string(x, area.y, status, Style::default().fg(color));
            }
        }
    }
}
