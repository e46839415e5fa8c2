//! Inline editor shown while a comment is pending

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::comments::PendingComment;

use super::theme::{ACCENT_PRIMARY, TEXT_MUTED, TEXT_PRIMARY};
use super::timeline_bar::format_time;

pub const COMMENT_BOX_HEIGHT: u16 = 5;

pub struct CommentBox<'a> {
    pending: &'a PendingComment,
    buffer: &'a str,
}

impl<'a> CommentBox<'a> {
    pub fn new(pending: &'a PendingComment, buffer: &'a str) -> Self {
        Self { pending, buffer }
    }

    /// Centered box near the bottom of `area`
    pub fn area(area: Rect) -> Rect {
        let width = area.width.saturating_sub(8).min(72);
        let height = COMMENT_BOX_HEIGHT.min(area.height);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + area.height.saturating_sub(height + 2);
        Rect::new(x, y, width, height)
    }

    /// Terminal position of the text cursor, at the end of the buffer
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let inner_width = area.width.saturating_sub(2).max(1);
        let width = self.buffer.width() as u16;
        let row = (width / inner_width).min(area.height.saturating_sub(3));
        (area.x + 1 + width % inner_width, area.y + 1 + row)
    }
}

impl Widget for CommentBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let comment = &self.pending.comment;
        let title = if comment.parent_id.is_some() {
            format!(" Reply at {} ", format_time(comment.time))
        } else {
            format!(" Comment at {} ", format_time(comment.time))
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT_PRIMARY));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let text = if self.buffer.is_empty() {
            Line::from(Span::styled(
                "Type a comment...",
                Style::default().fg(TEXT_MUTED),
            ))
        } else {
            Line::from(Span::styled(self.buffer, Style::default().fg(TEXT_PRIMARY)))
        };
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .render(Rect::new(inner.x, inner.y, inner.width, inner.height - 1), buf);

        let hint = Line::from(vec![
            Span::styled("Enter", Style::default().fg(ACCENT_PRIMARY)),
            Span::styled(" save  ", Style::default().fg(TEXT_MUTED)),
            Span::styled("Esc", Style::default().fg(ACCENT_PRIMARY)),
            Span::styled(" cancel", Style::default().fg(TEXT_MUTED)),
        ]);
        buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
    }
}
