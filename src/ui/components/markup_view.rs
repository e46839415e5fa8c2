//! Markup panel widget
//!
//! Flattens the nested [`RenderedNode`] tree into one row per opening tag and
//! one per closing tag, then draws the rows that fit in the viewport.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::markup::{LineKind, MarkupLine, NodeContent, NodeId, RenderedNode};

use super::theme::{
    ACCENT_PRIMARY, ATTR_NAME, ATTR_VALUE, COMMENT_TEXT, EVENT_BADGE_BG, HOVERED_BG, SELECTED_BG,
    TAG_NAME, TEXT_MUTED, TEXT_PRIMARY,
};

/// Attribute values longer than this are cut with an ellipsis
const MAX_ATTR_WIDTH: usize = 48;

const EVENT_BADGE: &str = " event ";

/// What a click on the panel landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupHit {
    Row(NodeId),
    Expander(NodeId),
    Badge(NodeId),
}

#[derive(Debug, Clone)]
struct RowHit {
    id: NodeId,
    expander: Option<Range<u16>>,
    badge: Option<Range<u16>>,
}

/// Scroll position of the markup panel plus the geometry of the last draw
#[derive(Debug, Default)]
pub struct MarkupViewState {
    pub offset: usize,
    /// Scroll target already centered; cleared when the store has none
    last_scroll_target: Option<NodeId>,
    /// Selection seen by the previous layout; wheel scrolling survives until it changes
    last_selected: Option<NodeId>,
    viewport_height: usize,
    area: Rect,
    rows: Vec<RowHit>,
}

impl MarkupViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Settle the scroll offset for `lines` in a viewport of `height` rows.
    ///
    /// A scroll target is centered the first time it is laid out. A newly
    /// selected row is brought on screen once; after that the offset is left
    /// where the user scrolled it. Returns the target when it was centered by
    /// this call.
    pub fn layout(&mut self, lines: &[MarkupLine<'_>], height: usize) -> Option<NodeId> {
        self.viewport_height = height;
        let max_offset = lines.len().saturating_sub(height);

        let target = lines
            .iter()
            .position(|line| line.kind == LineKind::Open && line.node.is_scroll_target);

        let mut centered = None;
        match target {
            Some(index) => {
                let id = &lines[index].node.id;
                if self.last_scroll_target.as_ref() != Some(id) {
                    self.offset = index.saturating_sub(height / 2);
                    self.last_scroll_target = Some(id.clone());
                    centered = Some(id.clone());
                }
            }
            None => self.last_scroll_target = None,
        }

        let selected = lines
            .iter()
            .position(|line| line.kind == LineKind::Open && line.node.is_selected);
        let selected_id = selected.map(|index| lines[index].node.id.clone());
        let selection_changed = selected_id != self.last_selected;
        self.last_selected = selected_id;

        if let (None, true, Some(selected)) = (&centered, selection_changed, selected) {
            if selected < self.offset {
                self.offset = selected;
            } else if height > 0 && selected >= self.offset + height {
                self.offset = selected + 1 - height;
            }
        }

        self.offset = self.offset.min(max_offset);
        centered
    }

    /// Map a terminal cell to the row drawn there on the last render
    pub fn hit_test(&self, column: u16, row: u16) -> Option<MarkupHit> {
        if column < self.area.x
            || column >= self.area.x + self.area.width
            || row < self.area.y
            || row >= self.area.y + self.area.height
        {
            return None;
        }
        let hit = self.rows.get((row - self.area.y) as usize)?;
        if hit.expander.as_ref().is_some_and(|r| r.contains(&column)) {
            return Some(MarkupHit::Expander(hit.id.clone()));
        }
        if hit.badge.as_ref().is_some_and(|r| r.contains(&column)) {
            return Some(MarkupHit::Badge(hit.id.clone()));
        }
        Some(MarkupHit::Row(hit.id.clone()))
    }
}

/// Ids of the opening rows, in display order. Keyboard navigation walks this.
pub fn visible_node_ids(nodes: &[RenderedNode]) -> Vec<NodeId> {
    nodes
        .iter()
        .flat_map(|node| node.lines())
        .filter(|line| line.kind == LineKind::Open)
        .map(|line| line.node.id.clone())
        .collect()
}

/// Node `delta` rows away from `current`, clamped to the ends.
/// With nothing selected, moving down picks the first row and up the last.
pub fn select_relative(rows: &[NodeId], current: Option<&NodeId>, delta: isize) -> Option<NodeId> {
    if rows.is_empty() {
        return None;
    }
    let last = rows.len() - 1;
    let index = match current.and_then(|id| rows.iter().position(|row| row == id)) {
        Some(index) => {
            if delta < 0 {
                index.saturating_sub(delta.unsigned_abs())
            } else {
                (index + delta as usize).min(last)
            }
        }
        None if delta < 0 => last,
        None => 0,
    };
    rows.get(index).cloned()
}

pub struct MarkupView<'a> {
    nodes: &'a [RenderedNode],
    block: Option<Block<'a>>,
    empty_message: &'a str,
}

impl<'a> MarkupView<'a> {
    pub fn new(nodes: &'a [RenderedNode]) -> Self {
        Self {
            nodes,
            block: None,
            empty_message: "No markup loaded",
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }
}

impl StatefulWidget for MarkupView<'_> {
    type State = MarkupViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        state.area = inner;
        state.rows.clear();

        if inner.width < 3 || inner.height < 1 {
            return;
        }

        let lines: Vec<MarkupLine<'_>> = self.nodes.iter().flat_map(|n| n.lines()).collect();
        if lines.is_empty() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                self.empty_message,
                Style::default().fg(TEXT_MUTED),
            );
            return;
        }

        // Offset is settled by `layout` before drawing; only clamp here
        let height = inner.height as usize;
        state.offset = state.offset.min(lines.len().saturating_sub(height));

        for (row, line) in lines.iter().skip(state.offset).take(height).enumerate() {
            let y = inner.y + row as u16;
            let (spans, hit) = row_spans(line, inner.x);

            let row_style = if line.node.is_selected && line.kind == LineKind::Open {
                Style::default().bg(SELECTED_BG)
            } else if line.node.is_hovered {
                Style::default().bg(HOVERED_BG)
            } else {
                Style::default()
            };
            buf.set_style(Rect::new(inner.x, y, inner.width, 1), row_style);

            let mut rendered = Line::from(spans);
            if !line.node.is_displayed {
                rendered = rendered.style(Style::default().add_modifier(Modifier::DIM));
            }
            buf.set_line(inner.x, y, &rendered, inner.width);
            state.rows.push(hit);
        }

        if lines.len() > height {
            let mut scrollbar_state =
                ScrollbarState::new(lines.len().saturating_sub(height)).position(state.offset);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .track_symbol(Some("│"))
                .thumb_symbol("█")
                .render(inner, buf, &mut scrollbar_state);
        }
    }
}

fn row_spans<'a>(line: &MarkupLine<'a>, x: u16) -> (Vec<Span<'a>>, RowHit) {
    let node = line.node;
    let indent = "  ".repeat(node.depth);
    let mut column = x + indent.width() as u16;
    let mut spans = vec![Span::raw(indent)];

    let mut hit = RowHit {
        id: node.id.clone(),
        expander: None,
        badge: None,
    };

    if line.kind == LineKind::Close {
        spans.push(Span::raw("  "));
        let tag = node.closing_tag.clone().unwrap_or_default();
        spans.push(Span::styled(tag, Style::default().fg(TAG_NAME)));
        return (spans, hit);
    }

    let expander = match (node.show_expander, node.is_expanded) {
        (true, true) => "▼ ",
        (true, false) => "▶ ",
        (false, _) => "  ",
    };
    if node.show_expander {
        hit.expander = Some(column..column + 2);
    }
    column += 2;
    spans.push(Span::styled(expander, Style::default().fg(TEXT_MUTED)));

    let content = content_spans(&node.content);
    column += content.iter().map(|s| s.width() as u16).sum::<u16>();
    spans.extend(content);

    if node.has_event_badge {
        spans.push(Span::raw(" "));
        column += 1;
        hit.badge = Some(column..column + EVENT_BADGE.width() as u16);
        spans.push(Span::styled(
            EVENT_BADGE,
            Style::default().fg(TEXT_PRIMARY).bg(EVENT_BADGE_BG),
        ));
    }

    (spans, hit)
}

fn content_spans(content: &NodeContent) -> Vec<Span<'static>> {
    let tag = Style::default().fg(TAG_NAME);
    match content {
        NodeContent::Element {
            name,
            attributes,
            inline_text,
        } => {
            let mut spans = vec![Span::styled(format!("<{name}"), tag)];
            for attr in attributes {
                spans.push(Span::styled(
                    format!(" {}", attr.name),
                    Style::default().fg(ATTR_NAME),
                ));
                spans.push(Span::raw("="));
                spans.push(Span::styled(
                    format!("\"{}\"", truncate_to_width(&attr.value, MAX_ATTR_WIDTH)),
                    Style::default().fg(ATTR_VALUE),
                ));
            }
            spans.push(Span::styled(">", tag));
            if let Some(text) = inline_text {
                spans.push(Span::styled(
                    text.trim().to_string(),
                    Style::default().fg(TEXT_PRIMARY),
                ));
                spans.push(Span::styled(format!("</{name}>"), tag));
            }
            spans
        }
        NodeContent::Text(_) => vec![Span::styled(
            content.to_markup(),
            Style::default().fg(TEXT_PRIMARY),
        )],
        NodeContent::Comment(_) => vec![Span::styled(
            content.to_markup(),
            Style::default().fg(COMMENT_TEXT),
        )],
        NodeContent::ReadOnly { is_pseudo, .. } => {
            let color = if *is_pseudo { ACCENT_PRIMARY } else { TEXT_MUTED };
            vec![Span::styled(
                content.to_markup(),
                Style::default().fg(color).add_modifier(Modifier::ITALIC),
            )]
        }
    }
}

/// Truncate to a display width, ending with "…" when cut
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }

    let target = max_width.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + char_width > target {
            break;
        }
        out.push(c);
        width += char_width;
    }
    out.push('…');
    out
}
