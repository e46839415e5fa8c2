//! Timeline bar: play state, current time and a progress track over the
//! zoom region

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::timeline::{TimelineState, ZoomRegion};

use super::theme::{
    ACCENT_PRIMARY, STATUS_BAR_BG, TEXT_MUTED, TEXT_PRIMARY, TIMELINE_HOVER, TIMELINE_PROGRESS,
    TIMELINE_TRACK,
};

/// Width of the time label left of the track
const LABEL_WIDTH: u16 = 26;

/// `mm:ss.mmm`
pub fn format_time(ms: f64) -> String {
    let total = ms.max(0.0).round() as u64;
    let minutes = total / 60_000;
    let seconds = (total / 1000) % 60;
    let millis = total % 1000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

/// Area of the progress track inside the bar
pub fn track_area(area: Rect) -> Rect {
    let offset = LABEL_WIDTH.min(area.width);
    Rect::new(
        area.x + offset,
        area.y,
        area.width.saturating_sub(offset + 1),
        area.height.min(1),
    )
}

/// Recording time under `column`, or `None` outside the track
pub fn time_at_column(area: Rect, zoom: &ZoomRegion, column: u16) -> Option<f64> {
    let track = track_area(area);
    if track.width == 0 || column < track.x || column >= track.x + track.width {
        return None;
    }
    let fraction = f64::from(column - track.x) / f64::from(track.width.saturating_sub(1).max(1));
    Some(zoom.start_time + fraction * zoom.duration())
}

fn column_for_time(track: Rect, zoom: &ZoomRegion, time: f64) -> u16 {
    if zoom.duration() <= 0.0 || track.width == 0 {
        return track.x;
    }
    let fraction = ((time - zoom.start_time) / zoom.duration()).clamp(0.0, 1.0);
    track.x + (fraction * f64::from(track.width.saturating_sub(1))).round() as u16
}

pub struct TimelineBar<'a> {
    timeline: &'a TimelineState,
}

impl<'a> TimelineBar<'a> {
    pub fn new(timeline: &'a TimelineState) -> Self {
        Self { timeline }
    }
}

impl Widget for TimelineBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(STATUS_BAR_BG));

        let timeline = self.timeline;
        let zoom = &timeline.zoom_region;
        let icon = if timeline.is_playing() { "⏸" } else { "▶" };
        let label = Line::from(vec![
            Span::styled(
                format!(" {icon} "),
                Style::default()
                    .fg(ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format_time(timeline.current_time),
                Style::default().fg(TEXT_PRIMARY),
            ),
            Span::styled(" / ", Style::default().fg(TEXT_MUTED)),
            Span::styled(
                format_time(timeline.recording_duration.unwrap_or(zoom.end_time)),
                Style::default().fg(TEXT_MUTED),
            ),
        ]);
        buf.set_line(area.x, area.y, &label, LABEL_WIDTH.min(area.width));

        let track = track_area(area);
        if track.width == 0 {
            return;
        }

        let played = column_for_time(track, zoom, timeline.current_time);
        for x in track.x..track.x + track.width {
            let (symbol, color) = if x <= played && zoom.duration() > 0.0 {
                ("━", TIMELINE_PROGRESS)
            } else {
                ("─", TIMELINE_TRACK)
            };
            buf[(x, track.y)]
                .set_symbol(symbol)
                .set_style(Style::default().fg(color));
        }

        if let Some(hover) = timeline.hover_time {
            let x = column_for_time(track, zoom, hover);
            buf[(x, track.y)]
                .set_symbol("│")
                .set_style(Style::default().fg(TIMELINE_HOVER));
        }

        if zoom.duration() > 0.0 {
            buf[(played, track.y)]
                .set_symbol("●")
                .set_style(Style::default().fg(TIMELINE_PROGRESS));
        }

        // Hover tooltip on the row below, when there is one
        if let (Some(hover), Some(tooltip)) = (timeline.hover_time, timeline.tooltip) {
            if area.height > 1 {
                let text = format_time(hover);
                let max_x = (area.x + area.width).saturating_sub(text.len() as u16);
                let x = (area.x + tooltip.left.max(0.0) as u16).min(max_x);
                buf.set_string(x, area.y + 1, text, Style::default().fg(TIMELINE_HOVER));
            }
        }
    }
}
