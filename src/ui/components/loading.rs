//! Loading skeleton with artificial progress
//!
//! Real loading progress arrives in coarse steps, so the bar is bumped every
//! 200 ms by a random amount that shrinks as it nears 100. It never falls
//! behind the real progress.

use std::time::Duration;

use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Paragraph, Widget},
};
use tokio::time::Instant;

use super::theme::{ACCENT_PRIMARY, TEXT_MUTED, TEXT_PRIMARY, TIMELINE_TRACK};

pub const BUMP_INTERVAL: Duration = Duration::from_millis(200);

/// Time the full bar stays up before the app is shown
pub const FINISH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct LoadingProgress {
    displayed: f64,
    last_bump: Instant,
    finished_at: Option<Instant>,
}

impl LoadingProgress {
    pub fn new() -> Self {
        Self {
            displayed: 0.0,
            last_bump: Instant::now(),
            finished_at: None,
        }
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    /// Advance the artificial progress if a bump is due
    pub fn tick(&mut self, progress: u8) {
        let now = Instant::now();
        if now.duration_since(self.last_bump) < BUMP_INTERVAL {
            return;
        }
        self.last_bump = now;
        let increment: f64 = rand::rng().random_range(0.0..1.0);
        self.bump(increment, progress);
    }

    /// Apply one bump with `increment` in `0.0..1.0`
    pub fn bump(&mut self, increment: f64, progress: u8) {
        let decayed = increment * ((100.0 - self.displayed) / 40.0);
        self.displayed = (self.displayed + decayed)
            .max(f64::from(progress))
            .min(100.0);
        if self.displayed >= 100.0 && self.finished_at.is_none() {
            self.finished_at = Some(Instant::now());
        }
    }

    /// The bar has reached 100 and stayed there long enough to be seen
    pub fn is_finished(&self) -> bool {
        self.finished_at
            .is_some_and(|at| at.elapsed() >= FINISH_DELAY)
    }
}

impl Default for LoadingProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Header message: "Ready" once the real progress is complete
pub fn loading_message(progress: u8, content: &str) -> &str {
    if progress >= 100 {
        "Ready"
    } else {
        content
    }
}

pub struct LoadingSkeleton<'a> {
    progress: &'a LoadingProgress,
    real_progress: u8,
    content: &'a str,
}

impl<'a> LoadingSkeleton<'a> {
    pub fn new(progress: &'a LoadingProgress, real_progress: u8) -> Self {
        Self {
            progress,
            real_progress,
            content: "Loading...",
        }
    }

    pub fn content(mut self, content: &'a str) -> Self {
        self.content = content;
        self
    }
}

impl Widget for LoadingSkeleton<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let middle = area.y + area.height / 2;
        Paragraph::new(Line::styled(
            loading_message(self.real_progress, self.content),
            Style::default().fg(TEXT_PRIMARY),
        ))
        .alignment(Alignment::Center)
        .render(Rect::new(area.x, middle - 1, area.width, 1), buf);

        let width = area.width.saturating_sub(8);
        let x = area.x + 4;
        let filled = ((self.progress.displayed() / 100.0) * f64::from(width)).round() as u16;
        for i in 0..width {
            let color = if i < filled { ACCENT_PRIMARY } else { TIMELINE_TRACK };
            buf[(x + i, middle + 1)]
                .set_symbol("━")
                .set_style(Style::default().fg(color));
        }

        let percent = format!("{:.0}%", self.progress.displayed());
        Paragraph::new(Line::styled(percent, Style::default().fg(TEXT_MUTED)))
            .alignment(Alignment::Center)
            .render(Rect::new(area.x, middle + 2, area.width, 1), buf);
    }
}
