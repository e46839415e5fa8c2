//! Timeline state and reducer

use tokio::time::Instant;

use crate::protocol::{ExecutionPoint, MouseEvent, ScreenShot};

/// Visible window of the recording, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRegion {
    pub start_time: f64,
    pub end_time: f64,
    pub scale: f64,
}

impl ZoomRegion {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
            scale: 1.0,
        }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    pub fn clamp(&self, time: f64) -> f64 {
        time.clamp(self.start_time, self.end_time.max(self.start_time))
    }

    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}

impl Default for ZoomRegion {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Active playback: the time it started from and the wall-clock instant it
/// started at, plus the last broadcast time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub start_time: f64,
    pub start_date: Instant,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tooltip {
    /// Horizontal offset of the hover position inside the timeline
    pub left: f64,
}

/// A point the user is hovering elsewhere (console message, breakpoint hit)
#[derive(Debug, Clone, PartialEq)]
pub struct HoveredPoint {
    pub point: ExecutionPoint,
    pub time: f64,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineDimensions {
    pub width: f64,
    pub left: f64,
    pub top: f64,
}

impl Default for TimelineDimensions {
    fn default() -> Self {
        Self {
            width: 1.0,
            left: 1.0,
            top: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineState {
    pub current_time: f64,
    pub recording_duration: Option<f64>,
    pub zoom_region: ZoomRegion,
    pub playback: Option<Playback>,
    pub hover_time: Option<f64>,
    pub hovered_point: Option<HoveredPoint>,
    pub screenshot: Option<ScreenShot>,
    pub mouse: Option<MouseEvent>,
    pub tooltip: Option<Tooltip>,
    pub timeline_dimensions: TimelineDimensions,
}

impl TimelineState {
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }
}

/// Partial update of [`TimelineState`]; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineUpdate {
    current_time: Option<f64>,
    recording_duration: Option<f64>,
    zoom_region: Option<ZoomRegion>,
    playback: Option<Option<Playback>>,
    hover_time: Option<Option<f64>>,
    screenshot: Option<Option<ScreenShot>>,
    mouse: Option<Option<MouseEvent>>,
    timeline_dimensions: Option<TimelineDimensions>,
}

impl TimelineUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_time(mut self, time: f64) -> Self {
        self.current_time = Some(time);
        self
    }

    pub fn recording_duration(mut self, duration: f64) -> Self {
        self.recording_duration = Some(duration);
        self
    }

    pub fn zoom_region(mut self, region: ZoomRegion) -> Self {
        self.zoom_region = Some(region);
        self
    }

    pub fn playback(mut self, playback: Option<Playback>) -> Self {
        self.playback = Some(playback);
        self
    }

    pub fn hover_time(mut self, time: Option<f64>) -> Self {
        self.hover_time = Some(time);
        self
    }

    pub fn screenshot(mut self, screen: Option<ScreenShot>) -> Self {
        self.screenshot = Some(screen);
        self
    }

    pub fn mouse(mut self, mouse: Option<MouseEvent>) -> Self {
        self.mouse = Some(mouse);
        self
    }

    pub fn timeline_dimensions(mut self, dimensions: TimelineDimensions) -> Self {
        self.timeline_dimensions = Some(dimensions);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineAction {
    SetState(TimelineUpdate),
    UpdateTooltip(Option<Tooltip>),
    SetZoom(ZoomRegion),
    SetHoveredPoint(Option<HoveredPoint>),
}

impl From<TimelineUpdate> for TimelineAction {
    fn from(update: TimelineUpdate) -> Self {
        TimelineAction::SetState(update)
    }
}

impl TimelineState {
    pub fn reduce(&mut self, action: TimelineAction) {
        match action {
            TimelineAction::SetState(update) => self.apply(update),
            TimelineAction::UpdateTooltip(tooltip) => self.tooltip = tooltip,
            TimelineAction::SetZoom(region) => self.zoom_region = region,
            TimelineAction::SetHoveredPoint(point) => self.hovered_point = point,
        }
    }

    fn apply(&mut self, update: TimelineUpdate) {
        if let Some(time) = update.current_time {
            self.current_time = time;
        }
        if let Some(duration) = update.recording_duration {
            self.recording_duration = Some(duration);
        }
        if let Some(region) = update.zoom_region {
            self.zoom_region = region;
        }
        if let Some(playback) = update.playback {
            self.playback = playback;
        }
        if let Some(hover_time) = update.hover_time {
            self.hover_time = hover_time;
        }
        if let Some(screenshot) = update.screenshot {
            self.screenshot = screenshot;
        }
        if let Some(mouse) = update.mouse {
            self.mouse = mouse;
        }
        if let Some(dimensions) = update.timeline_dimensions {
            self.timeline_dimensions = dimensions;
        }
    }
}
