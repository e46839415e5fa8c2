//! Graphics service seam and the paint/mouse event index
//!
//! Fetching a screenshot is the only asynchronous operation here. Everything
//! else is a lookup against the event index that the service preloads when a
//! recording is opened.

use async_trait::async_trait;

use super::error::ProtocolError;
use super::types::{ExecutionPoint, Graphics, MouseEvent, ScreenShot, TimeStampedPoint};

/// Screenshot retrieval and painting
#[async_trait]
pub trait GraphicsService: Send + Sync {
    /// Fetch the screen and mouse state at `time`.
    ///
    /// With `strict` set the service fails instead of returning an empty
    /// screen when nothing has been painted yet.
    async fn get_graphics_at_time(&self, time: f64, strict: bool)
        -> Result<Graphics, ProtocolError>;

    /// Paint a screenshot (and optionally the mouse) onto the viewer canvas
    fn paint_graphics(&self, screen: &ScreenShot, mouse: Option<&MouseEvent>);

    /// Paint whatever screenshot is already cached for `time`; best effort
    fn paint_graphics_at_time(&self, time: f64);

    /// Register the final screen of the recording once its endpoint is known
    fn add_last_screen(&self, screen: Option<&ScreenShot>, point: &ExecutionPoint, time: f64);

    fn most_recent_paint_or_mouse_event(&self, time: f64) -> Option<TimeStampedPoint>;

    fn next_paint_or_mouse_event(&self, time: f64) -> Option<TimeStampedPoint>;

    fn next_paint_event(&self, time: f64) -> Option<TimeStampedPoint>;

    fn previous_paint_event(&self, time: f64) -> Option<TimeStampedPoint>;
}

/// Sorted paint and mouse timestamps
#[derive(Debug, Clone, Default)]
pub struct PaintIndex {
    paints: Vec<TimeStampedPoint>,
    paint_or_mouse: Vec<TimeStampedPoint>,
}

impl PaintIndex {
    pub fn new(paints: Vec<TimeStampedPoint>, mouse: Vec<TimeStampedPoint>) -> Self {
        let mut paints = paints;
        sort_by_time(&mut paints);

        let mut paint_or_mouse = paints.clone();
        paint_or_mouse.extend(mouse);
        sort_by_time(&mut paint_or_mouse);

        Self {
            paints,
            paint_or_mouse,
        }
    }

    pub fn paints(&self) -> &[TimeStampedPoint] {
        &self.paints
    }

    pub fn is_empty(&self) -> bool {
        self.paint_or_mouse.is_empty()
    }

    /// Add a paint event, keeping both lists sorted
    pub fn insert_paint(&mut self, event: TimeStampedPoint) {
        let at = self.paints.partition_point(|e| e.time <= event.time);
        self.paints.insert(at, event.clone());
        let at = self.paint_or_mouse.partition_point(|e| e.time <= event.time);
        self.paint_or_mouse.insert(at, event);
    }

    /// Latest paint or mouse event at or before `time`
    pub fn most_recent_paint_or_mouse_event(&self, time: f64) -> Option<&TimeStampedPoint> {
        at_or_before(&self.paint_or_mouse, time)
    }

    /// First paint or mouse event strictly after `time`
    pub fn next_paint_or_mouse_event(&self, time: f64) -> Option<&TimeStampedPoint> {
        after(&self.paint_or_mouse, time)
    }

    /// First paint event strictly after `time`
    pub fn next_paint_event(&self, time: f64) -> Option<&TimeStampedPoint> {
        after(&self.paints, time)
    }

    /// Last paint event strictly before `time`
    pub fn previous_paint_event(&self, time: f64) -> Option<&TimeStampedPoint> {
        let idx = self.paints.partition_point(|e| e.time < time);
        idx.checked_sub(1).map(|i| &self.paints[i])
    }
}

fn sort_by_time(events: &mut [TimeStampedPoint]) {
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
}

fn at_or_before(events: &[TimeStampedPoint], time: f64) -> Option<&TimeStampedPoint> {
    let idx = events.partition_point(|e| e.time <= time);
    idx.checked_sub(1).map(|i| &events[i])
}

fn after(events: &[TimeStampedPoint], time: f64) -> Option<&TimeStampedPoint> {
    let idx = events.partition_point(|e| e.time <= time);
    events.get(idx)
}
