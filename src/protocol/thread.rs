use std::sync::Arc;

use async_trait::async_trait;

use super::error::ProtocolError;
use super::types::{
    ExecutionPoint, Pause, PauseEventArgs, PauseId, RecordingDescription, TimeStampedPoint,
};
use crate::markup::{EventListener, MarkupEvent, NodeId};

/// Hook consulted before a warp lands. Returning `Some` replaces the target.
pub type WarpCallback = Arc<dyn Fn(&ExecutionPoint, f64) -> Option<TimeStampedPoint> + Send + Sync>;

/// Notifications pushed by the thread front
#[derive(Debug, Clone)]
pub enum ThreadEvent {
    /// Execution paused at a point (after a warp, step or breakpoint)
    Paused(PauseEventArgs),
    /// The end of the recording became known
    Endpoint(TimeStampedPoint),
    /// The markup tree of the paused document changed
    Markup(MarkupEvent),
}

/// Remote execution control for the recorded debuggee
#[async_trait]
pub trait ThreadFront: Send + Sync {
    /// Move execution to `point`. Fire-and-forget; a `Paused` event follows.
    fn time_warp(&self, point: &ExecutionPoint, time: f64, has_frames: bool);

    /// Move execution to an existing pause
    fn time_warp_to_pause(&self, pause: &Pause);

    fn pause_by_id(&self, id: &PauseId) -> Option<Pause>;

    fn current_point(&self) -> ExecutionPoint;

    fn current_point_has_frames(&self) -> bool;

    /// Install (or clear) the warp correction hook
    fn set_warp_callback(&self, callback: Option<WarpCallback>);

    async fn recording_description(&self) -> Result<RecordingDescription, ProtocolError>;

    /// Event listeners attached to a node at the current point
    async fn event_listeners(&self, node_id: &NodeId) -> Result<Vec<EventListener>, ProtocolError>;
}
