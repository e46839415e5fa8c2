//! In-process thread front and graphics service over a fixture

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use super::fixture::{RecordingError, RecordingFixture};
use crate::markup::{EventListener, MarkupEvent, NodeId, NodeRecord};
use crate::protocol::{
    ExecutionPoint, Graphics, GraphicsService, MouseEvent, PaintIndex, Pause, PauseEventArgs,
    PauseId, ProtocolError, RecordingDescription, RecordingId, ScreenShot, ThreadEvent,
    ThreadFront, TimeStampedPoint, WarpCallback,
};

#[derive(Debug, Clone)]
struct Position {
    point: ExecutionPoint,
    time: f64,
    has_frames: bool,
}

/// A loaded recording answering both protocol seams.
///
/// Warps complete immediately and are reported through the event channel
/// returned by [`LocalRecording::take_events`].
pub struct LocalRecording {
    recording_id: RecordingId,
    description: RecordingDescription,
    endpoint: Option<TimeStampedPoint>,
    index: RwLock<PaintIndex>,
    /// Screenshots sorted by paint time
    screens: RwLock<Vec<(f64, ScreenShot)>>,
    mouse: Vec<MouseEvent>,
    pauses: HashMap<PauseId, Pause>,
    listeners: HashMap<NodeId, Vec<EventListener>>,
    node_ids: HashSet<NodeId>,
    markup: Vec<MarkupEvent>,
    position: Mutex<Position>,
    warp_callback: Mutex<Option<WarpCallback>>,
    events_tx: mpsc::UnboundedSender<ThreadEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ThreadEvent>>>,
    painted: Mutex<Option<(ScreenShot, Option<MouseEvent>)>>,
    paint_count: AtomicUsize,
    fetch_latency: Option<Duration>,
}

impl LocalRecording {
    pub fn open(path: &Path) -> Result<Arc<Self>, RecordingError> {
        let fixture = RecordingFixture::read_jsonl_from_path(path)?;
        Ok(Arc::new(Self::from_fixture(fixture)?))
    }

    pub fn from_fixture(fixture: RecordingFixture) -> Result<Self, RecordingError> {
        let description = fixture.effective_description();
        let markup = markup_events(&fixture.nodes)?;
        let node_ids = fixture.nodes.iter().map(|n| n.id.clone()).collect();

        let paint_points = fixture
            .paints
            .iter()
            .map(|p| TimeStampedPoint::new(p.point.clone(), p.time))
            .collect();
        let mouse_points = fixture
            .mouse
            .iter()
            .map(|m| TimeStampedPoint::new(m.point.clone(), m.time))
            .collect();

        let mut screens: Vec<(f64, ScreenShot)> = fixture
            .paints
            .iter()
            .map(|p| (p.time, p.screen.clone()))
            .collect();
        screens.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut mouse = fixture.mouse;
        mouse.sort_by(|a, b| a.time.total_cmp(&b.time));

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            recording_id: fixture.recording_id,
            position: Mutex::new(Position {
                point: ExecutionPoint::default(),
                time: description.duration,
                has_frames: false,
            }),
            description,
            endpoint: fixture.endpoint,
            index: RwLock::new(PaintIndex::new(paint_points, mouse_points)),
            screens: RwLock::new(screens),
            mouse,
            pauses: fixture
                .pauses
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            listeners: fixture.listeners,
            node_ids,
            markup,
            warp_callback: Mutex::new(None),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            painted: Mutex::new(None),
            paint_count: AtomicUsize::new(0),
            fetch_latency: None,
        })
    }

    /// Delay every graphics fetch, as a remote service would
    pub fn with_fetch_latency(mut self, latency: Duration) -> Self {
        self.fetch_latency = Some(latency);
        self
    }

    pub fn recording_id(&self) -> &RecordingId {
        &self.recording_id
    }

    /// Receiver for thread notifications; available once
    pub fn take_events(&self) -> Option<mpsc::UnboundedReceiver<ThreadEvent>> {
        self.events_rx.lock().take()
    }

    /// Events that build the markup tree of the recorded document, followed
    /// by the endpoint notification if the fixture has one
    pub fn initial_events(&self) -> Vec<ThreadEvent> {
        let mut events: Vec<ThreadEvent> =
            self.markup.iter().cloned().map(ThreadEvent::Markup).collect();
        if let Some(endpoint) = &self.endpoint {
            events.push(ThreadEvent::Endpoint(endpoint.clone()));
        }
        events
    }

    /// Last screenshot put on the canvas
    pub fn last_painted(&self) -> Option<ScreenShot> {
        self.painted.lock().as_ref().map(|(screen, _)| screen.clone())
    }

    pub fn paint_count(&self) -> usize {
        self.paint_count.load(Ordering::Relaxed)
    }

    pub fn paints(&self) -> Vec<TimeStampedPoint> {
        self.index.read().paints().to_vec()
    }

    fn screen_at(&self, time: f64) -> Option<ScreenShot> {
        let screens = self.screens.read();
        let idx = screens.partition_point(|(t, _)| *t <= time);
        idx.checked_sub(1).map(|i| screens[i].1.clone())
    }

    fn mouse_at(&self, time: f64) -> Option<MouseEvent> {
        let idx = self.mouse.partition_point(|m| m.time <= time);
        idx.checked_sub(1).map(|i| self.mouse[i].clone())
    }

    fn pause_at(&self, point: ExecutionPoint, time: f64, has_frames: bool) {
        *self.position.lock() = Position {
            point: point.clone(),
            time,
            has_frames,
        };
        tracing::debug!(%point, time, has_frames, "Paused");

        let args = PauseEventArgs {
            point,
            time,
            has_frames,
        };
        if self.events_tx.send(ThreadEvent::Paused(args)).is_err() {
            tracing::trace!("No listener for thread events");
        }
    }
}

/// Reset plus breadth-first child loads, so every parent exists before its
/// children arrive
fn markup_events(nodes: &[NodeRecord]) -> Result<Vec<MarkupEvent>, RecordingError> {
    let root = nodes
        .iter()
        .find(|n| n.parent_id.is_none())
        .ok_or(RecordingError::NoRoot)?;

    let mut children: HashMap<&NodeId, Vec<&NodeRecord>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = &node.parent_id {
            children.entry(parent).or_default().push(node);
        }
    }

    let detached = |node: &NodeRecord| {
        let has_children = node.has_children || children.contains_key(&node.id);
        NodeRecord {
            children: Vec::new(),
            has_children,
            ..node.clone()
        }
    };

    let mut events = vec![MarkupEvent::Reset {
        root: detached(root),
    }];
    let mut queue = VecDeque::from([&root.id]);
    while let Some(parent) = queue.pop_front() {
        let Some(kids) = children.get(parent) else {
            continue;
        };
        events.push(MarkupEvent::ChildrenLoaded {
            parent: parent.clone(),
            children: kids.iter().map(|k| detached(k)).collect(),
        });
        queue.extend(kids.iter().map(|k| &k.id));
    }

    Ok(events)
}

#[async_trait]
impl GraphicsService for LocalRecording {
    async fn get_graphics_at_time(
        &self,
        time: f64,
        strict: bool,
    ) -> Result<Graphics, ProtocolError> {
        if let Some(latency) = self.fetch_latency {
            tokio::time::sleep(latency).await;
        }

        let screen = self.screen_at(time);
        if strict && screen.is_none() {
            return Err(ProtocolError::ScreenshotUnavailable(time));
        }

        Ok(Graphics {
            screen,
            mouse: self.mouse_at(time),
        })
    }

    fn paint_graphics(&self, screen: &ScreenShot, mouse: Option<&MouseEvent>) {
        tracing::trace!(hash = %screen.hash, "Paint");
        *self.painted.lock() = Some((screen.clone(), mouse.cloned()));
        self.paint_count.fetch_add(1, Ordering::Relaxed);
    }

    fn paint_graphics_at_time(&self, time: f64) {
        if let Some(screen) = self.screen_at(time) {
            let mouse = self.mouse_at(time);
            self.paint_graphics(&screen, mouse.as_ref());
        }
    }

    fn add_last_screen(&self, screen: Option<&ScreenShot>, point: &ExecutionPoint, time: f64) {
        let Some(screen) = screen else {
            return;
        };

        {
            let mut screens = self.screens.write();
            let at = screens.partition_point(|(t, _)| *t <= time);
            screens.insert(at, (time, screen.clone()));
        }
        self.index
            .write()
            .insert_paint(TimeStampedPoint::new(point.clone(), time));
    }

    fn most_recent_paint_or_mouse_event(&self, time: f64) -> Option<TimeStampedPoint> {
        self.index.read().most_recent_paint_or_mouse_event(time).cloned()
    }

    fn next_paint_or_mouse_event(&self, time: f64) -> Option<TimeStampedPoint> {
        self.index.read().next_paint_or_mouse_event(time).cloned()
    }

    fn next_paint_event(&self, time: f64) -> Option<TimeStampedPoint> {
        self.index.read().next_paint_event(time).cloned()
    }

    fn previous_paint_event(&self, time: f64) -> Option<TimeStampedPoint> {
        self.index.read().previous_paint_event(time).cloned()
    }
}

#[async_trait]
impl ThreadFront for LocalRecording {
    fn time_warp(&self, point: &ExecutionPoint, time: f64, has_frames: bool) {
        let callback = self.warp_callback.lock().clone();
        let target = callback
            .and_then(|callback| callback(point, time))
            .unwrap_or_else(|| TimeStampedPoint::new(point.clone(), time));

        self.pause_at(target.point, target.time, has_frames);
    }

    fn time_warp_to_pause(&self, pause: &Pause) {
        self.pause_at(pause.point.clone(), pause.time, pause.has_frames);
    }

    fn pause_by_id(&self, id: &PauseId) -> Option<Pause> {
        self.pauses.get(id).cloned()
    }

    fn current_point(&self) -> ExecutionPoint {
        self.position.lock().point.clone()
    }

    fn current_point_has_frames(&self) -> bool {
        self.position.lock().has_frames
    }

    fn set_warp_callback(&self, callback: Option<WarpCallback>) {
        *self.warp_callback.lock() = callback;
    }

    async fn recording_description(&self) -> Result<RecordingDescription, ProtocolError> {
        Ok(self.description.clone())
    }

    async fn event_listeners(&self, node_id: &NodeId) -> Result<Vec<EventListener>, ProtocolError> {
        if !self.node_ids.contains(node_id) {
            return Err(ProtocolError::UnknownNode(node_id.clone()));
        }
        Ok(self.listeners.get(node_id).cloned().unwrap_or_default())
    }
}
