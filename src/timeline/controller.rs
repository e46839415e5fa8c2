//! Timeline operations: seeking, paint stepping, playback control and the
//! protocol event handlers that keep the timeline in sync with the thread.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::playback::{self, PlaybackConfig, PlaybackRun};
use super::state::{HoveredPoint, Playback, TimelineAction, TimelineDimensions, TimelineUpdate, Tooltip, ZoomRegion};
use crate::protocol::{
    ExecutionPoint, GraphicsService, PauseEventArgs, PauseId, ProtocolError, RecordingDescription,
    ThreadFront, TimeStampedPoint, WarpCallback,
};
use crate::store::{AppAction, PrimaryPanel, Store};

/// The playback run currently allowed to write to the store
struct ActiveRun {
    token: CancellationToken,
    /// A pause at this time was requested by `replay_playback` itself and
    /// must not stop the run it started
    expected_pause: Option<f64>,
}

#[derive(Clone)]
pub struct Timeline {
    store: Store,
    graphics: Arc<dyn GraphicsService>,
    thread: Arc<dyn ThreadFront>,
    config: PlaybackConfig,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl Timeline {
    pub fn new(
        store: Store,
        graphics: Arc<dyn GraphicsService>,
        thread: Arc<dyn ThreadFront>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            store,
            graphics,
            thread,
            config,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> Store {
        self.store.clone()
    }

    pub fn graphics(&self) -> Arc<dyn GraphicsService> {
        self.graphics.clone()
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        self.config
    }

    /// A run may keep writing while its token is live and playback is set
    pub(crate) fn is_live(&self, token: &CancellationToken) -> bool {
        !token.is_cancelled() && self.store.read(|s| s.timeline.playback.is_some())
    }

    /// Install the warp hook and load the recording description
    pub async fn setup(&self) -> Result<(), ProtocolError> {
        self.thread.set_warp_callback(Some(self.warp_callback()));
        let description = self.thread.recording_description().await?;
        self.set_recording_description(description);
        Ok(())
    }

    fn set_recording_description(&self, description: RecordingDescription) {
        let RecordingDescription {
            duration,
            last_screen,
        } = description;

        // Put the last screen up right away, before the endpoint is known
        if let Some(screen) = &last_screen {
            self.graphics.paint_graphics(screen, None);
        }

        let zoom = self.store.read(|s| s.timeline.zoom_region);
        self.store.dispatch(
            TimelineUpdate::new()
                .recording_duration(duration)
                .current_time(duration)
                .screenshot(last_screen)
                .zoom_region(ZoomRegion {
                    end_time: duration,
                    ..zoom
                }),
        );
    }

    /// Warp hook that keeps warps inside the zoom region
    pub fn warp_callback(&self) -> WarpCallback {
        let store = self.store.clone();
        let graphics = self.graphics.clone();
        Arc::new(move |_point: &ExecutionPoint, time: f64| {
            let zoom = store.read(|s| s.timeline.zoom_region);
            clamp_warp(graphics.as_ref(), zoom, time)
        })
    }

    pub fn on_warp(&self, _point: &ExecutionPoint, time: f64) -> Option<TimeStampedPoint> {
        let zoom = self.store.read(|s| s.timeline.zoom_region);
        clamp_warp(self.graphics.as_ref(), zoom, time)
    }

    /// The thread paused somewhere: stop playback and show that moment
    pub async fn on_paused(&self, args: PauseEventArgs) {
        let time = args.time;

        {
            let mut active = self.active.lock();
            if let Some(run) = active.as_mut() {
                if run.expected_pause == Some(time) {
                    run.expected_pause = None;
                    return;
                }
            }
            if let Some(run) = active.take() {
                run.token.cancel();
            }
        }

        self.store.dispatch(
            TimelineUpdate::new()
                .current_time(time)
                .playback(None),
        );

        let graphics = match self.graphics.get_graphics_at_time(time, false).await {
            Ok(graphics) => graphics,
            Err(e) => {
                tracing::debug!(time, error = %e, "No graphics at pause");
                return;
            }
        };

        let Some(screen) = graphics.screen else {
            return;
        };
        if self.store.read(|s| s.timeline.current_time) != time {
            return;
        }

        self.graphics.paint_graphics(&screen, graphics.mouse.as_ref());
        self.store.dispatch(
            TimelineUpdate::new()
                .screenshot(Some(screen))
                .mouse(graphics.mouse),
        );
    }

    /// The end of the recording is known
    pub fn on_endpoint(&self, endpoint: TimeStampedPoint) {
        let TimeStampedPoint { point, time } = endpoint;
        let (screenshot, zoom) = self
            .store
            .read(|s| (s.timeline.screenshot.clone(), s.timeline.zoom_region));

        self.graphics.add_last_screen(screenshot.as_ref(), &point, time);
        self.store.dispatch(
            TimelineUpdate::new()
                .current_time(time)
                .recording_duration(time)
                .zoom_region(ZoomRegion {
                    end_time: time,
                    ..zoom
                }),
        );
    }

    pub fn update_timeline_dimensions(&self, width: f64, left: f64, top: f64) {
        self.store.dispatch(
            TimelineUpdate::new().timeline_dimensions(TimelineDimensions { width, left, top }),
        );
    }

    /// Preview the screen under the cursor while hovering the timeline
    pub fn set_timeline_to_time(&self, time: f64, offset: f64) {
        self.graphics.paint_graphics_at_time(time);
        self.store
            .dispatch(TimelineAction::UpdateTooltip(Some(Tooltip { left: offset })));
        self.store.dispatch(TimelineUpdate::new().hover_time(Some(time)));
    }

    pub fn hide_tooltip(&self) {
        self.store.dispatch(TimelineAction::UpdateTooltip(None));
        self.store.dispatch(TimelineUpdate::new().hover_time(None));
    }

    pub fn set_zoom_region(&self, region: ZoomRegion) {
        self.store.dispatch(TimelineAction::SetZoom(region));
    }

    pub fn set_hovered_point(&self, hovered: Option<HoveredPoint>) {
        let time = match &hovered {
            Some(point) => point.time,
            None => self.store.read(|s| s.timeline.current_time),
        };
        self.graphics.paint_graphics_at_time(time);
        self.store.dispatch(TimelineAction::SetHoveredPoint(hovered));
    }

    pub fn seek(
        &self,
        point: &ExecutionPoint,
        time: f64,
        has_frames: bool,
        pause_id: Option<&PauseId>,
    ) {
        let pause = pause_id.and_then(|id| self.thread.pause_by_id(id));

        // Only frames make the pause panel worth opening
        if has_frames {
            self.store
                .dispatch(AppAction::SetSelectedPrimaryPanel(PrimaryPanel::Debug));
        }

        match pause {
            Some(pause) => self.thread.time_warp_to_pause(&pause),
            None => self.thread.time_warp(point, time, has_frames),
        }
    }

    /// Seek to `time` using the nearest earlier paint or mouse point.
    ///
    /// The warp is sent with the requested time even though the point
    /// belongs to an earlier event. Returns false when there is nothing at
    /// or before `time`.
    pub fn seek_to_time(&self, time: f64) -> bool {
        match self.graphics.most_recent_paint_or_mouse_event(time) {
            Some(event) => {
                self.seek(&event.point, time, false, None);
                true
            }
            None => false,
        }
    }

    pub fn go_to_next_paint(&self) {
        let (current_time, zoom) = self.current_and_zoom();
        if current_time == zoom.end_time {
            return;
        }
        if let Some(next) = self.graphics.next_paint_event(current_time) {
            self.seek_to_time(next.time.min(zoom.end_time));
        }
    }

    pub fn go_to_prev_paint(&self) {
        let (current_time, zoom) = self.current_and_zoom();
        if current_time == zoom.start_time {
            return;
        }
        if let Some(previous) = self.graphics.previous_paint_event(current_time) {
            self.seek_to_time(previous.time.max(zoom.start_time));
        }
    }

    pub fn toggle_playback(&self) {
        if self.store.read(|s| s.timeline.is_playing()) {
            self.stop_playback();
        } else {
            self.start_playback();
        }
    }

    pub fn start_playback(&self) {
        self.start_run(None);
    }

    /// Stop and leave the thread at the last broadcast time
    pub fn stop_playback(&self) {
        tracing::info!("Stop playback");

        let playback = self.store.read(|s| s.timeline.playback);
        if let Some(playback) = playback {
            self.seek_to_time(playback.time);
        }

        self.store.dispatch(TimelineUpdate::new().playback(None));
        if let Some(run) = self.active.lock().take() {
            run.token.cancel();
        }
    }

    /// Rewind to the start of the zoom region and play from there
    pub fn replay_playback(&self) {
        let start_time = self.store.read(|s| s.timeline.zoom_region.start_time);
        self.store
            .dispatch(TimelineUpdate::new().current_time(start_time));
        let warped = self.seek_to_time(start_time);
        self.start_run(warped.then_some(start_time));
    }

    fn start_run(&self, expected_pause: Option<f64>) {
        let (current_time, zoom) = self.current_and_zoom();
        let start_time = if current_time >= zoom.end_time {
            zoom.start_time
        } else {
            zoom.clamp(current_time)
        };
        let start_date = Instant::now();

        tracing::info!(start_time, end_time = zoom.end_time, "Start playback");

        let token = CancellationToken::new();
        let previous = self.active.lock().replace(ActiveRun {
            token: token.clone(),
            expected_pause,
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        self.store.dispatch(
            TimelineUpdate::new()
                .current_time(start_time)
                .playback(Some(Playback {
                    start_time,
                    start_date,
                    time: start_time,
                })),
        );

        tokio::spawn(playback::run(
            self.clone(),
            PlaybackRun {
                start_time,
                end_time: zoom.end_time,
                start_date,
                token,
            },
        ));
    }

    fn current_and_zoom(&self) -> (f64, ZoomRegion) {
        self.store
            .read(|s| (s.timeline.current_time, s.timeline.zoom_region))
    }
}

/// Pull a warp outside the zoom region back to its nearest edge
fn clamp_warp(
    graphics: &dyn GraphicsService,
    zoom: ZoomRegion,
    time: f64,
) -> Option<TimeStampedPoint> {
    if zoom.contains(time) {
        return None;
    }

    if time < zoom.start_time {
        if let Some(event) = graphics.most_recent_paint_or_mouse_event(zoom.start_time) {
            return Some(TimeStampedPoint::new(event.point, zoom.start_time));
        }
    }

    if time > zoom.end_time {
        if let Some(event) = graphics.most_recent_paint_or_mouse_event(zoom.end_time) {
            return Some(TimeStampedPoint::new(event.point, zoom.end_time));
        }
    }

    None
}
