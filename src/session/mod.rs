//! A devtools session over one recording
//!
//! Owns the store and the controllers, and runs the task that feeds thread
//! notifications (pauses, endpoint, markup mutations) into them in order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::markup::MarkupController;
use crate::protocol::{GraphicsService, ProtocolError, RecordingId, ThreadEvent, ThreadFront};
use crate::recording::LocalRecording;
use crate::store::{AppAction, Store};
use crate::timeline::{PlaybackConfig, Timeline};

pub struct DevtoolsSession {
    store: Store,
    recording_id: RecordingId,
    thread: Arc<dyn ThreadFront>,
    timeline: Timeline,
    markup: MarkupController,
    events: Option<mpsc::UnboundedReceiver<ThreadEvent>>,
    initial_events: Vec<ThreadEvent>,
    pump: Option<JoinHandle<()>>,
}

impl DevtoolsSession {
    pub fn new(
        recording_id: RecordingId,
        graphics: Arc<dyn GraphicsService>,
        thread: Arc<dyn ThreadFront>,
        events: mpsc::UnboundedReceiver<ThreadEvent>,
        config: PlaybackConfig,
    ) -> Self {
        let store = Store::default();
        let timeline = Timeline::new(store.clone(), graphics, thread.clone(), config);
        let markup = MarkupController::new(store.clone(), thread.clone());

        Self {
            store,
            recording_id,
            thread,
            timeline,
            markup,
            events: Some(events),
            initial_events: Vec::new(),
            pump: None,
        }
    }

    /// Session over a fixture-backed recording. Its markup tree and endpoint
    /// are applied during [`start`](Self::start).
    pub fn from_recording(recording: Arc<LocalRecording>, config: PlaybackConfig) -> Self {
        let (events, initial_events) = match recording.take_events() {
            Some(events) => (events, recording.initial_events()),
            None => {
                tracing::warn!("Recording events already taken; session will not see pauses");
                (mpsc::unbounded_channel().1, recording.initial_events())
            }
        };

        let mut session = Self::new(
            recording.recording_id().clone(),
            recording.clone(),
            recording,
            events,
            config,
        );
        session.initial_events = initial_events;
        session
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn recording_id(&self) -> &RecordingId {
        &self.recording_id
    }

    pub fn thread(&self) -> Arc<dyn ThreadFront> {
        self.thread.clone()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn markup(&self) -> &MarkupController {
        &self.markup
    }

    /// Load the recording into the store and start listening to the thread
    pub async fn start(&mut self) -> Result<(), ProtocolError> {
        tracing::info!(recording_id = %self.recording_id, "Starting devtools session");

        self.store
            .dispatch(AppAction::SetupApp(self.recording_id.clone()));
        self.store
            .dispatch(AppAction::SetSessionId(uuid::Uuid::new_v4().to_string()));

        self.timeline.setup().await?;

        for event in std::mem::take(&mut self.initial_events) {
            handle_event(&self.timeline, &self.markup, event).await;
        }

        if let Some(mut events) = self.events.take() {
            let timeline = self.timeline.clone();
            let markup = self.markup.clone();
            self.pump = Some(tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    handle_event(&timeline, &markup, event).await;
                }
                tracing::debug!("Thread event stream closed");
            }));
        }

        self.store.dispatch(AppAction::Loading(100));
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if self.store.read(|s| s.timeline.is_playing()) {
            self.timeline.stop_playback();
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Drop for DevtoolsSession {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

async fn handle_event(timeline: &Timeline, markup: &MarkupController, event: ThreadEvent) {
    match event {
        ThreadEvent::Paused(args) => timeline.on_paused(args).await,
        ThreadEvent::Endpoint(endpoint) => timeline.on_endpoint(endpoint),
        ThreadEvent::Markup(event) => markup.apply_event(event),
    }
}
