//! Recording fixtures shared by the integration tests

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use replay_devtools::markup::{EventListener, NodeRecord};
use replay_devtools::protocol::RecordingDescription;
use replay_devtools::{DevtoolsSession, LocalRecording, PlaybackConfig, RecordingFixture};
use tempfile::TempDir;

/// A small page with three paints and an endpoint at 1000 ms.
///
/// ```text
/// #document
///   <html lang="en">        expanded
///     <head>                collapsed, has <title>
///     <body class="main">   expanded
///       "\n  "              whitespace
///       <button id="go">    click listener
///       "hello"
/// ```
pub fn sample_fixture() -> RecordingFixture {
    RecordingFixture::new("rec-sample")
        .with_node(NodeRecord::document("doc"))
        .with_node(
            NodeRecord::element("html", "html")
                .with_parent("doc")
                .with_attribute("lang", "en")
                .expanded(),
        )
        .with_node(NodeRecord::element("head", "head").with_parent("html"))
        .with_node(NodeRecord::element("title", "title").with_parent("head"))
        .with_node(
            NodeRecord::element("body", "body")
                .with_parent("html")
                .with_attribute("class", "main")
                .expanded(),
        )
        .with_node(NodeRecord::text("ws", "\n  ").with_parent("body"))
        .with_node(
            NodeRecord::element("button", "button")
                .with_parent("body")
                .with_attribute("id", "go")
                .with_event_listeners(),
        )
        .with_node(NodeRecord::text("hello", "hello").with_parent("body"))
        .with_listeners(
            "button",
            vec![EventListener::new("click").with_handler("onGo")],
        )
        .with_paint(100.0, "p100", "h100")
        .with_paint(500.0, "p500", "h500")
        .with_paint(900.0, "p900", "h900")
        .with_endpoint("end", 1000.0)
}

/// One second of recording with nothing painted
pub fn blank_fixture() -> RecordingFixture {
    RecordingFixture::new("rec-blank")
        .with_node(NodeRecord::document("doc"))
        .with_node(NodeRecord::element("html", "html").with_parent("doc"))
        .with_description(RecordingDescription {
            duration: 1000.0,
            last_screen: None,
        })
}

pub fn recording(fixture: RecordingFixture) -> Arc<LocalRecording> {
    Arc::new(LocalRecording::from_fixture(fixture).expect("valid fixture"))
}

/// Session over `fixture`, already started
pub async fn started_session(fixture: RecordingFixture) -> (DevtoolsSession, Arc<LocalRecording>) {
    let recording = recording(fixture);
    let mut session = DevtoolsSession::from_recording(recording.clone(), PlaybackConfig::default());
    session.start().await.expect("session starts");
    (session, recording)
}

/// Write `fixture` to a JSONL file in a fresh temp dir
pub fn write_fixture(fixture: &RecordingFixture) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("recording.jsonl");
    fixture
        .write_jsonl_to_path(&path)
        .expect("Failed to write fixture");
    (dir, path)
}

/// Let spawned tasks (the event pump, tooltip loads, saves) run to idle
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance a paused clock by `ms`, running timers along the way
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
