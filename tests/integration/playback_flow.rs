//! Timeline: seeking, paint stepping, hover previews and the playback loop,
//! driven through a started session on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use super::common::fixtures::{advance, blank_fixture, sample_fixture, settle, started_session};
use replay_devtools::protocol::{
    ExecutionPoint, GraphicsService, MouseEvent, MouseEventKind, Pause, PauseId,
};
use replay_devtools::store::PrimaryPanel;
use replay_devtools::{DevtoolsSession, LocalRecording, PlaybackConfig, ZoomRegion};

fn screenshot_hash(session: &replay_devtools::DevtoolsSession) -> Option<String> {
    session
        .store()
        .read(|s| s.timeline.screenshot.as_ref().map(|screen| screen.hash.clone()))
}

#[tokio::test(start_paused = true)]
async fn test_setup_loads_duration_and_endpoint() {
    let (session, _recording) = started_session(sample_fixture()).await;

    let timeline = session.store().snapshot().timeline;
    assert_eq!(timeline.recording_duration, Some(1000.0));
    assert_eq!(timeline.current_time, 1000.0);
    assert_eq!(timeline.zoom_region, ZoomRegion::new(0.0, 1000.0));
    assert!(!timeline.is_playing());
    // Last screen from the description
    assert_eq!(screenshot_hash(&session).as_deref(), Some("h900"));
}

#[tokio::test(start_paused = true)]
async fn test_endpoint_registers_last_screen_as_paint() {
    let (_session, recording) = started_session(sample_fixture()).await;

    let last = recording.most_recent_paint_or_mouse_event(1000.0).unwrap();
    assert_eq!(last.time, 1000.0);
    assert_eq!(last.point.as_str(), "end");
}

#[tokio::test(start_paused = true)]
async fn test_seek_lands_on_most_recent_paint() {
    let (session, _recording) = started_session(sample_fixture()).await;

    assert!(session.timeline().seek_to_time(650.0));
    settle().await;

    // The warp carries the requested time with the earlier paint's point
    assert_eq!(session.store().read(|s| s.timeline.current_time), 650.0);
    assert_eq!(screenshot_hash(&session).as_deref(), Some("h500"));
    assert_eq!(session.thread().current_point().as_str(), "p500");
}

#[tokio::test(start_paused = true)]
async fn test_seek_before_first_paint_does_nothing() {
    let (session, _recording) = started_session(sample_fixture()).await;

    assert!(!session.timeline().seek_to_time(50.0));
    settle().await;

    assert_eq!(session.store().read(|s| s.timeline.current_time), 1000.0);
}

#[tokio::test(start_paused = true)]
async fn test_warp_outside_zoom_is_clamped_to_edge() {
    let (session, _recording) = started_session(sample_fixture()).await;
    session
        .timeline()
        .set_zoom_region(ZoomRegion::new(200.0, 800.0));

    assert!(session.timeline().seek_to_time(950.0));
    settle().await;

    assert_eq!(session.store().read(|s| s.timeline.current_time), 800.0);
    assert_eq!(session.thread().current_point().as_str(), "p500");
}

#[tokio::test(start_paused = true)]
async fn test_paint_stepping() {
    let (session, _recording) = started_session(sample_fixture()).await;
    let timeline = session.timeline();

    timeline.seek_to_time(650.0);
    settle().await;

    timeline.go_to_next_paint();
    settle().await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), 900.0);

    timeline.go_to_prev_paint();
    settle().await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), 500.0);

    timeline.go_to_prev_paint();
    settle().await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), 100.0);

    // Nothing painted before 100
    timeline.go_to_prev_paint();
    settle().await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_next_paint_is_noop_at_zoom_end() {
    let (session, _recording) = started_session(sample_fixture()).await;

    session.timeline().go_to_next_paint();
    settle().await;

    assert_eq!(session.store().read(|s| s.timeline.current_time), 1000.0);
}

#[tokio::test(start_paused = true)]
async fn test_hover_paints_and_shows_tooltip() {
    let (session, recording) = started_session(sample_fixture()).await;
    let painted = recording.paint_count();

    session.timeline().set_timeline_to_time(300.0, 42.0);
    let timeline = session.store().snapshot().timeline;
    assert_eq!(timeline.hover_time, Some(300.0));
    assert_eq!(timeline.tooltip.map(|t| t.left), Some(42.0));
    assert_eq!(recording.paint_count(), painted + 1);

    session.timeline().hide_tooltip();
    let timeline = session.store().snapshot().timeline;
    assert_eq!(timeline.hover_time, None);
    assert_eq!(timeline.tooltip, None);
}

#[tokio::test(start_paused = true)]
async fn test_playback_without_snapshots_follows_the_clock() {
    let (session, _recording) = started_session(blank_fixture()).await;
    assert_eq!(
        session.store().read(|s| s.timeline.zoom_region),
        ZoomRegion::new(0.0, 1000.0)
    );

    // At the end already, so playback restarts from the zoom start
    session.timeline().start_playback();
    assert_eq!(session.store().read(|s| s.timeline.current_time), 0.0);

    advance(400).await;
    let timeline = session.store().snapshot().timeline;
    assert!(timeline.is_playing());
    assert!(
        (timeline.current_time - 400.0).abs() <= 16.0,
        "current time {} should track the clock",
        timeline.current_time
    );

    advance(700).await;
    settle().await;
    let timeline = session.store().snapshot().timeline;
    assert!(!timeline.is_playing());
    assert_eq!(timeline.current_time, 1000.0);
}

#[tokio::test(start_paused = true)]
async fn test_playback_before_zoom_starts_at_zoom_start() {
    let (session, _recording) = started_session(sample_fixture()).await;
    assert!(session.timeline().seek_to_time(150.0));
    settle().await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), 150.0);

    session
        .timeline()
        .set_zoom_region(ZoomRegion::new(500.0, 1000.0));
    session.timeline().start_playback();
    assert_eq!(session.store().read(|s| s.timeline.current_time), 500.0);

    advance(50).await;
    let timeline = session.store().snapshot().timeline;
    assert!(timeline.is_playing());
    assert!(
        timeline.current_time >= 500.0 && timeline.current_time <= 1000.0,
        "current time {} left the zoom region",
        timeline.current_time
    );
}

#[tokio::test(start_paused = true)]
async fn test_playback_is_monotonic_and_ends_idle() {
    let (session, recording) = started_session(sample_fixture()).await;
    let painted = recording.paint_count();

    session.timeline().toggle_playback();

    let mut times = Vec::new();
    for _ in 0..200 {
        advance(10).await;
        let (time, playing) = session
            .store()
            .read(|s| (s.timeline.current_time, s.timeline.is_playing()));
        times.push(time);
        if !playing {
            break;
        }
    }
    settle().await;

    assert!(
        times.windows(2).all(|w| w[0] <= w[1]),
        "time went backwards: {times:?}"
    );
    let timeline = session.store().snapshot().timeline;
    assert!(!timeline.is_playing());
    assert_eq!(timeline.current_time, 1000.0);
    // Each paint was drawn as playback crossed it
    assert!(recording.paint_count() >= painted + 3);
}

#[tokio::test(start_paused = true)]
async fn test_stop_leaves_thread_at_last_broadcast_time() {
    let (session, _recording) = started_session(sample_fixture()).await;

    session.timeline().toggle_playback();
    advance(300).await;

    let last = session
        .store()
        .read(|s| s.timeline.playback.map(|p| p.time))
        .expect("playing");
    session.timeline().toggle_playback();
    settle().await;

    let timeline = session.store().snapshot().timeline;
    assert!(timeline.playback.is_none());
    assert_eq!(timeline.current_time, last);

    // The loop is gone: time no longer moves
    advance(200).await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), last);
}

#[tokio::test(start_paused = true)]
async fn test_replay_restarts_from_zoom_start() {
    let (session, _recording) = started_session(sample_fixture()).await;
    session
        .timeline()
        .set_zoom_region(ZoomRegion::new(200.0, 1000.0));
    session.timeline().seek_to_time(650.0);
    settle().await;

    session.timeline().replay_playback();
    settle().await;

    // Its own warp to the start must not stop the new run
    let timeline = session.store().snapshot().timeline;
    let playback = timeline.playback.expect("still playing");
    assert_eq!(playback.start_time, 200.0);

    advance(100).await;
    let time = session.store().read(|s| s.timeline.current_time);
    assert!(time > 200.0 && time <= 316.0, "unexpected time {time}");
}

#[tokio::test(start_paused = true)]
async fn test_pause_from_thread_stops_playback() {
    let (session, _recording) = started_session(sample_fixture()).await;

    session.timeline().toggle_playback();
    advance(100).await;

    // A seek elsewhere (console message, breakpoint) pauses the thread
    session.timeline().seek_to_time(900.0);
    settle().await;

    let timeline = session.store().snapshot().timeline;
    assert!(!timeline.is_playing());
    assert_eq!(timeline.current_time, 900.0);

    advance(200).await;
    assert_eq!(session.store().read(|s| s.timeline.current_time), 900.0);
}

#[tokio::test(start_paused = true)]
async fn test_seek_uses_mouse_events_and_paints_cursor() {
    let fixture = sample_fixture().with_mouse(MouseEvent {
        kind: MouseEventKind::Down,
        x: 12.0,
        y: 34.0,
        point: ExecutionPoint::new("m300"),
        time: 300.0,
    });
    let (session, _recording) = started_session(fixture).await;

    assert!(session.timeline().seek_to_time(350.0));
    settle().await;

    assert_eq!(session.thread().current_point().as_str(), "m300");
    let timeline = session.store().snapshot().timeline;
    assert_eq!(timeline.current_time, 350.0);
    assert_eq!(timeline.screenshot.map(|s| s.hash).as_deref(), Some("h100"));
    let mouse = timeline.mouse.expect("mouse painted");
    assert_eq!((mouse.x, mouse.y), (12.0, 34.0));
}

#[tokio::test(start_paused = true)]
async fn test_seek_to_known_pause_restores_it() {
    let fixture = sample_fixture().with_pause(Pause {
        id: PauseId::new("pause-1"),
        point: ExecutionPoint::new("p-pause"),
        time: 420.0,
        has_frames: true,
    });
    let (session, _recording) = started_session(fixture).await;

    session.timeline().seek(
        &ExecutionPoint::new("ignored"),
        0.0,
        true,
        Some(&PauseId::new("pause-1")),
    );
    settle().await;

    assert_eq!(session.thread().current_point().as_str(), "p-pause");
    assert!(session.thread().current_point_has_frames());
    let snapshot = session.store().snapshot();
    assert_eq!(snapshot.timeline.current_time, 420.0);
    assert_eq!(snapshot.app.selected_primary_panel, PrimaryPanel::Debug);

    // Unknown ids fall back to a plain warp
    session.timeline().seek(
        &ExecutionPoint::new("p100"),
        150.0,
        false,
        Some(&PauseId::new("missing")),
    );
    settle().await;
    assert_eq!(session.thread().current_point().as_str(), "p100");
    assert_eq!(session.store().read(|s| s.timeline.current_time), 150.0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_snapshot_rebaselines_clock() {
    let recording = Arc::new(
        LocalRecording::from_fixture(sample_fixture())
            .unwrap()
            .with_fetch_latency(Duration::from_millis(400)),
    );
    let mut session = DevtoolsSession::from_recording(recording, PlaybackConfig::default());
    session.start().await.unwrap();
    settle().await;

    // From the end, playback restarts at 0 and first waits on the paint at 100
    session.timeline().toggle_playback();
    advance(500).await;

    let timeline = session.store().snapshot().timeline;
    assert!(timeline.is_playing());
    let playback = timeline.playback.unwrap();
    assert!(playback.start_time >= 100.0, "not re-baselined: {playback:?}");
    // Without the re-baseline the clock would read about 500 here
    assert!(
        timeline.current_time < 300.0,
        "unexpected time {}",
        timeline.current_time
    );
}
