//! Frame-paced playback loop
//!
//! One run is spawned per `start_playback`. It advances `current_time` from
//! the wall clock, prefetches the next snapshot ahead of time and paints it
//! when playback reaches it. A run ends when its token is cancelled, when
//! `playback` is cleared in the store, or when it passes the end time.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use super::controller::Timeline;
use super::state::{Playback, TimelineUpdate};
use crate::protocol::{Graphics, ProtocolError};

/// Loop pacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Time between ticks
    pub frame_interval: Duration,
    /// A snapshot wait longer than this re-baselines the clock
    pub stall_threshold: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            stall_threshold: Duration::from_millis(100),
        }
    }
}

/// Parameters of a single run
#[derive(Debug, Clone)]
pub(crate) struct PlaybackRun {
    pub start_time: f64,
    pub end_time: f64,
    pub start_date: Instant,
    pub token: CancellationToken,
}

type Prefetch = JoinHandle<Result<Graphics, ProtocolError>>;

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

fn prefetch(timeline: &Timeline, time: f64) -> Prefetch {
    let graphics = timeline.graphics();
    tokio::spawn(async move { graphics.get_graphics_at_time(time, true).await })
}

fn next_graphics_time(timeline: &Timeline, current_time: f64, end_time: f64) -> f64 {
    timeline
        .graphics()
        .next_paint_or_mouse_event(current_time)
        .map(|event| event.time)
        .unwrap_or(end_time)
}

pub(crate) async fn run(timeline: Timeline, run: PlaybackRun) {
    let PlaybackRun {
        mut start_time,
        end_time,
        mut start_date,
        token,
    } = run;
    let config = timeline.playback_config();
    let store = timeline.store();

    let mut current_time = start_time;
    let mut next_time = next_graphics_time(&timeline, current_time, end_time);
    let mut pending = prefetch(&timeline, next_time);

    tracing::debug!(start_time, end_time, "Playback loop started");

    while timeline.is_live(&token) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = sleep(config.frame_interval) => {}
        }
        if !timeline.is_live(&token) {
            return;
        }

        let tick = Instant::now();
        current_time = start_time + elapsed_ms(start_date);

        if current_time > end_time {
            tracing::info!(end_time, "Finish playback");
            timeline.seek_to_time(end_time);
            store.dispatch(
                TimelineUpdate::new()
                    .current_time(end_time)
                    .playback(None),
            );
            return;
        }

        store.dispatch(
            TimelineUpdate::new()
                .current_time(current_time)
                .playback(Some(Playback {
                    start_time,
                    start_date,
                    time: current_time,
                })),
        );

        if current_time < next_time {
            continue;
        }

        let graphics = match pending.await {
            Ok(Ok(graphics)) => Some(graphics),
            Ok(Err(e)) => {
                tracing::debug!(time = next_time, error = %e, "Snapshot fetch failed");
                None
            }
            Err(e) => {
                tracing::debug!(time = next_time, error = %e, "Snapshot task failed");
                None
            }
        };

        if !timeline.is_live(&token) {
            return;
        }

        // Waiting on the snapshot would make the next tick jump ahead; restart
        // the clock from here instead.
        if tick.elapsed() > config.stall_threshold {
            start_time = current_time;
            start_date = Instant::now();
            tracing::debug!(current_time, "Playback stalled, re-baselining");
            store.dispatch(
                TimelineUpdate::new()
                    .current_time(current_time)
                    .playback(Some(Playback {
                        start_time,
                        start_date,
                        time: current_time,
                    })),
            );
        }

        if let Some(Graphics {
            screen: Some(screen),
            mouse,
        }) = graphics
        {
            timeline.graphics().paint_graphics(&screen, mouse.as_ref());
        }

        next_time = next_graphics_time(&timeline, current_time, end_time);
        pending = prefetch(&timeline, next_time);
    }
}
