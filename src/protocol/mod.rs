//! Seams to the remote debugging protocol
//!
//! The devtools never talk to the wire directly; they go through the
//! [`ThreadFront`] and [`GraphicsService`] traits. The `recording` module
//! provides an in-process implementation of both.

pub mod error;
pub mod graphics;
pub mod thread;
pub mod types;

pub use error::ProtocolError;
pub use graphics::{GraphicsService, PaintIndex};
pub use thread::{ThreadEvent, ThreadFront, WarpCallback};
pub use types::{
    ExecutionPoint, Graphics, MouseEvent, MouseEventKind, Pause, PauseEventArgs, PauseId,
    RecordingDescription, RecordingId, ScreenShot, TimeStampedPoint,
};
