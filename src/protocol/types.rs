use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque position in the recorded execution trace.
///
/// Points are ordered by the protocol, not by us; the UI only ever passes
/// them back to the thread front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionPoint(String);

impl ExecutionPoint {
    pub fn new(point: impl Into<String>) -> Self {
        Self(point.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExecutionPoint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a pause the thread front already knows about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PauseId(String);

impl PauseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a recording
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(String);

impl RecordingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An execution point paired with its recording time (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStampedPoint {
    pub point: ExecutionPoint,
    pub time: f64,
}

impl TimeStampedPoint {
    pub fn new(point: impl Into<ExecutionPoint>, time: f64) -> Self {
        Self {
            point: point.into(),
            time,
        }
    }
}

impl From<String> for ExecutionPoint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A recorded screenshot. `data` is base64 image bytes as sent by the
/// graphics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenShot {
    pub hash: String,
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseEventKind {
    Down,
    Up,
    Move,
}

/// A recorded mouse event, painted on top of the screenshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: f64,
    pub y: f64,
    pub point: ExecutionPoint,
    pub time: f64,
}

/// Result of a graphics lookup; either half may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graphics {
    pub screen: Option<ScreenShot>,
    pub mouse: Option<MouseEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingDescription {
    pub duration: f64,
    #[serde(default)]
    pub last_screen: Option<ScreenShot>,
}

/// A pause known to the thread front
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pause {
    pub id: PauseId,
    pub point: ExecutionPoint,
    pub time: f64,
    #[serde(default)]
    pub has_frames: bool,
}

/// Payload of the thread's `paused` notification
#[derive(Debug, Clone, PartialEq)]
pub struct PauseEventArgs {
    pub point: ExecutionPoint,
    pub time: f64,
    pub has_frames: bool,
}
