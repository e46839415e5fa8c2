//! Recording fixture file format
//!
//! A fixture is JSONL: one header line, then one tagged entry per line. It
//! captures everything the devtools need from a recording without a live
//! protocol connection: the DOM at the paused point, paint and mouse events
//! with their screenshots, known pauses and event listeners.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::markup::{EventListener, NodeId, NodeRecord};
use crate::protocol::{
    ExecutionPoint, MouseEvent, Pause, RecordingDescription, RecordingId, ScreenShot,
    TimeStampedPoint,
};

pub const FIXTURE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("Failed to read recording: {0}")]
    Io(#[from] io::Error),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Missing fixture header")]
    MissingHeader,

    #[error("Fixture header must be the first line")]
    HeaderNotFirst,

    #[error("Unsupported fixture schema version {0}")]
    UnsupportedSchema(u32),

    #[error("Fixture has no root node")]
    NoRoot,
}

/// A paint event with the screenshot it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintEntry {
    pub time: f64,
    pub point: ExecutionPoint,
    pub screen: ScreenShot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FixtureLine {
    Header {
        schema_version: u32,
        recording_id: RecordingId,
        created_at_ms: u64,
    },
    Description {
        description: RecordingDescription,
    },
    Endpoint {
        point: ExecutionPoint,
        time: f64,
    },
    Node {
        node: NodeRecord,
    },
    Paint {
        paint: PaintEntry,
    },
    Mouse {
        event: MouseEvent,
    },
    Pause {
        pause: Pause,
    },
    Listeners {
        node_id: NodeId,
        listeners: Vec<EventListener>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingFixture {
    pub schema_version: u32,
    pub recording_id: RecordingId,
    pub created_at_ms: u64,
    pub description: Option<RecordingDescription>,
    pub endpoint: Option<TimeStampedPoint>,
    /// Nodes in document order; the first node without a parent is the root
    pub nodes: Vec<NodeRecord>,
    pub paints: Vec<PaintEntry>,
    pub mouse: Vec<MouseEvent>,
    pub pauses: Vec<Pause>,
    pub listeners: HashMap<NodeId, Vec<EventListener>>,
}

impl RecordingFixture {
    pub fn new(recording_id: impl Into<String>) -> Self {
        Self {
            schema_version: FIXTURE_SCHEMA_VERSION,
            recording_id: RecordingId::new(recording_id),
            created_at_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
            ..Default::default()
        }
    }

    pub fn with_node(mut self, node: NodeRecord) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_paint(mut self, time: f64, point: impl Into<ExecutionPoint>, hash: &str) -> Self {
        self.paints.push(PaintEntry {
            time,
            point: point.into(),
            screen: ScreenShot {
                hash: hash.to_string(),
                mime_type: "image/jpeg".to_string(),
                data: String::new(),
            },
        });
        self
    }

    pub fn with_mouse(mut self, event: MouseEvent) -> Self {
        self.mouse.push(event);
        self
    }

    pub fn with_pause(mut self, pause: Pause) -> Self {
        self.pauses.push(pause);
        self
    }

    pub fn with_listeners(mut self, node_id: impl Into<NodeId>, listeners: Vec<EventListener>) -> Self {
        self.listeners.insert(node_id.into(), listeners);
        self
    }

    pub fn with_description(mut self, description: RecordingDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_endpoint(mut self, point: impl Into<ExecutionPoint>, time: f64) -> Self {
        self.endpoint = Some(TimeStampedPoint::new(point, time));
        self
    }

    /// The recorded description, or one derived from the last event
    pub fn effective_description(&self) -> RecordingDescription {
        if let Some(description) = &self.description {
            return description.clone();
        }

        let last_paint = self.paints.iter().max_by(|a, b| a.time.total_cmp(&b.time));
        let last_mouse = self.mouse.iter().map(|m| m.time).fold(0.0_f64, f64::max);
        let duration = last_paint.map(|p| p.time).unwrap_or(0.0).max(last_mouse);

        RecordingDescription {
            duration,
            last_screen: last_paint.map(|p| p.screen.clone()),
        }
    }

    pub fn write_jsonl_to_path(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut lines = vec![FixtureLine::Header {
            schema_version: self.schema_version,
            recording_id: self.recording_id.clone(),
            created_at_ms: self.created_at_ms,
        }];
        if let Some(description) = &self.description {
            lines.push(FixtureLine::Description {
                description: description.clone(),
            });
        }
        if let Some(endpoint) = &self.endpoint {
            lines.push(FixtureLine::Endpoint {
                point: endpoint.point.clone(),
                time: endpoint.time,
            });
        }
        lines.extend(self.nodes.iter().cloned().map(|node| FixtureLine::Node { node }));
        lines.extend(self.paints.iter().cloned().map(|paint| FixtureLine::Paint { paint }));
        lines.extend(self.mouse.iter().cloned().map(|event| FixtureLine::Mouse { event }));
        lines.extend(self.pauses.iter().cloned().map(|pause| FixtureLine::Pause { pause }));

        let mut listeners: Vec<_> = self.listeners.iter().collect();
        listeners.sort_by(|a, b| a.0.cmp(b.0));
        lines.extend(listeners.into_iter().map(|(node_id, listeners)| {
            FixtureLine::Listeners {
                node_id: node_id.clone(),
                listeners: listeners.clone(),
            }
        }));

        for line in &lines {
            writeln!(
                writer,
                "{}",
                serde_json::to_string(line).map_err(io::Error::other)?
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_jsonl_from_path(path: &Path) -> Result<Self, RecordingError> {
        let file = File::open(path)?;
        Self::read_jsonl(BufReader::new(file))
    }

    pub fn read_jsonl(reader: impl BufRead) -> Result<Self, RecordingError> {
        let mut fixture: Option<Self> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: FixtureLine =
                serde_json::from_str(&line).map_err(|e| RecordingError::Parse {
                    line: idx + 1,
                    message: e.to_string(),
                })?;

            if let FixtureLine::Header {
                schema_version,
                recording_id,
                created_at_ms,
            } = parsed
            {
                if fixture.is_some() {
                    return Err(RecordingError::HeaderNotFirst);
                }
                if schema_version != FIXTURE_SCHEMA_VERSION {
                    return Err(RecordingError::UnsupportedSchema(schema_version));
                }
                fixture = Some(Self {
                    schema_version,
                    recording_id,
                    created_at_ms,
                    ..Default::default()
                });
                continue;
            }

            let fixture = fixture.as_mut().ok_or(RecordingError::MissingHeader)?;
            match parsed {
                FixtureLine::Header { .. } => {}
                FixtureLine::Description { description } => fixture.description = Some(description),
                FixtureLine::Endpoint { point, time } => {
                    fixture.endpoint = Some(TimeStampedPoint { point, time })
                }
                FixtureLine::Node { node } => fixture.nodes.push(node),
                FixtureLine::Paint { paint } => fixture.paints.push(paint),
                FixtureLine::Mouse { event } => fixture.mouse.push(event),
                FixtureLine::Pause { pause } => fixture.pauses.push(pause),
                FixtureLine::Listeners { node_id, listeners } => {
                    fixture.listeners.insert(node_id, listeners);
                }
            }
        }

        fixture.ok_or(RecordingError::MissingHeader)
    }
}
