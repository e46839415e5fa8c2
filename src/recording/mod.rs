//! Recordings loaded from fixture files

pub mod fixture;
pub mod local;

pub use fixture::{PaintEntry, RecordingError, RecordingFixture, FIXTURE_SCHEMA_VERSION};
pub use local::LocalRecording;
