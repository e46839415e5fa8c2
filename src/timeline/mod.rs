//! Timeline: state, playback loop and controller

pub mod controller;
pub mod playback;
pub mod state;

pub use controller::Timeline;
pub use playback::PlaybackConfig;
pub use state::{
    HoveredPoint, Playback, TimelineAction, TimelineDimensions, TimelineState, TimelineUpdate,
    Tooltip, ZoomRegion,
};
