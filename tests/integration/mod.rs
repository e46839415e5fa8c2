//! Integration tests for replay-devtools
//!
//! These drive a session over a fixture-backed recording end to end: the
//! store, the controllers and the thread event pump together.

#[path = "../common/mod.rs"]
pub mod common;

pub mod app_flow;
pub mod auth_flow;
pub mod cli_dump;
pub mod playback_flow;
