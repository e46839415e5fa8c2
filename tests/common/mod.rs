//! Shared test utilities
//!
//! - Recording fixtures and started sessions
//! - Fake auth clients and comment stores
//! - TUI rendering helpers

pub mod fakes;
pub mod fixtures;
pub mod terminal;
