//! Access tokens for the comment service

pub mod client;
pub mod error;
pub mod jwt;
pub mod token;

pub use client::{AuthClient, AuthConfig, StaticTokenClient, TOKEN_ENV_VAR};
pub use error::AuthError;
pub use token::{ListenerId, TokenListener, TokenManager, TokenState};
