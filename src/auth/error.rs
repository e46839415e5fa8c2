use thiserror::Error;

/// Failures from the identity provider or the token manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The provider rejected the request; `code` is its machine-readable
    /// error string (`login_required`, `consent_required`, ...)
    #[error("{code}: {message}")]
    Provider { code: String, message: String },

    #[error("Malformed access token: {0}")]
    InvalidToken(String),

    #[error("Token manager disposed")]
    Disposed,
}

impl AuthError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Silent renewal failed in a way the popup flow can recover from
    pub fn needs_interaction(&self) -> bool {
        matches!(self.code(), Some("login_required" | "consent_required"))
    }
}
