use async_trait::async_trait;

use super::error::AuthError;

/// Identity provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: String,
    /// How long before `exp` the token is renewed
    pub refresh_seconds_before_expiry: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: "webreplay.us.auth0.com".to_string(),
            client_id: String::new(),
            audience: "hasura-api".to_string(),
            refresh_seconds_before_expiry: 60,
        }
    }
}

/// The identity provider's client
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// The client is still restoring its session
    fn is_loading(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    async fn access_token_silently(
        &self,
        audience: &str,
        ignore_cache: bool,
    ) -> Result<String, AuthError>;

    async fn access_token_with_popup(
        &self,
        audience: &str,
        ignore_cache: bool,
    ) -> Result<String, AuthError>;
}

/// Environment variable read by [`StaticTokenClient::from_env`]
pub const TOKEN_ENV_VAR: &str = "REPLAY_API_TOKEN";

/// Client for a terminal session: a pre-issued token, or no user at all.
/// There is no browser to show a login popup in.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenClient {
    token: Option<String>,
}

impl StaticTokenClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(TOKEN_ENV_VAR).ok())
    }
}

#[async_trait]
impl AuthClient for StaticTokenClient {
    fn is_loading(&self) -> bool {
        false
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn access_token_silently(
        &self,
        _audience: &str,
        _ignore_cache: bool,
    ) -> Result<String, AuthError> {
        self.token
            .clone()
            .ok_or_else(|| AuthError::provider("login_required", "No token configured"))
    }

    async fn access_token_with_popup(
        &self,
        _audience: &str,
        _ignore_cache: bool,
    ) -> Result<String, AuthError> {
        Err(AuthError::provider(
            "popup_unavailable",
            format!("Interactive login is not supported; set {TOKEN_ENV_VAR}"),
        ))
    }
}
