//! Just enough JWT handling to schedule renewals. Signatures are not checked;
//! the token is only read to find its expiry.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use super::error::AuthError;

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// The `exp` claim, in seconds since the epoch
pub fn decode_exp(token: &str) -> Result<i64, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken("missing payload segment".into()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    Ok(claims.exp)
}

/// Time to wait before renewing a token expiring at `exp_secs`
pub fn refresh_delay(exp_secs: i64, now_ms: i64, margin_secs: u64) -> Duration {
    let refresh_at_ms = (exp_secs - margin_secs as i64).saturating_mul(1000);
    let delay = refresh_at_ms.saturating_sub(now_ms).max(0);
    Duration::from_millis(delay as u64)
}
