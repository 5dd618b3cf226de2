//! Bearer token payload decoding.
//!
//! Only the `sub` claim is read, and only to find the account right after
//! login. Signatures are the backend's business.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use freeclub_core::{ClubError, Result};
use serde_json::Value;

/// Extracts the numeric subject (`sub`) from a JWT-shaped token.
pub fn decode_subject(token: &str) -> Result<u64> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ClubError::InvalidToken("token has no payload segment".to_string()))?;

    let trimmed = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD.decode(payload))
        .map_err(|e| ClubError::InvalidToken(format!("payload is not base64: {e}")))?;

    let claims: Value = serde_json::from_slice(&bytes)
        .map_err(|e| ClubError::InvalidToken(format!("payload is not JSON: {e}")))?;

    match claims.get("sub") {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| ClubError::InvalidToken(format!("sub is not an account id: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ClubError::InvalidToken(format!("sub is not an account id: '{s}'"))),
        Some(_) => Err(ClubError::InvalidToken("sub has an unexpected type".to_string())),
        None => Err(ClubError::InvalidToken("payload has no sub claim".to_string())),
    }
}
