//! Admin session tokens.
//!
//! A token is the standard base64 encoding of
//! `{"email": ..., "timestamp": <issued-at epoch millis>, "nonce": ...}`.
//! It is not signed: anyone who knows the format can mint one for any
//! allow-listed email. Validity is a pure function of the token, the clock and
//! the operator allow-list; there is no server-side session table and no
//! revocation, tokens simply expire.

pub mod gate;

use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use gate::{admin_gate, AdminSession};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "admin_session";

/// Alternate header carrier for clients that cannot set cookies.
pub const SESSION_HEADER: &str = "x-admin-session";

/// Tokens older than this are rejected.
pub const SESSION_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

const NONCE_LEN: usize = 32;

/// Decoded token payload. Every field is optional on the wire so that a
/// missing field is distinguishable from a malformed token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
}

/// Identity asserted by a token that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClaims {
    pub email: String,
    pub issued_at_millis: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no session token presented")]
    Missing,
    #[error("session token is not valid base64 JSON")]
    Malformed,
    #[error("session token is missing `{0}`")]
    MissingField(&'static str),
    #[error("session expired")]
    Expired,
    #[error("identity is not an authorized operator")]
    UnknownIdentity,
}

/// Encodes and validates session tokens against the operator allow-list.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    allowed: Arc<[String]>,
}

impl SessionCodec {
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        self.allowed.iter().any(|a| a == email)
    }

    /// Mints a token for `email` issued now.
    pub fn encode(&self, email: &str) -> String {
        self.encode_at(email, Utc::now().timestamp_millis())
    }

    pub fn encode_at(&self, email: &str, issued_at_millis: i64) -> String {
        let payload = TokenPayload {
            email: Some(email.to_string()),
            timestamp: Some(issued_at_millis),
            nonce: Some(Alphanumeric.sample_string(&mut rand::rng(), NONCE_LEN)),
        };
        // Serializing a struct of strings and integers cannot fail.
        let json = serde_json::to_vec(&payload).unwrap_or_default();
        STANDARD.encode(json)
    }

    pub fn decode_and_validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.decode_and_validate_at(token, Utc::now().timestamp_millis())
    }

    /// Checks, in order: all fields present, age within [`SESSION_TTL_MILLIS`],
    /// email on the allow-list. Any decoding failure fails closed.
    pub fn decode_and_validate_at(
        &self,
        token: &str,
        now_millis: i64,
    ) -> Result<SessionClaims, SessionError> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|_| SessionError::Malformed)?;
        let payload: TokenPayload =
            serde_json::from_slice(&bytes).map_err(|_| SessionError::Malformed)?;

        let email = payload.email.ok_or(SessionError::MissingField("email"))?;
        let issued_at = payload
            .timestamp
            .ok_or(SessionError::MissingField("timestamp"))?;
        payload.nonce.ok_or(SessionError::MissingField("nonce"))?;

        if now_millis.saturating_sub(issued_at) > SESSION_TTL_MILLIS {
            return Err(SessionError::Expired);
        }
        if !self.is_allowed(&email) {
            return Err(SessionError::UnknownIdentity);
        }

        Ok(SessionClaims {
            email,
            issued_at_millis: issued_at,
        })
    }
}

/// Finds the session token on a request: cookie first, then
/// `Authorization: Bearer`, then the `x-admin-session` header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    if let Some(bearer) = extract_bearer(headers) {
        return Some(bearer);
    }

    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Extract bearer credential from the Authorization header.
/// The credential is everything after `"Bearer "`, untrimmed.
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// `Set-Cookie` value installing a fresh session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_TTL_MILLIS / 1000
    )
}

/// `Set-Cookie` value clearing the session.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; SameSite=Lax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const HOUR: i64 = 60 * 60 * 1000;

    fn codec() -> SessionCodec {
        SessionCodec::new(["ops@firm.example".to_string()])
    }

    fn raw_token(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn test_token_issued_an_hour_ago_is_valid() {
        let now = 1_700_000_000_000;
        let token = codec().encode_at("ops@firm.example", now - HOUR);
        let claims = codec().decode_and_validate_at(&token, now).unwrap();
        assert_eq!(claims.email, "ops@firm.example");
        assert_eq!(claims.issued_at_millis, now - HOUR);
    }

    #[test]
    fn test_token_issued_25_hours_ago_is_expired() {
        let now = 1_700_000_000_000;
        let token = codec().encode_at("ops@firm.example", now - 25 * HOUR);
        assert_eq!(
            codec().decode_and_validate_at(&token, now),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn test_token_at_exactly_24_hours_is_still_valid() {
        let now = 1_700_000_000_000;
        let token = codec().encode_at("ops@firm.example", now - SESSION_TTL_MILLIS);
        assert!(codec().decode_and_validate_at(&token, now).is_ok());
        assert_eq!(
            codec().decode_and_validate_at(&token, now + 1),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn test_unknown_identity_is_rejected_regardless_of_age() {
        let now = 1_700_000_000_000;
        for age in [0, HOUR, 23 * HOUR] {
            let token = codec().encode_at("intruder@elsewhere.example", now - age);
            assert_eq!(
                codec().decode_and_validate_at(&token, now),
                Err(SessionError::UnknownIdentity)
            );
        }
    }

    #[test]
    fn test_malformed_tokens_fail_closed() {
        let codec = codec();
        let tokens = vec![
            String::new(),
            "%%%not-base64%%%".to_string(),
            STANDARD.encode("not json"),
            STANDARD.encode("[1,2]"),
        ];
        for token in &tokens {
            assert_eq!(
                codec.decode_and_validate_at(token, 0),
                Err(SessionError::Malformed),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_missing_fields_are_reported_in_order() {
        let codec = codec();
        assert_eq!(
            codec.decode_and_validate_at(&raw_token(r#"{"timestamp":1,"nonce":"x"}"#), 1),
            Err(SessionError::MissingField("email"))
        );
        assert_eq!(
            codec.decode_and_validate_at(&raw_token(r#"{"email":"ops@firm.example","nonce":"x"}"#), 1),
            Err(SessionError::MissingField("timestamp"))
        );
        assert_eq!(
            codec.decode_and_validate_at(&raw_token(r#"{"email":"ops@firm.example","timestamp":1}"#), 1),
            Err(SessionError::MissingField("nonce"))
        );
    }

    #[test]
    fn test_expiry_is_checked_before_identity() {
        let now = 1_700_000_000_000;
        let token = codec().encode_at("intruder@elsewhere.example", now - 48 * HOUR);
        assert_eq!(
            codec().decode_and_validate_at(&token, now),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn test_encode_uses_fresh_nonce() {
        let codec = codec();
        assert_ne!(
            codec.encode_at("ops@firm.example", 5),
            codec.encode_at("ops@firm.example", 5)
        );
    }

    #[test]
    fn test_extract_prefers_cookie_then_bearer_then_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("from-header"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("from-bearer"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; admin_session=from-cookie"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_extract_bearer_keeps_padding_after_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer    padded"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("   padded"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer exact"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("exact"));
    }

    #[test]
    fn test_extract_returns_none_without_carriers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_lasts_one_day() {
        assert_eq!(
            session_cookie("abc"),
            "admin_session=abc; Path=/; Max-Age=86400; SameSite=Lax"
        );
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
