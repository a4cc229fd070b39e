//! Admin gate: keeps `/admin/**` behind a valid session.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::{extract_session_token, SessionClaims, SessionError};
use crate::error::ApiError;
use crate::AppState;

pub const ADMIN_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `path` needs a session: anything under `/admin` except the login page.
pub fn is_protected(path: &str) -> bool {
    under(path, ADMIN_PREFIX) && !under(path, LOGIN_PATH)
}

/// Middleware: protected paths without a valid session are redirected to the
/// login page before the inner handler runs. Everything else passes untouched.
pub async fn admin_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_protected(&path) {
        return next.run(request).await;
    }

    let verdict = match extract_session_token(request.headers()) {
        Some(token) => state.sessions.decode_and_validate(&token),
        None => Err(SessionError::Missing),
    };

    match verdict {
        Ok(claims) => {
            tracing::debug!(path = %path, email = %claims.email, "admin session accepted");
            next.run(request).await
        }
        Err(reason) => {
            tracing::info!(path = %path, reason = %reason, "redirecting to admin login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
    }
}

/// Extractor for admin JSON APIs; rejects with `401` instead of redirecting.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(&parts.headers).ok_or(SessionError::Missing)?;
        let claims = state.sessions.decode_and_validate(&token)?;
        Ok(AdminSession(claims))
    }
}
