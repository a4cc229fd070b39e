/**
 * Authentication Routes
 * Operator login against the configured credential list, logout, session check
 */
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bcrypt::verify;
use serde::{Deserialize, Serialize};

use crate::session::{clear_session_cookie, extract_session_token, session_cookie, SessionError};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            token: None,
            email: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Check the credentials and hand out a session token, as a cookie and in the
/// body for the client's local-storage mirror.
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Email and password are required")),
        )
            .into_response();
    }

    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Invalid email format")),
        )
            .into_response();
    }

    let account = state
        .config
        .admin_accounts
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(payload.email.trim()))
        .cloned();

    let password_ok = match &account {
        Some(account) => {
            // bcrypt is CPU-bound; keep the async executor free.
            let password = payload.password.clone();
            let hash = account.password_hash.clone();
            tokio::task::spawn_blocking(move || verify(&password, &hash).unwrap_or(false))
                .await
                .unwrap_or(false)
        }
        None => false,
    };

    let Some(account) = account.filter(|_| password_ok) else {
        tracing::warn!(email = %payload.email, "failed admin login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid email or password")),
        )
            .into_response();
    };

    let token = state.sessions.encode(&account.email);
    tracing::info!(email = %account.email, "admin signed in");

    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token))],
        Json(LoginResponse {
            success: true,
            token: Some(token),
            email: Some(account.email),
            error: None,
        }),
    )
        .into_response()
}

/// POST /api/auth/logout
/// Tokens cannot be revoked server-side; this only clears the cookie.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(LogoutResponse { success: true }),
    )
}

/// GET /api/auth/session
pub async fn session_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let verdict = match extract_session_token(&headers) {
        Some(token) => state.sessions.decode_and_validate(&token),
        None => Err(SessionError::Missing),
    };

    match verdict {
        Ok(claims) => (
            StatusCode::OK,
            Json(SessionResponse {
                valid: true,
                email: Some(claims.email),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(SessionResponse {
                valid: false,
                email: None,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_COOKIE;
    use crate::test_support::{read_json, test_state, TEST_ADMIN, TEST_PASSWORD};
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    fn auth_router() -> (Router, AppState, tempfile::TempDir) {
        let (state, dir) = test_state(None);
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/session", get(session_status))
            .with_state(state.clone());
        (app, state, dir)
    }

    fn login_req(email: &str, password: &str) -> Request<Body> {
        let body = serde_json::to_vec(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .unwrap();
        Request::post("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let (app, _, _dir) = auth_router();
        let res = app.oneshot(login_req("", TEST_PASSWORD)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_invalid_email_format_returns_bad_request() {
        let (app, _, _dir) = auth_router();
        let res = app.oneshot(login_req("no-at-sign", TEST_PASSWORD)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let (app, _, _dir) = auth_router();
        for (email, password) in [
            (TEST_ADMIN, "wrongpassword"),
            ("stranger@firm.example", TEST_PASSWORD),
        ] {
            let res = app.clone().oneshot(login_req(email, password)).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert!(res.headers().get(header::SET_COOKIE).is_none());
        }
    }

    #[tokio::test]
    async fn test_login_sets_cookie_with_valid_token() {
        let (app, state, _dir) = auth_router();
        let res = app.oneshot(login_req(TEST_ADMIN, TEST_PASSWORD)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));

        let body: LoginResponse = read_json(res).await;
        assert!(body.success);
        let token = body.token.unwrap();
        assert!(cookie.contains(&token));
        let claims = state.sessions.decode_and_validate(&token).unwrap();
        assert_eq!(claims.email, TEST_ADMIN);
    }

    #[tokio::test]
    async fn test_session_check_without_token_is_401() {
        let (app, _, _dir) = auth_router();
        let res = app
            .oneshot(Request::get("/api/auth/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: SessionResponse = read_json(res).await;
        assert!(!body.valid);
    }

    #[tokio::test]
    async fn test_session_check_with_valid_token() {
        let (app, state, _dir) = auth_router();
        let token = state.sessions.encode(TEST_ADMIN);
        let res = app
            .oneshot(
                Request::get("/api/auth/session")
                    .header("x-admin-session", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: SessionResponse = read_json(res).await;
        assert!(body.valid);
        assert_eq!(body.email.as_deref(), Some(TEST_ADMIN));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let (app, _, _dir) = auth_router();
        let res = app
            .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
