/**
 * Content Routes
 * Page content documents: open reads, secret-guarded whole-document writes
 */
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::content::{list_pages, PageKey};
use crate::error::ApiError;
use crate::session::extract_bearer;
use crate::AppState;

/// Editors must see their own writes immediately.
const NO_CACHE: &str = "no-store, no-cache, must-revalidate";

#[derive(Debug, Serialize, Deserialize)]
pub struct PagesResponse {
    pub pages: Vec<PageKey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentResponse {
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
}

/// `/api/content` routes. Every response, errors included, is marked uncacheable.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/content", get(list_content_pages))
        .route("/api/content/{page}", get(get_content).put(put_content))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ))
}

/// Writes are open when no secret is configured; otherwise the bearer
/// credential must match it exactly.
fn authorize_write(secret: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    match extract_bearer(headers) {
        Some(presented) if secrets_match(presented.as_bytes(), secret.as_bytes()) => Ok(()),
        Some(_) => Err(ApiError::Unauthorized("Invalid credentials")),
        None => Err(ApiError::Unauthorized("Authorization required")),
    }
}

/// Byte comparison whose running time depends only on the lengths.
fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// GET /api/content
pub async fn list_content_pages() -> Json<PagesResponse> {
    Json(PagesResponse {
        pages: list_pages().to_vec(),
    })
}

/// GET /api/content/{page}
pub async fn get_content(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<ContentResponse>, ApiError> {
    let page: PageKey = page.parse()?;
    let data = state.content.read(page).await?;
    Ok(Json(ContentResponse { data }))
}

/// PUT /api/content/{page}
/// Replaces the whole document. Checks run in order: page key, authorization,
/// body syntax, then the store write.
pub async fn put_content(
    State(state): State<AppState>,
    Path(page): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WriteResponse>, ApiError> {
    let page: PageKey = page.parse()?;
    authorize_write(state.config.content_api_secret.as_deref(), &headers)?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Body is not valid JSON: {e}")))?;

    state.content.write(page, &value).await?;
    tracing::info!(page = %page, bytes = body.len(), "page content replaced");

    Ok(Json(WriteResponse { success: true }))
}
