/**
 * Health Routes
 * Liveness and readiness of the backend and its stores
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::content::PageKey;
use crate::AppState;

static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Initialize the server start time
pub fn init_start_time() {
    Lazy::force(&SERVER_START);
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceCheck {
    fn healthy(backend: Option<&str>, response_time: Option<u64>) -> Self {
        Self {
            status: "healthy".to_string(),
            backend: backend.map(str::to_string),
            response_time,
            error: None,
        }
    }

    /// `error` is shown to anonymous callers; keep it generic.
    fn unhealthy(backend: Option<&str>, error: &str) -> Self {
        Self {
            status: "unhealthy".to_string(),
            backend: backend.map(str::to_string),
            response_time: None,
            error: Some(error.to_string()),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health checks for all services
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub content: ServiceCheck,
    pub database: ServiceCheck,
    pub records: ServiceCheck,
}

/// Detailed health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub checks: HealthChecks,
}

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

/// Content is healthy when the home document loads.
async fn check_content(state: &AppState) -> ServiceCheck {
    let backend = state.content.backend_name();
    let start = Instant::now();
    match state.content.read(PageKey::Home).await {
        Ok(_) => ServiceCheck::healthy(Some(backend), Some(start.elapsed().as_millis() as u64)),
        Err(e) => {
            tracing::error!(backend, error = %e, "content health check failed");
            ServiceCheck::unhealthy(Some(backend), "content store unavailable")
        }
    }
}

async fn check_database() -> ServiceCheck {
    match crate::db::health_check().await {
        Ok(duration) => ServiceCheck::healthy(None, Some(duration.as_millis() as u64)),
        Err(e) => {
            tracing::error!(error = %e, "database health check failed");
            ServiceCheck::unhealthy(None, "database unavailable")
        }
    }
}

async fn gather(state: &AppState) -> HealthChecks {
    HealthChecks {
        content: check_content(state).await,
        database: check_database().await,
        records: ServiceCheck::healthy(Some(state.records.backend_name()), None),
    }
}

/// GET /health
pub async fn health_ping() -> impl IntoResponse {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /health/detailed
/// Always 200; the database is optional when content lives in files.
pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    let checks = gather(&state).await;
    let status = if checks.content.is_healthy() { "ok" } else { "degraded" };

    Json(DetailedHealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
        checks,
    })
}

/// GET /health/ready
/// Ready once page content can be served.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let content = check_content(&state).await;
    let (code, status) = if content.is_healthy() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    };
    (
        code,
        Json(SimpleHealthResponse {
            status: status.to_string(),
        }),
    )
}
