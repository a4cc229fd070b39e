//! Consulting site backend - page content store, admin session gate and
//! lead-capture records for the bilingual marketing website.

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod logging;
pub mod records;
pub mod routes;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::{AppConfig, ContentBackend};
use crate::content::{ContentStore, FileContentStore, PgContentStore};
use crate::records::{MemoryRecordStore, PgRecordStore, RecordStore};
use crate::session::SessionCodec;

/// Shared handles every handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub content: Arc<dyn ContentStore>,
    pub records: Arc<dyn RecordStore>,
    pub sessions: SessionCodec,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("CONTENT_BACKEND=postgres needs a reachable DATABASE_URL")]
    ContentDatabaseMissing,
    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),
    #[error("content store: {0}")]
    Content(#[from] content::ContentError),
    #[error("invalid HOST/PORT: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("server I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN, falling back to
/// the local dev server.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|s| {
            s.split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect::<Vec<HeaderValue>>()
        })
        .filter(|origins| !origins.is_empty())
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(session::SESSION_HEADER),
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let admin_panel = ServeDir::new(&state.config.admin_dir).append_index_html_on_directories(true);

    Router::new()
        .merge(routes::content::router())
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::session_status))
        .route("/api/contact", post(routes::contact::submit_contact))
        .route(
            "/api/service-requests",
            post(routes::service_requests::submit_service_request),
        )
        .route("/api/admin/messages", get(routes::contact::list_messages))
        .route(
            "/api/admin/messages/{id}",
            patch(routes::contact::update_message_status).delete(routes::contact::delete_message),
        )
        .route(
            "/api/admin/service-requests",
            get(routes::service_requests::list_service_requests),
        )
        .route(
            "/api/admin/service-requests/{id}",
            patch(routes::service_requests::update_service_request_status)
                .delete(routes::service_requests::delete_service_request),
        )
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/ready", get(routes::health::health_ready))
        .nest_service("/admin", admin_panel)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::admin_gate,
        ))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Content documents are small; 2 MB is generous.
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(configure_cors())
        .with_state(state)
}

/// Builds the stores named by the configuration.
///
/// `database` is `None` when no `DATABASE_URL` is configured; records then
/// live in memory. A configured database that cannot be reached or migrated
/// aborts startup.
pub async fn build_state(
    config: AppConfig,
    database: Option<db::DbConfig>,
) -> Result<AppState, StartupError> {
    let pool = match database {
        Some(db_config) => {
            let pool = db::init_pool(Some(db_config)).await?;
            db::run_migrations(&pool).await?;
            Some(pool)
        }
        None => {
            tracing::info!("DATABASE_URL not set. Running without database connection.");
            None
        }
    };

    let content: Arc<dyn ContentStore> = match (config.content_backend, &pool) {
        (ContentBackend::Files, _) => Arc::new(FileContentStore::open(&config.content_dir).await?),
        (ContentBackend::Postgres, Some(pool)) => {
            let store = PgContentStore::new(pool.clone());
            let seeded = content::seed_from_dir(&store, &config.content_dir).await?;
            tracing::info!(seeded, "postgres content store ready");
            Arc::new(store)
        }
        (ContentBackend::Postgres, None) => return Err(StartupError::ContentDatabaseMissing),
    };

    let records: Arc<dyn RecordStore> = match &pool {
        Some(pool) => Arc::new(PgRecordStore::new(pool.clone())),
        None => {
            tracing::warn!("No database: contact messages and service requests are kept in memory only");
            Arc::new(MemoryRecordStore::new())
        }
    };

    Ok(AppState {
        sessions: SessionCodec::new(config.admin_emails()),
        content,
        records,
        config: Arc::new(config),
    })
}

fn warn_about_weak_settings(config: &AppConfig) {
    if config.content_api_secret.is_none() {
        if config.is_production() {
            tracing::error!("CONTENT_API_SECRET is not set: anyone can overwrite page content");
        } else {
            tracing::warn!("CONTENT_API_SECRET is not set: content writes are open (development mode)");
        }
    }
    if config.admin_accounts.is_empty() {
        tracing::warn!("ADMIN_CREDENTIALS is empty: nobody can sign in to the admin panel");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Dropping the guards stops the background log writers.
    let _log_guards = logging::init(&config.environment);

    routes::health::init_start_time();
    warn_about_weak_settings(&config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let database = std::env::var("DATABASE_URL")
        .ok()
        .map(|_| db::DbConfig::default());
    let state = build_state(config, database).await?;
    tracing::info!(
        content = state.content.backend_name(),
        records = state.records.backend_name(),
        operators = state.config.admin_accounts.len(),
        "stores ready"
    );

    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{read_json, test_state, TEST_ADMIN};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn file_config(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            content_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_build_state_without_database_keeps_records_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state(file_config(&dir), None).await.unwrap();
        assert_eq!(state.content.backend_name(), "files");
        assert_eq!(state.records.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_build_state_with_unreachable_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let database = db::DbConfig {
            url: "postgresql://nobody:pw@127.0.0.1:1/site".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_secs: 1,
            idle_timeout_secs: 1,
        };
        let result = build_state(file_config(&dir), Some(database)).await;
        assert!(matches!(result, Err(StartupError::Database(_))));
    }

    #[tokio::test]
    async fn test_full_app_serves_content_and_gates_admin() {
        let (state, dir) = test_state(None);
        std::fs::write(
            dir.path().join("home.json"),
            "{\"en\":{\"hero\":{\"title\":\"Hello\"}}}",
        )
        .unwrap();
        let app = create_app(state.clone());

        let res = app
            .clone()
            .oneshot(Request::get("/api/content/home").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
        let body: Value = read_json(res).await;
        assert_eq!(body["data"]["en"]["hero"]["title"], "Hello");

        let res = app
            .clone()
            .oneshot(Request::get("/admin/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/admin/login");

        let res = app
            .clone()
            .oneshot(Request::get("/admin/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);

        let token = state.sessions.encode(TEST_ADMIN);
        let res = app
            .oneshot(
                Request::get("/api/admin/messages")
                    .header("cookie", format!("admin_session={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
