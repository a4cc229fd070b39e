/*!
 * Logging Module
 * Subscriber setup: console plus daily rolling files, JSON in production
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter directive when neither `RUST_LOG` nor `LOG_LEVEL` is set.
fn default_directive(level: &str) -> String {
    format!("consulting_site_backend={level},tower_http=info,axum=info,sqlx=warn")
}

/// Initialize the logging system.
///
/// The returned guards flush the background writers when dropped and must be
/// held until the process exits.
pub fn init(environment: &str) -> Vec<WorkerGuard> {
    let is_production = environment == "production";

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&log_dir).ok();

    let (file_writer, file_guard) = non_blocking(rolling::daily(&log_dir, "site.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());
    let mut guards = vec![file_guard, console_guard];

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if is_production { "info" } else { "debug" }.to_string()
    });
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&log_level)));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if is_production {
        let (error_writer, error_guard) = non_blocking(rolling::daily(&log_dir, "error.log"));
        guards.push(error_guard);

        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .compact();

        subscriber.with(file_layer).with(console_layer).init();
    }

    tracing::info!(environment = %environment, log_dir = %log_dir, "logging initialized");
    guards
}
