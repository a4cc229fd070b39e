//! Consulting site backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = consulting_site_backend::run().await {
        tracing::error!("fatal: {}", e);
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}
