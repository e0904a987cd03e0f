use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port: u16 = std::env::var("PRODTRACK_HTTP_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .unwrap_or(8000);
    let ttl_days: i64 = std::env::var("PRODTRACK_SESSION_TTL_DAYS")
        .unwrap_or_else(|_| "7".to_string())
        .parse()
        .unwrap_or(7);
    info!(
        target: "prodtrack",
        "prodtrack starting: RUST_LOG='{}', http_port={}, session_ttl_days={}",
        rust_log, http_port, ttl_days
    );

    prodtrack::server::run_with_port(http_port, ttl_days).await
}
