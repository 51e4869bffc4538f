//! tablescope service entry point.
//!
//! Binds the HTTP server, wires the blob stores and analysis pipeline
//! from configuration, and serves until interrupted.

use tracing::info;
use tracing_subscriber::EnvFilter;

use tablescope::domain::error::AppError;
use tablescope::infrastructure::bootstrap::bootstrap;
use tablescope::infrastructure::config::AppConfig;
use tablescope::interfaces::http::start_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().map_err(to_io_error)?;
    let state = bootstrap(&config).map_err(to_io_error)?;

    info!(
        host = %config.host,
        port = config.port,
        uploads_dir = %config.uploads_dir.display(),
        charts_dir = %config.charts_dir.display(),
        "Starting tablescope"
    );

    start_server(state, &config)?.await
}

fn to_io_error(err: AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
