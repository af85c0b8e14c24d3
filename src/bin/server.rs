//! # Claims API Server
//!
//! Standalone binary serving the claims HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! REDSHIFT_HOST=cluster.example.com REDSHIFT_USER=reader REDSHIFT_PASSWORD=... \
//!     cargo run --bin claims-api-server
//!
//! # Explicit configuration file and JSON logs
//! CLAIMS_API_CONFIG=/etc/claims-api.toml LOG_FORMAT=json cargo run --bin claims-api-server
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use claims_api::config::ConfigLoader;
use claims_api::logging;
use claims_api::web::{create_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        build_mode = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Starting claims API server"
    );

    let config = ConfigLoader::from_process_env()
        .load()
        .context("failed to load configuration")?;

    let missing = config.database.missing_settings();
    if !missing.is_empty() {
        warn!(
            missing = ?missing,
            "Backend not configured; /health stays up, /ready and claim routes will report unavailable"
        );
    }

    let addr = config.web.socket_addr()?;
    let app = create_app(AppState::from_config(config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Claims API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Claims API server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
