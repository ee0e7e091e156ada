//! External Search Service (ESS)
//!
//! Serves simple search requests against an SRU proxy and formats every hit.

use std::sync::Arc;

use clap::Parser;
use ess_rest::{ServerConfig, WorkerPool, create_app, init_logging};
use tracing::info;

/// Starts the Axum HTTP server and runs until ctrl-c.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        bases = ?config.bases,
        sru_target = %config.sru_target_url,
        open_format = %config.open_format_url,
        max_page_size = config.max_page_size,
        "Starting External Search Service"
    );

    let pool = Arc::new(WorkerPool::current());
    let app = create_app(Arc::clone(&pool), config.clone())?;

    let result = serve(app, &config).await;
    pool.shutdown();
    result
}
