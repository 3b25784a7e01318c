//! voxbridge — standalone translate+speak server.
//!
//! ```text
//! voxbridge serve [--config path.toml] [--host 127.0.0.1] [--port 8765]
//! ```

mod dto;
mod http;

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use voxbridge_pipeline::config::Config;
use voxbridge_pipeline::supervisor::Supervisor;

/// voxbridge — translate English/Chinese text to Japanese and speak it
#[derive(Parser)]
#[command(name = "voxbridge", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen host, overrides config file and SERVER_HOST
    #[arg(long, env = "SERVER_HOST")]
    host: Option<std::net::IpAddr>,

    /// Listen port, overrides config file and SERVER_PORT
    #[arg(long, env = "SERVER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!("starting voxbridge translation+tts system");
    let supervisor = Supervisor::start(&config).await?;
    tracing::info!("translation+tts workers started");

    let app = http::router(supervisor.clone());
    let addr = std::net::SocketAddr::new(config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "voxbridge listening");

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    let signal_task = tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received shutdown signal");
        signal_token.cancel();
    });

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_token.cancelled().await;
    });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    signal_task.abort();
    tracing::info!("stopping translation+tts workers");
    supervisor.shutdown().await;
    tracing::info!("shutdown complete");

    Ok(())
}
