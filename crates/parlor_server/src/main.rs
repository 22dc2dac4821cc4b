//! Parlor server binary.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use parlor_server::{AppState, RoomRegistry, ServerConfig, router};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_http_server(config, host, port).await,
    }
}

/// Run the HTTP game server
#[instrument]
async fn run_http_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ServerConfig::from_file(&path)?,
        None => {
            info!("No config file given, using default room pool");
            ServerConfig::default()
        }
    }
    .with_overrides(host, port);

    let registry = RoomRegistry::from_config(config.rooms());
    for room in config.rooms() {
        info!(room_id = %room.id(), name = %room.name(), "Room ready");
    }

    let app = router(Arc::new(AppState::new(registry)));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(addr = %listener.local_addr()?, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
