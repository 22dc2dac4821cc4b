//! Command-line interface for parlor_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parlor - room server for two-seat turn-based games
#[derive(Parser, Debug)]
#[command(name = "parlor_server")]
#[command(about = "Room registry and game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// TOML file with host, port and room pool
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
