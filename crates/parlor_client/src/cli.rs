//! Command-line interface for the parlor client.

use clap::{Parser, Subcommand};

/// Parlor - play two-seat games against another player over HTTP
#[derive(Parser, Debug)]
#[command(name = "parlor")]
#[command(about = "Room client for the parlor game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Game server URL
    #[arg(long, env = "PARLOR_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    pub server_url: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List rooms with occupancy and win tallies
    Rooms,

    /// Join a room and play from the terminal
    Play {
        /// Room id, e.g. room1
        #[arg(short, long)]
        room: String,

        /// Your player id (stable across reconnects)
        #[arg(long)]
        player: String,

        /// Display name shown to the other player
        #[arg(short, long)]
        name: String,

        /// Milliseconds between state polls
        #[arg(long, default_value = "300")]
        poll_ms: u64,
    },
}
