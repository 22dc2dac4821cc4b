//! Parlor terminal client.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use parlor_client::{ClientSession, GameTransport, HttpTransport, SyncConfig, SyncEvent};
use parlor_server::RoomSnapshot;
use parlor_tictactoe::{GameState, Winner};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with the board on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let transport = Arc::new(HttpTransport::new(cli.server_url));

    match cli.command {
        Command::Rooms => list_rooms(transport.as_ref()).await,
        Command::Play {
            room,
            player,
            name,
            poll_ms,
        } => play(transport, room, player, name, poll_ms).await,
    }
}

async fn list_rooms(transport: &HttpTransport) -> Result<()> {
    let rooms = transport.list_rooms().await?;
    for room in rooms {
        let tallies: Vec<String> = room
            .win_counts
            .iter()
            .map(|(player, wins)| format!("{}={}", player, wins))
            .collect();
        println!(
            "{:<8} {:<16} {}/2{}  {}",
            room.id,
            room.name,
            room.occupant_count,
            if room.is_full { " full" } else { "" },
            tallies.join(" ")
        );
    }
    Ok(())
}

/// Join a room and run the input/poll loop until quit or EOF
#[instrument(skip(transport))]
async fn play(
    transport: Arc<HttpTransport>,
    room: String,
    player: String,
    name: String,
    poll_ms: u64,
) -> Result<()> {
    let config = SyncConfig::default().with_poll_interval(Duration::from_millis(poll_ms));
    let session = ClientSession::join(transport, &room, &player, &name, config).await?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let poller = session.spawn_poller(event_tx);

    render(&session.room().await, &session.displayed().await, &player);
    println!("Enter a cell 0-8, 'reset', or 'quit'.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => match event {
                SyncEvent::StateChanged(snapshot) => render(&snapshot, &snapshot.state, &player),
                SyncEvent::PollFailed { reason } => warn!(%reason, "Lost contact with server"),
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();
                let result = match input {
                    "" => continue,
                    "quit" | "q" => break,
                    "reset" | "r" => session.reset().await,
                    cell => match cell.parse::<usize>() {
                        Ok(cell) => session.make_move(cell).await,
                        Err(_) => {
                            println!("Not a cell: {}", cell);
                            continue;
                        }
                    },
                };
                if let Err(e) = result {
                    println!("Rejected: {}", e);
                }
                render(&session.room().await, &session.displayed().await, &player);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.leave(Some(poller)).await?;
    info!("Session closed");
    Ok(())
}

fn render(room: &RoomSnapshot, state: &GameState, me: &str) {
    println!();
    println!("{} ({})", room.name, room.id);
    for (seat, player) in room.seats.iter().enumerate() {
        let label = room.display_names.get(player).map_or(player.as_str(), String::as_str);
        let wins = state.win_counts().get(player).copied().unwrap_or(0);
        let marker = if player == me { " (you)" } else { "" };
        println!("  seat {}: {}{} wins={}", seat, label, marker, wins);
    }
    println!("{}", state.cells().display());
    match state.winner() {
        Some(Winner::Draw) => println!("Draw. Type 'reset' to play again."),
        Some(winner) => println!("{} wins. Type 'reset' to play again.", winner),
        None if room.seats.get(state.acting_seat()).is_some_and(|p| p == me) => {
            println!("Your move ({})", state.current_symbol())
        }
        None => println!("Waiting for {}", state.current_symbol()),
    }
}
