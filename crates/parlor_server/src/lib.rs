//! Parlor server - room registry and HTTP transport for two-seat games.
//!
//! # Architecture
//!
//! - **Registry**: a fixed pool of rooms, each behind its own lock
//! - **Room**: seat assignment, leave semantics, the embedded game state
//! - **Chat**: an append-only message log per room
//! - **Api**: axum routes binding the above to JSON requests
//!
//! # Example
//!
//! ```no_run
//! use parlor_server::{AppState, RoomRegistry, ServerConfig, router};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let state = Arc::new(AppState::new(RoomRegistry::from_config(config.rooms())));
//! let listener = tokio::net::TcpListener::bind(("127.0.0.1", 3000)).await?;
//! axum::serve(listener, router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod chat;
mod config;
mod error;
mod registry;
mod room;

pub use api::{
    Ack, AppState, ErrorBody, GameAction, GameStateResponse, JoinRequest, JoinResponse,
    LeaveRequest, router,
};
pub use chat::{ChatLog, ChatMessage, NewChatMessage};
pub use config::{ConfigError, RoomConfig, ServerConfig};
pub use error::{ErrorCode, RegistryError, RegistryErrorKind};
pub use registry::RoomRegistry;
pub use room::{JoinOutcome, MAX_SEATS, Room, RoomSnapshot, RoomSummary};
