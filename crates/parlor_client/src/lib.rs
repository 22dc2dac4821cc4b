//! Parlor client - polling room client with optimistic updates.
//!
//! # Architecture
//!
//! - **Transport**: the [`GameTransport`] seam and its reqwest implementation
//! - **Reconcile**: pure bookkeeping that decides what the player sees
//! - **Session**: ties a transport and a reconciler to one seat, with a
//!   background poller
//!
//! # Example
//!
//! ```no_run
//! use parlor_client::{ClientSession, HttpTransport, SyncConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), parlor_client::ClientError> {
//! let transport = Arc::new(HttpTransport::new("http://127.0.0.1:3000"));
//! let session = ClientSession::join(transport, "room1", "p1", "Alice", SyncConfig::default()).await?;
//! session.make_move(4).await?;
//! println!("{}", session.displayed().await.cells().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod reconcile;
mod session;
mod transport;

pub use error::ClientError;
pub use reconcile::{
    Fingerprint, PollOutcome, PollTicket, Reconciler, SyncConfig, SyncPhase, fingerprint,
};
pub use session::{ClientSession, PollerHandle, SyncEvent};
pub use transport::{GameTransport, HttpTransport};
