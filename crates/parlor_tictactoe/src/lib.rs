//! Parlor tic-tac-toe - the authoritative game state machine.
//!
//! This crate owns everything about a single board: which symbol moves
//! next, whether a move is legal, when the game is won or drawn, and how
//! many games each seated player has won. It knows nothing about rooms,
//! transports or clocks; the server embeds one [`GameState`] per room and
//! the client uses the same type to preview moves locally.
//!
//! # Example
//!
//! ```
//! use parlor_tictactoe::{GameState, Winner};
//!
//! let seats = vec!["alice".to_string(), "bob".to_string()];
//! let mut state = GameState::new();
//! for (player, cell) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)] {
//!     state.apply_move(&seats, player, cell).unwrap();
//! }
//! assert_eq!(state.winner(), Some(Winner::A));
//! assert_eq!(state.winning_line(), Some([0, 1, 2]));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod rules;
mod state;
mod types;

pub use error::MoveError;
pub use rules::{Evaluation, WIN_LINES, evaluate};
pub use state::GameState;
pub use types::{BOARD_SIZE, Board, PlayerId, Symbol, Winner, WinningLine};
