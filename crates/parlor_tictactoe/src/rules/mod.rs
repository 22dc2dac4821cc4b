//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]: the same board always evaluates to the
//! same result, whatever sequence of moves produced it.

pub mod draw;
pub mod win;

pub use draw::is_draw;
pub use win::{WIN_LINES, check_winner};

use crate::{Board, Winner, WinningLine};
use tracing::instrument;

/// Outcome of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Winner or draw, `None` while the game is open.
    pub winner: Option<Winner>,
    /// Completed line; only set when a symbol won.
    pub winning_line: Option<WinningLine>,
}

/// Evaluates a board for a win or a draw.
#[instrument(level = "trace")]
pub fn evaluate(board: &Board) -> Evaluation {
    if let Some((symbol, line)) = check_winner(board) {
        return Evaluation {
            winner: Some(symbol.into()),
            winning_line: Some(line),
        };
    }
    if board.is_full() {
        return Evaluation {
            winner: Some(Winner::Draw),
            winning_line: None,
        };
    }
    Evaluation::default()
}
