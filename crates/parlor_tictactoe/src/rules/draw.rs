//! Draw detection logic for tic-tac-toe.

use super::win::check_winner;
use crate::Board;
use tracing::instrument;

/// Checks if the game is a draw: every cell filled and no line completed.
#[instrument(level = "trace")]
pub fn is_draw(board: &Board) -> bool {
    board.is_full() && check_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol::{A, B};

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = Board::from_cells([
            Some(A), Some(B), Some(A),
            Some(A), Some(B), Some(B),
            Some(B), Some(A), Some(A),
        ]);
        assert!(is_draw(&board));
    }

    #[test]
    fn test_full_board_with_line_is_not_draw() {
        let board = Board::from_cells([
            Some(A), Some(A), Some(A),
            Some(B), Some(B), Some(A),
            Some(B), Some(A), Some(B),
        ]);
        assert!(!is_draw(&board));
    }

    #[test]
    fn test_open_board_is_not_draw() {
        assert!(!is_draw(&Board::new()));
    }
}
