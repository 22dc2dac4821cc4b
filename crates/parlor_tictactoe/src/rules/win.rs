//! Win detection logic for tic-tac-toe.

use crate::{Board, Symbol, WinningLine};
use tracing::instrument;

/// The eight lines, scanned in this order: rows, columns, diagonals.
pub const WIN_LINES: [WinningLine; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if a symbol has three in a row.
///
/// Returns the symbol and the first matching line in [`WIN_LINES`] order.
#[instrument(level = "trace")]
pub fn check_winner(board: &Board) -> Option<(Symbol, WinningLine)> {
    let cells = board.cells();
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(symbol) = cells[a]
            && cells[b] == Some(symbol)
            && cells[c] == Some(symbol)
        {
            return Some((symbol, line));
        }
    }
    None
}
