//! Move validation errors.

use derive_more::{Display, Error};

/// Reasons a move is refused. A refused move never touches the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The cell index is not on the board.
    #[display("Cell {cell} is outside the board")]
    CellOutOfRange {
        /// Requested index.
        cell: usize,
    },
    /// The game already has a winner or is drawn.
    #[display("Game is already over")]
    AlreadyTerminal,
    /// The player does not hold the seat whose turn it is.
    #[display("Not your turn")]
    InvalidTurn,
    /// The cell already holds a symbol.
    #[display("Cell {cell} is already occupied")]
    CellOccupied {
        /// Requested index.
        cell: usize,
    },
}
