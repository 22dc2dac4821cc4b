//! Core domain types for the board.

use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

/// Opaque, client-supplied player identifier.
pub type PlayerId = String;

/// Three cell indices forming a row, column or diagonal.
pub type WinningLine = [usize; 3];

/// Marker placed by a seat.
///
/// Seat 0 plays [`Symbol::A`] and always opens; seat 1 plays [`Symbol::B`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Symbol {
    /// First seat's symbol.
    A,
    /// Second seat's symbol.
    B,
}

impl Symbol {
    /// Returns the symbol assigned to a seat index, if the seat exists.
    pub fn for_seat(seat: usize) -> Option<Self> {
        match seat {
            0 => Some(Symbol::A),
            1 => Some(Symbol::B),
            _ => None,
        }
    }

    /// Returns the seat index playing this symbol.
    pub fn seat(self) -> usize {
        match self {
            Symbol::A => 0,
            Symbol::B => 1,
        }
    }

    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::A => Symbol::B,
            Symbol::B => Symbol::A,
        }
    }
}

/// Terminal result of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Winner {
    /// Seat 0 completed a line.
    A,
    /// Seat 1 completed a line.
    B,
    /// Board filled with no line.
    #[serde(rename = "draw")]
    #[strum(serialize = "draw")]
    Draw,
}

impl Winner {
    /// Returns the winning symbol, or `None` for a draw.
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Winner::A => Some(Symbol::A),
            Winner::B => Some(Symbol::B),
            Winner::Draw => None,
        }
    }
}

impl From<Symbol> for Winner {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::A => Winner::A,
            Symbol::B => Winner::B,
        }
    }
}

/// 3x3 board in row-major order.
///
/// Serialized as a plain array of nine `null | "A" | "B"` entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Symbol>; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cell contents.
    pub fn from_cells(cells: [Option<Symbol>; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Gets the cell at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Option<Symbol>> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(None))
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Option<Symbol>; BOARD_SIZE] {
        &self.cells
    }

    pub(crate) fn place(&mut self, index: usize, symbol: Symbol) {
        self.cells[index] = Some(symbol);
    }

    /// Formats the board as a human-readable grid, numbering empty cells 0-8.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                match self.cells[index] {
                    Some(symbol) => result.push_str(&symbol.to_string()),
                    None => result.push_str(&index.to_string()),
                }
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}
