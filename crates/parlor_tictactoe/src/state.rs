//! Authoritative per-room game state and its transitions.

use crate::rules::evaluate;
use crate::{BOARD_SIZE, Board, MoveError, PlayerId, Symbol, Winner, WinningLine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Mutable core of a session.
///
/// `win_counts` survives [`GameState::reset`]; only the room registry
/// decides when tallies are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    cells: Board,
    next_symbol_is_a: bool,
    winner: Option<Winner>,
    winning_line: Option<WinningLine>,
    win_counts: BTreeMap<PlayerId, u32>,
}

impl GameState {
    /// Creates an empty board with seat 0 to move and no tallies.
    pub fn new() -> Self {
        Self {
            cells: Board::new(),
            next_symbol_is_a: true,
            winner: None,
            winning_line: None,
            win_counts: BTreeMap::new(),
        }
    }

    /// Returns the board.
    pub fn cells(&self) -> &Board {
        &self.cells
    }

    /// Returns `true` when seat 0 ([`Symbol::A`]) moves next.
    pub fn next_symbol_is_a(&self) -> bool {
        self.next_symbol_is_a
    }

    /// Returns the winner, if the game is over.
    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Returns the completed line, if a symbol won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.winning_line
    }

    /// Returns games won per player.
    pub fn win_counts(&self) -> &BTreeMap<PlayerId, u32> {
        &self.win_counts
    }

    /// Checks if the game has ended.
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    /// Symbol whose turn it is.
    pub fn current_symbol(&self) -> Symbol {
        if self.next_symbol_is_a {
            Symbol::A
        } else {
            Symbol::B
        }
    }

    /// Seat index whose turn it is.
    pub fn acting_seat(&self) -> usize {
        self.current_symbol().seat()
    }

    /// Validates a move without applying it.
    ///
    /// Checks run in a fixed order: cell range, finished game, turn
    /// ownership, then cell occupancy. On success returns the symbol the
    /// player would place.
    ///
    /// # Errors
    ///
    /// Returns the first [`MoveError`] that applies.
    pub fn check_move(
        &self,
        seats: &[PlayerId],
        player_id: &str,
        cell: usize,
    ) -> Result<Symbol, MoveError> {
        if cell >= BOARD_SIZE {
            return Err(MoveError::CellOutOfRange { cell });
        }
        if self.is_terminal() {
            return Err(MoveError::AlreadyTerminal);
        }
        let symbol = self.current_symbol();
        if seats.get(symbol.seat()).map(String::as_str) != Some(player_id) {
            return Err(MoveError::InvalidTurn);
        }
        if !self.cells.is_empty(cell) {
            return Err(MoveError::CellOccupied { cell });
        }
        Ok(symbol)
    }

    /// Applies a validated move, then runs win detection.
    ///
    /// A winning move credits `player_id` with one win and leaves the turn
    /// where it was; any other move hands the turn to the other seat.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] without mutating anything when the move is illegal.
    #[instrument(skip(self, seats), fields(next_symbol_is_a = self.next_symbol_is_a))]
    pub fn apply_move(
        &mut self,
        seats: &[PlayerId],
        player_id: &str,
        cell: usize,
    ) -> Result<(), MoveError> {
        let symbol = self.check_move(seats, player_id, cell).map_err(|e| {
            warn!(error = %e, "Move rejected");
            e
        })?;

        self.cells.place(cell, symbol);
        let evaluation = evaluate(&self.cells);
        self.winner = evaluation.winner;
        self.winning_line = evaluation.winning_line;

        match self.winner {
            Some(Winner::Draw) => info!("Game ended in a draw"),
            Some(winner) => {
                let tally = self.win_counts.entry(player_id.to_string()).or_insert(0);
                *tally += 1;
                info!(%winner, wins = *tally, line = ?self.winning_line, "Game won");
            }
            None => {
                self.next_symbol_is_a = !self.next_symbol_is_a;
                debug!(%symbol, "Move applied");
            }
        }
        Ok(())
    }

    /// Clears the board for a new game, keeping `win_counts`.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        let win_counts = std::mem::take(&mut self.win_counts);
        *self = Self {
            win_counts,
            ..Self::new()
        };
        debug!("Board reset");
    }

    /// Clears the board and every tally except `player_id`'s.
    ///
    /// The kept player always ends up with an entry, even if it was missing.
    pub fn reset_keeping(&mut self, player_id: &str) {
        let wins = self.win_counts.get(player_id).copied().unwrap_or(0);
        *self = Self::new();
        self.win_counts.insert(player_id.to_string(), wins);
    }

    /// Makes sure `player_id` has a tally, starting at zero.
    pub fn ensure_tally(&mut self, player_id: &str) {
        self.win_counts.entry(player_id.to_string()).or_insert(0);
    }

    /// Returns a locally predicted copy after the current symbol plays `cell`.
    ///
    /// The preview only places the symbol and passes the turn. It never
    /// decides a winner or touches tallies; the server's answer does that.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::CellOutOfRange`] for an index off the board.
    pub fn preview_move(&self, cell: usize) -> Result<Self, MoveError> {
        if cell >= BOARD_SIZE {
            return Err(MoveError::CellOutOfRange { cell });
        }
        let mut preview = self.clone();
        preview.cells.place(cell, self.current_symbol());
        preview.next_symbol_is_a = !self.next_symbol_is_a;
        Ok(preview)
    }

    /// Returns a copy with an empty board and the same tallies.
    pub fn preview_reset(&self) -> Self {
        let mut preview = self.clone();
        preview.reset();
        preview
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
