//! A single two-seat room and its wire snapshots.

use crate::error::{RegistryError, RegistryErrorKind};
use parlor_tictactoe::{GameState, PlayerId, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Seats per room.
pub const MAX_SEATS: usize = 2;

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player took a free seat.
    Joined {
        /// Seat index taken.
        seat: usize,
    },
    /// The player already held this seat; nothing changed.
    AlreadySeated {
        /// Seat index held.
        seat: usize,
    },
}

/// One playable session. Lives for the whole process.
#[derive(Debug, Clone)]
pub struct Room {
    id: String,
    name: String,
    seats: Vec<PlayerId>,
    display_names: BTreeMap<PlayerId, String>,
    state: GameState,
}

impl Room {
    /// Creates an empty room.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            seats: Vec::with_capacity(MAX_SEATS),
            display_names: BTreeMap::new(),
            state: GameState::new(),
        }
    }

    /// Room id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seated players in seat order.
    pub fn seats(&self) -> &[PlayerId] {
        &self.seats
    }

    /// Embedded game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Checks if both seats are taken.
    pub fn is_full(&self) -> bool {
        self.seats.len() == MAX_SEATS
    }

    /// Seat index held by `player_id`.
    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.seats.iter().position(|p| p == player_id)
    }

    /// Symbol played by `player_id`, if seated.
    pub fn symbol_of(&self, player_id: &str) -> Option<Symbol> {
        self.seat_of(player_id).and_then(Symbol::for_seat)
    }

    /// Seats a player in the next free slot.
    ///
    /// Joining again with a seated id changes nothing.
    pub(crate) fn join(
        &mut self,
        player_id: &str,
        display_name: &str,
    ) -> Result<JoinOutcome, RegistryError> {
        if let Some(seat) = self.seat_of(player_id) {
            debug!(room_id = %self.id, player_id, seat, "Player already seated");
            return Ok(JoinOutcome::AlreadySeated { seat });
        }
        if self.is_full() {
            return Err(RegistryError::new(RegistryErrorKind::RoomFull(self.id.clone())));
        }

        self.seats.push(player_id.to_string());
        self.display_names
            .insert(player_id.to_string(), display_name.to_string());
        self.state.ensure_tally(player_id);

        let seat = self.seats.len() - 1;
        info!(room_id = %self.id, player_id, seat, is_full = self.is_full(), "Player seated");
        Ok(JoinOutcome::Joined { seat })
    }

    /// Removes a player. Returns `false` if they were not seated.
    ///
    /// An emptied room is wiped, tallies included. A room left with one
    /// occupant gets a fresh board and keeps only that occupant's tally.
    pub(crate) fn leave(&mut self, player_id: &str) -> bool {
        let Some(seat) = self.seat_of(player_id) else {
            debug!(room_id = %self.id, player_id, "Leave ignored, player not seated");
            return false;
        };

        self.seats.remove(seat);
        self.display_names.remove(player_id);

        match self.seats.first() {
            None => {
                self.display_names.clear();
                self.state = GameState::new();
                info!(room_id = %self.id, player_id, "Last player left, room reset");
            }
            Some(remaining) => {
                self.state.reset_keeping(remaining);
                info!(room_id = %self.id, player_id, remaining = %remaining, "Player left");
            }
        }
        true
    }

    /// Validates and applies a move against the current seats.
    pub(crate) fn apply_move(&mut self, player_id: &str, cell: usize) -> Result<&GameState, RegistryError> {
        self.state.apply_move(&self.seats, player_id, cell)?;
        Ok(&self.state)
    }

    /// Clears the board for any seated player.
    pub(crate) fn reset_game(&mut self, player_id: &str) -> Result<&GameState, RegistryError> {
        if self.seat_of(player_id).is_none() {
            return Err(RegistryError::new(parlor_tictactoe::MoveError::InvalidTurn));
        }
        self.state.reset();
        info!(room_id = %self.id, player_id, "Game reset");
        Ok(&self.state)
    }

    /// Full snapshot for a seated or watching client.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            seats: self.seats.clone(),
            display_names: self.display_names.clone(),
            is_full: self.is_full(),
            state: self.state.clone(),
        }
    }

    /// Lobby summary.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            occupant_count: self.seats.len(),
            is_full: self.is_full(),
            seats: self.seats.clone(),
            win_counts: self.state.win_counts().clone(),
        }
    }
}

/// Room snapshot returned by join and state reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room id.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Seated players in seat order.
    pub seats: Vec<PlayerId>,
    /// Display name per seated player.
    pub display_names: BTreeMap<PlayerId, String>,
    /// Both seats taken.
    pub is_full: bool,
    /// Authoritative game state.
    pub state: GameState,
}

impl RoomSnapshot {
    /// Seat index held by `player_id`.
    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.seats.iter().position(|p| p == player_id)
    }
}

/// Room entry in the lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// Room id.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Number of seated players.
    pub occupant_count: usize,
    /// Both seats taken.
    pub is_full: bool,
    /// Seated players in seat order.
    pub seats: Vec<PlayerId>,
    /// Games won per player.
    pub win_counts: BTreeMap<PlayerId, u32>,
}
