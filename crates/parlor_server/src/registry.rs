//! Fixed pool of rooms with per-room exclusive locks.

use crate::config::RoomConfig;
use crate::error::RegistryError;
use crate::room::{JoinOutcome, Room, RoomSnapshot, RoomSummary};
use parlor_tictactoe::GameState;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Process-wide room table.
///
/// The set of rooms is fixed at construction. Every operation on a room
/// runs under that room's lock, so checks and writes against the same room
/// are serialized and always see the latest state.
#[derive(Debug)]
pub struct RoomRegistry {
    order: Vec<String>,
    rooms: HashMap<String, Mutex<Room>>,
}

impl RoomRegistry {
    /// Materializes the pool. Later entries with a repeated id are ignored.
    #[instrument(skip(pool), fields(count = pool.len()))]
    pub fn from_config(pool: &[RoomConfig]) -> Self {
        let mut order = Vec::with_capacity(pool.len());
        let mut rooms = HashMap::with_capacity(pool.len());
        for entry in pool {
            if rooms.contains_key(entry.id()) {
                warn!(room_id = %entry.id(), "Duplicate room id skipped");
                continue;
            }
            order.push(entry.id().clone());
            rooms.insert(entry.id().clone(), Mutex::new(Room::new(entry.id(), entry.name())));
        }
        info!(rooms = order.len(), "Room pool materialized");
        Self { order, rooms }
    }

    /// Room ids in pool order.
    pub fn room_ids(&self) -> &[String] {
        &self.order
    }

    /// Number of rooms in the pool.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Checks if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[track_caller]
    fn room(&self, room_id: &str) -> Result<&Mutex<Room>, RegistryError> {
        self.rooms
            .get(room_id)
            .ok_or_else(|| RegistryError::room_not_found(room_id))
    }

    /// Lists every room in pool order.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut summaries = Vec::with_capacity(self.order.len());
        for id in &self.order {
            if let Some(room) = self.rooms.get(id) {
                summaries.push(room.lock().await.summary());
            }
        }
        debug!(count = summaries.len(), "Listed rooms");
        summaries
    }

    /// Returns a snapshot of one room.
    ///
    /// # Errors
    ///
    /// Returns `RoomNotFound` for an id outside the pool.
    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: &str) -> Result<RoomSnapshot, RegistryError> {
        let room = self.room(room_id)?;
        Ok(room.lock().await.snapshot())
    }

    /// Seats a player, or confirms an existing seat.
    ///
    /// # Errors
    ///
    /// `RoomNotFound`, `MissingField` for an empty id or name, `RoomFull`
    /// when two other players hold the seats.
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        room_id: &str,
        player_id: &str,
        display_name: &str,
    ) -> Result<(RoomSnapshot, JoinOutcome), RegistryError> {
        let room = self.room(room_id)?;
        if player_id.is_empty() {
            return Err(RegistryError::missing_field("playerId"));
        }
        if display_name.is_empty() {
            return Err(RegistryError::missing_field("playerName"));
        }

        let mut room = room.lock().await;
        let outcome = room.join(player_id, display_name).map_err(|e| {
            warn!(error = %e.kind, "Join refused");
            e
        })?;
        Ok((room.snapshot(), outcome))
    }

    /// Removes a player from a room. Leaving a room you are not in succeeds.
    ///
    /// Returns whether the player was actually seated.
    ///
    /// # Errors
    ///
    /// `RoomNotFound`, or `MissingField` for an empty player id.
    #[instrument(skip(self))]
    pub async fn leave_room(&self, room_id: &str, player_id: &str) -> Result<bool, RegistryError> {
        let room = self.room(room_id)?;
        if player_id.is_empty() {
            return Err(RegistryError::missing_field("playerId"));
        }
        Ok(room.lock().await.leave(player_id))
    }

    /// Plays `cell` for `player_id` and returns the updated state.
    ///
    /// # Errors
    ///
    /// `RoomNotFound`, `MissingField` when `cell` or the player id is absent,
    /// or any move rejection from the state machine. Rejections leave the
    /// room untouched.
    #[instrument(skip(self))]
    pub async fn apply_move(
        &self,
        room_id: &str,
        player_id: &str,
        cell: Option<usize>,
    ) -> Result<GameState, RegistryError> {
        let room = self.room(room_id)?;
        let Some(cell) = cell else {
            return Err(RegistryError::missing_field("index"));
        };
        if player_id.is_empty() {
            return Err(RegistryError::missing_field("playerId"));
        }

        let mut room = room.lock().await;
        let state = room.apply_move(player_id, cell)?;
        info!(room_id, player_id, cell, winner = ?state.winner(), "Move accepted");
        Ok(state.clone())
    }

    /// Clears the board for a seated player, keeping tallies.
    ///
    /// # Errors
    ///
    /// `RoomNotFound`, `MissingField` for an empty id, `InvalidTurn` when
    /// the player holds no seat.
    #[instrument(skip(self))]
    pub async fn reset_game(&self, room_id: &str, player_id: &str) -> Result<GameState, RegistryError> {
        let room = self.room(room_id)?;
        if player_id.is_empty() {
            return Err(RegistryError::missing_field("playerId"));
        }
        let mut room = room.lock().await;
        Ok(room.reset_game(player_id)?.clone())
    }
}
