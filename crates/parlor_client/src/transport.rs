//! Request/response transport to the game server.

use crate::error::ClientError;
use async_trait::async_trait;
use parlor_server::{
    ErrorBody, GameAction, GameStateResponse, JoinRequest, JoinResponse, LeaveRequest,
    RoomSnapshot, RoomSummary,
};
use parlor_tictactoe::GameState;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Operations a client can request from the authoritative server.
#[async_trait]
pub trait GameTransport: Send + Sync {
    /// Lists every room in the pool.
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, ClientError>;

    /// Takes a seat, or confirms one already held.
    async fn join_room(
        &self,
        room_id: &str,
        player_id: &str,
        display_name: &str,
    ) -> Result<RoomSnapshot, ClientError>;

    /// Gives up a seat.
    async fn leave_room(&self, room_id: &str, player_id: &str) -> Result<(), ClientError>;

    /// Reads the authoritative room snapshot.
    async fn fetch_room(&self, room_id: &str) -> Result<RoomSnapshot, ClientError>;

    /// Plays a cell.
    async fn make_move(
        &self,
        room_id: &str,
        player_id: &str,
        cell: usize,
    ) -> Result<GameState, ClientError>;

    /// Clears the board, keeping tallies.
    async fn reset_game(&self, room_id: &str, player_id: &str) -> Result<GameState, ClientError>;
}

/// HTTP client for the game server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport for the server at `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decodes a success body, or turns an error body into [`ClientError`].
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                warn!(error = %e, "Failed to decode response body");
                ClientError::transport(e)
            });
        }

        let text = response.text().await?;
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => {
                debug!(%status, code = %body.code, "Server rejected request");
                Err(ClientError::Rejected {
                    code: body.code,
                    message: body.error,
                })
            }
            Err(_) => {
                warn!(%status, body = %text, "Unrecognized error response");
                Err(ClientError::transport(format!("HTTP {}: {}", status, text)))
            }
        }
    }

    async fn post_action(&self, room_id: &str, action: &GameAction) -> Result<GameState, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/api/tictactoe/{}/state", room_id)))
            .json(action)
            .send()
            .await?;
        let body: GameStateResponse = Self::decode(response).await?;
        Ok(body.game_state)
    }
}

#[async_trait]
impl GameTransport for HttpTransport {
    #[instrument(skip(self))]
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, ClientError> {
        let response = self.client.get(self.url("/api/tictactoe/rooms")).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn join_room(
        &self,
        room_id: &str,
        player_id: &str,
        display_name: &str,
    ) -> Result<RoomSnapshot, ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/api/tictactoe/{}/join", room_id)))
            .json(&JoinRequest::new(player_id.to_string(), display_name.to_string()))
            .send()
            .await?;
        let body: JoinResponse = Self::decode(response).await?;
        debug!(message = %body.message, "Join answered");
        Ok(body.room)
    }

    #[instrument(skip(self))]
    async fn leave_room(&self, room_id: &str, player_id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tictactoe/{}/join", room_id)))
            .json(&LeaveRequest::new(player_id.to_string()))
            .send()
            .await?;
        let _: parlor_server::Ack = Self::decode(response).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_room(&self, room_id: &str) -> Result<RoomSnapshot, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/tictactoe/{}/state", room_id)))
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn make_move(
        &self,
        room_id: &str,
        player_id: &str,
        cell: usize,
    ) -> Result<GameState, ClientError> {
        let action = GameAction::MakeMove {
            player_id: player_id.to_string(),
            index: Some(cell),
        };
        self.post_action(room_id, &action).await
    }

    #[instrument(skip(self))]
    async fn reset_game(&self, room_id: &str, player_id: &str) -> Result<GameState, ClientError> {
        let action = GameAction::ResetGame {
            player_id: player_id.to_string(),
        };
        self.post_action(room_id, &action).await
    }
}
