//! HTTP transport binding the registry and chat log to request/response routes.

use crate::chat::{ChatLog, ChatMessage, NewChatMessage};
use crate::error::{ErrorCode, RegistryError};
use crate::registry::RoomRegistry;
use crate::room::{JoinOutcome, RoomSnapshot, RoomSummary};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use derive_new::new;
use parlor_tictactoe::{GameState, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, instrument, warn};

/// Shared state behind every handler.
#[derive(Debug, new)]
pub struct AppState {
    /// Room table.
    pub registry: RoomRegistry,
    /// Chat collaborator.
    #[new(default)]
    pub chat: ChatLog,
}

/// Body of a join request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Caller's opaque id.
    #[serde(default)]
    pub player_id: PlayerId,
    /// Caller's display name.
    #[serde(default)]
    pub player_name: String,
}

/// Body of a leave request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Caller's opaque id.
    #[serde(default)]
    pub player_id: PlayerId,
}

/// Game action posted to a room's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameAction {
    /// Place the caller's symbol.
    MakeMove {
        /// Acting player.
        #[serde(default)]
        player_id: PlayerId,
        /// Target cell, 0-8.
        #[serde(default)]
        index: Option<usize>,
    },
    /// Clear the board, keeping tallies.
    ResetGame {
        /// Acting player.
        #[serde(default)]
        player_id: PlayerId,
    },
}

/// Successful join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Room after the join.
    pub room: RoomSnapshot,
}

/// Bare acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Successful move or reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    /// Always `true`.
    pub success: bool,
    /// Authoritative state after the action.
    pub game_state: GameState,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: ErrorCode,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = if code.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        let body = ErrorBody {
            error: self.kind.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the router for all game and chat routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tictactoe/rooms", get(list_rooms))
        .route(
            "/api/tictactoe/{room_id}/state",
            get(get_state).post(post_action),
        )
        .route(
            "/api/tictactoe/{room_id}/join",
            axum::routing::post(join_room).delete(leave_room),
        )
        .route("/api/chat/{room}", get(list_chat).post(post_chat))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

#[instrument(skip(state))]
async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    Json(state.registry.list_rooms().await)
}

#[instrument(skip(state))]
async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, RegistryError> {
    Ok(Json(state.registry.get_room(&room_id).await?))
}

#[instrument(skip(state, action))]
async fn post_action(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(action): Json<GameAction>,
) -> Result<Json<GameStateResponse>, RegistryError> {
    let game_state = match action {
        GameAction::MakeMove { player_id, index } => {
            state.registry.apply_move(&room_id, &player_id, index).await
        }
        GameAction::ResetGame { player_id } => state.registry.reset_game(&room_id, &player_id).await,
    }
    .map_err(|e| {
        warn!(error = %e.kind, "Game action rejected");
        e
    })?;

    Ok(Json(GameStateResponse {
        success: true,
        game_state,
    }))
}

#[instrument(skip(state, req), fields(player_id = %req.player_id))]
async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, RegistryError> {
    let (room, outcome) = state
        .registry
        .join_room(&room_id, &req.player_id, &req.player_name)
        .await?;
    let message = match outcome {
        JoinOutcome::Joined { .. } => "Joined room successfully",
        JoinOutcome::AlreadySeated { .. } => "Already in room",
    };
    Ok(Json(JoinResponse {
        success: true,
        message: message.to_string(),
        room,
    }))
}

#[instrument(skip(state, req), fields(player_id = %req.player_id))]
async fn leave_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(req): Json<LeaveRequest>,
) -> Result<Json<Ack>, RegistryError> {
    state.registry.leave_room(&room_id, &req.player_id).await?;
    Ok(Json(Ack {
        success: true,
        message: "Left room successfully".to_string(),
    }))
}

#[instrument(skip(state))]
async fn list_chat(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Json<Vec<ChatMessage>> {
    Json(state.chat.list(&room).await)
}

#[instrument(skip(state, message))]
async fn post_chat(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Json(message): Json<NewChatMessage>,
) -> Result<Json<ChatMessage>, RegistryError> {
    Ok(Json(state.chat.append(&room, message).await?))
}
