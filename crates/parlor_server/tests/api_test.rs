//! Tests for the HTTP request/response contract.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use parlor_server::{AppState, RoomRegistry, ServerConfig, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let registry = RoomRegistry::from_config(ServerConfig::default().rooms());
    router(Arc::new(AppState::new(registry)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn join(app: &Router, room: &str, player: &str, name: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/api/tictactoe/{room}/join"),
        Some(json!({ "playerId": player, "playerName": name })),
    )
    .await
}

async fn play(app: &Router, room: &str, player: &str, index: usize) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/api/tictactoe/{room}/state"),
        Some(json!({ "action": "makeMove", "playerId": player, "index": index })),
    )
    .await
}

#[tokio::test]
async fn test_list_rooms_shape() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/tictactoe/rooms", None).await;
    assert_eq!(status, StatusCode::OK);
    let rooms = body.as_array().unwrap();
    assert_eq!(rooms.len(), 8);
    assert_eq!(rooms[1]["id"], "room2");
    assert_eq!(rooms[1]["name"], "Crystal Palace");
    assert_eq!(rooms[1]["occupantCount"], 0);
    assert_eq!(rooms[1]["isFull"], false);
    assert_eq!(rooms[1]["seats"], json!([]));
    assert_eq!(rooms[1]["winCounts"], json!({}));
}

#[tokio::test]
async fn test_join_seats_two_players() {
    let app = app();
    let (status, body) = join(&app, "room1", "p1", "Alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["seats"], json!(["p1"]));
    assert_eq!(body["room"]["isFull"], false);

    let (status, body) = join(&app, "room1", "p2", "Bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Joined room successfully");
    assert_eq!(body["room"]["seats"], json!(["p1", "p2"]));
    assert_eq!(body["room"]["isFull"], true);
    assert_eq!(body["room"]["displayNames"]["p2"], "Bob");
    assert_eq!(body["room"]["state"]["winCounts"], json!({ "p1": 0, "p2": 0 }));
}

#[tokio::test]
async fn test_rejoin_is_idempotent() {
    let app = app();
    join(&app, "room1", "p1", "Alice").await;
    let (status, body) = join(&app, "room1", "p1", "Alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Already in room");
    assert_eq!(body["room"]["seats"], json!(["p1"]));
}

#[tokio::test]
async fn test_join_errors() {
    let app = app();
    let (status, body) = join(&app, "nowhere", "p1", "Alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RoomNotFound");

    let (status, body) = join(&app, "room1", "p1", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MissingField");

    join(&app, "room1", "p1", "Alice").await;
    join(&app, "room1", "p2", "Bob").await;
    let (status, body) = join(&app, "room1", "p3", "Carol").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "RoomFull");
    assert!(body["error"].as_str().unwrap().contains("full"));
}

#[tokio::test]
async fn test_out_of_turn_move_rejected() {
    let app = app();
    join(&app, "room1", "p1", "Alice").await;
    join(&app, "room1", "p2", "Bob").await;

    let (status, body) = play(&app, "room1", "p2", 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidTurn");

    let (_, room) = send(&app, Method::GET, "/api/tictactoe/room1/state", None).await;
    assert_eq!(room["state"]["cells"], json!([null, null, null, null, null, null, null, null, null]));
}

#[tokio::test]
async fn test_occupied_cell_rejected() {
    let app = app();
    join(&app, "room1", "p1", "Alice").await;
    join(&app, "room1", "p2", "Bob").await;
    play(&app, "room1", "p1", 4).await;
    play(&app, "room1", "p2", 0).await;

    let (status, body) = play(&app, "room1", "p1", 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CellOccupied");

    let (_, room) = send(&app, Method::GET, "/api/tictactoe/room1/state", None).await;
    assert_eq!(room["state"]["cells"][0], "B");
    assert_eq!(room["state"]["nextSymbolIsA"], true);
}

#[tokio::test]
async fn test_win_then_terminal_then_reset() {
    let app = app();
    join(&app, "room1", "p1", "Alice").await;
    join(&app, "room1", "p2", "Bob").await;
    for (player, cell) in [("p1", 0), ("p2", 4), ("p1", 1), ("p2", 5)] {
        let (status, _) = play(&app, "room1", player, cell).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = play(&app, "room1", "p1", 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["gameState"]["winner"], "A");
    assert_eq!(body["gameState"]["winningLine"], json!([0, 1, 2]));
    assert_eq!(body["gameState"]["winCounts"]["p1"], 1);
    assert_eq!(body["gameState"]["nextSymbolIsA"], true);

    for (player, cell) in [("p1", 8), ("p2", 8), ("p2", 0)] {
        let (status, body) = play(&app, "room1", player, cell).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "AlreadyTerminal");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tictactoe/room1/state",
        Some(json!({ "action": "resetGame", "playerId": "p2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["gameState"]["winner"].is_null());
    assert!(body["gameState"]["winningLine"].is_null());
    assert_eq!(body["gameState"]["winCounts"], json!({ "p1": 1, "p2": 0 }));

    let (_, rooms) = send(&app, Method::GET, "/api/tictactoe/rooms", None).await;
    assert_eq!(rooms[0]["winCounts"]["p1"], 1);
}

#[tokio::test]
async fn test_move_without_index_is_missing_field() {
    let app = app();
    join(&app, "room1", "p1", "Alice").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tictactoe/room1/state",
        Some(json!({ "action": "makeMove", "playerId": "p1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MissingField");
}

#[tokio::test]
async fn test_move_in_unknown_room() {
    let app = app();
    let (status, body) = play(&app, "room0", "p1", 0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RoomNotFound");
}

#[tokio::test]
async fn test_leave_keeps_remaining_tally() {
    let app = app();
    join(&app, "room3", "p1", "Alice").await;
    join(&app, "room3", "p2", "Bob").await;
    for (player, cell) in [("p1", 0), ("p2", 4), ("p1", 1), ("p2", 5), ("p1", 2)] {
        play(&app, "room3", player, cell).await;
    }

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/tictactoe/room3/join",
        Some(json!({ "playerId": "p2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, room) = send(&app, Method::GET, "/api/tictactoe/room3/state", None).await;
    assert_eq!(room["seats"], json!(["p1"]));
    assert_eq!(room["isFull"], false);
    assert_eq!(room["state"]["winCounts"], json!({ "p1": 1 }));
    assert!(room["state"]["winner"].is_null());

    send(
        &app,
        Method::DELETE,
        "/api/tictactoe/room3/join",
        Some(json!({ "playerId": "p1" })),
    )
    .await;
    let (_, room) = send(&app, Method::GET, "/api/tictactoe/room3/state", None).await;
    assert_eq!(room["seats"], json!([]));
    assert_eq!(room["displayNames"], json!({}));
    assert_eq!(room["state"]["winCounts"], json!({}));
}

#[tokio::test]
async fn test_leave_when_absent_succeeds() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/tictactoe/room1/join",
        Some(json!({ "playerId": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_chat_relay() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat/room1",
        Some(json!({ "text": "gg", "senderId": "p1", "displayName": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["senderId"], "p1");
    assert!(body["timestamp"].is_string());

    let (_, list) = send(&app, Method::GET, "/api/chat/room1", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["text"], "gg");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat/room1",
        Some(json!({ "senderId": "p1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MissingField");
}
