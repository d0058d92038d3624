//! End-to-end tests: a real server driven by WebSocket clients.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use sketchparty::prelude::*;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start_server_with(builder: SketchServerBuilder) -> String {
    let server = builder
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn start_server() -> String {
    start_server_with(SketchServer::builder()).await
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::Text(frame.into())).await.expect("send");
}

/// Next JSON event from the server.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("recv error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("server sent invalid JSON");
        }
    }
}

/// Skips events until one named `name` arrives.
async fn recv_event(ws: &mut ClientWs, name: &str) -> Value {
    loop {
        let event = recv(ws).await;
        if event["event"] == name {
            return event;
        }
    }
}

/// Connects a client and creates a room. Returns the room id.
async fn create_room(addr: &str, username: &str) -> (ClientWs, String) {
    let mut ws = connect(addr).await;
    send(&mut ws, "create-room", json!({ "username": username })).await;
    let created = recv_event(&mut ws, "room-created").await;
    let room_id = created["data"]["roomId"]
        .as_str()
        .expect("room id")
        .to_string();
    (ws, room_id)
}

async fn join_room(addr: &str, room_id: &str, username: &str) -> (ClientWs, Value) {
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        "join-room",
        json!({ "roomId": room_id, "username": username }),
    )
    .await;
    let joined = recv_event(&mut ws, "room-joined").await;
    (ws, joined)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_hex_id_and_admin() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        "create-room",
        json!({ "username": "ana", "avatar": { "eye": { "x": 1.0, "y": 2.0 } } }),
    )
    .await;
    let created = recv(&mut ws).await;

    assert_eq!(created["event"], "room-created");
    let room_id = created["data"]["roomId"].as_str().unwrap();
    assert_eq!(room_id.len(), 8);
    assert!(room_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(created["data"]["member"]["username"], "ana");
    assert_eq!(created["data"]["member"]["isAdmin"], true);
    assert_eq!(created["data"]["member"]["avatar"]["eye"]["x"], 1.0);
}

#[tokio::test]
async fn test_join_unknown_room_reports_not_found() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        "join-room",
        json!({ "roomId": "00000000", "username": "ben" }),
    )
    .await;
    let reply = recv(&mut ws).await;

    assert_eq!(reply["event"], "room-not-found");
    assert_eq!(reply["data"]["roomId"], "00000000");
}

#[tokio::test]
async fn test_join_notifies_room() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (_ben, joined) = join_room(&addr, &room_id, "ben").await;

    assert_eq!(joined["data"]["roomId"], room_id.as_str());
    assert_eq!(joined["data"]["members"].as_array().unwrap().len(), 2);
    assert_eq!(joined["data"]["member"]["isAdmin"], false);

    let update = recv_event(&mut admin, "update-members").await;
    assert_eq!(update["data"]["members"].as_array().unwrap().len(), 2);
    let note = recv_event(&mut admin, "notification").await;
    assert_eq!(note["data"]["title"], "New member arrived!");
    assert_eq!(note["data"]["message"], "ben joined the party.");
}

#[tokio::test]
async fn test_invalid_frame_gets_error_event() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json".to_string().into())).await.unwrap();
    let reply = recv(&mut ws).await;

    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], 400);
}

#[tokio::test]
async fn test_non_admin_cannot_start() {
    let addr = start_server().await;
    let (_admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;

    send(&mut ben, "start-game", json!({ "roomId": room_id })).await;
    let reply = recv_event(&mut ben, "error").await;
    assert_eq!(reply["data"]["code"], 403);
}

#[tokio::test]
async fn test_event_for_foreign_room_is_rejected() {
    let addr = start_server().await;
    let (_admin, room_id) = create_room(&addr, "ana").await;
    let mut outsider = connect(&addr).await;

    send(
        &mut outsider,
        "draw",
        json!({ "roomId": room_id, "drawOptions": { "x": 1 } }),
    )
    .await;
    let reply = recv(&mut outsider).await;
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], 400);
}

#[tokio::test]
async fn test_draw_is_relayed_to_other_members() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;

    send(
        &mut admin,
        "draw",
        json!({ "roomId": room_id, "drawOptions": { "color": "#f00", "points": [[0, 0], [5, 5]] } }),
    )
    .await;

    let update = recv_event(&mut ben, "update-canvas-state").await;
    assert_eq!(update["data"]["drawOptions"]["color"], "#f00");
}

#[tokio::test]
async fn test_full_turn_over_the_wire() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;

    send(&mut admin, "start-game", json!({ "roomId": room_id })).await;
    let started = recv_event(&mut ben, "game-started").await;
    assert_eq!(started["data"]["state"]["phase"], "started");

    send(&mut admin, "choose-drawer", json!({ "roomId": room_id })).await;
    let state = recv_event(&mut ben, "game-state").await;
    assert_eq!(state["data"]["state"]["phase"], "choosing-word");
    let drawer = state["data"]["state"]["drawer"].clone();
    assert_eq!(drawer, started["data"]["state"]["drawer"]);

    send(
        &mut admin,
        "select-word",
        json!({ "roomId": room_id, "word": "giraffe" }),
    )
    .await;
    let selected = recv_event(&mut ben, "word-selected").await;
    assert_eq!(selected["data"]["word"], "giraffe");

    send(
        &mut ben,
        "submit-guess",
        json!({ "roomId": room_id, "guessedAtSeconds": 20 }),
    )
    .await;
    recv_event(&mut ben, "game-state").await;

    send(&mut admin, "request-scoring", json!({ "roomId": room_id })).await;
    let scored = recv_event(&mut ben, "game-state").await;
    let scores = &scored["data"]["state"]["score"];
    let totals: Vec<u64> = scores
        .as_object()
        .unwrap()
        .values()
        .map(|s| s["score"].as_u64().unwrap())
        .collect();
    assert!(totals.contains(&175), "guesser earns fast points: {scores}");
    assert!(totals.contains(&100), "drawer earns majority bonus: {scores}");
}

#[tokio::test]
async fn test_chat_message_reaches_sender_too() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;

    send(
        &mut ben,
        "broadcast-message",
        json!({ "roomId": room_id, "message": "hello" }),
    )
    .await;

    for ws in [&mut admin, &mut ben] {
        let chat = recv_event(ws, "chat-message").await;
        assert_eq!(chat["data"]["username"], "ben");
        assert_eq!(chat["data"]["message"], "hello");
    }
}

#[tokio::test]
async fn test_client_ready_alone_gets_client_loaded() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;

    send(&mut admin, "client-ready", json!({ "roomId": room_id })).await;
    let reply = recv(&mut admin).await;
    assert_eq!(reply, json!({ "event": "client-loaded" }));
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_members() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;
    recv_event(&mut admin, "notification").await;

    ben.close(None).await.unwrap();

    let note = recv_event(&mut admin, "notification").await;
    assert_eq!(note["data"]["title"], "Member departure!");
    assert_eq!(note["data"]["message"], "ben left the party.");
}

#[tokio::test]
async fn test_stop_game_closes_room() {
    let addr = start_server().await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;

    send(&mut admin, "stop-game", json!({ "roomId": room_id })).await;
    recv_event(&mut admin, "game-stopped").await;
    recv_event(&mut ben, "game-stopped").await;

    // The room is gone.
    let mut cy = connect(&addr).await;
    send(
        &mut cy,
        "join-room",
        json!({ "roomId": room_id, "username": "cy" }),
    )
    .await;
    assert_eq!(recv(&mut cy).await["event"], "room-not-found");
}

#[tokio::test]
async fn test_idle_connection_is_dropped() {
    let addr = start_server_with(
        SketchServer::builder().idle_timeout(Duration::from_millis(100)),
    )
    .await;
    let (_admin, room_id) = create_room(&addr, "ana").await;

    // The idle admin is dropped, which empties and destroys the room.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut ws = connect(&addr).await;
    send(
        &mut ws,
        "join-room",
        json!({ "roomId": room_id, "username": "ben" }),
    )
    .await;
    assert_eq!(recv(&mut ws).await["event"], "room-not-found");
}

#[tokio::test]
async fn test_silent_member_is_kept_alive_by_heartbeat() {
    let addr = start_server_with(
        SketchServer::builder()
            .idle_timeout(Duration::from_millis(300))
            .heartbeat_interval(Duration::from_millis(100)),
    )
    .await;
    let (mut admin, room_id) = create_room(&addr, "ana").await;
    let (mut ben, _) = join_room(&addr, &room_id, "ben").await;

    // ben only watches: it reads (answering pings) but never sends.
    let watcher = tokio::spawn(async move {
        let mut strokes = 0;
        let _ = tokio::time::timeout(Duration::from_millis(900), async {
            while let Some(Ok(msg)) = ben.next().await {
                if msg.is_text() {
                    strokes += 1;
                }
            }
        })
        .await;
        (ben, strokes)
    });

    for _ in 0..8 {
        send(
            &mut admin,
            "draw",
            json!({ "roomId": room_id, "drawOptions": { "x": 1 } }),
        )
        .await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let (_ben, strokes) = watcher.await.expect("watcher task");
    assert!(strokes > 0, "ben should have seen the drawing");

    let (_cy, joined) = join_room(&addr, &room_id, "cy").await;
    assert_eq!(
        joined["data"]["members"].as_array().unwrap().len(),
        3,
        "silent member must still be in the room"
    );
}
