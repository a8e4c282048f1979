//! End-to-end tests: real WebSocket clients against a running server.
//!
//! Uses a scripted engine (question N answered by "aN") and a fast
//! `RoomConfig` so full games fit in milliseconds of wall clock. Reads go
//! through `expect_type`, which skips unrelated broadcasts (time ticks)
//! until the wanted message kind arrives.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use tugquiz::TugquizServer;
use tugquiz_room::{GameEngine, Question, RoomConfig};

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// =========================================================================
// Scripted engine
// =========================================================================

struct ScriptedEngine {
    dealt: u32,
    current: Option<Question>,
}

impl GameEngine for ScriptedEngine {
    fn required_players(&self) -> usize {
        2
    }

    fn round_duration(&self) -> u64 {
        // Long enough that a round never expires mid-test; rounds end via
        // correct answers only.
        50
    }

    fn next_question(&mut self) -> Question {
        self.dealt += 1;
        let question = Question {
            id: self.dealt,
            text: format!("q{}", self.dealt),
            choices: vec![format!("a{}", self.dealt), "wrong".into()],
            answer: format!("a{}", self.dealt),
        };
        self.current = Some(question.clone());
        question
    }

    fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    fn shared_state(&self) -> f32 {
        0.5
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn fast_config() -> RoomConfig {
    RoomConfig {
        countdown: Duration::from_millis(100),
        tick: Duration::from_millis(100),
        round_gap: Duration::from_millis(50),
        teardown_delay: Duration::from_millis(200),
        reconnect_grace: Duration::from_secs(3),
        ..RoomConfig::default()
    }
}

/// Starts a server on an ephemeral port and returns its ws:// URL.
async fn start_server() -> String {
    let server = TugquizServer::builder()
        .bind("127.0.0.1:0")
        .room_config(fast_config())
        .build(|| {
            Box::new(ScriptedEngine {
                dealt: 0,
                current: None,
            }) as Box<dyn GameEngine>
        })
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    format!("ws://{addr}")
}

async fn connect(url: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("connect should succeed");
    ws
}

async fn send(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

/// Reads the next text frame as JSON, with a timeout.
async fn next_msg(ws: &mut Ws) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended unexpectedly")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str())
                    .expect("frame should be JSON");
            }
            Message::Close(_) => panic!("connection closed while reading"),
            _ => continue,
        }
    }
}

/// Reads until a message of the given `type` arrives, skipping others.
async fn expect_type(ws: &mut Ws, kind: &str) -> Value {
    for _ in 0..32 {
        let msg = next_msg(ws).await;
        if msg["type"] == kind {
            return msg;
        }
    }
    panic!("no {kind} message within 32 frames");
}

/// Connects and introduces a player; returns the socket and player id.
async fn hello(url: &str, name: &str) -> (Ws, u64) {
    let mut ws = connect(url).await;
    send(&mut ws, json!({"type": "Hello", "name": name})).await;
    let welcome = next_msg(&mut ws).await;
    assert_eq!(welcome["type"], "Welcome");
    let player_id = welcome["player_id"].as_u64().expect("numeric id");
    (ws, player_id)
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_hello_assigns_identity() {
    let url = start_server().await;
    let (_ws, player_id) = hello(&url, "ada").await;
    assert!(player_id > 0);
}

#[tokio::test]
async fn test_command_before_hello_is_rejected() {
    let url = start_server().await;
    let mut ws = connect(&url).await;

    send(&mut ws, json!({"type": "CreateRoom"})).await;

    let msg = next_msg(&mut ws).await;
    assert_eq!(msg["type"], "Error");
}

#[tokio::test]
async fn test_reconnect_without_record_is_rejected() {
    let url = start_server().await;
    let mut ws = connect(&url).await;

    send(&mut ws, json!({"type": "Reconnect", "player_id": 424242})).await;

    let msg = next_msg(&mut ws).await;
    assert_eq!(msg["type"], "Error");
}

// =========================================================================
// Rooms over the wire
// =========================================================================

#[tokio::test]
async fn test_create_list_join_flow() {
    let url = start_server().await;
    let (mut ws1, _) = hello(&url, "ada").await;
    let (mut ws2, _) = hello(&url, "grace").await;

    send(&mut ws1, json!({"type": "CreateRoom"})).await;
    let created = next_msg(&mut ws1).await;
    assert_eq!(created["type"], "RoomCreated");
    let room_id = created["room_id"].clone();

    send(&mut ws2, json!({"type": "ListRooms"})).await;
    let list = next_msg(&mut ws2).await;
    assert_eq!(list["type"], "RoomList");
    assert_eq!(list["rooms"][0]["id"], room_id);
    assert_eq!(list["rooms"][0]["player_count"], 1);
    assert_eq!(list["rooms"][0]["state"], "Lobby");
    assert_eq!(list["rooms"][0]["players"][0], "ada");

    send(&mut ws2, json!({"type": "JoinRoom", "room_id": room_id})).await;
    let joined = next_msg(&mut ws2).await;
    assert_eq!(joined["type"], "RoomJoined");
}

#[tokio::test]
async fn test_join_full_room_reports_error() {
    let url = start_server().await;
    let (mut ws1, _) = hello(&url, "ada").await;
    let (mut ws2, _) = hello(&url, "grace").await;
    let (mut ws3, _) = hello(&url, "hedy").await;

    send(&mut ws1, json!({"type": "CreateRoom"})).await;
    let room_id = next_msg(&mut ws1).await["room_id"].clone();
    send(&mut ws2, json!({"type": "JoinRoom", "room_id": room_id})).await;
    next_msg(&mut ws2).await;

    send(&mut ws3, json!({"type": "JoinRoom", "room_id": room_id})).await;
    let msg = next_msg(&mut ws3).await;
    assert_eq!(msg["type"], "Error");
    assert!(msg["message"].as_str().unwrap().contains("full"));
}

#[tokio::test]
async fn test_start_game_before_enough_players_reports_error() {
    let url = start_server().await;
    let (mut ws1, _) = hello(&url, "ada").await;

    send(&mut ws1, json!({"type": "CreateRoom"})).await;
    next_msg(&mut ws1).await;
    send(&mut ws1, json!({"type": "StartGame"})).await;

    let msg = next_msg(&mut ws1).await;
    assert_eq!(msg["type"], "Error");
    assert!(msg["message"].as_str().unwrap().contains("2"));
}

// =========================================================================
// A full duel over the wire
// =========================================================================

#[tokio::test]
async fn test_full_round_with_early_winner() {
    let url = start_server().await;
    let (mut ws1, _) = hello(&url, "ada").await;
    let (mut ws2, _) = hello(&url, "grace").await;

    send(&mut ws1, json!({"type": "CreateRoom"})).await;
    let room_id = next_msg(&mut ws1).await["room_id"].clone();
    send(&mut ws2, json!({"type": "JoinRoom", "room_id": room_id})).await;
    next_msg(&mut ws2).await;

    send(&mut ws1, json!({"type": "StartGame"})).await;

    // Both players watch the countdown and the first deal.
    for ws in [&mut ws1, &mut ws2] {
        let state_change = expect_type(ws, "RoomStateChanged").await;
        assert_eq!(state_change["state"], "Countdown");
        let round = expect_type(ws, "RoundUpdate").await;
        assert_eq!(round["state"], "Playing");
        assert_eq!(round["shared_value"], 0.5);
        assert_eq!(round["question"]["text"], "q1");
        assert!(
            round["question"].get("answer").is_none(),
            "answer must not reach clients"
        );
    }

    // First joiner answers correctly: result, reveal, cursor pulled down.
    send(&mut ws1, json!({"type": "Answer", "answer": "a1"})).await;

    for ws in [&mut ws1, &mut ws2] {
        let result = expect_type(ws, "AnswerResult").await;
        assert_eq!(result["player"], "ada");
        assert_eq!(result["correct"], true);
        let end = expect_type(ws, "RoundEnd").await;
        assert_eq!(end["correct_answer"], "a1");
        let next_round = expect_type(ws, "RoundUpdate").await;
        assert_eq!(next_round["question"]["text"], "q2");
        let shared = next_round["shared_value"].as_f64().unwrap();
        assert!((shared - 0.4).abs() < 1e-6, "got {shared}");
    }
}

#[tokio::test]
async fn test_disconnect_notifies_and_reconnect_resumes() {
    let url = start_server().await;
    let (mut ws1, _) = hello(&url, "ada").await;
    let (mut ws2, p2) = hello(&url, "grace").await;

    send(&mut ws1, json!({"type": "CreateRoom"})).await;
    let room_id = next_msg(&mut ws1).await["room_id"].clone();
    send(&mut ws2, json!({"type": "JoinRoom", "room_id": room_id})).await;
    next_msg(&mut ws2).await;
    send(&mut ws1, json!({"type": "StartGame"})).await;
    expect_type(&mut ws1, "RoundUpdate").await;

    // The second player's socket dies mid-game.
    drop(ws2);
    let notice = expect_type(&mut ws1, "PlayerDisconnected").await;
    assert_eq!(notice["player"], "grace");

    // They come back on a fresh connection within the grace period.
    let mut ws2b = connect(&url).await;
    send(&mut ws2b, json!({"type": "Reconnect", "player_id": p2})).await;
    let welcome = next_msg(&mut ws2b).await;
    assert_eq!(welcome["type"], "Welcome");
    assert_eq!(welcome["player_id"].as_u64(), Some(p2));

    let notice = expect_type(&mut ws1, "PlayerReconnected").await;
    assert_eq!(notice["player"], "grace");

    // Play resumes with a brand-new question for both.
    let round = expect_type(&mut ws2b, "RoundUpdate").await;
    assert_eq!(round["state"], "Playing");
    assert_eq!(round["question"]["text"], "q2");
}
