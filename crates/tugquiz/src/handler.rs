//! Per-connection handler: handshake, command dispatch, disconnect.
//!
//! Each accepted socket gets its own task running [`handle_connection`].
//! The flow is:
//!   1. First frame must be `Hello { name }` (fresh identity) or
//!      `Reconnect { player_id }` (resume within the grace period)
//!   2. Reply `Welcome` and attach the outbound session
//!   3. Loop: decode commands, hand them to the room registry
//!   4. On close or error: run the disconnect path (grace period starts)

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitStream, StreamExt};
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use tugquiz_protocol::{ClientCommand, Codec, GameMessage, JsonCodec, PlayerId};
use tugquiz_session::Session;

use crate::TugquizError;
use crate::server::ServerState;

/// Counter for assigning player identities to fresh connections.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// How long a fresh connection gets to introduce itself.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type WsSource = SplitStream<WebSocketStream<TcpStream>>;
type Outbound = mpsc::UnboundedSender<String>;

/// Handles a single connection from accept to disconnect.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    state: Arc<ServerState>,
) -> Result<(), TugquizError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    // Outbound pump: every frame queued for this player — direct replies
    // and room broadcasts alike — goes through this channel to the socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let pump = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let (player_id, name) = match handshake(&state, &mut source, &tx).await {
        Ok(identity) => identity,
        Err(e) => {
            // Let queued error replies flush before the socket closes.
            drop(tx);
            let _ = pump.await;
            return Err(e);
        }
    };
    tracing::info!(%player_id, name, "player connected");

    while let Some(msg) = source.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                dispatch(&state, player_id, &name, text.as_str(), &tx);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // ping/pong handled by tungstenite
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        }
    }

    tracing::info!(%player_id, "connection closed");
    state.registry.handle_disconnect(player_id);
    drop(tx);
    let _ = pump.await;
    Ok(())
}

/// Waits for the introduction frame and resolves the player's identity.
async fn handshake(
    state: &Arc<ServerState>,
    source: &mut WsSource,
    tx: &Outbound,
) -> Result<(PlayerId, String), TugquizError> {
    let codec = JsonCodec;

    loop {
        let msg = match tokio::time::timeout(HANDSHAKE_TIMEOUT, source.next())
            .await
        {
            Ok(Some(Ok(msg))) => msg,
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(None) => {
                return Err(TugquizError::Handshake(
                    "connection closed before introduction".into(),
                ));
            }
            Err(_) => {
                return Err(TugquizError::Handshake(
                    "introduction timed out".into(),
                ));
            }
        };
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => {
                return Err(TugquizError::Handshake(
                    "connection closed before introduction".into(),
                ));
            }
            _ => continue,
        };

        let command: ClientCommand = match codec.decode(text.as_str()) {
            Ok(command) => command,
            Err(e) => {
                reply(tx, &GameMessage::Error {
                    message: "malformed command".into(),
                });
                tracing::debug!(error = %e, "undecodable handshake frame");
                continue;
            }
        };

        match command {
            ClientCommand::Hello { name } => {
                let player_id =
                    PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
                state
                    .sessions
                    .add(player_id, Session::new(player_id, tx.clone()));
                reply(tx, &GameMessage::Welcome { player_id });
                return Ok((player_id, name));
            }
            ClientCommand::Reconnect { player_id } => {
                let session = Session::new(player_id, tx.clone());
                match state.registry.handle_reconnect(player_id, session) {
                    Ok(name) => {
                        reply(tx, &GameMessage::Welcome { player_id });
                        return Ok((player_id, name));
                    }
                    Err(e) => {
                        reply(tx, &GameMessage::Error {
                            message: e.to_string(),
                        });
                        return Err(TugquizError::Handshake(e.to_string()));
                    }
                }
            }
            _ => {
                reply(tx, &GameMessage::Error {
                    message: "introduce yourself first".into(),
                });
                return Err(TugquizError::Handshake(
                    "first command must be Hello or Reconnect".into(),
                ));
            }
        }
    }
}

/// Routes one decoded command to the registry.
fn dispatch(
    state: &Arc<ServerState>,
    player_id: PlayerId,
    name: &str,
    text: &str,
    tx: &Outbound,
) {
    let command: ClientCommand = match JsonCodec.decode(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "undecodable command");
            reply(tx, &GameMessage::Error {
                message: "malformed command".into(),
            });
            return;
        }
    };

    match command {
        ClientCommand::Hello { .. } | ClientCommand::Reconnect { .. } => {
            reply(tx, &GameMessage::Error {
                message: "already introduced".into(),
            });
        }

        ClientCommand::CreateRoom => {
            if state.registry.room_for_player(player_id).is_some() {
                reply(tx, &GameMessage::Error {
                    message: "already in a room".into(),
                });
                return;
            }
            let room_id = state.registry.create_room(player_id, name);
            reply(tx, &GameMessage::RoomCreated { room_id });
        }

        ClientCommand::JoinRoom { room_id } => {
            if state.registry.room_for_player(player_id).is_some() {
                reply(tx, &GameMessage::Error {
                    message: "already in a room".into(),
                });
                return;
            }
            match state.registry.join_room(player_id, room_id, name) {
                Ok(()) => reply(tx, &GameMessage::RoomJoined { room_id }),
                Err(e) => reply(tx, &GameMessage::Error {
                    message: e.to_string(),
                }),
            }
        }

        ClientCommand::StartGame => {
            let Some(room_id) = state.registry.room_for_player(player_id)
            else {
                reply(tx, &GameMessage::Error {
                    message: "not in a room".into(),
                });
                return;
            };
            if let Err(e) = state.registry.start_game(room_id) {
                reply(tx, &GameMessage::Error {
                    message: e.to_string(),
                });
            }
        }

        ClientCommand::Answer { answer } => {
            // Absent room is a teardown race, not worth an error reply.
            if let Some(room_id) = state.registry.room_for_player(player_id) {
                state.registry.handle_answer(room_id, player_id, &answer);
            }
        }

        ClientCommand::ListRooms => {
            reply(tx, &GameMessage::RoomList {
                rooms: state.registry.active_rooms(),
            });
        }
    }
}

/// Queues a direct reply on the connection's outbound channel.
fn reply(tx: &Outbound, msg: &GameMessage) {
    match JsonCodec.encode(msg) {
        Ok(frame) => {
            let _ = tx.send(frame);
        }
        Err(e) => tracing::error!(error = %e, "failed to encode reply"),
    }
}
