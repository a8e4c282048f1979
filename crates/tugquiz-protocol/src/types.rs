//! Core protocol types for Tugquiz's wire format.
//!
//! Every structure here gets serialized to a JSON text frame, sent over the
//! wire, and deserialized on the other side. Message enums are internally
//! tagged (`{"type": "...", ...}`) so browser clients can switch on a single
//! field.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64`; `#[serde(transparent)]` makes `PlayerId(42)`
/// serialize as plain `42` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (one trivia duel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Lobby → Countdown → Playing ⇄ Paused → Finished → (destroyed)
/// ```
///
/// - **Lobby**: room exists, accepting joins, game not started.
/// - **Countdown**: fixed pre-game delay; no timer, no answers.
/// - **Playing**: the only state in which round timers run and answers
///   are accepted.
/// - **Paused**: a player disconnected; the round timer is suspended and
///   no new rounds are dealt until they return.
/// - **Finished**: gameplay is over. The room lingers briefly for the
///   teardown delay, then the record is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Lobby,
    Countdown,
    Playing,
    Paused,
    Finished,
}

impl RoomState {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` if a game is attached to the room in this state.
    ///
    /// A room holds a live engine instance exactly in these states.
    pub fn has_engine(&self) -> bool {
        matches!(self, Self::Countdown | Self::Playing | Self::Paused)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Lobby, Self::Countdown)
                | (Self::Countdown, Self::Playing)
                | (Self::Countdown, Self::Paused)
                | (Self::Playing, Self::Paused)
                | (Self::Paused, Self::Playing)
                | (Self::Playing, Self::Finished)
        )
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Countdown => write!(f, "Countdown"),
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Question and room DTOs
// ---------------------------------------------------------------------------

/// The client-facing view of a question: everything except the answer.
///
/// The full question (with its answer) never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientQuestion {
    /// Stable id of the question within its bank.
    pub id: u32,
    /// The question text.
    pub text: String,
    /// Answer choices, in display order.
    pub choices: Vec<String>,
}

/// A summary of an active room, returned in room listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// The room's unique id.
    pub id: RoomId,
    /// Number of players currently in the room.
    pub player_count: usize,
    /// Current lifecycle state.
    pub state: RoomState,
    /// Display names of the members, in join order.
    pub players: Vec<String>,
}

// ---------------------------------------------------------------------------
// ClientCommand — what clients send
// ---------------------------------------------------------------------------

/// Commands a client can send to the server.
///
/// The first frame on a fresh connection must be `Hello` (new identity) or
/// `Reconnect` (resume within the grace period); everything else is rejected
/// until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Introduce a new player with a display name.
    Hello { name: String },

    /// Resume a dropped connection for an existing player.
    Reconnect { player_id: PlayerId },

    /// Create a new room with the sender as sole member.
    CreateRoom,

    /// Join an existing room.
    JoinRoom { room_id: RoomId },

    /// Start the game in the sender's room.
    StartGame,

    /// Submit an answer for the current round.
    Answer { answer: String },

    /// Ask for the list of active rooms.
    ListRooms,
}

// ---------------------------------------------------------------------------
// GameMessage — what the server sends
// ---------------------------------------------------------------------------

/// Messages from the server: direct replies and room broadcasts.
///
/// `player` / `winner` fields carry display names — that is what clients
/// render; ids stay an addressing concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameMessage {
    // -- Direct replies --
    /// Handshake reply: the identity assigned to this connection.
    Welcome { player_id: PlayerId },

    /// Reply to `CreateRoom`.
    RoomCreated { room_id: RoomId },

    /// Reply to a successful `JoinRoom`.
    RoomJoined { room_id: RoomId },

    /// Reply to `ListRooms`.
    RoomList { rooms: Vec<RoomSummary> },

    /// A command failed; human-readable reason.
    Error { message: String },

    // -- Room broadcasts --
    /// The room moved to a new lifecycle state.
    RoomStateChanged { state: RoomState },

    /// A new round was dealt (or the game state was re-announced).
    RoundUpdate {
        state: RoomState,
        shared_value: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        question: Option<ClientQuestion>,
        #[serde(skip_serializing_if = "Option::is_none")]
        round_duration: Option<u64>,
    },

    /// Seconds-style countdown tick within a round.
    TimeUpdate { remaining: u64 },

    /// A player submitted an answer.
    AnswerResult {
        player: String,
        answer: String,
        correct: bool,
    },

    /// The round is over; reveal the correct answer.
    RoundEnd { correct_answer: String },

    /// The game is over.
    GameOver { winner: String },

    /// A member lost their connection; the grace period is running.
    PlayerDisconnected { player: String },

    /// A disconnected member returned.
    PlayerReconnected { player: String },

    /// The room was destroyed.
    RoomClosed { reason: String },
}

// =========================================================================
// Tests
// =========================================================================
