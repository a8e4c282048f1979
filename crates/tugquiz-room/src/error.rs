//! Error types for the room layer.

use tugquiz_protocol::{PlayerId, RoomId};

/// Errors surfaced by boundary-facing room operations.
///
/// Internal lookups that lose a race with teardown stay silent no-ops;
/// only operations whose caller needs an answer (join, start, reconnect)
/// return one of these.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full — no player slots left.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The game was asked to start with the wrong number of players.
    #[error("room {room_id} has {actual} players, game needs {required}")]
    PreconditionNotMet {
        room_id: RoomId,
        required: usize,
        actual: usize,
    },

    /// The room is in a state that doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// Reconnect was attempted without a pending disconnect record.
    #[error("no pending reconnect for player {0}")]
    NoPendingReconnect(PlayerId),
}
