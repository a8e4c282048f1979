//! Unified error type for the Tugquiz server.

use tugquiz_protocol::ProtocolError;
use tugquiz_room::RoomError;
use tugquiz_session::SessionError;

/// Top-level error wrapping every layer's error type.
///
/// The `#[from]` attributes let `?` lift layer errors automatically, so
/// server code deals with one type.
#[derive(Debug, thiserror::Error)]
pub enum TugquizError {
    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (missing or closed session).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, bad state).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A WebSocket-level error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A socket-level I/O error (bind, accept).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection didn't complete the Hello/Reconnect handshake.
    #[error("handshake failed: {0}")]
    Handshake(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(tugquiz_protocol::RoomId(1));
        let top: TugquizError = err.into();
        assert!(matches!(top, TugquizError::Room(_)));
        assert!(top.to_string().contains("not found"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: TugquizError = err.into();
        assert!(matches!(top, TugquizError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NotFound(tugquiz_protocol::PlayerId(9));
        let top: TugquizError = err.into();
        assert!(matches!(top, TugquizError::Session(_)));
    }
}
