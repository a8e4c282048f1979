//! Error types for the session layer.

/// Errors that can occur during session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session is attached for the given player.
    #[error("no session for player {0}")]
    NotFound(tugquiz_protocol::PlayerId),

    /// The session's connection side is gone; the frame was not queued.
    #[error("session channel closed for player {0}")]
    Closed(tugquiz_protocol::PlayerId),
}
