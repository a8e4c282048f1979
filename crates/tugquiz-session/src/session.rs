//! The per-player session handle.

use tokio::sync::mpsc;

use tugquiz_protocol::PlayerId;

use crate::SessionError;

/// One player's outbound mailbox.
///
/// Cheap to clone — it wraps an `mpsc::UnboundedSender`. The receiving half
/// lives with the connection handler, which forwards frames to the socket.
/// When the connection dies the receiver is dropped and sends start failing;
/// callers that broadcast treat that as a skip, not an error.
#[derive(Debug, Clone)]
pub struct Session {
    player_id: PlayerId,
    sender: mpsc::UnboundedSender<String>,
}

impl Session {
    /// Creates a session for `player_id` delivering into `sender`.
    pub fn new(player_id: PlayerId, sender: mpsc::UnboundedSender<String>) -> Self {
        Self { player_id, sender }
    }

    /// The player this session belongs to.
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Queues a frame for delivery.
    ///
    /// # Errors
    /// Returns [`SessionError::Closed`] if the connection side of the
    /// channel is gone.
    pub fn send(&self, frame: &str) -> Result<(), SessionError> {
        self.sender
            .send(frame.to_owned())
            .map_err(|_| SessionError::Closed(self.player_id))
    }

    /// Returns `true` if the connection side of the channel is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
