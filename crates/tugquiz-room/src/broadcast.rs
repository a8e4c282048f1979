//! Broadcast adapter: room events out, session-layer multicast in.
//!
//! Pure translation. The adapter resolves the room's current member set,
//! encodes the message once, and hands `(ids, frame)` to the session
//! layer. No retries, no buffering — delivery is the session layer's
//! problem. Callers invoke it while holding the room lock, which is what
//! keeps a room's broadcasts in order.

use tugquiz_protocol::{Codec, GameMessage, JsonCodec, PlayerId};
use tugquiz_session::SessionManager;

use crate::room::Room;

/// Translates internal room events into outbound frames.
#[derive(Clone)]
pub struct Broadcaster {
    sessions: SessionManager,
    codec: JsonCodec,
}

impl Broadcaster {
    /// Creates an adapter delivering through `sessions`.
    pub fn new(sessions: SessionManager) -> Self {
        Self {
            sessions,
            codec: JsonCodec,
        }
    }

    /// Sends `msg` to every member of `room`.
    pub(crate) fn room(&self, room: &Room, msg: &GameMessage) {
        self.send(&room.player_ids(), msg);
    }

    /// Sends `msg` to every member of `room` except `excluded`.
    pub(crate) fn room_except(
        &self,
        room: &Room,
        excluded: PlayerId,
        msg: &GameMessage,
    ) {
        let ids: Vec<PlayerId> = room
            .player_ids()
            .into_iter()
            .filter(|id| *id != excluded)
            .collect();
        self.send(&ids, msg);
    }

    /// Encodes once and multicasts to the given players.
    pub(crate) fn send(&self, player_ids: &[PlayerId], msg: &GameMessage) {
        match self.codec.encode(msg) {
            Ok(frame) => self.sessions.multicast(player_ids, &frame),
            Err(e) => {
                // Wire types are all serializable; reaching this means a
                // bug, not a runtime condition worth propagating.
                tracing::error!(error = %e, "failed to encode broadcast");
            }
        }
    }
}
