//! The room registry: authoritative owner of every room in the process.
//!
//! The registry hands out [`RoomId`]s, tracks which player sits in which
//! room, and is the single place where a room's resources are released.
//! It is a cheap-to-clone handle; timer tasks spawned by the scheduler
//! carry a clone and re-resolve their room by id when they wake, so a
//! destroyed room simply stops being found.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tugquiz_protocol::{GameMessage, PlayerId, RoomId, RoomState, RoomSummary};
use tugquiz_session::SessionManager;

use crate::broadcast::Broadcaster;
use crate::room::{DisconnectedPlayer, Player, Room};
use crate::{EngineFactory, RoomConfig, RoomError};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct RegistryInner {
    pub(crate) config: RoomConfig,
    pub(crate) factory: Box<dyn EngineFactory>,
    pub(crate) sessions: SessionManager,
    pub(crate) broadcaster: Broadcaster,
    /// Active rooms. The map lock is held only to look up, insert, or
    /// remove an entry — per-room work happens under the room's own lock.
    pub(crate) rooms: Mutex<HashMap<RoomId, Arc<Mutex<Room>>>>,
    /// Which room each player is in. A player is in at most one room.
    pub(crate) player_rooms: Mutex<HashMap<PlayerId, RoomId>>,
    /// Players currently inside the reconnect grace period.
    pub(crate) disconnected: Mutex<HashMap<PlayerId, DisconnectedPlayer>>,
}

/// Handle to the process-wide room registry.
#[derive(Clone)]
pub struct RoomRegistry {
    pub(crate) inner: Arc<RegistryInner>,
}

impl RoomRegistry {
    /// Creates a registry that builds engines with `factory` and delivers
    /// through `sessions`.
    pub fn new(
        config: RoomConfig,
        factory: impl EngineFactory,
        sessions: SessionManager,
    ) -> Self {
        let broadcaster = Broadcaster::new(sessions.clone());
        Self {
            inner: Arc::new(RegistryInner {
                config,
                factory: Box::new(factory),
                sessions,
                broadcaster,
                rooms: Mutex::new(HashMap::new()),
                player_rooms: Mutex::new(HashMap::new()),
                disconnected: Mutex::new(HashMap::new()),
            }),
        }
    }

    // -- membership -------------------------------------------------------

    /// Creates a new room with `player_id` as its sole member.
    ///
    /// Always succeeds; the creator starts in `Lobby`.
    pub fn create_room(&self, player_id: PlayerId, name: &str) -> RoomId {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let creator = Player {
            id: player_id,
            name: name.to_owned(),
        };
        let room = Room::new(room_id, creator);

        self.inner
            .rooms
            .lock()
            .expect("room map poisoned")
            .insert(room_id, Arc::new(Mutex::new(room)));
        if self
            .inner
            .player_rooms
            .lock()
            .expect("player index poisoned")
            .insert(player_id, room_id)
            .is_some()
        {
            tracing::warn!(%player_id, %room_id, "player re-mapped to a fresh room");
        }

        tracing::info!(%room_id, %player_id, "room created");
        room_id
    }

    /// Adds a player to an existing room, preserving join order.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if the room doesn't exist
    /// - [`RoomError::RoomFull`] at capacity; membership is untouched
    pub fn join_room(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
        name: &str,
    ) -> Result<(), RoomError> {
        let room_arc = self.room(room_id).ok_or(RoomError::NotFound(room_id))?;

        {
            let mut room = room_arc.lock().expect("room poisoned");
            if room.players.len() >= self.inner.config.capacity {
                return Err(RoomError::RoomFull(room_id));
            }
            room.players.push(Player {
                id: player_id,
                name: name.to_owned(),
            });
            tracing::info!(
                %room_id,
                %player_id,
                players = room.players.len(),
                "player joined"
            );
        }

        self.inner
            .player_rooms
            .lock()
            .expect("player index poisoned")
            .insert(player_id, room_id);
        Ok(())
    }

    /// The room a player currently belongs to, if any.
    pub fn room_for_player(&self, player_id: PlayerId) -> Option<RoomId> {
        self.inner
            .player_rooms
            .lock()
            .expect("player index poisoned")
            .get(&player_id)
            .copied()
    }

    /// Snapshot of every active room. No side effects.
    pub fn active_rooms(&self) -> Vec<RoomSummary> {
        let rooms: Vec<Arc<Mutex<Room>>> = {
            let map = self.inner.rooms.lock().expect("room map poisoned");
            map.values().cloned().collect()
        };
        rooms
            .iter()
            .map(|arc| arc.lock().expect("room poisoned").summary())
            .collect()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.inner.rooms.lock().expect("room map poisoned").len()
    }

    // -- teardown ---------------------------------------------------------

    /// Destroys a room and releases everything it owns: the round timer,
    /// the answer map, member disconnect records, the player index entries,
    /// and the members' transport sessions. Members still attached receive
    /// a `RoomClosed` notice first.
    ///
    /// This is the only cleanup path in the crate, and it is idempotent —
    /// destroying an absent room is a no-op.
    pub fn destroy_room(&self, room_id: RoomId, reason: &str) {
        let Some(room_arc) = self
            .inner
            .rooms
            .lock()
            .expect("room map poisoned")
            .remove(&room_id)
        else {
            return;
        };

        let member_ids = {
            let mut room = room_arc.lock().expect("room poisoned");
            room.cancel_timer();
            self.inner.broadcaster.room(
                &room,
                &GameMessage::RoomClosed {
                    reason: reason.to_owned(),
                },
            );
            room.player_ids()
        };

        {
            let mut player_rooms = self
                .inner
                .player_rooms
                .lock()
                .expect("player index poisoned");
            let mut disconnected = self
                .inner
                .disconnected
                .lock()
                .expect("disconnect table poisoned");
            for player_id in &member_ids {
                player_rooms.remove(player_id);
                disconnected.remove(player_id);
            }
        }
        for player_id in &member_ids {
            self.inner.sessions.remove(*player_id);
        }

        tracing::info!(%room_id, reason, "room destroyed");
    }

    // -- introspection ----------------------------------------------------

    /// The room's current lifecycle state, if it exists.
    pub fn room_state(&self, room_id: RoomId) -> Option<RoomState> {
        self.room(room_id)
            .map(|arc| arc.lock().expect("room poisoned").state)
    }

    /// The room's current shared-state value, if it exists.
    pub fn shared_value(&self, room_id: RoomId) -> Option<f32> {
        self.room(room_id)
            .map(|arc| arc.lock().expect("room poisoned").shared_value)
    }

    /// Whether the room currently has a live round-timer task.
    pub fn has_active_timer(&self, room_id: RoomId) -> bool {
        self.room(room_id).is_some_and(|arc| {
            arc.lock()
                .expect("room poisoned")
                .timer
                .as_ref()
                .is_some_and(|t| t.is_active())
        })
    }

    /// Whether a disconnect record is pending for the player.
    pub fn awaiting_reconnect(&self, player_id: PlayerId) -> bool {
        self.inner
            .disconnected
            .lock()
            .expect("disconnect table poisoned")
            .contains_key(&player_id)
    }

    // -- internals --------------------------------------------------------

    /// Resolves a room by id. `None` after destruction — callers treat
    /// that as "the world moved on" and give up quietly.
    pub(crate) fn room(&self, room_id: RoomId) -> Option<Arc<Mutex<Room>>> {
        self.inner
            .rooms
            .lock()
            .expect("room map poisoned")
            .get(&room_id)
            .cloned()
    }
}
