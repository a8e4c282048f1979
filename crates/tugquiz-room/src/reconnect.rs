//! Disconnect and reconnect handling.
//!
//! A disconnect doesn't remove the player from their room — it pauses the
//! game and opens a grace window. The scheduled grace check is never
//! canceled; it re-verifies that the disconnect record still exists before
//! acting, which is the guard against a stale cleanup firing after the
//! player already came back.

use std::time::Instant;

use tokio::time::sleep;

use tugquiz_protocol::{GameMessage, PlayerId, RoomState};
use tugquiz_session::Session;

use crate::room::DisconnectedPlayer;
use crate::{RoomError, RoomRegistry};

impl RoomRegistry {
    /// Handles a player's transport connection going away.
    ///
    /// If the player is in a room: records the grace entry, notifies the
    /// other members, aborts any live round timer, and pauses an active
    /// game (`Countdown`/`Playing` → `Paused`; a lobby or finished room
    /// keeps its state — there is no game to pause). The transport session
    /// is detached regardless of room membership.
    pub fn handle_disconnect(&self, player_id: PlayerId) {
        if let Some(room_id) = self.room_for_player(player_id) {
            if let Some(room_arc) = self.room(room_id) {
                let mut recorded = false;
                {
                    let mut room = room_arc.lock().expect("room poisoned");
                    if let Some(player) = room.member(player_id) {
                        let name = player.name.clone();
                        self.inner
                            .disconnected
                            .lock()
                            .expect("disconnect table poisoned")
                            .insert(
                                player_id,
                                DisconnectedPlayer {
                                    player_id,
                                    name: name.clone(),
                                    room_id,
                                    since: Instant::now(),
                                },
                            );
                        recorded = true;

                        self.inner.broadcaster.room_except(
                            &room,
                            player_id,
                            &GameMessage::PlayerDisconnected { player: name },
                        );

                        room.cancel_timer();
                        if matches!(
                            room.state,
                            RoomState::Countdown | RoomState::Playing
                        ) {
                            room.transition(RoomState::Paused);
                        }
                        tracing::info!(
                            %room_id,
                            %player_id,
                            state = %room.state,
                            "player disconnected, grace period started"
                        );
                    }
                }

                if recorded {
                    let registry = self.clone();
                    tokio::spawn(async move {
                        sleep(registry.inner.config.reconnect_grace).await;
                        // Re-verify: a reconnect in the meantime cleared
                        // the record and this wakeup must change nothing.
                        if registry.awaiting_reconnect(player_id) {
                            tracing::info!(
                                %player_id,
                                %room_id,
                                "grace period expired"
                            );
                            registry.destroy_room(
                                room_id,
                                "player did not reconnect in time",
                            );
                        }
                    });
                }
            }
        }

        self.inner.sessions.remove(player_id);
    }

    /// Re-attaches a player who dropped within the grace period.
    ///
    /// Clears the disconnect record, notifies the remaining members, and —
    /// if the room was paused — resumes play with a brand-new round. The
    /// interrupted question and its partial answers are gone for good.
    ///
    /// Returns the display name the player rejoined under.
    ///
    /// # Errors
    /// - [`RoomError::NoPendingReconnect`] without a pending record
    /// - [`RoomError::NotFound`] if the room no longer exists
    pub fn handle_reconnect(
        &self,
        player_id: PlayerId,
        session: Session,
    ) -> Result<String, RoomError> {
        let record = self
            .inner
            .disconnected
            .lock()
            .expect("disconnect table poisoned")
            .get(&player_id)
            .cloned()
            .ok_or(RoomError::NoPendingReconnect(player_id))?;

        let room_arc = self
            .room(record.room_id)
            .ok_or(RoomError::NotFound(record.room_id))?;

        self.inner.sessions.add(player_id, session);
        self.inner
            .disconnected
            .lock()
            .expect("disconnect table poisoned")
            .remove(&player_id);

        let resume = {
            let mut room = room_arc.lock().expect("room poisoned");
            self.inner.broadcaster.room_except(
                &room,
                player_id,
                &GameMessage::PlayerReconnected {
                    player: record.name.clone(),
                },
            );
            if room.state == RoomState::Paused {
                room.transition(RoomState::Playing);
                true
            } else {
                false
            }
        };

        tracing::info!(
            room_id = %record.room_id,
            player_id = %record.player_id,
            away_for = ?record.since.elapsed(),
            resumed = resume,
            "player reconnected"
        );

        if resume {
            self.advance_round(record.room_id);
        }
        Ok(record.name)
    }
}
