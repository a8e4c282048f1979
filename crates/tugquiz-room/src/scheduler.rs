//! The round scheduler: drives a room through countdown, rounds, and
//! victory under time pressure.
//!
//! Every delay is a spawned task that re-validates the room when it wakes.
//! The round timer is the only task that ever gets aborted (on an early
//! correct answer or a disconnect); everything else neutralizes stale
//! wakeups by checking state and the room's round number under the lock.
//! A round ends through exactly one of two paths — timer expiry or an
//! early correct answer — and the round number carried by both is what
//! makes the loser of that race a no-op.

use tokio::time::sleep;

use tugquiz_protocol::{GameMessage, PlayerId, RoomId, RoomState};

use crate::room::{RoundTimerHandle, clamp_shared};
use crate::{RoomError, RoomRegistry};

/// What `end_round` decided while holding the lock; acted on after.
enum RoundOutcome {
    /// Deal again after the inter-round gap, unless round `expected`
    /// is no longer current by then.
    NextRound { expected: u64 },
    /// The shared value hit an edge; tear the room down after the delay.
    GameOver,
}

impl RoomRegistry {
    /// Starts the game in a lobby room.
    ///
    /// Attaches a fresh engine, seeds the shared value from it, moves the
    /// room to `Countdown`, and schedules the transition to `Playing`.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if the room doesn't exist
    /// - [`RoomError::InvalidState`] unless the room is in `Lobby`
    /// - [`RoomError::PreconditionNotMet`] when the member count doesn't
    ///   match the engine's required count
    pub fn start_game(&self, room_id: RoomId) -> Result<(), RoomError> {
        let room_arc = self.room(room_id).ok_or(RoomError::NotFound(room_id))?;

        {
            let mut room = room_arc.lock().expect("room poisoned");
            if room.state != RoomState::Lobby {
                return Err(RoomError::InvalidState(format!(
                    "cannot start game in state {}",
                    room.state
                )));
            }

            let engine = self.inner.factory.create();
            let required = engine.required_players();
            if room.players.len() != required {
                return Err(RoomError::PreconditionNotMet {
                    room_id,
                    required,
                    actual: room.players.len(),
                });
            }

            room.shared_value = engine.shared_state();
            room.engine = Some(engine);
            room.transition(RoomState::Countdown);
            self.inner.broadcaster.room(
                &room,
                &GameMessage::RoomStateChanged { state: room.state },
            );
            tracing::info!(
                %room_id,
                players = room.players.len(),
                "game starting, countdown begun"
            );
        }

        let registry = self.clone();
        tokio::spawn(async move {
            sleep(registry.inner.config.countdown).await;
            registry.begin_playing(room_id);
        });
        Ok(())
    }

    /// Countdown completion: `Countdown → Playing`, then the first round.
    /// Gives up if the room was paused or destroyed while counting down.
    fn begin_playing(&self, room_id: RoomId) {
        let Some(room_arc) = self.room(room_id) else {
            return;
        };
        {
            let mut room = room_arc.lock().expect("room poisoned");
            if room.state != RoomState::Countdown {
                return;
            }
            room.transition(RoomState::Playing);
        }
        self.advance_round(room_id);
    }

    /// Deals the next round: fresh question, cleared answers, a
    /// `RoundUpdate` broadcast, and a new round timer (replacing any
    /// previous one — never more than one per room).
    ///
    /// No-op unless the room exists, has an engine, and is `Playing`;
    /// a paused room deals nothing until reconnection resumes it.
    pub fn advance_round(&self, room_id: RoomId) {
        let Some(room_arc) = self.room(room_id) else {
            return;
        };

        let (round, duration) = {
            let mut room = room_arc.lock().expect("room poisoned");
            if room.state != RoomState::Playing {
                return;
            }
            let Some(engine) = room.engine.as_mut() else {
                return;
            };
            let question = engine.next_question();
            let duration = engine.round_duration();

            room.round_seq += 1;
            let round = room.round_seq;
            room.answers.clear();

            self.inner.broadcaster.room(
                &room,
                &GameMessage::RoundUpdate {
                    state: room.state,
                    shared_value: room.shared_value,
                    question: Some(question.to_client()),
                    round_duration: Some(duration),
                },
            );
            tracing::debug!(%room_id, round, duration, "round dealt");
            (round, duration)
        };

        self.start_round_timer(room_id, round, duration);
    }

    /// Records a player's answer for the current round.
    ///
    /// Silent no-op if the room isn't `Playing`, has no open question, or
    /// the player isn't a member — those are teardown races, not errors.
    /// The last submission per player in a round wins. A correct answer
    /// cancels the timer and ends the round immediately.
    pub fn handle_answer(&self, room_id: RoomId, player_id: PlayerId, answer: &str) {
        let Some(room_arc) = self.room(room_id) else {
            return;
        };

        let finish = {
            let mut room = room_arc.lock().expect("room poisoned");
            if room.state != RoomState::Playing {
                return;
            }
            let Some(correct_answer) = room
                .engine
                .as_ref()
                .and_then(|e| e.current_question())
                .map(|q| q.answer.clone())
            else {
                return;
            };
            let Some(player) = room.member(player_id) else {
                return;
            };
            let player_name = player.name.clone();

            room.answers.insert(player_id, answer.to_owned());
            let correct = answer == correct_answer;

            self.inner.broadcaster.room(
                &room,
                &GameMessage::AnswerResult {
                    player: player_name,
                    answer: answer.to_owned(),
                    correct,
                },
            );

            if correct {
                room.cancel_timer();
                Some(room.round_seq)
            } else {
                None
            }
        };

        if let Some(round) = finish {
            self.end_round(room_id, round);
        }
    }

    /// Ends round `round`: reveals the answer, applies the winner's pull
    /// on the shared value, and schedules either the next round or the
    /// room's teardown.
    ///
    /// Both the timer-expiry path and the early-answer path land here;
    /// whichever arrives second finds `round` stale and no-ops, so every
    /// round ends exactly once.
    pub(crate) fn end_round(&self, room_id: RoomId, round: u64) {
        let Some(room_arc) = self.room(room_id) else {
            return;
        };

        let outcome = {
            let mut room = room_arc.lock().expect("room poisoned");
            if room.round_seq != round || room.state != RoomState::Playing {
                return;
            }
            let Some(correct_answer) = room
                .engine
                .as_ref()
                .and_then(|e| e.current_question())
                .map(|q| q.answer.clone())
            else {
                return;
            };

            // Close the round before anything else: a late duplicate call
            // must see a stale number.
            room.round_seq += 1;
            room.cancel_timer();

            self.inner.broadcaster.room(
                &room,
                &GameMessage::RoundEnd {
                    correct_answer: correct_answer.clone(),
                },
            );

            // First member in join order with the right answer wins the pull.
            let winner = room
                .players
                .iter()
                .enumerate()
                .find(|(_, p)| room.answers.get(&p.id) == Some(&correct_answer))
                .map(|(index, p)| (index, p.name.clone()));

            match winner {
                Some((index, name)) => {
                    let movement = if index == 0 { -0.1 } else { 0.1 };
                    room.shared_value = clamp_shared(room.shared_value + movement);
                    tracing::debug!(
                        %room_id,
                        round,
                        winner = %name,
                        shared_value = room.shared_value,
                        "round won"
                    );

                    if room.shared_value <= 0.0 || room.shared_value >= 1.0 {
                        room.transition(RoomState::Finished);
                        room.engine = None;
                        self.inner
                            .broadcaster
                            .room(&room, &GameMessage::GameOver { winner: name });
                        tracing::info!(%room_id, "game over");
                        RoundOutcome::GameOver
                    } else {
                        RoundOutcome::NextRound {
                            expected: room.round_seq,
                        }
                    }
                }
                // A round nobody answered correctly still advances.
                None => RoundOutcome::NextRound {
                    expected: room.round_seq,
                },
            }
        };

        let registry = self.clone();
        match outcome {
            RoundOutcome::NextRound { expected } => {
                tokio::spawn(async move {
                    sleep(registry.inner.config.round_gap).await;
                    registry.deal_if_current(room_id, expected);
                });
            }
            RoundOutcome::GameOver => {
                tokio::spawn(async move {
                    sleep(registry.inner.config.teardown_delay).await;
                    registry.destroy_room(room_id, "game finished");
                });
            }
        }
    }

    /// Inter-round gap completion: deals the next round unless the room
    /// already moved on (paused, destroyed, or re-dealt by a reconnect).
    fn deal_if_current(&self, room_id: RoomId, expected: u64) {
        let current = {
            let Some(room_arc) = self.room(room_id) else {
                return;
            };
            let room = room_arc.lock().expect("room poisoned");
            room.state == RoomState::Playing && room.round_seq == expected
        };
        if current {
            self.advance_round(room_id);
        }
    }

    /// Spawns the round timer for round `round` and installs its handle,
    /// aborting any previous timer first.
    ///
    /// The task ticks once per time unit from `duration − 1` down to 1,
    /// broadcasting the remaining time, then sleeps one final unit and
    /// ends the round. Abortion can land at any sleep; the round number
    /// check on every wake keeps a superseded timer silent.
    fn start_round_timer(&self, room_id: RoomId, round: u64, duration: u64) {
        let registry = self.clone();
        let task = tokio::spawn(async move {
            let tick = registry.inner.config.tick;
            for remaining in (1..duration).rev() {
                sleep(tick).await;
                if !registry.broadcast_tick(room_id, round, remaining) {
                    return;
                }
            }
            sleep(tick).await;
            registry.end_round(room_id, round);
        });

        if let Some(room_arc) = self.room(room_id) {
            let mut room = room_arc.lock().expect("room poisoned");
            room.cancel_timer();
            room.timer = Some(RoundTimerHandle::new(round, task));
        } else {
            task.abort();
        }
    }

    /// One timer tick. Returns `false` when the timer's round is over or
    /// the room stopped playing, telling the task to bow out.
    fn broadcast_tick(&self, room_id: RoomId, round: u64, remaining: u64) -> bool {
        let Some(room_arc) = self.room(room_id) else {
            return false;
        };
        let room = room_arc.lock().expect("room poisoned");
        if room.round_seq != round || room.state != RoomState::Playing {
            return false;
        }
        self.inner
            .broadcaster
            .room(&room, &GameMessage::TimeUpdate { remaining });
        true
    }
}
