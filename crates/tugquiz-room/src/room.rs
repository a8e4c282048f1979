//! The room record and its supporting types.
//!
//! A `Room` is plain data plus a handful of queries; every decision about
//! it is made by the registry/scheduler while holding the room's lock.

use std::collections::HashMap;
use std::time::Instant;

use tokio::task::JoinHandle;

use tugquiz_protocol::{PlayerId, RoomId, RoomState, RoomSummary};

use crate::engine::GameEngine;

/// A room member. Immutable once created; removed only with the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The player's identity.
    pub id: PlayerId,
    /// Display name shown to other members.
    pub name: String,
}

/// Handle to the live round-timer task of a room.
///
/// At most one exists per room; starting a new timer aborts the previous
/// task first. Abortion is a normal preemption, not a failure — the round
/// number carried by every timer is what actually guarantees a stale task
/// can't end a round twice.
pub(crate) struct RoundTimerHandle {
    round: u64,
    task: JoinHandle<()>,
}

impl RoundTimerHandle {
    pub(crate) fn new(round: u64, task: JoinHandle<()>) -> Self {
        Self { round, task }
    }

    /// The round this timer serves.
    pub(crate) fn round(&self) -> u64 {
        self.round
    }

    /// Stops the task at its next suspension point.
    pub(crate) fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the task is still running (or not yet observed finished).
    pub(crate) fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

/// A player sitting out the reconnect grace period.
#[derive(Debug, Clone)]
pub(crate) struct DisconnectedPlayer {
    pub(crate) player_id: PlayerId,
    pub(crate) name: String,
    pub(crate) room_id: RoomId,
    pub(crate) since: Instant,
}

/// One room's full mutable state, owned by the registry behind a mutex.
pub(crate) struct Room {
    pub(crate) id: RoomId,
    /// Members in join order. The order is load-bearing: index 0 pulls the
    /// shared value toward 0.0, index 1 toward 1.0.
    pub(crate) players: Vec<Player>,
    pub(crate) state: RoomState,
    pub(crate) engine: Option<Box<dyn GameEngine>>,
    pub(crate) shared_value: f32,
    /// Answers for the current round only; cleared on every deal.
    pub(crate) answers: HashMap<PlayerId, String>,
    pub(crate) timer: Option<RoundTimerHandle>,
    /// Monotonic round number; bumped when a round is dealt and when it
    /// ends. Timer tasks and `end_round` calls carry the number they were
    /// issued for, so a stale path no-ops instead of double-firing.
    pub(crate) round_seq: u64,
}

impl Room {
    pub(crate) fn new(id: RoomId, creator: Player) -> Self {
        Self {
            id,
            players: vec![creator],
            state: RoomState::Lobby,
            engine: None,
            shared_value: 0.5,
            answers: HashMap::new(),
            timer: None,
            round_seq: 0,
        }
    }

    pub(crate) fn member(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub(crate) fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub(crate) fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            player_count: self.players.len(),
            state: self.state,
            players: self.players.iter().map(|p| p.name.clone()).collect(),
        }
    }

    /// Moves the room to `next`, which must be a legal FSM edge.
    pub(crate) fn transition(&mut self, next: RoomState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        tracing::debug!(room_id = %self.id, from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    /// Aborts the live round timer, if any.
    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            tracing::debug!(
                room_id = %self.id,
                round = timer.round(),
                "round timer canceled"
            );
            timer.cancel();
        }
    }
}

/// Clamps a shared-state value into `{0} ∪ [0.1, 0.9] ∪ {1}`.
///
/// Within one step of an edge snaps to the edge exactly; the game ends
/// when the value sits on an edge.
pub(crate) fn clamp_shared(value: f32) -> f32 {
    if value <= 0.1 {
        0.0
    } else if value >= 0.9 {
        1.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_shared_snaps_to_edges() {
        assert_eq!(clamp_shared(0.05), 0.0);
        assert_eq!(clamp_shared(0.1), 0.0);
        assert_eq!(clamp_shared(0.9), 1.0);
        assert_eq!(clamp_shared(0.95), 1.0);
        assert_eq!(clamp_shared(-0.2), 0.0);
        assert_eq!(clamp_shared(1.3), 1.0);
    }

    #[test]
    fn test_clamp_shared_keeps_mid_band_values() {
        assert_eq!(clamp_shared(0.5), 0.5);
        assert_eq!(clamp_shared(0.11), 0.11);
        assert_eq!(clamp_shared(0.89), 0.89);
    }

    #[test]
    fn test_shared_value_walks_to_zero_in_five_steps() {
        // f32 rounding keeps step four strictly above the 0.1 threshold,
        // so the lower edge takes five wins from the center.
        let mut v = 0.5f32;
        for step in 1..=4 {
            v = clamp_shared(v - 0.1);
            assert!(v > 0.0, "step {step} must not finish the game, got {v}");
            assert!((0.1..=0.9).contains(&v), "step {step} out of band: {v}");
        }
        v = clamp_shared(v - 0.1);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_shared_value_walks_to_one_in_four_steps() {
        // The upper edge is reached one win earlier: rounding pushes the
        // fourth sum to 0.90000004, over the 0.9 threshold.
        let mut v = 0.5f32;
        for _ in 1..=3 {
            v = clamp_shared(v + 0.1);
            assert!((0.1..=0.9).contains(&v));
        }
        v = clamp_shared(v + 0.1);
        assert_eq!(v, 1.0);
    }
}
