//! The session manager: tracks every attached player session.
//!
//! # Concurrency note
//!
//! The manager is shared between the server's connection handlers and the
//! room layer's timer tasks, so it guards its map with a `std::sync::Mutex`.
//! Every operation is a short, non-blocking critical section (sends go
//! through unbounded channels), so the lock is never held across an await
//! point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tugquiz_protocol::PlayerId;

use crate::Session;

/// Registry of attached player sessions.
///
/// Cloning is cheap and every clone sees the same sessions.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<PlayerId, Session>>>,
}

impl SessionManager {
    /// Creates a new, empty session manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a session for a player, replacing any previous one.
    ///
    /// Replacement is what makes reconnection work: the new connection's
    /// session simply takes over the player id.
    pub fn add(&self, player_id: PlayerId, session: Session) {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        if sessions.insert(player_id, session).is_some() {
            tracing::debug!(%player_id, "session replaced");
        } else {
            tracing::debug!(%player_id, "session attached");
        }
    }

    /// Detaches a player's session, if any.
    pub fn remove(&self, player_id: PlayerId) {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        if sessions.remove(&player_id).is_some() {
            tracing::debug!(%player_id, "session detached");
        }
    }

    /// Returns the player's session, if attached.
    pub fn get(&self, player_id: PlayerId) -> Option<Session> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        sessions.get(&player_id).cloned()
    }

    /// Delivers a frame to every addressed player that has a session.
    ///
    /// Players without a session (disconnected, never attached) are
    /// skipped; so are sessions whose connection already went away.
    /// Delivery failure is not an error here — the disconnect path owns
    /// that bookkeeping.
    pub fn multicast(&self, player_ids: &[PlayerId], frame: &str) {
        let sessions = self.sessions.lock().expect("session map poisoned");
        for player_id in player_ids {
            if let Some(session) = sessions.get(player_id) {
                if session.send(frame).is_err() {
                    tracing::debug!(
                        %player_id,
                        "dropping frame for closed session"
                    );
                }
            }
        }
    }

    /// Number of attached sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session map poisoned").len()
    }

    /// Returns `true` if no sessions are attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    /// Creates a session plus the receiver its frames land in.
    fn session(id: u64) -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(pid(id), tx), rx)
    }

    #[test]
    fn test_add_and_get_returns_session() {
        let mgr = SessionManager::new();
        let (s, _rx) = session(1);

        mgr.add(pid(1), s);

        let found = mgr.get(pid(1)).expect("session should exist");
        assert_eq!(found.player_id(), pid(1));
    }

    #[test]
    fn test_get_unknown_player_returns_none() {
        let mgr = SessionManager::new();
        assert!(mgr.get(pid(99)).is_none());
    }

    #[test]
    fn test_add_replaces_existing_session() {
        let mgr = SessionManager::new();
        let (old, mut old_rx) = session(1);
        let (new, mut new_rx) = session(1);
        mgr.add(pid(1), old);
        mgr.add(pid(1), new);

        mgr.multicast(&[pid(1)], "hello");

        assert!(old_rx.try_recv().is_err(), "old mailbox must be bypassed");
        assert_eq!(new_rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_remove_detaches_session() {
        let mgr = SessionManager::new();
        let (s, _rx) = session(1);
        mgr.add(pid(1), s);

        mgr.remove(pid(1));

        assert!(mgr.get(pid(1)).is_none());
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_multicast_reaches_only_addressed_players() {
        let mgr = SessionManager::new();
        let (s1, mut rx1) = session(1);
        let (s2, mut rx2) = session(2);
        let (s3, mut rx3) = session(3);
        mgr.add(pid(1), s1);
        mgr.add(pid(2), s2);
        mgr.add(pid(3), s3);

        mgr.multicast(&[pid(1), pid(3)], "round");

        assert_eq!(rx1.try_recv().unwrap(), "round");
        assert!(rx2.try_recv().is_err());
        assert_eq!(rx3.try_recv().unwrap(), "round");
    }

    #[test]
    fn test_multicast_skips_absent_players() {
        let mgr = SessionManager::new();
        let (s1, mut rx1) = session(1);
        mgr.add(pid(1), s1);

        // Player 2 has no session — must not panic or error.
        mgr.multicast(&[pid(1), pid(2)], "tick");

        assert_eq!(rx1.try_recv().unwrap(), "tick");
    }

    #[test]
    fn test_multicast_tolerates_closed_channel() {
        let mgr = SessionManager::new();
        let (s1, rx1) = session(1);
        mgr.add(pid(1), s1);
        drop(rx1); // connection went away without a disconnect yet

        mgr.multicast(&[pid(1)], "tick");

        // Session is still registered; cleanup belongs to the disconnect
        // path, not to delivery.
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_session_send_after_close_errors() {
        let (s, rx) = session(1);
        drop(rx);

        assert!(s.is_closed());
        assert!(s.send("x").is_err());
    }
}
