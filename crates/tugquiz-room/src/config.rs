//! Scheduler configuration.

use std::time::Duration;

/// Capacity and timing knobs for every room the registry creates.
///
/// The defaults are the production constants of the duel mode. The
/// scheduler's own tests keep them and drive a paused `tokio::time`
/// clock; end-to-end suites shrink them instead.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Maximum (and, for the reference engine, exact) players per room.
    pub capacity: usize,

    /// Pre-game countdown between `StartGame` and the first round.
    pub countdown: Duration,

    /// Length of one time unit; the round timer broadcasts once per tick.
    pub tick: Duration,

    /// Pause between a round ending and the next being dealt.
    pub round_gap: Duration,

    /// How long a finished room lingers before it is destroyed.
    pub teardown_delay: Duration,

    /// How long a disconnected player has to return before the room is
    /// destroyed.
    pub reconnect_grace: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: 2,
            countdown: Duration::from_secs(3),
            tick: Duration::from_secs(1),
            round_gap: Duration::from_millis(1500),
            teardown_delay: Duration::from_secs(5),
            reconnect_grace: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default_values() {
        let config = RoomConfig::default();
        assert_eq!(config.capacity, 2);
        assert_eq!(config.countdown, Duration::from_secs(3));
        assert_eq!(config.tick, Duration::from_secs(1));
        assert_eq!(config.round_gap, Duration::from_millis(1500));
        assert_eq!(config.teardown_delay, Duration::from_secs(5));
        assert_eq!(config.reconnect_grace, Duration::from_secs(30));
    }
}
