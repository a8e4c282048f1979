//! The `GameEngine` contract — the extension point for game modes.
//!
//! The scheduler is mode-agnostic: it asks the engine what to deal, how
//! long a round lasts, and how many players it needs. The engine knows
//! nothing about rooms, timers, or sessions.

use tugquiz_protocol::ClientQuestion;

/// A full question as the server knows it, answer included.
///
/// Only the [`ClientQuestion`] view ever goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Stable id of the question within its bank.
    pub id: u32,
    /// The question text.
    pub text: String,
    /// Answer choices, in display order.
    pub choices: Vec<String>,
    /// The correct answer; compared verbatim against submissions.
    pub answer: String,
}

impl Question {
    /// The client-facing view: everything except the answer.
    pub fn to_client(&self) -> ClientQuestion {
        ClientQuestion {
            id: self.id,
            text: self.text.clone(),
            choices: self.choices.clone(),
        }
    }
}

/// One game mode attached to one room.
///
/// An instance is created per room when the game starts and dropped when
/// the room finishes or is destroyed. The scheduler calls these methods
/// while holding the room's lock, so implementations need `Send` but never
/// see concurrent calls.
pub trait GameEngine: Send + 'static {
    /// Exact number of players this mode needs before it can start.
    fn required_players(&self) -> usize;

    /// Round length in time units (ticks).
    fn round_duration(&self) -> u64;

    /// Deals the next question and makes it current.
    fn next_question(&mut self) -> Question;

    /// The question currently in play, if a round is open.
    fn current_question(&self) -> Option<&Question>;

    /// The engine's starting value for the room's shared state — the
    /// cursor origin for the reference duel mode.
    fn shared_state(&self) -> f32;
}

/// Creates a fresh engine instance per started game.
pub trait EngineFactory: Send + Sync + 'static {
    /// Builds an engine for one room.
    fn create(&self) -> Box<dyn GameEngine>;
}

/// Closures double as factories; tests lean on this.
impl<F> EngineFactory for F
where
    F: Fn() -> Box<dyn GameEngine> + Send + Sync + 'static,
{
    fn create(&self) -> Box<dyn GameEngine> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_to_client_hides_answer() {
        let q = Question {
            id: 3,
            text: "Largest planet?".into(),
            choices: vec!["Jupiter".into(), "Saturn".into()],
            answer: "Jupiter".into(),
        };

        let client = q.to_client();

        assert_eq!(client.id, 3);
        assert_eq!(client.text, "Largest planet?");
        assert_eq!(client.choices, q.choices);
        let json = serde_json::to_string(&client).unwrap();
        assert!(!json.contains("answer"), "answer must not leak: {json}");
    }
}
