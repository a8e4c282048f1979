//! The reference game mode: a two-player tug-of-war trivia duel.
//!
//! Both players see the same question; the first correct answer in join
//! order pulls the shared cursor one step toward that player's edge. The
//! engine owns the question bank and the round pacing; the room layer owns
//! the cursor itself and everything to do with timing and membership.

use rand::seq::SliceRandom;

use tugquiz_room::{EngineFactory, GameEngine, Question};

/// Players needed for a duel.
const REQUIRED_PLAYERS: usize = 2;

/// Round length in time units.
const ROUND_DURATION: u64 = 10;

/// Cursor origin: dead center between the two edges.
const INITIAL_CURSOR: f32 = 0.5;

/// The built-in bank: (text, choices, index of the correct choice).
const QUESTION_BANK: &[(&str, [&str; 4], usize)] = &[
    (
        "Which planet has the most moons?",
        ["Jupiter", "Saturn", "Neptune", "Mars"],
        1,
    ),
    (
        "What year did the Berlin Wall fall?",
        ["1987", "1989", "1991", "1993"],
        1,
    ),
    (
        "Which element has the chemical symbol 'Fe'?",
        ["Fluorine", "Lead", "Iron", "Tin"],
        2,
    ),
    (
        "Who composed the Ninth Symphony known as the 'Choral'?",
        ["Mozart", "Bach", "Brahms", "Beethoven"],
        3,
    ),
    (
        "What is the longest river in the world?",
        ["Amazon", "Nile", "Yangtze", "Mississippi"],
        1,
    ),
    (
        "Which country hosted the first modern Olympic Games?",
        ["France", "England", "Greece", "Italy"],
        2,
    ),
    (
        "What is the smallest prime number?",
        ["0", "1", "2", "3"],
        2,
    ),
    (
        "Which ocean is the deepest?",
        ["Atlantic", "Indian", "Arctic", "Pacific"],
        3,
    ),
    (
        "Who wrote 'One Hundred Years of Solitude'?",
        [
            "Gabriel García Márquez",
            "Jorge Luis Borges",
            "Pablo Neruda",
            "Isabel Allende",
        ],
        0,
    ),
    (
        "What gas makes up most of Earth's atmosphere?",
        ["Oxygen", "Carbon dioxide", "Nitrogen", "Argon"],
        2,
    ),
    (
        "In which city is the Hagia Sophia?",
        ["Athens", "Istanbul", "Cairo", "Jerusalem"],
        1,
    ),
    (
        "How many bits are in a byte?",
        ["4", "8", "16", "32"],
        1,
    ),
];

/// The tug-of-war trivia engine.
///
/// Deals the bank in a per-game shuffled order, wrapping around if a duel
/// outlasts it.
pub struct ResistanceGame {
    order: Vec<usize>,
    next: usize,
    current: Option<Question>,
}

impl ResistanceGame {
    /// Creates an engine with a freshly shuffled question order.
    pub fn new() -> Self {
        let mut order: Vec<usize> = (0..QUESTION_BANK.len()).collect();
        order.shuffle(&mut rand::rng());
        Self {
            order,
            next: 0,
            current: None,
        }
    }
}

impl Default for ResistanceGame {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine for ResistanceGame {
    fn required_players(&self) -> usize {
        REQUIRED_PLAYERS
    }

    fn round_duration(&self) -> u64 {
        ROUND_DURATION
    }

    fn next_question(&mut self) -> Question {
        let bank_index = self.order[self.next % self.order.len()];
        self.next += 1;

        let (text, choices, answer_index) = QUESTION_BANK[bank_index];
        let question = Question {
            id: bank_index as u32,
            text: text.to_owned(),
            choices: choices.iter().map(|c| (*c).to_owned()).collect(),
            answer: choices[answer_index].to_owned(),
        };
        self.current = Some(question.clone());
        question
    }

    fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    fn shared_state(&self) -> f32 {
        INITIAL_CURSOR
    }
}

/// Factory handed to the room registry.
pub struct ResistanceFactory;

impl EngineFactory for ResistanceFactory {
    fn create(&self) -> Box<dyn GameEngine> {
        Box::new(ResistanceGame::new())
    }
}
