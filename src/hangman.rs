use crate::config::GameSettings;
use crate::error::{GameError, Result};
use crate::scoring::hangman_score;
use crate::sequence::EngineContext;
use crate::session::{Cursor, GameMode, GameStatus, WordGame};
use crate::store::SessionStore;
use crate::word_game::{fold, GameSetup, WordGameEngine, WordGameRules};
use crate::words::{Word, WordSource};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;

pub const MASK: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterOutcome {
    Hit,
    Miss,
    /// Letter was guessed before; nothing changed
    AlreadyGuessed,
    /// Game already won or lost; nothing changed
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HangmanView {
    pub session_id: i64,
    pub word_index: usize,
    pub total_words: usize,
    pub masked_word: String,
    pub word_length: usize,
    pub guessed_letters: Vec<char>,
    pub wrong_guesses: u32,
    pub max_wrong_guesses: u32,
    pub remaining_guesses: u32,
    pub status: GameStatus,
    pub points_earned: u32,
    pub points_so_far: u32,
    pub games_won: u32,
    /// Only once the game is over
    pub answer: Option<String>,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterGuess {
    pub outcome: LetterOutcome,
    pub state: HangmanView,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HangmanRules;

impl WordGameRules for HangmanRules {
    const MODE: GameMode = GameMode::Hangman;
    type View = HangmanView;

    fn setup(&self, _word: &Word, settings: &GameSettings, _rng: &mut dyn RngCore) -> GameSetup {
        GameSetup {
            max_attempts: settings.hangman_max_wrong_guesses,
            missing_indices: Vec::new(),
        }
    }

    fn view(&self, cursor: &Cursor, game: &WordGame, _settings: &GameSettings) -> HangmanView {
        HangmanView {
            session_id: cursor.session_id,
            word_index: game.word_index,
            total_words: cursor.total(),
            masked_word: masked_word(&game.word, &game.guessed_letters),
            word_length: game.word.chars().count(),
            guessed_letters: game.guessed_letters.clone(),
            wrong_guesses: game.attempts,
            max_wrong_guesses: game.max_attempts,
            remaining_guesses: game.max_attempts.saturating_sub(game.attempts),
            status: game.status(),
            points_earned: game.points_earned,
            points_so_far: cursor.points_so_far,
            games_won: cursor.correct_so_far,
            answer: game.is_finished().then(|| game.word.clone()),
            definition: cursor
                .words
                .get(game.word_index)
                .and_then(|w| w.definition.clone()),
        }
    }
}

pub type HangmanEngine<'a, S, W> = WordGameEngine<'a, S, W, HangmanRules>;

impl<'a, S: SessionStore, W: WordSource> WordGameEngine<'a, S, W, HangmanRules> {
    pub fn new(store: &'a S, source: &'a W) -> Self {
        Self::from_context(EngineContext::new(store, source))
    }

    pub fn from_context(ctx: EngineContext<'a, S, W>) -> Self {
        Self::with_rules(ctx, HangmanRules)
    }

    /// Guess one letter of the current word. Repeated or late guesses leave
    /// the game untouched.
    pub fn guess_letter(&mut self, player_id: &str, input: &str) -> Result<LetterGuess> {
        let letter = parse_letter(input)?;
        let (outcome, state) =
            self.play(player_id, |_, game, now| Ok(apply_letter(game, letter, now)))?;
        Ok(LetterGuess { outcome, state })
    }
}

/// A guess must be exactly one alphabetic character
pub fn parse_letter(input: &str) -> Result<char> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Ok(fold(c)),
        _ => Err(GameError::InvalidInput(format!(
            "expected a single letter, got {input:?}"
        ))),
    }
}

/// `_` for every letter not yet guessed; spaces and punctuation show through
pub fn masked_word(word: &str, guessed: &[char]) -> String {
    word.chars()
        .map(|c| {
            if c.is_alphabetic() && !guessed.contains(&fold(c)) {
                MASK
            } else {
                c
            }
        })
        .collect()
}

fn is_solved(word: &str, guessed: &[char]) -> bool {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| guessed.contains(&fold(c)))
}

/// One hangman transition on an already-normalized letter
pub fn apply_letter(game: &mut WordGame, letter: char, now: DateTime<Utc>) -> LetterOutcome {
    if game.is_finished() {
        return LetterOutcome::GameOver;
    }
    if game.guessed_letters.contains(&letter) {
        return LetterOutcome::AlreadyGuessed;
    }

    game.guessed_letters.push(letter);
    let hit = game.word.chars().any(|c| fold(c) == letter);
    if !hit {
        game.attempts += 1;
    }

    if is_solved(&game.word, &game.guessed_letters) {
        game.is_won = true;
        game.points_earned = hangman_score(game.attempts);
        game.completed_at = Some(now);
    } else if game.attempts >= game.max_attempts {
        game.is_lost = true;
        game.points_earned = 0;
        game.completed_at = Some(now);
    }

    if hit {
        LetterOutcome::Hit
    } else {
        LetterOutcome::Miss
    }
}
