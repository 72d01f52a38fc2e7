//! Missing-letter game: some letters of the word are blanked out and the player
//! supplies just the letters for the blanks. How many letters are hidden, and where,
//! depends on the word's difficulty and length.

use crate::config::{GameSettings, RevealPolicy};
use crate::error::{GameError, Result};
use crate::scoring::{missing_letter_score, MIN_POINTS};
use crate::sequence::EngineContext;
use crate::session::{Cursor, GameMode, GameStatus, WordGame};
use crate::store::SessionStore;
use crate::word_game::{fold, GameSetup, WordGameEngine, WordGameRules};
use crate::words::{Word, WordSource};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;

pub const BLANK: char = '_';

/// Points for spelling a different real word
pub const BONUS_POINTS: u32 = MIN_POINTS;

// rows: difficulty 1..=5, columns: length <= 4, <= 6, <= 8, > 8
const MISSING_TABLE: [[usize; 4]; 5] = [
    [1, 2, 2, 2],
    [1, 2, 3, 3],
    [2, 2, 3, 4],
    [2, 3, 4, 5],
    [2, 3, 5, 6],
];

/// Number of letters to hide, capped at half the word (at least one)
pub fn num_missing(difficulty: u8, len: usize) -> usize {
    let row = usize::from(difficulty.clamp(1, 5)) - 1;
    let col = match len {
        0..=4 => 0,
        5..=6 => 1,
        7..=8 => 2,
        _ => 3,
    };
    MISSING_TABLE[row][col].min((len / 2).max(1))
}

/// Half-open range of positions that may be hidden
pub fn hideable_range(difficulty: u8, len: usize) -> (usize, usize) {
    if difficulty <= 1 && len > 3 {
        (1, len - 1)
    } else if difficulty <= 3 && len > 2 {
        (1, len)
    } else {
        (0, len)
    }
}

/// Shuffle the eligible letter positions and keep the first `num_missing`, sorted.
/// Spaces, apostrophes and hyphens always stay visible.
pub fn choose_missing_indices(word: &str, difficulty: u8, rng: &mut dyn RngCore) -> Vec<usize> {
    let chars: Vec<char> = word.chars().collect();
    let (start, end) = hideable_range(difficulty, chars.len());
    let mut eligible: Vec<usize> = (start..end)
        .filter(|&i| chars[i].is_alphabetic())
        .collect();
    eligible.shuffle(rng);

    let mut chosen: Vec<usize> = eligible
        .into_iter()
        .take(num_missing(difficulty, chars.len()))
        .collect();
    chosen.sort_unstable();
    chosen
}

/// Decides whether a spelled candidate counts as a real word for the bonus
pub trait WordValidator {
    fn is_word(&self, candidate: &str) -> bool;
}

/// Accepts anything alphabetic of two letters or more until a dictionary is wired in
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDictionary;

impl WordValidator for PlaceholderDictionary {
    fn is_word(&self, candidate: &str) -> bool {
        candidate.chars().count() >= 2 && candidate.chars().all(char::is_alphabetic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessOutcome {
    Correct,
    /// Spelled another real word: bonus points, game goes on unless out of attempts
    BonusWord,
    Wrong,
    /// Same letters as an earlier guess; nothing changed
    AlreadyGuessed,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingLetterView {
    pub session_id: i64,
    pub word_index: usize,
    pub total_words: usize,
    pub display_word: String,
    pub word_length: usize,
    pub num_missing: usize,
    pub guesses: Vec<String>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub remaining_attempts: u32,
    pub status: GameStatus,
    pub points_earned: u32,
    pub points_so_far: u32,
    pub games_won: u32,
    pub answer: Option<String>,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingLetterGuess {
    pub outcome: GuessOutcome,
    /// The full word the guess spelled
    pub candidate: String,
    pub state: MissingLetterView,
}

#[derive(Debug, Clone, Default)]
pub struct MissingLetterRules<V = PlaceholderDictionary> {
    validator: V,
}

impl<V: WordValidator> MissingLetterRules<V> {
    pub fn new(validator: V) -> Self {
        Self { validator }
    }
}

impl<V: WordValidator> WordGameRules for MissingLetterRules<V> {
    const MODE: GameMode = GameMode::MissingLetter;
    type View = MissingLetterView;

    fn setup(&self, word: &Word, settings: &GameSettings, rng: &mut dyn RngCore) -> GameSetup {
        GameSetup {
            max_attempts: settings.missing_letter_max_attempts,
            missing_indices: choose_missing_indices(&word.text, word.difficulty, rng),
        }
    }

    fn view(&self, cursor: &Cursor, game: &WordGame, settings: &GameSettings) -> MissingLetterView {
        MissingLetterView {
            session_id: cursor.session_id,
            word_index: game.word_index,
            total_words: cursor.total(),
            display_word: display_word(game, settings.reveal_policy),
            word_length: game.word.chars().count(),
            num_missing: game.missing_indices.len(),
            guesses: game.guesses.clone(),
            attempts: game.attempts,
            max_attempts: game.max_attempts,
            remaining_attempts: game.max_attempts.saturating_sub(game.attempts),
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

pub type MissingLetterEngine<'a, S, W, V = PlaceholderDictionary> =
    WordGameEngine<'a, S, W, MissingLetterRules<V>>;

impl<'a, S: SessionStore, W: WordSource> WordGameEngine<'a, S, W, MissingLetterRules> {
    pub fn new(store: &'a S, source: &'a W) -> Self {
        Self::from_context(EngineContext::new(store, source))
    }

    pub fn from_context(ctx: EngineContext<'a, S, W>) -> Self {
        Self::with_rules(ctx, MissingLetterRules::default())
    }
}

impl<'a, S: SessionStore, W: WordSource, V: WordValidator>
    WordGameEngine<'a, S, W, MissingLetterRules<V>>
{
    /// Fill the blanks of the current word with `letters`, in blank order
    pub fn submit_guess(&mut self, player_id: &str, letters: &str) -> Result<MissingLetterGuess> {
        let ((outcome, candidate), state) = self.play(player_id, |rules, game, now| {
            let letters = parse_guess(letters, game.missing_indices.len())?;
            Ok(apply_guess(game, &letters, &rules.validator, now))
        })?;
        Ok(MissingLetterGuess {
            outcome,
            candidate,
            state,
        })
    }
}

/// Letters for the blanks, whitespace ignored, lowercased
pub fn parse_guess(input: &str, expected: usize) -> Result<Vec<char>> {
    let letters: Vec<char> = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(fold)
        .collect();
    if letters.len() != expected || !letters.iter().all(|c| c.is_alphabetic()) {
        return Err(GameError::InvalidInput(format!(
            "expected {expected} letter(s), got {input:?}"
        )));
    }
    Ok(letters)
}

/// The lowercase word with `letters` spliced into the hidden positions
pub fn splice(word: &str, missing_indices: &[usize], letters: &[char]) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            missing_indices
                .iter()
                .position(|&m| m == i)
                .and_then(|slot| letters.get(slot).copied())
                .unwrap_or_else(|| fold(c))
        })
        .collect()
}

/// The hidden letters in order, lowercased
pub fn hidden_letters(game: &WordGame) -> String {
    game.word
        .chars()
        .enumerate()
        .filter(|(i, _)| game.missing_indices.contains(i))
        .map(|(_, c)| fold(c))
        .collect()
}

/// One missing-letter transition; returns the outcome and the candidate word
pub fn apply_guess(
    game: &mut WordGame,
    letters: &[char],
    validator: &dyn WordValidator,
    now: DateTime<Utc>,
) -> (GuessOutcome, String) {
    let candidate = splice(&game.word, &game.missing_indices, letters);
    if game.is_finished() {
        return (GuessOutcome::GameOver, candidate);
    }
    let guess: String = letters.iter().collect();
    if game.guesses.contains(&guess) {
        return (GuessOutcome::AlreadyGuessed, candidate);
    }

    game.guesses.push(guess);
    game.attempts += 1;
    let exhausted = game.attempts >= game.max_attempts;
    let target: String = game.word.chars().map(fold).collect();

    let outcome = if candidate == target {
        game.is_won = true;
        game.points_earned += missing_letter_score(game.attempts, game.missing_indices.len() as u32);
        GuessOutcome::Correct
    } else if validator.is_word(&candidate) {
        game.points_earned += BONUS_POINTS;
        game.is_lost = exhausted;
        GuessOutcome::BonusWord
    } else {
        game.is_lost = exhausted;
        GuessOutcome::Wrong
    };

    if game.is_finished() {
        game.completed_at = Some(now);
    }
    (outcome, candidate)
}

/// The word with its hidden positions blanked, or in full once revealed under `policy`
pub fn display_word(game: &WordGame, policy: RevealPolicy) -> String {
    let revealed = match policy {
        RevealPolicy::GuessHistory => {
            let hidden = hidden_letters(game);
            game.guesses.iter().any(|g| *g == hidden)
        }
        RevealPolicy::WinState => game.is_won,
    };

    game.word
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if !revealed && game.missing_indices.contains(&i) {
                BLANK
            } else {
                c
            }
        })
        .collect()
}
