//! Persisted records shared by the three game modes.

use crate::error::GameError;
use crate::words::Word;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameMode {
    Practice,
    Hangman,
    MissingLetter,
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "practice" => Ok(GameMode::Practice),
            "hangman" => Ok(GameMode::Hangman),
            "missing_letter" => Ok(GameMode::MissingLetter),
            other => Err(GameError::InvalidInput(format!("unknown game mode {other:?}"))),
        }
    }
}

/// Permanent record of one play-through of a list. Aggregates are written once, when
/// the session is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub id: i64,
    pub player_id: String,
    pub list_id: i64,
    pub mode: GameMode,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Words (practice) or games (hangman, missing-letter) planned for the session
    pub total_words: u32,
    /// Correct answers (practice) or games won
    pub correct_words: u32,
    pub points_earned: u32,
}

impl SessionRecord {
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// One submitted practice answer. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordAttempt {
    /// Assigned by the store
    pub id: i64,
    pub session_id: i64,
    pub word_id: i64,
    pub attempt_text: String,
    pub is_correct: bool,
    pub time_taken_ms: u64,
    pub points_earned: u32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// One word's play inside a hangman or missing-letter session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGame {
    /// Assigned by the store
    pub id: i64,
    pub session_id: i64,
    pub player_id: String,
    pub mode: GameMode,
    pub word_index: usize,
    pub word_id: i64,
    pub word: String,
    pub difficulty: u8,
    /// Hangman: letters guessed so far, in guess order
    pub guessed_letters: Vec<char>,
    /// Missing-letter: every submitted guess, in order
    pub guesses: Vec<String>,
    /// Hangman: wrong guesses. Missing-letter: submitted guesses.
    pub attempts: u32,
    pub max_attempts: u32,
    /// Missing-letter: positions hidden for this word, fixed at creation
    pub missing_indices: Vec<usize>,
    pub is_won: bool,
    pub is_lost: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub points_earned: u32,
}

impl WordGame {
    pub fn status(&self) -> GameStatus {
        if self.is_won {
            GameStatus::Won
        } else if self.is_lost {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        }
    }

    pub fn is_finished(&self) -> bool {
        self.is_won || self.is_lost
    }
}

/// The single live progress row per player per mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub player_id: String,
    pub mode: GameMode,
    pub session_id: i64,
    pub current_index: usize,
    /// Fixed at session start and never recomputed
    pub words: Vec<Word>,
    pub correct_so_far: u32,
    pub points_so_far: u32,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every conditional update
    pub version: i64,
}

impl Cursor {
    pub fn total(&self) -> usize {
        self.words.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.words.len()
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.words.get(self.current_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: i64, text: &str) -> Word {
        Word {
            id,
            list_id: 1,
            text: text.to_string(),
            difficulty: 1,
            audio_ref: None,
            definition: None,
            position: id as u32,
        }
    }

    #[test]
    fn game_mode_string_forms() {
        assert_eq!(GameMode::MissingLetter.to_string(), "missing_letter");
        assert_eq!(GameMode::from_str("hangman").unwrap(), GameMode::Hangman);
        assert!(GameMode::from_str("chess").is_err());
        assert_eq!(
            serde_json::to_string(&GameMode::Practice).unwrap(),
            "\"practice\""
        );
    }

    #[test]
    fn cursor_completion_tracks_index() {
        let now = Utc::now();
        let mut cursor = Cursor {
            player_id: "p".into(),
            mode: GameMode::Practice,
            session_id: 1,
            current_index: 0,
            words: vec![word(1, "cat"), word(2, "dog")],
            correct_so_far: 0,
            points_so_far: 0,
            started_at: now,
            updated_at: now,
            version: 0,
        };
        assert_eq!(cursor.current_word().map(|w| w.text.as_str()), Some("cat"));
        cursor.current_index = 2;
        assert!(cursor.is_complete());
        assert!(cursor.current_word().is_none());
    }
}
