//! Per-word guessing games (hangman, missing-letter) over a resumable word sequence.
//! Each word gets its own persisted [`WordGame`] row; the mode supplies the setup of a
//! fresh game, the view handed back to the caller and the transition applied per guess.

use crate::config::GameSettings;
use crate::error::{GameError, Result};
use crate::selector::{ShuffleSelector, WordSelector};
use crate::sequence::EngineContext;
use crate::session::{Cursor, GameMode, SessionRecord, WordGame};
use crate::store::SessionStore;
use crate::words::{Word, WordSource};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Fixed parameters of a new per-word game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub max_attempts: u32,
    pub missing_indices: Vec<usize>,
}

/// What distinguishes one guessing mode from another
pub trait WordGameRules {
    const MODE: GameMode;
    type View: Serialize;

    fn setup(&self, word: &Word, settings: &GameSettings, rng: &mut dyn RngCore) -> GameSetup;

    fn view(&self, cursor: &Cursor, game: &WordGame, settings: &GameSettings) -> Self::View;
}

/// Result of moving past a finished word
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advance {
    Next { index: usize, total: usize },
    SessionComplete { session: SessionRecord },
}

pub struct WordGameEngine<'a, S, W, R> {
    pub(crate) ctx: EngineContext<'a, S, W>,
    pub(crate) rules: R,
}

impl<'a, S: SessionStore, W: WordSource, R: WordGameRules> WordGameEngine<'a, S, W, R> {
    pub fn with_rules(ctx: EngineContext<'a, S, W>, rules: R) -> Self {
        Self { ctx, rules }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Shuffle the whole list into a new session, replacing any unfinished one
    pub fn start(&mut self, player_id: &str, list_id: i64) -> Result<i64> {
        let words = self.ctx.load_words(list_id)?;
        let shuffled =
            ShuffleSelector.select_words(&words, words.len(), &HashMap::new(), &mut self.ctx.rng);
        let cursor = self.ctx.begin(player_id, list_id, R::MODE, shuffled)?;
        Ok(cursor.session_id)
    }

    /// State of the current word's game, creating the game on first visit
    pub fn current(&mut self, player_id: &str) -> Result<R::View> {
        let cursor = self.ctx.playable_cursor(player_id, R::MODE)?;
        let game = self.ensure_game(&cursor)?;
        Ok(self.rules.view(&cursor, &game, &self.ctx.settings))
    }

    /// Move to the next word once the current one is won or lost. Past the last
    /// word the session is finalized.
    pub fn next_word(&mut self, player_id: &str) -> Result<Advance> {
        let mut cursor = self.ctx.playable_cursor(player_id, R::MODE)?;
        let finished = self
            .ctx
            .store
            .load_game(cursor.session_id, cursor.current_index)?
            .is_some_and(|game| game.is_finished());
        if !finished {
            return Err(GameError::InvalidInput(format!(
                "word {} is still in play",
                cursor.current_index + 1
            )));
        }

        cursor.current_index += 1;
        let cursor = self.ctx.commit(cursor)?;
        if cursor.is_complete() {
            let session = self.ctx.finalize(&cursor)?;
            return Ok(Advance::SessionComplete { session });
        }
        Ok(Advance::Next {
            index: cursor.current_index,
            total: cursor.total(),
        })
    }

    /// Finalize and drop the session. `None` when the player has none.
    pub fn complete(&self, player_id: &str) -> Result<Option<SessionRecord>> {
        self.ctx.complete(player_id, R::MODE)
    }

    /// Apply one guess to the current game. The cursor (with a version check) and
    /// the game row are written in one transaction, so a duplicated submission
    /// loses with `Conflict` instead of scoring twice. Unchanged games write nothing.
    pub(crate) fn play<T>(
        &mut self,
        player_id: &str,
        transition: impl FnOnce(&R, &mut WordGame, DateTime<Utc>) -> Result<T>,
    ) -> Result<(T, R::View)> {
        let mut cursor = self.ctx.playable_cursor(player_id, R::MODE)?;
        let mut game = self.ensure_game(&cursor)?;
        let before = game.clone();

        let outcome = transition(&self.rules, &mut game, self.ctx.clock.now())?;

        if game != before {
            cursor.points_so_far += game.points_earned.saturating_sub(before.points_earned);
            if game.is_won && !before.is_won {
                cursor.correct_so_far += 1;
            }
            cursor = self.ctx.store.atomically(|| {
                let cursor = self.ctx.commit(cursor)?;
                self.ctx.store.save_game(&game)?;
                Ok(cursor)
            })?;
            debug!(
                player_id,
                mode = %R::MODE,
                session_id = game.session_id,
                word_index = game.word_index,
                attempts = game.attempts,
                status = ?game.status(),
                points = game.points_earned,
                "guess applied"
            );
        }

        let view = self.rules.view(&cursor, &game, &self.ctx.settings);
        Ok((outcome, view))
    }

    fn ensure_game(&mut self, cursor: &Cursor) -> Result<WordGame> {
        if let Some(game) = self
            .ctx
            .store
            .load_game(cursor.session_id, cursor.current_index)?
        {
            return Ok(game);
        }

        let word = cursor
            .current_word()
            .ok_or_else(|| GameError::no_active_session(&cursor.player_id, R::MODE))?;
        let setup = self.rules.setup(word, &self.ctx.settings, &mut self.ctx.rng);

        self.ctx.store.insert_game(&WordGame {
            id: 0,
            session_id: cursor.session_id,
            player_id: cursor.player_id.clone(),
            mode: R::MODE,
            word_index: cursor.current_index,
            word_id: word.id,
            word: word.text.clone(),
            difficulty: word.difficulty,
            guessed_letters: Vec::new(),
            guesses: Vec::new(),
            attempts: 0,
            max_attempts: setup.max_attempts,
            missing_indices: setup.missing_indices,
            is_won: false,
            is_lost: false,
            started_at: self.ctx.clock.now(),
            completed_at: None,
            points_earned: 0,
        })
    }
}

/// Case-folded form of a single letter
pub(crate) fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
