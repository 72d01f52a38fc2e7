use crate::clock::elapsed_ms;
use crate::error::{GameError, Result};
use crate::scoring::practice_score;
use crate::selector::{PerformanceWeightedSelector, ShuffleSelector, WordSelector};
use crate::sequence::EngineContext;
use crate::session::{GameMode, SessionRecord, WordAttempt};
use crate::store::SessionStore;
use crate::words::{Word, WordSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

const MODE: GameMode = GameMode::Practice;

/// The word currently presented to the player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PracticeView {
    pub session_id: i64,
    pub word: Word,
    pub index: usize,
    pub total: usize,
    pub correct_so_far: u32,
    pub points_so_far: u32,
    pub presented_at: DateTime<Utc>,
}

/// Outcome of one submitted answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PracticeAnswer {
    pub is_correct: bool,
    pub correct_word: String,
    pub points_earned: u32,
    pub time_taken_ms: u64,
    /// Index of the next word, `None` once the list is done
    pub next_index: Option<usize>,
    /// Finalized session once the last word has been answered
    pub session: Option<SessionRecord>,
}

impl PracticeAnswer {
    pub fn completed(&self) -> bool {
        self.session.is_some()
    }
}

/// Free-typing practice: the player spells each word, scored on difficulty and speed
pub struct PracticeEngine<'a, S, W> {
    ctx: EngineContext<'a, S, W>,
}

impl<'a, S: SessionStore, W: WordSource> PracticeEngine<'a, S, W> {
    pub fn new(store: &'a S, source: &'a W) -> Self {
        Self::from_context(EngineContext::new(store, source))
    }

    pub fn from_context(ctx: EngineContext<'a, S, W>) -> Self {
        Self { ctx }
    }

    /// Begin a play-through of `list_id`, replacing any unfinished practice session.
    /// Lists longer than the weighted threshold are sampled toward the player's weak words.
    pub fn start(&mut self, player_id: &str, list_id: i64) -> Result<i64> {
        let words = self.ctx.load_words(list_id)?;
        let selected = self.select_words(player_id, &words)?;

        let cursor = self.ctx.begin(player_id, list_id, MODE, selected)?;
        self.ctx.store.record_word_timing(
            player_id,
            cursor.session_id,
            0,
            cursor.started_at,
        )?;
        Ok(cursor.session_id)
    }

    fn select_words(&mut self, player_id: &str, words: &[Word]) -> Result<Vec<Word>> {
        let settings = &self.ctx.settings;
        if words.len() > settings.weighted_threshold {
            let ids: Vec<i64> = words.iter().map(|w| w.id).collect();
            let performance = self.ctx.source.get_word_performance(player_id, &ids)?;
            debug!(
                player_id,
                candidates = words.len(),
                with_history = performance.len(),
                "weighted practice selection"
            );
            Ok(PerformanceWeightedSelector.select_words(
                words,
                settings.weighted_sample_size,
                &performance,
                &mut self.ctx.rng,
            ))
        } else {
            Ok(ShuffleSelector.select_words(
                words,
                words.len(),
                &HashMap::new(),
                &mut self.ctx.rng,
            ))
        }
    }

    /// The word to spell now. Repeated calls keep the first presentation time.
    pub fn current(&self, player_id: &str) -> Result<PracticeView> {
        let cursor = self.ctx.playable_cursor(player_id, MODE)?;
        let word = cursor
            .current_word()
            .cloned()
            .ok_or_else(|| GameError::no_active_session(player_id, MODE))?;
        let presented_at = self.ctx.store.record_word_timing(
            player_id,
            cursor.session_id,
            cursor.current_index,
            self.ctx.clock.now(),
        )?;

        Ok(PracticeView {
            session_id: cursor.session_id,
            word,
            index: cursor.current_index,
            total: cursor.total(),
            correct_so_far: cursor.correct_so_far,
            points_so_far: cursor.points_so_far,
            presented_at,
        })
    }

    /// Check an answer against the current word (trimmed, case-insensitive, exact)
    /// and move on to the next word.
    pub fn submit_answer(&self, player_id: &str, answer: &str) -> Result<PracticeAnswer> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(GameError::InvalidInput("answer is empty".to_string()));
        }

        let mut cursor = self.ctx.playable_cursor(player_id, MODE)?;
        let word = cursor
            .current_word()
            .cloned()
            .ok_or_else(|| GameError::no_active_session(player_id, MODE))?;

        let now = self.ctx.clock.now();
        let presented_at = self.ctx.store.record_word_timing(
            player_id,
            cursor.session_id,
            cursor.current_index,
            now,
        )?;
        let time_taken_ms = elapsed_ms(presented_at, now);

        let is_correct = answer.to_lowercase() == word.normalized();
        let points_earned = if is_correct {
            practice_score(word.difficulty, time_taken_ms)
        } else {
            0
        };

        cursor.current_index += 1;
        cursor.points_so_far += points_earned;
        if is_correct {
            cursor.correct_so_far += 1;
        }
        let cursor = self.ctx.store.atomically(|| {
            let cursor = self.ctx.commit(cursor)?;
            self.ctx.store.append_attempt(&WordAttempt {
                id: 0,
                session_id: cursor.session_id,
                word_id: word.id,
                attempt_text: answer.to_string(),
                is_correct,
                time_taken_ms,
                points_earned,
                attempted_at: now,
            })?;
            Ok(cursor)
        })?;
        debug!(
            player_id,
            session_id = cursor.session_id,
            word_id = word.id,
            is_correct,
            time_taken_ms,
            points_earned,
            "practice answer"
        );

        let (next_index, session) = if cursor.is_complete() {
            (None, Some(self.ctx.finalize(&cursor)?))
        } else {
            self.ctx.store.record_word_timing(
                player_id,
                cursor.session_id,
                cursor.current_index,
                now,
            )?;
            (Some(cursor.current_index), None)
        };

        Ok(PracticeAnswer {
            is_correct,
            correct_word: word.text,
            points_earned,
            time_taken_ms,
            next_index,
            session,
        })
    }

    /// Finish (or abandon) the practice session: aggregates are written from the
    /// recorded attempts, then the cursor and timing rows are removed.
    /// Without an active session this does nothing and returns `None`.
    pub fn complete(&self, player_id: &str) -> Result<Option<SessionRecord>> {
        self.ctx.complete(player_id, MODE)
    }
}
