//! The resumable word-sequence session shared by every game mode: an ordered word
//! list fixed at start, an index into it, and running totals, all persisted in the
//! player's cursor and reloaded on every call.

use crate::clock::{Clock, SystemClock};
use crate::config::GameSettings;
use crate::error::{GameError, Result};
use crate::session::{Cursor, GameMode, SessionRecord};
use crate::store::SessionStore;
use crate::words::{Word, WordSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// Collaborators and tunables shared by the engines
pub struct EngineContext<'a, S, W> {
    pub(crate) store: &'a S,
    pub(crate) source: &'a W,
    pub(crate) clock: &'a dyn Clock,
    pub(crate) settings: GameSettings,
    pub(crate) rng: StdRng,
}

impl<'a, S: SessionStore, W: WordSource> EngineContext<'a, S, W> {
    pub fn new(store: &'a S, source: &'a W) -> Self {
        Self {
            store,
            source,
            clock: &SystemClock,
            settings: GameSettings::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Deterministic shuffles and letter choices
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub(crate) fn load_words(&self, list_id: i64) -> Result<Vec<Word>> {
        let words = self.source.get_words(list_id)?;
        if words.is_empty() {
            return Err(GameError::EmptyList(list_id));
        }
        Ok(words)
    }

    /// Create the session record and install a fresh cursor at index 0,
    /// replacing whatever cursor the player had for this mode.
    pub(crate) fn begin(
        &self,
        player_id: &str,
        list_id: i64,
        mode: GameMode,
        words: Vec<Word>,
    ) -> Result<Cursor> {
        let now = self.clock.now();

        if let Some(previous) = self.store.load_cursor(player_id, mode)? {
            self.store
                .delete_word_timings(player_id, previous.session_id)?;
            info!(
                player_id,
                %mode,
                session_id = previous.session_id,
                "replacing unfinished session"
            );
        }

        let total = u32::try_from(words.len())
            .map_err(|_| GameError::InvalidInput(format!("list {list_id} is too large")))?;
        let session = self
            .store
            .create_session(player_id, list_id, mode, total, now)?;

        let cursor = self.store.upsert_cursor(&Cursor {
            player_id: player_id.to_string(),
            mode,
            session_id: session.id,
            current_index: 0,
            words,
            correct_so_far: 0,
            points_so_far: 0,
            started_at: now,
            updated_at: now,
            version: 0,
        })?;

        info!(player_id, %mode, session_id = session.id, list_id, words = total, "session started");
        Ok(cursor)
    }

    /// The player's cursor for `mode`, finished or not
    pub(crate) fn active_cursor(&self, player_id: &str, mode: GameMode) -> Result<Cursor> {
        self.store
            .load_cursor(player_id, mode)?
            .ok_or_else(|| GameError::no_active_session(player_id, mode))
    }

    /// The player's cursor for `mode` while words remain to be played
    pub(crate) fn playable_cursor(&self, player_id: &str, mode: GameMode) -> Result<Cursor> {
        let cursor = self.active_cursor(player_id, mode)?;
        if cursor.is_complete() {
            return Err(GameError::no_active_session(player_id, mode));
        }
        Ok(cursor)
    }

    /// Conditional write of the cursor's progress fields
    pub(crate) fn commit(&self, mut cursor: Cursor) -> Result<Cursor> {
        cursor.updated_at = self.clock.now();
        self.store.update_cursor(&cursor).map_err(|e| {
            if matches!(e, GameError::Conflict(_)) {
                warn!(
                    player_id = %cursor.player_id,
                    mode = %cursor.mode,
                    version = cursor.version,
                    "lost cursor update race"
                );
            }
            e
        })
    }

    /// Write the session aggregates, recomputed from the permanent per-word rows
    /// rather than the cursor's running totals.
    pub(crate) fn finalize(&self, cursor: &Cursor) -> Result<SessionRecord> {
        let (correct, points) = match cursor.mode {
            GameMode::Practice => {
                let attempts = self.store.attempts_for_session(cursor.session_id)?;
                (
                    attempts.iter().filter(|a| a.is_correct).count(),
                    attempts.iter().map(|a| a.points_earned).sum::<u32>(),
                )
            }
            GameMode::Hangman | GameMode::MissingLetter => {
                let games = self.store.games_for_session(cursor.session_id)?;
                (
                    games.iter().filter(|g| g.is_won).count(),
                    games.iter().map(|g| g.points_earned).sum::<u32>(),
                )
            }
        };

        let record = self.store.finalize_session(
            cursor.session_id,
            correct as u32,
            points,
            self.clock.now(),
        )?;
        info!(
            player_id = %cursor.player_id,
            mode = %cursor.mode,
            session_id = record.id,
            correct = record.correct_words,
            points = record.points_earned,
            "session finalized"
        );
        Ok(record)
    }

    /// Drop the live cursor and its timing rows; history stays.
    pub(crate) fn close(&self, cursor: &Cursor) -> Result<()> {
        self.store
            .delete_word_timings(&cursor.player_id, cursor.session_id)?;
        self.store.delete_cursor(&cursor.player_id, cursor.mode)?;
        Ok(())
    }

    /// Finalize and close the player's session for `mode`. `None` when there is none.
    pub(crate) fn complete(&self, player_id: &str, mode: GameMode) -> Result<Option<SessionRecord>> {
        let Some(cursor) = self.store.load_cursor(player_id, mode)? else {
            return Ok(None);
        };
        let record = self.finalize(&cursor)?;
        self.close(&cursor)?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::SqliteStore;
    use crate::words::NewWord;
    use chrono::{TimeZone, Utc};

    fn setup(words: &[&str]) -> (SqliteStore, i64) {
        let store = SqliteStore::open_in_memory().unwrap();
        let list_id = store.create_list("seq").unwrap();
        for text in words {
            store.add_word(list_id, &NewWord::new(text, 1)).unwrap();
        }
        (store, list_id)
    }

    #[test]
    fn empty_list_is_rejected() {
        let (store, list_id) = setup(&[]);
        let ctx = EngineContext::new(&store, &store);
        assert!(matches!(
            ctx.load_words(list_id),
            Err(GameError::EmptyList(id)) if id == list_id
        ));
    }

    #[test]
    fn begin_replaces_previous_cursor() {
        let (store, list_id) = setup(&["cat", "dog"]);
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap());
        let ctx = EngineContext::new(&store, &store).with_clock(&clock);
        let words = ctx.load_words(list_id).unwrap();

        let first = ctx
            .begin("kid", list_id, GameMode::Hangman, words.clone())
            .unwrap();
        store
            .record_word_timing("kid", first.session_id, 0, clock.now())
            .unwrap();
        clock.advance_ms(60_000);
        let second = ctx.begin("kid", list_id, GameMode::Hangman, words).unwrap();

        assert_ne!(first.session_id, second.session_id);
        let loaded = ctx.active_cursor("kid", GameMode::Hangman).unwrap();
        assert_eq!(loaded.session_id, second.session_id);

        // timing rows of the replaced session are gone
        let fresh = store
            .record_word_timing("kid", first.session_id, 0, clock.now())
            .unwrap();
        assert_eq!(fresh, clock.now());
    }

    #[test]
    fn playable_cursor_rejects_finished_sequence() {
        let (store, list_id) = setup(&["cat"]);
        let ctx = EngineContext::new(&store, &store);
        let words = ctx.load_words(list_id).unwrap();
        let cursor = ctx.begin("kid", list_id, GameMode::Practice, words).unwrap();

        let done = ctx
            .commit(Cursor {
                current_index: 1,
                ..cursor
            })
            .unwrap();
        assert_eq!(done.version, 1);
        assert!(matches!(
            ctx.playable_cursor("kid", GameMode::Practice),
            Err(GameError::NotFound(_))
        ));
        assert!(ctx.active_cursor("kid", GameMode::Practice).is_ok());
    }

    #[test]
    fn stale_commit_is_a_conflict() {
        let (store, list_id) = setup(&["cat", "dog"]);
        let ctx = EngineContext::new(&store, &store);
        let words = ctx.load_words(list_id).unwrap();
        let cursor = ctx.begin("kid", list_id, GameMode::Hangman, words).unwrap();

        // two requests read the same version; the second write loses
        let first = Cursor {
            points_so_far: 100,
            ..cursor.clone()
        };
        let second = Cursor {
            points_so_far: 100,
            ..cursor
        };
        ctx.commit(first).unwrap();
        assert!(matches!(ctx.commit(second), Err(GameError::Conflict(_))));

        let stored = ctx.active_cursor("kid", GameMode::Hangman).unwrap();
        assert_eq!(stored.points_so_far, 100);
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn complete_without_cursor_is_a_no_op() {
        let (store, _) = setup(&["cat"]);
        let ctx = EngineContext::new(&store, &store);
        assert_eq!(ctx.complete("nobody", GameMode::Practice).unwrap(), None);
    }
}
