use crate::error::{GameError, Result};
use crate::session::{Cursor, GameMode, SessionRecord, WordAttempt, WordGame};
use crate::words::{NewWord, Word, WordPerformance, WordSource};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Durable storage for sessions, cursors, attempts, timings and per-word games.
///
/// Every cursor operation is addressed by `(player_id, mode)`, so players never
/// contend with each other. Within one player, [`SessionStore::update_cursor`] is a
/// compare-and-swap on the cursor version.
pub trait SessionStore {
    fn create_session(
        &self,
        player_id: &str,
        list_id: i64,
        mode: GameMode,
        total_words: u32,
        started_at: DateTime<Utc>,
    ) -> Result<SessionRecord>;
    fn get_session(&self, session_id: i64) -> Result<Option<SessionRecord>>;
    /// Writes the aggregates. `completed_at` is only set the first time.
    fn finalize_session(
        &self,
        session_id: i64,
        correct_words: u32,
        points_earned: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionRecord>;
    /// Newest first
    fn sessions_for_player(&self, player_id: &str) -> Result<Vec<SessionRecord>>;

    fn load_cursor(&self, player_id: &str, mode: GameMode) -> Result<Option<Cursor>>;
    /// Insert or replace the player's cursor for `cursor.mode`. The stored version restarts at 0.
    fn upsert_cursor(&self, cursor: &Cursor) -> Result<Cursor>;
    /// Persist `cursor` only if the stored version still equals `cursor.version`.
    /// Returns the cursor with its new version, or `Conflict`.
    fn update_cursor(&self, cursor: &Cursor) -> Result<Cursor>;
    fn delete_cursor(&self, player_id: &str, mode: GameMode) -> Result<bool>;
    /// Remove cursors (and their timing rows) not touched since `before`
    fn delete_stale_cursors(&self, before: DateTime<Utc>) -> Result<usize>;

    /// First call for a key wins; later calls return the stored timestamp.
    fn record_word_timing(
        &self,
        player_id: &str,
        session_id: i64,
        word_index: usize,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>>;
    fn delete_word_timings(&self, player_id: &str, session_id: i64) -> Result<()>;

    fn append_attempt(&self, attempt: &WordAttempt) -> Result<i64>;
    fn attempts_for_session(&self, session_id: i64) -> Result<Vec<WordAttempt>>;

    fn load_game(&self, session_id: i64, word_index: usize) -> Result<Option<WordGame>>;
    /// Insert unless a game already exists for `(session_id, word_index)`; returns the stored game.
    fn insert_game(&self, game: &WordGame) -> Result<WordGame>;
    fn save_game(&self, game: &WordGame) -> Result<()>;
    fn games_for_session(&self, session_id: i64) -> Result<Vec<WordGame>>;

    /// Run `f` as one unit of work: every write it makes lands, or none do.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub id: i64,
    pub name: String,
    pub word_count: u32,
}

/// SQLite-backed store. Also serves as the word source for locally managed lists.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS word_lists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    list_id INTEGER NOT NULL REFERENCES word_lists(id),
    text TEXT NOT NULL,
    difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
    audio_ref TEXT,
    definition TEXT,
    position INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_words_list ON words(list_id, position);

CREATE TABLE IF NOT EXISTS game_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id TEXT NOT NULL,
    list_id INTEGER NOT NULL,
    mode TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    total_words INTEGER NOT NULL,
    correct_words INTEGER NOT NULL DEFAULT 0,
    points_earned INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_game_sessions_player ON game_sessions(player_id, started_at);

CREATE TABLE IF NOT EXISTS word_attempts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES game_sessions(id),
    word_id INTEGER NOT NULL,
    attempt_text TEXT NOT NULL,
    is_correct BOOLEAN NOT NULL,
    time_taken_ms INTEGER NOT NULL,
    points_earned INTEGER NOT NULL,
    attempted_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_word_attempts_session ON word_attempts(session_id);
CREATE INDEX IF NOT EXISTS idx_word_attempts_word ON word_attempts(word_id);

CREATE TABLE IF NOT EXISTS word_timings (
    player_id TEXT NOT NULL,
    session_id INTEGER NOT NULL,
    word_index INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    PRIMARY KEY (player_id, session_id, word_index)
);

CREATE TABLE IF NOT EXISTS cursors (
    player_id TEXT NOT NULL,
    mode TEXT NOT NULL,
    session_id INTEGER NOT NULL,
    current_index INTEGER NOT NULL,
    words_json TEXT NOT NULL,
    correct_so_far INTEGER NOT NULL,
    points_so_far INTEGER NOT NULL,
    started_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (player_id, mode)
);

CREATE TABLE IF NOT EXISTS word_games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES game_sessions(id),
    player_id TEXT NOT NULL,
    mode TEXT NOT NULL,
    word_index INTEGER NOT NULL,
    word_id INTEGER NOT NULL,
    word TEXT NOT NULL,
    difficulty INTEGER NOT NULL,
    guessed_letters TEXT NOT NULL,
    guesses TEXT NOT NULL,
    attempts INTEGER NOT NULL,
    max_attempts INTEGER NOT NULL,
    missing_indices TEXT NOT NULL,
    is_won BOOLEAN NOT NULL,
    is_lost BOOLEAN NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    points_earned INTEGER NOT NULL,
    UNIQUE (session_id, word_index)
);
"#;

const SESSION_COLUMNS: &str = "id, player_id, list_id, mode, started_at, completed_at, total_words, correct_words, points_earned";
const CURSOR_COLUMNS: &str = "player_id, mode, session_id, current_index, words_json, correct_so_far, points_so_far, started_at, updated_at, version";
const GAME_COLUMNS: &str = "id, session_id, player_id, mode, word_index, word_id, word, difficulty, guessed_letters, guesses, attempts, max_attempts, missing_indices, is_won, is_lost, started_at, completed_at, points_earned";

impl SqliteStore {
    /// Open (creating if needed) the database file and its schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    GameError::Config(format!(
                        "failed to create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    pub fn create_list(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO word_lists (name) VALUES (?1)", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_list(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM word_lists WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// Append a word at the end of the list
    pub fn add_word(&self, list_id: i64, word: &NewWord) -> Result<Word> {
        if word.text.trim().is_empty() {
            return Err(GameError::InvalidInput("word text is empty".to_string()));
        }
        if !(1..=5).contains(&word.difficulty) {
            return Err(GameError::InvalidInput(format!(
                "difficulty {} outside 1..=5",
                word.difficulty
            )));
        }
        self.require_list(list_id)?;

        let position: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM words WHERE list_id = ?1",
            [list_id],
            |row| row.get(0),
        )?;
        self.conn.execute(
            r#"
            INSERT INTO words (list_id, text, difficulty, audio_ref, definition, position)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                list_id,
                word.text.trim(),
                word.difficulty,
                word.audio_ref,
                word.definition,
                position,
            ],
        )?;

        Ok(Word {
            id: self.conn.last_insert_rowid(),
            list_id,
            text: word.text.trim().to_string(),
            difficulty: word.difficulty,
            audio_ref: word.audio_ref.clone(),
            definition: word.definition.clone(),
            position,
        })
    }

    pub fn list_summaries(&self) -> Result<Vec<ListSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.id, l.name, COUNT(w.id)
            FROM word_lists l
            LEFT JOIN words w ON w.list_id = l.id
            GROUP BY l.id, l.name
            ORDER BY l.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ListSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                word_count: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn require_list(&self, list_id: i64) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM word_lists WHERE id = ?1)",
            [list_id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(GameError::NotFound(format!("word list {list_id}")))
        }
    }
}

impl SessionStore for SqliteStore {
    fn create_session(
        &self,
        player_id: &str,
        list_id: i64,
        mode: GameMode,
        total_words: u32,
        started_at: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        self.conn.execute(
            r#"
            INSERT INTO game_sessions (player_id, list_id, mode, started_at, total_words)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                player_id,
                list_id,
                mode.to_string(),
                ts(started_at),
                total_words
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_session(id)?
            .ok_or_else(|| GameError::NotFound(format!("session {id}")))
    }

    fn get_session(&self, session_id: i64) -> Result<Option<SessionRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM game_sessions WHERE id = ?1"),
                [session_id],
                session_from_row,
            )
            .optional()?)
    }

    fn finalize_session(
        &self,
        session_id: i64,
        correct_words: u32,
        points_earned: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionRecord> {
        let updated = self.conn.execute(
            r#"
            UPDATE game_sessions
            SET correct_words = ?2,
                points_earned = ?3,
                completed_at = COALESCE(completed_at, ?4)
            WHERE id = ?1
            "#,
            params![session_id, correct_words, points_earned, ts(completed_at)],
        )?;
        if updated == 0 {
            return Err(GameError::NotFound(format!("session {session_id}")));
        }
        self.get_session(session_id)?
            .ok_or_else(|| GameError::NotFound(format!("session {session_id}")))
    }

    fn sessions_for_player(&self, player_id: &str) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM game_sessions WHERE player_id = ?1 ORDER BY started_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([player_id], session_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn load_cursor(&self, player_id: &str, mode: GameMode) -> Result<Option<Cursor>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {CURSOR_COLUMNS} FROM cursors WHERE player_id = ?1 AND mode = ?2"),
                params![player_id, mode.to_string()],
                cursor_from_row,
            )
            .optional()?)
    }

    fn upsert_cursor(&self, cursor: &Cursor) -> Result<Cursor> {
        self.conn.execute(
            r#"
            INSERT INTO cursors
            (player_id, mode, session_id, current_index, words_json, correct_so_far, points_so_far, started_at, updated_at, version)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)
            ON CONFLICT(player_id, mode) DO UPDATE SET
                session_id = excluded.session_id,
                current_index = excluded.current_index,
                words_json = excluded.words_json,
                correct_so_far = excluded.correct_so_far,
                points_so_far = excluded.points_so_far,
                started_at = excluded.started_at,
                updated_at = excluded.updated_at,
                version = 0
            "#,
            params![
                cursor.player_id,
                cursor.mode.to_string(),
                cursor.session_id,
                cursor.current_index,
                serde_json::to_string(&cursor.words)?,
                cursor.correct_so_far,
                cursor.points_so_far,
                ts(cursor.started_at),
                ts(cursor.updated_at),
            ],
        )?;
        Ok(Cursor {
            version: 0,
            ..cursor.clone()
        })
    }

    fn update_cursor(&self, cursor: &Cursor) -> Result<Cursor> {
        let updated = self.conn.execute(
            r#"
            UPDATE cursors
            SET current_index = ?4,
                correct_so_far = ?5,
                points_so_far = ?6,
                updated_at = ?7,
                version = version + 1
            WHERE player_id = ?1 AND mode = ?2 AND session_id = ?3 AND version = ?8
            "#,
            params![
                cursor.player_id,
                cursor.mode.to_string(),
                cursor.session_id,
                cursor.current_index,
                cursor.correct_so_far,
                cursor.points_so_far,
                ts(cursor.updated_at),
                cursor.version,
            ],
        )?;
        if updated == 0 {
            return Err(GameError::Conflict(format!(
                "{} cursor for player {} changed since version {}",
                cursor.mode, cursor.player_id, cursor.version
            )));
        }
        Ok(Cursor {
            version: cursor.version + 1,
            ..cursor.clone()
        })
    }

    fn delete_cursor(&self, player_id: &str, mode: GameMode) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM cursors WHERE player_id = ?1 AND mode = ?2",
            params![player_id, mode.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        // dropping the transaction without commit rolls it back
        let tx = self.conn.unchecked_transaction()?;
        let out = f()?;
        tx.commit()?;
        Ok(out)
    }

    fn delete_stale_cursors(&self, before: DateTime<Utc>) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            DELETE FROM word_timings
            WHERE (player_id, session_id) IN (
                SELECT player_id, session_id FROM cursors WHERE updated_at < ?1
            )
            "#,
            [ts(before)],
        )?;
        let deleted = tx.execute("DELETE FROM cursors WHERE updated_at < ?1", [ts(before)])?;
        tx.commit()?;
        debug!(deleted, "swept stale cursors");
        Ok(deleted)
    }

    fn record_word_timing(
        &self,
        player_id: &str,
        session_id: i64,
        word_index: usize,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO word_timings (player_id, session_id, word_index, started_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![player_id, session_id, word_index, ts(at)],
        )?;
        Ok(self.conn.query_row(
            r#"
            SELECT started_at FROM word_timings
            WHERE player_id = ?1 AND session_id = ?2 AND word_index = ?3
            "#,
            params![player_id, session_id, word_index],
            |row| timestamp_column(row, 0),
        )?)
    }

    fn delete_word_timings(&self, player_id: &str, session_id: i64) -> Result<()> {
        self.conn.execute(
            "DELETE FROM word_timings WHERE player_id = ?1 AND session_id = ?2",
            params![player_id, session_id],
        )?;
        Ok(())
    }

    fn append_attempt(&self, attempt: &WordAttempt) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO word_attempts
            (session_id, word_id, attempt_text, is_correct, time_taken_ms, points_earned, attempted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                attempt.session_id,
                attempt.word_id,
                attempt.attempt_text,
                attempt.is_correct,
                attempt.time_taken_ms,
                attempt.points_earned,
                ts(attempt.attempted_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn attempts_for_session(&self, session_id: i64) -> Result<Vec<WordAttempt>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, session_id, word_id, attempt_text, is_correct, time_taken_ms, points_earned, attempted_at
            FROM word_attempts
            WHERE session_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([session_id], |row| {
            Ok(WordAttempt {
                id: row.get(0)?,
                session_id: row.get(1)?,
                word_id: row.get(2)?,
                attempt_text: row.get(3)?,
                is_correct: row.get(4)?,
                time_taken_ms: row.get(5)?,
                points_earned: row.get(6)?,
                attempted_at: timestamp_column(row, 7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn load_game(&self, session_id: i64, word_index: usize) -> Result<Option<WordGame>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {GAME_COLUMNS} FROM word_games WHERE session_id = ?1 AND word_index = ?2"
                ),
                params![session_id, word_index],
                game_from_row,
            )
            .optional()?)
    }

    fn insert_game(&self, game: &WordGame) -> Result<WordGame> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO word_games
            (session_id, player_id, mode, word_index, word_id, word, difficulty, guessed_letters, guesses,
             attempts, max_attempts, missing_indices, is_won, is_lost, started_at, completed_at, points_earned)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                game.session_id,
                game.player_id,
                game.mode.to_string(),
                game.word_index,
                game.word_id,
                game.word,
                game.difficulty,
                to_json(&game.guessed_letters)?,
                to_json(&game.guesses)?,
                game.attempts,
                game.max_attempts,
                to_json(&game.missing_indices)?,
                game.is_won,
                game.is_lost,
                ts(game.started_at),
                game.completed_at.map(ts),
                game.points_earned,
            ],
        )?;
        self.load_game(game.session_id, game.word_index)?
            .ok_or_else(|| {
                GameError::NotFound(format!(
                    "game {} of session {}",
                    game.word_index, game.session_id
                ))
            })
    }

    fn save_game(&self, game: &WordGame) -> Result<()> {
        let updated = self.conn.execute(
            r#"
            UPDATE word_games
            SET guessed_letters = ?2,
                guesses = ?3,
                attempts = ?4,
                is_won = ?5,
                is_lost = ?6,
                completed_at = ?7,
                points_earned = ?8
            WHERE id = ?1
            "#,
            params![
                game.id,
                to_json(&game.guessed_letters)?,
                to_json(&game.guesses)?,
                game.attempts,
                game.is_won,
                game.is_lost,
                game.completed_at.map(ts),
                game.points_earned,
            ],
        )?;
        if updated == 0 {
            return Err(GameError::NotFound(format!("game {}", game.id)));
        }
        Ok(())
    }

    fn games_for_session(&self, session_id: i64) -> Result<Vec<WordGame>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GAME_COLUMNS} FROM word_games WHERE session_id = ?1 ORDER BY word_index"
        ))?;
        let rows = stmt.query_map([session_id], game_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl WordSource for SqliteStore {
    fn get_words(&self, list_id: i64) -> Result<Vec<Word>> {
        self.require_list(list_id)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, list_id, text, difficulty, audio_ref, definition, position
            FROM words
            WHERE list_id = ?1
            ORDER BY position, id
            "#,
        )?;
        let rows = stmt.query_map([list_id], |row| {
            Ok(Word {
                id: row.get(0)?,
                list_id: row.get(1)?,
                text: row.get(2)?,
                difficulty: row.get(3)?,
                audio_ref: row.get(4)?,
                definition: row.get(5)?,
                position: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_word_performance(
        &self,
        player_id: &str,
        word_ids: &[i64],
    ) -> Result<HashMap<i64, WordPerformance>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN a.is_correct = 1 THEN 1 ELSE 0 END), 0)
            FROM word_attempts a
            JOIN game_sessions s ON s.id = a.session_id
            WHERE s.player_id = ?1 AND a.word_id = ?2
            "#,
        )?;

        let mut performance = HashMap::new();
        for &word_id in word_ids {
            let (attempts, correct): (u32, u32) =
                stmt.query_row(params![player_id, word_id], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?;
            if attempts > 0 {
                performance.insert(word_id, WordPerformance { attempts, correct });
            }
        }
        Ok(performance)
    }
}

fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn mode_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<GameMode> {
    let raw: String = row.get(idx)?;
    GameMode::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        player_id: row.get(1)?,
        list_id: row.get(2)?,
        mode: mode_column(row, 3)?,
        started_at: timestamp_column(row, 4)?,
        completed_at: optional_timestamp_column(row, 5)?,
        total_words: row.get(6)?,
        correct_words: row.get(7)?,
        points_earned: row.get(8)?,
    })
}

fn cursor_from_row(row: &Row<'_>) -> rusqlite::Result<Cursor> {
    Ok(Cursor {
        player_id: row.get(0)?,
        mode: mode_column(row, 1)?,
        session_id: row.get(2)?,
        current_index: row.get(3)?,
        words: json_column(row, 4)?,
        correct_so_far: row.get(5)?,
        points_so_far: row.get(6)?,
        started_at: timestamp_column(row, 7)?,
        updated_at: timestamp_column(row, 8)?,
        version: row.get(9)?,
    })
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<WordGame> {
    Ok(WordGame {
        id: row.get(0)?,
        session_id: row.get(1)?,
        player_id: row.get(2)?,
        mode: mode_column(row, 3)?,
        word_index: row.get(4)?,
        word_id: row.get(5)?,
        word: row.get(6)?,
        difficulty: row.get(7)?,
        guessed_letters: json_column(row, 8)?,
        guesses: json_column(row, 9)?,
        attempts: row.get(10)?,
        max_attempts: row.get(11)?,
        missing_indices: json_column(row, 12)?,
        is_won: row.get(13)?,
        is_lost: row.get(14)?,
        started_at: timestamp_column(row, 15)?,
        completed_at: optional_timestamp_column(row, 16)?,
        points_earned: row.get(17)?,
    })
}
