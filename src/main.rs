use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use serde::Serialize;
use serde_json::json;
use spellplay::{
    config::{ConfigStore, FileConfigStore, GameSettings},
    error::GameError,
    lists::seed_bundled_lists,
    logging::init_tracing,
    store::SessionStore,
    word_game::Advance,
    EngineContext, GameMode, HangmanEngine, MissingLetterEngine, PracticeEngine, SqliteStore,
};
use std::{error::Error, path::PathBuf};
use tracing::info;

/// spelling practice, hangman and missing-letter games over your own word lists
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Resumable spelling games. Every command loads the player's progress from the database, applies one step and saves it again, so a game can be continued from any later invocation."
)]
pub struct Cli {
    /// sqlite database file (defaults to the platform state directory)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// config file (defaults to the platform config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// player the command acts for
    #[clap(short = 'p', long, global = true, default_value = "player")]
    player: String,

    /// game mode for start, current, submit, next and exit
    #[clap(short = 'm', long, global = true, value_enum, default_value_t = GameMode::Practice)]
    mode: GameMode,

    /// tracing filter directive, e.g. `debug` or `spellplay=trace`
    #[clap(long, global = true)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// import the bundled word lists that are not in the database yet
    Seed,
    /// show the word lists and their sizes
    Lists,
    /// start a new session on a list (id or name), replacing any unfinished one
    Start { list: String },
    /// show the current word or game
    Current,
    /// answer the current word (practice), guess a letter (hangman) or fill the blanks (missing-letter)
    Submit { input: String },
    /// move past a finished hangman or missing-letter game
    Next,
    /// finish the session and show its totals
    Exit,
    /// list the player's sessions, newest first
    History {
        /// write the sessions to a CSV file instead of printing them
        #[clap(long)]
        csv: Option<PathBuf>,
    },
    /// remove cursors nobody touched for a while
    Sweep {
        #[clap(long, default_value_t = 24)]
        older_than_hours: i64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load();
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.resolved_database_path());
    let store = SqliteStore::open(&db_path)?;
    info!(db = %db_path.display(), command = ?cli.command, "opened store");

    run(&cli, &store, &config.game)
}

fn run(cli: &Cli, store: &SqliteStore, settings: &GameSettings) -> Result<(), Box<dyn Error>> {
    let ctx = || EngineContext::new(store, store).with_settings(settings.clone());
    let player = cli.player.as_str();

    match &cli.command {
        Command::Seed => {
            let created = seed_bundled_lists(store)?;
            print_json(&json!({ "created": created }))?;
        }
        Command::Lists => print_json(&store.list_summaries()?)?,
        Command::Start { list } => {
            let list_id = resolve_list(store, list)?;
            let session_id = match cli.mode {
                GameMode::Practice => PracticeEngine::from_context(ctx()).start(player, list_id)?,
                GameMode::Hangman => HangmanEngine::from_context(ctx()).start(player, list_id)?,
                GameMode::MissingLetter => {
                    MissingLetterEngine::from_context(ctx()).start(player, list_id)?
                }
            };
            print_json(&json!({ "session_id": session_id, "mode": cli.mode }))?;
        }
        Command::Current => {
            let shown = match cli.mode {
                GameMode::Practice => to_json(PracticeEngine::from_context(ctx()).current(player)),
                GameMode::Hangman => to_json(HangmanEngine::from_context(ctx()).current(player)),
                GameMode::MissingLetter => {
                    to_json(MissingLetterEngine::from_context(ctx()).current(player))
                }
            };
            print_or_notice(shown)?;
        }
        Command::Submit { input } => {
            let result = match cli.mode {
                GameMode::Practice => {
                    to_json(PracticeEngine::from_context(ctx()).submit_answer(player, input))
                }
                GameMode::Hangman => {
                    to_json(HangmanEngine::from_context(ctx()).guess_letter(player, input))
                }
                GameMode::MissingLetter => {
                    to_json(MissingLetterEngine::from_context(ctx()).submit_guess(player, input))
                }
            };
            print_or_notice(result)?;
        }
        Command::Next => {
            let advance: Advance = match cli.mode {
                GameMode::Practice => {
                    return Err(GameError::InvalidInput(
                        "practice moves to the next word on submit".to_string(),
                    )
                    .into())
                }
                GameMode::Hangman => HangmanEngine::from_context(ctx()).next_word(player)?,
                GameMode::MissingLetter => {
                    MissingLetterEngine::from_context(ctx()).next_word(player)?
                }
            };
            print_json(&advance)?;
        }
        Command::Exit => {
            let session = match cli.mode {
                GameMode::Practice => PracticeEngine::from_context(ctx()).complete(player)?,
                GameMode::Hangman => HangmanEngine::from_context(ctx()).complete(player)?,
                GameMode::MissingLetter => {
                    MissingLetterEngine::from_context(ctx()).complete(player)?
                }
            };
            match session {
                Some(session) => print_json(&session)?,
                None => print_json(&notice(&GameError::no_active_session(player, cli.mode)))?,
            }
        }
        Command::History { csv } => {
            let sessions = store.sessions_for_player(player)?;
            match csv {
                Some(path) => {
                    let mut writer = csv::Writer::from_path(path)?;
                    for session in &sessions {
                        writer.serialize(session)?;
                    }
                    writer.flush()?;
                    print_json(&json!({ "exported": sessions.len(), "path": path }))?;
                }
                None => print_json(&sessions)?,
            }
        }
        Command::Sweep { older_than_hours } => {
            let cutoff = Utc::now() - Duration::hours(*older_than_hours);
            let removed = store.delete_stale_cursors(cutoff)?;
            info!(removed, %cutoff, "swept stale cursors");
            print_json(&json!({ "removed": removed }))?;
        }
    }
    Ok(())
}

/// A list given either by id or by name
fn resolve_list(store: &SqliteStore, list: &str) -> Result<i64, GameError> {
    if let Ok(id) = list.parse::<i64>() {
        return Ok(id);
    }
    if let Some(id) = store.find_list(list)? {
        return Ok(id);
    }
    let known = store.list_summaries()?.into_iter().map(|l| l.name).join(", ");
    Err(GameError::NotFound(format!(
        "word list {list:?} (known lists: {known})"
    )))
}

fn to_json<T: Serialize>(result: spellplay::Result<T>) -> spellplay::Result<serde_json::Value> {
    Ok(serde_json::to_value(result?)?)
}

/// Missing sessions are not a failure for read-and-play commands
fn print_or_notice(result: spellplay::Result<serde_json::Value>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(value) => print_json(&value),
        Err(e @ GameError::NotFound(_)) => print_json(&notice(&e)),
        Err(e) => Err(e.into()),
    }
}

fn notice(error: &GameError) -> serde_json::Value {
    json!({ "status": "no_active_session", "message": error.to_string() })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
