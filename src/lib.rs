// Library surface: the engines, the store behind them and the ambient plumbing.
// The command-line driver in main.rs only wires these together.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod hangman;
pub mod lists;
pub mod logging;
pub mod missing_letter;
pub mod practice;
pub mod scoring;
pub mod selector;
pub mod sequence;
pub mod session;
pub mod store;
pub mod word_game;
pub mod words;

pub use error::{GameError, Result};
pub use hangman::HangmanEngine;
pub use missing_letter::MissingLetterEngine;
pub use practice::PracticeEngine;
pub use sequence::EngineContext;
pub use session::GameMode;
pub use store::{SessionStore, SqliteStore};
