use thiserror::Error;

/// Errors surfaced by the game engines and the store behind them
#[derive(Debug, Error)]
pub enum GameError {
    /// No active cursor, unknown session, unknown word or unknown list
    #[error("not found: {0}")]
    NotFound(String),
    #[error("word list {0} has no words")]
    EmptyList(i64),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A concurrent request advanced the cursor first
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] rusqlite::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
}

impl GameError {
    /// Errors the caller is expected to absorb (redirect or reload) rather than report
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GameError::NotFound(_) | GameError::Conflict(_))
    }

    pub fn no_active_session(player_id: &str, mode: impl std::fmt::Display) -> Self {
        GameError::NotFound(format!("no active {mode} session for player {player_id}"))
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors() {
        assert!(GameError::NotFound("cursor".into()).is_recoverable());
        assert!(GameError::Conflict("cursor".into()).is_recoverable());
        assert!(!GameError::EmptyList(3).is_recoverable());
        assert!(!GameError::InvalidInput("x".into()).is_recoverable());
    }

    #[test]
    fn messages_name_the_subject() {
        assert_eq!(
            GameError::EmptyList(7).to_string(),
            "word list 7 has no words"
        );
        assert_eq!(
            GameError::no_active_session("kid-1", "hangman").to_string(),
            "not found: no active hangman session for player kid-1"
        );
    }
}
