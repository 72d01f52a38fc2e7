use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// When the missing-letter display shows the hidden letters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealPolicy {
    /// Revealed once any guess in the history equals the concatenated hidden letters
    #[default]
    GuessHistory,
    /// Revealed only when the game is won
    WinState,
}

/// Tunables of the game engines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    /// Practice lists longer than this use performance-weighted selection
    pub weighted_threshold: usize,
    pub weighted_sample_size: usize,
    pub hangman_max_wrong_guesses: u32,
    pub missing_letter_max_attempts: u32,
    pub reveal_policy: RevealPolicy,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            weighted_threshold: 20,
            weighted_sample_size: 20,
            hangman_max_wrong_guesses: 6,
            missing_letter_max_attempts: 3,
            reveal_policy: RevealPolicy::GuessHistory,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub game: GameSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            game: GameSettings::default(),
        }
    }
}

impl Config {
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(|| AppDirs::from_env().map(|dirs| dirs.db_path()))
            .unwrap_or_else(|| PathBuf::from("spellplay.db"))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::from_env()
            .map(|dirs| dirs.config_path())
            .unwrap_or_else(|| PathBuf::from("spellplay_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), "ignoring unreadable config: {e}"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
