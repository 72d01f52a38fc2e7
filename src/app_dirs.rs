//! Default locations of the game database and config file, used when neither
//! `--db` nor `--config` names one.

use directories::ProjectDirs;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const APP_NAME: &str = "spellplay";
const DB_FILE: &str = "spellplay.db";
const CONFIG_FILE: &str = "config.json";

/// Points both files at one directory, e.g. a classroom share or a test sandbox
pub const HOME_OVERRIDE_VAR: &str = "SPELLPLAY_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub state_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl AppDirs {
    /// Resolve from the process environment. `None` only when no home directory
    /// can be found at all.
    pub fn from_env() -> Option<Self> {
        let project = ProjectDirs::from("", "", APP_NAME);
        Self::resolve(
            env::var_os(HOME_OVERRIDE_VAR),
            env::var_os("HOME"),
            project.as_ref().map(|p| p.data_local_dir().to_path_buf()),
            project.as_ref().map(|p| p.config_dir().to_path_buf()),
        )
    }

    /// Precedence: the override directory for everything, then the XDG state
    /// directory under `$HOME` for the database, then the platform directories.
    fn resolve(
        override_dir: Option<OsString>,
        home: Option<OsString>,
        platform_data: Option<PathBuf>,
        platform_config: Option<PathBuf>,
    ) -> Option<Self> {
        let non_empty = |v: Option<OsString>| v.filter(|s| !s.is_empty()).map(PathBuf::from);

        if let Some(dir) = non_empty(override_dir) {
            return Some(Self {
                state_dir: dir.clone(),
                config_dir: dir,
            });
        }

        let state_dir = non_empty(home)
            .map(|h| h.join(".local").join("state").join(APP_NAME))
            .or(platform_data)?;
        let config_dir = platform_config.unwrap_or_else(|| state_dir.clone());
        Some(Self {
            state_dir,
            config_dir,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join(DB_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_holds_both_files() {
        let dirs = AppDirs::resolve(
            Some("/srv/spelling".into()),
            Some("/home/ann".into()),
            Some(PathBuf::from("/data")),
            Some(PathBuf::from("/config")),
        )
        .unwrap();
        assert_eq!(dirs.db_path(), PathBuf::from("/srv/spelling/spellplay.db"));
        assert_eq!(dirs.config_path(), PathBuf::from("/srv/spelling/config.json"));
    }

    #[test]
    fn database_lives_in_xdg_state_under_home() {
        let dirs = AppDirs::resolve(
            Some("".into()),
            Some("/home/ann".into()),
            Some(PathBuf::from("/data")),
            Some(PathBuf::from("/config/spellplay")),
        )
        .unwrap();
        assert_eq!(
            dirs.db_path(),
            PathBuf::from("/home/ann/.local/state/spellplay/spellplay.db")
        );
        assert_eq!(
            dirs.config_path(),
            PathBuf::from("/config/spellplay/config.json")
        );
    }

    #[test]
    fn falls_back_to_platform_dirs_without_home() {
        let dirs = AppDirs::resolve(None, None, Some(PathBuf::from("/data/spellplay")), None)
            .unwrap();
        assert_eq!(dirs.db_path(), PathBuf::from("/data/spellplay/spellplay.db"));
        assert_eq!(dirs.config_path(), PathBuf::from("/data/spellplay/config.json"));

        assert_eq!(AppDirs::resolve(None, None, None, None), None);
    }
}
