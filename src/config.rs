//! Application configuration
//!
//! Resolved from built-in defaults, then an optional JSON file in the
//! user's config directory, then environment variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const APP_DIR: &str = "user-roster";
const DB_FILE: &str = "user_roster.db";
const CONFIG_FILE: &str = "config.json";

/// Overrides the database location
pub const DB_PATH_ENV: &str = "USER_ROSTER_DB";
/// Starts the UI in dark mode when set to 1/true/yes
pub const DARK_THEME_ENV: &str = "USER_ROSTER_DARK_THEME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Location of the SQLite database file
    pub db_path: PathBuf,
    /// Initial theme
    pub dark_theme: bool,
}

/// On-disk shape of `config.json`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    db_path: Option<PathBuf>,
    dark_theme: Option<bool>,
}

impl Config {
    /// Load the configuration for this process
    pub fn load() -> Result<Self, ConfigError> {
        let file = match Self::config_file_path() {
            Some(path) => read_file(&path)?,
            None => FileConfig::default(),
        };

        let config = Self::resolve(file, |key| std::env::var(key).ok());
        info!("⚙️  Using database at {}", config.db_path.display());
        Ok(config)
    }

    /// Get the path of the optional config file:
    /// - Linux: ~/.config/user-roster/config.json
    /// - macOS: ~/Library/Application Support/user-roster/config.json
    /// - Windows: %APPDATA%\user-roster\config.json
    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Get the default database location in the user's data directory
    fn default_db_path() -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(DB_FILE)
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = env(DB_PATH_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or(file.db_path)
            .unwrap_or_else(Self::default_db_path);

        let dark_theme = match env(DARK_THEME_ENV) {
            Some(value) => parse_flag(&value),
            None => file.dark_theme.unwrap_or(false),
        };

        Config { db_path, dark_theme }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// A missing file is the same as an empty one
fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config file at {}", path.display());
            Ok(FileConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
