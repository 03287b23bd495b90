//! Application configuration.
//!
//! # Responsibility
//! - Describe where the database, note files and logs live, and which
//!   editor opens notes.
//! - Load the YAML config file, falling back to per-user defaults.
//!
//! # Invariants
//! - Configuration is a plain value passed to collaborators; core keeps no
//!   process-wide config state.
//! - Missing keys in the file take their default value.
//!
//! # Example YAML
//!
//! ```yaml
//! db_path: /home/me/.local/share/taskdeck/taskdeck.sqlite3
//! notes_dir: /home/me/notes
//! editor: nvim
//! log_level: info
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "taskdeck";
const CONFIG_FILE_NAME: &str = "config.yaml";
const DB_FILE_NAME: &str = "taskdeck.sqlite3";
const FALLBACK_EDITOR: &str = "vi";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Yaml { path: PathBuf, source: serde_yaml::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to access config `{}`: {source}", path.display())
            }
            Self::Yaml { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Directory where markdown note files are created.
    pub notes_dir: PathBuf,
    /// Editor command for `note open`. Falls back to `$EDITOR`, then `vi`.
    pub editor: Option<String>,
    /// One of `off|error|warn|info|debug|trace`.
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            notes_dir: data_dir.join("notes"),
            editor: None,
            log_level: default_log_level().to_string(),
            log_dir: data_dir.join("logs"),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given, otherwise the default config file if it
    /// exists, otherwise built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = default_config_path();
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Writes this configuration as YAML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, yaml).map_err(io_error)
    }

    /// Editor command: config value, then `$EDITOR`, then `vi`.
    pub fn resolved_editor(&self) -> String {
        resolve_editor(self.editor.as_deref(), std::env::var("EDITOR").ok())
    }
}

/// Default location of the YAML config file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(fallback_base_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(fallback_base_dir)
        .join(APP_DIR_NAME)
}

/// `debug` for debug builds, `info` for release builds.
fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn fallback_base_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(std::env::temp_dir)
}

fn resolve_editor(configured: Option<&str>, from_env: Option<String>) -> String {
    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| from_env.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}
